// ==========================================
// 停车违章执法系统 - 命令行入口
// ==========================================
// 输出: 成功结果以 JSON 写到 stdout,日志写到 stderr
// 退出码: 与 ApiError::exit_code 一一对应
// ==========================================

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde::Serialize;

use parking_enforcement::api::{ApiError, ApiResult};
use parking_enforcement::app::{get_default_db_path, AppState};
use parking_enforcement::domain::{CitationContext, OfficerContext, UserRole};

#[derive(Parser, Debug)]
#[command(name = "parking-enforcement")]
#[command(version, about = "停车违章执法: 违章升级、历史查询与拖车授权")]
struct Cli {
    /// SQLite 数据库路径（默认: PARKING_ENFORCEMENT_DB_PATH 或用户数据目录）
    #[arg(long, global = true)]
    db: Option<String>,

    /// 以 JSON 格式输出日志
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

/// 登录凭据（开单、出具授权时需要）
#[derive(clap::Args, Debug)]
struct Credentials {
    #[arg(long)]
    username: String,

    #[arg(long)]
    password: String,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 初始化数据库
    Init,

    /// 新建账户
    AddUser {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
        #[arg(long, default_value = "officer")]
        role: String,
    },

    /// 登记物业
    AddProperty {
        #[arg(long)]
        name: String,
        #[arg(long, default_value_t = parking_enforcement::domain::DEFAULT_TOW_AFTER)]
        tow_after: u32,
    },

    /// 修改配置项
    SetConfig {
        #[arg(long)]
        key: String,
        #[arg(long)]
        value: String,
    },

    /// 查看全部配置
    ShowConfig,

    /// 开单
    Log {
        #[command(flatten)]
        credentials: Credentials,
        #[arg(long)]
        plate: String,
        #[arg(long)]
        state: Option<String>,
        #[arg(long)]
        vehicle: Option<String>,
        #[arg(long)]
        property: Option<String>,
        #[arg(long)]
        notes: Option<String>,
        /// 照片引用（文件名或存储键,不解析内容）
        #[arg(long)]
        photo: Option<String>,
    },

    /// 车牌查询（最近状态 + 历史）
    Lookup {
        #[arg(long)]
        plate: String,
    },

    /// 车牌历史
    History {
        #[arg(long)]
        plate: String,
    },

    /// 车牌联想
    Plates {
        #[arg(long, default_value = "")]
        prefix: String,
    },

    /// 出具拖车授权 PDF
    Tow {
        #[command(flatten)]
        credentials: Credentials,
        #[arg(long)]
        plate: String,
        /// 输出目录
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    parking_enforcement::logging::init(cli.json_logs);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(exit_code = err.exit_code(), "{}", err);
            eprintln!("错误: {}", err);
            ExitCode::from(err.exit_code() as u8)
        }
    }
}

fn run(cli: Cli) -> ApiResult<()> {
    let db_path = cli.db.unwrap_or_else(get_default_db_path);
    let state = AppState::new(db_path)?;

    match cli.command {
        Command::Init => print_json(&serde_json::json!({
            "db_path": state.db_path,
            "version": parking_enforcement::VERSION,
        })),
        Command::AddUser {
            username,
            password,
            role,
        } => {
            let role = role.parse::<UserRole>().map_err(ApiError::ValidationError)?;
            let user = state.auth_api.register_user(&username, &password, role)?;
            print_json(&user)
        }
        Command::AddProperty { name, tow_after } => {
            print_json(&state.property_api.create_property(&name, tow_after)?)
        }
        Command::SetConfig { key, value } => {
            state.config.set_value(&key, &value)?;
            print_json(&state.config.snapshot()?)
        }
        Command::ShowConfig => print_json(&state.config.snapshot()?),
        Command::Log {
            credentials,
            plate,
            state: plate_state,
            vehicle,
            property,
            notes,
            photo,
        } => {
            let officer = login(&state, &credentials)?;
            let context = CitationContext {
                state: plate_state,
                vehicle,
                property,
                notes,
                photo_ref: photo,
            };
            let record = state
                .violation_api
                .submit_citation(&plate, context, &officer)?;
            print_json(&record)
        }
        Command::Lookup { plate } => print_json(&state.violation_api.lookup(&plate)?),
        Command::History { plate } => print_json(&state.violation_api.get_history(&plate)?),
        Command::Plates { prefix } => print_json(&state.violation_api.search_plates(&prefix)?),
        Command::Tow {
            credentials,
            plate,
            out,
        } => {
            let officer = login(&state, &credentials)?;
            let document = state.tow_api.authorize(&plate, &officer)?;
            let path = document.write_to_dir(&out)?;
            print_json(&serde_json::json!({
                "authorization": document,
                "path": path,
            }))
        }
    }
}

fn login(state: &AppState, credentials: &Credentials) -> ApiResult<OfficerContext> {
    state
        .auth_api
        .login(&credentials.username, &credentials.password)
}

fn print_json<T: Serialize>(value: &T) -> ApiResult<()> {
    let out = serde_json::to_string_pretty(value)
        .map_err(|e| ApiError::InternalError(format!("JSON 序列化失败: {}", e)))?;
    println!("{}", out);
    Ok(())
}
