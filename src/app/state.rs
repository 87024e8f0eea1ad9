// ==========================================
// 停车违章执法系统 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// ==========================================

use std::sync::{Arc, Mutex};

use crate::api::{ApiError, ApiResult, AuthApi, PropertyApi, TowApi, ViolationApi};
use crate::config::ConfigManager;
use crate::engine::{EscalationEngine, HistoryProjector, TowAuthorizationGenerator};
use crate::repository::{
    PropertyRepository, SqliteViolationRepository, UserRepository, ViolationStore,
};

/// 应用状态
///
/// 包含所有API实例和共享资源
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 违章API
    pub violation_api: Arc<ViolationApi>,

    /// 拖车授权API
    pub tow_api: Arc<TowApi>,

    /// 认证API
    pub auth_api: Arc<AuthApi>,

    /// 物业API
    pub property_api: Arc<PropertyApi>,

    /// 配置管理器
    pub config: Arc<ConfigManager>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// 该方法会：
    /// 1. 打开数据库并初始化 schema
    /// 2. 初始化所有Repository
    /// 3. 按配置组装升级引擎
    /// 4. 创建所有API实例
    pub fn new(db_path: String) -> ApiResult<Self> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let conn = crate::db::open_sqlite_connection(&db_path)
            .map_err(|e| ApiError::StorageError(format!("无法打开数据库: {}", e)))?;
        crate::db::init_schema(&conn)
            .map_err(|e| ApiError::StorageError(format!("数据库初始化失败: {}", e)))?;
        let conn = Arc::new(Mutex::new(conn));

        // ==========================================
        // 初始化Repository层
        // ==========================================
        let store: Arc<dyn ViolationStore> =
            Arc::new(SqliteViolationRepository::new(conn.clone()));
        let property_repo = Arc::new(PropertyRepository::new(conn.clone()));
        let user_repo = Arc::new(UserRepository::new(conn.clone()));
        let config = Arc::new(ConfigManager::from_connection(conn));

        // ==========================================
        // 初始化Engine层
        // ==========================================
        let policy = config.threshold_policy()?;
        tracing::info!(?policy, "拖车阈值策略");

        let escalation_engine = Arc::new(EscalationEngine::with_policy(
            store.clone(),
            Some(property_repo.clone()),
            policy,
        ));
        let history = Arc::new(HistoryProjector::new(store.clone()));

        // ==========================================
        // 初始化API层
        // ==========================================
        let violation_api = Arc::new(ViolationApi::new(
            escalation_engine,
            history.clone(),
            store,
            config.plate_search_limit()?,
        ));
        let tow_api = Arc::new(TowApi::new(history, TowAuthorizationGenerator::new()));
        let auth_api = Arc::new(AuthApi::new(user_repo));
        let property_api = Arc::new(PropertyApi::new(property_repo));

        Ok(Self {
            db_path,
            violation_api,
            tow_api,
            auth_api,
            property_api,
            config,
        })
    }
}

/// 获取默认数据库路径
///
/// 优先级: 环境变量 PARKING_ENFORCEMENT_DB_PATH > 用户数据目录 > 当前目录
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    if let Ok(path) = std::env::var("PARKING_ENFORCEMENT_DB_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./parking_enforcement.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("parking-enforcement");
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("parking_enforcement.db");
        }
    }

    path.to_string_lossy().to_string()
}
