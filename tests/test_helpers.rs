// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 提供测试所需的数据库初始化、测试数据生成等功能
// ==========================================

#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use parking_enforcement::domain::{CitationContext, OfficerContext, UserRole};
use std::error::Error;
use tempfile::NamedTempFile;

/// 创建临时测试数据库并初始化 schema
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    parking_enforcement::logging::init_test();

    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file
        .path()
        .to_str()
        .ok_or("临时文件路径不是 UTF-8")?
        .to_string();

    let conn = parking_enforcement::db::open_sqlite_connection(&db_path)?;
    parking_enforcement::db::init_schema(&conn)?;

    Ok((temp_file, db_path))
}

/// 固定日期上的时间点
pub fn at(hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 3, 15)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap()
}

pub fn officer(username: &str) -> OfficerContext {
    OfficerContext::new(username, UserRole::Officer)
}

pub fn context_at_property(property: &str) -> CitationContext {
    CitationContext {
        state: Some("TX".to_string()),
        vehicle: Some("Gray pickup".to_string()),
        property: Some(property.to_string()),
        notes: Some("Parked in fire lane".to_string()),
        photo_ref: None,
    }
}
