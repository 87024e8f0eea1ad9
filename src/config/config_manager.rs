// ==========================================
// 停车违章执法系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写
// 存储: config_kv 表 (key-value, scope_id='global')
// ==========================================

use crate::engine::escalation::{ThresholdPolicy, DEFAULT_TOW_THRESHOLD};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// 默认车牌联想条数
pub const DEFAULT_PLATE_SEARCH_LIMIT: usize = 20;

// ==========================================
// ThresholdSource - 拖车阈值来源
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThresholdSource {
    Global,   // 全局阈值
    Property, // 物业 tow_after
}

impl ThresholdSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThresholdSource::Global => "GLOBAL",
            ThresholdSource::Property => "PROPERTY",
        }
    }

    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "GLOBAL" => Some(ThresholdSource::Global),
            "PROPERTY" => Some(ThresholdSource::Property),
            _ => None,
        }
    }
}

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 基于数据库文件创建（独立连接）
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = crate::db::open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 读取 global scope 的配置值
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_value(&self, key: &str) -> RepositoryResult<Option<String>> {
        let conn = self.get_conn()?;
        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    /// 写入 global scope 的配置值（存在则覆盖）
    pub fn set_value(&self, key: &str, value: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO config_kv (scope_id, key, value, updated_at)
            VALUES ('global', ?1, ?2, datetime('now'))
            ON CONFLICT(scope_id, key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
            params![key, value],
        )?;
        tracing::info!(key = %key, value = %value, "配置已更新");
        Ok(())
    }

    /// 全部配置快照
    pub fn snapshot(&self) -> RepositoryResult<HashMap<String, String>> {
        let conn = self.get_conn()?;
        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = 'global'")?;
        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
            .collect::<rusqlite::Result<HashMap<_, _>>>()?;
        Ok(rows)
    }

    /// 解析正整数配置,缺失或非法时回退默认值
    fn get_positive_or_default(&self, key: &str, default: u32) -> RepositoryResult<u32> {
        let Some(raw) = self.get_value(key)? else {
            return Ok(default);
        };
        match raw.trim().parse::<u32>() {
            Ok(v) if v >= 1 => Ok(v),
            _ => {
                tracing::warn!(key = %key, value = %raw, default, "配置值非法,使用默认值");
                Ok(default)
            }
        }
    }

    // ==========================================
    // 违章升级配置
    // ==========================================

    /// 全局拖车阈值（默认 2）
    pub fn tow_threshold(&self) -> RepositoryResult<u32> {
        self.get_positive_or_default(config_keys::TOW_THRESHOLD, DEFAULT_TOW_THRESHOLD)
    }

    /// 阈值来源（默认 GLOBAL）
    pub fn threshold_source(&self) -> RepositoryResult<ThresholdSource> {
        let Some(raw) = self.get_value(config_keys::THRESHOLD_SOURCE)? else {
            return Ok(ThresholdSource::Global);
        };
        Ok(ThresholdSource::parse(&raw).unwrap_or_else(|| {
            tracing::warn!(value = %raw, "未知阈值来源,使用 GLOBAL");
            ThresholdSource::Global
        }))
    }

    /// 组装升级引擎的阈值策略
    pub fn threshold_policy(&self) -> RepositoryResult<ThresholdPolicy> {
        let threshold = self.tow_threshold()?;
        Ok(match self.threshold_source()? {
            ThresholdSource::Global => ThresholdPolicy::Global(threshold),
            ThresholdSource::Property => ThresholdPolicy::PerProperty {
                fallback: threshold,
            },
        })
    }

    // ==========================================
    // 查询配置
    // ==========================================

    /// 车牌联想返回条数（默认 20）
    pub fn plate_search_limit(&self) -> RepositoryResult<usize> {
        self.get_positive_or_default(
            config_keys::PLATE_SEARCH_LIMIT,
            DEFAULT_PLATE_SEARCH_LIMIT as u32,
        )
        .map(|v| v as usize)
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 违章升级
    pub const TOW_THRESHOLD: &str = "escalation.tow_threshold";
    pub const THRESHOLD_SOURCE: &str = "escalation.threshold_source";

    // 车牌联想
    pub const PLATE_SEARCH_LIMIT: &str = "plate_search.limit";
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> ConfigManager {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::init_schema(&conn).unwrap();
        ConfigManager::from_connection(Arc::new(Mutex::new(conn)))
    }

    #[test]
    fn test_defaults() {
        let config = setup();
        assert_eq!(config.tow_threshold().unwrap(), 2);
        assert_eq!(config.threshold_source().unwrap(), ThresholdSource::Global);
        assert_eq!(config.threshold_policy().unwrap(), ThresholdPolicy::Global(2));
        assert_eq!(config.plate_search_limit().unwrap(), 20);
    }

    #[test]
    fn test_property_source_policy() {
        let config = setup();
        config
            .set_value(config_keys::THRESHOLD_SOURCE, "property")
            .unwrap();
        config.set_value(config_keys::TOW_THRESHOLD, "3").unwrap();

        assert_eq!(
            config.threshold_policy().unwrap(),
            ThresholdPolicy::PerProperty { fallback: 3 }
        );
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = setup();
        config.set_value(config_keys::TOW_THRESHOLD, "0").unwrap();
        config.set_value(config_keys::THRESHOLD_SOURCE, "LOTTERY").unwrap();
        config.set_value(config_keys::PLATE_SEARCH_LIMIT, "abc").unwrap();

        assert_eq!(config.threshold_policy().unwrap(), ThresholdPolicy::Global(2));
        assert_eq!(config.plate_search_limit().unwrap(), 20);
    }

    #[test]
    fn test_set_value_overwrites() {
        let config = setup();
        config.set_value(config_keys::TOW_THRESHOLD, "4").unwrap();
        config.set_value(config_keys::TOW_THRESHOLD, "5").unwrap();

        assert_eq!(config.tow_threshold().unwrap(), 5);
        assert_eq!(config.snapshot().unwrap().len(), 1);
    }
}
