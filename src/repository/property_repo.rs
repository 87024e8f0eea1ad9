// ==========================================
// 停车违章执法系统 - 物业数据仓储
// ==========================================
// 对齐: properties 表
// ==========================================

use crate::domain::property::PropertyConfig;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

// ==========================================
// PropertyRepository - 物业仓储
// ==========================================
pub struct PropertyRepository {
    conn: Arc<Mutex<Connection>>,
}

impl PropertyRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 新建物业
    ///
    /// # 返回
    /// - `Ok(PropertyConfig)`: 含自增ID
    /// - `Err(UniqueConstraintViolation)`: 名称重复
    pub fn create(&self, name: &str, tow_after: u32) -> RepositoryResult<PropertyConfig> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO properties (name, tow_after) VALUES (?1, ?2)",
            params![name, tow_after],
        )?;

        Ok(PropertyConfig {
            id: conn.last_insert_rowid(),
            name: name.to_string(),
            tow_after,
        })
    }

    /// 按名称查询（大小写不敏感）
    pub fn find_by_name(&self, name: &str) -> RepositoryResult<Option<PropertyConfig>> {
        let conn = self.get_conn()?;
        let property = conn
            .query_row(
                "SELECT id, name, tow_after FROM properties WHERE name = ?1 COLLATE NOCASE",
                params![name],
                map_row,
            )
            .optional()?;
        Ok(property)
    }

    /// 查询全部物业
    pub fn list_all(&self) -> RepositoryResult<Vec<PropertyConfig>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare("SELECT id, name, tow_after FROM properties ORDER BY name")?;
        let properties = stmt
            .query_map([], map_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(properties)
    }
}

fn map_row(row: &Row) -> SqliteResult<PropertyConfig> {
    Ok(PropertyConfig {
        id: row.get(0)?,
        name: row.get(1)?,
        tow_after: row.get(2)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_repo() -> PropertyRepository {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::init_schema(&conn).unwrap();
        PropertyRepository::new(Arc::new(Mutex::new(conn)))
    }

    #[test]
    fn test_create_and_find_by_name() {
        let repo = setup_repo();
        let created = repo.create("Oak Apartments", 3).unwrap();

        let found = repo.find_by_name("oak apartments").unwrap().unwrap();
        assert_eq!(found, created);
        assert_eq!(found.tow_after, 3);
        assert!(repo.find_by_name("Elm Court").unwrap().is_none());
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let repo = setup_repo();
        repo.create("Oak Apartments", 2).unwrap();

        let result = repo.create("Oak Apartments", 4);
        assert!(matches!(
            result,
            Err(RepositoryError::UniqueConstraintViolation(_))
        ));
        assert_eq!(repo.list_all().unwrap().len(), 1);
    }
}
