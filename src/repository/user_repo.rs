// ==========================================
// 停车违章执法系统 - 用户数据仓储
// ==========================================
// 对齐: users 表
// 红线: 只存储密码哈希,不接触明文
// ==========================================

use crate::domain::property::UserAccount;
use crate::domain::types::UserRole;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

const SELECT_COLUMNS: &str = "SELECT id, username, password_hash, role FROM users";

// ==========================================
// UserRepository - 用户仓储
// ==========================================
pub struct UserRepository {
    conn: Arc<Mutex<Connection>>,
}

impl UserRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 新建用户
    pub fn create(
        &self,
        username: &str,
        password_hash: &str,
        role: UserRole,
    ) -> RepositoryResult<UserAccount> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO users (username, password_hash, role) VALUES (?1, ?2, ?3)",
            params![username, password_hash, role.as_str()],
        )?;

        Ok(UserAccount {
            id: conn.last_insert_rowid(),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            role,
        })
    }

    pub fn find_by_username(&self, username: &str) -> RepositoryResult<Option<UserAccount>> {
        let conn = self.get_conn()?;
        let sql = format!("{} WHERE username = ?1", SELECT_COLUMNS);
        let user = conn.query_row(&sql, params![username], map_row).optional()?;
        Ok(user)
    }

    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<UserAccount>> {
        let conn = self.get_conn()?;
        let sql = format!("{} WHERE id = ?1", SELECT_COLUMNS);
        let user = conn.query_row(&sql, params![id], map_row).optional()?;
        Ok(user)
    }

    pub fn list_all(&self) -> RepositoryResult<Vec<UserAccount>> {
        let conn = self.get_conn()?;
        let sql = format!("{} ORDER BY username", SELECT_COLUMNS);
        let mut stmt = conn.prepare(&sql)?;
        let users = stmt
            .query_map([], map_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(users)
    }
}

fn map_row(row: &Row) -> SqliteResult<UserAccount> {
    let role_str: String = row.get(3)?;
    let role = role_str.parse::<UserRole>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(
            3,
            rusqlite::types::Type::Text,
            Box::<dyn std::error::Error + Send + Sync>::from(e),
        )
    })?;

    Ok(UserAccount {
        id: row.get(0)?,
        username: row.get(1)?,
        password_hash: row.get(2)?,
        role,
    })
}
