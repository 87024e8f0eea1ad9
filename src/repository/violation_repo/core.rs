use crate::domain::violation::{NewCitation, ViolationRecord, TIMESTAMP_FORMAT};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::violation_repo::{EscalateFn, ViolationStore};
use rusqlite::{params, Connection, TransactionBehavior};
use std::sync::{Arc, Mutex};

// ==========================================
// SqliteViolationRepository - 违章记录仓储 (SQLite)
// ==========================================
// 红线: Repository 不做业务逻辑,只做数据映射
pub struct SqliteViolationRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteViolationRepository {
    /// 创建新的违章记录仓储
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 基于数据库文件创建（独立连接）
    pub fn open(db_path: &str) -> RepositoryResult<Self> {
        let conn = crate::db::open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        Ok(Self::new(Arc::new(Mutex::new(conn))))
    }

    /// 获取数据库连接
    pub(super) fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    // ==========================================
    // 写入操作
    // ==========================================

    /// 在 IMMEDIATE 事务内完成 读最近记录 → 计算 → 插入
    ///
    /// IMMEDIATE 事务在开始时即取得写锁,其他连接上的同类事务
    /// 在 busy_timeout 内排队,超时则返回 ConcurrencyConflict。
    /// 事务未提交即被 drop 时自动回滚。
    fn append_in_transaction(
        &self,
        citation: &NewCitation,
        escalate: EscalateFn<'_>,
    ) -> RepositoryResult<ViolationRecord> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let previous = Self::query_latest(&tx, &citation.plate)?;
        let escalation = escalate(previous.as_ref())?;

        tx.execute(
            r#"
            INSERT INTO violations (
                plate, state, vehicle, property, warning_count,
                first_seen, last_seen, status, notes, photo, officer
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                citation.plate,
                citation.context.state,
                citation.context.vehicle,
                citation.context.property,
                escalation.warning_count,
                escalation
                    .first_seen
                    .map(|t| t.format(TIMESTAMP_FORMAT).to_string()),
                escalation.last_seen.format(TIMESTAMP_FORMAT).to_string(),
                escalation.status.as_str(),
                citation.context.notes,
                citation.context.photo_ref,
                citation.officer,
            ],
        )?;
        let id = tx.last_insert_rowid();

        tx.commit()
            .map_err(|e| match RepositoryError::from(e) {
                RepositoryError::DatabaseQueryError(msg) => {
                    RepositoryError::DatabaseTransactionError(msg)
                }
                other => other,
            })?;

        Ok(ViolationRecord {
            id,
            plate: citation.plate.clone(),
            state: citation.context.state.clone(),
            vehicle: citation.context.vehicle.clone(),
            property: citation.context.property.clone(),
            notes: citation.context.notes.clone(),
            photo_ref: citation.context.photo_ref.clone(),
            warning_count: escalation.warning_count,
            first_seen: escalation.first_seen,
            last_seen: escalation.last_seen,
            status: escalation.status,
            officer: citation.officer.clone(),
        })
    }
}

impl ViolationStore for SqliteViolationRepository {
    fn find_latest(&self, plate: &str) -> RepositoryResult<Option<ViolationRecord>> {
        let conn = self.get_conn()?;
        Self::query_latest(&conn, plate)
    }

    fn list_by_plate(&self, plate: &str) -> RepositoryResult<Vec<ViolationRecord>> {
        let conn = self.get_conn()?;
        Self::query_history(&conn, plate)
    }

    fn append_escalated(
        &self,
        citation: &NewCitation,
        escalate: EscalateFn<'_>,
    ) -> RepositoryResult<ViolationRecord> {
        self.append_in_transaction(citation, escalate)
    }

    fn search_plates(&self, prefix: &str, limit: usize) -> RepositoryResult<Vec<String>> {
        let conn = self.get_conn()?;
        Self::query_plate_prefix(&conn, prefix, limit)
    }
}
