// ==========================================
// 停车违章执法系统 - 违章记录内存仓储
// ==========================================
// 用途: 无数据库场景 / 单元测试
// 与 SqliteViolationRepository 实现同一 ViolationStore 接口
// ==========================================

use std::sync::{Mutex, MutexGuard};

use crate::domain::violation::{NewCitation, ViolationRecord};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::violation_repo::{EscalateFn, ViolationStore};

#[derive(Default)]
struct Table {
    next_id: i64,
    rows: Vec<ViolationRecord>,
}

/// 内存违章记录仓储
///
/// 单把锁覆盖 读最近记录 → 计算 → 插入 全过程。
#[derive(Default)]
pub struct MemoryViolationRepository {
    table: Mutex<Table>,
}

impl MemoryViolationRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> RepositoryResult<MutexGuard<'_, Table>> {
        self.table
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 记录总数
    pub fn len(&self) -> RepositoryResult<usize> {
        Ok(self.lock()?.rows.len())
    }

    pub fn is_empty(&self) -> RepositoryResult<bool> {
        Ok(self.len()? == 0)
    }
}

fn latest_of<'a>(rows: &'a [ViolationRecord], plate: &str) -> Option<&'a ViolationRecord> {
    rows.iter().filter(|r| r.plate == plate).max_by_key(|r| r.id)
}

impl ViolationStore for MemoryViolationRepository {
    fn find_latest(&self, plate: &str) -> RepositoryResult<Option<ViolationRecord>> {
        let table = self.lock()?;
        Ok(latest_of(&table.rows, plate).cloned())
    }

    fn list_by_plate(&self, plate: &str) -> RepositoryResult<Vec<ViolationRecord>> {
        let table = self.lock()?;
        let mut records: Vec<ViolationRecord> = table
            .rows
            .iter()
            .filter(|r| r.plate == plate)
            .cloned()
            .collect();
        records.sort_by(|a, b| b.last_seen.cmp(&a.last_seen).then(b.id.cmp(&a.id)));
        Ok(records)
    }

    fn append_escalated(
        &self,
        citation: &NewCitation,
        escalate: EscalateFn<'_>,
    ) -> RepositoryResult<ViolationRecord> {
        let mut table = self.lock()?;

        let escalation = escalate(latest_of(&table.rows, &citation.plate))?;

        table.next_id += 1;
        let record = ViolationRecord {
            id: table.next_id,
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
        };
        table.rows.push(record.clone());

        Ok(record)
    }

    fn search_plates(&self, prefix: &str, limit: usize) -> RepositoryResult<Vec<String>> {
        let table = self.lock()?;
        let mut plates: Vec<String> = table
            .rows
            .iter()
            .filter(|r| r.plate.starts_with(prefix))
            .map(|r| r.plate.clone())
            .collect();
        plates.sort();
        plates.dedup();
        plates.truncate(limit);
        Ok(plates)
    }
}
