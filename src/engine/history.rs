// ==========================================
// 停车违章执法系统 - 违章历史投影
// ==========================================
// 只读: 不触发任何升级副作用
// 空车牌 / 未知车牌 → None / 空列表,不报错
// ==========================================

use std::sync::Arc;

use crate::domain::violation::{normalize_plate, ViolationRecord};
use crate::repository::{RepositoryResult, ViolationStore};

pub struct HistoryProjector {
    store: Arc<dyn ViolationStore>,
}

impl HistoryProjector {
    pub fn new(store: Arc<dyn ViolationStore>) -> Self {
        Self { store }
    }

    /// 车牌最近一条记录
    pub fn get_latest(&self, plate: &str) -> RepositoryResult<Option<ViolationRecord>> {
        match normalize_plate(plate) {
            Some(plate) => self.store.find_latest(&plate),
            None => Ok(None),
        }
    }

    /// 车牌违章历史（最近在前）
    pub fn get_history(&self, plate: &str) -> RepositoryResult<Vec<ViolationRecord>> {
        let Some(plate) = normalize_plate(plate) else {
            return Ok(Vec::new());
        };
        let history = self.store.list_by_plate(&plate)?;
        tracing::debug!(plate = %plate, records = history.len(), "查询违章历史");
        Ok(history)
    }

    /// 最近状态是否为 TOW（决定是否提供拖车授权入口）
    pub fn tow_eligible(&self, plate: &str) -> RepositoryResult<bool> {
        Ok(self
            .get_latest(plate)?
            .is_some_and(|record| record.status.is_tow()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::UserRole;
    use crate::domain::violation::{CitationContext, OfficerContext};
    use crate::engine::escalation::EscalationEngine;
    use crate::repository::MemoryViolationRepository;
    use chrono::{NaiveDate, NaiveDateTime};

    fn at(h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 4, 2)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn setup() -> (EscalationEngine, HistoryProjector) {
        let store: Arc<dyn ViolationStore> = Arc::new(MemoryViolationRepository::new());
        (
            EscalationEngine::new(store.clone()),
            HistoryProjector::new(store),
        )
    }

    #[test]
    fn test_unknown_and_empty_plate() {
        let (_engine, projector) = setup();

        assert!(projector.get_history("ZZZ999").unwrap().is_empty());
        assert!(projector.get_history("").unwrap().is_empty());
        assert!(projector.get_latest("ZZZ999").unwrap().is_none());
        assert!(!projector.tow_eligible("ZZZ999").unwrap());
    }

    #[test]
    fn test_history_most_recent_first() {
        let (engine, projector) = setup();
        let officer = OfficerContext::new("officer1", UserRole::Officer);

        engine
            .record_citation_at("ABC123", CitationContext::default(), &officer, at(9))
            .unwrap();
        assert!(!projector.tow_eligible("abc123").unwrap());

        engine
            .record_citation_at("ABC123", CitationContext::default(), &officer, at(11))
            .unwrap();

        let history = projector.get_history("abc123").unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].last_seen, at(11));
        assert_eq!(history[1].last_seen, at(9));
        assert!(projector.tow_eligible("ABC123").unwrap());
    }

    #[test]
    fn test_reads_do_not_escalate() {
        let (engine, projector) = setup();
        let officer = OfficerContext::new("officer1", UserRole::Officer);

        engine
            .record_citation_at("RO1", CitationContext::default(), &officer, at(9))
            .unwrap();
        for _ in 0..3 {
            projector.get_history("RO1").unwrap();
            projector.get_latest("RO1").unwrap();
        }

        let latest = projector.get_latest("RO1").unwrap().unwrap();
        assert_eq!(latest.warning_count, 1);
        assert_eq!(projector.get_history("RO1").unwrap().len(), 1);
    }
}
