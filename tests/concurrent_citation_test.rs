// ==========================================
// 并发开单测试
// ==========================================
// 职责: 同一车牌并发开单时,计数严格递增且不重复
// ==========================================

#[path = "test_helpers.rs"]
mod test_helpers;

#[cfg(test)]
mod concurrent_citation_test {
    use parking_enforcement::domain::{CitationContext, ViolationStatus};
    use parking_enforcement::engine::EscalationEngine;
    use parking_enforcement::repository::{
        MemoryViolationRepository, SqliteViolationRepository, ViolationStore,
    };
    use std::collections::BTreeSet;
    use std::sync::{Arc, Barrier};
    use std::thread;

    use crate::test_helpers::{at, create_test_db, officer};

    // ==========================================
    // 测试辅助函数
    // ==========================================

    /// 多线程对同一车牌开单,返回每次开单得到的 warning_count
    fn race(engines: Vec<Arc<EscalationEngine>>, per_thread: u32) -> Vec<u32> {
        let barrier = Arc::new(Barrier::new(engines.len()));

        let handles: Vec<_> = engines
            .into_iter()
            .enumerate()
            .map(|(i, engine)| {
                let barrier = barrier.clone();
                thread::spawn(move || {
                    let officer = officer(&format!("officer{}", i));
                    barrier.wait();
                    (0..per_thread)
                        .map(|_| {
                            engine
                                .record_citation_at(
                                    "RACE01",
                                    CitationContext::default(),
                                    &officer,
                                    at(12, 0),
                                )
                                .unwrap()
                                .warning_count
                        })
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect()
    }

    fn assert_strict_sequence(counts: &[u32]) {
        let unique: BTreeSet<u32> = counts.iter().copied().collect();
        assert_eq!(unique.len(), counts.len(), "出现重复计数: {:?}", counts);
        let expected: BTreeSet<u32> = (1..=counts.len() as u32).collect();
        assert_eq!(unique, expected);
    }

    fn assert_history_consistent(store: &dyn ViolationStore, total: usize) {
        let history = store.list_by_plate("RACE01").unwrap();
        assert_eq!(history.len(), total);

        let mut by_count: Vec<_> = history.iter().collect();
        by_count.sort_by_key(|r| r.warning_count);
        for (i, record) in by_count.iter().enumerate() {
            assert_eq!(record.warning_count, i as u32 + 1);
            assert_eq!(record.first_seen.is_some(), record.warning_count == 1);
            assert_eq!(
                record.status == ViolationStatus::Tow,
                record.warning_count >= 2
            );
        }

        let latest = store.find_latest("RACE01").unwrap().unwrap();
        assert_eq!(latest.warning_count as usize, total);
    }

    // ==========================================
    // 两个并发开单 → {1, 2}
    // ==========================================

    #[test]
    fn test_two_concurrent_citations_shared_connection() {
        let (_temp_file, db_path) = create_test_db().unwrap();
        let store: Arc<dyn ViolationStore> =
            Arc::new(SqliteViolationRepository::open(&db_path).unwrap());
        let engine = Arc::new(EscalationEngine::new(store.clone()));

        let counts = race(vec![engine.clone(), engine], 1);

        assert_strict_sequence(&counts);
        assert_history_consistent(store.as_ref(), 2);
    }

    #[test]
    fn test_two_concurrent_citations_separate_connections() {
        let (_temp_file, db_path) = create_test_db().unwrap();

        let engines: Vec<_> = (0..2)
            .map(|_| {
                let store: Arc<dyn ViolationStore> =
                    Arc::new(SqliteViolationRepository::open(&db_path).unwrap());
                Arc::new(EscalationEngine::new(store))
            })
            .collect();

        let counts = race(engines, 1);
        assert_strict_sequence(&counts);

        let reader = SqliteViolationRepository::open(&db_path).unwrap();
        assert_history_consistent(&reader, 2);
    }

    // ==========================================
    // 多线程多次开单
    // ==========================================

    #[test]
    fn test_many_writers_separate_connections() {
        let (_temp_file, db_path) = create_test_db().unwrap();

        let engines: Vec<_> = (0..6)
            .map(|_| {
                let store: Arc<dyn ViolationStore> =
                    Arc::new(SqliteViolationRepository::open(&db_path).unwrap());
                Arc::new(EscalationEngine::new(store))
            })
            .collect();

        let counts = race(engines, 5);
        assert_eq!(counts.len(), 30);
        assert_strict_sequence(&counts);

        let reader = SqliteViolationRepository::open(&db_path).unwrap();
        assert_history_consistent(&reader, 30);
    }

    #[test]
    fn test_many_writers_memory_backend() {
        let memory = Arc::new(MemoryViolationRepository::new());
        let store: Arc<dyn ViolationStore> = memory.clone();
        let engine = Arc::new(EscalationEngine::new(store.clone()));

        let counts = race((0..8).map(|_| engine.clone()).collect(), 10);
        assert_eq!(counts.len(), 80);
        assert_strict_sequence(&counts);
        assert_history_consistent(store.as_ref(), 80);
        assert_eq!(memory.len().unwrap(), 80);
    }
}
