// ==========================================
// 停车违章执法系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod error;
pub mod memory_violation_repo;
pub mod property_repo;
pub mod user_repo;
pub mod violation_repo;

// 重导出核心仓储
pub use error::{RepositoryError, RepositoryResult};
pub use memory_violation_repo::MemoryViolationRepository;
pub use property_repo::PropertyRepository;
pub use user_repo::UserRepository;
pub use violation_repo::{EscalateFn, SqliteViolationRepository, ViolationStore};
