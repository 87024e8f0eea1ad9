// ==========================================
// 停车违章执法系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod property;
pub mod types;
pub mod violation;

// 重导出核心类型
pub use property::{PropertyConfig, UserAccount, DEFAULT_TOW_AFTER};
pub use types::{UserRole, ViolationStatus};
pub use violation::{
    normalize_plate, CitationContext, Escalation, NewCitation, OfficerContext, ViolationRecord,
    TIMESTAMP_FORMAT,
};
