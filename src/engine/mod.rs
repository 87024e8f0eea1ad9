// ==========================================
// 停车违章执法系统 - 引擎层
// ==========================================
// 职责: 违章升级规则、历史投影、拖车授权文书
// 红线: 引擎不直接写 SQL,通过仓储接口访问数据
// ==========================================

pub mod escalation;
pub mod history;
pub mod tow_document;

// 重导出
pub use escalation::{
    escalate, EscalationEngine, EscalationError, ThresholdPolicy, DEFAULT_TOW_THRESHOLD,
};
pub use history::HistoryProjector;
pub use tow_document::{
    DocumentError, TowAuthorization, TowAuthorizationGenerator, DOCUMENT_TITLE,
};
