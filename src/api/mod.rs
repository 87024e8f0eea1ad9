// ==========================================
// 停车违章执法系统 - API 层
// ==========================================
// 职责: 提供业务 API 接口,供命令行调用
// ==========================================

pub mod auth_api;
pub mod error;
pub mod property_api;
pub mod tow_api;
pub mod violation_api;

// 重导出核心类型
pub use auth_api::AuthApi;
pub use error::{ApiError, ApiResult};
pub use property_api::PropertyApi;
pub use tow_api::TowApi;
pub use violation_api::{PlateLookup, ViolationApi};
