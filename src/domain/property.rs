// ==========================================
// 停车违章执法系统 - 物业与用户领域模型
// ==========================================
// 对齐: properties 表 / users 表
// ==========================================

use serde::{Deserialize, Serialize};

use crate::domain::types::UserRole;

/// 物业默认拖车阈值
pub const DEFAULT_TOW_AFTER: u32 = 2;

// ==========================================
// PropertyConfig - 物业配置
// ==========================================
// tow_after 仅在 PROPERTY 阈值来源下被升级引擎读取
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyConfig {
    pub id: i64,
    pub name: String,
    pub tow_after: u32,
}

// ==========================================
// UserAccount - 用户账户
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAccount {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // Argon2 PHC 字符串
    pub role: UserRole,
}
