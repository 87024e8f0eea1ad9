// ==========================================
// 停车违章执法系统 - 领域类型定义
// ==========================================
// 违章状态 / 用户角色
// 存储格式与数据库文本列一致
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ==========================================
// 违章状态 (Violation Status)
// ==========================================
// 派生字段: 由警告次数计算,不可单独设置
// 序列化格式: SCREAMING_SNAKE_CASE (与数据库一致)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ViolationStatus {
    Warning, // 警告
    Tow,     // 拖车
}

impl ViolationStatus {
    /// 转换为字符串 (用于数据库存储)
    pub fn as_str(&self) -> &'static str {
        match self {
            ViolationStatus::Warning => "WARNING",
            ViolationStatus::Tow => "TOW",
        }
    }

    pub fn is_tow(&self) -> bool {
        matches!(self, ViolationStatus::Tow)
    }
}

impl fmt::Display for ViolationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ViolationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "WARNING" => Ok(ViolationStatus::Warning),
            "TOW" => Ok(ViolationStatus::Tow),
            other => Err(format!("未知违章状态: {}", other)),
        }
    }
}

// ==========================================
// 用户角色 (User Role)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,   // 管理员
    Officer, // 执法人员
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Officer => "officer",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(UserRole::Admin),
            "officer" => Ok(UserRole::Officer),
            other => Err(format!("未知用户角色: {}", other)),
        }
    }
}
