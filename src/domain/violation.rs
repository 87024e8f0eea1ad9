// ==========================================
// 停车违章执法系统 - 违章记录领域模型
// ==========================================
// 对齐: violations 表
// 红线: 记录一经写入不可修改,每次开单新增一行
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{UserRole, ViolationStatus};

/// 数据库时间戳格式
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ==========================================
// ViolationRecord - 违章记录
// ==========================================
// 同一车牌的多条记录按时间排列即为其违章历史
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViolationRecord {
    // ===== 主键 =====
    pub id: i64,       // 自增ID (同一时间戳下以此决定先后)
    pub plate: String, // 车牌 (大写)

    // ===== 开单上下文 =====
    pub state: Option<String>,      // 车牌所属州
    pub vehicle: Option<String>,    // 车辆描述
    pub property: Option<String>,   // 物业名称
    pub notes: Option<String>,      // 备注
    pub photo_ref: Option<String>,  // 照片引用 (不透明)

    // ===== 升级结果 =====
    pub warning_count: u32,                 // 警告次数 (从1开始)
    pub first_seen: Option<NaiveDateTime>,  // 仅 warning_count == 1 时设置
    pub last_seen: NaiveDateTime,           // 本次开单时间
    pub status: ViolationStatus,            // 派生状态

    // ===== 审计 =====
    pub officer: String, // 开单人用户名
}

// ==========================================
// CitationContext - 开单上下文
// ==========================================
// 空白字符串统一视为未填写
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CitationContext {
    pub state: Option<String>,
    pub vehicle: Option<String>,
    pub property: Option<String>,
    pub notes: Option<String>,
    pub photo_ref: Option<String>,
}

impl CitationContext {
    /// 去除首尾空白,空串转为 None
    pub fn normalized(self) -> Self {
        Self {
            state: non_blank(self.state),
            vehicle: non_blank(self.vehicle),
            property: non_blank(self.property),
            notes: non_blank(self.notes),
            photo_ref: non_blank(self.photo_ref),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// ==========================================
// NewCitation - 待写入的开单
// ==========================================
// 仓储层写入入参: 车牌已规范化,上下文已清洗
#[derive(Debug, Clone, PartialEq)]
pub struct NewCitation {
    pub plate: String,
    pub context: CitationContext,
    pub officer: String,
}

// ==========================================
// OfficerContext - 操作人上下文
// ==========================================
// 由认证环节提供,显式传入每次写操作和文书生成
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfficerContext {
    pub username: String,
    pub role: UserRole,
}

impl OfficerContext {
    pub fn new(username: impl Into<String>, role: UserRole) -> Self {
        Self {
            username: username.into(),
            role,
        }
    }
}

// ==========================================
// Escalation - 升级计算结果
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Escalation {
    pub warning_count: u32,
    pub status: ViolationStatus,
    pub first_seen: Option<NaiveDateTime>,
    pub last_seen: NaiveDateTime,
}

/// 规范化车牌: 去空白并转大写,空车牌返回 None
pub fn normalize_plate(raw: &str) -> Option<String> {
    let plate = raw.trim().to_uppercase();
    if plate.is_empty() {
        None
    } else {
        Some(plate)
    }
}
