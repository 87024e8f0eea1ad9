// ==========================================
// 停车违章执法系统 - 违章升级引擎
// ==========================================
// 规则:
// - 首次开单: warning_count = 1, WARNING, first_seen = now
// - 再次开单: warning_count = 上一条 + 1, 达到阈值即 TOW
// - first_seen 只写在第一条记录上,不向后复制
// - last_seen 恒为本次开单时间
// 并发: 读最近记录与插入由仓储层原子完成
// ==========================================

use std::sync::Arc;

use chrono::{NaiveDateTime, Timelike};

use crate::domain::types::ViolationStatus;
use crate::domain::violation::{
    normalize_plate, CitationContext, Escalation, NewCitation, OfficerContext, ViolationRecord,
    TIMESTAMP_FORMAT,
};
use crate::repository::{PropertyRepository, RepositoryError, RepositoryResult, ViolationStore};

/// 全局拖车阈值（第 2 次开单即拖车）
pub const DEFAULT_TOW_THRESHOLD: u32 = 2;

// ==========================================
// ThresholdPolicy - 拖车阈值来源
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThresholdPolicy {
    /// 全局固定阈值（物业 tow_after 不参与）
    Global(u32),
    /// 按开单所属物业的 tow_after,物业未登记时使用 fallback
    PerProperty { fallback: u32 },
}

impl Default for ThresholdPolicy {
    fn default() -> Self {
        ThresholdPolicy::Global(DEFAULT_TOW_THRESHOLD)
    }
}

// ==========================================
// EscalationError - 升级引擎错误
// ==========================================
#[derive(Debug, thiserror::Error)]
pub enum EscalationError {
    #[error("车牌不能为空")]
    EmptyPlate,

    #[error(transparent)]
    Storage(#[from] RepositoryError),
}

/// 根据上一条记录计算本次开单的升级结果
///
/// 阈值小于 1 时按 1 处理。
pub fn escalate(
    previous: Option<&ViolationRecord>,
    threshold: u32,
    now: NaiveDateTime,
) -> Escalation {
    let warning_count = previous.map_or(1, |p| p.warning_count.saturating_add(1));
    let status = if warning_count >= threshold.max(1) {
        ViolationStatus::Tow
    } else {
        ViolationStatus::Warning
    };

    Escalation {
        warning_count,
        status,
        first_seen: (warning_count == 1).then_some(now),
        last_seen: now,
    }
}

/// 开单时间不得早于该车牌最近一条记录
///
/// 同一时间戳允许,按插入顺序排列。
fn check_chronology(
    previous: Option<&ViolationRecord>,
    now: NaiveDateTime,
) -> RepositoryResult<()> {
    match previous {
        Some(prev) if now < prev.last_seen => Err(RepositoryError::FieldValueError {
            field: "last_seen".to_string(),
            message: format!(
                "开单时间{}早于该车牌最近一条记录{}",
                now.format(TIMESTAMP_FORMAT),
                prev.last_seen.format(TIMESTAMP_FORMAT)
            ),
        }),
        _ => Ok(()),
    }
}

// ==========================================
// EscalationEngine - 升级引擎
// ==========================================
pub struct EscalationEngine {
    store: Arc<dyn ViolationStore>,
    property_repo: Option<Arc<PropertyRepository>>,
    policy: ThresholdPolicy,
}

impl EscalationEngine {
    /// 使用全局阈值 2 创建
    pub fn new(store: Arc<dyn ViolationStore>) -> Self {
        Self {
            store,
            property_repo: None,
            policy: ThresholdPolicy::default(),
        }
    }

    /// 指定阈值策略创建
    ///
    /// PerProperty 策略需要 property_repo 才能读取物业阈值,
    /// 未提供时一律使用 fallback。
    pub fn with_policy(
        store: Arc<dyn ViolationStore>,
        property_repo: Option<Arc<PropertyRepository>>,
        policy: ThresholdPolicy,
    ) -> Self {
        Self {
            store,
            property_repo,
            policy,
        }
    }

    pub fn policy(&self) -> ThresholdPolicy {
        self.policy
    }

    /// 记录一次开单（当前本地时间）
    pub fn record_citation(
        &self,
        plate: &str,
        context: CitationContext,
        officer: &OfficerContext,
    ) -> Result<ViolationRecord, EscalationError> {
        self.record_citation_at(plate, context, officer, chrono::Local::now().naive_local())
    }

    /// 记录一次开单（指定时间）
    ///
    /// 时间截断到整秒,与存储精度一致。
    /// 早于该车牌最近一条记录的时间返回 FieldValueError,不写入。
    pub fn record_citation_at(
        &self,
        plate: &str,
        context: CitationContext,
        officer: &OfficerContext,
        now: NaiveDateTime,
    ) -> Result<ViolationRecord, EscalationError> {
        let plate = normalize_plate(plate).ok_or(EscalationError::EmptyPlate)?;
        let now = now.with_nanosecond(0).unwrap_or(now);
        let context = context.normalized();
        let threshold = self.resolve_threshold(context.property.as_deref())?;

        let citation = NewCitation {
            plate,
            context,
            officer: officer.username.clone(),
        };

        let record = self
            .store
            .append_escalated(&citation, &|previous| {
                check_chronology(previous, now)?;
                Ok(escalate(previous, threshold, now))
            })?;

        tracing::info!(
            plate = %record.plate,
            warning_count = record.warning_count,
            status = %record.status,
            officer = %record.officer,
            "违章已记录"
        );

        Ok(record)
    }

    /// 解析本次开单适用的拖车阈值
    fn resolve_threshold(&self, property: Option<&str>) -> Result<u32, EscalationError> {
        match self.policy {
            ThresholdPolicy::Global(threshold) => Ok(threshold),
            ThresholdPolicy::PerProperty { fallback } => {
                let (Some(repo), Some(name)) = (&self.property_repo, property) else {
                    return Ok(fallback);
                };
                match repo.find_by_name(name)? {
                    Some(p) => {
                        tracing::debug!(property = %p.name, tow_after = p.tow_after, "使用物业拖车阈值");
                        Ok(p.tow_after)
                    }
                    None => Ok(fallback),
                }
            }
        }
    }
}
