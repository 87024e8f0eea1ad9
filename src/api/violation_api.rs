// ==========================================
// 停车违章执法系统 - 违章 API
// ==========================================
// 职责: 开单、车牌查询（最近状态 + 历史）、车牌联想
// 约束: 参数校验在触达存储前完成
// ==========================================

use std::sync::Arc;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::api::error::{ApiError, ApiResult};
use crate::domain::violation::{normalize_plate, CitationContext, OfficerContext, ViolationRecord};
use crate::engine::{EscalationEngine, HistoryProjector};
use crate::repository::ViolationStore;

// ==========================================
// PlateLookup - 车牌查询结果
// ==========================================
#[derive(Debug, Clone, Serialize)]
pub struct PlateLookup {
    pub plate: String,
    pub latest: Option<ViolationRecord>,
    pub history: Vec<ViolationRecord>,
    /// 最近状态为 TOW 时才提供拖车授权
    pub tow_authorization_available: bool,
}

// ==========================================
// ViolationApi - 违章 API
// ==========================================
pub struct ViolationApi {
    escalation_engine: Arc<EscalationEngine>,
    history: Arc<HistoryProjector>,
    store: Arc<dyn ViolationStore>,
    plate_search_limit: usize,
}

impl ViolationApi {
    pub fn new(
        escalation_engine: Arc<EscalationEngine>,
        history: Arc<HistoryProjector>,
        store: Arc<dyn ViolationStore>,
        plate_search_limit: usize,
    ) -> Self {
        Self {
            escalation_engine,
            history,
            store,
            plate_search_limit,
        }
    }

    /// 开单
    ///
    /// # 返回
    /// - Ok(ViolationRecord): 新写入的记录
    /// - Err(ValidationError): 车牌为空或操作人为空
    /// - Err(StorageError / ConcurrencyConflict): 存储失败,未写入任何记录
    pub fn submit_citation(
        &self,
        plate: &str,
        context: CitationContext,
        officer: &OfficerContext,
    ) -> ApiResult<ViolationRecord> {
        validate_citation(plate, officer)?;
        Ok(self
            .escalation_engine
            .record_citation(plate, context, officer)?)
    }

    /// 开单（指定时间,用于补录与测试）
    pub fn submit_citation_at(
        &self,
        plate: &str,
        context: CitationContext,
        officer: &OfficerContext,
        now: NaiveDateTime,
    ) -> ApiResult<ViolationRecord> {
        validate_citation(plate, officer)?;
        Ok(self
            .escalation_engine
            .record_citation_at(plate, context, officer, now)?)
    }

    /// 车牌查询: 最近记录 + 历史 + 是否可出具拖车授权
    pub fn lookup(&self, plate: &str) -> ApiResult<PlateLookup> {
        let plate = require_plate(plate)?;
        let latest = self.history.get_latest(&plate)?;
        let history = self.history.get_history(&plate)?;
        let tow_authorization_available = latest.as_ref().is_some_and(|r| r.status.is_tow());

        Ok(PlateLookup {
            plate,
            latest,
            history,
            tow_authorization_available,
        })
    }

    /// 最近一条记录（未知车牌返回 None）
    pub fn get_latest(&self, plate: &str) -> ApiResult<Option<ViolationRecord>> {
        Ok(self.history.get_latest(plate)?)
    }

    /// 违章历史（未知车牌返回空列表）
    pub fn get_history(&self, plate: &str) -> ApiResult<Vec<ViolationRecord>> {
        Ok(self.history.get_history(plate)?)
    }

    /// 车牌联想（前缀大写匹配）
    pub fn search_plates(&self, prefix: &str) -> ApiResult<Vec<String>> {
        let prefix = prefix.trim().to_uppercase();
        Ok(self.store.search_plates(&prefix, self.plate_search_limit)?)
    }
}

fn require_plate(plate: &str) -> ApiResult<String> {
    normalize_plate(plate).ok_or_else(|| ApiError::ValidationError("车牌不能为空".to_string()))
}

fn validate_citation(plate: &str, officer: &OfficerContext) -> ApiResult<()> {
    require_plate(plate)?;
    if officer.username.trim().is_empty() {
        return Err(ApiError::ValidationError("操作人不能为空".to_string()));
    }
    Ok(())
}
