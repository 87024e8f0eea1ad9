// ==========================================
// 停车违章执法系统 - 拖车授权 API
// ==========================================
// 策略: 车牌无记录或最近状态不是 TOW → NotFound
// 状态检查只在本层进行,文书生成器本身不检查
// ==========================================

use std::sync::Arc;

use chrono::NaiveDateTime;

use crate::api::error::{ApiError, ApiResult};
use crate::domain::violation::{normalize_plate, OfficerContext};
use crate::engine::{HistoryProjector, TowAuthorization, TowAuthorizationGenerator};

pub struct TowApi {
    history: Arc<HistoryProjector>,
    generator: TowAuthorizationGenerator,
}

impl TowApi {
    pub fn new(history: Arc<HistoryProjector>, generator: TowAuthorizationGenerator) -> Self {
        Self { history, generator }
    }

    /// 出具拖车授权（当前本地时间）
    pub fn authorize(&self, plate: &str, officer: &OfficerContext) -> ApiResult<TowAuthorization> {
        self.authorize_at(plate, officer, chrono::Local::now().naive_local())
    }

    /// 出具拖车授权（指定时间）
    ///
    /// # 返回
    /// - Err(ValidationError): 车牌为空
    /// - Err(NotFound): 车牌无记录,或最近状态不是 TOW
    pub fn authorize_at(
        &self,
        plate: &str,
        officer: &OfficerContext,
        issued_at: NaiveDateTime,
    ) -> ApiResult<TowAuthorization> {
        let plate = normalize_plate(plate)
            .ok_or_else(|| ApiError::ValidationError("车牌不能为空".to_string()))?;

        let latest = self
            .history
            .get_latest(&plate)?
            .ok_or_else(|| ApiError::NotFound(format!("车牌{}无违章记录", plate)))?;

        if !latest.status.is_tow() {
            tracing::warn!(plate = %plate, status = %latest.status, "拒绝出具拖车授权");
            return Err(ApiError::NotFound(format!(
                "车牌{}当前状态为{},不可出具拖车授权",
                plate, latest.status
            )));
        }

        Ok(self.generator.generate(&plate, officer, issued_at)?)
    }
}
