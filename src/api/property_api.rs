// ==========================================
// 停车违章执法系统 - 物业 API
// ==========================================

use std::sync::Arc;

use crate::api::error::{ApiError, ApiResult};
use crate::domain::property::PropertyConfig;
use crate::repository::PropertyRepository;

pub struct PropertyApi {
    property_repo: Arc<PropertyRepository>,
}

impl PropertyApi {
    pub fn new(property_repo: Arc<PropertyRepository>) -> Self {
        Self { property_repo }
    }

    /// 登记物业
    ///
    /// tow_after 至少为 1。
    pub fn create_property(&self, name: &str, tow_after: u32) -> ApiResult<PropertyConfig> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ApiError::ValidationError("物业名称不能为空".to_string()));
        }
        if tow_after == 0 {
            return Err(ApiError::ValidationError("tow_after 至少为 1".to_string()));
        }

        Ok(self.property_repo.create(name, tow_after)?)
    }

    pub fn list_properties(&self) -> ApiResult<Vec<PropertyConfig>> {
        Ok(self.property_repo.list_all()?)
    }
}
