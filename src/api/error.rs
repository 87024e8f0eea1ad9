// ==========================================
// 停车违章执法系统 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型，转换Repository/引擎错误为用户友好的错误消息
// 对外: 每类错误对应一个固定的命令行退出码
// ==========================================

use crate::engine::escalation::EscalationError;
use crate::engine::tow_document::DocumentError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 输入与查询错误
    // ==========================================
    #[error("数据验证失败: {0}")]
    ValidationError(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    #[error("认证失败: {0}")]
    Unauthorized(String),

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("存储错误: {0}")]
    StorageError(String),

    #[error("并发写入冲突: {0}")]
    ConcurrencyConflict(String),

    // ==========================================
    // 文书错误
    // ==========================================
    #[error("文书生成失败: {0}")]
    DocumentError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),
}

impl ApiError {
    /// 命令行退出码
    pub fn exit_code(&self) -> i32 {
        match self {
            ApiError::InternalError(_) => 1,
            ApiError::ValidationError(_) => 2,
            ApiError::NotFound(_) => 3,
            ApiError::StorageError(_) => 4,
            ApiError::ConcurrencyConflict(_) => 5,
            ApiError::Unauthorized(_) => 6,
            ApiError::DocumentError(_) => 7,
        }
    }
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::ConcurrencyConflict(msg) => ApiError::ConcurrencyConflict(msg),
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            RepositoryError::UniqueConstraintViolation(msg) => {
                ApiError::ValidationError(format!("唯一约束违反: {}", msg))
            }
            RepositoryError::FieldValueError { field, message } => {
                ApiError::ValidationError(format!("字段{}错误: {}", field, message))
            }
            RepositoryError::DatabaseConnectionError(msg)
            | RepositoryError::DatabaseTransactionError(msg)
            | RepositoryError::DatabaseQueryError(msg) => ApiError::StorageError(msg),
            RepositoryError::LockError(msg) => {
                ApiError::StorageError(format!("数据库锁获取失败: {}", msg))
            }
        }
    }
}

impl From<EscalationError> for ApiError {
    fn from(err: EscalationError) -> Self {
        match err {
            EscalationError::EmptyPlate => ApiError::ValidationError(err.to_string()),
            EscalationError::Storage(e) => e.into(),
        }
    }
}

impl From<DocumentError> for ApiError {
    fn from(err: DocumentError) -> Self {
        ApiError::DocumentError(err.to_string())
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_error_conversion() {
        let api_err: ApiError = RepositoryError::ConcurrencyConflict("busy".to_string()).into();
        assert!(matches!(api_err, ApiError::ConcurrencyConflict(_)));

        let api_err: ApiError = RepositoryError::DatabaseQueryError("disk".to_string()).into();
        assert!(matches!(api_err, ApiError::StorageError(_)));

        let api_err: ApiError = RepositoryError::NotFound {
            entity: "Violation".to_string(),
            id: "7".to_string(),
        }
        .into();
        match api_err {
            ApiError::NotFound(msg) => assert!(msg.contains("Violation")),
            other => panic!("Expected NotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_escalation_error_conversion() {
        let api_err: ApiError = EscalationError::EmptyPlate.into();
        assert!(matches!(api_err, ApiError::ValidationError(_)));

        let api_err: ApiError = EscalationError::Storage(RepositoryError::FieldValueError {
            field: "last_seen".to_string(),
            message: "早于上一条记录".to_string(),
        })
        .into();
        assert!(matches!(api_err, ApiError::ValidationError(_)));
        assert_eq!(api_err.exit_code(), 2);
    }

    #[test]
    fn test_exit_codes_are_distinct() {
        let errors = [
            ApiError::InternalError(String::new()),
            ApiError::ValidationError(String::new()),
            ApiError::NotFound(String::new()),
            ApiError::StorageError(String::new()),
            ApiError::ConcurrencyConflict(String::new()),
            ApiError::Unauthorized(String::new()),
            ApiError::DocumentError(String::new()),
        ];
        let mut codes: Vec<i32> = errors.iter().map(ApiError::exit_code).collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
        assert!(!codes.contains(&0));
    }
}
