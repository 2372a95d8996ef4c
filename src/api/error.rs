// ==========================================
// 精密报价系统 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型，转换Repository错误为用户友好的错误消息
// 约定: 所有失败都是值，不允许 panic 到调用方
// ==========================================

use crate::engine::versioning::RevisionRejection;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
/// 所有错误信息必须包含可读原因
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 输入错误 (4xx)
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    /// 零件/报价字段校验失败（带逐项原因）
    #[error("数据验证失败: {reason}")]
    ValidationError {
        reason: String,
        violations: Vec<ValidationViolation>,
    },

    #[error("资源未找到: {0}")]
    NotFound(String),

    /// 无变更的重复保存
    #[error("重复保存: {0}")]
    DuplicateRevision(String),

    // ==========================================
    // 数据访问错误 (5xx)
    // ==========================================
    #[error("持久化失败: {0}")]
    PersistenceFailure(String),

    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ApiError {
    /// 对应的 HTTP 状态码语义（由外层协作方决定是否使用）
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::InvalidInput(_) | ApiError::ValidationError { .. } => 400,
            ApiError::NotFound(_) => 404,
            ApiError::DuplicateRevision(_) => 409,
            ApiError::PersistenceFailure(_)
            | ApiError::DatabaseConnectionError(_)
            | ApiError::InternalError(_)
            | ApiError::Other(_) => 500,
        }
    }

    /// 是否为调用方可修正的错误 (4xx)
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code())
    }
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            RepositoryError::DatabaseConnectionError(msg) => ApiError::DatabaseConnectionError(msg),
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseConnectionError(format!("数据库锁获取失败: {}", msg))
            }
            RepositoryError::FieldValueError { field, message } => {
                ApiError::InvalidInput(format!("字段{}错误: {}", field, message))
            }
            RepositoryError::DatabaseTransactionError(msg)
            | RepositoryError::DatabaseQueryError(msg)
            | RepositoryError::UniqueConstraintViolation(msg)
            | RepositoryError::ForeignKeyViolation(msg) => ApiError::PersistenceFailure(msg),
            RepositoryError::InternalError(msg) => ApiError::InternalError(msg),
            RepositoryError::Other(err) => ApiError::Other(err),
        }
    }
}

// ==========================================
// 从版本判定拒绝转换
// ==========================================
impl From<RevisionRejection> for ApiError {
    fn from(rejection: RevisionRejection) -> Self {
        match rejection {
            RevisionRejection::QuoteNotFound(_) => ApiError::NotFound(rejection.to_string()),
            RevisionRejection::Duplicate { .. } => ApiError::DuplicateRevision(rejection.to_string()),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

// ==========================================
// 校验违规详情
// ==========================================

/// 校验违规详情
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ValidationViolation {
    /// 违规类型（UNKNOWN_SHAPE / NEGATIVE_VALUE / NON_FINITE / BLANK）
    pub violation_type: String,
    /// 字段名
    pub field: String,
    /// 明细行号（从 1 开始；表头字段为 None）
    pub line_no: Option<usize>,
    /// 违规原因
    pub reason: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ApiError::InvalidInput("x".into()).status_code(), 400);
        assert_eq!(ApiError::NotFound("x".into()).status_code(), 404);
        assert_eq!(ApiError::DuplicateRevision("x".into()).status_code(), 409);
        assert_eq!(ApiError::PersistenceFailure("x".into()).status_code(), 500);
        assert!(!ApiError::InternalError("x".into()).is_client_error());
    }

    #[test]
    fn test_rejection_mapping() {
        let err: ApiError = RevisionRejection::Duplicate {
            quote_number: 1001,
            version: 2,
        }
        .into();
        assert!(matches!(err, ApiError::DuplicateRevision(_)));
        assert_eq!(err.status_code(), 409);

        let err: ApiError = RevisionRejection::QuoteNotFound(77).into();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[test]
    fn test_repository_error_mapping() {
        let err: ApiError = RepositoryError::UniqueConstraintViolation("UNIQUE".into()).into();
        assert!(matches!(err, ApiError::PersistenceFailure(_)));

        let err: ApiError = RepositoryError::NotFound {
            entity: "Quote".into(),
            id: "9".into(),
        }
        .into();
        assert_eq!(err.to_string(), "资源未找到: Quote(id=9)不存在");
    }
}
