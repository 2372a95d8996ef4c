// ==========================================
// 精密报价系统 - API 层
// ==========================================
// 职责: 校验输入、组合引擎与仓储，向调用方返回值化的结果
// ==========================================

pub mod catalog_api;
pub mod error;
pub mod quote_api;
pub mod validator;

// 重导出核心类型
pub use catalog_api::CatalogApi;
pub use error::{ApiError, ApiResult, ValidationViolation};
pub use quote_api::{QuoteApi, MAX_SAVE_ATTEMPTS};
pub use validator::{validate_component, validate_components, validate_save_input};
