// ==========================================
// 精密报价系统 - 核心库
// ==========================================
// 模具/零件成本估算 + 报价版本管理
// 技术栈: Rust + SQLite
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 几何/成本/汇总/版本判定
pub mod engine;

// 配置层 - 工艺费率
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// 应用层 - 状态组装
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::ShapeKind;

// 领域实体
pub use domain::{
    ComponentInput, ComponentSpec, CostBreakdown, Material, Quote, QuoteGroup, QuoteItem,
    RateSettings, SaveQuoteInput,
};

// 引擎
pub use engine::{CostComposer, QuoteAggregator};

// API
pub use api::{ApiError, ApiResult, CatalogApi, QuoteApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "精密报价系统";
