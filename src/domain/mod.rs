// ==========================================
// 精密报价系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型、值对象
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod component;
pub mod material;
pub mod quote;
pub mod settings;
pub mod types;

// 重导出核心类型
pub use component::{ComponentInput, ComponentSpec, ComponentTemplate, CostBreakdown, Dimensions};
pub use material::{Material, MaterialRates, DEFAULT_DENSITY_FACTOR};
pub use quote::{
    LoadedQuote, NewQuoteItem, PricedComponent, PricedQuote, Quote, QuoteGroup, QuoteItem,
    QuoteItemInput, SaveQuoteInput, SaveQuoteRequest, SavedRevision, FIRST_QUOTE_NUMBER,
};
pub use settings::RateSettings;
pub use types::{ShapeKind, UnknownShapeError};
