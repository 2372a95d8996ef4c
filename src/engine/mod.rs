// ==========================================
// 精密报价系统 - 引擎层
// ==========================================
// 职责: 纯业务规则（几何、成本、汇总、版本判定、历史分组）
// 红线: 不访问数据库；费率/材料作为不可变值传入
// ==========================================

pub mod aggregate;
pub mod cost;
pub mod geometry;
pub mod history;
pub mod versioning;

pub use aggregate::QuoteAggregator;
pub use cost::CostComposer;
pub use geometry::{measure, mm2_to_sq_inch, Geometry, SQ_MM_PER_SQ_INCH};
pub use history::group_quotes;
pub use versioning::{
    is_duplicate, plan_new_quote, plan_revision, LatestRevision, RevisionNumber,
    RevisionRejection, DUPLICATE_COST_TOLERANCE,
};
