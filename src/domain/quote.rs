// ==========================================
// 精密报价系统 - 报价领域模型
// ==========================================
// 红线: 报价历史只追加，每次保存新增一行表头，从不修改
// 键: (quote_number, version)
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::component::{ComponentInput, ComponentSpec, CostBreakdown};

/// 首个报价号
pub const FIRST_QUOTE_NUMBER: i64 = 1001;

// ==========================================
// Quote - 报价表头（一个版本一行）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub quote_id: i64,             // 内部ID（每次保存唯一）
    pub quote_number: i64,         // 报价号（同一报价所有版本共享）
    pub version: i32,              // 版本号 1, 2, 3...
    pub customer_name: String,
    pub tool_name: String,
    pub total_cost: f64,           // 保存时冻结的总价
    pub created_by: String,
    pub created_at: NaiveDateTime,
}

// ==========================================
// QuoteItem - 报价明细快照（写入后不可变）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteItem {
    pub item_id: i64,
    pub quote_id: i64,
    pub line_no: i32, // 插入顺序
    #[serde(flatten)]
    pub spec: ComponentSpec,
    pub final_cost: f64, // 保存时的行总价
}

/// 待写入的明细行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewQuoteItem {
    #[serde(flatten)]
    pub spec: ComponentSpec,
    pub final_cost: f64,
}

// ==========================================
// 保存请求
// ==========================================

/// 协作方提交的保存请求（未校验）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SaveQuoteInput {
    pub quote_number: i64, // 0 表示新报价
    pub customer_name: String,
    pub tool_name: String,
    pub grand_total: f64,
    pub items: Vec<QuoteItemInput>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuoteItemInput {
    #[serde(flatten)]
    pub component: ComponentInput,
    pub final_cost: f64,
}

/// 校验后的保存请求
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveQuoteRequest {
    pub quote_number: i64, // 0 表示新报价
    pub customer_name: String,
    pub tool_name: String,
    pub grand_total: f64,
    pub items: Vec<NewQuoteItem>,
}

impl SaveQuoteRequest {
    pub fn is_new_quote(&self) -> bool {
        self.quote_number == 0
    }
}

/// 保存成功后的编号
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedRevision {
    pub quote_id: i64,
    pub quote_number: i64,
    pub version: i32,
}

// ==========================================
// 视图对象（不持久化）
// ==========================================

/// 同一报价号的所有版本：最新版 + 历史版（版本号降序）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteGroup {
    pub quote_number: i64,
    pub latest: Quote,
    pub history: Vec<Quote>,
}

/// 载入的报价：明细按当前费率/材料重新计算
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadedQuote {
    pub header: Quote,
    pub items: Vec<QuoteItem>,
    pub breakdowns: Vec<CostBreakdown>,
}

/// 单行计价结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricedComponent {
    pub spec: ComponentSpec,
    pub breakdown: CostBreakdown,
}

/// 一组零件的计价结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricedQuote {
    pub components: Vec<PricedComponent>,
    pub grand_total: f64,
}
