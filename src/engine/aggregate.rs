// ==========================================
// 精密报价系统 - 报价汇总
// ==========================================
// 报价总价 = 各行 grand_total 直接求和（无加权/折扣）
// ==========================================

use tracing::instrument;

use crate::domain::component::CostBreakdown;
use crate::domain::quote::{PricedComponent, PricedQuote};

#[derive(Debug, Default, Clone, Copy)]
pub struct QuoteAggregator;

impl QuoteAggregator {
    pub fn new() -> Self {
        Self
    }

    /// 汇总各行总价
    pub fn total<'a, I>(&self, breakdowns: I) -> f64
    where
        I: IntoIterator<Item = &'a CostBreakdown>,
    {
        breakdowns.into_iter().map(|b| b.grand_total).sum()
    }

    /// 组装计价结果（保持输入顺序）
    #[instrument(skip_all, fields(count = components.len()))]
    pub fn assemble(&self, components: Vec<PricedComponent>) -> PricedQuote {
        let grand_total = self.total(components.iter().map(|c| &c.breakdown));
        PricedQuote {
            components,
            grand_total,
        }
    }
}
