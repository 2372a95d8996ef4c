// ==========================================
// 精密报价系统 - 报价历史分组
// ==========================================
// 显式按 quote_number 分组，不依赖查询结果的排序连续性
// 输出: 报价号降序；组内 latest = 最大版本，history 版本号降序
// ==========================================

use std::collections::BTreeMap;

use tracing::instrument;

use crate::domain::quote::{Quote, QuoteGroup};

/// 分组报价表头
#[instrument(skip_all, fields(rows = rows.len()))]
pub fn group_quotes(rows: Vec<Quote>) -> Vec<QuoteGroup> {
    let mut by_number: BTreeMap<i64, Vec<Quote>> = BTreeMap::new();
    for row in rows {
        by_number.entry(row.quote_number).or_default().push(row);
    }

    by_number
        .into_iter()
        .rev()
        .filter_map(|(quote_number, mut revisions)| {
            // 版本号降序；同版本（理论上不存在）按内部ID降序保证稳定
            revisions.sort_by(|a, b| {
                b.version
                    .cmp(&a.version)
                    .then_with(|| b.quote_id.cmp(&a.quote_id))
            });

            let mut iter = revisions.into_iter();
            let latest = iter.next()?;
            Some(QuoteGroup {
                quote_number,
                latest,
                history: iter.collect(),
            })
        })
        .collect()
}
