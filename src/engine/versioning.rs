// ==========================================
// 精密报价系统 - 报价版本判定
// ==========================================
// 职责: 新报价 vs 新版本、编号分配、无变更重复保存拦截
// 红线: 版本号必须在写入同一事务内计算（见 repository::quote_repo）
// ==========================================
// 重复判定只比较“总价 + 工具名称”，不逐行比对明细；
// 总价差 < 0.01 视为未变化（货币最小单位容差）
// ==========================================

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::quote::FIRST_QUOTE_NUMBER;

/// 重复保存判定的总价容差
pub const DUPLICATE_COST_TOLERANCE: f64 = 0.01;

/// 报价号下版本号最大的一行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatestRevision {
    pub quote_number: i64,
    pub version: i32,
    pub total_cost: f64,
    pub tool_name: String,
}

/// 分配结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevisionNumber {
    pub quote_number: i64,
    pub version: i32,
}

/// 保存被拒绝的原因（不写入任何行，不消耗版本号）
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RevisionRejection {
    #[error("报价号{0}不存在")]
    QuoteNotFound(i64),

    #[error("未检测到变更: 与报价{quote_number} V{version}的总价和工具名称相同")]
    Duplicate { quote_number: i64, version: i32 },
}

/// 新报价: 报价号 = 现有最大报价号 + 1（无报价时从 1001 开始），版本 1
pub fn plan_new_quote(max_existing_quote_number: Option<i64>) -> RevisionNumber {
    let quote_number = max_existing_quote_number
        .map(|max| max + 1)
        .unwrap_or(FIRST_QUOTE_NUMBER);

    RevisionNumber {
        quote_number,
        version: 1,
    }
}

/// 是否为无变更的重复保存
pub fn is_duplicate(latest: &LatestRevision, grand_total: f64, tool_name: &str) -> bool {
    (latest.total_cost - grand_total).abs() < DUPLICATE_COST_TOLERANCE && latest.tool_name == tool_name
}

/// 已有报价的新版本
///
/// - 报价号不存在 → QuoteNotFound
/// - 与最新版本重复 → Duplicate
/// - 否则 版本号 = 最新版本 + 1
pub fn plan_revision(
    requested_quote_number: i64,
    latest: Option<&LatestRevision>,
    grand_total: f64,
    tool_name: &str,
) -> Result<RevisionNumber, RevisionRejection> {
    let latest = latest.ok_or(RevisionRejection::QuoteNotFound(requested_quote_number))?;

    if is_duplicate(latest, grand_total, tool_name) {
        return Err(RevisionRejection::Duplicate {
            quote_number: latest.quote_number,
            version: latest.version,
        });
    }

    Ok(RevisionNumber {
        quote_number: requested_quote_number,
        version: latest.version + 1,
    })
}
