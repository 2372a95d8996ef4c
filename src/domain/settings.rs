// ==========================================
// 精密报价系统 - 全局费率
// ==========================================
// 用途: 每次计算读取一次快照，作为不可变值传入成本引擎
// ==========================================

use serde::{Deserialize, Serialize};

pub const DEFAULT_CNC_RATE_HOURLY: f64 = 500.0;
pub const DEFAULT_WIRE_CUT_RATE_PER_MM: f64 = 0.25;
pub const DEFAULT_SQUARING_RATE_PER_SQ_INCH: f64 = 4.0;
pub const DEFAULT_HEAT_TREAT_RATE_PER_KG: f64 = 40.0;

/// 全局工艺费率（单例记录）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateSettings {
    pub cnc_rate_hourly: f64,            // CNC 加工 每小时
    pub wire_cut_rate_per_mm: f64,       // 线切割 每毫米
    pub squaring_rate_per_sq_inch: f64,  // 磨方 每平方英寸
    pub heat_treat_rate_per_kg: f64,     // 热处理 每公斤
}

impl Default for RateSettings {
    fn default() -> Self {
        Self {
            cnc_rate_hourly: DEFAULT_CNC_RATE_HOURLY,
            wire_cut_rate_per_mm: DEFAULT_WIRE_CUT_RATE_PER_MM,
            squaring_rate_per_sq_inch: DEFAULT_SQUARING_RATE_PER_SQ_INCH,
            heat_treat_rate_per_kg: DEFAULT_HEAT_TREAT_RATE_PER_KG,
        }
    }
}
