// ==========================================
// 精密报价系统 - 材料领域模型
// ==========================================
// 用途: 材料目录（只读于成本计算过程）
// ==========================================

use serde::{Deserialize, Serialize};

/// 默认密度系数: 低碳钢 (kg/mm³)
pub const DEFAULT_DENSITY_FACTOR: f64 = 0.000_007_85;

// ==========================================
// Material - 材料目录条目
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub material_id: i64,    // 材料ID
    pub name: String,        // 名称，例如 "D2 (HCHCr)"
    pub density_factor: f64, // 密度系数 (kg/mm³)
    pub rate_per_kg: f64,    // 单价 (每公斤)
}

// ==========================================
// MaterialRates - 计算时使用的材料参数
// ==========================================
// 未指定材料时使用默认钢材密度，材料单价为 0
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaterialRates {
    pub density_factor: f64,
    pub rate_per_kg: f64,
}

impl MaterialRates {
    pub fn default_steel() -> Self {
        Self {
            density_factor: DEFAULT_DENSITY_FACTOR,
            rate_per_kg: 0.0,
        }
    }
}

impl Default for MaterialRates {
    fn default() -> Self {
        Self::default_steel()
    }
}

impl From<&Material> for MaterialRates {
    fn from(material: &Material) -> Self {
        Self {
            density_factor: material.density_factor,
            rate_per_kg: material.rate_per_kg,
        }
    }
}
