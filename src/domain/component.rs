// ==========================================
// 精密报价系统 - 零件领域模型
// ==========================================
// ComponentInput: 协作方提交的原始字段（未校验）
// ComponentSpec:  校验后的计价行
// CostBreakdown:  计算结果（不持久化，仅总价随报价冻结）
// ==========================================

use serde::{Deserialize, Serialize};

use crate::domain::types::ShapeKind;

// ==========================================
// ComponentInput - 原始输入
// ==========================================
// 形状为字符串标签，数值未经校验；由 api::validator 转换为 ComponentSpec
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComponentInput {
    pub component_name: String,
    pub shape: String,
    pub material_id: Option<i64>,
    pub length_mm: f64,
    pub width_mm: f64,
    pub height_mm: f64,
    pub manual_price: f64,
    pub include_squaring: bool,
    pub include_heat_treat: bool,
    pub quantity: Option<i64>,
    pub cnc_hours: f64,
    pub wire_cut_length_mm: f64,
    pub drilling_cost: f64,
}

/// 外形尺寸 (mm)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub length_mm: f64,
    pub width_mm: f64,  // 圆柱体: 直径
    pub height_mm: f64, // 圆柱体: 不使用
}

// ==========================================
// ComponentSpec - 计价行
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentSpec {
    pub component_name: String,
    pub shape: ShapeKind,
    pub material_id: Option<i64>, // None/0 => 默认钢材
    pub length_mm: f64,
    pub width_mm: f64,
    pub height_mm: f64,
    pub manual_price: f64, // 仅 Fixed 使用
    pub include_squaring: bool,
    pub include_heat_treat: bool,
    pub cnc_hours: f64,
    pub wire_cut_length_mm: f64,
    pub drilling_cost: f64, // 钻孔固定附加费
    pub quantity: u32,      // 0 视为 1
}

impl ComponentSpec {
    pub fn dimensions(&self) -> Dimensions {
        Dimensions {
            length_mm: self.length_mm,
            width_mm: self.width_mm,
            height_mm: self.height_mm,
        }
    }

    /// 计价数量：0 按 1 计
    pub fn effective_quantity(&self) -> u32 {
        if self.quantity == 0 {
            1
        } else {
            self.quantity
        }
    }

    /// 需要查询的材料ID（0 与未指定等价）
    pub fn material_ref(&self) -> Option<i64> {
        self.material_id.filter(|id| *id > 0)
    }
}

// ==========================================
// CostBreakdown - 单行成本明细
// ==========================================
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub weight_kg: f64,
    pub area_sq_inch: f64,
    pub material_cost: f64,
    pub squaring_cost: f64,
    pub heat_treat_cost: f64,
    pub cnc_cost: f64,
    pub wire_cut_cost: f64,
    pub unit_total: f64,
    pub grand_total: f64, // unit_total × 计价数量
}

// ==========================================
// ComponentTemplate - 标准零件模板
// ==========================================
// 新建报价时按 display_order 预填的零件行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentTemplate {
    pub template_id: i64,
    pub name: String,
    pub shape: ShapeKind,
    pub display_order: i32,
}

impl ComponentTemplate {
    /// 生成新行的默认输入：数量 1，默认磨方，不热处理
    pub fn to_input(&self) -> ComponentInput {
        ComponentInput {
            component_name: self.name.clone(),
            shape: self.shape.to_db_str().to_string(),
            include_squaring: true,
            include_heat_treat: false,
            quantity: Some(1),
            ..ComponentInput::default()
        }
    }
}
