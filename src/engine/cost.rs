// ==========================================
// 精密报价系统 - 成本组合引擎
// ==========================================
// 输入: ComponentSpec + 材料参数 + 费率快照
// 输出: CostBreakdown
// 红线: Fixed 形状的材料/磨方/热处理成本只来自手工单价，几何相关项强制为 0
// 红线: 内部不做四舍五入，总价以全精度浮点持久化
// ==========================================

use tracing::instrument;

use crate::domain::component::{ComponentSpec, CostBreakdown};
use crate::domain::material::MaterialRates;
use crate::domain::settings::RateSettings;
use crate::domain::types::ShapeKind;
use crate::engine::geometry::{measure, mm2_to_sq_inch};

// ==========================================
// CostComposer - 成本组合引擎
// ==========================================
#[derive(Debug, Default, Clone, Copy)]
pub struct CostComposer;

impl CostComposer {
    pub fn new() -> Self {
        Self
    }

    /// 计算单行成本明细
    ///
    /// 步骤:
    /// 1. Fixed: 材料费 = 手工单价，重量/面积/磨方/热处理均为 0
    /// 2. 其他: 重量 = 体积 × 密度系数；面积(in²) = 表面积 / 645.16；材料费 = 重量 × 单价
    /// 3. 磨方 = 面积(in²) × 磨方费率（勾选时）
    /// 4. 热处理 = 重量 × 热处理费率（勾选时）
    /// 5. CNC = 工时 × 时薪；线切割 = 长度 × 每毫米费率
    /// 6. 单件合计 = 以上各项 + 钻孔附加费
    /// 7. 行总价 = 单件合计 × 计价数量（0 按 1）
    #[instrument(skip(self, spec, rates), fields(shape = %spec.shape, qty = spec.quantity))]
    pub fn compose(
        &self,
        spec: &ComponentSpec,
        material: MaterialRates,
        rates: &RateSettings,
    ) -> CostBreakdown {
        let (weight_kg, area_sq_inch, material_cost) = match spec.shape {
            ShapeKind::Fixed => (0.0, 0.0, spec.manual_price),
            ShapeKind::Cuboid | ShapeKind::Cylindrical => {
                let geometry = measure(spec.shape, spec.dimensions());
                let weight_kg = geometry.volume_mm3 * material.density_factor;
                let area_sq_inch = mm2_to_sq_inch(geometry.surface_area_mm2);
                (weight_kg, area_sq_inch, weight_kg * material.rate_per_kg)
            }
        };

        let squaring_cost = if spec.include_squaring {
            area_sq_inch * rates.squaring_rate_per_sq_inch
        } else {
            0.0
        };
        let heat_treat_cost = if spec.include_heat_treat {
            weight_kg * rates.heat_treat_rate_per_kg
        } else {
            0.0
        };

        let cnc_cost = spec.cnc_hours * rates.cnc_rate_hourly;
        let wire_cut_cost = spec.wire_cut_length_mm * rates.wire_cut_rate_per_mm;

        let unit_total = material_cost
            + squaring_cost
            + heat_treat_cost
            + cnc_cost
            + wire_cut_cost
            + spec.drilling_cost;
        let grand_total = unit_total * f64::from(spec.effective_quantity());

        CostBreakdown {
            weight_kg,
            area_sq_inch,
            material_cost,
            squaring_cost,
            heat_treat_cost,
            cnc_cost,
            wire_cut_cost,
            unit_total,
            grand_total,
        }
    }
}
