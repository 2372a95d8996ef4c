// ==========================================
// 精密报价系统 - 输入校验器
// ==========================================
// 职责: 原始输入 → 校验后的值对象；在任何持久化之前拒绝非法输入
// 红线: 不静默截断为 0；未知形状不回退为长方体
// ==========================================

use crate::api::error::{ApiError, ApiResult, ValidationViolation};
use crate::domain::component::{ComponentInput, ComponentSpec};
use crate::domain::quote::{NewQuoteItem, SaveQuoteInput, SaveQuoteRequest};
use crate::domain::types::ShapeKind;

// ==========================================
// 违规收集器
// ==========================================
#[derive(Debug, Default)]
struct Violations {
    items: Vec<ValidationViolation>,
}

impl Violations {
    fn push(&mut self, violation_type: &str, field: &str, line_no: Option<usize>, reason: String) {
        self.items.push(ValidationViolation {
            violation_type: violation_type.to_string(),
            field: field.to_string(),
            line_no,
            reason,
        });
    }

    /// 数值必须为有限值且 >= 0
    fn non_negative(&mut self, field: &str, value: f64, line_no: Option<usize>) {
        if !value.is_finite() {
            self.push("NON_FINITE", field, line_no, format!("{}不是有效数值", field));
        } else if value < 0.0 {
            self.push("NEGATIVE_VALUE", field, line_no, format!("{}不能为负数: {}", field, value));
        }
    }

    fn into_result<T>(self, value: T) -> ApiResult<T> {
        if self.items.is_empty() {
            return Ok(value);
        }

        let reason = self
            .items
            .iter()
            .map(|v| match v.line_no {
                Some(line) => format!("第{}行 {}", line, v.reason),
                None => v.reason.clone(),
            })
            .collect::<Vec<_>>()
            .join("; ");

        Err(ApiError::ValidationError {
            reason,
            violations: self.items,
        })
    }
}

// ==========================================
// 零件校验
// ==========================================

fn check_component(
    input: &ComponentInput,
    line_no: Option<usize>,
    violations: &mut Violations,
) -> Option<ComponentSpec> {
    let shape = match input.shape.parse::<ShapeKind>() {
        Ok(shape) => Some(shape),
        Err(e) => {
            violations.push("UNKNOWN_SHAPE", "shape", line_no, e.to_string());
            None
        }
    };

    violations.non_negative("length_mm", input.length_mm, line_no);
    violations.non_negative("width_mm", input.width_mm, line_no);
    violations.non_negative("height_mm", input.height_mm, line_no);
    violations.non_negative("manual_price", input.manual_price, line_no);
    violations.non_negative("cnc_hours", input.cnc_hours, line_no);
    violations.non_negative("wire_cut_length_mm", input.wire_cut_length_mm, line_no);
    violations.non_negative("drilling_cost", input.drilling_cost, line_no);

    if let Some(id) = input.material_id {
        if id < 0 {
            violations.push("NEGATIVE_VALUE", "material_id", line_no, format!("材料ID不能为负数: {}", id));
        }
    }

    // 未填写数量按 1；0 保留原值（计价时按 1）
    let quantity = match input.quantity {
        None => Some(1),
        Some(q) if q < 0 => {
            violations.push("NEGATIVE_VALUE", "quantity", line_no, format!("数量不能为负数: {}", q));
            None
        }
        Some(q) => match u32::try_from(q) {
            Ok(q) => Some(q),
            Err(_) => {
                violations.push("OUT_OF_RANGE", "quantity", line_no, format!("数量超出范围: {}", q));
                None
            }
        },
    };

    Some(ComponentSpec {
        component_name: input.component_name.trim().to_string(),
        shape: shape?,
        material_id: input.material_id,
        length_mm: input.length_mm,
        width_mm: input.width_mm,
        height_mm: input.height_mm,
        manual_price: input.manual_price,
        include_squaring: input.include_squaring,
        include_heat_treat: input.include_heat_treat,
        cnc_hours: input.cnc_hours,
        wire_cut_length_mm: input.wire_cut_length_mm,
        drilling_cost: input.drilling_cost,
        quantity: quantity?,
    })
}

/// 校验单个零件
pub fn validate_component(input: &ComponentInput) -> ApiResult<ComponentSpec> {
    let mut violations = Violations::default();
    let spec = check_component(input, None, &mut violations);
    violations.into_result(())?;
    spec.ok_or_else(|| ApiError::InternalError("零件校验未产出结果".to_string()))
}

/// 校验一组零件（收集所有行的违规后一次返回）
pub fn validate_components(inputs: &[ComponentInput]) -> ApiResult<Vec<ComponentSpec>> {
    let mut violations = Violations::default();
    let specs: Vec<Option<ComponentSpec>> = inputs
        .iter()
        .enumerate()
        .map(|(idx, input)| check_component(input, Some(idx + 1), &mut violations))
        .collect();

    violations.into_result(())?;
    Ok(specs.into_iter().flatten().collect())
}

// ==========================================
// 保存请求校验
// ==========================================

/// 校验保存请求
///
/// # 规则
/// - quote_number >= 0（0 表示新报价）
/// - grand_total / final_cost 为有限非负数
/// - created_by 不能为空
/// - 每个明细行按零件规则校验
pub fn validate_save_input(input: &SaveQuoteInput, created_by: &str) -> ApiResult<SaveQuoteRequest> {
    let mut violations = Violations::default();

    if input.quote_number < 0 {
        violations.push(
            "NEGATIVE_VALUE",
            "quote_number",
            None,
            format!("报价号不能为负数: {}", input.quote_number),
        );
    }
    violations.non_negative("grand_total", input.grand_total, None);
    if created_by.trim().is_empty() {
        violations.push("BLANK", "created_by", None, "创建人不能为空".to_string());
    }

    let mut items = Vec::with_capacity(input.items.len());
    for (idx, item) in input.items.iter().enumerate() {
        let line_no = Some(idx + 1);
        violations.non_negative("final_cost", item.final_cost, line_no);
        if let Some(spec) = check_component(&item.component, line_no, &mut violations) {
            items.push(NewQuoteItem {
                spec,
                final_cost: item.final_cost,
            });
        }
    }

    violations.into_result(SaveQuoteRequest {
        quote_number: input.quote_number,
        customer_name: input.customer_name.clone(),
        tool_name: input.tool_name.clone(),
        grand_total: input.grand_total,
        items,
    })
}
