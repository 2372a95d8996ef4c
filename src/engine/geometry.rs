// ==========================================
// 精密报价系统 - 几何计算
// ==========================================
// 输入: 形状 + 尺寸 (mm)
// 输出: 体积 (mm³) + 表面积 (mm²)
// 约束: 负尺寸属于调用方错误，此处不校验（见 api::validator）
// ==========================================

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::domain::component::Dimensions;
use crate::domain::types::ShapeKind;

/// 1 平方英寸 = 645.16 平方毫米
pub const SQ_MM_PER_SQ_INCH: f64 = 645.16;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    pub volume_mm3: f64,
    pub surface_area_mm2: f64,
}

/// 计算体积与表面积
///
/// - Cuboid: V = L·W·H；A = 2·(LW + LH + WH)
/// - Cylindrical: r = W/2；V = π·r²·L；A = 2π·r·L + 2π·r²（含两端面）
/// - Fixed: 均为 0
pub fn measure(shape: ShapeKind, dims: Dimensions) -> Geometry {
    let Dimensions {
        length_mm: l,
        width_mm: w,
        height_mm: h,
    } = dims;

    match shape {
        ShapeKind::Cuboid => Geometry {
            volume_mm3: l * w * h,
            surface_area_mm2: 2.0 * (l * w + l * h + w * h),
        },
        ShapeKind::Cylindrical => {
            let r = w / 2.0;
            Geometry {
                volume_mm3: PI * r * r * l,
                surface_area_mm2: 2.0 * PI * r * l + 2.0 * PI * r * r,
            }
        }
        ShapeKind::Fixed => Geometry::default(),
    }
}

/// mm² → in²
pub fn mm2_to_sq_inch(area_mm2: f64) -> f64 {
    area_mm2 / SQ_MM_PER_SQ_INCH
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-6;

    fn dims(l: f64, w: f64, h: f64) -> Dimensions {
        Dimensions {
            length_mm: l,
            width_mm: w,
            height_mm: h,
        }
    }

    #[test]
    fn test_cuboid() {
        let g = measure(ShapeKind::Cuboid, dims(10.0, 20.0, 30.0));
        assert!((g.volume_mm3 - 6000.0).abs() < EPS);
        assert!((g.surface_area_mm2 - 2200.0).abs() < EPS);
    }

    #[test]
    fn test_cylinder_uses_width_as_diameter() {
        let g = measure(ShapeKind::Cylindrical, dims(20.0, 10.0, 999.0));
        assert!((g.volume_mm3 - PI * 25.0 * 20.0).abs() < EPS);
        assert!((g.volume_mm3 - 1570.796).abs() < 1e-3);
        assert!((g.surface_area_mm2 - 785.398).abs() < 1e-3);
    }

    #[test]
    fn test_cylinder_ignores_height() {
        let a = measure(ShapeKind::Cylindrical, dims(20.0, 10.0, 0.0));
        let b = measure(ShapeKind::Cylindrical, dims(20.0, 10.0, 500.0));
        assert_eq!(a, b);
    }

    #[test]
    fn test_fixed_has_no_geometry() {
        let g = measure(ShapeKind::Fixed, dims(100.0, 100.0, 100.0));
        assert_eq!(g, Geometry::default());
    }

    #[test]
    fn test_sq_inch_conversion() {
        assert!((mm2_to_sq_inch(645.16) - 1.0).abs() < EPS);
        assert!((mm2_to_sq_inch(2200.0) - 3.410_007).abs() < 1e-6);
    }
}
