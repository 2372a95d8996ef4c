// ==========================================
// 精密报价系统 - 领域类型定义
// ==========================================
// 职责: 定义零件形状枚举及其解析/存储规则
// 红线: 未知形状必须拒绝，不得静默按长方体计算
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// ==========================================
// 零件形状 (Shape Kind)
// ==========================================
// 决定几何公式与适用的成本项
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShapeKind {
    Cuboid,      // 长方体: 长 × 宽 × 高
    Cylindrical, // 圆柱体: 宽度字段为直径，高度不用
    Fixed,       // 外购/定价件: 使用手工单价，无几何
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

/// 无法识别的形状标签
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("未知的零件形状: {0}")]
pub struct UnknownShapeError(pub String);

impl FromStr for ShapeKind {
    type Err = UnknownShapeError;

    /// 大小写不敏感；`Cylinder` 作为 `Cylindrical` 的别名
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "CUBOID" => Ok(ShapeKind::Cuboid),
            "CYLINDRICAL" | "CYLINDER" => Ok(ShapeKind::Cylindrical),
            "FIXED" => Ok(ShapeKind::Fixed),
            _ => Err(UnknownShapeError(s.to_string())),
        }
    }
}

impl ShapeKind {
    /// 转换为数据库存储的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            ShapeKind::Cuboid => "CUBOID",
            ShapeKind::Cylindrical => "CYLINDRICAL",
            ShapeKind::Fixed => "FIXED",
        }
    }
}
