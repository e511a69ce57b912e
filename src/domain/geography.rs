// ==========================================
// 申请单审批流 - 地理层级领域模型
// ==========================================
// 主数据: 无工作流语义
// ==========================================

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ==========================================
// GeographicLevel - 地理层级
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeographicLevel {
    pub id: Uuid,
    pub code: String,         // 层级编码 (唯一)
    pub name: Option<String>, // 层级名称
    pub level_number: i32,    // 层级序号 (1 = 国家级)
}

impl GeographicLevel {
    pub fn new(code: impl Into<String>, level_number: i32) -> Self {
        Self {
            id: Uuid::new_v4(),
            code: code.into(),
            name: None,
            level_number,
        }
    }

    /// 仅填充必填字段（占位值）的地理层级，供测试与种子数据使用
    pub fn with_required_defaults() -> Self {
        Self::new("GL1", 1)
    }
}

// ==========================================
// GeographicZone - 地理区域
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeographicZone {
    pub id: Uuid,
    pub code: String,
    pub name: Option<String>,
    pub level_id: Uuid,                  // 所属层级
    pub parent_id: Option<Uuid>,         // 上级区域
    pub catchment_population: Option<i64>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl GeographicZone {
    pub fn new(code: impl Into<String>, level: &GeographicLevel) -> Self {
        Self {
            id: Uuid::new_v4(),
            code: code.into(),
            name: None,
            level_id: level.id,
            parent_id: None,
            catchment_population: None,
            latitude: None,
            longitude: None,
        }
    }
}
