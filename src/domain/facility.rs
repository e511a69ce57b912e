// ==========================================
// 申请单审批流 - 机构领域模型
// ==========================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::geography::GeographicZone;

// ==========================================
// FacilityType - 机构类型
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacilityType {
    pub id: Uuid,
    pub code: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub display_order: Option<i32>,
    pub active: bool,
}

impl FacilityType {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            code: code.into(),
            name: None,
            description: None,
            display_order: None,
            active: true,
        }
    }
}

// ==========================================
// FacilityOperator - 机构运营方
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacilityOperator {
    pub id: Uuid,
    pub code: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub display_order: Option<i32>,
}

// ==========================================
// Facility - 机构
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Facility {
    pub id: Uuid,
    pub code: String,                     // 机构编码 (唯一)
    pub name: Option<String>,
    pub description: Option<String>,
    pub geographic_zone_id: Uuid,         // 所属区域
    pub type_id: Uuid,                    // 机构类型
    pub operated_by_id: Option<Uuid>,     // 运营方
    pub active: bool,
    pub go_live_date: Option<NaiveDate>,
    pub go_down_date: Option<NaiveDate>,
    pub comment: Option<String>,
    pub enabled: bool,
}

impl Facility {
    pub fn new(code: impl Into<String>, zone: &GeographicZone, facility_type: &FacilityType) -> Self {
        Self {
            id: Uuid::new_v4(),
            code: code.into(),
            name: None,
            description: None,
            geographic_zone_id: zone.id,
            type_id: facility_type.id,
            operated_by_id: None,
            active: true,
            go_live_date: None,
            go_down_date: None,
            comment: None,
            enabled: true,
        }
    }

    /// 是否可发起申请（启用且有效）
    pub fn is_operational(&self) -> bool {
        self.active && self.enabled
    }
}
