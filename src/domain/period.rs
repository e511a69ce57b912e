// ==========================================
// 申请单审批流 - 周期与计划表领域模型
// ==========================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ==========================================
// ProcessingSchedule - 处理计划表
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingSchedule {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
}

impl ProcessingSchedule {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            code: code.into(),
            name: name.into(),
            description: None,
        }
    }
}

// ==========================================
// ProcessingPeriod - 处理周期
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingPeriod {
    pub id: Uuid,
    pub processing_schedule_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl ProcessingPeriod {
    pub fn new(
        schedule: &ProcessingSchedule,
        name: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            processing_schedule_id: schedule.id,
            name: name.into(),
            description: None,
            start_date,
            end_date,
        }
    }

    /// 周期天数（含首尾）
    pub fn duration_days(&self) -> i64 {
        (self.end_date - self.start_date).num_days() + 1
    }
}
