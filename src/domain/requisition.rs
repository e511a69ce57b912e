// ==========================================
// 申请单审批流 - 申请单领域模型
// ==========================================
// 红线: status 是工作流状态的唯一事实来源
// 红线: 同一 (机构, 项目, 周期) 至多一张非紧急申请单
// ==========================================

use chrono::{NaiveDateTime, SubsecRound};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::program::ProgramProduct;
use crate::domain::types::RequisitionStatus;

/// 当前时间（秒精度，与存储格式一致）
fn now_truncated() -> NaiveDateTime {
    chrono::Local::now().naive_local().trunc_subsecs(0)
}

// ==========================================
// Requisition - 申请单
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Requisition {
    pub id: Uuid,
    pub facility_id: Uuid,                 // 申请机构
    pub program_id: Uuid,                  // 所属项目
    pub processing_period_id: Uuid,        // 处理周期
    pub status: RequisitionStatus,         // 工作流状态
    pub emergency: bool,                   // 紧急申请（不受唯一性约束）
    pub created_date: NaiveDateTime,
    pub modified_date: NaiveDateTime,
    pub requisition_line_items: Vec<RequisitionLineItem>, // 明细（申请单拥有）
}

impl Requisition {
    /// 新建处于 INITIATED 状态的申请单
    pub fn initiate(
        facility_id: Uuid,
        program_id: Uuid,
        processing_period_id: Uuid,
        emergency: bool,
    ) -> Self {
        let now = now_truncated();
        Self {
            id: Uuid::new_v4(),
            facility_id,
            program_id,
            processing_period_id,
            status: RequisitionStatus::Initiated,
            emergency,
            created_date: now,
            modified_date: now,
            requisition_line_items: Vec::new(),
        }
    }

    pub fn with_status(mut self, status: RequisitionStatus) -> Self {
        self.status = status;
        self
    }

    /// 按项目产品清单生成空明细
    pub fn with_line_items_for(mut self, program_products: &[ProgramProduct]) -> Self {
        self.requisition_line_items = program_products
            .iter()
            .filter(|pp| pp.is_requisitionable())
            .map(|pp| RequisitionLineItem::new(pp.product_id))
            .collect();
        self
    }

    /// 设置状态并刷新修改时间
    pub fn set_status(&mut self, status: RequisitionStatus) {
        self.status = status;
        self.touch();
    }

    pub fn touch(&mut self) {
        self.modified_date = now_truncated();
    }

    pub fn has_line_items(&self) -> bool {
        !self.requisition_line_items.is_empty()
    }
}

// ==========================================
// RequisitionLineItem - 申请单明细
// ==========================================
// 数量字段均可为空: None 表示调用方未填写
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequisitionLineItem {
    pub id: Uuid,
    pub product_id: Uuid,
    pub beginning_balance: Option<i32>,       // 期初库存
    pub total_received_quantity: Option<i32>, // 本期收货
    pub total_consumed_quantity: Option<i32>, // 本期消耗
    pub stock_on_hand: Option<i32>,           // 期末库存
    pub requested_quantity: Option<i32>,      // 申请数量
    pub approved_quantity: Option<i32>,       // 审批数量（仅审批环节）
    pub remarks: Option<String>,              // 备注（仅审批环节）
}

impl RequisitionLineItem {
    pub fn new(product_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            product_id,
            beginning_balance: None,
            total_received_quantity: None,
            total_consumed_quantity: None,
            stock_on_hand: None,
            requested_quantity: None,
            approved_quantity: None,
            remarks: None,
        }
    }
}

// ==========================================
// RequisitionStatusChange - 状态变更记录
// ==========================================
// 用途: 审计追踪（每次状态迁移一条）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequisitionStatusChange {
    pub change_id: Uuid,
    pub requisition_id: Uuid,
    pub status_from: Option<RequisitionStatus>, // 发起时为 None
    pub status_to: RequisitionStatus,
    pub changed_at: NaiveDateTime,
    pub detail: Option<String>,
}

impl RequisitionStatusChange {
    pub fn new(
        requisition_id: Uuid,
        status_from: Option<RequisitionStatus>,
        status_to: RequisitionStatus,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            change_id: Uuid::new_v4(),
            requisition_id,
            status_from,
            status_to,
            changed_at: now_truncated(),
            detail: Some(detail.into()),
        }
    }
}

// ==========================================
// RequisitionSearchCriteria - 查询条件
// ==========================================
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequisitionSearchCriteria {
    pub facility_id: Option<Uuid>,
    pub program_id: Option<Uuid>,
    pub processing_period_id: Option<Uuid>,
    pub status: Option<RequisitionStatus>,
}
