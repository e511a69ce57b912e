// ==========================================
// 申请单审批流 - 服务层
// ==========================================
// 职责: 编排仓储与引擎，对外提供工作流操作
// ==========================================

pub mod error;
pub mod requisition_service;

pub use error::{ServiceError, ServiceResult};
pub use requisition_service::{DraftOutcome, RequisitionService};
