// ==========================================
// 申请单审批流 - 引擎层
// ==========================================
// 职责: 纯业务规则（草稿校验、状态迁移），不拼 SQL
// 红线: Engine 不访问数据库，规则结果必须可解释
// ==========================================

pub mod draft_validator;
pub mod workflow;

pub use draft_validator::{validate, FieldError, ValidationCode};
pub use workflow::{can_delete, can_skip, WorkflowAction};
