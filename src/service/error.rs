// ==========================================
// 申请单审批流 - 服务层错误类型
// ==========================================
// 职责: 将仓储/配置错误转换为工作流错误
// 说明: 前置状态不满足时 try_delete/skip 返回 false，其余动作返回 InvalidStatus
// ==========================================

use crate::domain::types::RequisitionStatus;
use crate::engine::WorkflowAction;
use crate::repository::error::RepositoryError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("资源未找到: {entity}(id={id})")]
    NotFound { entity: String, id: String },

    #[error("无效的状态转换: requisition={id}, action={action}, current={current}, expected={expected}")]
    InvalidStatus {
        id: Uuid,
        action: WorkflowAction,
        current: RequisitionStatus,
        expected: RequisitionStatus,
    },

    #[error("申请单已存在: facility={facility_id}, program={program_id}, period={processing_period_id}")]
    AlreadyExists {
        facility_id: Uuid,
        program_id: Uuid,
        processing_period_id: Uuid,
    },

    /// 校验后申请单状态被其他写入改变，草稿未保存
    #[error("申请单已被并发修改: {id}")]
    Conflict { id: Uuid },

    #[error("配置读取失败: {0}")]
    Config(String),

    #[error(transparent)]
    Repository(RepositoryError),
}

impl ServiceError {
    pub fn requisition_not_found(id: &Uuid) -> Self {
        ServiceError::NotFound {
            entity: "Requisition".to_string(),
            id: id.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ServiceError::NotFound { .. })
    }
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => ServiceError::NotFound { entity, id },
            other => ServiceError::Repository(other),
        }
    }
}

/// Result 类型别名
pub type ServiceResult<T> = Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_not_found_maps_to_not_found() {
        let err: ServiceError = RepositoryError::NotFound {
            entity: "Requisition".to_string(),
            id: "r1".to_string(),
        }
        .into();
        assert!(err.is_not_found());
        assert!(err.to_string().contains("r1"));
    }

    #[test]
    fn test_other_repository_errors_pass_through() {
        let err: ServiceError = RepositoryError::LockError("poisoned".to_string()).into();
        assert!(matches!(err, ServiceError::Repository(RepositoryError::LockError(_))));
        assert!(err.to_string().contains("poisoned"));
    }

    #[test]
    fn test_conflict_is_not_not_found() {
        let err = ServiceError::Conflict { id: Uuid::nil() };
        assert!(!err.is_not_found());
        assert!(err.to_string().contains(&Uuid::nil().to_string()));
    }

    #[test]
    fn test_invalid_status_message_names_both_states() {
        let err = ServiceError::InvalidStatus {
            id: Uuid::nil(),
            action: WorkflowAction::Authorize,
            current: RequisitionStatus::Initiated,
            expected: RequisitionStatus::Submitted,
        };
        let msg = err.to_string();
        assert!(msg.contains("INITIATED"));
        assert!(msg.contains("SUBMITTED"));
        assert!(msg.contains("AUTHORIZE"));
    }
}
