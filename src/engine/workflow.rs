// ==========================================
// 申请单审批流 - 状态迁移规则
// ==========================================
// 职责: 定义工作流动作的前置状态与目标状态
// 红线: 无状态、无副作用、无 I/O 操作
// ==========================================
// 迁移图:
//   (无) --initiate--> INITIATED --submit--> SUBMITTED --authorize--> AUTHORIZED
//   审批环节状态 --approve--> APPROVED
//   AUTHORIZED --reject--> INITIATED
//   INITIATED --skip--> SKIPPED           (项目允许跳过周期)
//   任意 --release--> RELEASED
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::RequisitionSettings;
use crate::domain::program::Program;
use crate::domain::types::RequisitionStatus;

// ==========================================
// WorkflowAction - 工作流动作
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkflowAction {
    Initiate,
    Submit,
    Authorize,
    Approve,
    Reject,
    Skip,
    Release,
}

impl WorkflowAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowAction::Initiate => "INITIATE",
            WorkflowAction::Submit => "SUBMIT",
            WorkflowAction::Authorize => "AUTHORIZE",
            WorkflowAction::Approve => "APPROVE",
            WorkflowAction::Reject => "REJECT",
            WorkflowAction::Skip => "SKIP",
            WorkflowAction::Release => "RELEASE",
        }
    }

    /// 动作完成后的状态
    pub fn target_status(&self) -> RequisitionStatus {
        match self {
            WorkflowAction::Initiate | WorkflowAction::Reject => RequisitionStatus::Initiated,
            WorkflowAction::Submit => RequisitionStatus::Submitted,
            WorkflowAction::Authorize => RequisitionStatus::Authorized,
            WorkflowAction::Approve => RequisitionStatus::Approved,
            WorkflowAction::Skip => RequisitionStatus::Skipped,
            WorkflowAction::Release => RequisitionStatus::Released,
        }
    }

    /// 动作要求的当前状态
    ///
    /// # 返回
    /// - `None`: 无前置状态要求（发起、下达）
    pub fn required_status(&self, settings: &RequisitionSettings) -> Option<RequisitionStatus> {
        match self {
            WorkflowAction::Initiate | WorkflowAction::Release => None,
            WorkflowAction::Submit | WorkflowAction::Skip => Some(RequisitionStatus::Initiated),
            WorkflowAction::Authorize => Some(RequisitionStatus::Submitted),
            WorkflowAction::Approve => Some(settings.approval_step_status()),
            WorkflowAction::Reject => Some(RequisitionStatus::Authorized),
        }
    }

    /// 当前状态是否允许执行动作
    ///
    /// 有前置状态要求时必须相等；无要求时终态申请单不可再变更。
    pub fn is_allowed_from(&self, current: RequisitionStatus, settings: &RequisitionSettings) -> bool {
        match self.required_status(settings) {
            Some(required) => required == current,
            None => !current.is_terminal(),
        }
    }
}

impl fmt::Display for WorkflowAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 仅 INITIATED 状态的申请单可删除
pub fn can_delete(status: RequisitionStatus) -> bool {
    status == RequisitionStatus::Initiated
}

/// 项目允许跳过周期且申请单处于 INITIATED 时可跳过
pub fn can_skip(program: &Program, status: RequisitionStatus) -> bool {
    program.periods_skippable && status == RequisitionStatus::Initiated
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_STATUSES: [RequisitionStatus; 6] = [
        RequisitionStatus::Initiated,
        RequisitionStatus::Submitted,
        RequisitionStatus::Authorized,
        RequisitionStatus::Approved,
        RequisitionStatus::Skipped,
        RequisitionStatus::Released,
    ];

    #[test]
    fn test_reject_only_from_authorized() {
        let settings = RequisitionSettings::default();
        for status in ALL_STATUSES {
            assert_eq!(
                WorkflowAction::Reject.is_allowed_from(status, &settings),
                status == RequisitionStatus::Authorized,
                "status={}",
                status
            );
        }
        assert_eq!(WorkflowAction::Reject.target_status(), RequisitionStatus::Initiated);
    }

    #[test]
    fn test_authorize_only_from_submitted() {
        let settings = RequisitionSettings::default();
        for status in ALL_STATUSES {
            assert_eq!(
                WorkflowAction::Authorize.is_allowed_from(status, &settings),
                status == RequisitionStatus::Submitted
            );
        }
    }

    #[test]
    fn test_approve_follows_skip_authorization() {
        let normal = RequisitionSettings::default();
        let skip = RequisitionSettings { skip_authorization: true };

        assert!(WorkflowAction::Approve.is_allowed_from(RequisitionStatus::Authorized, &normal));
        assert!(!WorkflowAction::Approve.is_allowed_from(RequisitionStatus::Submitted, &normal));
        assert!(WorkflowAction::Approve.is_allowed_from(RequisitionStatus::Submitted, &skip));
        assert!(!WorkflowAction::Approve.is_allowed_from(RequisitionStatus::Authorized, &skip));
    }

    #[test]
    fn test_release_allowed_from_any_non_terminal_status() {
        let settings = RequisitionSettings::default();
        for status in ALL_STATUSES {
            assert_eq!(
                WorkflowAction::Release.is_allowed_from(status, &settings),
                !matches!(status, RequisitionStatus::Skipped | RequisitionStatus::Released),
                "status={}",
                status
            );
        }
    }

    #[test]
    fn test_delete_and_skip_guards() {
        let mut program = Program::new("P1");
        assert!(can_delete(RequisitionStatus::Initiated));
        assert!(!can_delete(RequisitionStatus::Submitted));

        assert!(!can_skip(&program, RequisitionStatus::Initiated));
        program.periods_skippable = true;
        assert!(can_skip(&program, RequisitionStatus::Initiated));
        assert!(!can_skip(&program, RequisitionStatus::Authorized));
    }
}
