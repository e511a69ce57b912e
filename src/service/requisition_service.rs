// ==========================================
// 申请单审批流 - 申请单服务
// ==========================================
// 职责: 编排工作流（加载 → 校验前置状态 → 变更 → 保存 → 记录）
// 红线: 状态迁移规则只来自 engine::workflow
// 红线: 草稿校验失败不落库
// ==========================================
// 说明: try_delete / skip 前置条件不满足时返回 false；
//       submit / authorize / approve / reject 返回 InvalidStatus
// ==========================================

use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::{RequisitionConfigReader, RequisitionSettings};
use crate::domain::program::Program;
use crate::domain::requisition::{Requisition, RequisitionSearchCriteria, RequisitionStatusChange};
use crate::domain::types::RequisitionStatus;
use crate::engine::{can_delete, can_skip, draft_validator, FieldError, WorkflowAction};
use crate::repository::error::RepositoryError;
use crate::repository::{
    FacilityRepository, PeriodRepository, ProgramRepository, RequisitionRepository,
    RequisitionStatusChangeRepository, RequisitionTemplateRepository,
};
use crate::service::error::{ServiceError, ServiceResult};

// ==========================================
// DraftOutcome - 草稿保存结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DraftOutcome {
    /// 校验通过并已保存
    Saved(Requisition),
    /// 校验失败，未保存
    Rejected(Vec<FieldError>),
}

impl DraftOutcome {
    pub fn is_saved(&self) -> bool {
        matches!(self, DraftOutcome::Saved(_))
    }
}

// ==========================================
// RequisitionService - 申请单服务
// ==========================================
pub struct RequisitionService {
    requisition_repo: Arc<RequisitionRepository>,
    template_repo: Arc<RequisitionTemplateRepository>,
    status_change_repo: Arc<RequisitionStatusChangeRepository>,
    program_repo: Arc<ProgramRepository>,
    facility_repo: Arc<FacilityRepository>,
    period_repo: Arc<PeriodRepository>,
    settings: RwLock<RequisitionSettings>,
}

impl RequisitionService {
    pub fn new(
        requisition_repo: Arc<RequisitionRepository>,
        template_repo: Arc<RequisitionTemplateRepository>,
        status_change_repo: Arc<RequisitionStatusChangeRepository>,
        program_repo: Arc<ProgramRepository>,
        facility_repo: Arc<FacilityRepository>,
        period_repo: Arc<PeriodRepository>,
        settings: RequisitionSettings,
    ) -> Self {
        Self {
            requisition_repo,
            template_repo,
            status_change_repo,
            program_repo,
            facility_repo,
            period_repo,
            settings: RwLock::new(settings),
        }
    }

    // ==========================================
    // 配置
    // ==========================================

    /// 当前配置快照
    pub fn settings(&self) -> RequisitionSettings {
        match self.settings.read() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    /// 替换配置（配置中心变更后调用）
    pub fn update_settings(&self, settings: RequisitionSettings) {
        match self.settings.write() {
            Ok(mut guard) => *guard = settings,
            Err(poisoned) => *poisoned.into_inner() = settings,
        }
        tracing::info!(skip_authorization = settings.skip_authorization, "申请单配置已更新");
    }

    /// 从配置源重新加载配置
    pub async fn reload_settings(
        &self,
        reader: &dyn RequisitionConfigReader,
    ) -> ServiceResult<RequisitionSettings> {
        let settings = RequisitionSettings::load(reader)
            .await
            .map_err(|e| ServiceError::Config(e.to_string()))?;
        self.update_settings(settings);
        Ok(settings)
    }

    // ==========================================
    // 发起 / 删除 / 跳过
    // ==========================================

    /// 发起申请单
    ///
    /// # 规则
    /// - 机构、项目、周期必须存在
    /// - 非紧急申请单: 同一 (机构, 项目, 周期) 至多一张
    /// - 明细按项目产品清单预填（仅启用的全额供应产品）
    ///
    /// # 返回
    /// - Ok(Requisition): 新建的 INITIATED 申请单
    /// - Err(AlreadyExists): 已存在非紧急申请单
    pub fn initiate_requisition(
        &self,
        facility_id: Uuid,
        program_id: Uuid,
        processing_period_id: Uuid,
        emergency: bool,
    ) -> ServiceResult<Requisition> {
        if self.facility_repo.find_by_id(&facility_id)?.is_none() {
            return Err(not_found("Facility", &facility_id));
        }
        self.load_program(&program_id)?;
        if self.period_repo.find_by_id(&processing_period_id)?.is_none() {
            return Err(not_found("ProcessingPeriod", &processing_period_id));
        }

        let already_exists = || ServiceError::AlreadyExists {
            facility_id,
            program_id,
            processing_period_id,
        };

        if !emergency
            && self
                .requisition_repo
                .find_by_facility_program_period(&facility_id, &program_id, &processing_period_id)?
                .is_some()
        {
            tracing::warn!(
                %facility_id, %program_id, %processing_period_id,
                "申请单已存在，拒绝重复发起"
            );
            return Err(already_exists());
        }

        let program_products = self.program_repo.list_program_products(&program_id)?;
        let requisition =
            Requisition::initiate(facility_id, program_id, processing_period_id, emergency)
                .with_line_items_for(&program_products);

        match self.requisition_repo.insert(&requisition) {
            Ok(()) => {}
            // 并发发起时由唯一索引兜底
            Err(RepositoryError::UniqueConstraintViolation(_)) => return Err(already_exists()),
            Err(e) => return Err(e.into()),
        }

        tracing::info!(
            requisition_id = %requisition.id,
            emergency,
            line_items = requisition.requisition_line_items.len(),
            "申请单已发起"
        );
        self.record_change(&requisition, None, WorkflowAction::Initiate);

        Ok(requisition)
    }

    /// 尝试删除申请单
    ///
    /// # 返回
    /// - Ok(true): 状态为 INITIATED，已删除
    /// - Ok(false): 其他状态，未做任何修改
    /// - Err(NotFound): 申请单不存在
    pub fn try_delete(&self, requisition_id: Uuid) -> ServiceResult<bool> {
        let requisition = self.load_requisition(&requisition_id)?;

        if !can_delete(requisition.status) {
            tracing::info!(
                %requisition_id,
                status = %requisition.status,
                "申请单非 INITIATED 状态，不可删除"
            );
            return Ok(false);
        }

        let deleted = self
            .requisition_repo
            .delete_if_status(&requisition_id, requisition.status)?;
        if deleted {
            tracing::info!(%requisition_id, "申请单已删除");
        } else {
            tracing::info!(%requisition_id, "申请单状态已变更，未删除");
        }
        Ok(deleted)
    }

    /// 跳过周期
    ///
    /// # 返回
    /// - Ok(true): 项目允许跳过且状态为 INITIATED，已置为 SKIPPED
    /// - Ok(false): 前置条件不满足，未做任何修改
    /// - Err(NotFound): 申请单或项目不存在
    pub fn skip(&self, requisition_id: Uuid) -> ServiceResult<bool> {
        let mut requisition = self.load_requisition(&requisition_id)?;
        let program = self.load_program(&requisition.program_id)?;

        if !can_skip(&program, requisition.status) {
            tracing::info!(
                %requisition_id,
                status = %requisition.status,
                periods_skippable = program.periods_skippable,
                "申请单不满足跳过条件"
            );
            return Ok(false);
        }

        let skipped = self.apply(&mut requisition, WorkflowAction::Skip)?;
        if !skipped {
            tracing::info!(%requisition_id, "申请单状态已变更，未跳过");
        }
        Ok(skipped)
    }

    // ==========================================
    // 审批流转
    // ==========================================

    /// 提交: INITIATED → SUBMITTED
    pub fn submit(&self, requisition_id: Uuid) -> ServiceResult<Requisition> {
        self.transition(requisition_id, WorkflowAction::Submit)
    }

    /// 授权: SUBMITTED → AUTHORIZED
    pub fn authorize(&self, requisition_id: Uuid) -> ServiceResult<Requisition> {
        self.transition(requisition_id, WorkflowAction::Authorize)
    }

    /// 审批: 审批环节状态 → APPROVED
    pub fn approve(&self, requisition_id: Uuid) -> ServiceResult<Requisition> {
        self.transition(requisition_id, WorkflowAction::Approve)
    }

    /// 驳回: AUTHORIZED → INITIATED
    pub fn reject(&self, requisition_id: Uuid) -> ServiceResult<Requisition> {
        self.transition(requisition_id, WorkflowAction::Reject)
    }

    /// 批量下达为订单
    ///
    /// 按 id 重新加载后逐张置为 RELEASED，只改状态不改明细。
    /// 终态（SKIPPED / RELEASED）申请单保持不变，不计入返回结果。
    /// 无跨申请单原子性: 申请单不存在时返回 NotFound 并中止，
    /// 之前的申请单保持已下达。
    pub fn release_requisitions_as_order(
        &self,
        requisitions: &[Requisition],
    ) -> ServiceResult<Vec<Requisition>> {
        let settings = self.settings();
        let mut released = Vec::with_capacity(requisitions.len());

        for requisition in requisitions {
            let mut stored = self.load_requisition(&requisition.id)?;

            if !WorkflowAction::Release.is_allowed_from(stored.status, &settings) {
                tracing::warn!(
                    requisition_id = %stored.id,
                    status = %stored.status,
                    "终态申请单不可下达，已跳过"
                );
                continue;
            }
            if !self.apply(&mut stored, WorkflowAction::Release)? {
                tracing::warn!(requisition_id = %stored.id, "申请单状态已变更，未下达");
                continue;
            }
            released.push(stored);
        }

        if !released.is_empty() {
            tracing::info!(count = released.len(), "申请单已下达为订单");
        }
        Ok(released)
    }

    // ==========================================
    // 草稿
    // ==========================================

    /// 校验草稿（不落库）
    pub fn validate_draft(&self, requisition: &Requisition) -> ServiceResult<Vec<FieldError>> {
        let template = self
            .template_repo
            .get_template_for_program(&requisition.program_id)?;
        Ok(draft_validator::validate(
            requisition,
            template.as_ref(),
            &self.settings(),
        ))
    }

    /// 保存草稿明细
    ///
    /// # 规则
    /// - 以已存储的状态为准校验（调用方传入的状态被忽略）
    /// - 校验失败返回全部字段错误，不保存
    /// - 只更新明细，不改变状态
    pub fn save_draft(&self, draft: &Requisition) -> ServiceResult<DraftOutcome> {
        let mut stored = self.load_requisition(&draft.id)?;
        stored.requisition_line_items = draft.requisition_line_items.clone();

        let errors = self.validate_draft(&stored)?;
        if !errors.is_empty() {
            tracing::info!(
                requisition_id = %draft.id,
                errors = errors.len(),
                "草稿校验未通过，未保存"
            );
            return Ok(DraftOutcome::Rejected(errors));
        }

        stored.touch();
        if !self.requisition_repo.update_line_items(&stored)? {
            // 校验所依据的状态已失效
            let current = self.load_requisition(&stored.id)?;
            tracing::warn!(
                requisition_id = %stored.id,
                validated = %stored.status,
                current = %current.status,
                "申请单状态已变更，草稿未保存"
            );
            return Err(ServiceError::Conflict { id: stored.id });
        }
        tracing::debug!(requisition_id = %stored.id, "草稿已保存");
        Ok(DraftOutcome::Saved(stored))
    }

    // ==========================================
    // 查询
    // ==========================================

    pub fn get_requisition(&self, requisition_id: Uuid) -> ServiceResult<Requisition> {
        self.load_requisition(&requisition_id)
    }

    pub fn search_requisitions(
        &self,
        criteria: &RequisitionSearchCriteria,
    ) -> ServiceResult<Vec<Requisition>> {
        Ok(self.requisition_repo.search(criteria)?)
    }

    /// 状态变更历史（申请单删除后仍可查询）
    pub fn status_history(&self, requisition_id: Uuid) -> ServiceResult<Vec<RequisitionStatusChange>> {
        Ok(self.status_change_repo.list_by_requisition(&requisition_id)?)
    }

    // ==========================================
    // 内部辅助
    // ==========================================

    fn load_requisition(&self, id: &Uuid) -> ServiceResult<Requisition> {
        self.requisition_repo
            .find_by_id(id)?
            .ok_or_else(|| ServiceError::requisition_not_found(id))
    }

    fn load_program(&self, id: &Uuid) -> ServiceResult<Program> {
        self.program_repo
            .find_by_id(id)?
            .ok_or_else(|| not_found("Program", id))
    }

    /// 校验前置状态后执行迁移
    fn transition(&self, requisition_id: Uuid, action: WorkflowAction) -> ServiceResult<Requisition> {
        let settings = self.settings();
        let mut requisition = self.load_requisition(&requisition_id)?;

        if !action.is_allowed_from(requisition.status, &settings) {
            return Err(invalid_status(requisition_id, action, requisition.status, &settings));
        }

        if !self.apply(&mut requisition, action)? {
            // 加载后状态被其他写入改变
            let current = self.load_requisition(&requisition_id)?;
            return Err(invalid_status(requisition_id, action, current.status, &settings));
        }
        Ok(requisition)
    }

    /// 以当前状态为条件写入迁移
    ///
    /// # 返回
    /// - Ok(true): 已迁移并记录
    /// - Ok(false): 存储中的状态已不是 requisition.status，未做修改
    fn apply(&self, requisition: &mut Requisition, action: WorkflowAction) -> ServiceResult<bool> {
        let from = requisition.status;
        let to = action.target_status();
        let mut updated = requisition.clone();
        updated.set_status(to);

        if !self
            .requisition_repo
            .update_status(&updated.id, from, to, &updated.modified_date)?
        {
            return Ok(false);
        }
        *requisition = updated;

        tracing::info!(
            requisition_id = %requisition.id,
            %action,
            from = %from,
            to = %to,
            "申请单状态已变更"
        );
        self.record_change(requisition, Some(from), action);
        Ok(true)
    }

    /// 记录状态变更（失败只告警，不回滚主流程）
    fn record_change(
        &self,
        requisition: &Requisition,
        from: Option<RequisitionStatus>,
        action: WorkflowAction,
    ) {
        let change =
            RequisitionStatusChange::new(requisition.id, from, requisition.status, action.as_str());
        if let Err(e) = self.status_change_repo.insert(&change) {
            tracing::warn!("记录状态变更失败: {}", e);
        }
    }
}

fn invalid_status(
    id: Uuid,
    action: WorkflowAction,
    current: RequisitionStatus,
    settings: &RequisitionSettings,
) -> ServiceError {
    let expected = action.required_status(settings).unwrap_or(current);
    tracing::warn!(
        requisition_id = %id,
        %action,
        %current,
        %expected,
        "申请单状态不满足迁移条件"
    );
    ServiceError::InvalidStatus {
        id,
        action,
        current,
        expected,
    }
}

fn not_found(entity: &str, id: &Uuid) -> ServiceError {
    ServiceError::NotFound {
        entity: entity.to_string(),
        id: id.to_string(),
    }
}
