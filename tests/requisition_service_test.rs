// ==========================================
// RequisitionService 集成测试
// ==========================================
// 测试目标: 工作流迁移、删除/跳过的布尔语义、批量下达、状态变更记录
// ==========================================


use openlmis_requisition::config::RequisitionSettings;
use openlmis_requisition::domain::{RequisitionSearchCriteria, RequisitionStatus};
use openlmis_requisition::engine::WorkflowAction;
use openlmis_requisition::service::ServiceError;
use test_helpers::TestWorld;
use uuid::Uuid;

const ALL_STATUSES: [RequisitionStatus; 6] = [
    RequisitionStatus::Initiated,
    RequisitionStatus::Submitted,
    RequisitionStatus::Authorized,
    RequisitionStatus::Approved,
    RequisitionStatus::Skipped,
    RequisitionStatus::Released,
];

fn default_settings() -> RequisitionSettings {
    RequisitionSettings::default()
}

// ==========================================
// 发起
// ==========================================

#[test]
fn test_initiate_creates_initiated_requisition_with_line_items() {
    let world = TestWorld::new();
    let service = world.service(default_settings());

    let requisition = service
        .initiate_requisition(world.facility.id, world.program.id, world.period.id, false)
        .unwrap();

    assert_eq!(requisition.status, RequisitionStatus::Initiated);
    assert!(!requisition.emergency);

    // 仅启用产品，按 display_order 排序
    let products: Vec<_> = requisition
        .requisition_line_items
        .iter()
        .map(|i| i.product_id)
        .collect();
    assert_eq!(
        products,
        vec![world.program_products[1].product_id, world.program_products[0].product_id]
    );

    let stored = world.reload(&requisition).unwrap();
    assert_eq!(stored, requisition);
}

#[test]
fn test_initiate_fails_when_requisition_exists() {
    let world = TestWorld::new();
    let service = world.service(default_settings());
    world.insert_requisition(RequisitionStatus::Submitted);

    let err = service
        .initiate_requisition(world.facility.id, world.program.id, world.period.id, false)
        .unwrap_err();

    assert!(matches!(err, ServiceError::AlreadyExists { .. }));
}

#[test]
fn test_emergency_requisition_bypasses_uniqueness() {
    let world = TestWorld::new();
    let service = world.service(default_settings());
    world.insert_requisition(RequisitionStatus::Initiated);

    let first = service
        .initiate_requisition(world.facility.id, world.program.id, world.period.id, true)
        .unwrap();
    let second = service
        .initiate_requisition(world.facility.id, world.program.id, world.period.id, true)
        .unwrap();

    assert!(first.emergency && second.emergency);
    assert_ne!(first.id, second.id);
}

#[test]
fn test_initiate_unknown_references_are_not_found() {
    let world = TestWorld::new();
    let service = world.service(default_settings());

    let err = service
        .initiate_requisition(Uuid::new_v4(), world.program.id, world.period.id, false)
        .unwrap_err();
    assert!(err.is_not_found());

    let err = service
        .initiate_requisition(world.facility.id, Uuid::new_v4(), world.period.id, false)
        .unwrap_err();
    assert!(err.is_not_found());

    let err = service
        .initiate_requisition(world.facility.id, world.program.id, Uuid::new_v4(), false)
        .unwrap_err();
    assert!(err.is_not_found());
}

// ==========================================
// 删除
// ==========================================

#[test]
fn test_try_delete_initiated_removes_requisition() {
    let world = TestWorld::new();
    let service = world.service(default_settings());
    let requisition = world.insert_requisition(RequisitionStatus::Initiated);

    assert!(service.try_delete(requisition.id).unwrap());
    assert!(world.reload(&requisition).is_none());
}

#[test]
fn test_try_delete_other_statuses_returns_false_without_change() {
    for status in ALL_STATUSES.into_iter().filter(|s| *s != RequisitionStatus::Initiated) {
        let world = TestWorld::new();
        let service = world.service(default_settings());
        let requisition = world.insert_requisition(status);

        assert!(!service.try_delete(requisition.id).unwrap(), "status={}", status);
        assert_eq!(world.reload(&requisition).unwrap(), requisition);
    }
}

#[test]
fn test_try_delete_missing_is_not_found() {
    let world = TestWorld::new();
    let service = world.service(default_settings());

    let err = service.try_delete(Uuid::new_v4()).unwrap_err();
    assert!(err.is_not_found());
}

// ==========================================
// 跳过
// ==========================================

#[test]
fn test_skip_when_program_allows_and_initiated() {
    let world = TestWorld::new();
    let service = world.service(default_settings());
    let requisition = world.insert_requisition(RequisitionStatus::Initiated);

    assert!(service.skip(requisition.id).unwrap());
    assert_eq!(
        world.reload(&requisition).unwrap().status,
        RequisitionStatus::Skipped
    );
}

#[test]
fn test_skip_refused_when_program_not_skippable() {
    let mut world = TestWorld::new();
    world.set_periods_skippable(false);
    let service = world.service(default_settings());
    let requisition = world.insert_requisition(RequisitionStatus::Initiated);

    assert!(!service.skip(requisition.id).unwrap());
    assert_eq!(
        world.reload(&requisition).unwrap().status,
        RequisitionStatus::Initiated
    );
}

#[test]
fn test_skip_refused_outside_initiated() {
    for status in ALL_STATUSES.into_iter().filter(|s| *s != RequisitionStatus::Initiated) {
        let world = TestWorld::new();
        let service = world.service(default_settings());
        let requisition = world.insert_requisition(status);

        assert!(!service.skip(requisition.id).unwrap());
        assert_eq!(world.reload(&requisition).unwrap().status, status);
    }
}

#[test]
fn test_skip_missing_is_not_found() {
    let world = TestWorld::new();
    let service = world.service(default_settings());
    assert!(service.skip(Uuid::new_v4()).unwrap_err().is_not_found());
}

// ==========================================
// 驳回 / 授权 / 提交 / 审批
// ==========================================

#[test]
fn test_reject_returns_authorized_to_initiated() {
    let world = TestWorld::new();
    let service = world.service(default_settings());
    let requisition = world.insert_requisition(RequisitionStatus::Authorized);

    let rejected = service.reject(requisition.id).unwrap();

    assert_eq!(rejected.status, RequisitionStatus::Initiated);
    assert_eq!(
        world.reload(&requisition).unwrap().status,
        RequisitionStatus::Initiated
    );
}

#[test]
fn test_reject_fails_from_every_other_status() {
    for status in ALL_STATUSES.into_iter().filter(|s| *s != RequisitionStatus::Authorized) {
        let world = TestWorld::new();
        let service = world.service(default_settings());
        let requisition = world.insert_requisition(status);

        let err = service.reject(requisition.id).unwrap_err();
        match err {
            ServiceError::InvalidStatus { current, expected, action, .. } => {
                assert_eq!(current, status);
                assert_eq!(expected, RequisitionStatus::Authorized);
                assert_eq!(action, WorkflowAction::Reject);
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(world.reload(&requisition).unwrap().status, status);
    }
}

#[test]
fn test_authorize_moves_submitted_to_authorized() {
    let world = TestWorld::new();
    let service = world.service(default_settings());
    let requisition = world.insert_requisition(RequisitionStatus::Submitted);

    assert_eq!(
        service.authorize(requisition.id).unwrap().status,
        RequisitionStatus::Authorized
    );
}

#[test]
fn test_authorize_fails_from_every_other_status() {
    for status in ALL_STATUSES.into_iter().filter(|s| *s != RequisitionStatus::Submitted) {
        let world = TestWorld::new();
        let service = world.service(default_settings());
        let requisition = world.insert_requisition(status);

        let err = service.authorize(requisition.id).unwrap_err();
        assert!(matches!(err, ServiceError::InvalidStatus { .. }), "status={}", status);
        assert_eq!(world.reload(&requisition).unwrap().status, status);
    }
}

#[test]
fn test_transitions_on_missing_requisition_are_not_found() {
    let world = TestWorld::new();
    let service = world.service(default_settings());
    let missing = Uuid::new_v4();

    assert!(service.reject(missing).unwrap_err().is_not_found());
    assert!(service.authorize(missing).unwrap_err().is_not_found());
    assert!(service.submit(missing).unwrap_err().is_not_found());
    assert!(service.approve(missing).unwrap_err().is_not_found());
}

#[test]
fn test_full_workflow_to_approved() {
    let world = TestWorld::new();
    let service = world.service(default_settings());

    let requisition = service
        .initiate_requisition(world.facility.id, world.program.id, world.period.id, false)
        .unwrap();
    service.submit(requisition.id).unwrap();

    // 未授权不能审批
    assert!(matches!(
        service.approve(requisition.id).unwrap_err(),
        ServiceError::InvalidStatus { expected: RequisitionStatus::Authorized, .. }
    ));

    service.authorize(requisition.id).unwrap();
    let approved = service.approve(requisition.id).unwrap();
    assert_eq!(approved.status, RequisitionStatus::Approved);

    let history: Vec<_> = service
        .status_history(requisition.id)
        .unwrap()
        .into_iter()
        .map(|c| (c.status_from, c.status_to))
        .collect();
    assert_eq!(
        history,
        vec![
            (None, RequisitionStatus::Initiated),
            (Some(RequisitionStatus::Initiated), RequisitionStatus::Submitted),
            (Some(RequisitionStatus::Submitted), RequisitionStatus::Authorized),
            (Some(RequisitionStatus::Authorized), RequisitionStatus::Approved),
        ]
    );
}

#[test]
fn test_skip_authorization_approves_from_submitted() {
    let world = TestWorld::new();
    let service = world.service(RequisitionSettings { skip_authorization: true });
    let requisition = world.insert_requisition(RequisitionStatus::Submitted);

    assert_eq!(
        service.approve(requisition.id).unwrap().status,
        RequisitionStatus::Approved
    );
}

#[test]
fn test_submit_only_from_initiated() {
    let world = TestWorld::new();
    let service = world.service(default_settings());
    let requisition = world.insert_requisition(RequisitionStatus::Submitted);

    assert!(matches!(
        service.submit(requisition.id).unwrap_err(),
        ServiceError::InvalidStatus { expected: RequisitionStatus::Initiated, .. }
    ));
}

// ==========================================
// 批量下达
// ==========================================

#[test]
fn test_release_sets_released_and_persists() {
    let world = TestWorld::new();
    let service = world.service(default_settings());
    let regular = world.insert_requisition(RequisitionStatus::Approved);
    let emergency = world.insert_emergency_requisition(RequisitionStatus::Approved);

    let released = service
        .release_requisitions_as_order(&[regular.clone(), emergency.clone()])
        .unwrap();

    assert_eq!(released.len(), 2);
    for r in [&regular, &emergency] {
        let stored = world.reload(r).unwrap();
        assert_eq!(stored.status, RequisitionStatus::Released);
        assert_eq!(stored.requisition_line_items, r.requisition_line_items);
    }

    let history = service.status_history(regular.id).unwrap();
    assert_eq!(history.last().map(|c| c.status_to), Some(RequisitionStatus::Released));
}

#[test]
fn test_release_empty_batch_is_noop() {
    let world = TestWorld::new();
    let service = world.service(default_settings());
    let requisition = world.insert_requisition(RequisitionStatus::Approved);

    assert!(service.release_requisitions_as_order(&[]).unwrap().is_empty());
    assert_eq!(world.reload(&requisition).unwrap(), requisition);
}

#[test]
fn test_release_keeps_line_items_saved_after_caller_loaded() {
    let world = TestWorld::new();
    world.save_default_template();
    let service = world.service(default_settings());
    let loaded = world.insert_requisition(RequisitionStatus::Approved);

    let mut draft = loaded.clone();
    draft.requisition_line_items[0].requested_quantity = Some(42);
    assert!(service.save_draft(&draft).unwrap().is_saved());

    // 调用方持有的是保存草稿之前的副本
    let released = service.release_requisitions_as_order(&[loaded.clone()]).unwrap();

    let stored = world.reload(&loaded).unwrap();
    assert_eq!(stored.status, RequisitionStatus::Released);
    assert_eq!(stored.requisition_line_items[0].requested_quantity, Some(42));
    assert_eq!(released, vec![stored]);
}

#[test]
fn test_release_does_not_recreate_deleted_requisition() {
    let world = TestWorld::new();
    let service = world.service(default_settings());
    let requisition = world.insert_requisition(RequisitionStatus::Initiated);
    assert!(service.try_delete(requisition.id).unwrap());

    let err = service
        .release_requisitions_as_order(&[requisition.clone()])
        .unwrap_err();

    assert!(err.is_not_found());
    assert!(world.reload(&requisition).is_none());
}

#[test]
fn test_release_leaves_terminal_requisitions_untouched() {
    let world = TestWorld::new();
    let service = world.service(default_settings());
    let skipped = world.insert_requisition(RequisitionStatus::Skipped);
    let already_released = world.insert_emergency_requisition(RequisitionStatus::Released);
    let approved = world.insert_emergency_requisition(RequisitionStatus::Approved);

    let released = service
        .release_requisitions_as_order(&[skipped.clone(), already_released.clone(), approved.clone()])
        .unwrap();

    assert_eq!(released.len(), 1);
    assert_eq!(released[0].id, approved.id);
    assert_eq!(world.reload(&skipped).unwrap(), skipped);
    assert_eq!(world.reload(&already_released).unwrap(), already_released);
    assert!(service.status_history(skipped.id).unwrap().is_empty());
}

#[test]
fn test_release_stops_at_missing_requisition() {
    let world = TestWorld::new();
    let service = world.service(default_settings());
    let first = world.insert_requisition(RequisitionStatus::Approved);
    let ghost = openlmis_requisition::Requisition::initiate(
        world.facility.id,
        world.program.id,
        world.period.id,
        true,
    );
    let last = world.insert_emergency_requisition(RequisitionStatus::Approved);

    let err = service
        .release_requisitions_as_order(&[first.clone(), ghost.clone(), last.clone()])
        .unwrap_err();

    assert!(err.is_not_found());
    assert_eq!(world.reload(&first).unwrap().status, RequisitionStatus::Released);
    assert!(world.reload(&ghost).is_none());
    assert_eq!(world.reload(&last).unwrap().status, RequisitionStatus::Approved);
}

// ==========================================
// 查询与配置
// ==========================================

#[test]
fn test_search_and_get() {
    let world = TestWorld::new();
    let service = world.service(default_settings());
    let regular = world.insert_requisition(RequisitionStatus::Initiated);
    world.insert_emergency_requisition(RequisitionStatus::Approved);

    let by_facility = service
        .search_requisitions(&RequisitionSearchCriteria {
            facility_id: Some(world.facility.id),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(by_facility.len(), 2);

    let initiated = service
        .search_requisitions(&RequisitionSearchCriteria {
            status: Some(RequisitionStatus::Initiated),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(initiated.len(), 1);
    assert_eq!(initiated[0].id, regular.id);

    assert_eq!(service.get_requisition(regular.id).unwrap(), regular);
    assert!(service.get_requisition(Uuid::new_v4()).unwrap_err().is_not_found());
}

#[test]
fn test_update_settings_changes_approval_step() {
    let world = TestWorld::new();
    let service = world.service(default_settings());
    let requisition = world.insert_requisition(RequisitionStatus::Submitted);

    assert!(service.approve(requisition.id).is_err());

    service.update_settings(RequisitionSettings { skip_authorization: true });
    assert!(service.settings().skip_authorization);
    assert_eq!(
        service.approve(requisition.id).unwrap().status,
        RequisitionStatus::Approved
    );
}
