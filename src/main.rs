// ==========================================
// 申请单审批流 - 主入口
// ==========================================
// 职责: 打开数据库、建表、加载配置并输出运行摘要
// ==========================================

use openlmis_requisition::app::{get_default_db_path, AppState};
use openlmis_requisition::domain::RequisitionSearchCriteria;
use openlmis_requisition::logging;
use openlmis_requisition::RequisitionStatus;

const STATUSES: [RequisitionStatus; 6] = [
    RequisitionStatus::Initiated,
    RequisitionStatus::Submitted,
    RequisitionStatus::Authorized,
    RequisitionStatus::Approved,
    RequisitionStatus::Skipped,
    RequisitionStatus::Released,
];

#[tokio::main]
async fn main() {
    logging::init();

    tracing::info!("==================================================");
    tracing::info!("{}", openlmis_requisition::APP_NAME);
    tracing::info!("系统版本: {}", openlmis_requisition::VERSION);
    tracing::info!("==================================================");

    let db_path = std::env::args().nth(1).unwrap_or_else(get_default_db_path);
    tracing::info!("使用数据库: {}", db_path);

    let app_state = match AppState::new(db_path).await {
        Ok(state) => state,
        Err(e) => {
            tracing::error!("AppState初始化失败: {}", e);
            std::process::exit(1);
        }
    };

    match app_state.config_manager.get_config_snapshot() {
        Ok(snapshot) => tracing::info!("生效配置: {}", snapshot),
        Err(e) => tracing::warn!("读取配置快照失败: {}", e),
    }

    // 按状态统计申请单
    for status in STATUSES {
        let criteria = RequisitionSearchCriteria {
            status: Some(status),
            ..Default::default()
        };
        match app_state.requisition_service.search_requisitions(&criteria) {
            Ok(found) => tracing::info!(status = %status, count = found.len(), "申请单统计"),
            Err(e) => {
                tracing::error!("查询申请单失败: {}", e);
                std::process::exit(1);
            }
        }
    }
}
