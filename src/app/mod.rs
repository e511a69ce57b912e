// ==========================================
// 申请单审批流 - 应用层
// ==========================================
// 职责: 组装数据库、仓储、配置与服务
// ==========================================

pub mod state;

// 重导出
pub use state::{get_default_db_path, AppState};
