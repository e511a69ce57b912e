// ==========================================
// 申请单审批流 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod error;
pub mod facility_repo;
pub mod geographic_repo;
pub mod period_repo;
pub mod program_repo;
pub mod requisition_repo;
pub mod requisition_template_repo;
pub mod row_utils;
pub mod status_change_repo;

// 重导出核心仓储
pub use error::{RepositoryError, RepositoryResult};
pub use facility_repo::FacilityRepository;
pub use geographic_repo::GeographicRepository;
pub use period_repo::PeriodRepository;
pub use program_repo::ProgramRepository;
pub use requisition_repo::RequisitionRepository;
pub use requisition_template_repo::RequisitionTemplateRepository;
pub use status_change_repo::RequisitionStatusChangeRepository;
