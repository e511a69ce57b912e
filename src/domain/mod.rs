// ==========================================
// 申请单审批流 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型
// 红线: 不含数据访问逻辑,不含工作流逻辑
// ==========================================

pub mod facility;
pub mod geography;
pub mod period;
pub mod program;
pub mod requisition;
pub mod role;
pub mod template;
pub mod types;

// 重导出核心类型
pub use facility::{Facility, FacilityOperator, FacilityType};
pub use geography::{GeographicLevel, GeographicZone};
pub use period::{ProcessingPeriod, ProcessingSchedule};
pub use program::{Product, ProductCategory, Program, ProgramProduct};
pub use requisition::{
    Requisition, RequisitionLineItem, RequisitionSearchCriteria, RequisitionStatusChange,
};
pub use role::{RightDto, RoleDto};
pub use template::{RequisitionTemplate, RequisitionTemplateColumn, TemplateColumnError};
pub use types::{columns, RequisitionStatus, SourceType};
