// ==========================================
// 申请单审批流 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 物资申请单工作流后端（发起 → 提交 → 授权 → 审批 → 下达）
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "zh-CN");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 业务规则
pub mod engine;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// 服务层 - 工作流编排
pub mod service;

// 应用层 - 组装
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{RequisitionStatus, SourceType};

// 领域实体
pub use domain::{
    Facility, Program, Requisition, RequisitionLineItem, RequisitionStatusChange,
    RequisitionTemplate,
};

// 引擎
pub use engine::{FieldError, ValidationCode, WorkflowAction};

// 服务
pub use service::{DraftOutcome, RequisitionService, ServiceError, ServiceResult};

// 配置
pub use config::RequisitionSettings;

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "申请单审批流";
