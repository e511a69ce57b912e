// ==========================================
// 申请单审批流 - 配置读取 Trait
// ==========================================
// 职责: 定义工作流所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use async_trait::async_trait;
use std::error::Error;

// ==========================================
// RequisitionConfigReader Trait
// ==========================================
// 实现者: ConfigManager（从 config_kv 表读取）
#[async_trait]
pub trait RequisitionConfigReader: Send + Sync {
    /// 是否跳过授权环节
    ///
    /// # 返回
    /// - true: 审批环节在 SUBMITTED 状态进行
    /// - false: 审批环节在 AUTHORIZED 状态进行
    ///
    /// # 默认值
    /// - false
    async fn get_skip_authorization(&self) -> Result<bool, Box<dyn Error>>;
}
