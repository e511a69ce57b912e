use serde::{Deserialize, Serialize};
use std::error::Error;

use crate::config::requisition_config_trait::RequisitionConfigReader;
use crate::domain::types::RequisitionStatus;

/// 工作流配置快照
///
/// 由 `RequisitionConfigReader` 一次性读取后传入校验器与服务，
/// 配置项在编译期枚举，避免按字符串键查找。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RequisitionSettings {
    /// 跳过授权环节
    pub skip_authorization: bool,
}

impl RequisitionSettings {
    pub async fn load(reader: &dyn RequisitionConfigReader) -> Result<Self, Box<dyn Error>> {
        Ok(Self {
            skip_authorization: reader.get_skip_authorization().await?,
        })
    }

    /// 审批环节所处状态（审批数量/备注仅在此状态下可填写）
    pub fn approval_step_status(&self) -> RequisitionStatus {
        if self.skip_authorization {
            RequisitionStatus::Submitted
        } else {
            RequisitionStatus::Authorized
        }
    }
}
