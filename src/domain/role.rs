// ==========================================
// 申请单审批流 - 角色/权限传输对象
// ==========================================
// 来源: 认证服务（外部协作方），此处只承载数据
// ==========================================

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RightDto {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "type", default)]
    pub right_type: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleDto {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub rights: HashSet<RightDto>,
}

impl RoleDto {
    pub fn has_right(&self, right_name: &str) -> bool {
        self.rights.iter().any(|r| r.name == right_name)
    }
}
