// ==========================================
// 申请单审批流 - 领域类型定义
// ==========================================
// 职责: 申请单状态、模板列来源等枚举
// 序列化格式: SCREAMING_SNAKE_CASE (与数据库一致)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 申请单状态 (Requisition Status)
// ==========================================
// 状态机唯一事实来源: requisition.status 列
// 终态: RELEASED / SKIPPED
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequisitionStatus {
    Initiated,  // 已发起
    Submitted,  // 已提交
    Authorized, // 已授权
    Approved,   // 已审批
    Skipped,    // 已跳过
    Released,   // 已下达为订单
}

impl fmt::Display for RequisitionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl RequisitionStatus {
    /// 转换为字符串 (用于数据库存储)
    pub fn as_str(&self) -> &'static str {
        match self {
            RequisitionStatus::Initiated => "INITIATED",
            RequisitionStatus::Submitted => "SUBMITTED",
            RequisitionStatus::Authorized => "AUTHORIZED",
            RequisitionStatus::Approved => "APPROVED",
            RequisitionStatus::Skipped => "SKIPPED",
            RequisitionStatus::Released => "RELEASED",
        }
    }

    /// 从字符串解析状态
    ///
    /// 未知值返回 None（数据库中不应出现，调用方按数据错误处理）
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "INITIATED" => Some(RequisitionStatus::Initiated),
            "SUBMITTED" => Some(RequisitionStatus::Submitted),
            "AUTHORIZED" => Some(RequisitionStatus::Authorized),
            "APPROVED" => Some(RequisitionStatus::Approved),
            "SKIPPED" => Some(RequisitionStatus::Skipped),
            "RELEASED" => Some(RequisitionStatus::Released),
            _ => None,
        }
    }

    /// 是否为终态
    pub fn is_terminal(&self) -> bool {
        matches!(self, RequisitionStatus::Released | RequisitionStatus::Skipped)
    }
}

// ==========================================
// 模板列来源 (Template Column Source)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SourceType {
    UserInput,  // 用户填写
    Calculated, // 系统计算
    Reference,  // 引用主数据
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl SourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceType::UserInput => "USER_INPUT",
            SourceType::Calculated => "CALCULATED",
            SourceType::Reference => "REFERENCE",
        }
    }

    /// 从字符串解析来源
    ///
    /// 未知值返回 None（模板数据错误，不能按手工填写处理）
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "USER_INPUT" => Some(SourceType::UserInput),
            "CALCULATED" => Some(SourceType::Calculated),
            "REFERENCE" => Some(SourceType::Reference),
            _ => None,
        }
    }
}

// ==========================================
// 明细列名常量
// ==========================================
// 与模板 column name 对齐 (camelCase)
pub mod columns {
    pub const REQUISITION_LINE_ITEMS: &str = "requisitionLineItems";
    pub const BEGINNING_BALANCE: &str = "beginningBalance";
    pub const TOTAL_RECEIVED_QUANTITY: &str = "totalReceivedQuantity";
    pub const TOTAL_CONSUMED_QUANTITY: &str = "totalConsumedQuantity";
    pub const STOCK_ON_HAND: &str = "stockOnHand";
    pub const REQUESTED_QUANTITY: &str = "requestedQuantity";
    pub const APPROVED_QUANTITY: &str = "approvedQuantity";
    pub const REMARKS: &str = "remarks";
}
