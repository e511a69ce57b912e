// ==========================================
// 申请单审批流 - 项目与产品领域模型
// ==========================================
// Program.periods_skippable: 控制该项目是否允许跳过周期
// ==========================================

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ==========================================
// Program - 项目
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub id: Uuid,
    pub code: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub active: bool,
    pub periods_skippable: bool,        // 是否允许跳过周期
    pub show_non_full_supply_tab: bool, // 是否展示非全额供应页签
}

impl Program {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            code: code.into(),
            name: None,
            description: None,
            active: true,
            periods_skippable: false,
            show_non_full_supply_tab: false,
        }
    }
}

// ==========================================
// Product - 产品
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub code: String,
    pub primary_name: String,
    pub dispensing_unit: String,
    pub doses_per_dispensing_unit: i32,
    pub pack_size: i32,
    pub pack_rounding_threshold: i32,
    pub round_to_zero: bool,
    pub active: bool,
    pub full_supply: bool,
    pub tracer: bool,
}

impl Product {
    /// 仅填充必填字段（占位值）的产品
    pub fn with_required_defaults(code: impl Into<String>) -> Self {
        let code = code.into();
        Self {
            id: Uuid::new_v4(),
            primary_name: format!("{} name", code),
            code,
            dispensing_unit: "unit".to_string(),
            doses_per_dispensing_unit: 1,
            pack_size: 1,
            pack_rounding_threshold: 0,
            round_to_zero: false,
            active: true,
            full_supply: true,
            tracer: false,
        }
    }
}

// ==========================================
// ProductCategory - 产品分类
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductCategory {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub display_order: i32,
}

// ==========================================
// ProgramProduct - 项目产品
// ==========================================
// 用途: 发起申请单时按此清单生成明细
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgramProduct {
    pub id: Uuid,
    pub program_id: Uuid,
    pub product_id: Uuid,
    pub doses_per_month: i32,
    pub active: bool,
    pub product_category_id: Uuid,
    pub full_supply: bool,
    pub display_order: Option<i32>,
    pub price_per_pack: Option<f64>, // 每包单价
}

impl ProgramProduct {
    pub fn new(program: &Program, product: &Product, category: &ProductCategory) -> Self {
        Self {
            id: Uuid::new_v4(),
            program_id: program.id,
            product_id: product.id,
            doses_per_month: 1,
            active: true,
            product_category_id: category.id,
            full_supply: product.full_supply,
            display_order: None,
            price_per_pack: None,
        }
    }

    /// 是否进入申请单明细（有效且全额供应）
    pub fn is_requisitionable(&self) -> bool {
        self.active && self.full_supply
    }
}
