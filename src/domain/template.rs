// ==========================================
// 申请单审批流 - 申请单模板领域模型
// ==========================================
// 职责: 按项目配置明细列（是否展示、来源、顺序）
// 说明: 列解析失败以 TemplateColumnError 返回，由调用方映射为字段错误
// ==========================================

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::types::SourceType;

/// 模板列解析错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateColumnError {
    #[error("模板中不存在列: {0}")]
    ColumnNotFound(String),

    #[error("列 {0} 不允许调整显示顺序")]
    ColumnNotReorderable(String),
}

// ==========================================
// RequisitionTemplateColumn - 模板列
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequisitionTemplateColumn {
    pub name: String,        // 列名 (camelCase, 与明细字段对齐)
    pub label: String,       // 显示标签
    pub display_order: i32,  // 显示顺序
    pub is_displayed: bool,  // 是否展示
    pub can_change_order: bool,
    pub source: SourceType,  // 数据来源
}

impl RequisitionTemplateColumn {
    pub fn new(name: impl Into<String>, display_order: i32, source: SourceType) -> Self {
        let name = name.into();
        Self {
            label: name.clone(),
            name,
            display_order,
            is_displayed: true,
            can_change_order: true,
            source,
        }
    }
}

// ==========================================
// RequisitionTemplate - 申请单模板
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequisitionTemplate {
    pub id: Uuid,
    pub program_id: Uuid,
    pub columns: HashMap<String, RequisitionTemplateColumn>,
}

impl RequisitionTemplate {
    pub fn new(program_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            program_id,
            columns: HashMap::new(),
        }
    }

    pub fn with_column(mut self, column: RequisitionTemplateColumn) -> Self {
        self.columns.insert(column.name.clone(), column);
        self
    }

    fn find_column(&self, name: &str) -> Result<&RequisitionTemplateColumn, TemplateColumnError> {
        self.columns
            .get(name)
            .ok_or_else(|| TemplateColumnError::ColumnNotFound(name.to_string()))
    }

    /// 列是否为系统计算列
    pub fn is_column_calculated(&self, name: &str) -> Result<bool, TemplateColumnError> {
        Ok(self.find_column(name)?.source == SourceType::Calculated)
    }

    /// 列是否展示
    pub fn is_column_displayed(&self, name: &str) -> Result<bool, TemplateColumnError> {
        Ok(self.find_column(name)?.is_displayed)
    }

    pub fn is_column_in_template(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    /// 按显示顺序排列的列
    pub fn ordered_columns(&self) -> Vec<&RequisitionTemplateColumn> {
        let mut cols: Vec<&RequisitionTemplateColumn> = self.columns.values().collect();
        cols.sort_by(|a, b| a.display_order.cmp(&b.display_order).then_with(|| a.name.cmp(&b.name)));
        cols
    }

    /// 调整列显示顺序
    ///
    /// 目标列移动到 new_order 位置，介于新旧位置之间的可调整列依次顺移一位。
    pub fn change_column_display_order(
        &mut self,
        name: &str,
        new_order: i32,
    ) -> Result<(), TemplateColumnError> {
        let column = self.find_column(name)?;
        if !column.can_change_order {
            return Err(TemplateColumnError::ColumnNotReorderable(name.to_string()));
        }
        let old_order = column.display_order;
        if old_order == new_order {
            return Ok(());
        }

        for col in self.columns.values_mut() {
            if col.name == name || !col.can_change_order {
                continue;
            }
            if new_order < old_order && col.display_order >= new_order && col.display_order < old_order {
                col.display_order += 1;
            } else if new_order > old_order
                && col.display_order > old_order
                && col.display_order <= new_order
            {
                col.display_order -= 1;
            }
        }

        if let Some(col) = self.columns.get_mut(name) {
            col.display_order = new_order;
        }
        Ok(())
    }
}
