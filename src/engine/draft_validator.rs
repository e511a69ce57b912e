// ==========================================
// 申请单审批流 - 草稿申请单校验
// ==========================================
// 职责: 保存前检查明细字段是否允许在当前环节填写
// 红线: 无状态、无副作用、无 I/O 操作
// 红线: 校验失败是数据 (Vec<FieldError>)，不是错误
// ==========================================

use serde::{Deserialize, Serialize};

use crate::config::RequisitionSettings;
use crate::domain::requisition::{Requisition, RequisitionLineItem};
use crate::domain::template::{RequisitionTemplate, TemplateColumnError};
use crate::domain::types::columns;
use crate::i18n::{t, t_with_args};

/// 由模板决定是否为计算列的明细字段
const CALCULATED_CANDIDATES: [&str; 2] = [columns::STOCK_ON_HAND, columns::TOTAL_CONSUMED_QUANTITY];

/// 仅审批环节可填写的明细字段
const APPROVAL_ONLY: [&str; 2] = [columns::APPROVED_QUANTITY, columns::REMARKS];

// ==========================================
// FieldError - 字段级校验错误
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationCode {
    /// 计算列被手工填写
    ColumnCalculated,
    /// 审批字段在非审批环节填写
    ApprovalStepOnly,
    /// 模板缺失或模板中无此列
    TemplateColumnUnresolved,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,              // 被拒绝的字段（固定为 requisitionLineItems）
    pub column: String,             // 触发规则的明细列
    pub line_index: Option<usize>,  // 明细序号；模板解析失败时为 None
    pub code: ValidationCode,
    pub message: String,            // 当前语言下的提示
}

impl FieldError {
    fn new(column: &str, line_index: Option<usize>, code: ValidationCode, message: String) -> Self {
        Self {
            field: columns::REQUISITION_LINE_ITEMS.to_string(),
            column: column.to_string(),
            line_index,
            code,
            message,
        }
    }
}

/// 校验草稿申请单
///
/// # 规则
/// - 明细为空 → 无错误
/// - stockOnHand / totalConsumedQuantity: 模板标记为计算列且已填写 → ColumnCalculated
/// - 模板缺失或列无法解析 → 每列一条 TemplateColumnUnresolved
/// - approvedQuantity / remarks: 状态不是审批环节状态且已填写 → ApprovalStepOnly
///
/// # 参数
/// - requisition: 待校验申请单（状态取自该对象）
/// - template: 项目模板，未配置时为 None
/// - settings: 工作流配置（决定审批环节状态）
pub fn validate(
    requisition: &Requisition,
    template: Option<&RequisitionTemplate>,
    settings: &RequisitionSettings,
) -> Vec<FieldError> {
    let mut errors = Vec::new();
    if !requisition.has_line_items() {
        return errors;
    }

    // 模板列只解析一次，解析失败报告一次
    let mut calculated_columns: Vec<&str> = Vec::new();
    for column in CALCULATED_CANDIDATES {
        match resolve_calculated(template, column) {
            Ok(true) => calculated_columns.push(column),
            Ok(false) => {}
            Err(message) => errors.push(FieldError::new(
                column,
                None,
                ValidationCode::TemplateColumnUnresolved,
                message,
            )),
        }
    }

    let approval_step = requisition.status == settings.approval_step_status();

    for (idx, item) in requisition.requisition_line_items.iter().enumerate() {
        for &column in &calculated_columns {
            if is_supplied(item, column) {
                errors.push(FieldError::new(
                    column,
                    Some(idx),
                    ValidationCode::ColumnCalculated,
                    t_with_args("requisition.validation.column_calculated", &[("column", column)]),
                ));
            }
        }

        if approval_step {
            continue;
        }
        for column in APPROVAL_ONLY {
            if is_supplied(item, column) {
                errors.push(FieldError::new(
                    column,
                    Some(idx),
                    ValidationCode::ApprovalStepOnly,
                    t_with_args("requisition.validation.approval_step_only", &[("column", column)]),
                ));
            }
        }
    }

    errors
}

fn resolve_calculated(template: Option<&RequisitionTemplate>, column: &str) -> Result<bool, String> {
    let template = template.ok_or_else(|| t("requisition.validation.template_not_found"))?;
    template.is_column_calculated(column).map_err(|e| match e {
        TemplateColumnError::ColumnNotFound(name) => t_with_args(
            "requisition.validation.template_column_not_found",
            &[("column", name.as_str())],
        ),
        other => other.to_string(),
    })
}

/// 字段是否已填写（Some 即视为已填写，包括空字符串备注）
fn is_supplied(item: &RequisitionLineItem, column: &str) -> bool {
    match column {
        columns::STOCK_ON_HAND => item.stock_on_hand.is_some(),
        columns::TOTAL_CONSUMED_QUANTITY => item.total_consumed_quantity.is_some(),
        columns::APPROVED_QUANTITY => item.approved_quantity.is_some(),
        columns::REMARKS => item.remarks.is_some(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::template::RequisitionTemplateColumn;
    use crate::domain::types::{RequisitionStatus, SourceType};
    use uuid::Uuid;

    fn template_with(stock_source: SourceType, consumed_source: SourceType) -> RequisitionTemplate {
        RequisitionTemplate::new(Uuid::new_v4())
            .with_column(RequisitionTemplateColumn::new(columns::STOCK_ON_HAND, 1, stock_source))
            .with_column(RequisitionTemplateColumn::new(
                columns::TOTAL_CONSUMED_QUANTITY,
                2,
                consumed_source,
            ))
    }

    fn requisition_with(status: RequisitionStatus, item: RequisitionLineItem) -> Requisition {
        let mut r = Requisition::initiate(Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4(), false)
            .with_status(status);
        r.requisition_line_items.push(item);
        r
    }

    fn codes(errors: &[FieldError]) -> Vec<(ValidationCode, String)> {
        errors.iter().map(|e| (e.code, e.column.clone())).collect()
    }

    #[test]
    fn test_empty_line_items_pass_without_template() {
        let r = Requisition::initiate(Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4(), false);
        assert!(validate(&r, None, &RequisitionSettings::default()).is_empty());
    }

    #[test]
    fn test_calculated_stock_on_hand_supplied_is_rejected() {
        let template = template_with(SourceType::Calculated, SourceType::UserInput);
        let mut item = RequisitionLineItem::new(Uuid::new_v4());
        item.stock_on_hand = Some(10);
        item.total_consumed_quantity = Some(5);
        let r = requisition_with(RequisitionStatus::Initiated, item);

        let errors = validate(&r, Some(&template), &RequisitionSettings::default());

        assert_eq!(
            codes(&errors),
            vec![(ValidationCode::ColumnCalculated, columns::STOCK_ON_HAND.to_string())]
        );
        assert_eq!(errors[0].field, columns::REQUISITION_LINE_ITEMS);
        assert_eq!(errors[0].line_index, Some(0));
    }

    #[test]
    fn test_calculated_column_left_empty_is_accepted() {
        let template = template_with(SourceType::Calculated, SourceType::Calculated);
        let r = requisition_with(RequisitionStatus::Initiated, RequisitionLineItem::new(Uuid::new_v4()));
        assert!(validate(&r, Some(&template), &RequisitionSettings::default()).is_empty());
    }

    #[test]
    fn test_approved_quantity_outside_approval_step_is_rejected() {
        let template = template_with(SourceType::UserInput, SourceType::UserInput);
        let mut item = RequisitionLineItem::new(Uuid::new_v4());
        item.approved_quantity = Some(3);
        let settings = RequisitionSettings { skip_authorization: false };

        let initiated = requisition_with(RequisitionStatus::Initiated, item.clone());
        assert_eq!(
            codes(&validate(&initiated, Some(&template), &settings)),
            vec![(ValidationCode::ApprovalStepOnly, columns::APPROVED_QUANTITY.to_string())]
        );

        let authorized = requisition_with(RequisitionStatus::Authorized, item);
        assert!(validate(&authorized, Some(&template), &settings).is_empty());
    }

    #[test]
    fn test_skip_authorization_moves_approval_step_to_submitted() {
        let template = template_with(SourceType::UserInput, SourceType::UserInput);
        let mut item = RequisitionLineItem::new(Uuid::new_v4());
        item.remarks = Some(String::new());
        let settings = RequisitionSettings { skip_authorization: true };

        let submitted = requisition_with(RequisitionStatus::Submitted, item.clone());
        assert!(validate(&submitted, Some(&template), &settings).is_empty());

        let authorized = requisition_with(RequisitionStatus::Authorized, item);
        assert_eq!(
            codes(&validate(&authorized, Some(&template), &settings)),
            vec![(ValidationCode::ApprovalStepOnly, columns::REMARKS.to_string())]
        );
    }

    #[test]
    fn test_missing_template_becomes_field_errors() {
        let r = requisition_with(RequisitionStatus::Initiated, RequisitionLineItem::new(Uuid::new_v4()));
        let errors = validate(&r, None, &RequisitionSettings::default());

        assert_eq!(errors.len(), 2);
        assert!(errors
            .iter()
            .all(|e| e.code == ValidationCode::TemplateColumnUnresolved && e.line_index.is_none()));
    }

    #[test]
    fn test_unknown_template_column_reported_once() {
        let template = RequisitionTemplate::new(Uuid::new_v4()).with_column(
            RequisitionTemplateColumn::new(columns::STOCK_ON_HAND, 1, SourceType::UserInput),
        );
        let mut r = requisition_with(RequisitionStatus::Initiated, RequisitionLineItem::new(Uuid::new_v4()));
        r.requisition_line_items.push(RequisitionLineItem::new(Uuid::new_v4()));

        let errors = validate(&r, Some(&template), &RequisitionSettings::default());
        assert_eq!(
            codes(&errors),
            vec![(
                ValidationCode::TemplateColumnUnresolved,
                columns::TOTAL_CONSUMED_QUANTITY.to_string()
            )]
        );
    }

    #[test]
    fn test_errors_accumulate_across_line_items() {
        let template = template_with(SourceType::Calculated, SourceType::Calculated);
        let mut first = RequisitionLineItem::new(Uuid::new_v4());
        first.total_consumed_quantity = Some(1);
        let mut second = RequisitionLineItem::new(Uuid::new_v4());
        second.stock_on_hand = Some(2);
        second.approved_quantity = Some(2);

        let mut r = requisition_with(RequisitionStatus::Submitted, first);
        r.requisition_line_items.push(second);

        let errors = validate(&r, Some(&template), &RequisitionSettings::default());
        let indexed: Vec<_> = errors.iter().map(|e| (e.line_index, e.code)).collect();
        assert_eq!(
            indexed,
            vec![
                (Some(0), ValidationCode::ColumnCalculated),
                (Some(1), ValidationCode::ColumnCalculated),
                (Some(1), ValidationCode::ApprovalStepOnly),
            ]
        );
    }
}
