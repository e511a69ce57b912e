// ==========================================
// 申请单审批流 - 校验提示国际化
// ==========================================
// 语言包: locales/zh-CN.yml（默认）、locales/en.yml
// 注意: rust_i18n::i18n! 宏已在 lib.rs 中初始化
// ==========================================

/// 支持的语言
pub const SUPPORTED_LOCALES: [&str; 2] = ["zh-CN", "en"];

pub fn current_locale() -> String {
    rust_i18n::locale().to_string()
}

/// 切换语言
///
/// # 返回
/// - true: 已切换
/// - false: 不支持的语言，保持当前语言
pub fn set_locale(locale: &str) -> bool {
    if !SUPPORTED_LOCALES.contains(&locale) {
        tracing::warn!(locale, "不支持的语言，忽略切换");
        return false;
    }
    rust_i18n::set_locale(locale);
    true
}

/// 翻译提示（无参数）
pub fn t(key: &str) -> String {
    rust_i18n::t!(key).to_string()
}

/// 翻译提示，替换 `%{name}` 占位符
///
/// ```no_run
/// use openlmis_requisition::i18n::t_with_args;
/// let msg = t_with_args("requisition.validation.column_calculated", &[("column", "stockOnHand")]);
/// ```
pub fn t_with_args(key: &str, args: &[(&str, &str)]) -> String {
    args.iter().fold(t(key), |msg, (name, value)| {
        msg.replace(&format!("%{{{}}}", name), value)
    })
}
