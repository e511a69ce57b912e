// ==========================================
// 申请单审批流 - 行映射工具
// ==========================================
// 职责: TEXT 列 <-> Uuid / 日期 / 枚举 的统一转换
// 说明: 解析失败统一转为 FromSqlConversionFailure，由仓储错误映射处理
// ==========================================

use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::types::Type;
use rusqlite::Row;
use uuid::Uuid;

use crate::domain::types::{RequisitionStatus, SourceType};

/// 日期存储格式
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// 时间戳存储格式
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn conversion_error<E>(idx: usize, err: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

pub fn get_uuid(row: &Row, idx: usize) -> rusqlite::Result<Uuid> {
    let raw: String = row.get(idx)?;
    Uuid::parse_str(&raw).map_err(|e| conversion_error(idx, e))
}

pub fn get_opt_uuid(row: &Row, idx: usize) -> rusqlite::Result<Option<Uuid>> {
    let raw: Option<String> = row.get(idx)?;
    raw.map(|s| Uuid::parse_str(&s).map_err(|e| conversion_error(idx, e)))
        .transpose()
}

pub fn get_date(row: &Row, idx: usize) -> rusqlite::Result<NaiveDate> {
    let raw: String = row.get(idx)?;
    NaiveDate::parse_from_str(&raw, DATE_FORMAT).map_err(|e| conversion_error(idx, e))
}

pub fn get_opt_date(row: &Row, idx: usize) -> rusqlite::Result<Option<NaiveDate>> {
    let raw: Option<String> = row.get(idx)?;
    raw.map(|s| NaiveDate::parse_from_str(&s, DATE_FORMAT).map_err(|e| conversion_error(idx, e)))
        .transpose()
}

pub fn get_datetime(row: &Row, idx: usize) -> rusqlite::Result<NaiveDateTime> {
    let raw: String = row.get(idx)?;
    NaiveDateTime::parse_from_str(&raw, DATETIME_FORMAT).map_err(|e| conversion_error(idx, e))
}

/// 枚举列出现未知取值
#[derive(Debug)]
struct UnknownCode {
    kind: &'static str,
    value: String,
}

impl std::fmt::Display for UnknownCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "未知{}: {}", self.kind, self.value)
    }
}

impl std::error::Error for UnknownCode {}

fn unknown_status(idx: usize, value: String) -> rusqlite::Error {
    conversion_error(idx, UnknownCode { kind: "申请单状态", value })
}

pub fn get_status(row: &Row, idx: usize) -> rusqlite::Result<RequisitionStatus> {
    let raw: String = row.get(idx)?;
    RequisitionStatus::parse(&raw).ok_or_else(|| unknown_status(idx, raw))
}

pub fn get_opt_status(row: &Row, idx: usize) -> rusqlite::Result<Option<RequisitionStatus>> {
    let raw: Option<String> = row.get(idx)?;
    raw.map(|s| RequisitionStatus::parse(&s).ok_or_else(|| unknown_status(idx, s)))
        .transpose()
}

pub fn get_source(row: &Row, idx: usize) -> rusqlite::Result<SourceType> {
    let raw: String = row.get(idx)?;
    SourceType::parse(&raw).ok_or_else(|| {
        conversion_error(idx, UnknownCode { kind: "模板列来源", value: raw })
    })
}

pub fn format_date(date: &NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn format_datetime(ts: &NaiveDateTime) -> String {
    ts.format(DATETIME_FORMAT).to_string()
}
