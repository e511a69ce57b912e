// ==========================================
// 申请单审批流 - 处理计划表/周期仓储
// ==========================================

use crate::domain::period::{ProcessingPeriod, ProcessingSchedule};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::row_utils::{format_date, get_date, get_uuid};
use rusqlite::{params, Connection, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

// ==========================================
// PeriodRepository - 周期仓储
// ==========================================
pub struct PeriodRepository {
    conn: Arc<Mutex<Connection>>,
}

impl PeriodRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    pub fn insert_schedule(&self, schedule: &ProcessingSchedule) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO processing_schedule (id, code, name, description) VALUES (?1, ?2, ?3, ?4)",
            params![schedule.id.to_string(), schedule.code, schedule.name, schedule.description],
        )?;
        Ok(())
    }

    pub fn insert(&self, period: &ProcessingPeriod) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"INSERT INTO processing_period (
                id, processing_schedule_id, name, description, start_date, end_date
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)"#,
            params![
                period.id.to_string(),
                period.processing_schedule_id.to_string(),
                period.name,
                period.description,
                format_date(&period.start_date),
                format_date(&period.end_date),
            ],
        )?;
        Ok(())
    }

    pub fn find_by_id(&self, id: &Uuid) -> RepositoryResult<Option<ProcessingPeriod>> {
        let conn = self.get_conn()?;
        match conn.query_row(
            r#"SELECT id, processing_schedule_id, name, description, start_date, end_date
               FROM processing_period WHERE id = ?1"#,
            params![id.to_string()],
            map_row,
        ) {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 查询计划表下的周期，按开始日期升序
    pub fn list_by_schedule(&self, schedule_id: &Uuid) -> RepositoryResult<Vec<ProcessingPeriod>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"SELECT id, processing_schedule_id, name, description, start_date, end_date
               FROM processing_period
               WHERE processing_schedule_id = ?1
               ORDER BY start_date ASC"#,
        )?;

        let rows = stmt
            .query_map(params![schedule_id.to_string()], map_row)?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(rows)
    }
}

fn map_row(row: &Row) -> rusqlite::Result<ProcessingPeriod> {
    Ok(ProcessingPeriod {
        id: get_uuid(row, 0)?,
        processing_schedule_id: get_uuid(row, 1)?,
        name: row.get(2)?,
        description: row.get(3)?,
        start_date: get_date(row, 4)?,
        end_date: get_date(row, 5)?,
    })
}
