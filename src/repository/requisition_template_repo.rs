// ==========================================
// 申请单审批流 - 申请单模板仓储
// ==========================================
// 红线: 每个项目至多一个模板
// ==========================================

use crate::domain::template::{RequisitionTemplate, RequisitionTemplateColumn};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::row_utils::{get_source, get_uuid};
use rusqlite::{params, Connection, Result as SqliteResult, Row};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

pub struct RequisitionTemplateRepository {
    conn: Arc<Mutex<Connection>>,
}

impl RequisitionTemplateRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 保存模板（列整体替换）
    pub fn save(&self, template: &RequisitionTemplate) -> RepositoryResult<()> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        tx.execute(
            r#"INSERT INTO requisition_template (id, program_id) VALUES (?1, ?2)
               ON CONFLICT(id) DO UPDATE SET program_id = excluded.program_id"#,
            params![template.id.to_string(), template.program_id.to_string()],
        )?;
        tx.execute(
            "DELETE FROM requisition_template_column WHERE template_id = ?1",
            params![template.id.to_string()],
        )?;

        {
            let mut stmt = tx.prepare(
                r#"INSERT INTO requisition_template_column (
                    template_id, name, label, display_order, is_displayed, can_change_order, source
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"#,
            )?;
            for column in template.columns.values() {
                stmt.execute(params![
                    template.id.to_string(),
                    column.name,
                    column.label,
                    column.display_order,
                    column.is_displayed,
                    column.can_change_order,
                    column.source.as_str(),
                ])?;
            }
        }

        tx.commit()?;
        Ok(())
    }

    /// 查询项目的申请单模板
    ///
    /// # 返回
    /// - `Ok(None)`: 项目未配置模板
    pub fn get_template_for_program(&self, program_id: &Uuid) -> RepositoryResult<Option<RequisitionTemplate>> {
        let conn = self.get_conn()?;

        let template_id = match conn.query_row(
            "SELECT id FROM requisition_template WHERE program_id = ?1",
            params![program_id.to_string()],
            |row| get_uuid(row, 0),
        ) {
            Ok(v) => v,
            Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let mut stmt = conn.prepare(
            r#"SELECT name, label, display_order, is_displayed, can_change_order, source
               FROM requisition_template_column
               WHERE template_id = ?1"#,
        )?;
        let columns: HashMap<String, RequisitionTemplateColumn> = stmt
            .query_map(params![template_id.to_string()], map_column_row)?
            .collect::<SqliteResult<Vec<_>>>()?
            .into_iter()
            .map(|c| (c.name.clone(), c))
            .collect();

        Ok(Some(RequisitionTemplate {
            id: template_id,
            program_id: *program_id,
            columns,
        }))
    }
}

fn map_column_row(row: &Row) -> rusqlite::Result<RequisitionTemplateColumn> {
    Ok(RequisitionTemplateColumn {
        name: row.get(0)?,
        label: row.get(1)?,
        display_order: row.get(2)?,
        is_displayed: row.get(3)?,
        can_change_order: row.get(4)?,
        source: get_source(row, 5)?,
    })
}
