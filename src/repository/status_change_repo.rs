// ==========================================
// 申请单审批流 - 状态变更日志仓储
// ==========================================
// 红线: 只追加，不修改
// 说明: 不对 requisition 建外键，申请单删除后日志保留
// ==========================================

use crate::domain::requisition::RequisitionStatusChange;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::row_utils::{format_datetime, get_datetime, get_opt_status, get_status, get_uuid};
use rusqlite::{params, Connection, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

// ==========================================
// RequisitionStatusChangeRepository - 状态变更日志仓储
// ==========================================
// 红线: Repository 不做业务逻辑,只做数据映射
pub struct RequisitionStatusChangeRepository {
    conn: Arc<Mutex<Connection>>,
}

impl RequisitionStatusChangeRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 插入状态变更记录
    ///
    /// # 返回
    /// - `Ok(change_id)`: 成功插入
    pub fn insert(&self, change: &RequisitionStatusChange) -> RepositoryResult<Uuid> {
        let conn = self.get_conn()?;

        conn.execute(
            r#"
            INSERT INTO requisition_status_change (
                change_id, requisition_id, status_from, status_to, changed_at, detail
            ) VALUES (?, ?, ?, ?, ?, ?)
            "#,
            params![
                change.change_id.to_string(),
                change.requisition_id.to_string(),
                change.status_from.map(|s| s.as_str()),
                change.status_to.as_str(),
                format_datetime(&change.changed_at),
                change.detail,
            ],
        )?;

        Ok(change.change_id)
    }

    /// 查询申请单的状态变更历史（按时间升序）
    pub fn list_by_requisition(
        &self,
        requisition_id: &Uuid,
    ) -> RepositoryResult<Vec<RequisitionStatusChange>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT change_id, requisition_id, status_from, status_to, changed_at, detail
            FROM requisition_status_change
            WHERE requisition_id = ?
            ORDER BY changed_at ASC, rowid ASC
            "#,
        )?;

        let changes = stmt
            .query_map(params![requisition_id.to_string()], map_row)?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(changes)
    }
}

fn map_row(row: &Row) -> rusqlite::Result<RequisitionStatusChange> {
    Ok(RequisitionStatusChange {
        change_id: get_uuid(row, 0)?,
        requisition_id: get_uuid(row, 1)?,
        status_from: get_opt_status(row, 2)?,
        status_to: get_status(row, 3)?,
        changed_at: get_datetime(row, 4)?,
        detail: row.get(5)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory_with_schema;
    use crate::domain::types::RequisitionStatus;

    fn setup_repo() -> RequisitionStatusChangeRepository {
        let conn = open_in_memory_with_schema().unwrap();
        RequisitionStatusChangeRepository::new(Arc::new(Mutex::new(conn)))
    }

    #[test]
    fn test_insert_and_list_in_order() {
        let repo = setup_repo();
        let requisition_id = Uuid::new_v4();

        let first = RequisitionStatusChange::new(
            requisition_id,
            None,
            RequisitionStatus::Initiated,
            "initiate",
        );
        let second = RequisitionStatusChange::new(
            requisition_id,
            Some(RequisitionStatus::Initiated),
            RequisitionStatus::Skipped,
            "skip",
        );

        assert_eq!(repo.insert(&first).unwrap(), first.change_id);
        repo.insert(&second).unwrap();
        repo.insert(&RequisitionStatusChange::new(
            Uuid::new_v4(),
            None,
            RequisitionStatus::Initiated,
            "other",
        ))
        .unwrap();

        let history = repo.list_by_requisition(&requisition_id).unwrap();
        assert_eq!(history, vec![first, second]);
    }

    #[test]
    fn test_list_unknown_requisition_is_empty() {
        let repo = setup_repo();
        assert!(repo.list_by_requisition(&Uuid::new_v4()).unwrap().is_empty());
    }
}
