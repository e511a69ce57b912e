// ==========================================
// 申请单审批流 - 申请单数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑，状态迁移校验在服务层
// 红线: 明细随申请单整体写入/删除（line_no 保序）
// ==========================================

use crate::domain::requisition::{Requisition, RequisitionLineItem, RequisitionSearchCriteria};
use crate::domain::types::RequisitionStatus;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::row_utils::{format_datetime, get_datetime, get_status, get_uuid};
use chrono::NaiveDateTime;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Result as SqliteResult, Row, Transaction};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

const SELECT_REQUISITION: &str = r#"
    SELECT id, facility_id, program_id, processing_period_id, status,
           emergency, created_date, modified_date
    FROM requisition
"#;

// ==========================================
// RequisitionRepository - 申请单仓储
// ==========================================
pub struct RequisitionRepository {
    conn: Arc<Mutex<Connection>>,
}

impl RequisitionRepository {
    /// 创建新的申请单仓储
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    // ==========================================
    // 写入操作
    // ==========================================

    /// 新建申请单（含明细）
    ///
    /// # 返回
    /// - `Err(UniqueConstraintViolation)`: 同一 (机构, 项目, 周期) 已有非紧急申请单
    pub fn insert(&self, requisition: &Requisition) -> RepositoryResult<()> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        tx.execute(
            r#"INSERT INTO requisition (
                id, facility_id, program_id, processing_period_id, status,
                emergency, created_date, modified_date
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"#,
            params_from_iter(header_params(requisition)),
        )?;
        write_line_items(&tx, requisition)?;

        tx.commit()?;
        Ok(())
    }

    /// 替换明细（以状态为前置条件）
    ///
    /// 仅当已存储状态仍为 `requisition.status` 时生效，同时刷新 modified_date。
    /// 不会插入不存在的申请单。
    ///
    /// # 返回
    /// - `Ok(true)`: 已替换
    /// - `Ok(false)`: 申请单不存在或状态已变化，未做任何修改
    pub fn update_line_items(&self, requisition: &Requisition) -> RepositoryResult<bool> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        let rows = tx.execute(
            "UPDATE requisition SET modified_date = ?3 WHERE id = ?1 AND status = ?2",
            params![
                requisition.id.to_string(),
                requisition.status.as_str(),
                format_datetime(&requisition.modified_date),
            ],
        )?;
        if rows == 0 {
            return Ok(false);
        }

        tx.execute(
            "DELETE FROM requisition_line_item WHERE requisition_id = ?1",
            params![requisition.id.to_string()],
        )?;
        write_line_items(&tx, requisition)?;

        tx.commit()?;
        Ok(true)
    }

    /// 状态迁移 from → to（同时刷新 modified_date）
    ///
    /// 状态条件与更新在同一条语句内完成。
    ///
    /// # 返回
    /// - `Ok(true)`: 已迁移
    /// - `Ok(false)`: 申请单不存在或当前状态不是 from
    pub fn update_status(
        &self,
        id: &Uuid,
        from: RequisitionStatus,
        to: RequisitionStatus,
        modified_date: &NaiveDateTime,
    ) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let rows = conn.execute(
            "UPDATE requisition SET status = ?3, modified_date = ?4 WHERE id = ?1 AND status = ?2",
            params![
                id.to_string(),
                from.as_str(),
                to.as_str(),
                format_datetime(modified_date)
            ],
        )?;
        Ok(rows > 0)
    }

    /// 按状态删除申请单（明细级联删除）
    ///
    /// # 返回
    /// - `Ok(true)`: 已删除
    /// - `Ok(false)`: 记录不存在或状态不是 status
    pub fn delete_if_status(&self, id: &Uuid, status: RequisitionStatus) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let rows = conn.execute(
            "DELETE FROM requisition WHERE id = ?1 AND status = ?2",
            params![id.to_string(), status.as_str()],
        )?;
        Ok(rows > 0)
    }

    // ==========================================
    // 查询操作
    // ==========================================

    /// 按ID查询申请单（含明细）
    pub fn find_by_id(&self, id: &Uuid) -> RepositoryResult<Option<Requisition>> {
        let conn = self.get_conn()?;
        let sql = format!("{} WHERE id = ?1", SELECT_REQUISITION);

        let header = match conn.query_row(&sql, params![id.to_string()], map_row) {
            Ok(v) => v,
            Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        Ok(Some(with_line_items(&conn, header)?))
    }

    /// 查询 (机构, 项目, 周期) 下的非紧急申请单
    pub fn find_by_facility_program_period(
        &self,
        facility_id: &Uuid,
        program_id: &Uuid,
        processing_period_id: &Uuid,
    ) -> RepositoryResult<Option<Requisition>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "{} WHERE facility_id = ?1 AND program_id = ?2 AND processing_period_id = ?3 AND emergency = 0",
            SELECT_REQUISITION
        );

        let header = match conn.query_row(
            &sql,
            params![
                facility_id.to_string(),
                program_id.to_string(),
                processing_period_id.to_string()
            ],
            map_row,
        ) {
            Ok(v) => v,
            Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        Ok(Some(with_line_items(&conn, header)?))
    }

    /// 条件查询申请单（未设置的条件不参与过滤）
    ///
    /// # 返回
    /// - 按 created_date 升序
    pub fn search(&self, criteria: &RequisitionSearchCriteria) -> RepositoryResult<Vec<Requisition>> {
        let conn = self.get_conn()?;

        let mut clauses: Vec<&str> = Vec::new();
        let mut values: Vec<Value> = Vec::new();

        if let Some(id) = criteria.facility_id {
            clauses.push("facility_id = ?");
            values.push(Value::from(id.to_string()));
        }
        if let Some(id) = criteria.program_id {
            clauses.push("program_id = ?");
            values.push(Value::from(id.to_string()));
        }
        if let Some(id) = criteria.processing_period_id {
            clauses.push("processing_period_id = ?");
            values.push(Value::from(id.to_string()));
        }
        if let Some(status) = criteria.status {
            clauses.push("status = ?");
            values.push(Value::from(status.as_str().to_string()));
        }

        let mut sql = SELECT_REQUISITION.to_string();
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY created_date ASC, id ASC");

        let mut stmt = conn.prepare(&sql)?;
        let headers = stmt
            .query_map(params_from_iter(values.iter()), map_row)?
            .collect::<SqliteResult<Vec<_>>>()?;

        headers
            .into_iter()
            .map(|header| with_line_items(&conn, header))
            .collect()
    }
}

// ==========================================
// 内部辅助
// ==========================================

fn header_params(requisition: &Requisition) -> Vec<Box<dyn rusqlite::ToSql>> {
    vec![
        Box::new(requisition.id.to_string()),
        Box::new(requisition.facility_id.to_string()),
        Box::new(requisition.program_id.to_string()),
        Box::new(requisition.processing_period_id.to_string()),
        Box::new(requisition.status.as_str()),
        Box::new(requisition.emergency),
        Box::new(format_datetime(&requisition.created_date)),
        Box::new(format_datetime(&requisition.modified_date)),
    ]
}

fn write_line_items(tx: &Transaction, requisition: &Requisition) -> RepositoryResult<()> {
    let mut stmt = tx.prepare(
        r#"INSERT INTO requisition_line_item (
            id, requisition_id, line_no, product_id,
            beginning_balance, total_received_quantity, total_consumed_quantity,
            stock_on_hand, requested_quantity, approved_quantity, remarks
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)"#,
    )?;

    for (line_no, item) in requisition.requisition_line_items.iter().enumerate() {
        stmt.execute(params![
            item.id.to_string(),
            requisition.id.to_string(),
            line_no as i64,
            item.product_id.to_string(),
            item.beginning_balance,
            item.total_received_quantity,
            item.total_consumed_quantity,
            item.stock_on_hand,
            item.requested_quantity,
            item.approved_quantity,
            item.remarks,
        ])?;
    }
    Ok(())
}

fn with_line_items(conn: &Connection, mut requisition: Requisition) -> RepositoryResult<Requisition> {
    let mut stmt = conn.prepare(
        r#"SELECT id, product_id, beginning_balance, total_received_quantity,
                  total_consumed_quantity, stock_on_hand, requested_quantity,
                  approved_quantity, remarks
           FROM requisition_line_item
           WHERE requisition_id = ?1
           ORDER BY line_no ASC"#,
    )?;

    requisition.requisition_line_items = stmt
        .query_map(params![requisition.id.to_string()], map_line_item_row)?
        .collect::<SqliteResult<Vec<_>>>()?;

    Ok(requisition)
}

fn map_row(row: &Row) -> rusqlite::Result<Requisition> {
    Ok(Requisition {
        id: get_uuid(row, 0)?,
        facility_id: get_uuid(row, 1)?,
        program_id: get_uuid(row, 2)?,
        processing_period_id: get_uuid(row, 3)?,
        status: get_status(row, 4)?,
        emergency: row.get(5)?,
        created_date: get_datetime(row, 6)?,
        modified_date: get_datetime(row, 7)?,
        requisition_line_items: Vec::new(),
    })
}

fn map_line_item_row(row: &Row) -> rusqlite::Result<RequisitionLineItem> {
    Ok(RequisitionLineItem {
        id: get_uuid(row, 0)?,
        product_id: get_uuid(row, 1)?,
        beginning_balance: row.get(2)?,
        total_received_quantity: row.get(3)?,
        total_consumed_quantity: row.get(4)?,
        stock_on_hand: row.get(5)?,
        requested_quantity: row.get(6)?,
        approved_quantity: row.get(7)?,
        remarks: row.get(8)?,
    })
}
