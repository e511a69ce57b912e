// ==========================================
// 申请单审批流 - 机构仓储
// ==========================================

use crate::domain::facility::{Facility, FacilityType};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::row_utils::{format_date, get_opt_date, get_opt_uuid, get_uuid};
use rusqlite::{params, Connection, Row};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

// ==========================================
// FacilityRepository - 机构仓储
// ==========================================
pub struct FacilityRepository {
    conn: Arc<Mutex<Connection>>,
}

impl FacilityRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    pub fn insert_type(&self, facility_type: &FacilityType) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"INSERT INTO facility_type (id, code, name, description, display_order, active)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6)"#,
            params![
                facility_type.id.to_string(),
                facility_type.code,
                facility_type.name,
                facility_type.description,
                facility_type.display_order,
                facility_type.active,
            ],
        )?;
        Ok(())
    }

    /// 创建机构
    pub fn insert(&self, facility: &Facility) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"INSERT INTO facility (
                id, code, name, description, geographic_zone_id, type_id,
                operated_by_id, active, go_live_date, go_down_date, comment, enabled
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)"#,
            params![
                facility.id.to_string(),
                facility.code,
                facility.name,
                facility.description,
                facility.geographic_zone_id.to_string(),
                facility.type_id.to_string(),
                facility.operated_by_id.map(|id| id.to_string()),
                facility.active,
                facility.go_live_date.as_ref().map(format_date),
                facility.go_down_date.as_ref().map(format_date),
                facility.comment,
                facility.enabled,
            ],
        )?;
        Ok(())
    }

    /// 按ID查询机构
    ///
    /// # 返回
    /// - `Ok(Some(Facility))`: 找到
    /// - `Ok(None)`: 未找到
    pub fn find_by_id(&self, id: &Uuid) -> RepositoryResult<Option<Facility>> {
        let conn = self.get_conn()?;
        match conn.query_row(
            r#"SELECT id, code, name, description, geographic_zone_id, type_id,
                      operated_by_id, active, go_live_date, go_down_date, comment, enabled
               FROM facility WHERE id = ?1"#,
            params![id.to_string()],
            map_row,
        ) {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

fn map_row(row: &Row) -> rusqlite::Result<Facility> {
    Ok(Facility {
        id: get_uuid(row, 0)?,
        code: row.get(1)?,
        name: row.get(2)?,
        description: row.get(3)?,
        geographic_zone_id: get_uuid(row, 4)?,
        type_id: get_uuid(row, 5)?,
        operated_by_id: get_opt_uuid(row, 6)?,
        active: row.get(7)?,
        go_live_date: get_opt_date(row, 8)?,
        go_down_date: get_opt_date(row, 9)?,
        comment: row.get(10)?,
        enabled: row.get(11)?,
    })
}
