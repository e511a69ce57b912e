// ==========================================
// 申请单审批流 - 地理层级仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================

use crate::domain::geography::{GeographicLevel, GeographicZone};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::row_utils::{get_opt_uuid, get_uuid};
use rusqlite::{params, Connection, Row};
use std::sync::{Arc, Mutex};

// ==========================================
// GeographicRepository - 地理层级/区域仓储
// ==========================================
pub struct GeographicRepository {
    conn: Arc<Mutex<Connection>>,
}

impl GeographicRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    // ==========================================
    // 地理层级
    // ==========================================

    pub fn insert_level(&self, level: &GeographicLevel) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO geographic_level (id, code, name, level_number) VALUES (?1, ?2, ?3, ?4)",
            params![level.id.to_string(), level.code, level.name, level.level_number],
        )?;
        Ok(())
    }

    pub fn find_level_by_id(&self, id: &uuid::Uuid) -> RepositoryResult<Option<GeographicLevel>> {
        let conn = self.get_conn()?;
        match conn.query_row(
            "SELECT id, code, name, level_number FROM geographic_level WHERE id = ?1",
            params![id.to_string()],
            map_level_row,
        ) {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    // ==========================================
    // 地理区域
    // ==========================================

    pub fn insert_zone(&self, zone: &GeographicZone) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"INSERT INTO geographic_zone (
                id, code, name, level_id, parent_id,
                catchment_population, latitude, longitude
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"#,
            params![
                zone.id.to_string(),
                zone.code,
                zone.name,
                zone.level_id.to_string(),
                zone.parent_id.map(|id| id.to_string()),
                zone.catchment_population,
                zone.latitude,
                zone.longitude,
            ],
        )?;
        Ok(())
    }

    pub fn find_zone_by_id(&self, id: &uuid::Uuid) -> RepositoryResult<Option<GeographicZone>> {
        let conn = self.get_conn()?;
        match conn.query_row(
            r#"SELECT id, code, name, level_id, parent_id,
                      catchment_population, latitude, longitude
               FROM geographic_zone WHERE id = ?1"#,
            params![id.to_string()],
            map_zone_row,
        ) {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

fn map_level_row(row: &Row) -> rusqlite::Result<GeographicLevel> {
    Ok(GeographicLevel {
        id: get_uuid(row, 0)?,
        code: row.get(1)?,
        name: row.get(2)?,
        level_number: row.get(3)?,
    })
}

fn map_zone_row(row: &Row) -> rusqlite::Result<GeographicZone> {
    Ok(GeographicZone {
        id: get_uuid(row, 0)?,
        code: row.get(1)?,
        name: row.get(2)?,
        level_id: get_uuid(row, 3)?,
        parent_id: get_opt_uuid(row, 4)?,
        catchment_population: row.get(5)?,
        latitude: row.get(6)?,
        longitude: row.get(7)?,
    })
}
