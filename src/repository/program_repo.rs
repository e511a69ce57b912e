// ==========================================
// 申请单审批流 - 项目/产品仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================

use crate::domain::program::{Product, ProductCategory, Program, ProgramProduct};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::row_utils::get_uuid;
use rusqlite::{params, Connection, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

// ==========================================
// ProgramRepository - 项目仓储
// ==========================================
pub struct ProgramRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ProgramRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    pub fn insert(&self, program: &Program) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"INSERT INTO program (
                id, code, name, description, active, periods_skippable, show_non_full_supply_tab
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"#,
            params![
                program.id.to_string(),
                program.code,
                program.name,
                program.description,
                program.active,
                program.periods_skippable,
                program.show_non_full_supply_tab,
            ],
        )?;
        Ok(())
    }

    /// 更新项目（主数据管理入口）
    pub fn update(&self, program: &Program) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let rows = conn.execute(
            r#"UPDATE program
               SET code = ?2, name = ?3, description = ?4, active = ?5,
                   periods_skippable = ?6, show_non_full_supply_tab = ?7
               WHERE id = ?1"#,
            params![
                program.id.to_string(),
                program.code,
                program.name,
                program.description,
                program.active,
                program.periods_skippable,
                program.show_non_full_supply_tab,
            ],
        )?;
        if rows == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Program".to_string(),
                id: program.id.to_string(),
            });
        }
        Ok(())
    }

    pub fn find_by_id(&self, id: &Uuid) -> RepositoryResult<Option<Program>> {
        let conn = self.get_conn()?;
        match conn.query_row(
            r#"SELECT id, code, name, description, active, periods_skippable, show_non_full_supply_tab
               FROM program WHERE id = ?1"#,
            params![id.to_string()],
            map_program_row,
        ) {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    // ==========================================
    // 产品与项目产品
    // ==========================================

    pub fn insert_category(&self, category: &ProductCategory) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO product_category (id, code, name, display_order) VALUES (?1, ?2, ?3, ?4)",
            params![category.id.to_string(), category.code, category.name, category.display_order],
        )?;
        Ok(())
    }

    pub fn insert_product(&self, product: &Product) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"INSERT INTO product (
                id, code, primary_name, dispensing_unit, doses_per_dispensing_unit,
                pack_size, pack_rounding_threshold, round_to_zero, active, full_supply, tracer
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)"#,
            params![
                product.id.to_string(),
                product.code,
                product.primary_name,
                product.dispensing_unit,
                product.doses_per_dispensing_unit,
                product.pack_size,
                product.pack_rounding_threshold,
                product.round_to_zero,
                product.active,
                product.full_supply,
                product.tracer,
            ],
        )?;
        Ok(())
    }

    pub fn find_product_by_id(&self, id: &Uuid) -> RepositoryResult<Option<Product>> {
        let conn = self.get_conn()?;
        match conn.query_row(
            r#"SELECT id, code, primary_name, dispensing_unit, doses_per_dispensing_unit,
                      pack_size, pack_rounding_threshold, round_to_zero, active, full_supply, tracer
               FROM product WHERE id = ?1"#,
            params![id.to_string()],
            map_product_row,
        ) {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn insert_program_product(&self, pp: &ProgramProduct) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"INSERT INTO program_product (
                id, program_id, product_id, doses_per_month, active,
                product_category_id, full_supply, display_order, price_per_pack
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"#,
            params![
                pp.id.to_string(),
                pp.program_id.to_string(),
                pp.product_id.to_string(),
                pp.doses_per_month,
                pp.active,
                pp.product_category_id.to_string(),
                pp.full_supply,
                pp.display_order,
                pp.price_per_pack,
            ],
        )?;
        Ok(())
    }

    /// 查询项目下的产品清单
    ///
    /// # 返回
    /// - 按 display_order 升序（未设置排最后），同序按产品编码
    pub fn list_program_products(&self, program_id: &Uuid) -> RepositoryResult<Vec<ProgramProduct>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"SELECT pp.id, pp.program_id, pp.product_id, pp.doses_per_month, pp.active,
                      pp.product_category_id, pp.full_supply, pp.display_order, pp.price_per_pack
               FROM program_product pp
               JOIN product p ON p.id = pp.product_id
               WHERE pp.program_id = ?1
               ORDER BY pp.display_order IS NULL, pp.display_order ASC, p.code ASC"#,
        )?;

        let rows = stmt
            .query_map(params![program_id.to_string()], map_program_product_row)?
            .collect::<SqliteResult<Vec<_>>>()?;

        Ok(rows)
    }
}

fn map_program_row(row: &Row) -> rusqlite::Result<Program> {
    Ok(Program {
        id: get_uuid(row, 0)?,
        code: row.get(1)?,
        name: row.get(2)?,
        description: row.get(3)?,
        active: row.get(4)?,
        periods_skippable: row.get(5)?,
        show_non_full_supply_tab: row.get(6)?,
    })
}

fn map_product_row(row: &Row) -> rusqlite::Result<Product> {
    Ok(Product {
        id: get_uuid(row, 0)?,
        code: row.get(1)?,
        primary_name: row.get(2)?,
        dispensing_unit: row.get(3)?,
        doses_per_dispensing_unit: row.get(4)?,
        pack_size: row.get(5)?,
        pack_rounding_threshold: row.get(6)?,
        round_to_zero: row.get(7)?,
        active: row.get(8)?,
        full_supply: row.get(9)?,
        tracer: row.get(10)?,
    })
}

fn map_program_product_row(row: &Row) -> rusqlite::Result<ProgramProduct> {
    Ok(ProgramProduct {
        id: get_uuid(row, 0)?,
        program_id: get_uuid(row, 1)?,
        product_id: get_uuid(row, 2)?,
        doses_per_month: row.get(3)?,
        active: row.get(4)?,
        product_category_id: get_uuid(row, 5)?,
        full_supply: row.get(6)?,
        display_order: row.get(7)?,
        price_per_pack: row.get(8)?,
    })
}
