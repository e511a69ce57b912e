// ==========================================
// 申请单审批流 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为（外键、busy_timeout）
// - 统一建表语句，测试与应用共用一份 schema
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前代码所期望的 schema_version
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要“每个连接”单独开启
/// - busy_timeout 需要“每个连接”单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 打开内存库并建表（测试用）
pub fn open_in_memory_with_schema() -> rusqlite::Result<Connection> {
    let conn = Connection::open_in_memory()?;
    configure_sqlite_connection(&conn)?;
    init_schema(&conn)?;
    Ok(conn)
}

/// 读取 schema_version（若表不存在则返回 None）
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> = conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}

/// 建表（幂等）
///
/// 说明：
/// - 所有 ID 以 TEXT 存储 UUID
/// - 非紧急申请单在 (facility, program, period) 上唯一（部分唯一索引）
/// - requisition_status_change 不设外键：申请单删除后保留审计记录
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- ===== 配置 =====
        CREATE TABLE IF NOT EXISTS config_scope (
            scope_id TEXT PRIMARY KEY,
            scope_type TEXT NOT NULL,
            scope_key TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            UNIQUE(scope_type, scope_key)
        );

        INSERT OR IGNORE INTO config_scope (scope_id, scope_type, scope_key)
        VALUES ('global', 'GLOBAL', 'global');

        CREATE TABLE IF NOT EXISTS config_kv (
            scope_id TEXT NOT NULL REFERENCES config_scope(scope_id) ON DELETE CASCADE,
            key TEXT NOT NULL,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (scope_id, key)
        );

        -- ===== 地理层级 =====
        CREATE TABLE IF NOT EXISTS geographic_level (
            id TEXT PRIMARY KEY,
            code TEXT NOT NULL UNIQUE,
            name TEXT,
            level_number INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS geographic_zone (
            id TEXT PRIMARY KEY,
            code TEXT NOT NULL UNIQUE,
            name TEXT,
            level_id TEXT NOT NULL REFERENCES geographic_level(id),
            parent_id TEXT REFERENCES geographic_zone(id),
            catchment_population INTEGER,
            latitude REAL,
            longitude REAL
        );

        -- ===== 机构 =====
        CREATE TABLE IF NOT EXISTS facility_type (
            id TEXT PRIMARY KEY,
            code TEXT NOT NULL UNIQUE,
            name TEXT,
            description TEXT,
            display_order INTEGER,
            active INTEGER NOT NULL DEFAULT 1
        );

        CREATE TABLE IF NOT EXISTS facility_operator (
            id TEXT PRIMARY KEY,
            code TEXT NOT NULL UNIQUE,
            name TEXT,
            description TEXT,
            display_order INTEGER
        );

        CREATE TABLE IF NOT EXISTS facility (
            id TEXT PRIMARY KEY,
            code TEXT NOT NULL UNIQUE,
            name TEXT,
            description TEXT,
            geographic_zone_id TEXT NOT NULL REFERENCES geographic_zone(id),
            type_id TEXT NOT NULL REFERENCES facility_type(id),
            operated_by_id TEXT REFERENCES facility_operator(id),
            active INTEGER NOT NULL,
            go_live_date TEXT,
            go_down_date TEXT,
            comment TEXT,
            enabled INTEGER NOT NULL
        );

        -- ===== 项目与产品 =====
        CREATE TABLE IF NOT EXISTS program (
            id TEXT PRIMARY KEY,
            code TEXT NOT NULL UNIQUE,
            name TEXT,
            description TEXT,
            active INTEGER NOT NULL DEFAULT 1,
            periods_skippable INTEGER NOT NULL DEFAULT 0,
            show_non_full_supply_tab INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS product_category (
            id TEXT PRIMARY KEY,
            code TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL,
            display_order INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS product (
            id TEXT PRIMARY KEY,
            code TEXT NOT NULL UNIQUE,
            primary_name TEXT NOT NULL,
            dispensing_unit TEXT NOT NULL,
            doses_per_dispensing_unit INTEGER NOT NULL,
            pack_size INTEGER NOT NULL,
            pack_rounding_threshold INTEGER NOT NULL,
            round_to_zero INTEGER NOT NULL,
            active INTEGER NOT NULL,
            full_supply INTEGER NOT NULL,
            tracer INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS program_product (
            id TEXT PRIMARY KEY,
            program_id TEXT NOT NULL REFERENCES program(id),
            product_id TEXT NOT NULL REFERENCES product(id),
            doses_per_month INTEGER NOT NULL,
            active INTEGER NOT NULL,
            product_category_id TEXT NOT NULL REFERENCES product_category(id),
            full_supply INTEGER NOT NULL,
            display_order INTEGER,
            price_per_pack REAL
        );

        -- ===== 周期 =====
        CREATE TABLE IF NOT EXISTS processing_schedule (
            id TEXT PRIMARY KEY,
            code TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL,
            description TEXT
        );

        CREATE TABLE IF NOT EXISTS processing_period (
            id TEXT PRIMARY KEY,
            processing_schedule_id TEXT NOT NULL REFERENCES processing_schedule(id),
            name TEXT NOT NULL,
            description TEXT,
            start_date TEXT NOT NULL,
            end_date TEXT NOT NULL
        );

        -- ===== 申请单 =====
        CREATE TABLE IF NOT EXISTS requisition (
            id TEXT PRIMARY KEY,
            facility_id TEXT NOT NULL REFERENCES facility(id),
            program_id TEXT NOT NULL REFERENCES program(id),
            processing_period_id TEXT NOT NULL REFERENCES processing_period(id),
            status TEXT NOT NULL CHECK(status IN (
                'INITIATED', 'SUBMITTED', 'AUTHORIZED', 'APPROVED', 'SKIPPED', 'RELEASED'
            )),
            emergency INTEGER NOT NULL DEFAULT 0,
            created_date TEXT NOT NULL,
            modified_date TEXT NOT NULL
        );

        CREATE UNIQUE INDEX IF NOT EXISTS uq_requisition_regular
            ON requisition(facility_id, program_id, processing_period_id)
            WHERE emergency = 0;

        CREATE INDEX IF NOT EXISTS idx_requisition_status ON requisition(status);

        CREATE TABLE IF NOT EXISTS requisition_line_item (
            id TEXT PRIMARY KEY,
            requisition_id TEXT NOT NULL REFERENCES requisition(id) ON DELETE CASCADE,
            line_no INTEGER NOT NULL,
            product_id TEXT NOT NULL,
            beginning_balance INTEGER,
            total_received_quantity INTEGER,
            total_consumed_quantity INTEGER,
            stock_on_hand INTEGER,
            requested_quantity INTEGER,
            approved_quantity INTEGER,
            remarks TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_line_item_requisition
            ON requisition_line_item(requisition_id, line_no);

        CREATE TABLE IF NOT EXISTS requisition_status_change (
            change_id TEXT PRIMARY KEY,
            requisition_id TEXT NOT NULL,
            status_from TEXT,
            status_to TEXT NOT NULL,
            changed_at TEXT NOT NULL,
            detail TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_status_change_requisition
            ON requisition_status_change(requisition_id, changed_at);

        -- ===== 申请单模板 =====
        CREATE TABLE IF NOT EXISTS requisition_template (
            id TEXT PRIMARY KEY,
            program_id TEXT NOT NULL UNIQUE REFERENCES program(id)
        );

        CREATE TABLE IF NOT EXISTS requisition_template_column (
            template_id TEXT NOT NULL REFERENCES requisition_template(id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            label TEXT NOT NULL,
            display_order INTEGER NOT NULL,
            is_displayed INTEGER NOT NULL,
            can_change_order INTEGER NOT NULL DEFAULT 1,
            source TEXT NOT NULL CHECK(source IN ('USER_INPUT', 'CALCULATED', 'REFERENCE')),
            PRIMARY KEY (template_id, name)
        );
        "#,
    )?;

    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [CURRENT_SCHEMA_VERSION],
    )?;

    Ok(())
}
