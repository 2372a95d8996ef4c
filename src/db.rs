// ==========================================
// 精密报价系统 - SQLite 连接初始化与建表
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为
// - 统一 busy_timeout，减少并发保存报价时的偶发 busy 错误
// - 幂等建表 + 默认数据填充（费率/材料/零件模板）
// ==========================================

use rusqlite::{params, Connection, OptionalExtension};
use std::time::Duration;

use crate::config::config_keys;
use crate::domain::settings::RateSettings;

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

/// 幂等建表
///
/// 报价历史是只追加的日志：(quote_number, version) 唯一，
/// 由唯一约束兜底并发下的版本号分配。
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS config_kv (
            scope_id TEXT NOT NULL,
            key TEXT NOT NULL,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (scope_id, key)
        );

        CREATE TABLE IF NOT EXISTS material (
            material_id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            density_factor REAL NOT NULL,
            rate_per_kg REAL NOT NULL
        );

        CREATE TABLE IF NOT EXISTS component_template (
            template_id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            shape TEXT NOT NULL DEFAULT 'CUBOID',
            display_order INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS quote (
            quote_id INTEGER PRIMARY KEY AUTOINCREMENT,
            quote_number INTEGER NOT NULL,
            version INTEGER NOT NULL,
            customer_name TEXT NOT NULL,
            tool_name TEXT NOT NULL,
            total_cost REAL NOT NULL,
            created_by TEXT NOT NULL,
            created_at TEXT NOT NULL,
            UNIQUE (quote_number, version)
        );

        CREATE TABLE IF NOT EXISTS quote_item (
            item_id INTEGER PRIMARY KEY AUTOINCREMENT,
            quote_id INTEGER NOT NULL REFERENCES quote(quote_id),
            line_no INTEGER NOT NULL,
            component_name TEXT NOT NULL,
            shape TEXT NOT NULL,
            material_id INTEGER,
            length_mm REAL NOT NULL,
            width_mm REAL NOT NULL,
            height_mm REAL NOT NULL,
            manual_price REAL NOT NULL,
            quantity INTEGER NOT NULL,
            final_cost REAL NOT NULL,
            include_squaring INTEGER NOT NULL,
            include_heat_treat INTEGER NOT NULL,
            cnc_hours REAL NOT NULL,
            wire_cut_length_mm REAL NOT NULL,
            drilling_cost REAL NOT NULL,
            UNIQUE (quote_id, line_no)
        );

        CREATE INDEX IF NOT EXISTS idx_quote_number_version
            ON quote (quote_number, version DESC);
        "#,
    )?;

    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        params![CURRENT_SCHEMA_VERSION],
    )?;

    Ok(())
}

/// 填充默认数据（仅在对应表为空时写入）
///
/// - 费率: 500.0 / 0.25 / 4.0 / 40.0
/// - 材料: D2 (HCHCr)
/// - 零件模板: TOP PLATE (CUBOID)
pub fn seed_defaults(conn: &Connection) -> rusqlite::Result<()> {
    let defaults = RateSettings::default();
    for (key, value) in [
        (config_keys::CNC_RATE_HOURLY, defaults.cnc_rate_hourly),
        (config_keys::WIRE_CUT_RATE_PER_MM, defaults.wire_cut_rate_per_mm),
        (config_keys::SQUARING_RATE_PER_SQ_INCH, defaults.squaring_rate_per_sq_inch),
        (config_keys::HEAT_TREAT_RATE_PER_KG, defaults.heat_treat_rate_per_kg),
    ] {
        conn.execute(
            "INSERT OR IGNORE INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)",
            params![key, value.to_string()],
        )?;
    }

    let material_count: i64 = conn.query_row("SELECT COUNT(*) FROM material", [], |row| row.get(0))?;
    if material_count == 0 {
        conn.execute(
            "INSERT INTO material (name, density_factor, rate_per_kg) VALUES (?1, ?2, ?3)",
            params!["D2 (HCHCr)", 0.000_007_85_f64, 350.0_f64],
        )?;
    }

    let template_count: i64 =
        conn.query_row("SELECT COUNT(*) FROM component_template", [], |row| row.get(0))?;
    if template_count == 0 {
        conn.execute(
            "INSERT INTO component_template (name, shape, display_order) VALUES (?1, ?2, ?3)",
            params!["TOP PLATE", "CUBOID", 1],
        )?;
    }

    Ok(())
}
