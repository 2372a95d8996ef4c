// ==========================================
// 精密报价系统 - 配置管理器
// ==========================================
// 职责: 全局工艺费率的加载、查询、更新
// 存储: config_kv 表 (key-value + scope)
// ==========================================
// 费率是“实时”的：每次计算读取一次快照；
// 仅报价表头的 total_cost 在保存时冻结
// ==========================================

use crate::domain::settings::RateSettings;
use rusqlite::{params, Connection};
use serde_json::json;
use std::collections::HashMap;
use std::error::Error;
use std::sync::{Arc, Mutex};

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 一条语句读取 global scope 下的多个配置键（同一读快照）
    fn get_config_values(&self, keys: [&str; 4]) -> Result<HashMap<String, String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let mut stmt = conn.prepare(
            "SELECT key, value FROM config_kv
             WHERE scope_id = 'global' AND key IN (?1, ?2, ?3, ?4)",
        )?;
        let rows = stmt.query_map(params![keys[0], keys[1], keys[2], keys[3]], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut values = HashMap::new();
        for row in rows {
            let (key, value) = row?;
            values.insert(key, value);
        }
        Ok(values)
    }

    /// 解析数值配置，缺失或格式错误时使用默认值
    fn f64_or_default(values: &HashMap<String, String>, key: &str, default: f64) -> f64 {
        let Some(value) = values.get(key) else {
            return default;
        };

        match value.trim().parse::<f64>() {
            Ok(v) if v.is_finite() => v,
            _ => {
                tracing::warn!(
                    config_key = key,
                    raw_value = %value,
                    "费率配置格式错误，使用默认值"
                );
                default
            }
        }
    }

    // ===== 工艺费率 =====

    /// 读取费率快照（四项在同一条查询中读取，不会混入并发更新的部分值）
    ///
    /// 未配置的项使用默认值 500.0 / 0.25 / 4.0 / 40.0
    pub fn get_rate_settings(&self) -> Result<RateSettings, Box<dyn Error>> {
        let defaults = RateSettings::default();
        let values = self.get_config_values([
            config_keys::CNC_RATE_HOURLY,
            config_keys::WIRE_CUT_RATE_PER_MM,
            config_keys::SQUARING_RATE_PER_SQ_INCH,
            config_keys::HEAT_TREAT_RATE_PER_KG,
        ])?;

        Ok(RateSettings {
            cnc_rate_hourly: Self::f64_or_default(
                &values,
                config_keys::CNC_RATE_HOURLY,
                defaults.cnc_rate_hourly,
            ),
            wire_cut_rate_per_mm: Self::f64_or_default(
                &values,
                config_keys::WIRE_CUT_RATE_PER_MM,
                defaults.wire_cut_rate_per_mm,
            ),
            squaring_rate_per_sq_inch: Self::f64_or_default(
                &values,
                config_keys::SQUARING_RATE_PER_SQ_INCH,
                defaults.squaring_rate_per_sq_inch,
            ),
            heat_treat_rate_per_kg: Self::f64_or_default(
                &values,
                config_keys::HEAT_TREAT_RATE_PER_KG,
                defaults.heat_treat_rate_per_kg,
            ),
        })
    }

    /// 更新费率（四项在同一事务内写入）
    ///
    /// # 错误
    /// - 任一费率为负数或非有限值
    pub fn update_rate_settings(&self, rates: &RateSettings) -> Result<(), Box<dyn Error>> {
        let entries = [
            (config_keys::CNC_RATE_HOURLY, rates.cnc_rate_hourly),
            (config_keys::WIRE_CUT_RATE_PER_MM, rates.wire_cut_rate_per_mm),
            (config_keys::SQUARING_RATE_PER_SQ_INCH, rates.squaring_rate_per_sq_inch),
            (config_keys::HEAT_TREAT_RATE_PER_KG, rates.heat_treat_rate_per_kg),
        ];

        for (key, value) in entries.iter() {
            if !value.is_finite() || *value < 0.0 {
                return Err(format!("费率{}无效: {}", key, value).into());
            }
        }

        let mut conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        let tx = conn.transaction()?;

        for (key, value) in entries.iter() {
            tx.execute(
                "INSERT INTO config_kv (scope_id, key, value, updated_at)
                 VALUES ('global', ?1, ?2, datetime('now'))
                 ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
                params![key, value.to_string()],
            )?;
        }

        tx.commit()?;
        tracing::info!(?rates, "费率已更新");
        Ok(())
    }

    /// 获取所有配置的快照（JSON格式）
    ///
    /// # 用途
    /// - 诊断输出 / 命令行查看当前配置
    pub fn get_config_snapshot(&self) -> Result<String, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let mut stmt = conn.prepare(
            "SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key"
        )?;

        let mut config_map: HashMap<String, String> = HashMap::new();
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
            ))
        })?;

        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }

        let json_value = json!(config_map);
        Ok(serde_json::to_string(&json_value)?)
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 工艺费率
    pub const CNC_RATE_HOURLY: &str = "cnc_rate_hourly";
    pub const WIRE_CUT_RATE_PER_MM: &str = "wire_cut_rate_per_mm";
    pub const SQUARING_RATE_PER_SQ_INCH: &str = "squaring_rate_per_sq_inch";
    pub const HEAT_TREAT_RATE_PER_KG: &str = "heat_treat_rate_per_kg";
}
