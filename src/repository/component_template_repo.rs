// ==========================================
// 精密报价系统 - 标准零件模板仓储
// ==========================================

use crate::domain::component::ComponentTemplate;
use crate::domain::types::ShapeKind;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

pub struct ComponentTemplateRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ComponentTemplateRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 新增模板，返回 template_id
    pub fn insert(&self, name: &str, shape: ShapeKind, display_order: i32) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;

        conn.execute(
            "INSERT INTO component_template (name, shape, display_order) VALUES (?, ?, ?)",
            params![name, shape.to_db_str(), display_order],
        )?;

        Ok(conn.last_insert_rowid())
    }

    /// 按 display_order 升序列出模板
    pub fn list_ordered(&self) -> RepositoryResult<Vec<ComponentTemplate>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"SELECT template_id, name, shape, display_order
               FROM component_template
               ORDER BY display_order, template_id"#,
        )?;

        let templates = stmt
            .query_map([], |row| {
                let shape_raw: String = row.get(2)?;
                let shape = shape_raw.parse::<ShapeKind>().map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e))
                })?;

                Ok(ComponentTemplate {
                    template_id: row.get(0)?,
                    name: row.get(1)?,
                    shape,
                    display_order: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<ComponentTemplate>, _>>()?;

        Ok(templates)
    }
}
