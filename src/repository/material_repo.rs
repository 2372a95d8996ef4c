// ==========================================
// 精密报价系统 - 材料目录仓储
// ==========================================
// 红线: Repository 不含业务逻辑（默认钢材回退在 API 层）
// ==========================================

use crate::domain::material::Material;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

// ==========================================
// MaterialRepository - 材料仓储
// ==========================================
pub struct MaterialRepository {
    conn: Arc<Mutex<Connection>>,
}

impl MaterialRepository {
    /// 创建新的MaterialRepository实例
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 新增材料，返回 material_id
    pub fn insert(&self, name: &str, density_factor: f64, rate_per_kg: f64) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;

        conn.execute(
            "INSERT INTO material (name, density_factor, rate_per_kg) VALUES (?, ?, ?)",
            params![name, density_factor, rate_per_kg],
        )?;

        Ok(conn.last_insert_rowid())
    }

    /// 更新材料参数
    ///
    /// 价格维护入口（无编辑界面）；载入重算的集成测试用它模拟材料调价
    ///
    /// # 错误
    /// - `RepositoryError::NotFound`: material_id 不存在
    pub fn update(&self, material: &Material) -> RepositoryResult<()> {
        let conn = self.get_conn()?;

        let rows_affected = conn.execute(
            "UPDATE material SET name = ?, density_factor = ?, rate_per_kg = ? WHERE material_id = ?",
            params![
                &material.name,
                material.density_factor,
                material.rate_per_kg,
                material.material_id,
            ],
        )?;

        if rows_affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Material".to_string(),
                id: material.material_id.to_string(),
            });
        }

        Ok(())
    }

    /// 按 material_id 查询
    ///
    /// # 返回
    /// - `Ok(Some(Material))`: 找到
    /// - `Ok(None)`: 未找到
    pub fn find_by_id(&self, material_id: i64) -> RepositoryResult<Option<Material>> {
        let conn = self.get_conn()?;

        match conn.query_row(
            r#"SELECT material_id, name, density_factor, rate_per_kg
               FROM material
               WHERE material_id = ?"#,
            params![material_id],
            |row| self.map_row(row),
        ) {
            Ok(material) => Ok(Some(material)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 查询全部材料（按ID升序）
    pub fn list_all(&self) -> RepositoryResult<Vec<Material>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"SELECT material_id, name, density_factor, rate_per_kg
               FROM material
               ORDER BY material_id"#,
        )?;

        let materials = stmt
            .query_map([], |row| self.map_row(row))?
            .collect::<Result<Vec<Material>, _>>()?;

        Ok(materials)
    }

    fn map_row(&self, row: &rusqlite::Row) -> rusqlite::Result<Material> {
        Ok(Material {
            material_id: row.get(0)?,
            name: row.get(1)?,
            density_factor: row.get(2)?,
            rate_per_kg: row.get(3)?,
        })
    }
}
