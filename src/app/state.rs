// ==========================================
// 精密报价系统 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享连接、仓储与API实例
// ==========================================

use std::sync::{Arc, Mutex};

use crate::api::{CatalogApi, QuoteApi};
use crate::config::ConfigManager;
use crate::db::{init_schema, open_sqlite_connection, seed_defaults};
use crate::repository::{ComponentTemplateRepository, MaterialRepository, QuoteRepository};

/// 应用状态
///
/// 所有仓储共享同一个 SQLite 连接（Arc<Mutex<Connection>>）
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 报价API
    pub quote_api: Arc<QuoteApi>,

    /// 材料/模板/费率API
    pub catalog_api: Arc<CatalogApi>,

    /// 配置管理器
    pub config_manager: Arc<ConfigManager>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 说明
    /// 1. 打开共享连接并统一 PRAGMA
    /// 2. 建表（幂等）并写入默认费率/材料/模板
    /// 3. 初始化Repository与API
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let conn = open_sqlite_connection(&db_path)
            .map_err(|e| format!("无法打开数据库: {}", e))?;
        init_schema(&conn).map_err(|e| format!("数据库建表失败: {}", e))?;
        seed_defaults(&conn).map_err(|e| format!("默认数据写入失败: {}", e))?;
        let conn = Arc::new(Mutex::new(conn));

        // ==========================================
        // 初始化Repository层
        // ==========================================
        let quote_repo = Arc::new(QuoteRepository::new(conn.clone()));
        let material_repo = Arc::new(MaterialRepository::new(conn.clone()));
        let template_repo = Arc::new(ComponentTemplateRepository::new(conn.clone()));

        let config_manager = Arc::new(
            ConfigManager::from_connection(conn.clone())
                .map_err(|e| format!("无法创建ConfigManager: {}", e))?,
        );

        // ==========================================
        // 初始化API层
        // ==========================================
        let quote_api = Arc::new(QuoteApi::new(
            quote_repo,
            material_repo.clone(),
            config_manager.clone(),
        ));
        let catalog_api = Arc::new(CatalogApi::new(
            material_repo,
            template_repo,
            config_manager.clone(),
        ));

        tracing::info!("AppState初始化完成");

        Ok(Self {
            db_path,
            quote_api,
            catalog_api,
            config_manager,
        })
    }
}

/// 获取默认数据库路径
///
/// 优先级: PRECISION_QUOTE_DB_PATH 环境变量 → 用户数据目录 → 当前目录
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    if let Ok(path) = std::env::var("PRECISION_QUOTE_DB_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./precision_quote.db");

    if let Some(data_dir) = dirs::data_dir() {
        // 开发环境使用独立目录，避免污染生产数据
        #[cfg(debug_assertions)]
        let dir = data_dir.join("precision-quote-dev");

        #[cfg(not(debug_assertions))]
        let dir = data_dir.join("precision-quote");

        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("precision_quote.db");
        }
    }

    path.to_string_lossy().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_default_db_path() {
        let path = get_default_db_path();
        assert!(!path.is_empty());
        assert!(path.ends_with(".db"));
    }

    #[test]
    fn test_app_state_seeds_catalog() {
        let temp_file = tempfile::NamedTempFile::new().unwrap();
        let db_path = temp_file.path().to_str().unwrap().to_string();

        let state = AppState::new(db_path).unwrap();
        let materials = state.catalog_api.list_materials().unwrap();
        assert_eq!(materials.len(), 1);
        assert_eq!(materials[0].name, "D2 (HCHCr)");

        let templates = state.catalog_api.list_component_templates().unwrap();
        assert_eq!(templates[0].name, "TOP PLATE");
    }

    #[test]
    fn test_app_state_is_reopenable() {
        let temp_file = tempfile::NamedTempFile::new().unwrap();
        let db_path = temp_file.path().to_str().unwrap().to_string();

        drop(AppState::new(db_path.clone()).unwrap());
        let state = AppState::new(db_path).unwrap();
        assert_eq!(state.catalog_api.list_materials().unwrap().len(), 1);
    }
}
