// ==========================================
// 精密报价系统 - 目录 API
// ==========================================
// 职责: 材料列表、标准零件模板、全局工艺费率
// ==========================================

use std::sync::Arc;

use crate::api::error::{ApiError, ApiResult};
use crate::config::ConfigManager;
use crate::domain::component::{ComponentInput, ComponentTemplate};
use crate::domain::material::Material;
use crate::domain::settings::RateSettings;
use crate::repository::{ComponentTemplateRepository, MaterialRepository};

pub struct CatalogApi {
    material_repo: Arc<MaterialRepository>,
    template_repo: Arc<ComponentTemplateRepository>,
    config_manager: Arc<ConfigManager>,
}

impl CatalogApi {
    pub fn new(
        material_repo: Arc<MaterialRepository>,
        template_repo: Arc<ComponentTemplateRepository>,
        config_manager: Arc<ConfigManager>,
    ) -> Self {
        Self {
            material_repo,
            template_repo,
            config_manager,
        }
    }

    /// 材料列表（按ID升序）
    pub fn list_materials(&self) -> ApiResult<Vec<Material>> {
        Ok(self.material_repo.list_all()?)
    }

    /// 标准零件模板（按 display_order）
    pub fn list_component_templates(&self) -> ApiResult<Vec<ComponentTemplate>> {
        Ok(self.template_repo.list_ordered()?)
    }

    /// 新建报价时的预填零件行
    pub fn new_components_from_templates(&self) -> ApiResult<Vec<ComponentInput>> {
        Ok(self
            .list_component_templates()?
            .iter()
            .map(ComponentTemplate::to_input)
            .collect())
    }

    pub fn get_rate_settings(&self) -> ApiResult<RateSettings> {
        self.config_manager
            .get_rate_settings()
            .map_err(|e| ApiError::PersistenceFailure(format!("读取费率失败: {}", e)))
    }

    /// 更新全局费率（四项同时写入）
    pub fn update_rate_settings(&self, rates: &RateSettings) -> ApiResult<()> {
        let values = [
            rates.cnc_rate_hourly,
            rates.wire_cut_rate_per_mm,
            rates.squaring_rate_per_sq_inch,
            rates.heat_treat_rate_per_kg,
        ];
        if values.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(ApiError::InvalidInput(format!("费率必须为非负有限值: {:?}", rates)));
        }

        self.config_manager
            .update_rate_settings(rates)
            .map_err(|e| ApiError::PersistenceFailure(format!("更新费率失败: {}", e)))
    }

    /// 全局配置快照（JSON）
    pub fn get_config_snapshot(&self) -> ApiResult<String> {
        self.config_manager
            .get_config_snapshot()
            .map_err(|e| ApiError::PersistenceFailure(format!("读取配置失败: {}", e)))
    }
}
