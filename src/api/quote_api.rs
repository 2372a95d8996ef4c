// ==========================================
// 精密报价系统 - 报价 API
// ==========================================
// 职责: 零件计价、报价草稿、版本保存、历史查询、载入与导出
// 红线: 每次计算只取一次费率快照；材料缺失时回退默认钢材并记录警告
// 红线: 保存被拒绝时不写任何行；持久化失败不留下半张报价
// ==========================================

use std::collections::HashMap;
use std::io::Write;
use std::sync::Arc;

use chrono::Local;
use serde::Serialize;
use tracing::{error, info, instrument, warn};

use crate::api::error::{ApiError, ApiResult};
use crate::api::validator::{validate_component, validate_components, validate_save_input};
use crate::config::ConfigManager;
use crate::domain::component::{ComponentInput, CostBreakdown};
use crate::domain::material::MaterialRates;
use crate::domain::quote::{
    LoadedQuote, NewQuoteItem, PricedComponent, PricedQuote, QuoteGroup, SaveQuoteInput,
    SaveQuoteRequest, SavedRevision,
};
use crate::domain::settings::RateSettings;
use crate::engine::{group_quotes, CostComposer, QuoteAggregator};
use crate::repository::{MaterialRepository, QuoteRepository, SaveOutcome};

/// (quote_number, version) 唯一约束冲突时的最大尝试次数
pub const MAX_SAVE_ATTEMPTS: u32 = 3;

// ==========================================
// QuoteApi - 报价 API
// ==========================================
pub struct QuoteApi {
    quote_repo: Arc<QuoteRepository>,
    material_repo: Arc<MaterialRepository>,
    config_manager: Arc<ConfigManager>,
    composer: CostComposer,
    aggregator: QuoteAggregator,
}

impl QuoteApi {
    /// 创建新的QuoteApi实例
    pub fn new(
        quote_repo: Arc<QuoteRepository>,
        material_repo: Arc<MaterialRepository>,
        config_manager: Arc<ConfigManager>,
    ) -> Self {
        Self {
            quote_repo,
            material_repo,
            config_manager,
            composer: CostComposer::new(),
            aggregator: QuoteAggregator::new(),
        }
    }

    // ==========================================
    // 计价
    // ==========================================

    /// 计算单个零件的成本明细
    pub fn compute_cost(&self, input: &ComponentInput) -> ApiResult<CostBreakdown> {
        let spec = validate_component(input)?;
        let rates = self.rate_snapshot()?;
        let material = self.resolve_material(spec.material_ref())?;

        let breakdown = self.composer.compose(&spec, material, &rates);
        ensure_finite_breakdown(&breakdown, None)?;
        Ok(breakdown)
    }

    /// 对一组零件计价（共用一次费率快照）
    ///
    /// # 返回
    /// - 每行明细（保持输入顺序）+ 汇总总价
    #[instrument(skip_all, fields(count = inputs.len()))]
    pub fn price_components(&self, inputs: &[ComponentInput]) -> ApiResult<PricedQuote> {
        let specs = validate_components(inputs)?;
        let rates = self.rate_snapshot()?;

        let mut materials: HashMap<Option<i64>, MaterialRates> = HashMap::new();
        let mut components = Vec::with_capacity(specs.len());

        for (idx, spec) in specs.into_iter().enumerate() {
            let key = spec.material_ref();
            let material = match materials.get(&key) {
                Some(material) => *material,
                None => {
                    let material = self.resolve_material(key)?;
                    materials.insert(key, material);
                    material
                }
            };

            let breakdown = self.composer.compose(&spec, material, &rates);
            ensure_finite_breakdown(&breakdown, Some(idx + 1))?;
            components.push(PricedComponent { spec, breakdown });
        }

        let priced = self.aggregator.assemble(components);
        if !priced.grand_total.is_finite() {
            return Err(ApiError::InvalidInput(format!(
                "报价总价超出数值范围: {}",
                priced.grand_total
            )));
        }
        Ok(priced)
    }

    /// 由引擎计价结果生成保存请求
    ///
    /// 行总价与报价总价都取自引擎，不信任调用方的计算结果
    pub fn draft_save_request(
        &self,
        quote_number: i64,
        customer_name: &str,
        tool_name: &str,
        inputs: &[ComponentInput],
    ) -> ApiResult<SaveQuoteRequest> {
        if quote_number < 0 {
            return Err(ApiError::InvalidInput(format!(
                "报价号不能为负数: {}",
                quote_number
            )));
        }

        let priced = self.price_components(inputs)?;

        Ok(SaveQuoteRequest {
            quote_number,
            customer_name: customer_name.to_string(),
            tool_name: tool_name.to_string(),
            grand_total: priced.grand_total,
            items: priced
                .components
                .into_iter()
                .map(|c| NewQuoteItem {
                    final_cost: c.breakdown.grand_total,
                    spec: c.spec,
                })
                .collect(),
        })
    }

    // ==========================================
    // 保存
    // ==========================================

    /// 保存报价（校验原始输入后写入）
    ///
    /// # 返回
    /// - Ok(SavedRevision): 新报价号/版本号
    /// - Err(ApiError::NotFound): 修订的报价号不存在
    /// - Err(ApiError::DuplicateRevision): 总价与工具名均未变化
    pub fn save_quote(&self, input: &SaveQuoteInput, created_by: &str) -> ApiResult<SavedRevision> {
        let request = validate_save_input(input, created_by)?;
        self.save_request(&request, created_by)
    }

    /// 保存已校验的报价请求
    ///
    /// 唯一约束冲突（并发写者抢先写入同一版本）时重新判定编号并重试
    pub fn save_request(
        &self,
        request: &SaveQuoteRequest,
        created_by: &str,
    ) -> ApiResult<SavedRevision> {
        let created_by = created_by.trim();
        if created_by.is_empty() {
            return Err(ApiError::InvalidInput("创建人不能为空".to_string()));
        }
        if !request.grand_total.is_finite() || request.grand_total < 0.0 {
            return Err(ApiError::InvalidInput(format!(
                "报价总价无效: {}",
                request.grand_total
            )));
        }

        let mut attempt = 0;
        loop {
            attempt += 1;
            let created_at = Local::now().naive_local();

            match self.quote_repo.save_revision(request, created_by, created_at) {
                Ok(SaveOutcome::Saved(saved)) => {
                    info!(
                        quote_id = saved.quote_id,
                        quote_number = saved.quote_number,
                        version = saved.version,
                        items = request.items.len(),
                        grand_total = request.grand_total,
                        created_by,
                        "报价已保存"
                    );
                    return Ok(saved);
                }
                Ok(SaveOutcome::Rejected(rejection)) => {
                    warn!(
                        quote_number = request.quote_number,
                        grand_total = request.grand_total,
                        tool_name = %request.tool_name,
                        "报价保存被拒绝: {}",
                        rejection
                    );
                    return Err(rejection.into());
                }
                Err(e) if e.is_unique_violation() && attempt < MAX_SAVE_ATTEMPTS => {
                    warn!(
                        quote_number = request.quote_number,
                        attempt,
                        "版本号冲突，重试保存: {}",
                        e
                    );
                }
                Err(e) => {
                    error!(
                        quote_number = request.quote_number,
                        attempt,
                        "报价保存失败: {}",
                        e
                    );
                    return Err(e.into());
                }
            }
        }
    }

    // ==========================================
    // 历史与载入
    // ==========================================

    /// 按报价号分组的历史列表（报价号降序）
    pub fn list_quote_groups(&self) -> ApiResult<Vec<QuoteGroup>> {
        let rows = self.quote_repo.list_all()?;
        Ok(group_quotes(rows))
    }

    /// 查询单个报价号的全部版本
    pub fn get_quote_group(&self, quote_number: i64) -> ApiResult<QuoteGroup> {
        let rows = self.quote_repo.find_by_quote_number(quote_number)?;
        group_quotes(rows)
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::NotFound(format!("报价号{}不存在", quote_number)))
    }

    /// 载入报价
    ///
    /// 表头总价与行总价为保存时冻结的值；
    /// breakdowns 按当前费率与当前材料数据重新计算
    #[instrument(skip(self))]
    pub fn load_quote(&self, quote_id: i64) -> ApiResult<LoadedQuote> {
        let header = self
            .quote_repo
            .find_by_id(quote_id)?
            .ok_or_else(|| ApiError::NotFound(format!("报价(id={})不存在", quote_id)))?;

        let items = self.quote_repo.find_items(quote_id)?;
        let rates = self.rate_snapshot()?;

        let mut breakdowns = Vec::with_capacity(items.len());
        for item in &items {
            let material = self.resolve_material(item.spec.material_ref())?;
            breakdowns.push(self.composer.compose(&item.spec, material, &rates));
        }

        Ok(LoadedQuote {
            header,
            items,
            breakdowns,
        })
    }

    /// 导出报价明细为 CSV（每行一个零件）
    pub fn export_quote_csv<W: Write>(&self, quote_id: i64, writer: W) -> ApiResult<()> {
        let loaded = self.load_quote(quote_id)?;

        let mut csv_writer = csv::Writer::from_writer(writer);
        for (item, breakdown) in loaded.items.iter().zip(loaded.breakdowns.iter()) {
            let spec = &item.spec;
            csv_writer
                .serialize(QuoteCsvRow {
                    quote_number: loaded.header.quote_number,
                    version: loaded.header.version,
                    line_no: item.line_no,
                    component_name: &spec.component_name,
                    shape: spec.shape.to_db_str(),
                    length_mm: spec.length_mm,
                    width_mm: spec.width_mm,
                    height_mm: spec.height_mm,
                    quantity: spec.quantity,
                    final_cost: item.final_cost,
                    weight_kg: breakdown.weight_kg,
                    area_sq_inch: breakdown.area_sq_inch,
                    material_cost: breakdown.material_cost,
                    squaring_cost: breakdown.squaring_cost,
                    heat_treat_cost: breakdown.heat_treat_cost,
                    cnc_cost: breakdown.cnc_cost,
                    wire_cut_cost: breakdown.wire_cut_cost,
                    drilling_cost: spec.drilling_cost,
                    unit_total: breakdown.unit_total,
                    current_total: breakdown.grand_total,
                })
                .map_err(|e| ApiError::InternalError(format!("CSV导出失败: {}", e)))?;
        }

        csv_writer
            .flush()
            .map_err(|e| ApiError::InternalError(format!("CSV导出失败: {}", e)))?;
        Ok(())
    }

    // ==========================================
    // 内部辅助
    // ==========================================

    fn rate_snapshot(&self) -> ApiResult<RateSettings> {
        self.config_manager
            .get_rate_settings()
            .map_err(|e| ApiError::PersistenceFailure(format!("读取费率失败: {}", e)))
    }

    /// 材料解析：未指定/0 → 默认钢材；指定但不存在 → 默认钢材 + 警告
    fn resolve_material(&self, material_id: Option<i64>) -> ApiResult<MaterialRates> {
        let Some(id) = material_id else {
            return Ok(MaterialRates::default_steel());
        };

        match self.material_repo.find_by_id(id)? {
            Some(material) => Ok(MaterialRates::from(&material)),
            None => {
                warn!(material_id = id, "材料不存在，按默认钢材计价");
                Ok(MaterialRates::default_steel())
            }
        }
    }
}

/// 尺寸/工时过大时计算结果会溢出为无穷大，按非法输入拒绝
fn ensure_finite_breakdown(breakdown: &CostBreakdown, line_no: Option<usize>) -> ApiResult<()> {
    if breakdown.unit_total.is_finite() && breakdown.grand_total.is_finite() {
        return Ok(());
    }

    let location = match line_no {
        Some(line) => format!("第{}行 ", line),
        None => String::new(),
    };
    Err(ApiError::InvalidInput(format!(
        "{}计算结果超出数值范围: 单件合计={}, 行总价={}",
        location, breakdown.unit_total, breakdown.grand_total
    )))
}

/// CSV 导出行
#[derive(Debug, Serialize)]
struct QuoteCsvRow<'a> {
    quote_number: i64,
    version: i32,
    line_no: i32,
    component_name: &'a str,
    shape: &'static str,
    length_mm: f64,
    width_mm: f64,
    height_mm: f64,
    quantity: u32,
    final_cost: f64,
    weight_kg: f64,
    area_sq_inch: f64,
    material_cost: f64,
    squaring_cost: f64,
    heat_treat_cost: f64,
    cnc_cost: f64,
    wire_cut_cost: f64,
    drilling_cost: f64,
    unit_total: f64,
    current_total: f64,
}
