// ==========================================
// 精密报价系统 - 报价数据仓储
// ==========================================
// 红线: 报价表头/明细只追加，不更新不删除
// 红线: “查最新版本 → 计算下一版本号 → 写入”必须在同一事务内完成
// ==========================================

use crate::domain::component::ComponentSpec;
use crate::domain::quote::{Quote, QuoteItem, SaveQuoteRequest, SavedRevision};
use crate::domain::types::ShapeKind;
use crate::engine::versioning::{plan_new_quote, plan_revision, LatestRevision, RevisionRejection};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use std::sync::{Arc, Mutex};

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const QUOTE_COLUMNS: &str = "quote_id, quote_number, version, customer_name, tool_name, \
                             total_cost, created_by, created_at";

/// 一次保存的结果
#[derive(Debug, Clone, PartialEq)]
pub enum SaveOutcome {
    Saved(SavedRevision),
    Rejected(RevisionRejection),
}

// ==========================================
// QuoteRepository - 报价仓储
// ==========================================
pub struct QuoteRepository {
    conn: Arc<Mutex<Connection>>,
}

impl QuoteRepository {
    /// 创建新的QuoteRepository实例
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 保存一个报价版本（表头 + 明细）
    ///
    /// 说明：
    /// - 使用 BEGIN IMMEDIATE 事务：编号判定与写入之间不允许其他写者插入。
    /// - 被拒绝（报价号不存在/重复保存）时事务回滚，不写任何行。
    /// - 任一明细写入失败则整体回滚，不会留下只有表头的报价。
    ///
    /// # 错误
    /// - `RepositoryError::UniqueConstraintViolation`: (quote_number, version) 冲突，可重试
    pub fn save_revision(
        &self,
        request: &SaveQuoteRequest,
        created_by: &str,
        created_at: NaiveDateTime,
    ) -> RepositoryResult<SaveOutcome> {
        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        // 1. 编号判定
        let number = if request.is_new_quote() {
            plan_new_quote(query_max_quote_number(&tx)?)
        } else {
            let latest = query_latest_revision(&tx, request.quote_number)?;
            match plan_revision(
                request.quote_number,
                latest.as_ref(),
                request.grand_total,
                &request.tool_name,
            ) {
                Ok(number) => number,
                Err(rejection) => return Ok(SaveOutcome::Rejected(rejection)),
            }
        };

        // 2. 写入表头
        tx.execute(
            r#"INSERT INTO quote (
                quote_number, version, customer_name, tool_name,
                total_cost, created_by, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?)"#,
            params![
                number.quote_number,
                number.version,
                &request.customer_name,
                &request.tool_name,
                request.grand_total,
                created_by,
                created_at.format(DATETIME_FORMAT).to_string(),
            ],
        )?;
        let quote_id = tx.last_insert_rowid();

        // 3. 写入明细（保持插入顺序）
        {
            let mut stmt = tx.prepare(
                r#"INSERT INTO quote_item (
                    quote_id, line_no, component_name, shape, material_id,
                    length_mm, width_mm, height_mm, manual_price, quantity, final_cost,
                    include_squaring, include_heat_treat,
                    cnc_hours, wire_cut_length_mm, drilling_cost
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
            )?;

            for (idx, item) in request.items.iter().enumerate() {
                let spec = &item.spec;
                stmt.execute(params![
                    quote_id,
                    idx as i64 + 1,
                    &spec.component_name,
                    spec.shape.to_db_str(),
                    spec.material_id,
                    spec.length_mm,
                    spec.width_mm,
                    spec.height_mm,
                    spec.manual_price,
                    spec.quantity,
                    item.final_cost,
                    spec.include_squaring,
                    spec.include_heat_treat,
                    spec.cnc_hours,
                    spec.wire_cut_length_mm,
                    spec.drilling_cost,
                ])?;
            }
        }

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        Ok(SaveOutcome::Saved(SavedRevision {
            quote_id,
            quote_number: number.quote_number,
            version: number.version,
        }))
    }

    /// 按内部ID查询表头
    pub fn find_by_id(&self, quote_id: i64) -> RepositoryResult<Option<Quote>> {
        let conn = self.get_conn()?;

        let sql = format!("SELECT {} FROM quote WHERE quote_id = ?", QUOTE_COLUMNS);
        conn.query_row(&sql, params![quote_id], map_quote_row)
            .optional()
            .map_err(Into::into)
    }

    /// 查询报价号的最新版本
    pub fn find_latest_revision(&self, quote_number: i64) -> RepositoryResult<Option<LatestRevision>> {
        let conn = self.get_conn()?;
        query_latest_revision(&conn, quote_number)
    }

    /// 查询报价号的所有版本（版本号降序）
    pub fn find_by_quote_number(&self, quote_number: i64) -> RepositoryResult<Vec<Quote>> {
        let conn = self.get_conn()?;

        let sql = format!(
            "SELECT {} FROM quote WHERE quote_number = ? ORDER BY version DESC",
            QUOTE_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let quotes = stmt
            .query_map(params![quote_number], map_quote_row)?
            .collect::<Result<Vec<Quote>, _>>()?;

        Ok(quotes)
    }

    /// 查询全部表头（分组由 engine::history 完成）
    pub fn list_all(&self) -> RepositoryResult<Vec<Quote>> {
        let conn = self.get_conn()?;

        let sql = format!(
            "SELECT {} FROM quote ORDER BY quote_number DESC, version DESC",
            QUOTE_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let quotes = stmt
            .query_map([], map_quote_row)?
            .collect::<Result<Vec<Quote>, _>>()?;

        Ok(quotes)
    }

    /// 查询报价明细（按行号升序）
    pub fn find_items(&self, quote_id: i64) -> RepositoryResult<Vec<QuoteItem>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"SELECT item_id, quote_id, line_no, component_name, shape, material_id,
                      length_mm, width_mm, height_mm, manual_price, quantity, final_cost,
                      include_squaring, include_heat_treat,
                      cnc_hours, wire_cut_length_mm, drilling_cost
               FROM quote_item
               WHERE quote_id = ?
               ORDER BY line_no"#,
        )?;

        let items = stmt
            .query_map(params![quote_id], map_item_row)?
            .collect::<Result<Vec<QuoteItem>, _>>()?;

        Ok(items)
    }
}

// ==========================================
// 事务内查询辅助函数
// ==========================================

fn query_max_quote_number(conn: &Connection) -> RepositoryResult<Option<i64>> {
    let max: Option<i64> = conn.query_row("SELECT MAX(quote_number) FROM quote", [], |row| row.get(0))?;
    Ok(max)
}

fn query_latest_revision(conn: &Connection, quote_number: i64) -> RepositoryResult<Option<LatestRevision>> {
    conn.query_row(
        r#"SELECT quote_number, version, total_cost, tool_name
           FROM quote
           WHERE quote_number = ?
           ORDER BY version DESC
           LIMIT 1"#,
        params![quote_number],
        |row| {
            Ok(LatestRevision {
                quote_number: row.get(0)?,
                version: row.get(1)?,
                total_cost: row.get(2)?,
                tool_name: row.get(3)?,
            })
        },
    )
    .optional()
    .map_err(Into::into)
}

// ==========================================
// 行映射
// ==========================================

fn map_quote_row(row: &rusqlite::Row) -> rusqlite::Result<Quote> {
    Ok(Quote {
        quote_id: row.get(0)?,
        quote_number: row.get(1)?,
        version: row.get(2)?,
        customer_name: row.get(3)?,
        tool_name: row.get(4)?,
        total_cost: row.get(5)?,
        created_by: row.get(6)?,
        created_at: NaiveDateTime::parse_from_str(&row.get::<_, String>(7)?, DATETIME_FORMAT)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(7, rusqlite::types::Type::Text, Box::new(e)))?,
    })
}

fn map_item_row(row: &rusqlite::Row) -> rusqlite::Result<QuoteItem> {
    let shape = row
        .get::<_, String>(4)?
        .parse::<ShapeKind>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e)))?;

    Ok(QuoteItem {
        item_id: row.get(0)?,
        quote_id: row.get(1)?,
        line_no: row.get(2)?,
        spec: ComponentSpec {
            component_name: row.get(3)?,
            shape,
            material_id: row.get(5)?,
            length_mm: row.get(6)?,
            width_mm: row.get(7)?,
            height_mm: row.get(8)?,
            manual_price: row.get(9)?,
            quantity: row.get(10)?,
            include_squaring: row.get(12)?,
            include_heat_treat: row.get(13)?,
            cnc_hours: row.get(14)?,
            wire_cut_length_mm: row.get(15)?,
            drilling_cost: row.get(16)?,
        },
        final_cost: row.get(11)?,
    })
}
