//! # Restock Calculation Engine
//!
//! 補貨計算引擎：欄位對應、需求彙總、建議採購量與公司間分配

pub mod aggregation;
pub mod allocation;
pub mod calculator;
pub mod orders;
pub mod schema;
pub mod suggestion;

// Re-export 主要類型
pub use aggregation::{aggregate, Aggregation};
pub use allocation::{allocate, split_suggestions, SplitLine, SplitOutcome};
pub use calculator::{CompanyInputs, ReplenishmentCalculator};
pub use orders::{split_to_order_lines, to_order_lines};
pub use schema::{map_columns, CanonicalField, CanonicalTable, ColumnRule, ReportKind};
pub use suggestion::{suggest, Suggestion};

use restock_core::{EngineWarning, ReplenishmentRow};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 單一公司的補貨計算結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplenishmentReport {
    /// 公司代碼
    pub company_id: String,

    /// 建議列（依 SKU 排序）
    pub rows: Vec<ReplenishmentRow>,

    /// 警告信息
    pub warnings: Vec<EngineWarning>,

    /// 計算耗時（毫秒）
    pub calculation_time_ms: Option<u128>,
}

impl ReplenishmentReport {
    /// 創建空的計算結果
    pub fn empty(company_id: impl Into<String>) -> Self {
        Self {
            company_id: company_id.into(),
            rows: Vec::new(),
            warnings: Vec::new(),
            calculation_time_ms: None,
        }
    }

    /// 添加警告
    pub fn add_warning(&mut self, warning: EngineWarning) {
        self.warnings.push(warning);
    }

    /// 依 SKU 查找建議列
    ///
    /// 計算器產生的列依 SKU 排序；手動組裝或反序列化的報表未必如此，找不到時改為逐列比對。
    pub fn row(&self, sku: &str) -> Option<&ReplenishmentRow> {
        match self.rows.binary_search_by(|row| row.sku.as_str().cmp(sku)) {
            Ok(idx) => self.rows.get(idx),
            Err(_) => self.rows.iter().find(|row| row.sku == sku),
        }
    }

    /// 需要採購的建議列
    pub fn rows_to_purchase(&self) -> impl Iterator<Item = &ReplenishmentRow> {
        self.rows.iter().filter(|row| row.needs_purchase())
    }

    /// 建議採購總金額
    pub fn total_suggested_value(&self) -> Decimal {
        self.rows.iter().map(|row| row.suggested_value).sum()
    }

    /// 各供應商建議採購金額
    pub fn totals_by_supplier(&self) -> BTreeMap<String, Decimal> {
        let mut totals: BTreeMap<String, Decimal> = BTreeMap::new();
        for row in self.rows_to_purchase() {
            *totals.entry(row.supplier.clone()).or_default() += row.suggested_value;
        }
        totals
    }

    /// 各 SKU 的銷售總量
    pub fn sales_by_sku(&self) -> BTreeMap<String, Decimal> {
        self.rows
            .iter()
            .map(|row| (row.sku.clone(), row.sales_total))
            .collect()
    }
}
