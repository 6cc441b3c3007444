//! 補貨主計算器

use rayon::prelude::*;
use restock_core::{
    Catalog, EngineWarning, ReplenishmentParams, SalesChannel, SalesRecord, StockRecord, Table,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::schema::{map_columns, ReportKind};
use crate::ReplenishmentReport;

/// 單一公司的計算輸入（已正規化）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyInputs {
    /// 公司代碼
    pub company_id: String,

    /// 平台倉通路銷售
    pub sales_full: Vec<SalesRecord>,

    /// 外部通路銷售
    pub sales_external: Vec<SalesRecord>,

    /// 平台倉庫存（含在途）
    pub stock_full: Vec<StockRecord>,

    /// 實體庫存
    pub stock_physical: Vec<StockRecord>,

    /// 欄位對應階段產生的警告
    pub warnings: Vec<EngineWarning>,
}

impl CompanyInputs {
    pub fn new(company_id: impl Into<String>) -> Self {
        Self {
            company_id: company_id.into(),
            ..Default::default()
        }
    }

    /// 建構器模式：設置平台倉銷售
    pub fn with_sales_full(mut self, records: Vec<SalesRecord>) -> Self {
        self.sales_full = records;
        self
    }

    /// 建構器模式：設置外部通路銷售
    pub fn with_sales_external(mut self, records: Vec<SalesRecord>) -> Self {
        self.sales_external = records;
        self
    }

    /// 建構器模式：設置平台倉庫存
    pub fn with_stock_full(mut self, records: Vec<StockRecord>) -> Self {
        self.stock_full = records;
        self
    }

    /// 建構器模式：設置實體庫存
    pub fn with_stock_physical(mut self, records: Vec<StockRecord>) -> Self {
        self.stock_physical = records;
        self
    }

    /// 從三份原始報表建立（FULL、VENDAS、FISICO）
    pub fn from_tables(
        company_id: impl Into<String>,
        full: &Table,
        vendas: &Table,
        fisico: &Table,
    ) -> restock_core::Result<Self> {
        let full = map_columns(full, ReportKind::Full)?;
        let vendas = map_columns(vendas, ReportKind::Vendas)?;
        let fisico = map_columns(fisico, ReportKind::Fisico)?;

        let mut warnings = full.warnings.clone();
        warnings.extend(vendas.warnings.iter().cloned());
        warnings.extend(fisico.warnings.iter().cloned());

        Ok(Self {
            company_id: company_id.into(),
            sales_full: full.sales_records(SalesChannel::Full),
            sales_external: vendas.sales_records(SalesChannel::External),
            stock_full: full.stock_records(),
            stock_physical: fisico.stock_records(),
            warnings,
        })
    }

    /// 合併多家公司的輸入（用於合併採購）
    pub fn merged(company_id: impl Into<String>, parts: &[&CompanyInputs]) -> Self {
        let mut merged = Self::new(company_id);
        for part in parts {
            merged.sales_full.extend(part.sales_full.iter().cloned());
            merged.sales_external.extend(part.sales_external.iter().cloned());
            merged.stock_full.extend(part.stock_full.iter().cloned());
            merged.stock_physical.extend(part.stock_physical.iter().cloned());
            merged.warnings.extend(part.warnings.iter().cloned());
        }
        merged
    }

    /// 紀錄總筆數
    pub fn record_count(&self) -> usize {
        self.sales_full.len()
            + self.sales_external.len()
            + self.stock_full.len()
            + self.stock_physical.len()
    }
}

/// 補貨計算器
///
/// 商品目錄唯讀，可在多個計算（例如每家公司各一個）之間共享。
#[derive(Debug, Clone)]
pub struct ReplenishmentCalculator {
    catalog: Arc<Catalog>,
    params: ReplenishmentParams,
}

impl ReplenishmentCalculator {
    /// 創建新的補貨計算器
    pub fn new(catalog: Arc<Catalog>, params: ReplenishmentParams) -> Self {
        Self { catalog, params }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn params(&self) -> &ReplenishmentParams {
        &self.params
    }

    /// 主補貨計算入口
    pub fn calculate(&self, inputs: &CompanyInputs) -> restock_core::Result<ReplenishmentReport> {
        self.params.validate()?;

        tracing::info!(
            "開始補貨計算：公司 {}，紀錄 {} 筆，目錄商品 {} 筆",
            inputs.company_id,
            inputs.record_count(),
            self.catalog.len()
        );

        let start_time = std::time::Instant::now();

        // Step 1: 套組展開與彙總
        tracing::debug!("Step 1: 需求與庫存彙總");
        let aggregation = crate::aggregation::aggregate(
            &inputs.sales_full,
            &inputs.sales_external,
            &inputs.stock_full,
            &inputs.stock_physical,
            &self.catalog,
        )?;

        let mut report = ReplenishmentReport::empty(inputs.company_id.clone());
        report.warnings.extend(inputs.warnings.iter().cloned());
        report.warnings.extend(aggregation.warnings);

        // Step 2: 逐 SKU 計算建議量
        tracing::debug!("Step 2: 建議採購量（{} 個 SKU）", aggregation.rows.len());
        for (_, mut row) in aggregation.rows {
            let suggestion = crate::suggestion::suggest(&row, &self.params)?;
            row.suggested_qty = suggestion.suggested_qty;
            row.suggested_value = suggestion.suggested_value;
            if let Some(advisory) = suggestion.advisory {
                report.add_warning(advisory);
            }
            report.rows.push(row);
        }

        report.calculation_time_ms = Some(start_time.elapsed().as_millis());

        tracing::info!("補貨計算完成，耗時 {:?}", start_time.elapsed());
        tracing::info!(
            "需採購 SKU: {}，警告: {}",
            report.rows_to_purchase().count(),
            report.warnings.len()
        );

        Ok(report)
    }

    /// 平行計算多家公司
    ///
    /// 每家公司使用各自的輸入；任一公司失敗即回傳該錯誤。
    pub fn calculate_companies(
        &self,
        inputs: &[CompanyInputs],
    ) -> restock_core::Result<Vec<ReplenishmentReport>> {
        inputs.par_iter().map(|input| self.calculate(input)).collect()
    }
}
