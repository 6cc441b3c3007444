//! # Restock
//!
//! 多通路零售補貨計算引擎
//!
//! 流程：原始報表 → 欄位對應 → 套組展開與彙總 → 建議採購量 →（選用）兩家公司分配
//!
//! ```no_run
//! use restock::{build_catalog, CompanyInputs, ReplenishmentCalculator, ReplenishmentParams, Table};
//! use std::sync::Arc;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let produtos = Table::from_csv_reader("produtos", std::fs::File::open("produtos.csv")?)?;
//! let kits = Table::from_csv_reader("kits", std::fs::File::open("kits.csv")?)?;
//! let catalog = Arc::new(build_catalog(&produtos, &kits)?);
//!
//! let full = Table::from_csv_reader("FULL", std::fs::File::open("full.csv")?)?;
//! let vendas = Table::from_csv_reader("VENDAS", std::fs::File::open("vendas.csv")?)?;
//! let fisico = Table::from_csv_reader("FISICO", std::fs::File::open("fisico.csv")?)?;
//! let inputs = CompanyInputs::from_tables("EMPRESA-A", &full, &vendas, &fisico)?;
//!
//! let params = ReplenishmentParams::new().with_horizon(30);
//! let calculator = ReplenishmentCalculator::new(catalog, params);
//! let report = calculator.calculate(&inputs)?;
//! for row in report.rows_to_purchase() {
//!     println!("{} {} {}", row.sku, row.suggested_qty, row.suggested_value);
//! }
//! # Ok(())
//! # }
//! ```

pub use restock_cache::{
    fingerprint, CacheStats, CachedCalculator, Fingerprint, ResultCache, DEFAULT_CACHE_CAPACITY,
};
pub use restock_calc::{
    aggregate, allocate, map_columns, split_suggestions, split_to_order_lines, suggest,
    to_order_lines, Aggregation, CanonicalField, CanonicalTable, ColumnRule, CompanyInputs,
    ReplenishmentCalculator, ReplenishmentReport, ReportKind, SplitLine, SplitOutcome, Suggestion,
};
pub use restock_core::{
    build_catalog, canonical_sku, normalize_header, parse_number, strip_diacritics, Allocation,
    Catalog, CatalogEntry, EngineWarning, KitComponent, OrderLine, ReplenishmentParams,
    ReplenishmentRow, RestockError, Result, SalesChannel, SalesRecord, SalesWindow, StockRecord,
    SupplyPolicy, Table, WarningKind, WarningSeverity, UNKNOWN_SUPPLIER,
};
pub use rust_decimal::Decimal;
