//! # Restock Core
//!
//! 補貨計算的核心資料模型與類型定義

pub mod catalog;
pub mod config;
pub mod number;
pub mod record;
pub mod row;
pub mod table;
pub mod text;
pub mod warning;

// Re-export 主要類型
pub use catalog::{build_catalog, Catalog, CatalogEntry, KitComponent, UNKNOWN_SUPPLIER};
pub use config::{ReplenishmentParams, SalesWindow, SupplyPolicy};
pub use number::parse_number;
pub use record::{SalesChannel, SalesRecord, StockRecord};
pub use row::{Allocation, OrderLine, ReplenishmentRow};
pub use table::Table;
pub use text::{canonical_sku, normalize_header, strip_diacritics};
pub use warning::{EngineWarning, WarningKind, WarningSeverity};

/// 補貨引擎錯誤類型
///
/// 結構性錯誤會中止受影響資料表的計算；資料品質問題則以 [`EngineWarning`] 回報。
#[derive(Debug, thiserror::Error)]
pub enum RestockError {
    #[error("{table} 缺少必要欄位 {missing:?}，實際欄位: {present:?}")]
    MissingColumns {
        table: String,
        missing: Vec<String>,
        present: Vec<String>,
    },

    #[error("{table} 欄位 {field} 有多個候選: {candidates:?}")]
    AmbiguousColumn {
        table: String,
        field: String,
        candidates: Vec<String>,
    },

    #[error("{table} 第 {row} 列欄位 {column} 無法解析數值: {raw:?}")]
    MalformedNumber {
        table: String,
        column: String,
        row: usize,
        raw: String,
    },

    #[error("套組 {kit} 的組件 {component} 數量無效: {raw:?}")]
    InvalidKitQuantity {
        kit: String,
        component: String,
        raw: String,
    },

    #[error("套組結構存在循環: {}", .0.join(" -> "))]
    KitCycle(Vec<String>),

    #[error("兩家公司皆無銷售紀錄，無法分配")]
    UndefinedAllocation,

    #[error("銷售量不可為負: {0}")]
    NegativeSales(String),

    #[error("無效的參數: {0}")]
    InvalidParameter(String),

    #[error("CSV 讀取錯誤: {0}")]
    Csv(#[from] csv::Error),

    #[error("序列化錯誤: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("計算錯誤: {0}")]
    CalculationError(String),
}

pub type Result<T> = std::result::Result<T, RestockError>;
