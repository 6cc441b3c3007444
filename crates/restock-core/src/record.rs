//! 正規化後的銷售與庫存紀錄

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 銷售通路
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SalesChannel {
    /// 平台倉出貨（Full）
    Full,
    /// 平台倉以外出貨（自有通路等）
    External,
}

/// 銷售紀錄（統計區間內的銷售量）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesRecord {
    /// SKU（已正規化，可能是套組）
    pub sku: String,

    /// 銷售通路
    pub channel: SalesChannel,

    /// 銷售數量
    pub units_sold: Decimal,
}

impl SalesRecord {
    /// 創建新的銷售紀錄
    pub fn new(sku: impl Into<String>, channel: SalesChannel, units_sold: Decimal) -> Self {
        Self {
            sku: sku.into(),
            channel,
            units_sold,
        }
    }
}

/// 庫存紀錄
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockRecord {
    /// SKU（已正規化，可能是套組）
    pub sku: String,

    /// 平台倉庫存
    pub stock_full: Decimal,

    /// 自有實體庫存
    pub stock_physical: Decimal,

    /// 在途數量
    pub in_transit: Decimal,
}

impl StockRecord {
    /// 創建新的庫存紀錄（各庫存池預設為 0）
    pub fn new(sku: impl Into<String>) -> Self {
        Self {
            sku: sku.into(),
            stock_full: Decimal::ZERO,
            stock_physical: Decimal::ZERO,
            in_transit: Decimal::ZERO,
        }
    }

    /// 建構器模式：設置平台倉庫存
    pub fn with_full(mut self, qty: Decimal) -> Self {
        self.stock_full = qty;
        self
    }

    /// 建構器模式：設置實體庫存
    pub fn with_physical(mut self, qty: Decimal) -> Self {
        self.stock_physical = qty;
        self
    }

    /// 建構器模式：設置在途數量
    pub fn with_in_transit(mut self, qty: Decimal) -> Self {
        self.in_transit = qty;
        self
    }
}
