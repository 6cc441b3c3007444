//! 補貨計算結果模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{RestockError, Result};

/// 補貨建議列（每個組件 SKU 一列）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplenishmentRow {
    /// 組件 SKU
    pub sku: String,

    /// 供應商
    pub supplier: String,

    /// 單位成本
    pub unit_cost: Decimal,

    /// 平台倉通路銷售
    pub sales_full: Decimal,

    /// 外部通路銷售
    pub sales_external: Decimal,

    /// 總銷售
    pub sales_total: Decimal,

    /// 平台倉庫存
    pub stock_full: Decimal,

    /// 實體庫存
    pub stock_physical: Decimal,

    /// 在途數量
    pub in_transit: Decimal,

    /// 總庫存（平台倉 + 實體 + 在途）
    pub stock_total: Decimal,

    /// 建議採購量
    pub suggested_qty: u64,

    /// 建議採購金額（四捨五入至小數兩位）
    pub suggested_value: Decimal,
}

impl ReplenishmentRow {
    /// 創建空白的建議列
    pub fn new(sku: impl Into<String>, supplier: impl Into<String>, unit_cost: Decimal) -> Self {
        Self {
            sku: sku.into(),
            supplier: supplier.into(),
            unit_cost,
            sales_full: Decimal::ZERO,
            sales_external: Decimal::ZERO,
            sales_total: Decimal::ZERO,
            stock_full: Decimal::ZERO,
            stock_physical: Decimal::ZERO,
            in_transit: Decimal::ZERO,
            stock_total: Decimal::ZERO,
            suggested_qty: 0,
            suggested_value: Decimal::ZERO,
        }
    }

    /// 重新計算合計欄位
    ///
    /// 合計超出 `Decimal` 範圍時回傳 [`RestockError::CalculationError`]，原有合計不變。
    pub fn refresh_totals(&mut self) -> Result<()> {
        let overflow = || RestockError::CalculationError(format!("SKU {} 合計溢位", self.sku));
        let sales_total = self
            .sales_full
            .checked_add(self.sales_external)
            .ok_or_else(overflow)?;
        let stock_total = self
            .stock_full
            .checked_add(self.stock_physical)
            .and_then(|v| v.checked_add(self.in_transit))
            .ok_or_else(overflow)?;
        self.sales_total = sales_total;
        self.stock_total = stock_total;
        Ok(())
    }

    /// 是否需要採購
    pub fn needs_purchase(&self) -> bool {
        self.suggested_qty > 0
    }
}

/// 採購單明細（交給訂單管理模組）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    /// 明細ID
    pub id: Uuid,

    /// SKU
    pub sku: String,

    /// 數量
    pub quantity: u64,

    /// 單位成本
    pub unit_cost: Decimal,

    /// 來源標記（例如公司代碼或計算批次）
    pub origin_tag: String,
}

impl OrderLine {
    /// 創建新的採購明細
    pub fn new(
        sku: impl Into<String>,
        quantity: u64,
        unit_cost: Decimal,
        origin_tag: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            sku: sku.into(),
            quantity,
            unit_cost,
            origin_tag: origin_tag.into(),
        }
    }

    /// 明細金額
    pub fn line_value(&self) -> Decimal {
        Decimal::from(self.quantity) * self.unit_cost
    }
}

/// 兩家公司之間的分配結果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocation {
    pub qty_company_a: u64,
    pub qty_company_b: u64,
}

impl Allocation {
    /// 分配總量
    pub fn total(&self) -> u64 {
        self.qty_company_a + self.qty_company_b
    }
}
