//! 建議採購量計算

use restock_core::{EngineWarning, ReplenishmentParams, ReplenishmentRow, RestockError, Result};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// 單一 SKU 的建議結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    /// 建議採購量（非負整數）
    pub suggested_qty: u64,

    /// 建議採購金額（四捨五入至小數兩位）
    pub suggested_value: Decimal,

    /// 無銷售歷史時的提示
    pub advisory: Option<EngineWarning>,
}

impl Suggestion {
    fn none(advisory: Option<EngineWarning>) -> Self {
        Self {
            suggested_qty: 0,
            suggested_value: Decimal::ZERO,
            advisory,
        }
    }
}

/// 計算建議採購量
///
/// 目標量 = 銷售總量 / 統計天數 × (1 + 成長率%) × (覆蓋天數 + 提前期)，
/// 為避免中間步驟的捨入誤差，除法最後才做。
/// 建議量 = max(0, round(目標量 - 可用供應))；金額只在最後四捨五入一次。
/// 銷售總量為 0 時不外推，建議量為 0 並附上提示。
pub fn suggest(row: &ReplenishmentRow, params: &ReplenishmentParams) -> Result<Suggestion> {
    if row.sales_total <= Decimal::ZERO {
        return Ok(Suggestion::none(Some(EngineWarning::insufficient_history(
            &row.sku,
        ))));
    }

    let target = target_units(row, params)?;
    let available = params
        .supply_policy
        .available_supply(row.stock_full, row.stock_physical, row.in_transit)
        .ok_or_else(|| overflow(&row.sku))?;
    let gap = target
        .checked_sub(available)
        .ok_or_else(|| overflow(&row.sku))?;

    if gap <= Decimal::ZERO {
        return Ok(Suggestion::none(None));
    }

    let suggested_qty = gap
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_u64()
        .ok_or_else(|| overflow(&row.sku))?;

    let suggested_value = Decimal::from(suggested_qty)
        .checked_mul(row.unit_cost)
        .ok_or_else(|| overflow(&row.sku))?
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);

    Ok(Suggestion {
        suggested_qty,
        suggested_value,
        advisory: None,
    })
}

/// 覆蓋期間的目標量
fn target_units(row: &ReplenishmentRow, params: &ReplenishmentParams) -> Result<Decimal> {
    let hundred = Decimal::ONE_HUNDRED;
    let growth_factor = hundred + params.growth_pct;
    if growth_factor <= Decimal::ZERO {
        return Ok(Decimal::ZERO);
    }

    let coverage = params.coverage_days()?;
    let numerator = row
        .sales_total
        .checked_mul(growth_factor)
        .and_then(|v| v.checked_mul(Decimal::from(coverage)))
        .ok_or_else(|| overflow(&row.sku))?;
    let denominator = Decimal::from(params.lookback_days) * hundred;

    numerator
        .checked_div(denominator)
        .ok_or_else(|| RestockError::InvalidParameter("lookback_days 必須大於 0".to_string()))
}

fn overflow(sku: &str) -> RestockError {
    RestockError::CalculationError(format!("SKU {sku} 建議量計算溢位"))
}
