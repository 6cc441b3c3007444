//! 公司間採購量分配
//!
//! 依兩家公司近期銷售占比拆分採購量。B 的份額向下取整，餘數由 A 吸收，
//! 因此 `qty_a + qty_b == qty_total` 恆成立；銷售相同且總量為奇數時，多出的 1 件歸 A。

use restock_core::{Allocation, RestockError, Result};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::ReplenishmentReport;

/// 依銷售占比分配數量
///
/// B 得到 `floor(qty_total × sales_b / 總銷售)`，A 得到其餘數量，所以非整除時 A 一律多分到餘數：
/// 例如 `allocate(10, 1, 2)` 為 A 4 件、B 6 件，而非依 A 份額向下取整的 3 / 7。
///
/// 兩家公司皆無銷售時回傳 [`RestockError::UndefinedAllocation`]，
/// 不會以 50/50 或 100/0 代替。
pub fn allocate(qty_total: u64, sales_a: Decimal, sales_b: Decimal) -> Result<Allocation> {
    for sales in [sales_a, sales_b] {
        if sales.is_sign_negative() && !sales.is_zero() {
            return Err(RestockError::NegativeSales(sales.to_string()));
        }
    }

    let total_sales = sales_a
        .checked_add(sales_b)
        .ok_or_else(|| RestockError::CalculationError("銷售合計溢位".to_string()))?;
    if total_sales.is_zero() {
        return Err(RestockError::UndefinedAllocation);
    }

    let qty = Decimal::from(qty_total);
    // 先乘後除；乘積溢位時改用占比計算
    let share_b = match qty.checked_mul(sales_b) {
        Some(product) => product / total_sales,
        None => qty * (sales_b / total_sales),
    };

    let qty_company_b = share_b
        .floor()
        .to_u64()
        .ok_or_else(|| RestockError::CalculationError(format!("分配數量溢位: {share_b}")))?
        .min(qty_total);

    Ok(Allocation {
        qty_company_a: qty_total - qty_company_b,
        qty_company_b,
    })
}

/// 單一 SKU 的分配結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitLine {
    pub sku: String,
    pub qty_total: u64,
    pub unit_cost: Decimal,
    pub allocation: Allocation,
}

/// 批次分配結果
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitOutcome {
    /// 成功分配的明細（依 SKU 排序）
    pub lines: Vec<SplitLine>,

    /// 兩家公司皆無銷售、無法分配的 SKU
    pub undefined: Vec<String>,
}

impl SplitOutcome {
    /// 是否所有 SKU 都已分配
    pub fn is_complete(&self) -> bool {
        self.undefined.is_empty()
    }
}

/// 依兩家公司的計算結果拆分採購量
///
/// `quantities` 為各 SKU 的合併採購量（例如合併計算的建議量）。
/// 無銷售歷史的 SKU 列入 `undefined`，不會中止整批分配。
pub fn split_suggestions(
    report_a: &ReplenishmentReport,
    report_b: &ReplenishmentReport,
    quantities: &BTreeMap<String, u64>,
) -> Result<SplitOutcome> {
    let mut outcome = SplitOutcome::default();

    for (sku, &qty_total) in quantities {
        let row_a = report_a.row(sku);
        let row_b = report_b.row(sku);
        let sales_a = row_a.map(|r| r.sales_total).unwrap_or(Decimal::ZERO);
        let sales_b = row_b.map(|r| r.sales_total).unwrap_or(Decimal::ZERO);

        match allocate(qty_total, sales_a, sales_b) {
            Ok(allocation) => {
                let unit_cost = row_a
                    .or(row_b)
                    .map(|r| r.unit_cost)
                    .unwrap_or(Decimal::ZERO);
                outcome.lines.push(SplitLine {
                    sku: sku.clone(),
                    qty_total,
                    unit_cost,
                    allocation,
                });
            }
            Err(RestockError::UndefinedAllocation) => {
                tracing::warn!("SKU {} 兩家公司皆無銷售，無法分配", sku);
                outcome.undefined.push(sku.clone());
            }
            Err(e) => return Err(e),
        }
    }

    tracing::debug!(
        "分配完成：{} 筆成功，{} 筆無法分配",
        outcome.lines.len(),
        outcome.undefined.len()
    );

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use restock_core::ReplenishmentRow;
    use rstest::rstest;

    #[rstest]
    #[case::proportional(1000, 300, 700, 300, 700)]
    #[case::tie_odd_goes_to_a(5, 10, 10, 3, 2)]
    #[case::only_a(7, 4, 0, 7, 0)]
    #[case::only_b(7, 0, 4, 0, 7)]
    #[case::zero_quantity(0, 3, 9, 0, 0)]
    #[case::thirds(3, 2, 1, 2, 1)]
    #[case::remainder_goes_to_a(10, 1, 2, 4, 6)]
    fn test_allocate(
        #[case] qty: u64,
        #[case] sales_a: i64,
        #[case] sales_b: i64,
        #[case] expected_a: u64,
        #[case] expected_b: u64,
    ) {
        let result = allocate(qty, Decimal::from(sales_a), Decimal::from(sales_b)).unwrap();

        assert_eq!(result.qty_company_a, expected_a);
        assert_eq!(result.qty_company_b, expected_b);
    }

    #[test]
    fn test_zero_history_is_undefined() {
        let err = allocate(10, Decimal::ZERO, Decimal::ZERO).unwrap_err();
        assert!(matches!(err, RestockError::UndefinedAllocation));
    }

    #[test]
    fn test_negative_sales_rejected() {
        let err = allocate(10, Decimal::from(-1), Decimal::from(5)).unwrap_err();
        assert!(matches!(err, RestockError::NegativeSales(_)));
    }

    #[test]
    fn test_split_suggestions() {
        let report = |id: &str, rows: &[(&str, i64)]| {
            let mut report = ReplenishmentReport::empty(id);
            for (sku, sales) in rows {
                let mut row = ReplenishmentRow::new(*sku, "ACME", Decimal::from(2));
                row.sales_external = Decimal::from(*sales);
                row.refresh_totals().unwrap();
                report.rows.push(row);
            }
            report
        };
        let report_a = report("A", &[("C1", 30), ("C2", 0)]);
        let report_b = report("B", &[("C1", 70)]);
        let quantities = BTreeMap::from([("C1".to_string(), 10), ("C2".to_string(), 4)]);

        let outcome = split_suggestions(&report_a, &report_b, &quantities).unwrap();

        assert_eq!(outcome.lines.len(), 1);
        assert_eq!(outcome.lines[0].allocation.qty_company_a, 3);
        assert_eq!(outcome.lines[0].allocation.qty_company_b, 7);
        assert_eq!(outcome.lines[0].unit_cost, Decimal::from(2));
        assert_eq!(outcome.undefined, vec!["C2"]);
        assert!(!outcome.is_complete());
    }

    #[test]
    fn test_split_reads_unsorted_reports() {
        let mut report_a = ReplenishmentReport::empty("A");
        for (sku, sales) in [("C9", 5), ("C1", 30), ("C4", 1)] {
            let mut row = ReplenishmentRow::new(sku, "ACME", Decimal::ONE);
            row.sales_full = Decimal::from(sales);
            row.refresh_totals().unwrap();
            report_a.rows.push(row);
        }
        let mut report_b = ReplenishmentReport::empty("B");
        let mut row = ReplenishmentRow::new("C1", "ACME", Decimal::ONE);
        row.sales_full = Decimal::from(70);
        row.refresh_totals().unwrap();
        report_b.rows.push(row);
        let quantities = BTreeMap::from([("C1".to_string(), 10)]);

        let outcome = split_suggestions(&report_a, &report_b, &quantities).unwrap();

        assert!(outcome.is_complete());
        assert_eq!(outcome.lines[0].allocation.qty_company_a, 3);
        assert_eq!(outcome.lines[0].allocation.qty_company_b, 7);
    }

    #[test]
    fn test_huge_sales_do_not_panic() {
        let err = allocate(10, Decimal::MAX, Decimal::MAX).unwrap_err();
        assert!(matches!(err, RestockError::CalculationError(_)));
    }

    proptest! {
        #[test]
        fn prop_allocation_conserves_total(
            qty in 0u64..1_000_000,
            sales_a in 0u32..100_000,
            sales_b in 0u32..100_000,
        ) {
            prop_assume!(sales_a + sales_b > 0);
            let result = allocate(qty, Decimal::from(sales_a), Decimal::from(sales_b)).unwrap();

            prop_assert_eq!(result.total(), qty);
            prop_assert!(result.qty_company_b <= qty);
        }

        #[test]
        fn prop_allocation_tracks_share(
            qty in 0u64..1_000_000,
            sales_a in 1u32..100_000,
            sales_b in 1u32..100_000,
        ) {
            let result = allocate(qty, Decimal::from(sales_a), Decimal::from(sales_b)).unwrap();
            let exact_b = Decimal::from(qty) * Decimal::from(sales_b)
                / Decimal::from(sales_a + sales_b);

            // B 取整後與精確值相差不到 1 件
            prop_assert!(Decimal::from(result.qty_company_b) <= exact_b);
            prop_assert!(exact_b - Decimal::from(result.qty_company_b) < Decimal::ONE);
        }
    }
}
