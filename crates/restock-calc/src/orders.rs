//! 採購單明細匯出
//!
//! 引擎本身不建立採購單，只輸出可附加到採購單的明細。

use restock_core::{OrderLine, ReplenishmentRow};

use crate::SplitOutcome;

/// 將建議列轉為採購明細（略過建議量為 0 的列）
pub fn to_order_lines(rows: &[ReplenishmentRow], origin_tag: &str) -> Vec<OrderLine> {
    rows.iter()
        .filter(|row| row.needs_purchase())
        .map(|row| OrderLine::new(row.sku.clone(), row.suggested_qty, row.unit_cost, origin_tag))
        .collect()
}

/// 將分配結果拆成兩家公司各自的採購明細
pub fn split_to_order_lines(
    outcome: &SplitOutcome,
    tag_a: &str,
    tag_b: &str,
) -> (Vec<OrderLine>, Vec<OrderLine>) {
    let mut lines_a = Vec::new();
    let mut lines_b = Vec::new();

    for line in &outcome.lines {
        if line.allocation.qty_company_a > 0 {
            lines_a.push(OrderLine::new(
                line.sku.clone(),
                line.allocation.qty_company_a,
                line.unit_cost,
                tag_a,
            ));
        }
        if line.allocation.qty_company_b > 0 {
            lines_b.push(OrderLine::new(
                line.sku.clone(),
                line.allocation.qty_company_b,
                line.unit_cost,
                tag_b,
            ));
        }
    }

    (lines_a, lines_b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SplitLine;
    use restock_core::Allocation;
    use rust_decimal::Decimal;

    #[test]
    fn test_zero_rows_are_skipped() {
        let mut buy = ReplenishmentRow::new("C1", "ACME", Decimal::new(250, 2));
        buy.suggested_qty = 4;
        let skip = ReplenishmentRow::new("C2", "ACME", Decimal::ONE);

        let lines = to_order_lines(&[buy, skip], "SEMANA-42");

        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].sku, "C1");
        assert_eq!(lines[0].quantity, 4);
        assert_eq!(lines[0].line_value(), Decimal::from(10));
        assert_eq!(lines[0].origin_tag, "SEMANA-42");
    }

    #[test]
    fn test_split_lines_per_company() {
        let outcome = SplitOutcome {
            lines: vec![
                SplitLine {
                    sku: "C1".to_string(),
                    qty_total: 10,
                    unit_cost: Decimal::ONE,
                    allocation: Allocation {
                        qty_company_a: 3,
                        qty_company_b: 7,
                    },
                },
                SplitLine {
                    sku: "C2".to_string(),
                    qty_total: 2,
                    unit_cost: Decimal::ONE,
                    allocation: Allocation {
                        qty_company_a: 2,
                        qty_company_b: 0,
                    },
                },
            ],
            undefined: Vec::new(),
        };

        let (lines_a, lines_b) = split_to_order_lines(&outcome, "A", "B");

        assert_eq!(lines_a.len(), 2);
        assert_eq!(lines_b.len(), 1);
        assert_eq!(lines_b[0].quantity, 7);
        assert_ne!(lines_a[0].id, lines_b[0].id);
    }
}
