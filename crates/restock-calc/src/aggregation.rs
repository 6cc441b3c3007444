//! 需求與庫存彙總
//!
//! 套組層級的銷售與庫存依 [`Catalog::expand_kit`] 展開為組件層級，
//! 再與商品目錄的供應商、成本資料合併。

use restock_core::{
    canonical_sku, Catalog, EngineWarning, ReplenishmentRow, RestockError, Result, SalesRecord,
    StockRecord, UNKNOWN_SUPPLIER,
};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, BTreeSet};

/// 彙總結果（尚未計算建議量）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Aggregation {
    /// 組件 SKU -> 建議列
    pub rows: BTreeMap<String, ReplenishmentRow>,

    pub warnings: Vec<EngineWarning>,
}

/// 彙總銷售與庫存
///
/// 銷售量依所在切片歸屬通路（`sales_full` 為平台倉、`sales_external` 為外部通路）；
/// 庫存紀錄的三個庫存池各自累加，不會合併。每次呼叫都產生新的結果，不保留任何狀態。
pub fn aggregate(
    sales_full: &[SalesRecord],
    sales_external: &[SalesRecord],
    stock_full: &[StockRecord],
    stock_physical: &[StockRecord],
    catalog: &Catalog,
) -> Result<Aggregation> {
    let mut rows: BTreeMap<String, ReplenishmentRow> = BTreeMap::new();
    let mut unknown: BTreeSet<String> = BTreeSet::new();

    for (records, external) in [(sales_full, false), (sales_external, true)] {
        for record in records {
            let sku = canonical_sku(&record.sku);
            if record.units_sold.is_sign_negative() && !record.units_sold.is_zero() {
                return Err(RestockError::NegativeSales(sku));
            }

            for component in catalog.expand_kit(&sku) {
                let units = explode(record.units_sold, component.quantity_per_kit, &sku)?;
                let row = row_entry(&mut rows, &mut unknown, catalog, &component.component_sku);
                let total = if external {
                    &mut row.sales_external
                } else {
                    &mut row.sales_full
                };
                accumulate(total, units, &sku)?;
            }
        }
    }

    for record in stock_full.iter().chain(stock_physical) {
        let sku = canonical_sku(&record.sku);
        let pools = [record.stock_full, record.stock_physical, record.in_transit];
        if pools.iter().any(|q| q.is_sign_negative() && !q.is_zero()) {
            return Err(RestockError::InvalidParameter(format!(
                "SKU {sku} 庫存不可為負"
            )));
        }

        for component in catalog.expand_kit(&sku) {
            let full = explode(record.stock_full, component.quantity_per_kit, &sku)?;
            let physical = explode(record.stock_physical, component.quantity_per_kit, &sku)?;
            let in_transit = explode(record.in_transit, component.quantity_per_kit, &sku)?;

            let row = row_entry(&mut rows, &mut unknown, catalog, &component.component_sku);
            accumulate(&mut row.stock_full, full, &sku)?;
            accumulate(&mut row.stock_physical, physical, &sku)?;
            accumulate(&mut row.in_transit, in_transit, &sku)?;
        }
    }

    for row in rows.values_mut() {
        row.refresh_totals()?;
    }

    let warnings: Vec<EngineWarning> = unknown
        .iter()
        .map(|sku| EngineWarning::unknown_sku(sku))
        .collect();
    for warning in &warnings {
        tracing::warn!("{}", warning.message);
    }

    tracing::debug!(
        "彙總完成：組件 {} 筆，未知 SKU {} 筆",
        rows.len(),
        unknown.len()
    );

    Ok(Aggregation { rows, warnings })
}

/// 取得組件的建議列，不存在時依商品目錄建立
fn row_entry<'a>(
    rows: &'a mut BTreeMap<String, ReplenishmentRow>,
    unknown: &mut BTreeSet<String>,
    catalog: &Catalog,
    sku: &str,
) -> &'a mut ReplenishmentRow {
    rows.entry(sku.to_string())
        .or_insert_with(|| match catalog.entry(sku) {
            Some(entry) => ReplenishmentRow::new(sku, entry.supplier.clone(), entry.unit_cost),
            None => {
                unknown.insert(sku.to_string());
                ReplenishmentRow::new(sku, UNKNOWN_SUPPLIER, Decimal::ZERO)
            }
        })
}

fn accumulate(total: &mut Decimal, units: Decimal, sku: &str) -> Result<()> {
    *total = total
        .checked_add(units)
        .ok_or_else(|| RestockError::CalculationError(format!("SKU {sku} 累計數量溢位")))?;
    Ok(())
}

fn explode(quantity: Decimal, per_kit: u32, sku: &str) -> Result<Decimal> {
    quantity
        .checked_mul(Decimal::from(per_kit))
        .ok_or_else(|| RestockError::CalculationError(format!("SKU {sku} 套組展開數量溢位")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use restock_core::{CatalogEntry, SalesChannel, WarningKind};

    fn kit_catalog() -> Catalog {
        Catalog::from_parts(
            vec![
                CatalogEntry::new("C1", "ACME", Decimal::new(1050, 2)),
                CatalogEntry::new("C2", "BETA", Decimal::from(4)),
            ],
            vec![
                ("K1".to_string(), "C1".to_string(), 2),
                ("K1".to_string(), "C2".to_string(), 1),
            ],
        )
        .unwrap()
    }

    fn sale(sku: &str, channel: SalesChannel, units: i64) -> SalesRecord {
        SalesRecord::new(sku, channel, Decimal::from(units))
    }

    #[test]
    fn test_kit_sales_are_exploded() {
        let catalog = kit_catalog();
        let sales = vec![sale("K1", SalesChannel::Full, 10)];

        let result = aggregate(&sales, &[], &[], &[], &catalog).unwrap();

        assert_eq!(result.rows["C1"].sales_full, Decimal::from(20));
        assert_eq!(result.rows["C2"].sales_full, Decimal::from(10));
        assert!(!result.rows.contains_key("K1"));
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_channels_and_pools_stay_separate() {
        let catalog = kit_catalog();
        let full = vec![sale("C1", SalesChannel::Full, 3)];
        let external = vec![
            sale("c1", SalesChannel::External, 4),
            sale("C1", SalesChannel::External, 1),
        ];
        let stock_full = vec![StockRecord::new("C1")
            .with_full(Decimal::from(6))
            .with_in_transit(Decimal::from(2))];
        let stock_physical = vec![StockRecord::new("K1").with_physical(Decimal::from(1))];

        let result = aggregate(&full, &external, &stock_full, &stock_physical, &catalog).unwrap();
        let c1 = &result.rows["C1"];

        assert_eq!(c1.sales_full, Decimal::from(3));
        assert_eq!(c1.sales_external, Decimal::from(5));
        assert_eq!(c1.sales_total, Decimal::from(8));
        assert_eq!(c1.stock_full, Decimal::from(6));
        assert_eq!(c1.stock_physical, Decimal::from(2));
        assert_eq!(c1.in_transit, Decimal::from(2));
        assert_eq!(c1.stock_total, Decimal::from(10));
        assert_eq!(c1.supplier, "ACME");
        assert_eq!(result.rows["C2"].stock_physical, Decimal::from(1));
    }

    #[test]
    fn test_unknown_sku_is_kept() {
        let catalog = kit_catalog();
        let sales = vec![sale("X9", SalesChannel::Full, 2), sale("X9", SalesChannel::Full, 1)];

        let result = aggregate(&sales, &[], &[], &[], &catalog).unwrap();
        let row = &result.rows["X9"];

        assert_eq!(row.supplier, UNKNOWN_SUPPLIER);
        assert_eq!(row.unit_cost, Decimal::ZERO);
        assert_eq!(row.sales_total, Decimal::from(3));
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].kind, WarningKind::UnknownSku);
    }

    #[test]
    fn test_aggregation_is_idempotent() {
        let catalog = kit_catalog();
        let sales = vec![sale("K1", SalesChannel::Full, 4)];
        let stock = vec![StockRecord::new("C2").with_full(Decimal::from(3))];

        let first = aggregate(&sales, &[], &stock, &[], &catalog).unwrap();
        let second = aggregate(&sales, &[], &stock, &[], &catalog).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_negative_sales_are_rejected() {
        let catalog = kit_catalog();
        let sales = vec![sale("C1", SalesChannel::Full, -1)];

        let err = aggregate(&sales, &[], &[], &[], &catalog).unwrap_err();
        assert!(matches!(err, RestockError::NegativeSales(ref sku) if sku == "C1"));
    }

    #[test]
    fn test_accumulation_overflow_is_an_error() {
        let catalog = kit_catalog();
        let huge: Decimal = "50000000000000000000000000000".parse().unwrap();
        let sales = vec![
            SalesRecord::new("C1", SalesChannel::External, huge),
            SalesRecord::new("C1", SalesChannel::External, huge),
        ];

        let err = aggregate(&[], &sales, &[], &[], &catalog).unwrap_err();
        assert!(matches!(err, RestockError::CalculationError(ref msg) if msg.contains("C1")));
    }

    #[test]
    fn test_pool_totals_overflow_is_an_error() {
        let catalog = kit_catalog();
        let stock = vec![StockRecord::new("C1")
            .with_full(Decimal::MAX)
            .with_in_transit(Decimal::ONE)];

        let err = aggregate(&[], &[], &stock, &[], &catalog).unwrap_err();
        assert!(matches!(err, RestockError::CalculationError(_)));
    }
}
