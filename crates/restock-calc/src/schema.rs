//! 報表欄位對應
//!
//! 不同營運系統匯出的報表欄位名稱不一致（例如 `Estoque Full (Un)` 與 `estoque_full_un`）。
//! 每種報表類型有一份依優先順序排列的規則表，依序認領欄位；
//! 新增來源格式只需調整規則表，不影響彙總邏輯。

use restock_core::{
    canonical_sku, parse_number, EngineWarning, RestockError, Result, SalesChannel, SalesRecord,
    StockRecord, Table,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 報表類型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReportKind {
    /// 平台倉報表（平台倉銷售與庫存）
    Full,
    /// 外部通路銷售報表
    Vendas,
    /// 實體庫存報表
    Fisico,
}

/// 標準欄位
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CanonicalField {
    Sku,
    UnitsSold,
    StockFull,
    StockPhysical,
    InTransit,
}

impl CanonicalField {
    /// 標準欄位名稱（完全相符時優先認領）
    pub fn name(&self) -> &'static str {
        match self {
            CanonicalField::Sku => "sku",
            CanonicalField::UnitsSold => "units_sold",
            CanonicalField::StockFull => "stock_full",
            CanonicalField::StockPhysical => "stock_physical",
            CanonicalField::InTransit => "in_transit",
        }
    }
}

/// 欄位對應規則
///
/// `patterns` 依序嘗試，每個模式是一組關鍵字，正規化後的欄位名稱須包含全部關鍵字。
#[derive(Debug, Clone, Copy)]
pub struct ColumnRule {
    pub field: CanonicalField,
    pub required: bool,
    pub patterns: &'static [&'static [&'static str]],
}

const SKU_PATTERNS: &[&[&str]] = &[&["sku"], &["codigo"]];

const FULL_RULES: &[ColumnRule] = &[
    ColumnRule {
        field: CanonicalField::Sku,
        required: true,
        patterns: SKU_PATTERNS,
    },
    // 在途先認領，避免「estoque em trânsito」被當成平台倉庫存
    ColumnRule {
        field: CanonicalField::InTransit,
        required: false,
        patterns: &[&["transito"], &["caminho"], &["transit"]],
    },
    ColumnRule {
        field: CanonicalField::StockFull,
        required: true,
        patterns: &[&["estoque", "full"], &["estoque"], &["stock"]],
    },
    ColumnRule {
        field: CanonicalField::UnitsSold,
        required: true,
        patterns: &[&["vendas"], &["vendid"], &["sold"], &["qtd", "vend"]],
    },
];

const VENDAS_RULES: &[ColumnRule] = &[
    ColumnRule {
        field: CanonicalField::Sku,
        required: true,
        patterns: SKU_PATTERNS,
    },
    ColumnRule {
        field: CanonicalField::UnitsSold,
        required: true,
        patterns: &[
            &["quantidade"],
            &["qtd"],
            &["vendas"],
            &["vendid"],
            &["unidades"],
            &["sold"],
        ],
    },
];

const FISICO_RULES: &[ColumnRule] = &[
    ColumnRule {
        field: CanonicalField::Sku,
        required: true,
        patterns: SKU_PATTERNS,
    },
    ColumnRule {
        field: CanonicalField::StockPhysical,
        required: true,
        patterns: &[&["fisico"], &["estoque"], &["stock"], &["saldo"]],
    },
];

impl ReportKind {
    /// 規則表（依認領順序）
    pub fn rules(&self) -> &'static [ColumnRule] {
        match self {
            ReportKind::Full => FULL_RULES,
            ReportKind::Vendas => VENDAS_RULES,
            ReportKind::Fisico => FISICO_RULES,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ReportKind::Full => "FULL",
            ReportKind::Vendas => "VENDAS",
            ReportKind::Fisico => "FISICO",
        }
    }

    /// 報表中銷售量所屬的通路
    pub fn sales_channel(&self) -> Option<SalesChannel> {
        match self {
            ReportKind::Full => Some(SalesChannel::Full),
            ReportKind::Vendas => Some(SalesChannel::External),
            ReportKind::Fisico => None,
        }
    }
}

/// 正規化後的資料列
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalRecord {
    pub sku: String,
    pub values: BTreeMap<CanonicalField, Decimal>,
}

impl CanonicalRecord {
    /// 取得欄位數值（未對應的欄位為 0）
    pub fn value(&self, field: CanonicalField) -> Decimal {
        self.values.get(&field).copied().unwrap_or(Decimal::ZERO)
    }
}

/// 欄位對應結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalTable {
    pub kind: ReportKind,

    /// 來源報表名稱
    pub source: String,

    /// 標準欄位 -> 原始欄位名稱
    pub mapping: BTreeMap<CanonicalField, String>,

    /// 未找到的選填欄位（與「數值為 0」區分）
    pub absent: Vec<CanonicalField>,

    pub records: Vec<CanonicalRecord>,

    pub warnings: Vec<EngineWarning>,
}

impl CanonicalTable {
    /// 欄位是否存在於來源報表
    pub fn has_field(&self, field: CanonicalField) -> bool {
        self.mapping.contains_key(&field)
    }

    /// 轉為銷售紀錄
    pub fn sales_records(&self, channel: SalesChannel) -> Vec<SalesRecord> {
        if !self.has_field(CanonicalField::UnitsSold) {
            return Vec::new();
        }
        self.records
            .iter()
            .map(|r| SalesRecord::new(r.sku.clone(), channel, r.value(CanonicalField::UnitsSold)))
            .collect()
    }

    /// 轉為庫存紀錄
    pub fn stock_records(&self) -> Vec<StockRecord> {
        let has_stock = [
            CanonicalField::StockFull,
            CanonicalField::StockPhysical,
            CanonicalField::InTransit,
        ]
        .iter()
        .any(|f| self.has_field(*f));
        if !has_stock {
            return Vec::new();
        }

        self.records
            .iter()
            .map(|r| {
                StockRecord::new(r.sku.clone())
                    .with_full(r.value(CanonicalField::StockFull))
                    .with_physical(r.value(CanonicalField::StockPhysical))
                    .with_in_transit(r.value(CanonicalField::InTransit))
            })
            .collect()
    }
}

/// 將原始報表對應為標準欄位
///
/// 必要欄位缺漏回傳 [`RestockError::MissingColumns`]；同一模式命中多個欄位回傳
/// [`RestockError::AmbiguousColumn`]。數值儲存格無法解析時回傳
/// [`RestockError::MalformedNumber`]（列號從 1 起算）。
pub fn map_columns(table: &Table, kind: ReportKind) -> Result<CanonicalTable> {
    let normalized = table.normalized_headers();
    let mut claimed = vec![false; normalized.len()];
    let mut mapping = BTreeMap::new();
    let mut columns: Vec<(CanonicalField, usize)> = Vec::new();
    let mut missing = Vec::new();
    let mut absent = Vec::new();

    for rule in kind.rules() {
        match claim_column(table, rule, &normalized, &claimed)? {
            Some(col) => {
                claimed[col] = true;
                mapping.insert(rule.field, table.headers[col].clone());
                columns.push((rule.field, col));
            }
            None if rule.required => missing.push(rule.field.name().to_string()),
            None => absent.push(rule.field),
        }
    }

    if !missing.is_empty() {
        return Err(RestockError::MissingColumns {
            table: table.name.clone(),
            missing,
            present: table.headers.clone(),
        });
    }

    tracing::debug!("{} 欄位對應: {:?}", kind.label(), mapping);

    let mut warnings: Vec<EngineWarning> = absent
        .iter()
        .map(|field| EngineWarning::field_not_found(&table.name, field.name()))
        .collect();

    let sku_col = mapping_column(&columns, CanonicalField::Sku);
    let mut records = Vec::with_capacity(table.len());
    for row in 0..table.len() {
        let sku = sku_col
            .map(|col| canonical_sku(table.cell(row, col)))
            .unwrap_or_default();
        if sku.is_empty() {
            warnings.push(EngineWarning::blank_sku(&table.name, row + 1));
            continue;
        }

        let mut values = BTreeMap::new();
        for &(field, col) in columns.iter().filter(|(f, _)| *f != CanonicalField::Sku) {
            let raw = table.cell(row, col);
            let value = parse_number(raw)
                .map_err(|_| RestockError::MalformedNumber {
                    table: table.name.clone(),
                    column: table.headers[col].clone(),
                    row: row + 1,
                    raw: raw.to_string(),
                })?
                .unwrap_or(Decimal::ZERO);
            values.insert(field, value);
        }

        for (field, value) in values.iter_mut() {
            if value.is_sign_negative() && !value.is_zero() {
                warnings.push(EngineWarning::negative_value_clamped(
                    &table.name,
                    &sku,
                    field.name(),
                ));
                *value = Decimal::ZERO;
            }
        }

        records.push(CanonicalRecord { sku, values });
    }

    for warning in &warnings {
        tracing::warn!("{}", warning.message);
    }

    Ok(CanonicalTable {
        kind,
        source: table.name.clone(),
        mapping,
        absent,
        records,
        warnings,
    })
}

fn mapping_column(columns: &[(CanonicalField, usize)], field: CanonicalField) -> Option<usize> {
    columns.iter().find(|(f, _)| *f == field).map(|(_, col)| *col)
}

/// 依規則認領一個未被使用的欄位
fn claim_column(
    table: &Table,
    rule: &ColumnRule,
    normalized: &[String],
    claimed: &[bool],
) -> Result<Option<usize>> {
    let unclaimed = move || {
        normalized
            .iter()
            .enumerate()
            .filter(move |(i, _)| !claimed[*i])
    };

    if let Some((col, _)) = unclaimed().find(|(_, h)| h.as_str() == rule.field.name()) {
        return Ok(Some(col));
    }

    for keywords in rule.patterns {
        let candidates: Vec<usize> = unclaimed()
            .filter(|(_, h)| keywords.iter().all(|k| h.contains(k)))
            .map(|(i, _)| i)
            .collect();

        match candidates.as_slice() {
            [] => continue,
            [col] => return Ok(Some(*col)),
            _ => {
                return Err(RestockError::AmbiguousColumn {
                    table: table.name.clone(),
                    field: rule.field.name().to_string(),
                    candidates: candidates.iter().map(|&i| table.headers[i].clone()).collect(),
                })
            }
        }
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use restock_core::WarningKind;
    use rstest::rstest;

    #[test]
    fn test_map_full_report() {
        let table = Table::from_rows(
            "FULL",
            &["Código SKU", "Estoque Full (Un)", "Em Trânsito", "Vendas 60d"],
            &[&["abc-1", "1.234", "10", "25"], &["ABC-2", "3", "", "1,5"]],
        );

        let canonical = map_columns(&table, ReportKind::Full).unwrap();

        assert_eq!(canonical.mapping[&CanonicalField::Sku], "Código SKU");
        assert_eq!(canonical.mapping[&CanonicalField::StockFull], "Estoque Full (Un)");
        assert_eq!(canonical.mapping[&CanonicalField::InTransit], "Em Trânsito");
        assert_eq!(canonical.mapping[&CanonicalField::UnitsSold], "Vendas 60d");
        assert!(canonical.absent.is_empty());

        let first = &canonical.records[0];
        assert_eq!(first.sku, "ABC-1");
        assert_eq!(first.value(CanonicalField::StockFull), Decimal::from(1234));
        assert_eq!(first.value(CanonicalField::InTransit), Decimal::from(10));
        assert_eq!(
            canonical.records[1].value(CanonicalField::UnitsSold),
            Decimal::new(15, 1)
        );
    }

    #[test]
    fn test_in_transit_is_optional() {
        let table = Table::from_rows("FULL", &["sku", "estoque", "vendas"], &[&["C1", "5", "2"]]);

        let canonical = map_columns(&table, ReportKind::Full).unwrap();

        assert!(!canonical.has_field(CanonicalField::InTransit));
        assert_eq!(canonical.absent, vec![CanonicalField::InTransit]);
        assert_eq!(canonical.warnings.len(), 1);
        assert_eq!(canonical.warnings[0].kind, WarningKind::FieldNotFound);

        let stock = canonical.stock_records();
        assert_eq!(stock[0].in_transit, Decimal::ZERO);
        assert_eq!(stock[0].stock_full, Decimal::from(5));
    }

    #[test]
    fn test_missing_required_column() {
        let table = Table::from_rows("FISICO", &["sku", "descricao"], &[&["C1", "Caneca"]]);

        let err = map_columns(&table, ReportKind::Fisico).unwrap_err();
        match err {
            RestockError::MissingColumns {
                table,
                missing,
                present,
            } => {
                assert_eq!(table, "FISICO");
                assert_eq!(missing, vec!["stock_physical"]);
                assert_eq!(present, vec!["sku", "descricao"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_ambiguous_column() {
        let table = Table::from_rows(
            "VENDAS",
            &["sku", "Qtd Loja A", "Qtd Loja B"],
            &[&["C1", "1", "2"]],
        );

        let err = map_columns(&table, ReportKind::Vendas).unwrap_err();
        assert!(matches!(
            err,
            RestockError::AmbiguousColumn { ref field, ref candidates, .. }
                if field == "units_sold" && candidates.len() == 2
        ));
    }

    #[test]
    fn test_exact_canonical_name_wins() {
        let table = Table::from_rows(
            "FISICO",
            &["sku", "estoque_minimo", "stock_physical"],
            &[&["C1", "10", "4"]],
        );

        let canonical = map_columns(&table, ReportKind::Fisico).unwrap();

        assert_eq!(canonical.mapping[&CanonicalField::StockPhysical], "stock_physical");
        assert_eq!(
            canonical.records[0].value(CanonicalField::StockPhysical),
            Decimal::from(4)
        );
    }

    #[test]
    fn test_claimed_header_is_not_reused() {
        let table = Table::from_rows(
            "FULL",
            &["sku", "Estoque em Trânsito", "Estoque", "Vendas"],
            &[&["C1", "2", "7", "1"]],
        );

        let canonical = map_columns(&table, ReportKind::Full).unwrap();
        assert_eq!(
            canonical.mapping[&CanonicalField::InTransit],
            "Estoque em Trânsito"
        );
        assert_eq!(canonical.mapping[&CanonicalField::StockFull], "Estoque");
    }

    #[rstest]
    #[case::negative("-3", Decimal::ZERO, 1)]
    #[case::blank("", Decimal::ZERO, 0)]
    #[case::currency("R$ 1.500", Decimal::from(1500), 0)]
    fn test_numeric_cells(
        #[case] raw: &str,
        #[case] expected: Decimal,
        #[case] clamp_warnings: usize,
    ) {
        let table = Table::from_rows("FISICO", &["sku", "estoque fisico"], &[&["C1", raw]]);

        let canonical = map_columns(&table, ReportKind::Fisico).unwrap();

        assert_eq!(
            canonical.records[0].value(CanonicalField::StockPhysical),
            expected
        );
        let clamped = canonical
            .warnings
            .iter()
            .filter(|w| w.kind == WarningKind::NegativeValueClamped)
            .count();
        assert_eq!(clamped, clamp_warnings);
    }

    #[test]
    fn test_malformed_number_reports_row() {
        let table = Table::from_rows(
            "VENDAS",
            &["sku", "quantidade"],
            &[&["C1", "2"], &["C2", "doze"]],
        );

        let err = map_columns(&table, ReportKind::Vendas).unwrap_err();
        assert!(matches!(
            err,
            RestockError::MalformedNumber { row: 2, ref raw, .. } if raw == "doze"
        ));
    }

    #[test]
    fn test_blank_sku_rows_are_skipped() {
        let table = Table::from_rows(
            "VENDAS",
            &["sku", "quantidade"],
            &[&["  ", "2"], &["c1", "3"]],
        );

        let canonical = map_columns(&table, ReportKind::Vendas).unwrap();

        assert_eq!(canonical.records.len(), 1);
        assert_eq!(canonical.warnings[0].kind, WarningKind::BlankSku);

        let sales = canonical.sales_records(SalesChannel::External);
        assert_eq!(sales[0].sku, "C1");
        assert_eq!(sales[0].units_sold, Decimal::from(3));
    }

    #[test]
    fn test_sales_report_yields_no_stock_records() {
        let table = Table::from_rows("VENDAS", &["sku", "qtd"], &[&["C1", "3"]]);
        let canonical = map_columns(&table, ReportKind::Vendas).unwrap();

        assert!(canonical.stock_records().is_empty());
        assert_eq!(ReportKind::Vendas.sales_channel(), Some(SalesChannel::External));
    }
}
