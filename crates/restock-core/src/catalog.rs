//! 商品目錄與套組索引

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::number::parse_number;
use crate::table::Table;
use crate::text::canonical_sku;
use crate::warning::EngineWarning;
use crate::{RestockError, Result};

/// 不在目錄中的 SKU 使用的供應商名稱
pub const UNKNOWN_SUPPLIER: &str = "DESCONHECIDO";

const SKU_COLUMNS: &[&str] = &["sku", "codigo", "codigo_sku"];
const SUPPLIER_COLUMNS: &[&str] = &["fornecedor", "supplier"];
const COST_COLUMNS: &[&str] = &[
    "custo",
    "custo_unitario",
    "custo_medio",
    "preco_custo",
    "unit_cost",
];
const KIT_COLUMNS: &[&str] = &["sku_kit", "kit"];
const COMPONENT_COLUMNS: &[&str] = &["sku_componente", "componente", "component_sku"];
const QUANTITY_COLUMNS: &[&str] = &[
    "quantidade",
    "qtd",
    "qtd_por_kit",
    "quantidade_no_kit",
    "quantity_per_kit",
];

/// 目錄項目（可採購的組件 SKU）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub sku: String,
    pub supplier: String,
    pub unit_cost: Decimal,
}

impl CatalogEntry {
    pub fn new(sku: &str, supplier: impl Into<String>, unit_cost: Decimal) -> Self {
        Self {
            sku: canonical_sku(sku),
            supplier: supplier.into(),
            unit_cost,
        }
    }
}

/// 套組組成列（套組 -> 組件 × 數量）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KitComponent {
    pub component_sku: String,
    pub quantity_per_kit: u32,
}

impl KitComponent {
    pub fn new(component_sku: impl Into<String>, quantity_per_kit: u32) -> Self {
        Self {
            component_sku: component_sku.into(),
            quantity_per_kit,
        }
    }
}

/// 商品目錄（載入後唯讀，可在多個計算間共享）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    entries: BTreeMap<String, CatalogEntry>,

    /// 套組展開結果（已攤平至最底層組件）
    kits: BTreeMap<String, Vec<KitComponent>>,

    warnings: Vec<EngineWarning>,
}

impl Catalog {
    /// 創建空目錄
    pub fn new() -> Self {
        Self::default()
    }

    /// 由目錄項目與套組組成列建立
    ///
    /// `kit_rows` 為 `(套組, 組件, 數量)`；同一組合重複出現時數量相加。
    /// 套組的組件本身也可以是套組，展開時逐層相乘；出現循環時回傳 [`RestockError::KitCycle`]。
    pub fn from_parts(
        entries: Vec<CatalogEntry>,
        kit_rows: Vec<(String, String, u32)>,
    ) -> Result<Self> {
        let entries: BTreeMap<String, CatalogEntry> = entries
            .into_iter()
            .map(|entry| (entry.sku.clone(), entry))
            .collect();

        let mut direct: BTreeMap<String, BTreeMap<String, u64>> = BTreeMap::new();
        for (kit, component, quantity) in kit_rows {
            *direct
                .entry(canonical_sku(&kit))
                .or_default()
                .entry(canonical_sku(&component))
                .or_default() += u64::from(quantity);
        }

        let mut flattened = BTreeMap::new();
        for kit in direct.keys() {
            let mut stack = Vec::new();
            Self::flatten_kit(kit, &direct, &mut stack, &mut flattened)?;
        }

        let mut kits = BTreeMap::new();
        let mut warnings = Vec::new();
        for (kit, leaves) in flattened {
            let mut components = Vec::with_capacity(leaves.len());
            for (component, quantity) in leaves {
                if !entries.contains_key(&component) {
                    warnings.push(EngineWarning::unknown_kit_component(&kit, &component));
                }
                let quantity_per_kit = u32::try_from(quantity).map_err(|_| {
                    RestockError::CalculationError(format!(
                        "套組 {kit} 的組件 {component} 展開數量溢位"
                    ))
                })?;
                components.push(KitComponent::new(component, quantity_per_kit));
            }
            kits.insert(kit, components);
        }

        tracing::debug!(
            "商品目錄建立完成：商品 {} 筆，套組 {} 筆，警告 {} 筆",
            entries.len(),
            kits.len(),
            warnings.len()
        );

        Ok(Self {
            entries,
            kits,
            warnings,
        })
    }

    /// 遞迴攤平套組（深度優先，以 stack 偵測循環）
    fn flatten_kit(
        kit: &str,
        direct: &BTreeMap<String, BTreeMap<String, u64>>,
        stack: &mut Vec<String>,
        flattened: &mut BTreeMap<String, BTreeMap<String, u64>>,
    ) -> Result<BTreeMap<String, u64>> {
        if let Some(done) = flattened.get(kit) {
            return Ok(done.clone());
        }

        if let Some(position) = stack.iter().position(|k| k == kit) {
            let mut cycle: Vec<String> = stack[position..].to_vec();
            cycle.push(kit.to_string());
            return Err(RestockError::KitCycle(cycle));
        }

        stack.push(kit.to_string());

        let mut leaves: BTreeMap<String, u64> = BTreeMap::new();
        if let Some(components) = direct.get(kit) {
            for (component, &quantity) in components {
                if direct.contains_key(component) {
                    let nested = Self::flatten_kit(component, direct, stack, flattened)?;
                    for (leaf, nested_qty) in nested {
                        let total = quantity.checked_mul(nested_qty).ok_or_else(|| {
                            RestockError::CalculationError(format!("套組 {kit} 展開數量溢位"))
                        })?;
                        *leaves.entry(leaf).or_default() += total;
                    }
                } else {
                    *leaves.entry(component.clone()).or_default() += quantity;
                }
            }
        }

        stack.pop();
        flattened.insert(kit.to_string(), leaves.clone());
        Ok(leaves)
    }

    /// 展開套組
    ///
    /// 不在套組表中的 SKU 視為「一個單位的自己」，回傳 `[(sku, 1)]`，
    /// 讓單品與套組共用相同的下游流程。
    pub fn expand_kit(&self, sku: &str) -> Vec<KitComponent> {
        match self.kits.get(sku) {
            Some(components) => components.clone(),
            None => vec![KitComponent::new(sku, 1)],
        }
    }

    /// 查詢目錄項目
    pub fn entry(&self, sku: &str) -> Option<&CatalogEntry> {
        self.entries.get(sku)
    }

    /// 是否為套組
    pub fn is_kit(&self, sku: &str) -> bool {
        self.kits.contains_key(sku)
    }

    /// 目錄項目數量
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// 目錄是否為空
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.kits.is_empty()
    }

    /// 套組數量
    pub fn kit_count(&self) -> usize {
        self.kits.len()
    }

    /// 建立目錄時產生的警告
    pub fn warnings(&self) -> &[EngineWarning] {
        &self.warnings
    }
}

/// 從「單品」與「套組組成」兩張表建立商品目錄
///
/// 必要欄位缺漏時回傳 [`RestockError::MissingColumns`]，列出缺漏欄位與實際欄位。
/// 套組表完全空白（無欄位、無資料）時視為沒有套組。
pub fn build_catalog(simple_products: &Table, kit_mappings: &Table) -> Result<Catalog> {
    let sku_col = require_columns(simple_products, &[("sku", SKU_COLUMNS)])?[0];
    let supplier_col = find_column(simple_products, SUPPLIER_COLUMNS);
    let cost_col = find_column(simple_products, COST_COLUMNS);

    let mut entries = Vec::with_capacity(simple_products.len());
    let mut skipped = Vec::new();
    for row in 0..simple_products.len() {
        let sku = canonical_sku(simple_products.cell(row, sku_col));
        if sku.is_empty() {
            skipped.push(EngineWarning::blank_sku(&simple_products.name, row + 1));
            continue;
        }

        let supplier = supplier_col
            .map(|col| simple_products.cell(row, col).trim())
            .filter(|s| !s.is_empty())
            .unwrap_or(UNKNOWN_SUPPLIER);

        let unit_cost = match cost_col {
            Some(col) => parse_cell(simple_products, row, col)?.unwrap_or(Decimal::ZERO),
            None => Decimal::ZERO,
        };

        entries.push(CatalogEntry::new(&sku, supplier, unit_cost));
    }

    let mut kit_rows = Vec::new();
    if !(kit_mappings.headers.is_empty() && kit_mappings.is_empty()) {
        let columns = require_columns(
            kit_mappings,
            &[("sku_kit", KIT_COLUMNS), ("sku_componente", COMPONENT_COLUMNS)],
        )?;
        let (kit_col, component_col) = (columns[0], columns[1]);
        let quantity_col = find_column(kit_mappings, QUANTITY_COLUMNS);

        for row in 0..kit_mappings.len() {
            let kit = canonical_sku(kit_mappings.cell(row, kit_col));
            let component = canonical_sku(kit_mappings.cell(row, component_col));
            if kit.is_empty() || component.is_empty() {
                skipped.push(EngineWarning::blank_sku(&kit_mappings.name, row + 1));
                continue;
            }

            let quantity = match quantity_col {
                Some(col) => parse_kit_quantity(kit_mappings.cell(row, col), &kit, &component)?,
                None => 1,
            };
            kit_rows.push((kit, component, quantity));
        }
    }

    let mut catalog = Catalog::from_parts(entries, kit_rows)?;
    let mut warnings = skipped;
    warnings.append(&mut catalog.warnings);
    catalog.warnings = warnings;

    tracing::info!(
        "商品目錄載入：商品 {} 筆，套組 {} 筆",
        catalog.len(),
        catalog.kit_count()
    );

    Ok(catalog)
}

fn find_column(table: &Table, aliases: &[&str]) -> Option<usize> {
    aliases.iter().find_map(|alias| table.column_index(alias))
}

/// 依序解析必要欄位，全部找到才回傳索引
fn require_columns(table: &Table, required: &[(&str, &[&str])]) -> Result<Vec<usize>> {
    let mut found = Vec::with_capacity(required.len());
    let mut missing = Vec::new();

    for (name, aliases) in required {
        match find_column(table, aliases) {
            Some(col) => found.push(col),
            None => missing.push(name.to_string()),
        }
    }

    if missing.is_empty() {
        Ok(found)
    } else {
        Err(RestockError::MissingColumns {
            table: table.name.clone(),
            missing,
            present: table.headers.clone(),
        })
    }
}

fn parse_cell(table: &Table, row: usize, col: usize) -> Result<Option<Decimal>> {
    let raw = table.cell(row, col);
    parse_number(raw).map_err(|_| RestockError::MalformedNumber {
        table: table.name.clone(),
        column: table.headers.get(col).cloned().unwrap_or_default(),
        row: row + 1,
        raw: raw.to_string(),
    })
}

/// 套組數量必須為正整數；空白視為 1
fn parse_kit_quantity(raw: &str, kit: &str, component: &str) -> Result<u32> {
    let invalid = || RestockError::InvalidKitQuantity {
        kit: kit.to_string(),
        component: component.to_string(),
        raw: raw.to_string(),
    };

    match parse_number(raw).map_err(|_| invalid())? {
        None => Ok(1),
        Some(value) if value > Decimal::ZERO && value.fract().is_zero() => {
            value.to_u32().ok_or_else(invalid)
        }
        Some(_) => Err(invalid()),
    }
}
