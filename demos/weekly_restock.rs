//! 每週補貨流程範例
//!
//! 執行：`RUST_LOG=debug cargo run --example weekly_restock`

use restock::{
    build_catalog, split_suggestions, split_to_order_lines, to_order_lines, CachedCalculator,
    CompanyInputs, ReplenishmentCalculator, ReplenishmentParams, Table,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const PRODUTOS: &str = "\
SKU;Fornecedor;Custo Unitário
CANECA-AZUL;Cerâmica Sul;12,50
CANECA-VERDE;Cerâmica Sul;12,50
PIRES;Cerâmica Sul;4,90
CAIXA-PRESENTE;Embalagens BR;1,35
";

const KITS: &str = "\
SKU Kit;SKU Componente;Qtd por Kit
KIT-CAFE;CANECA-AZUL;2
KIT-CAFE;PIRES;2
KIT-CAFE;CAIXA-PRESENTE;1
";

const FULL_A: &str = "\
Código SKU;Estoque Full (Un);Em Trânsito;Vendas 60d
KIT-CAFE;4;2;36
CANECA-VERDE;10;0;18
";

const VENDAS_A: &str = "\
sku;Quantidade
caneca-azul;12
PIRES;1.200
";

const FISICO_A: &str = "\
SKU;Estoque Físico
CANECA-AZUL;6
CAIXA-PRESENTE;40
";

const FULL_B: &str = "\
SKU,Estoque,Vendas
KIT-CAFE,0,60
";

const VENDAS_B: &str = "\
sku,qtd
CANECA-VERDE,9
";

const FISICO_B: &str = "\
sku,saldo
PIRES,25
";

fn table(name: &str, csv: &str) -> restock::Result<Table> {
    Table::from_csv_reader(name, csv.as_bytes())
}

fn main() -> restock::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "restock_calc=info,restock_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let catalog = Arc::new(build_catalog(
        &table("produtos", PRODUTOS)?,
        &table("kits", KITS)?,
    )?);

    let company_a = CompanyInputs::from_tables(
        "EMPRESA-A",
        &table("FULL-A", FULL_A)?,
        &table("VENDAS-A", VENDAS_A)?,
        &table("FISICO-A", FISICO_A)?,
    )?;
    let company_b = CompanyInputs::from_tables(
        "EMPRESA-B",
        &table("FULL-B", FULL_B)?,
        &table("VENDAS-B", VENDAS_B)?,
        &table("FISICO-B", FISICO_B)?,
    )?;

    let params = ReplenishmentParams::from_json(r#"{"horizon_days": 30, "lead_time_days": 10}"#)?;
    let calculator = ReplenishmentCalculator::new(catalog, params);

    let reports = calculator.calculate_companies(&[company_a.clone(), company_b.clone()])?;
    for report in &reports {
        println!("== {} ==", report.company_id);
        for row in &report.rows {
            println!(
                "{:<16} {:<14} vendas={:>6} estoque={:>5} sugerido={:>4} valor={:>8}",
                row.sku,
                row.supplier,
                row.sales_total,
                row.stock_total,
                row.suggested_qty,
                row.suggested_value
            );
        }
        for warning in &report.warnings {
            println!("  ! {}", warning.message);
        }
    }

    // 合併採購後再依銷售占比拆分
    let mut cached = CachedCalculator::new(calculator);
    let consolidated = cached.get_or_calculate(&CompanyInputs::merged(
        "CONSOLIDADO",
        &[&company_a, &company_b],
    ))?;
    let quantities: BTreeMap<String, u64> = consolidated
        .rows_to_purchase()
        .map(|row| (row.sku.clone(), row.suggested_qty))
        .collect();

    let outcome = split_suggestions(&reports[0], &reports[1], &quantities)?;
    let (lines_a, lines_b) = split_to_order_lines(&outcome, "EMPRESA-A", "EMPRESA-B");

    println!("== Pedido consolidado ==");
    for line in to_order_lines(&consolidated.rows, "CONSOLIDADO") {
        println!("{:<16} {:>4} x {}", line.sku, line.quantity, line.unit_cost);
    }
    for line in lines_a.iter().chain(&lines_b) {
        println!("{:<10} {:<16} {:>4}", line.origin_tag, line.sku, line.quantity);
    }
    for sku in &outcome.undefined {
        println!("  ! {sku}: sem histórico de vendas nas duas empresas");
    }
    for (supplier, total) in consolidated.totals_by_supplier() {
        println!("{supplier:<14} {total:>10}");
    }

    // 第二次查詢命中快取
    cached.get_or_calculate(&CompanyInputs::merged(
        "CONSOLIDADO",
        &[&company_a, &company_b],
    ))?;
    tracing::info!("快取統計: {:?}", cached.cache().stats());

    Ok(())
}
