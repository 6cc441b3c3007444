//! 非致命的資料品質警告

use serde::{Deserialize, Serialize};

/// 警告類別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WarningKind {
    /// SKU 不在商品目錄中（以成本 0、供應商 DESCONHECIDO 處理）
    UnknownSku,
    /// 套組組件不在商品目錄中
    UnknownKitComponent,
    /// 無銷售歷史，建議量強制為 0
    InsufficientHistory,
    /// 選填欄位未找到，視為 0
    FieldNotFound,
    /// 負數值已歸零
    NegativeValueClamped,
    /// SKU 空白的資料列已略過
    BlankSku,
}

/// 警告嚴重度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarningSeverity {
    Info,
    Warning,
}

/// 引擎警告
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineWarning {
    /// 相關 SKU（欄位層級的警告為 None）
    pub sku: Option<String>,
    pub kind: WarningKind,
    pub message: String,
    pub severity: WarningSeverity,
}

impl EngineWarning {
    pub fn new(
        sku: Option<String>,
        kind: WarningKind,
        message: String,
        severity: WarningSeverity,
    ) -> Self {
        Self {
            sku,
            kind,
            message,
            severity,
        }
    }

    pub fn unknown_sku(sku: &str) -> Self {
        Self::new(
            Some(sku.to_string()),
            WarningKind::UnknownSku,
            format!("SKU {sku} 不在商品目錄中，成本以 0 計算"),
            WarningSeverity::Warning,
        )
    }

    pub fn unknown_kit_component(kit: &str, component: &str) -> Self {
        Self::new(
            Some(component.to_string()),
            WarningKind::UnknownKitComponent,
            format!("套組 {kit} 的組件 {component} 不在商品目錄中"),
            WarningSeverity::Warning,
        )
    }

    pub fn insufficient_history(sku: &str) -> Self {
        Self::new(
            Some(sku.to_string()),
            WarningKind::InsufficientHistory,
            format!("SKU {sku} 無銷售歷史，無法推估需求，建議量為 0"),
            WarningSeverity::Info,
        )
    }

    pub fn field_not_found(table: &str, field: &str) -> Self {
        Self::new(
            None,
            WarningKind::FieldNotFound,
            format!("{table} 未找到欄位 {field}，以 0 計算"),
            WarningSeverity::Info,
        )
    }

    pub fn negative_value_clamped(table: &str, sku: &str, field: &str) -> Self {
        Self::new(
            Some(sku.to_string()),
            WarningKind::NegativeValueClamped,
            format!("{table} 中 SKU {sku} 的 {field} 為負值，已歸零"),
            WarningSeverity::Warning,
        )
    }

    pub fn blank_sku(table: &str, row: usize) -> Self {
        Self::new(
            None,
            WarningKind::BlankSku,
            format!("{table} 第 {row} 列 SKU 空白，已略過"),
            WarningSeverity::Warning,
        )
    }
}
