//! 補貨計算參數

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{RestockError, Result};

/// 補貨計算參數
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplenishmentParams {
    /// 覆蓋天數（建議量需支撐的未來天數）
    pub horizon_days: u32,

    /// 成長率（百分比，可為負值表示衰退）
    pub growth_pct: Decimal,

    /// 採購提前期（天）
    pub lead_time_days: u32,

    /// 銷售統計區間（天）
    pub lookback_days: u32,

    /// 可用供應計算政策
    pub supply_policy: SupplyPolicy,
}

impl ReplenishmentParams {
    /// 創建預設參數（45 天覆蓋、無成長、無提前期、60 天統計區間）
    pub fn new() -> Self {
        Self {
            horizon_days: 45,
            growth_pct: Decimal::ZERO,
            lead_time_days: 0,
            lookback_days: 60,
            supply_policy: SupplyPolicy::all_available(),
        }
    }

    /// 從 JSON 載入（未提供的欄位使用預設值）
    pub fn from_json(json: &str) -> Result<Self> {
        let params: Self = serde_json::from_str(json)?;
        params.validate()?;
        Ok(params)
    }

    /// 建構器模式：設置覆蓋天數
    pub fn with_horizon(mut self, days: u32) -> Self {
        self.horizon_days = days;
        self
    }

    /// 建構器模式：設置成長率
    pub fn with_growth_pct(mut self, pct: Decimal) -> Self {
        self.growth_pct = pct;
        self
    }

    /// 建構器模式：設置提前期
    pub fn with_lead_time(mut self, days: u32) -> Self {
        self.lead_time_days = days;
        self
    }

    /// 建構器模式：設置統計區間天數
    pub fn with_lookback(mut self, days: u32) -> Self {
        self.lookback_days = days;
        self
    }

    /// 建構器模式：以銷售報表的日期區間設置統計天數
    pub fn with_sales_window(mut self, window: SalesWindow) -> Self {
        self.lookback_days = window.days();
        self
    }

    /// 建構器模式：設置可用供應政策
    pub fn with_supply_policy(mut self, policy: SupplyPolicy) -> Self {
        self.supply_policy = policy;
        self
    }

    /// 目標覆蓋總天數（覆蓋天數 + 提前期）
    pub fn coverage_days(&self) -> Result<u32> {
        self.horizon_days
            .checked_add(self.lead_time_days)
            .ok_or_else(|| {
                RestockError::InvalidParameter(format!(
                    "horizon_days + lead_time_days 超出範圍: {} + {}",
                    self.horizon_days, self.lead_time_days
                ))
            })
    }

    /// 檢查參數
    pub fn validate(&self) -> Result<()> {
        if self.horizon_days == 0 {
            return Err(RestockError::InvalidParameter(
                "horizon_days 必須大於 0".to_string(),
            ));
        }
        if self.lookback_days == 0 {
            return Err(RestockError::InvalidParameter(
                "lookback_days 必須大於 0".to_string(),
            ));
        }
        self.coverage_days()?;
        self.supply_policy.validate()
    }
}

impl Default for ReplenishmentParams {
    fn default() -> Self {
        Self::new()
    }
}

/// 可用供應政策
///
/// 各庫存池計入可用供應的權重（0 到 1）。預設三者皆完整計入；
/// 若平台倉或在途庫存需要折讓，可調低對應權重。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplyPolicy {
    pub full_weight: Decimal,
    pub physical_weight: Decimal,
    pub in_transit_weight: Decimal,
}

impl SupplyPolicy {
    /// 三個庫存池皆完整計入
    pub fn all_available() -> Self {
        Self {
            full_weight: Decimal::ONE,
            physical_weight: Decimal::ONE,
            in_transit_weight: Decimal::ONE,
        }
    }

    /// 只計入實體庫存
    pub fn physical_only() -> Self {
        Self {
            full_weight: Decimal::ZERO,
            physical_weight: Decimal::ONE,
            in_transit_weight: Decimal::ZERO,
        }
    }

    /// 建構器模式：設置在途權重
    pub fn with_in_transit_weight(mut self, weight: Decimal) -> Self {
        self.in_transit_weight = weight;
        self
    }

    /// 建構器模式：設置平台倉權重
    pub fn with_full_weight(mut self, weight: Decimal) -> Self {
        self.full_weight = weight;
        self
    }

    /// 計算可用供應（溢位時回傳 `None`）
    pub fn available_supply(
        &self,
        stock_full: Decimal,
        stock_physical: Decimal,
        in_transit: Decimal,
    ) -> Option<Decimal> {
        let full = stock_full.checked_mul(self.full_weight)?;
        let physical = stock_physical.checked_mul(self.physical_weight)?;
        let in_transit = in_transit.checked_mul(self.in_transit_weight)?;
        full.checked_add(physical)?.checked_add(in_transit)
    }

    fn validate(&self) -> Result<()> {
        let in_range = |w: Decimal| w >= Decimal::ZERO && w <= Decimal::ONE;
        if in_range(self.full_weight)
            && in_range(self.physical_weight)
            && in_range(self.in_transit_weight)
        {
            Ok(())
        } else {
            Err(RestockError::InvalidParameter(format!(
                "庫存權重必須介於 0 與 1 之間: {self:?}"
            )))
        }
    }
}

impl Default for SupplyPolicy {
    fn default() -> Self {
        Self::all_available()
    }
}

/// 銷售報表的日期區間（含首尾）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl SalesWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// 以結束日往回推算
    pub fn ending_on(end: NaiveDate, days: u32) -> Self {
        let start = end - chrono::Duration::days(i64::from(days.max(1)) - 1);
        Self { start, end }
    }

    /// 區間天數（含首尾；結束早於開始時為 0）
    pub fn days(&self) -> u32 {
        let span = (self.end - self.start).num_days() + 1;
        u32::try_from(span.max(0)).unwrap_or(u32::MAX)
    }
}
