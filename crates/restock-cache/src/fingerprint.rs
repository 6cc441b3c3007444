//! 輸入內容指紋

use restock_calc::CompanyInputs;
use restock_core::{Catalog, ReplenishmentParams, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// SHA-256 指紋（十六進位）
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 計算（目錄、輸入、參數）的指紋
///
/// 三者以 JSON 序列化後依序餵入雜湊，各段之間以長度前綴區隔。
pub fn fingerprint(
    catalog: &Catalog,
    inputs: &CompanyInputs,
    params: &ReplenishmentParams,
) -> Result<Fingerprint> {
    let mut hasher = Sha256::new();
    for part in [
        serde_json::to_vec(catalog)?,
        serde_json::to_vec(inputs)?,
        serde_json::to_vec(params)?,
    ] {
        hasher.update((part.len() as u64).to_le_bytes());
        hasher.update(&part);
    }
    Ok(Fingerprint(format!("{:x}", hasher.finalize())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use restock_core::{SalesChannel, SalesRecord};
    use rust_decimal::Decimal;

    fn inputs(units: i64) -> CompanyInputs {
        CompanyInputs::new("A").with_sales_full(vec![SalesRecord::new(
            "C1",
            SalesChannel::Full,
            Decimal::from(units),
        )])
    }

    #[test]
    fn test_fingerprint_is_stable() {
        let catalog = Catalog::new();
        let params = ReplenishmentParams::new();

        let first = fingerprint(&catalog, &inputs(3), &params).unwrap();
        let second = fingerprint(&catalog, &inputs(3), &params).unwrap();

        assert_eq!(first, second);
        assert_eq!(first.as_str().len(), 64);
    }

    #[test]
    fn test_fingerprint_tracks_every_part() {
        let catalog = Catalog::new();
        let params = ReplenishmentParams::new();
        let base = fingerprint(&catalog, &inputs(3), &params).unwrap();

        let other_inputs = fingerprint(&catalog, &inputs(4), &params).unwrap();
        let other_params =
            fingerprint(&catalog, &inputs(3), &params.clone().with_horizon(30)).unwrap();

        assert_ne!(base, other_inputs);
        assert_ne!(base, other_params);
    }
}
