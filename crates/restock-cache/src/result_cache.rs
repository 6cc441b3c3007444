//! 計算結果快取
//!
//! 相同輸入無論來自快取或重新計算，結果都必須一致；快取只是邊界上的最佳化。
//! 快取有容量上限，超過時先淘汰最早寫入的結果。

use restock_calc::{CompanyInputs, ReplenishmentCalculator, ReplenishmentReport};
use restock_core::Result;
use std::collections::{HashMap, VecDeque};

use crate::fingerprint::{fingerprint, Fingerprint};

/// 快取命中統計
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub entries: usize,
}

/// 預設快取容量
pub const DEFAULT_CACHE_CAPACITY: usize = 256;

/// 計算結果快取
pub struct ResultCache {
    entries: HashMap<Fingerprint, ReplenishmentReport>,
    /// 寫入順序（最舊在前）
    order: VecDeque<Fingerprint>,
    capacity: usize,
    hits: u64,
    misses: u64,
    evictions: u64,
}

impl ResultCache {
    /// 創建空的快取（預設容量）
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CACHE_CAPACITY)
    }

    /// 創建指定容量的快取（容量至少為 1）
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            order: VecDeque::new(),
            capacity: capacity.max(1),
            hits: 0,
            misses: 0,
            evictions: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// 查詢快取（計入命中統計）
    pub fn get(&mut self, key: &Fingerprint) -> Option<&ReplenishmentReport> {
        match self.entries.get(key) {
            Some(report) => {
                self.hits += 1;
                Some(report)
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    /// 寫入結果；已滿時淘汰最早寫入的結果
    pub fn insert(&mut self, key: Fingerprint, report: ReplenishmentReport) {
        if self.entries.insert(key.clone(), report).is_some() {
            return;
        }
        self.order.push_back(key);

        while self.entries.len() > self.capacity {
            let Some(oldest) = self.order.pop_front() else {
                break;
            };
            if self.entries.remove(&oldest).is_some() {
                self.evictions += 1;
                tracing::debug!("快取已滿，淘汰指紋 {}", oldest);
            }
        }
    }

    /// 移除單一結果
    pub fn invalidate(&mut self, key: &Fingerprint) -> bool {
        let removed = self.entries.remove(key).is_some();
        if removed {
            self.order.retain(|k| k != key);
        }
        removed
    }

    /// 移除某公司的所有結果（例如重新上傳報表後）
    pub fn invalidate_company(&mut self, company_id: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, report| report.company_id != company_id);
        let entries = &self.entries;
        self.order.retain(|k| entries.contains_key(k));
        before - self.entries.len()
    }

    /// 清除所有結果
    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            evictions: self.evictions,
            entries: self.entries.len(),
        }
    }
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::new()
    }
}

/// 帶快取的補貨計算器
pub struct CachedCalculator {
    calculator: ReplenishmentCalculator,
    cache: ResultCache,
}

impl CachedCalculator {
    pub fn new(calculator: ReplenishmentCalculator) -> Self {
        Self::with_cache(calculator, ResultCache::new())
    }

    /// 使用指定的快取（例如自訂容量）
    pub fn with_cache(calculator: ReplenishmentCalculator, cache: ResultCache) -> Self {
        Self { calculator, cache }
    }

    /// 取得快取結果，未命中時計算並寫入快取
    pub fn get_or_calculate(&mut self, inputs: &CompanyInputs) -> Result<ReplenishmentReport> {
        let key = fingerprint(self.calculator.catalog(), inputs, self.calculator.params())?;

        if let Some(report) = self.cache.get(&key) {
            tracing::debug!("快取命中：公司 {}，指紋 {}", inputs.company_id, key);
            return Ok(report.clone());
        }

        tracing::debug!("快取未命中：公司 {}，指紋 {}", inputs.company_id, key);
        let report = self.calculator.calculate(inputs)?;
        self.cache.insert(key, report.clone());
        Ok(report)
    }

    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut ResultCache {
        &mut self.cache
    }

    pub fn calculator(&self) -> &ReplenishmentCalculator {
        &self.calculator
    }
}
