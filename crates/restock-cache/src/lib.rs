//! # Restock Cache
//!
//! 以輸入內容指紋為鍵的計算結果快取

pub mod fingerprint;
pub mod result_cache;

// Re-export 主要類型
pub use fingerprint::{fingerprint, Fingerprint};
pub use result_cache::{CacheStats, CachedCalculator, ResultCache, DEFAULT_CACHE_CAPACITY};
