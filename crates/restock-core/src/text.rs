//! SKU 與欄位名稱正規化

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// 去除重音符號（NFD 分解後移除組合字元）
pub fn strip_diacritics(value: &str) -> String {
    value.nfd().filter(|c| !is_combining_mark(*c)).collect()
}

/// SKU 正規化：去除前後空白、去除重音、轉大寫
pub fn canonical_sku(raw: &str) -> String {
    strip_diacritics(raw.trim()).to_uppercase()
}

/// 欄位名稱正規化
///
/// 轉小寫、去除重音，非字母數字的連續字元收斂為單一 `_`。
/// 例如 `"Estoque Full (Un)"` -> `"estoque_full_un"`。
pub fn normalize_header(raw: &str) -> String {
    let folded = strip_diacritics(raw.trim()).to_lowercase();

    let mut normalized = String::with_capacity(folded.len());
    let mut pending_separator = false;

    for c in folded.chars() {
        if c.is_alphanumeric() {
            if pending_separator && !normalized.is_empty() {
                normalized.push('_');
            }
            pending_separator = false;
            normalized.push(c);
        } else {
            pending_separator = true;
        }
    }

    normalized
}
