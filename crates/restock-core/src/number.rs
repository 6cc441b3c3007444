//! 數值格式正規化
//!
//! 來源報表可能使用巴西格式（`1.234,56`、`R$` 前綴）或國際格式（`1,234.56`），
//! 統一轉為 [`Decimal`]。

use rust_decimal::Decimal;
use std::str::FromStr;

/// 數值無法以任何分隔符慣例解析
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("無法解析數值: {0:?}")]
pub struct InvalidNumber(pub String);

/// 解析數值字串
///
/// 空白或 `-` 儲存格回傳 `Ok(None)`，由呼叫端決定如何處理缺值。
///
/// 分隔符判斷規則：
/// * 同時出現 `.` 與 `,`：最後出現者為小數點，另一個為千分位
/// * 同一分隔符重複出現：必須是三位一組的千分位
/// * 單一 `,`：小數點（巴西慣例）
/// * 單一 `.`：若整數部分為 1-3 位非零且小數恰為 3 位，視為千分位（巴西慣例），否則為小數點
pub fn parse_number(raw: &str) -> Result<Option<Decimal>, InvalidNumber> {
    let invalid = || InvalidNumber(raw.to_string());

    let compact: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '\u{a0}')
        .collect();
    let compact = compact
        .strip_prefix("R$")
        .or_else(|| compact.strip_prefix("r$"))
        .unwrap_or(compact.as_str());

    if compact.is_empty() || compact == "-" {
        return Ok(None);
    }

    let (negative, body) = match compact.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, compact.strip_prefix('+').unwrap_or(compact)),
    };

    if !body.chars().any(|c| c.is_ascii_digit())
        || !body.chars().all(|c| c.is_ascii_digit() || c == '.' || c == ',')
    {
        return Err(invalid());
    }

    let dots = body.matches('.').count();
    let commas = body.matches(',').count();

    let normalized = match (dots, commas) {
        (0, 0) => body.to_string(),
        (_, 0) if dots > 1 => strip_grouping(body, '.').ok_or_else(invalid)?,
        (0, _) if commas > 1 => strip_grouping(body, ',').ok_or_else(invalid)?,
        (1, 0) => {
            if is_dotted_thousands(body) {
                body.replace('.', "")
            } else {
                body.to_string()
            }
        }
        (0, 1) => body.replace(',', "."),
        _ => {
            let last_dot = body.rfind('.').unwrap_or(0);
            let last_comma = body.rfind(',').unwrap_or(0);
            let (decimal_sep, thousands_sep) = if last_comma > last_dot {
                (',', '.')
            } else {
                ('.', ',')
            };
            resolve_mixed(body, decimal_sep, thousands_sep).ok_or_else(invalid)?
        }
    };

    let normalized = if normalized.starts_with('.') {
        format!("0{normalized}")
    } else {
        normalized
    };

    let value = Decimal::from_str(&normalized).map_err(|_| invalid())?;
    Ok(Some(if negative { -value } else { value }))
}

/// 千分位分組檢查：首組 1-3 位，其餘每組恰 3 位
fn is_grouped(integer_part: &str, separator: char) -> bool {
    let mut groups = integer_part.split(separator);
    let first_ok = groups
        .next()
        .map(|g| (1..=3).contains(&g.len()))
        .unwrap_or(false);
    first_ok && groups.all(|g| g.len() == 3)
}

fn strip_grouping(body: &str, separator: char) -> Option<String> {
    is_grouped(body, separator).then(|| body.replace(separator, ""))
}

fn is_dotted_thousands(body: &str) -> bool {
    match body.split_once('.') {
        Some((integer, fraction)) => {
            (1..=3).contains(&integer.len())
                && integer.chars().any(|c| c != '0')
                && fraction.len() == 3
        }
        None => false,
    }
}

fn resolve_mixed(body: &str, decimal_sep: char, thousands_sep: char) -> Option<String> {
    if body.matches(decimal_sep).count() != 1 {
        return None;
    }
    let (integer, fraction) = body.split_once(decimal_sep)?;
    if fraction.contains(thousands_sep) || !is_grouped(integer, thousands_sep) {
        return None;
    }
    Some(format!("{}.{}", integer.replace(thousands_sep, ""), fraction))
}
