//! 原始報表資料表

use serde::{Deserialize, Serialize};
use std::io::Read;

use crate::text::normalize_header;

/// 已載入的原始報表（欄位名稱未正規化，儲存格皆為字串）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    /// 報表名稱（用於錯誤訊息）
    pub name: String,

    /// 原始欄位名稱
    pub headers: Vec<String>,

    /// 資料列
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// 創建新的資料表
    pub fn new(name: impl Into<String>, headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self {
            name: name.into(),
            headers,
            rows,
        }
    }

    /// 創建無欄位、無資料的空表
    pub fn empty(name: impl Into<String>) -> Self {
        Self::new(name, Vec::new(), Vec::new())
    }

    /// 從字串切片創建（主要供測試使用）
    pub fn from_rows(name: impl Into<String>, headers: &[&str], rows: &[&[&str]]) -> Self {
        Self::new(
            name,
            headers.iter().map(|h| h.to_string()).collect(),
            rows.iter()
                .map(|row| row.iter().map(|c| c.to_string()).collect())
                .collect(),
        )
    }

    /// 從 CSV 讀取
    ///
    /// 依標題列判斷分隔符（`;` 或 `,`），並移除 Excel 匯出的 BOM。
    pub fn from_csv_reader<R: Read>(name: impl Into<String>, mut reader: R) -> crate::Result<Self> {
        let mut content = String::new();
        reader
            .read_to_string(&mut content)
            .map_err(csv::Error::from)?;
        let content = content.strip_prefix('\u{feff}').unwrap_or(content.as_str());

        let delimiter = Self::sniff_delimiter(content);

        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .delimiter(delimiter)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());

        let headers: Vec<String> = csv_reader.headers()?.iter().map(str::to_string).collect();

        let mut rows = Vec::new();
        for record in csv_reader.records() {
            let record = record?;
            if record.iter().all(|cell| cell.is_empty()) {
                continue;
            }
            rows.push(record.iter().map(str::to_string).collect());
        }

        Ok(Self::new(name, headers, rows))
    }

    fn sniff_delimiter(content: &str) -> u8 {
        let header_line = content.lines().next().unwrap_or_default();
        let semicolons = header_line.matches(';').count();
        let commas = header_line.matches(',').count();
        if semicolons > commas {
            b';'
        } else {
            b','
        }
    }

    /// 正規化後的欄位名稱（順序與 `headers` 一致）
    pub fn normalized_headers(&self) -> Vec<String> {
        self.headers.iter().map(|h| normalize_header(h)).collect()
    }

    /// 依正規化名稱查找欄位索引
    pub fn column_index(&self, normalized: &str) -> Option<usize> {
        self.headers
            .iter()
            .position(|h| normalize_header(h) == normalized)
    }

    /// 取得儲存格（短列視為空字串）
    pub fn cell(&self, row: usize, column: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// 資料列數
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// 是否無資料列
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_with_semicolon_delimiter() {
        let data = "\u{feff}SKU;Estoque Full (Un);Vendas\nABC-1;1.234;10\n;;\nabc-2;5;0\n";
        let table = Table::from_csv_reader("FULL", data.as_bytes()).unwrap();

        assert_eq!(table.headers, vec!["SKU", "Estoque Full (Un)", "Vendas"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.cell(0, 1), "1.234");
        assert_eq!(table.column_index("estoque_full_un"), Some(1));
    }

    #[test]
    fn test_csv_with_comma_delimiter() {
        let data = "sku,qtd\nK1,10\nK2,3\n";
        let table = Table::from_csv_reader("VENDAS", data.as_bytes()).unwrap();

        assert_eq!(table.headers, vec!["sku", "qtd"]);
        assert_eq!(table.rows, vec![vec!["K1", "10"], vec!["K2", "3"]]);
    }

    #[test]
    fn test_short_rows_read_as_empty_cells() {
        let table = Table::from_rows("FISICO", &["sku", "estoque"], &[&["C1"]]);

        assert_eq!(table.cell(0, 0), "C1");
        assert_eq!(table.cell(0, 1), "");
        assert_eq!(table.cell(5, 0), "");
    }
}
