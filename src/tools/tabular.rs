//! 表格文件采样：CSV（前 N 行）与 Parquet（全部行），统一为 TableSample 并渲染 markdown 预览

use std::fs::File;
use std::path::Path;

use parquet::file::reader::{FileReader, SerializedFileReader};
use parquet::record::Field;
use thiserror::Error;

/// 预览表格中单元格的最大字符数
const MAX_CELL_CHARS: usize = 60;

/// 支持的两种表格格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabularFormat {
    Csv,
    Parquet,
}

impl TabularFormat {
    pub const ALL: [TabularFormat; 2] = [TabularFormat::Csv, TabularFormat::Parquet];

    pub fn extension(self) -> &'static str {
        match self {
            TabularFormat::Csv => "csv",
            TabularFormat::Parquet => "parquet",
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        Self::ALL.into_iter().find(|f| f.extension() == ext)
    }
}

#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Csv(#[from] csv::Error),

    #[error("{0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("no columns to parse from file")]
    NoColumns,

    #[error("unsupported file type")]
    Unsupported,
}

/// 已加载的样本：列名 + 行（单元格转为字符串）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableSample {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl TableSample {
    /// (行数, 列数)
    pub fn shape(&self) -> (usize, usize) {
        (self.rows.len(), self.columns.len())
    }

    /// 渲染前 max_rows 行为 GitHub 风格 markdown 表格
    pub fn to_markdown(&self, max_rows: usize) -> String {
        if self.columns.is_empty() {
            return "(no columns)".to_string();
        }
        let header = self.columns.iter().map(|c| md_cell(c)).collect::<Vec<_>>();
        let mut lines = vec![
            format!("| {} |", header.join(" | ")),
            format!("|{}|", vec!["---"; self.columns.len()].join("|")),
        ];
        for row in self.rows.iter().take(max_rows) {
            let cells: Vec<String> = (0..self.columns.len())
                .map(|i| row.get(i).map(|c| md_cell(c)).unwrap_or_default())
                .collect();
            lines.push(format!("| {} |", cells.join(" | ")));
        }
        if self.rows.is_empty() {
            lines.push("(no rows)".to_string());
        }
        lines.join("\n")
    }
}

fn md_cell(raw: &str) -> String {
    let flat = raw.replace(['\n', '\r'], " ").replace('|', "\\|");
    if flat.chars().count() > MAX_CELL_CHARS {
        flat.chars().take(MAX_CELL_CHARS).collect::<String>() + "…"
    } else {
        flat
    }
}

/// 按扩展名加载样本
pub fn load_sample(path: &Path, csv_rows: usize) -> Result<TableSample, DatasetError> {
    match TabularFormat::from_path(path) {
        Some(TabularFormat::Csv) => read_csv_sample(path, csv_rows),
        Some(TabularFormat::Parquet) => read_parquet(path),
        None => Err(DatasetError::Unsupported),
    }
}

/// CSV：表头 + 前 max_rows 条记录；字段数不一致视为损坏
pub fn read_csv_sample(path: &Path, max_rows: usize) -> Result<TableSample, DatasetError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_path(path)?;

    let columns: Vec<String> = reader.headers()?.iter().map(String::from).collect();
    if columns.is_empty() || columns.iter().all(|c| c.is_empty()) {
        return Err(DatasetError::NoColumns);
    }

    let mut rows = Vec::new();
    for record in reader.records().take(max_rows) {
        rows.push(record?.iter().map(String::from).collect());
    }
    Ok(TableSample { columns, rows })
}

/// Parquet：读取全部行，列名取自文件 schema 的顶层字段
pub fn read_parquet(path: &Path) -> Result<TableSample, DatasetError> {
    let reader = SerializedFileReader::new(File::open(path)?)?;
    let columns: Vec<String> = reader
        .metadata()
        .file_metadata()
        .schema()
        .get_fields()
        .iter()
        .map(|f| f.name().to_string())
        .collect();
    if columns.is_empty() {
        return Err(DatasetError::NoColumns);
    }

    let mut rows = Vec::new();
    for row in reader.get_row_iter(None)? {
        let row = row?;
        rows.push(
            row.get_column_iter()
                .map(|(_, field)| field_text(field))
                .collect(),
        );
    }
    Ok(TableSample { columns, rows })
}

/// 单元格文本：字符串不加引号、空值为空串，与 CSV 样本的渲染一致
fn field_text(field: &Field) -> String {
    match field {
        Field::Str(s) => s.clone(),
        Field::Null => String::new(),
        other => other.to_string(),
    }
}
