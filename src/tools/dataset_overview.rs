//! kaggle_datasets_overview 工具：检查本地 Kaggle 数据集（CSV / Parquet）的结构与样例行
//!
//! query 只用于输出标题，不做过滤。最多检查 max_files 个文件；单个文件读取失败只在该文件位置
//! 写一行错误说明，其余文件照常输出。目录不存在或没有匹配文件时返回说明文本。

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::config::DatasetsSection;
use crate::tools::tabular::{load_sample, TabularFormat};
use crate::tools::Tool;

/// 输出末尾的固定提示
pub const NO_FABRICATION_NOTICE: &str = "Use these datasets as quantitative or contextual background where relevant. \
Do not fabricate numeric results beyond the sample shown above.";

#[derive(Debug, Clone)]
pub struct DatasetOverviewTool {
    data_dir: PathBuf,
    max_files: usize,
    csv_sample_rows: usize,
    max_columns: usize,
    preview_rows: usize,
}

impl DatasetOverviewTool {
    pub fn from_config(cfg: &DatasetsSection) -> Self {
        Self {
            data_dir: cfg.data_dir.clone(),
            max_files: cfg.max_files,
            csv_sample_rows: cfg.csv_sample_rows,
            max_columns: cfg.max_columns,
            preview_rows: cfg.preview_rows,
        }
    }

    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::from_config(&DatasetsSection::default())
        }
    }

    /// 同步执行检查（文件 IO），由 invoke 放到 blocking 线程
    pub fn inspect(&self, query: &str) -> String {
        let base = &self.data_dir;
        if !base.is_dir() {
            return format!("No Kaggle data directory found at {}.", base.display());
        }

        let files = match discover_files(base) {
            Ok(f) => f,
            Err(e) => return format!("Could not scan {} for datasets: {e}", base.display()),
        };
        if files.is_empty() {
            return format!("No CSV or Parquet files found under {}.", base.display());
        }

        let mut out = String::new();
        let _ = writeln!(out, "## Kaggle dataset inspection for query: {query}");
        let _ = writeln!(out, "Base directory: {}", base.display());
        let _ = writeln!(out, "Found {} file(s).", files.len());
        out.push('\n');

        for (i, path) in files.iter().take(self.max_files).enumerate() {
            let rel = path.strip_prefix(base).unwrap_or(path);
            let _ = writeln!(out, "### File {}: {}", i + 1, rel.display());

            let sample = match load_sample(path, self.csv_sample_rows) {
                Ok(s) => s,
                Err(e) => {
                    tracing::warn!(file = %rel.display(), error = %e, "dataset file unreadable");
                    let _ = writeln!(out, "  Could not read file due to error: {e}");
                    out.push('\n');
                    continue;
                }
            };

            let (rows, cols) = sample.shape();
            let _ = writeln!(out, "  Shape (loaded sample): {rows} rows x {cols} columns");
            let shown: Vec<&str> = sample
                .columns
                .iter()
                .take(self.max_columns)
                .map(String::as_str)
                .collect();
            let _ = writeln!(out, "  Columns: {}", shown.join(", "));
            out.push_str("  Sample rows:\n");
            let _ = writeln!(out, "{}", sample.to_markdown(self.preview_rows));
            out.push('\n');
        }

        out.push_str(NO_FABRICATION_NOTICE);
        out
    }
}

/// 递归查找 **/*.csv 与 **/*.parquet（扩展名不区分大小写）；按格式分组，组内按路径排序
fn discover_files(base: &Path) -> Result<Vec<PathBuf>, glob::PatternError> {
    let escaped = glob::Pattern::escape(&base.to_string_lossy());
    let options = glob::MatchOptions {
        case_sensitive: false,
        ..glob::MatchOptions::new()
    };
    let mut files = Vec::new();
    for format in TabularFormat::ALL {
        let pattern = format!("{}/**/*.{}", escaped, format.extension());
        let mut matched: Vec<PathBuf> = glob::glob_with(&pattern, options)?
            .filter_map(Result::ok)
            .filter(|p| p.is_file())
            .collect();
        matched.sort();
        files.extend(matched);
    }
    Ok(files)
}

#[async_trait]
impl Tool for DatasetOverviewTool {
    fn name(&self) -> &str {
        "kaggle_datasets_overview"
    }

    fn description(&self) -> &str {
        "Inspect locally stored Kaggle datasets (CSV/Parquet) to extract schema and sample rows. \
         Use this for quantitative or structured context relevant to the user's question."
    }

    async fn invoke(&self, query: &str) -> String {
        let tool = self.clone();
        let query = query.to_string();
        tokio::task::spawn_blocking(move || tool.inspect(&query))
            .await
            .unwrap_or_else(|e| format!("Dataset inspection aborted: {e}"))
    }
}
