//! 应用配置：从 config/default.toml 与环境变量加载
//!
//! 优先级从低到高：内置默认值 < 常规变量（GROQ_API_KEY、TAVILY_API_KEY 等）< TOML 文件 < 环境变量 `SCOUT__*`
//! （双下划线表示嵌套，如 `SCOUT__LLM__MODEL=...`）。常规变量只在结构化配置没有给出该项时生效。
//! 解析完成的 AppConfig 以引用传入各组件，运行期间不修改进程环境变量。

use std::path::{Path, PathBuf};

use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError};
use serde::Deserialize;

/// LLM 凭证对应的环境变量名（错误分类也按此名称匹配）
pub const LLM_CREDENTIAL_VAR: &str = "GROQ_API_KEY";
/// 搜索凭证对应的环境变量名（缺失时 web_research 降级为提示文本）
pub const SEARCH_CREDENTIAL_VAR: &str = "TAVILY_API_KEY";

/// 每次搜索请求的结果数（固定，不可配置）
pub const SEARCH_MAX_RESULTS: usize = 6;
/// 每条来源摘录的最大字符数，超出时追加截断标记（固定，不可配置）
pub const SNIPPET_CHARS: usize = 600;

/// 常规环境变量 -> 配置键；作为最低优先级的来源，结构化配置给出的值总是优先
const PLAIN_ENV_KEYS: [(&str, &str); 5] = [
    (LLM_CREDENTIAL_VAR, "llm.api_key"),
    ("GROQ_MODEL", "llm.model"),
    (SEARCH_CREDENTIAL_VAR, "tools.search.api_key"),
    ("KNOWLEDGE_BASE_DIR", "app.knowledge_base_dir"),
    ("KAGGLE_DATA_DIR", "tools.datasets.data_dir"),
];

/// 应用配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub app: AppSection,
    pub llm: LlmSection,
    pub tools: ToolsSection,
    pub pipeline: PipelineSection,
}

/// [app] 段：知识库目录
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppSection {
    pub knowledge_base_dir: PathBuf,
}

impl Default for AppSection {
    fn default() -> Self {
        Self {
            knowledge_base_dir: PathBuf::from("knowledge_base_store"),
        }
    }
}

/// [llm] 段：后端、模型、凭证与超时
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmSection {
    pub provider: String,
    pub model: String,
    pub base_url: Option<String>,
    /// 必需；缺失时在构建 Agent 阶段报 credential_error
    pub api_key: Option<String>,
    pub temperature: f32,
    pub timeouts: LlmTimeoutsSection,
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            provider: "groq".to_string(),
            model: "llama-3.3-70b-versatile".to_string(),
            base_url: None,
            api_key: None,
            temperature: 0.2,
            timeouts: LlmTimeoutsSection::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmTimeoutsSection {
    pub request: u64,
}

impl Default for LlmTimeoutsSection {
    fn default() -> Self {
        Self { request: 60 }
    }
}

/// [tools] 段：单次工具调用超时、搜索与数据集
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ToolsSection {
    /// 单次工具调用超时（秒）
    pub tool_timeout_secs: u64,
    pub search: SearchSection,
    pub datasets: DatasetsSection,
}

impl Default for ToolsSection {
    fn default() -> Self {
        Self {
            tool_timeout_secs: 30,
            search: SearchSection::default(),
            datasets: DatasetsSection::default(),
        }
    }
}

/// [tools.search] 段：Tavily 凭证、端点与超时（结果数与摘录长度固定，见 SEARCH_MAX_RESULTS / SNIPPET_CHARS）
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchSection {
    pub api_key: Option<String>,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for SearchSection {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.tavily.com".to_string(),
            timeout_secs: 20,
        }
    }
}

/// [tools.datasets] 段：本地数据集目录与采样上限
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatasetsSection {
    pub data_dir: PathBuf,
    /// 单次最多检查的文件数（与匹配总数无关）
    pub max_files: usize,
    /// CSV 仅读取前 N 行
    pub csv_sample_rows: usize,
    pub max_columns: usize,
    pub preview_rows: usize,
}

impl Default for DatasetsSection {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./kaggle_data"),
            max_files: 3,
            csv_sample_rows: 50,
            max_columns: 30,
            preview_rows: 5,
        }
    }
}

/// [pipeline] 段：每个任务的推理步数上限与阶段截止时间
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineSection {
    pub max_steps: usize,
    pub stage_timeout_secs: u64,
}

impl Default for PipelineSection {
    fn default() -> Self {
        Self {
            max_steps: 8,
            stage_timeout_secs: 300,
        }
    }
}

impl AppConfig {
    /// 模型名去掉 `groq/` 前缀（兼容 LiteLLM 风格写法）
    pub fn model_name(&self) -> &str {
        self.llm
            .model
            .strip_prefix("groq/")
            .unwrap_or(&self.llm.model)
    }

    /// 创建知识库与数据集目录（已存在时不报错）
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.app.knowledge_base_dir)?;
        std::fs::create_dir_all(&self.tools.datasets.data_dir)?;
        Ok(())
    }
}

/// 从 config 目录加载配置，环境变量 SCOUT__* 可覆盖
///
/// 1. 常规变量 GROQ_API_KEY / TAVILY_API_KEY 等作为默认值层（只填补结构化配置未给出的项）
/// 2. 按顺序查找 config/default.toml、../config/default.toml、default.toml，找到则加入
/// 3. 若传入 config_path 且文件存在，则追加该文件（可覆盖前面的键）
/// 4. 叠加环境变量 SCOUT__*（双下划线表示嵌套键）
pub fn load_config(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut files = Vec::new();

    let default_names = ["config/default.toml", "../config/default.toml", "default.toml"];
    if let Some(found) = default_names.iter().map(Path::new).find(|p| p.exists()) {
        files.push(found.to_path_buf());
    }

    if let Some(path) = config_path {
        if path.exists() {
            files.push(path.to_path_buf());
        } else {
            tracing::warn!(path = %path.display(), "config file not found, skipping");
        }
    }

    load_from(&files, |key| std::env::var(key).ok())
}

fn load_from(
    files: &[PathBuf],
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<AppConfig, ConfigError> {
    let mut builder = with_plain_env_defaults(config::Config::builder(), lookup)?;
    for file in files {
        builder = builder.add_source(config::File::from(file.clone()).required(false));
    }
    builder = builder.add_source(
        config::Environment::with_prefix("SCOUT")
            .separator("__")
            .try_parsing(true),
    );
    builder.build()?.try_deserialize()
}

/// 非空的常规变量写入默认值层，优先级低于任何文件或 SCOUT__* 来源
fn with_plain_env_defaults(
    mut builder: ConfigBuilder<DefaultState>,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    for (var, key) in PLAIN_ENV_KEYS {
        if let Some(value) = lookup(var).filter(|v| !v.trim().is_empty()) {
            builder = builder.set_default(key, value)?;
        }
    }
    Ok(builder)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: HashMap<&'static str, &'static str>) -> impl Fn(&str) -> Option<String> {
        move |k: &str| vars.get(k).map(|v| v.to_string())
    }

    fn write_toml(dir: &tempfile::TempDir, body: &str) -> PathBuf {
        let path = dir.path().join("scout.toml");
        std::fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn test_defaults() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.llm.model, "llama-3.3-70b-versatile");
        assert_eq!(cfg.tools.search.base_url, "https://api.tavily.com");
        assert_eq!(cfg.tools.datasets.max_files, 3);
        assert_eq!(cfg.tools.datasets.csv_sample_rows, 50);
        assert_eq!(cfg.tools.datasets.max_columns, 30);
        assert!(cfg.llm.api_key.is_none());
    }

    #[test]
    fn test_env_fallbacks_fill_missing_only() {
        let dir = tempfile::TempDir::new().unwrap();
        let file = write_toml(
            &dir,
            "[app]\nknowledge_base_dir = \"structured_kb\"\n\n[llm]\nmodel = \"structured-model\"\napi_key = \"gsk_from_file\"\n",
        );
        let vars = HashMap::from([
            ("GROQ_API_KEY", "gsk_from_env"),
            ("GROQ_MODEL", "plain-model"),
            ("TAVILY_API_KEY", "tvly_from_env"),
            ("KNOWLEDGE_BASE_DIR", "plain_kb"),
            ("KAGGLE_DATA_DIR", "/data/kaggle"),
        ]);
        let cfg = load_from(&[file], lookup_from(vars)).unwrap();

        assert_eq!(cfg.llm.api_key.as_deref(), Some("gsk_from_file"));
        assert_eq!(cfg.llm.model, "structured-model");
        assert_eq!(cfg.app.knowledge_base_dir, PathBuf::from("structured_kb"));
        assert_eq!(cfg.tools.search.api_key.as_deref(), Some("tvly_from_env"));
        assert_eq!(cfg.tools.datasets.data_dir, PathBuf::from("/data/kaggle"));
        // 文件未给出的其它键保持内置默认值
        assert_eq!(cfg.tools.datasets.max_files, 3);
    }

    #[test]
    fn test_plain_env_used_without_structured_values() {
        let vars = HashMap::from([("GROQ_MODEL", "groq/llama-3.1-8b-instant"), ("KNOWLEDGE_BASE_DIR", "plain_kb")]);
        let cfg = load_from(&[], lookup_from(vars)).unwrap();
        assert_eq!(cfg.model_name(), "llama-3.1-8b-instant");
        assert_eq!(cfg.app.knowledge_base_dir, PathBuf::from("plain_kb"));
        assert_eq!(cfg.tools.datasets.data_dir, PathBuf::from("./kaggle_data"));
    }

    #[test]
    fn test_blank_env_values_ignored() {
        let vars = HashMap::from([("TAVILY_API_KEY", "  ")]);
        let cfg = load_from(&[], lookup_from(vars)).unwrap();
        assert!(cfg.tools.search.api_key.is_none());
    }

    #[test]
    fn test_model_name_strips_prefix() {
        let mut cfg = AppConfig::default();
        cfg.llm.model = "groq/llama-3.1-8b-instant".to_string();
        assert_eq!(cfg.model_name(), "llama-3.1-8b-instant");
    }

    #[test]
    fn test_ensure_dirs_idempotent() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut cfg = AppConfig::default();
        cfg.app.knowledge_base_dir = dir.path().join("kb");
        cfg.tools.datasets.data_dir = dir.path().join("data");
        cfg.ensure_dirs().unwrap();
        cfg.ensure_dirs().unwrap();
        assert!(cfg.app.knowledge_base_dir.is_dir());
        assert!(cfg.tools.datasets.data_dir.is_dir());
    }
}
