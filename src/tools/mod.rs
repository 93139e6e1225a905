//! 工具箱：统一的工具契约（名称 / 描述 / 输入 schema / 有界输出调用）、注册表与执行器
//!
//! - **web_research**：Tavily 搜索，缺少凭证时降级为提示文本
//! - **kaggle_datasets_overview**：本地 CSV / Parquet 数据集采样
//!
//! 所有工具内部失败都渲染为输出文本，不会向流水线抛错。

pub mod dataset_overview;
pub mod executor;
pub mod registry;
pub mod schema;
pub mod search_client;
pub mod tabular;
pub mod web_research;

pub use dataset_overview::DatasetOverviewTool;
pub use executor::{ToolExecutor, ToolInvocation};
pub use registry::{Tool, ToolCallError, ToolRegistry, ToolSpec};
pub use schema::{tool_call_schema_json, QueryArgs};
pub use search_client::{SearchClient, SearchError, SearchHit, SearchRequest, SearchResponse, TavilyClient};
pub use web_research::WebResearchTool;

use crate::config::AppConfig;

/// 按配置组装调研阶段的工具集（顺序固定：web_research、kaggle_datasets_overview）
pub fn build_research_tools(cfg: &AppConfig) -> ToolRegistry {
    let mut tools = ToolRegistry::new();
    tools.register(WebResearchTool::from_config(&cfg.tools.search));
    tools.register(DatasetOverviewTool::from_config(&cfg.tools.datasets));
    tools
}
