//! web_research 工具：通过外部搜索获取多来源的最新信息
//!
//! 凭证缺失时不报错，返回说明缺少哪个配置变量的文本，流水线照常完成。
//! 输出格式固定：标题 -> 可选 Quick answer -> 编号来源列表；每条摘录最多 600 个字符（SNIPPET_CHARS），
//! 仅当原文更长时追加截断标记。

use std::fmt::Write as _;
use std::sync::Arc;

use async_trait::async_trait;

use crate::config::{SearchSection, SEARCH_CREDENTIAL_VAR, SEARCH_MAX_RESULTS, SNIPPET_CHARS};
use crate::tools::{SearchClient, SearchRequest, SearchResponse, TavilyClient, Tool};

/// 截断标记
pub const TRUNCATION_MARKER: &str = "…";

/// 结果数与摘录长度固定为 SEARCH_MAX_RESULTS / SNIPPET_CHARS，不随配置变化
pub struct WebResearchTool {
    client: Option<Arc<dyn SearchClient>>,
}

impl WebResearchTool {
    /// 有 api_key 时创建 Tavily 客户端，否则进入降级模式
    pub fn from_config(cfg: &SearchSection) -> Self {
        let client = cfg
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(|key| {
                Arc::new(TavilyClient::new(&cfg.base_url, key, cfg.timeout_secs)) as Arc<dyn SearchClient>
            });
        Self { client }
    }

    pub fn with_client(client: Arc<dyn SearchClient>) -> Self {
        Self {
            client: Some(client),
        }
    }

    /// 无搜索客户端（未配置凭证）
    pub fn degraded() -> Self {
        Self::from_config(&SearchSection::default())
    }

    pub fn is_degraded(&self) -> bool {
        self.client.is_none()
    }
}

/// 缺少搜索凭证时的提示文本
pub fn missing_credential_notice() -> String {
    format!(
        "{var} is not set. Add it to your .env to enable web search.\nExample:\n{var}=your_key_here",
        var = SEARCH_CREDENTIAL_VAR
    )
}

/// 按字符截断：超过 max 时保留前 max 个字符并追加标记，否则原样返回
pub fn truncate_snippet(content: &str, max: usize) -> String {
    if content.chars().count() > max {
        let mut s: String = content.chars().take(max).collect();
        s.push_str(TRUNCATION_MARKER);
        s
    } else {
        content.to_string()
    }
}

/// 将搜索响应渲染为固定格式的 markdown 文本
pub fn format_results(query: &str, data: &SearchResponse) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "## Web research results for: {query}");
    out.push('\n');

    if let Some(answer) = data.answer.as_deref().map(str::trim).filter(|a| !a.is_empty()) {
        out.push_str("### Quick answer (from search tool)\n");
        let _ = writeln!(out, "{answer}");
        out.push('\n');
    }

    out.push_str("### Sources\n");
    for (i, hit) in data.hits().iter().enumerate() {
        let title = hit
            .title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or("Untitled");
        let _ = writeln!(out, "{}. {}", i + 1, title);
        if let Some(url) = hit.url.as_deref().filter(|u| !u.is_empty()) {
            let _ = writeln!(out, "   - URL: {url}");
        }
        let content = hit.content.as_deref().unwrap_or("").trim();
        if !content.is_empty() {
            let _ = writeln!(out, "   - Snippet: {}", truncate_snippet(content, SNIPPET_CHARS));
        }
    }
    out
}

#[async_trait]
impl Tool for WebResearchTool {
    fn name(&self) -> &str {
        "web_research"
    }

    fn description(&self) -> &str {
        "Search the web for up-to-date information about technology topics, including \
         documentation, Medium articles, blogs, and news. Use this to gather multiple sources."
    }

    async fn invoke(&self, query: &str) -> String {
        let Some(client) = &self.client else {
            tracing::warn!(var = SEARCH_CREDENTIAL_VAR, "web_research degraded: search credential missing");
            return missing_credential_notice();
        };

        let request = SearchRequest::research(query, SEARCH_MAX_RESULTS);
        match client.search(&request).await {
            Ok(data) => format_results(query, &data),
            Err(e) => {
                tracing::warn!(error = %e, "web_research search failed");
                format!(
                    "## Web research results for: {query}\n\nWeb search failed: {e}\n\
                     Continue with other sources and note this gap in the findings."
                )
            }
        }
    }
}
