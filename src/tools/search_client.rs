//! 外部搜索能力：SearchClient trait 与 Tavily 实现
//!
//! 请求 {query, max_results, include_answer, include_raw_content}，
//! 响应 {answer?, results: [{title?, url?, content?}]}；字段缺失或为 null 时按空处理。

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 搜索请求
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchRequest {
    pub query: String,
    pub max_results: usize,
    pub include_answer: bool,
    pub include_raw_content: bool,
}

impl SearchRequest {
    /// web_research 使用的固定请求形态：带合成答案、不要原始网页内容
    pub fn research(query: impl Into<String>, max_results: usize) -> Self {
        Self {
            query: query.into(),
            max_results,
            include_answer: true,
            include_raw_content: false,
        }
    }
}

/// 单条搜索结果
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SearchHit {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

/// 搜索响应
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(default)]
    pub results: Option<Vec<SearchHit>>,
}

impl SearchResponse {
    pub fn hits(&self) -> &[SearchHit] {
        self.results.as_deref().unwrap_or(&[])
    }
}

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
}

/// 搜索客户端 trait（便于测试替换）
#[async_trait]
pub trait SearchClient: Send + Sync {
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse, SearchError>;
}

/// Tavily 客户端：POST {base_url}/search，api_key 放在请求体中
pub struct TavilyClient {
    client: Client,
    base_url: String,
    api_key: String,
}

#[derive(Serialize)]
struct TavilyBody<'a> {
    api_key: &'a str,
    #[serde(flatten)]
    request: &'a SearchRequest,
}

impl TavilyClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, timeout_secs: u64) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(concat!("scout/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_default();
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl SearchClient for TavilyClient {
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse, SearchError> {
        let url = format!("{}/search", self.base_url);
        tracing::info!(query = %request.query, max_results = request.max_results, "tavily search");
        let resp = self
            .client
            .post(&url)
            .json(&TavilyBody {
                api_key: &self.api_key,
                request,
            })
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SearchError::Status {
                status: status.as_u16(),
                body: body.chars().take(300).collect(),
            });
        }
        Ok(resp.json::<SearchResponse>().await?)
    }
}
