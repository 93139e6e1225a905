//! 研究流水线编排器
//!
//! run(query) 依次执行 BUILD_AGENTS → RESEARCH → SYNTHESIZE → PERSIST：
//! 调研员（带工具）产出 ResearchNotes，撰写人（无工具）只接收这份笔记并产出 Report，
//! 最后写入知识库。任何阶段失败都在这里被捕获一次并分类，调用方只会拿到 RunOutcome。

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::config::AppConfig;
use crate::core::{classify, guidance, PipelineError, PipelineStage, RunOutcome};
use crate::crew::{AgentRunner, Report, ResearchCrew, ResearchNotes, Task, TaskRunner};
use crate::knowledge::KnowledgeRepository;
use crate::llm::{create_groq_client, LlmClient};
use crate::tools::{build_research_tools, ToolRegistry};

pub struct ResearchPipeline {
    config: AppConfig,
    repository: KnowledgeRepository,
    runner: Arc<dyn TaskRunner>,
    llm: Option<Arc<dyn LlmClient>>,
    research_tools: Option<ToolRegistry>,
}

impl ResearchPipeline {
    /// 按配置构建；LLM 客户端与工具集在每次 run 的 BUILD_AGENTS 阶段才创建
    pub fn new(config: AppConfig) -> Self {
        let repository = KnowledgeRepository::new(config.app.knowledge_base_dir.clone());
        let runner = Arc::new(AgentRunner::new(
            config.pipeline.max_steps,
            config.tools.tool_timeout_secs,
        ));
        Self {
            config,
            repository,
            runner,
            llm: None,
            research_tools: None,
        }
    }

    /// 使用指定的 LLM 客户端，跳过 Groq 凭证检查
    pub fn with_llm(mut self, llm: Arc<dyn LlmClient>) -> Self {
        self.llm = Some(llm);
        self
    }

    pub fn with_runner(mut self, runner: Arc<dyn TaskRunner>) -> Self {
        self.runner = runner;
        self
    }

    /// 替换调研员的工具集（默认 web_research + kaggle_datasets_overview）
    pub fn with_research_tools(mut self, tools: ToolRegistry) -> Self {
        self.research_tools = Some(tools);
        self
    }

    pub fn repository(&self) -> &KnowledgeRepository {
        &self.repository
    }

    /// 执行一次完整调研；永远返回成功或已分类的失败，不会向调用方抛错
    pub async fn run(&self, query: &str) -> RunOutcome {
        match self.run_stages(query).await {
            Ok((report, report_path)) => {
                tracing::info!(stage = %PipelineStage::Done, path = %report_path.display(), "research run finished");
                RunOutcome::Success {
                    report: report.0,
                    report_path,
                }
            }
            Err(e) => {
                let raw = e.to_string();
                let kind = classify(&raw);
                tracing::error!(error_type = %kind, error = %raw, "research run failed");
                RunOutcome::Failure {
                    error_type: kind,
                    error: guidance(kind, &raw),
                }
            }
        }
    }

    async fn run_stages(&self, query: &str) -> Result<(Report, PathBuf), PipelineError> {
        tracing::info!(stage = %PipelineStage::Init, query = %query, "research run started");

        tracing::info!(stage = %PipelineStage::BuildAgents, "building agents");
        let llm = match &self.llm {
            Some(llm) => llm.clone(),
            None => create_groq_client(&self.config)?,
        };
        let tools = self
            .research_tools
            .clone()
            .unwrap_or_else(|| build_research_tools(&self.config));
        let crew = ResearchCrew::new(llm.clone(), tools);

        let notes = ResearchNotes(
            self.run_stage(PipelineStage::Research, crew.research_task(query))
                .await?,
        );
        let report = Report(
            self.run_stage(PipelineStage::Synthesize, crew.writing_task(&notes))
                .await?,
        );

        let (prompt_tokens, completion_tokens, total_tokens) = llm.token_usage();
        tracing::info!(prompt_tokens, completion_tokens, total_tokens, "token usage");

        tracing::info!(stage = %PipelineStage::Persist, "saving report");
        let path = self.repository.save_entry(query, &report.0)?;
        Ok((report, path))
    }

    /// 在阶段截止时间内执行单个任务；任务 panic 或输出为空都视为该阶段失败
    async fn run_stage(&self, stage: PipelineStage, task: Task) -> Result<String, PipelineError> {
        tracing::info!(stage = %stage, role = %task.agent.role, "stage started");
        let secs = self.config.pipeline.stage_timeout_secs;

        let runner = self.runner.clone();
        let mut handle = tokio::spawn(async move { runner.execute(&task).await });
        let output = match tokio::time::timeout(Duration::from_secs(secs), &mut handle).await {
            Ok(Ok(result)) => result?,
            Ok(Err(join_err)) => {
                return Err(PipelineError::StageAborted {
                    stage,
                    reason: join_err.to_string(),
                })
            }
            Err(_) => {
                handle.abort();
                return Err(PipelineError::StageTimeout { stage, secs });
            }
        };

        if output.trim().is_empty() {
            return Err(PipelineError::EmptyOutput(stage));
        }
        tracing::info!(stage = %stage, output_chars = output.chars().count(), "stage completed");
        Ok(output)
    }
}
