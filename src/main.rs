//! Scout - 命令行入口
//!
//! 加载 .env 与配置、初始化日志，然后执行子命令：research / recent / show / status。

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use scout::config::{load_config, AppConfig, LLM_CREDENTIAL_VAR, SEARCH_CREDENTIAL_VAR};
use scout::knowledge::KnowledgeRepository;
use scout::{observability, ResearchPipeline, RunOutcome};

/// 列表预览的正文字符数
const PREVIEW_CHARS: usize = 160;

#[derive(Parser)]
#[command(
    name = "scout",
    version,
    about = "Research a technology question and save the report to a local knowledge base."
)]
struct Cli {
    /// 额外的 TOML 配置文件（覆盖 config/default.toml）
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the research + writing pipeline for a query.
    Research {
        /// Technology question to research.
        query: String,

        /// Print the run result as JSON.
        #[arg(long)]
        json: bool,
    },

    /// List saved reports, newest first.
    Recent {
        #[arg(short, long, default_value_t = 10)]
        limit: usize,

        /// Only show reports whose query or body contains this term.
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Print one saved report.
    Show {
        path: PathBuf,
    },

    /// Show configuration status.
    Status,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // .env 不存在时忽略
    let _ = dotenvy::dotenv();
    observability::init();

    let cli = Cli::parse();
    let cfg = load_config(cli.config.as_deref()).context("Failed to load configuration")?;

    match cli.command {
        Command::Research { query, json } => research(cfg, &query, json).await,
        Command::Recent { limit, search } => {
            recent(&cfg, limit, search.as_deref())?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Show { path } => {
            let entry = KnowledgeRepository::new(&cfg.app.knowledge_base_dir)
                .read(&path)
                .with_context(|| format!("Failed to read report {}", path.display()))?;
            println!("{}", entry.body);
            Ok(ExitCode::SUCCESS)
        }
        Command::Status => {
            status(&cfg);
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn research(cfg: AppConfig, query: &str, json: bool) -> anyhow::Result<ExitCode> {
    if query.trim().is_empty() {
        anyhow::bail!("Query must not be empty");
    }
    cfg.ensure_dirs().context("Failed to create data directories")?;

    let outcome = ResearchPipeline::new(cfg).run(query).await;
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&outcome.to_json()).context("Failed to encode result")?
        );
    } else {
        match &outcome {
            RunOutcome::Success {
                report,
                report_path,
            } => {
                println!("{report}");
                eprintln!("\nSaved to {}", report_path.display());
            }
            RunOutcome::Failure { error, .. } => eprintln!("{error}"),
        }
    }

    Ok(if outcome.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn recent(cfg: &AppConfig, limit: usize, search: Option<&str>) -> anyhow::Result<()> {
    let repo = KnowledgeRepository::new(&cfg.app.knowledge_base_dir);
    let entries = match search {
        Some(term) => repo.search(term, limit),
        None => repo.list_recent(limit),
    }
    .context("Failed to scan knowledge base")?;

    if entries.is_empty() {
        println!("No saved reports in {}", repo.base_dir().display());
        return Ok(());
    }
    for entry in entries {
        println!(
            "{}  {}\n    {}\n    {}\n",
            entry.created_at.format("%Y-%m-%d %H:%M"),
            entry.query,
            entry.path.display(),
            entry.preview(PREVIEW_CHARS).replace('\n', " ")
        );
    }
    Ok(())
}

fn status(cfg: &AppConfig) {
    let configured = |v: &Option<String>| {
        if v.as_deref().is_some_and(|k| !k.trim().is_empty()) {
            "configured"
        } else {
            "missing"
        }
    };
    let exists = |p: &std::path::Path| if p.is_dir() { "exists" } else { "not created yet" };

    println!("LLM provider:    {} ({})", cfg.llm.provider, cfg.model_name());
    println!("{LLM_CREDENTIAL_VAR}:    {}", configured(&cfg.llm.api_key));
    println!(
        "{SEARCH_CREDENTIAL_VAR}:  {} (optional, web research degrades without it)",
        configured(&cfg.tools.search.api_key)
    );
    println!(
        "Knowledge base:  {} ({})",
        cfg.app.knowledge_base_dir.display(),
        exists(&cfg.app.knowledge_base_dir)
    );
    println!(
        "Datasets:        {} ({})",
        cfg.tools.datasets.data_dir.display(),
        exists(&cfg.tools.datasets.data_dir)
    );
}
