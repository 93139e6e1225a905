//! 工具执行器
//!
//! 持有 ToolRegistry 与单次调用超时；execute 总是返回 ToolInvocation（结果为文本），
//! 超时 / 未知工具 / 参数错误都写成 observation 交还给推理层。每次调用输出结构化审计日志（JSON）。

use std::time::{Duration, Instant};

use tokio::time::timeout;

use crate::tools::ToolRegistry;

/// 单条 observation 的最大字符数，超出部分截断
const MAX_OBSERVATION_CHARS: usize = 12_000;

/// 一次工具调用（瞬时值，仅在单个任务执行内使用，不持久化）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInvocation {
    pub tool: String,
    pub args: String,
    pub result: String,
    pub ok: bool,
}

/// 工具执行器：对每次调用施加超时并记录审计日志
#[derive(Clone)]
pub struct ToolExecutor {
    registry: ToolRegistry,
    timeout: Duration,
}

impl ToolExecutor {
    pub fn new(registry: ToolRegistry, timeout_secs: u64) -> Self {
        Self {
            registry,
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    /// 执行指定工具；任何失败都转成 result 文本
    pub async fn execute(&self, tool_name: &str, args: serde_json::Value) -> ToolInvocation {
        let start = Instant::now();
        let args_preview = args_preview(&args);
        let result = timeout(self.timeout, self.registry.execute(tool_name, args)).await;

        let (ok, outcome, text) = match result {
            Ok(Ok(content)) => (true, "ok", content),
            Ok(Err(e)) => (false, "error", format!("Tool call error: {e}")),
            Err(_) => (
                false,
                "timeout",
                format!(
                    "Tool {tool_name} timed out after {}s; continue without its result.",
                    self.timeout.as_secs()
                ),
            ),
        };
        let duration_ms = start.elapsed().as_millis() as u64;
        let audit = serde_json::json!({
            "event": "tool_audit",
            "tool": tool_name,
            "ok": ok,
            "outcome": outcome,
            "duration_ms": duration_ms,
            "args_preview": args_preview,
        });
        tracing::info!(audit = %audit.to_string(), "tool");

        ToolInvocation {
            tool: tool_name.to_string(),
            args: args_preview,
            result: bound_chars(text, MAX_OBSERVATION_CHARS),
            ok,
        }
    }
}

fn args_preview(args: &serde_json::Value) -> String {
    let s = args.to_string();
    if s.chars().count() > 200 {
        format!("{}...", s.chars().take(200).collect::<String>())
    } else {
        s
    }
}

fn bound_chars(text: String, max: usize) -> String {
    if text.chars().count() > max {
        text.chars().take(max).collect::<String>() + "\n...[truncated]"
    } else {
        text
    }
}
