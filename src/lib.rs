//! Scout - Rust 技术调研智能体
//!
//! 模块划分：
//! - **config**: 应用配置加载（TOML + 环境变量），解析后显式传入各组件
//! - **core**: 流水线阶段、错误分类、运行结果与编排器
//! - **crew**: Agent / Task 值对象、提示词与有界的工具调用循环
//! - **knowledge**: 只追加的报告知识库
//! - **llm**: LLM 客户端抽象与实现（OpenAI 兼容 / Groq / Mock）
//! - **observability**: tracing 初始化
//! - **tools**: 工具契约、注册表与执行器（web_research、kaggle_datasets_overview）

pub mod config;
pub mod core;
pub mod crew;
pub mod knowledge;
pub mod llm;
pub mod observability;
pub mod tools;

pub use core::{ResearchPipeline, RunOutcome};
