//! LLM 层：客户端抽象与实现（OpenAI 兼容 / Groq / Mock）
//!
//! 推理能力本身是外部协作者；本层只负责把消息发出去、把文本拿回来。

pub mod groq;
pub mod message;
pub mod mock;
pub mod openai;
pub mod traits;

pub use groq::{create_groq_client, GROQ_BASE_URL};
pub use message::{Message, Role};
pub use mock::MockLlmClient;
pub use openai::{OpenAiClient, TokenUsage};
pub use traits::LlmClient;
