//! 知识库：已完成报告的只追加存储（每次成功运行一个 markdown 文件）

pub mod repository;

pub use repository::{KnowledgeEntry, KnowledgeError, KnowledgeRepository};
