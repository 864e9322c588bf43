pub mod agent;
pub mod embedder;
pub mod llm;
