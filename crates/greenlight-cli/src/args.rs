use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "greenlight",
    version,
    about = "Traffic-light auditor: checks another agent's legal answers against independently retrieved ground truth"
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Batch-audit a dataset, resuming from the record log
    Audit(AuditArgs),
    /// Run an assessment described by a JSON request payload
    Assess(AssessArgs),
}

/// Judge and retrieval stack options, shared by both commands.
#[derive(Args)]
pub struct StackOpts {
    /// Judge model identifier
    #[arg(long, env = "JUDGE_MODEL", default_value = "gpt-4o-mini")]
    pub model: String,

    /// OpenAI-compatible API base URL for judge and embeddings
    #[arg(long, env = "JUDGE_BASE_URL", default_value = "https://api.openai.com/v1")]
    pub base_url: String,

    #[arg(long, env = "JUDGE_API_KEY", hide_env_values = true)]
    pub api_key: String,

    /// Embedding model for ground-truth retrieval
    #[arg(long, env = "EMBEDDING_MODEL", default_value = "text-embedding-3-small")]
    pub embedding_model: String,

    /// Ground-truth corpus file, one snippet per line
    #[arg(long)]
    pub corpus: PathBuf,

    /// Snippets retrieved per question
    #[arg(long, default_value_t = 3)]
    pub top_k: usize,
}

#[derive(Args)]
pub struct AuditArgs {
    #[command(flatten)]
    pub stack: StackOpts,

    /// Dataset JSON file (array, or object wrapping one)
    #[arg(long, default_value = "data/dataset.json")]
    pub dataset: PathBuf,

    /// Append-only record log (JSONL)
    #[arg(long, default_value = "output/audit_results.jsonl")]
    pub out_jsonl: PathBuf,

    /// Final report path (JSON)
    #[arg(long, default_value = "output/final_audit_report.json")]
    pub report: PathBuf,

    /// First dataset index to audit
    #[arg(long, default_value_t = 0)]
    pub start: usize,

    /// Number of items to audit; 0 means all
    #[arg(long, default_value_t = 0)]
    pub limit: usize,

    /// Judge retries per item after the first attempt
    #[arg(long, default_value_t = 2)]
    pub retries: u32,

    /// Seconds to sleep between items (rate limiting)
    #[arg(long, default_value_t = 0.0)]
    pub sleep: f64,

    /// Candidate agent endpoint; recorded dataset answers are used when absent
    #[arg(long, env = "PURPLE_AGENT_URL")]
    pub purple_url: Option<String>,

    /// Candidate agent call timeout in seconds
    #[arg(long, default_value_t = 60)]
    pub agent_timeout: u64,
}

#[derive(Args)]
pub struct AssessArgs {
    #[command(flatten)]
    pub stack: StackOpts,

    /// JSON request payload with participants and config
    #[arg(long)]
    pub payload: PathBuf,

    /// Candidate agent call timeout in seconds
    #[arg(long, default_value_t = 60)]
    pub agent_timeout: u64,
}
