use crate::args::{AssessArgs, AuditArgs, StackOpts};
use anyhow::Context;
use greenlight_core::driver::{BatchAuditDriver, DriverConfig};
use greenlight_core::executor;
use greenlight_core::judge::SignalJudge;
use greenlight_core::providers::agent::AgentClient;
use greenlight_core::providers::embedder::{Embedder, OpenAiEmbedder};
use greenlight_core::providers::llm::OpenAiCompatClient;
use greenlight_core::report::progress;
use greenlight_core::retrieval::{ContextRetriever, InMemoryStore};
use greenlight_core::store::AuditRecordStore;
use std::sync::Arc;
use std::time::Duration;

/// Embed the corpus and wire up the retriever and judge. The corpus is
/// embedded once at startup; retrieval during the run is local.
async fn build_stack(opts: &StackOpts) -> anyhow::Result<(ContextRetriever, SignalJudge)> {
    let embedder = Arc::new(OpenAiEmbedder::new(
        opts.embedding_model.clone(),
        opts.api_key.clone(),
        opts.base_url.clone(),
    ));

    let text = std::fs::read_to_string(&opts.corpus)
        .with_context(|| format!("read corpus {}", opts.corpus.display()))?;
    let mut store = InMemoryStore::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let vector = embedder.embed(line).await?;
        store.insert(line.to_string(), vector);
    }
    anyhow::ensure!(
        !store.is_empty(),
        "corpus {} holds no snippets",
        opts.corpus.display()
    );
    tracing::info!(snippets = store.len(), "ground-truth corpus embedded");

    let retriever = ContextRetriever::new(embedder, Arc::new(store), opts.top_k);
    let judge = SignalJudge::new(Arc::new(OpenAiCompatClient::new(
        opts.model.clone(),
        opts.api_key.clone(),
        opts.base_url.clone(),
    )));
    Ok((retriever, judge))
}

pub async fn audit(args: AuditArgs) -> anyhow::Result<()> {
    let (retriever, judge) = build_stack(&args.stack).await?;
    let config = DriverConfig {
        dataset: args.dataset,
        out_jsonl: args.out_jsonl,
        report: args.report,
        start: args.start,
        limit: args.limit,
        retries: args.retries,
        item_delay: Duration::from_secs_f64(args.sleep),
        judge_model: args.stack.model.clone(),
        ..DriverConfig::default()
    };
    let driver = BatchAuditDriver {
        store: AuditRecordStore::new(config.out_jsonl.clone()),
        retriever,
        judge,
        agent: args
            .purple_url
            .map(|url| AgentClient::new(url, Duration::from_secs(args.agent_timeout))),
        config,
    };
    let report = driver.run(Some(progress::stderr_sink())).await?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

pub async fn assess(args: AssessArgs) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(&args.payload)
        .with_context(|| format!("read payload {}", args.payload.display()))?;
    let payload: serde_json::Value =
        serde_json::from_str(&text).context("payload is not valid JSON")?;
    let (retriever, judge) = build_stack(&args.stack).await?;
    let report = executor::run_assessment(
        &payload,
        retriever,
        judge,
        Duration::from_secs(args.agent_timeout),
    )
    .await?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
