//! Ground-truth context retrieval, independent of the agent under test.
//!
//! The retriever embeds the question (optionally HyDE-expanded with a short
//! answer excerpt) and queries a vector store for the closest snippets. The
//! snippets themselves always come verbatim from the store; the expansion
//! only influences their selection.

use crate::errors::AuditError;
use crate::providers::embedder::Embedder;
use async_trait::async_trait;
use std::sync::Arc;

/// Vector-store capability: nearest snippets for an embedding.
#[async_trait]
pub trait VectorStore: Send + Sync {
    async fn query(&self, vector: &[f32], top_k: usize) -> anyhow::Result<Vec<String>>;
}

/// Maximum candidate-answer excerpt folded into the HyDE query.
const HYDE_EXCERPT_MAX: usize = 200;

pub struct ContextRetriever {
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorStore>,
    top_k: usize,
}

impl ContextRetriever {
    pub fn new(embedder: Arc<dyn Embedder>, store: Arc<dyn VectorStore>, top_k: usize) -> Self {
        Self {
            embedder,
            store,
            top_k,
        }
    }

    /// Retrieve up to `top_k` ground-truth snippets for a question.
    ///
    /// `answer_excerpt` is a retrieval aid only (HyDE query expansion); it
    /// must never introduce content into the returned snippets. Returns an
    /// empty sequence only when the store has no match at all.
    pub async fn retrieve(
        &self,
        question: &str,
        answer_excerpt: Option<&str>,
    ) -> Result<Vec<String>, AuditError> {
        let query = expand_query(question, answer_excerpt);
        let vector = self
            .embedder
            .embed(&query)
            .await
            .map_err(|e| AuditError::Retrieval(format!("embed: {e}")))?;
        let snippets = self
            .store
            .query(&vector, self.top_k)
            .await
            .map_err(|e| AuditError::Retrieval(format!("vector store: {e}")))?;
        Ok(snippets)
    }
}

pub(crate) fn expand_query(question: &str, answer_excerpt: Option<&str>) -> String {
    match answer_excerpt {
        Some(excerpt) if !excerpt.trim().is_empty() => {
            let excerpt = excerpt
                .char_indices()
                .nth(HYDE_EXCERPT_MAX)
                .map(|(i, _)| &excerpt[..i])
                .unwrap_or(excerpt);
            format!("{} {}", question, excerpt)
        }
        _ => question.to_string(),
    }
}

/// In-memory cosine-similarity store for tests and small local corpora.
#[derive(Default)]
pub struct InMemoryStore {
    entries: Vec<(String, Vec<f32>)>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, text: String, vector: Vec<f32>) {
        self.entries.push((text, vector));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl VectorStore for InMemoryStore {
    async fn query(&self, vector: &[f32], top_k: usize) -> anyhow::Result<Vec<String>> {
        if let Some((_, first)) = self.entries.first() {
            if first.len() != vector.len() {
                anyhow::bail!(
                    "embedding dims mismatch: expected {}, got {}",
                    first.len(),
                    vector.len()
                );
            }
        }
        let mut scored: Vec<(f32, &String)> = self
            .entries
            .iter()
            .map(|(text, v)| (cosine(vector, v), text))
            .collect();
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        Ok(scored
            .into_iter()
            .take(top_k)
            .map(|(_, text)| text.clone())
            .collect())
    }
}

fn cosine(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let na: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let nb: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if na == 0.0 || nb == 0.0 {
        0.0
    } else {
        dot / (na * nb)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::embedder::FakeEmbedder;

    async fn retriever_with(snippets: &[&str], top_k: usize) -> ContextRetriever {
        let embedder = Arc::new(FakeEmbedder);
        let mut store = InMemoryStore::new();
        for s in snippets {
            let v = embedder.embed(s).await.unwrap();
            store.insert((*s).to_string(), v);
        }
        ContextRetriever::new(embedder, Arc::new(store), top_k)
    }

    #[tokio::test]
    async fn retrieval_is_independent_of_candidate_answer() {
        // Fixed question, no HyDE excerpt: the snippets must be identical no
        // matter which candidate answer is being audited. The only permitted
        // exception is the explicit HyDE expansion, covered below.
        let r = retriever_with(&["art 1 text", "art 2 text", "art 3 text"], 2).await;
        let a = r.retrieve("what does article 1 say?", None).await.unwrap();
        let b = r.retrieve("what does article 1 say?", None).await.unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 2);
    }

    #[tokio::test]
    async fn hyde_excerpt_may_change_selection_but_not_content() {
        let corpus = ["alpha statute body", "beta ruling body", "gamma clause body"];
        let r = retriever_with(&corpus, 1).await;
        let plain = r.retrieve("q", None).await.unwrap();
        let expanded = r.retrieve("q", Some("beta ruling body")).await.unwrap();
        // Every returned snippet is verbatim corpus text in both cases.
        for s in plain.iter().chain(expanded.iter()) {
            assert!(corpus.contains(&s.as_str()), "fabricated snippet: {s}");
        }
    }

    #[tokio::test]
    async fn empty_store_returns_empty_sequence() {
        let r = retriever_with(&[], 5).await;
        let out = r.retrieve("anything", None).await.unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn expand_query_truncates_excerpt() {
        let long = "x".repeat(500);
        let q = expand_query("question", Some(&long));
        assert_eq!(q.len(), "question ".len() + 200);
        assert_eq!(expand_query("question", Some("   ")), "question");
        assert_eq!(expand_query("question", None), "question");
    }
}
