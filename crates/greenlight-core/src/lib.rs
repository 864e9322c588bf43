//! Greenlight core: audits the factual reliability of another agent's answers.
//!
//! The pipeline retrieves an independently-sourced ground-truth context for
//! each question, asks an LLM judge to compare the candidate answer against
//! it, and records a traffic-light verdict (GREEN/YELLOW/RED) with a score
//! and rationale in an append-only, resumable audit log.

pub mod dataset;
pub mod driver;
pub mod errors;
pub mod executor;
pub mod judge;
pub mod model;
pub mod providers;
pub mod report;
pub mod retrieval;
pub mod store;
