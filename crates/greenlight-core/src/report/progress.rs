//! Progress reporting for batch runs. The driver emits done/total after
//! each item; a sink decides how to display it.

use std::sync::Arc;

/// One progress update: how many in-range items are done and total count.
#[derive(Debug, Clone, Copy)]
pub struct ProgressEvent {
    pub done: usize,
    pub total: usize,
}

/// Sink for progress events. The driver calls this each time an item
/// completes (scored, errored, or skipped).
pub type ProgressSink = Arc<dyn Fn(ProgressEvent) + Send + Sync>;

/// Format a single progress line for display. Deterministic, unit-testable.
#[must_use]
pub fn format_progress_line(done: usize, total: usize) -> String {
    format!("Auditing item {}/{}...", done, total)
}

/// Sink that prints each progress line to stderr.
pub fn stderr_sink() -> ProgressSink {
    Arc::new(|ev: ProgressEvent| {
        eprintln!("{}", format_progress_line(ev.done, ev.total));
    })
}

#[cfg(test)]
mod tests {
    use super::format_progress_line;

    #[test]
    fn format_progress_line_contains_done_and_total() {
        let s = format_progress_line(3, 10);
        assert!(s.contains("3/10"), "expected '3/10' in {:?}", s);
    }

    #[test]
    fn format_progress_line_final() {
        assert!(format_progress_line(5, 5).contains("5/5"));
    }
}
