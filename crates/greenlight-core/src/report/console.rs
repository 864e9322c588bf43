//! Console output for audit runs: one line per item as it completes, a
//! running-counts line, and a final summary. Everything goes to stderr so
//! stdout stays clean for piping.

use crate::model::{RunStats, Signal, Verdict};

fn signal_icon(signal: Signal) -> &'static str {
    match signal {
        Signal::Green => "🟢",
        Signal::Yellow => "🟡",
        Signal::Red => "🔴",
    }
}

pub fn print_item(id: &str, verdict: &Verdict) {
    let reason = truncate(&verdict.reason, 80);
    eprintln!(
        "{} {:<20} {}  {:.2}  {}",
        signal_icon(verdict.signal),
        id,
        verdict.signal.as_str(),
        verdict.score,
        reason
    );
}

pub fn print_item_error(id: &str, message: &str) {
    eprintln!("💥 {:<20} ERROR: {}", id, message);
}

pub fn print_running_counts(stats: &RunStats) {
    eprintln!(
        "  G={} Y={} R={} err={} skip={} avg={:.3}",
        stats.green,
        stats.yellow,
        stats.red,
        stats.errors,
        stats.skipped_done,
        stats.avg_score()
    );
}

pub fn print_summary(stats: &RunStats) {
    eprintln!("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    eprintln!(
        "Summary: {} green, {} yellow, {} red, {} errors, {} skipped (avg score {:.3})",
        stats.green,
        stats.yellow,
        stats.red,
        stats.errors,
        stats.skipped_done,
        stats.avg_score()
    );
}

fn truncate(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((i, _)) => format!("{}...", &s[..i]),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::truncate;

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("short", 80), "short");
        let long = "法".repeat(100);
        let t = truncate(&long, 10);
        assert!(t.ends_with("..."));
        assert_eq!(t.chars().count(), 13);
    }
}
