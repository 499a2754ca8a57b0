//! Text formatting for run summaries, tier tables, and recalibration output.

use crate::app::pipeline::RunCounters;
use crate::domain::{Tier, TierThresholds};
use crate::stats::{BatchStats, TopEntry};
use crate::tier::{TierMovement, tier_index};

/// Format the full run summary (counters + distribution + top-N).
pub fn format_run_summary(
    source: &str,
    counters: &RunCounters,
    stats: &BatchStats,
    thresholds: &TierThresholds,
    suggested: Option<&TierThresholds>,
) -> String {
    let mut out = String::new();

    out.push_str("=== starrank - catalog scoring ===\n");
    out.push_str(&format!("Source: {source}\n"));
    out.push_str(&format!(
        "Rows: read={} | scored={} | malformed={} | dropped={} | renamed={}\n",
        counters.rows_read,
        counters.rows_scored,
        counters.rows_malformed,
        counters.rows_dropped,
        counters.names_disambiguated,
    ));
    out.push('\n');

    out.push_str(&format_stats(stats, Some(thresholds)));

    if let Some(s) = suggested {
        out.push_str("\nSuggested thresholds:\n");
        out.push_str(&format!("- {}\n", fmt_thresholds(s)));
    }

    out
}

/// Format a statistics summary: distribution, score spread, coverage, top-N.
pub fn format_stats(stats: &BatchStats, thresholds: Option<&TierThresholds>) -> String {
    let mut out = String::new();

    out.push_str(&format!("Objects: n={}\n", stats.total_objects));
    if let Some(t) = thresholds {
        out.push_str(&format!("Thresholds: {}\n", fmt_thresholds(t)));
    }
    match &stats.score_stats {
        Some(s) => out.push_str(&format!(
            "Score: min={:.2} max={:.2} mean={:.2} median={:.2} sd={:.2} p90={:.2} p99={:.2}\n",
            s.min, s.max, s.mean, s.median, s.std_dev, s.p90, s.p99
        )),
        None => out.push_str("Score: (no objects)\n"),
    }
    out.push_str(&format!(
        "Low confidence: {} ({:.1}%)\n",
        stats.low_confidence.count, stats.low_confidence.percent
    ));

    out.push_str("\nTier distribution:\n");
    out.push_str(&format_tier_table(stats));

    out.push_str("\nQuality flags:\n");
    for c in &stats.flag_coverage {
        out.push_str(&format!("  {:<22} {:>9} {:>7.2}%\n", c.name, c.count, c.percent));
    }

    out.push_str("\nComponents (non-zero / mean):\n");
    for c in &stats.component_coverage {
        out.push_str(&format!(
            "  {:<24} {:>9} {:>7.2}% {:>8.2}\n",
            c.name, c.nonzero, c.percent, c.mean
        ));
    }

    out.push_str(&format!("\nTop {}:\n", stats.top.len()));
    out.push_str(&format_top(&stats.top));

    out
}

/// Count and share per tier, highest first.
pub fn format_tier_table(stats: &BatchStats) -> String {
    let mut out = String::new();
    push_line(&mut out, format!("{:<12} {:>9} {:>8}", "tier", "count", "percent"));
    push_line(&mut out, format!("{:-<12} {:-<9} {:-<8}", "", "", ""));
    for t in &stats.tier_distribution {
        push_line(
            &mut out,
            format!("{:<12} {:>9} {:>7.2}%", t.tier.display_name(), t.count, t.percent),
        );
    }
    out
}

/// Ranked table of top entries.
pub fn format_top(rows: &[TopEntry]) -> String {
    let mut out = String::new();
    push_line(
        &mut out,
        format!("{:>5} {:<28} {:>9} {:<12} {:<4}", "rank", "name", "score", "tier", "conf"),
    );
    push_line(&mut out, format!("{:-<5} {:-<28} {:-<9} {:-<12} {:-<4}", "", "", "", "", ""));
    for r in rows {
        push_line(
            &mut out,
            format!(
                "{:>5} {:<28} {:>9.2} {:<12} {:<4}",
                r.rank,
                truncate(&r.name, 28),
                r.total_score,
                r.tier.display_name(),
                if r.low_confidence { "low" } else { "" },
            ),
        );
    }
    out
}

/// Before/after tier counts plus the movement matrix.
pub fn format_recalibration(
    before: &BatchStats,
    after: &BatchStats,
    movement: &TierMovement,
    thresholds: &TierThresholds,
    suggested: Option<&TierThresholds>,
) -> String {
    let mut out = String::new();

    out.push_str("=== starrank - recalibration ===\n");
    out.push_str(&format!("Objects: n={}\n", after.total_objects));
    out.push_str(&format!("Thresholds: {}\n\n", fmt_thresholds(thresholds)));

    push_line(&mut out, format!("{:<12} {:>9} {:>9} {:>8}", "tier", "before", "after", "delta"));
    push_line(&mut out, format!("{:-<12} {:-<9} {:-<9} {:-<8}", "", "", "", ""));
    for tier in Tier::ALL {
        let b = before.tier_count(tier);
        let a = after.tier_count(tier);
        push_line(
            &mut out,
            format!("{:<12} {:>9} {:>9} {:>+8}", tier.display_name(), b, a, a as i64 - b as i64),
        );
    }

    out.push_str(&format!(
        "\nMoved: promoted={} | demoted={} | unchanged={}\n",
        movement.promoted, movement.demoted, movement.unchanged
    ));

    out.push_str("\nMovement (rows: before, columns: after):\n");
    let mut header = format!("{:<12}", "");
    for tier in Tier::ALL {
        header.push_str(&format!(" {:>11}", tier.display_name()));
    }
    push_line(&mut out, header);
    for from in Tier::ALL {
        let mut line = format!("{:<12}", from.display_name());
        for to in Tier::ALL {
            line.push_str(&format!(" {:>11}", movement.counts[tier_index(from)][tier_index(to)]));
        }
        push_line(&mut out, line);
    }

    if let Some(s) = suggested {
        out.push_str("\nSuggested thresholds:\n");
        out.push_str(&format!("- {}\n", fmt_thresholds(s)));
    }

    out
}

fn fmt_thresholds(t: &TierThresholds) -> String {
    t.ordered()
        .iter()
        .map(|(tier, min)| format!("{}>={min:.2}", tier.display_name()))
        .collect::<Vec<_>>()
        .join(" ")
}

fn push_line(out: &mut String, line: String) {
    out.push_str(line.trim_end());
    out.push('\n');
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}
