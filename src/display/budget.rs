//! Envelope and budget display formatting

use crate::models::Envelope;
use crate::services::{EnvelopeSummary, MonthOverview};

pub fn format_envelope_list(envelopes: &[Envelope], symbol: &str) -> String {
    if envelopes.is_empty() {
        return "No envelopes found.\n".to_string();
    }

    let mut output = String::new();
    let mut current_group: Option<&str> = None;

    for envelope in envelopes {
        if current_group != Some(envelope.group.as_str()) {
            output.push_str(&format!("{}\n", envelope.group));
            current_group = Some(envelope.group.as_str());
        }

        output.push_str(&format!("  {}", envelope.name));
        if let Some(objective) = &envelope.objective {
            output.push_str(&format!(
                "  [objective: {} {}]",
                objective.amount.format_with_symbol(symbol),
                objective.cadence
            ));
        }
        if envelope.archived {
            output.push_str("  (archived)");
        }
        output.push('\n');
    }

    output
}

pub fn format_envelope_summary(summary: &EnvelopeSummary, symbol: &str) -> String {
    let envelope = &summary.envelope;
    let mut output = String::new();
    output.push_str(&format!(
        "Envelope: {} ({}) - {}\n",
        envelope.name, envelope.group, summary.month
    ));
    output.push_str(&format!("  ID:          {}\n", envelope.id));
    output.push_str(&format!(
        "  Allocated:   {}\n",
        summary.totals.allocated.format_with_symbol(symbol)
    ));
    output.push_str(&format!(
        "  Spent:       {}\n",
        summary.totals.spent.format_with_symbol(symbol)
    ));
    output.push_str(&format!(
        "  Remaining:   {}{}\n",
        summary.totals.remaining.format_with_symbol(symbol),
        if summary.totals.is_overspent() { "  OVERSPENT" } else { "" }
    ));

    if let Some(objective) = &envelope.objective {
        output.push_str(&format!(
            "  Objective:   {} {}\n",
            objective.amount.format_with_symbol(symbol),
            objective.cadence
        ));
        output.push_str(&format!(
            "  This month:  {} (short {})\n",
            summary.requirement.format_with_symbol(symbol),
            summary.shortfall.format_with_symbol(symbol)
        ));
    }

    output.push_str(&format!("  Allocations: {}\n", summary.allocation_count));
    output
}

/// Budget table for one month
pub fn format_month_overview(overview: &MonthOverview, symbol: &str) -> String {
    let mut output = format!("Budget for {}\n", overview.month);
    output.push_str(&format!(
        "Ready to assign: {}\n\n",
        overview.ready_to_assign.format_with_symbol(symbol)
    ));

    if overview.envelopes.is_empty() {
        output.push_str("No envelopes found.\n");
        return output;
    }

    let name_width = overview
        .envelopes
        .iter()
        .map(|s| s.envelope.name.chars().count())
        .max()
        .unwrap_or(8)
        .max(8);

    output.push_str(&format!(
        "{:<name_width$}  {:>14}  {:>14}  {:>14}  {:>14}\n",
        "Envelope",
        "Allocated",
        "Spent",
        "Remaining",
        "Short",
        name_width = name_width,
    ));
    output.push_str(&format!(
        "{:-<name_width$}  {:->14}  {:->14}  {:->14}  {:->14}\n",
        "",
        "",
        "",
        "",
        "",
        name_width = name_width,
    ));

    for summary in &overview.envelopes {
        output.push_str(&format!(
            "{:<name_width$}  {:>14}  {:>14}  {:>14}  {:>14}\n",
            summary.envelope.name,
            summary.totals.allocated.format_with_symbol(symbol),
            summary.totals.spent.format_with_symbol(symbol),
            summary.totals.remaining.format_with_symbol(symbol),
            summary.shortfall.format_with_symbol(symbol),
            name_width = name_width,
        ));
    }

    output.push_str(&format!(
        "{:<name_width$}  {:>14}  {:>14}  {:>14}\n",
        "Total",
        overview.totals.allocated.format_with_symbol(symbol),
        overview.totals.spent.format_with_symbol(symbol),
        overview.totals.remaining.format_with_symbol(symbol),
        name_width = name_width,
    ));

    output
}
