//! Cross-service trace aggregation
//!
//! A page can show tool calls from several generation calls at once (recipe
//! generation and nutrition analysis, say). This module merges them into a
//! single summary and timeline.

use crate::payload::display_value;
use crate::schema::{ToolInvocation, Usage};
use serde::Serialize;

/// Tool invocations from one generation call, labelled by service.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceTrace {
    pub service: String,
    pub invocations: Vec<ToolInvocation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

/// Totals across every service in a trace view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceSummary {
    pub total_tools: usize,
    pub error_count: usize,
    pub services: usize,
    pub earliest_start: Option<i64>,
    pub latest_end: Option<i64>,
    pub total_duration: i64,
    /// Summed token usage; absent when nothing reported tokens
    pub total_tokens: Option<u64>,
}

/// An invocation placed on the merged timeline.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEntry<'a> {
    pub service: &'a str,
    /// Position within its own service
    pub index: usize,
    #[serde(flatten)]
    pub invocation: &'a ToolInvocation,
    /// Result rendered for reading; "No data" when the call returned nothing
    pub result_display: String,
}

impl TraceSummary {
    pub fn from_services(traces: &[ServiceTrace]) -> Self {
        let all = || traces.iter().flat_map(|t| t.invocations.iter());

        let earliest_start = all().map(|i| i.start_time).min();
        let latest_end = all().map(|i| i.end_time).max();
        let total_duration = match (earliest_start, latest_end) {
            (Some(start), Some(end)) => (end - start).max(0),
            _ => 0,
        };
        let tokens: u64 = traces
            .iter()
            .filter_map(|t| t.usage)
            .map(|u| u.total_tokens)
            .sum();

        Self {
            total_tools: all().count(),
            error_count: all().filter(|i| i.is_error).count(),
            services: traces.len(),
            earliest_start,
            latest_end,
            total_duration,
            total_tokens: (tokens > 0).then_some(tokens),
        }
    }

    /// Every invocation across services, ordered by start time. Ties keep
    /// service order, then call order.
    pub fn timeline(traces: &[ServiceTrace]) -> Vec<TimelineEntry<'_>> {
        let mut entries: Vec<TimelineEntry<'_>> = traces
            .iter()
            .flat_map(|t| {
                t.invocations
                    .iter()
                    .enumerate()
                    .map(move |(index, invocation)| TimelineEntry {
                        service: &t.service,
                        index,
                        invocation,
                        result_display: display_value(&invocation.result),
                    })
            })
            .collect();
        entries.sort_by_key(|e| e.invocation.start_time);
        entries
    }
}

/// Human-readable duration: milliseconds under a second, else seconds.
pub fn format_duration(ms: i64) -> String {
    if ms < 1000 {
        format!("{ms}ms")
    } else {
        format!("{:.2}s", ms as f64 / 1000.0)
    }
}
