//! Tool-call timeline reconstruction
//!
//! A generation call only reports its total wall-clock time, so per-call
//! timing is apportioned: every step that made calls gets an equal share of
//! the total, and each call an equal share of its step. The shares tile
//! `[overall_start, overall_start + total_duration]` without gaps.

use crate::payload::{is_truthy, message_text, ToolPayload};
use crate::schema::{Step, ToolCall, ToolInvocation, ToolResult};
use serde_json::{Map, Value};

/// Message for a call whose result never arrived.
pub const NO_RESULT_MESSAGE: &str = "No tool result returned";

/// Message for a result flagged as failed without saying why.
pub const GENERIC_ERROR_MESSAGE: &str = "Tool reported an error";

/// Lower-case fragments that mark a string result as a failure.
const FAILURE_WORDS: &[&str] = &["error", "failed", "exception", "timeout", "invalid"];

const FAILURE_GLYPHS: &[char] = &['❌', '✗', '✘', '✖'];

/// Rebuild the ordered list of tool invocations for one generation call.
///
/// Steps without calls take no share of the time budget. A non-positive
/// `total_duration` collapses every interval onto `overall_start`.
pub fn reconstruct(steps: &[Step], overall_start: i64, total_duration: i64) -> Vec<ToolInvocation> {
    let active: Vec<&Step> = steps.iter().filter(|s| !s.calls().is_empty()).collect();
    if active.is_empty() {
        return Vec::new();
    }

    let total = total_duration.max(0) as f64;
    let origin = overall_start as f64;
    let step_count = active.len() as f64;
    let step_boundary = |k: usize| origin + total * k as f64 / step_count;

    tracing::debug!(
        steps = active.len(),
        total_duration,
        "apportioning tool-call time"
    );

    let mut invocations = Vec::new();
    for (k, step) in active.iter().enumerate() {
        let step_start = step_boundary(k);
        let step_end = step_boundary(k + 1);
        let calls = step.calls();
        let call_count = calls.len() as f64;
        let call_boundary = |j: usize| {
            if j == calls.len() {
                step_end
            } else {
                step_start + (step_end - step_start) * j as f64 / call_count
            }
        };

        for (j, call) in calls.iter().enumerate() {
            let start_time = call_boundary(j).round() as i64;
            let end_time = call_boundary(j + 1).round() as i64;
            invocations.push(build_invocation(step, call, start_time, end_time));
        }
    }

    invocations
}

fn build_invocation(step: &Step, call: &ToolCall, start_time: i64, end_time: i64) -> ToolInvocation {
    let tool_name = call.tool_name.clone().unwrap_or_else(|| "unknown".to_string());
    let result = step.result_for(call.tool_call_id.as_deref());
    let error = classify_error(result);

    if let Some(message) = &error {
        tracing::warn!(tool = %tool_name, error = %message, "tool call failed");
    }

    ToolInvocation {
        tool_name,
        args: object_args(&call.args),
        result: result.map(|r| r.result.clone()).unwrap_or(Value::Null),
        start_time,
        end_time,
        duration: end_time - start_time,
        is_error: error.is_some(),
        error,
    }
}

fn object_args(args: &Value) -> Map<String, Value> {
    match args {
        Value::Object(map) => map.clone(),
        Value::Null => Map::new(),
        other => {
            tracing::debug!(args = %other, "ignoring non-object tool arguments");
            Map::new()
        }
    }
}

/// Decide whether a call failed, returning the failure message.
///
/// Checks run in order and the first hit wins: the entry's `error` field,
/// the entry's `isError` flag, an `error` key on an object result, an
/// `isError` flag on an object result, failure wording in string results,
/// and finally a missing entry.
pub fn classify_error(result: Option<&ToolResult>) -> Option<String> {
    let Some(entry) = result else {
        return Some(NO_RESULT_MESSAGE.to_string());
    };

    if is_truthy(&entry.error) {
        return Some(message_text(&entry.error));
    }
    if is_truthy(&entry.is_error) {
        return Some(message_or_generic(&entry.message));
    }

    if let Value::Object(map) = &entry.result {
        if let Some(error) = map.get("error").filter(|e| is_truthy(e)) {
            return Some(message_text(error));
        }
        if map.get("isError").is_some_and(is_truthy) {
            return Some(message_or_generic(map.get("message").unwrap_or(&Value::Null)));
        }
    }

    ToolPayload::from_value(&entry.result)
        .and_then(|payload| payload.text())
        .filter(|text| looks_like_failure(text))
}

fn message_or_generic(message: &Value) -> String {
    if is_truthy(message) {
        message_text(message)
    } else {
        GENERIC_ERROR_MESSAGE.to_string()
    }
}

fn looks_like_failure(text: &str) -> bool {
    let lower = text.to_lowercase();
    text.trim_start().starts_with(FAILURE_GLYPHS) || FAILURE_WORDS.iter().any(|w| lower.contains(w))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn step(value: Value) -> Step {
        serde_json::from_value(value).unwrap()
    }

    fn intervals(invocations: &[ToolInvocation]) -> Vec<(String, i64, i64)> {
        invocations
            .iter()
            .map(|i| (i.tool_name.clone(), i.start_time, i.end_time))
            .collect()
    }

    #[test]
    fn test_waterfall_apportionment() {
        let steps = vec![
            step(json!({
                "toolCalls": [
                    {"toolCallId": "a", "toolName": "A"},
                    {"toolCallId": "b", "toolName": "B"}
                ],
                "toolResults": [
                    {"toolCallId": "a", "result": "ok"},
                    {"toolCallId": "b", "result": "ok"}
                ]
            })),
            step(json!({
                "toolCalls": [{"toolCallId": "c", "toolName": "C"}],
                "toolResults": [{"toolCallId": "c", "result": "ok"}]
            })),
        ];

        let invocations = reconstruct(&steps, 0, 300);
        assert_eq!(
            intervals(&invocations),
            vec![
                ("A".to_string(), 0, 75),
                ("B".to_string(), 75, 150),
                ("C".to_string(), 150, 300),
            ]
        );
        assert!(invocations.iter().all(|i| !i.is_error));
    }

    #[test]
    fn test_empty_steps_take_no_time() {
        let steps = vec![
            step(json!({})),
            step(json!({"toolCalls": [], "toolResults": []})),
            step(json!({"toolCalls": [{"toolCallId": "x", "toolName": "X"}]})),
        ];
        let invocations = reconstruct(&steps, 1_000, 90);
        assert_eq!(intervals(&invocations), vec![("X".to_string(), 1_000, 1_090)]);
        assert_eq!(invocations[0].duration, 90);
    }

    #[test]
    fn test_intervals_are_contiguous_and_cover_total() {
        let steps = vec![
            step(json!({"toolCalls": [{"toolName": "a"}, {"toolName": "b"}, {"toolName": "c"}]})),
            step(json!({"toolCalls": [{"toolName": "d"}]})),
            step(json!({"toolCalls": [{"toolName": "e"}, {"toolName": "f"}, {"toolName": "g"}]})),
        ];
        let start = 1_700_000_000_123;
        let invocations = reconstruct(&steps, start, 1_001);

        assert_eq!(invocations.len(), 7);
        assert_eq!(invocations[0].start_time, start);
        assert_eq!(invocations[6].end_time, start + 1_001);
        for pair in invocations.windows(2) {
            assert_eq!(pair[0].end_time, pair[1].start_time);
        }
        let total: i64 = invocations.iter().map(|i| i.duration).sum();
        assert_eq!(total, 1_001);
    }

    #[test]
    fn test_zero_duration_collapses() {
        let steps = vec![step(json!({"toolCalls": [{"toolName": "a"}, {"toolName": "b"}]}))];
        for total in [0, -50] {
            let invocations = reconstruct(&steps, 42, total);
            assert!(invocations
                .iter()
                .all(|i| i.start_time == 42 && i.end_time == 42 && i.duration == 0));
        }
        assert!(reconstruct(&[], 42, 100).is_empty());
    }

    #[test]
    fn test_defaults_for_missing_fields() {
        let steps = vec![step(json!({"toolCalls": [{"args": "not an object"}]}))];
        let invocation = &reconstruct(&steps, 0, 10)[0];
        assert_eq!(invocation.tool_name, "unknown");
        assert!(invocation.args.is_empty());
        assert_eq!(invocation.result, Value::Null);
        assert_eq!(invocation.error.as_deref(), Some(NO_RESULT_MESSAGE));
    }

    #[test]
    fn test_args_and_result_carried_through() {
        let steps = vec![step(json!({
            "toolCalls": [{"toolCallId": "w", "toolName": "get_weather", "args": {"location": "Lima"}}],
            "toolResults": [{"toolCallId": "w", "result": {"temperature": "70°F"}}]
        }))];
        let invocation = &reconstruct(&steps, 0, 10)[0];
        assert_eq!(invocation.args.get("location"), Some(&json!("Lima")));
        assert_eq!(invocation.result, json!({"temperature": "70°F"}));
        assert!(!invocation.is_error);
    }

    fn classify(entry: Value) -> Option<String> {
        let result: ToolResult = serde_json::from_value(entry).unwrap();
        classify_error(Some(&result))
    }

    #[test]
    fn test_classification_precedence() {
        // explicit error field beats everything else
        assert_eq!(
            classify(json!({"error": "boom", "isError": true, "message": "other"})).as_deref(),
            Some("boom")
        );
        assert_eq!(
            classify(json!({"isError": true, "message": "quota exceeded"})).as_deref(),
            Some("quota exceeded")
        );
        assert_eq!(
            classify(json!({"isError": true})).as_deref(),
            Some(GENERIC_ERROR_MESSAGE)
        );
        assert_eq!(
            classify(json!({"result": {"error": {"code": 404}}})).as_deref(),
            Some("{\"code\":404}")
        );
        assert_eq!(
            classify(json!({"result": {"isError": true, "message": "bad location"}})).as_deref(),
            Some("bad location")
        );
        assert_eq!(
            classify(json!({"result": {"content": [], "isError": 1}})).as_deref(),
            Some(GENERIC_ERROR_MESSAGE)
        );
    }

    #[test]
    fn test_string_results() {
        assert_eq!(
            classify(json!({"result": "Error: rate limited"})).as_deref(),
            Some("Error: rate limited")
        );
        assert_eq!(
            classify(json!({"result": "Request TIMEOUT after 30s"})).as_deref(),
            Some("Request TIMEOUT after 30s")
        );
        assert_eq!(
            classify(json!({"result": "❌ lookup unavailable"})).as_deref(),
            Some("❌ lookup unavailable")
        );
        assert_eq!(classify(json!({"result": "Sunny, 21°C"})), None);
    }

    #[test]
    fn test_envelope_text_is_checked() {
        assert_eq!(
            classify(json!({"result": {"content": [{"type": "text", "text": "Invalid app key"}]}})).as_deref(),
            Some("Invalid app key")
        );
        assert_eq!(
            classify(json!({"result": {"content": [{"type": "text", "text": "{\"calories\": 105}"}]}})),
            None
        );
    }

    #[test]
    fn test_benign_results() {
        assert_eq!(classify(json!({"result": {"error": null, "data": 1}})), None);
        assert_eq!(classify(json!({"result": {"isError": false}})), None);
        assert_eq!(classify(json!({"result": {"success": true, "error": false}})), None);
        assert_eq!(classify(json!({"result": {"error": "", "items": []}})), None);
        assert_eq!(classify(json!({"error": "", "isError": false})), None);
        assert_eq!(classify(json!({})), None);
        assert_eq!(classify_error(None).as_deref(), Some(NO_RESULT_MESSAGE));
    }

    #[test]
    fn test_unmatched_result_id() {
        let steps = vec![step(json!({
            "toolCalls": [{"toolCallId": "a", "toolName": "lookup"}],
            "toolResults": [{"toolCallId": "z", "result": "ok"}]
        }))];
        let invocation = &reconstruct(&steps, 0, 100)[0];
        assert!(invocation.is_error);
        assert_eq!(invocation.error.as_deref(), Some("No tool result returned"));
        assert_eq!(invocation.result, Value::Null);
    }
}
