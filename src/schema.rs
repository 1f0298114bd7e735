//! Value types for recipe-ctx
//!
//! Defines the generation output consumed from the orchestration layer and
//! the records handed to the presentation layer. Field names are camelCase
//! on the wire so they line up with the generation collaborator's shapes.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Current schema version
pub const SCHEMA_VERSION: &str = "1.0";

/// A recipe recovered from a heading-delimited model reply.
///
/// Collections are always present (possibly empty), never absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedRecipe {
    /// Text of the `## ` heading, empty when the document has none
    pub title: String,

    /// First free-text line before any section that is not metadata
    pub description: String,

    /// Preparation time as written by the model
    pub prep_time: String,

    /// Cooking time as written by the model
    pub cook_time: String,

    /// Total time as written by the model
    pub total_time: String,

    /// Servings or yield as written by the model
    pub servings: String,

    /// Ingredient lines, each starting with a bullet glyph or numeral
    #[serde(default)]
    pub ingredients: Vec<String>,

    /// Instruction lines, stored verbatim (numbering included)
    #[serde(default)]
    pub instructions: Vec<String>,

    /// Tips, notes and chef remarks
    #[serde(default)]
    pub tips: Vec<String>,

    /// Optional variations on the base recipe
    #[serde(default)]
    pub variations: Vec<String>,

    /// Local or seasonal additions
    #[serde(default)]
    pub seasonal_additions: Vec<String>,

    /// Nutrition facts, present only when a nutrition section had content
    pub nutrition_info: Option<NutritionInfo>,
}

/// Nutrition facts pulled from a nutrition section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NutritionInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calories: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protein: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub carbs: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fat: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fiber: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sugar: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sodium: Option<u32>,

    /// Descriptive prose lines, space-joined
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highlights: Option<String>,
}

/// Everything a single generation call hands back.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationOutput {
    /// Raw model reply
    #[serde(default)]
    pub text: Option<String>,

    /// Generation rounds in the order they happened
    #[serde(default)]
    pub steps: Vec<Step>,

    /// Token accounting, passed through untouched
    #[serde(default)]
    pub usage: Option<Usage>,

    /// Wall-clock start of the generation call (epoch ms)
    #[serde(default)]
    pub overall_start_time: i64,

    /// Wall-clock duration of the generation call (ms)
    #[serde(default)]
    pub total_duration_ms: i64,
}

/// One round of a multi-step generation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    #[serde(default)]
    pub tool_calls: Option<Vec<ToolCall>>,

    #[serde(default)]
    pub tool_results: Option<Vec<ToolResult>>,
}

impl Step {
    pub fn calls(&self) -> &[ToolCall] {
        self.tool_calls.as_deref().unwrap_or_default()
    }

    pub fn results(&self) -> &[ToolResult] {
        self.tool_results.as_deref().unwrap_or_default()
    }

    /// Look up the result paired with a call id.
    pub fn result_for(&self, tool_call_id: Option<&str>) -> Option<&ToolResult> {
        let id = tool_call_id?;
        self.results()
            .iter()
            .find(|r| r.tool_call_id.as_deref() == Some(id))
    }
}

/// A tool call requested by the model.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCall {
    #[serde(default)]
    pub tool_call_id: Option<String>,

    #[serde(default)]
    pub tool_name: Option<String>,

    /// Arguments as sent; only objects are kept downstream
    #[serde(default)]
    pub args: Value,
}

/// A tool result entry. Every field except the id is loosely typed because
/// tool providers do not agree on a shape.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResult {
    #[serde(default)]
    pub tool_call_id: Option<String>,

    #[serde(default)]
    pub result: Value,

    #[serde(default)]
    pub error: Value,

    #[serde(default)]
    pub is_error: Value,

    #[serde(default)]
    pub message: Value,
}

/// Token usage statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: u64,
    #[serde(default)]
    pub completion_tokens: u64,
    #[serde(default)]
    pub total_tokens: u64,
}

/// A reconstructed tool invocation with synthesized timing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolInvocation {
    pub tool_name: String,

    pub args: Map<String, Value>,

    /// Raw result value, `null` when none was returned
    pub result: Value,

    pub start_time: i64,
    pub end_time: i64,
    pub duration: i64,

    pub error: Option<String>,
    pub is_error: bool,
}

/// Wall-clock anchors of one generation call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timing {
    pub start_time: i64,
    pub end_time: i64,
    pub duration: i64,
}

impl Timing {
    pub fn new(start_time: i64, duration: i64) -> Self {
        let duration = duration.max(0);
        Self {
            start_time,
            end_time: start_time + duration,
            duration,
        }
    }
}

/// Everything recovered from one generation call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationReport {
    /// Schema version for forward compatibility
    pub schema_version: String,

    /// Revision of the heading keyword table the reply was parsed with
    pub section_table_version: u32,

    /// Parsed reply, absent when the generation returned no text
    pub recipe: Option<ParsedRecipe>,

    pub tools_used: Vec<ToolInvocation>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,

    pub timing: Timing,
}
