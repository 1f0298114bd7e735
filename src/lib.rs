//! recipe-ctx — recover structure from LLM recipe generations
//!
//! Parses the loosely structured markdown a model writes for a recipe into a
//! typed record, and rebuilds a timeline of the tool calls made during the
//! generation from its steps and total duration. Everything here is pure and
//! deterministic; callers own I/O and model invocation.

pub mod error;
pub mod input;
pub mod markdown;
pub mod nutrition;
pub mod payload;
pub mod recipe_parser;
pub mod schema;
pub mod sections;
pub mod timeline;
pub mod trace;

pub use recipe_parser::parse;
pub use schema::{GenerationOutput, GenerationReport, ParsedRecipe, ToolInvocation};
pub use timeline::reconstruct;

use schema::{Timing, SCHEMA_VERSION};
use sections::SECTION_TABLE_VERSION;

/// Parse the reply text and rebuild the tool timeline of one generation.
pub fn analyze(output: &GenerationOutput) -> GenerationReport {
    let recipe = output.text.as_deref().map(parse);
    let tools_used = reconstruct(
        &output.steps,
        output.overall_start_time,
        output.total_duration_ms,
    );

    GenerationReport {
        schema_version: SCHEMA_VERSION.to_string(),
        section_table_version: SECTION_TABLE_VERSION,
        recipe,
        tools_used,
        usage: output.usage,
        timing: Timing::new(output.overall_start_time, output.total_duration_ms),
    }
}
