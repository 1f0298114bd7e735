//! Inline markdown rendering
//!
//! Turns model prose into a small block tree: paragraphs, ordered and
//! unordered lists, and line breaks, with `**bold**` spans inside each.
//! Also holds the display helpers that strip step numbers and bullets.

use crate::schema::ParsedRecipe;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static UNORDERED_ITEM: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[-*+]\s").unwrap());
static ORDERED_ITEM: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]+\.\s").unwrap());
static STEP_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]+\.\s*").unwrap());
static BULLET: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[•\-*+]\s*").unwrap());

/// A run of inline text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "text", rename_all = "lowercase")]
pub enum Span {
    Plain(String),
    Bold(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListKind {
    Ordered,
    Unordered,
}

/// A block-level node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Block {
    Paragraph { spans: Vec<Span> },
    List { list: ListKind, items: Vec<Vec<Span>> },
    Break,
}

/// Split text on `**`; odd-indexed pieces are bold. Empty pieces are dropped.
pub fn parse_inline(text: &str) -> Vec<Span> {
    text.split("**")
        .enumerate()
        .filter(|(_, part)| !part.is_empty())
        .map(|(i, part)| {
            if i % 2 == 1 {
                Span::Bold(part.to_string())
            } else {
                Span::Plain(part.to_string())
            }
        })
        .collect()
}

/// Render a block of model prose.
///
/// Consecutive list lines of one kind form a single list; a change of kind,
/// a paragraph, or a blank line closes it. A blank line also emits a break
/// once something has been rendered.
pub fn render_blocks(text: &str) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut open: Option<(ListKind, Vec<Vec<Span>>)> = None;

    fn flush(blocks: &mut Vec<Block>, open: &mut Option<(ListKind, Vec<Vec<Span>>)>) {
        if let Some((list, items)) = open.take() {
            if !items.is_empty() {
                blocks.push(Block::List { list, items });
            }
        }
    }

    for line in text.lines() {
        let line = line.trim();

        let item = if let Some(m) = UNORDERED_ITEM.find(line) {
            Some((ListKind::Unordered, &line[m.end()..]))
        } else {
            ORDERED_ITEM
                .find(line)
                .map(|m| (ListKind::Ordered, &line[m.end()..]))
        };

        match item {
            Some((kind, content)) => {
                if open.as_ref().map(|(k, _)| *k) != Some(kind) {
                    flush(&mut blocks, &mut open);
                    open = Some((kind, Vec::new()));
                }
                if let Some((_, items)) = open.as_mut() {
                    items.push(parse_inline(content));
                }
            }
            None if !line.is_empty() => {
                flush(&mut blocks, &mut open);
                blocks.push(Block::Paragraph {
                    spans: parse_inline(line),
                });
            }
            None => {
                // checked before flushing, so a leading list still counts as empty
                if !blocks.is_empty() {
                    flush(&mut blocks, &mut open);
                    blocks.push(Block::Break);
                }
            }
        }
    }

    flush(&mut blocks, &mut open);
    blocks
}

/// Instruction text without its leading `N.` marker.
pub fn display_instruction(line: &str) -> &str {
    strip(&STEP_NUMBER, line)
}

/// Ingredient text without its bullet glyph or leading `N.` marker.
pub fn display_ingredient(line: &str) -> &str {
    strip(&STEP_NUMBER, strip(&BULLET, line))
}

fn strip<'a>(pattern: &Regex, line: &'a str) -> &'a str {
    pattern.find(line).map_or(line, |m| &line[m.end()..])
}

impl ParsedRecipe {
    /// Instructions as displayed, step numbers removed.
    pub fn instruction_steps(&self) -> Vec<&str> {
        self.instructions
            .iter()
            .map(|s| display_instruction(s))
            .collect()
    }

    /// Ingredients as displayed, bullets removed.
    pub fn ingredient_items(&self) -> Vec<&str> {
        self.ingredients
            .iter()
            .map(|s| display_ingredient(s))
            .collect()
    }
}
