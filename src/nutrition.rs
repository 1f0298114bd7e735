//! Nutrition extraction
//!
//! Two sources of nutrition data exist: the free-text nutrition section of a
//! recipe reply, and the JSON summary a nutrition-analysis generation returns.
//! Both are handled here without ever failing.

use crate::schema::NutritionInfo;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

static DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9]+").unwrap());

static LEADING_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(-?[0-9]+(?:\.[0-9]+)?)").unwrap());

/// Lines at or below this length never count as highlight prose.
const HIGHLIGHT_MIN_CHARS: usize = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Nutrient {
    Calories,
    Protein,
    Carbs,
    Fat,
    Fiber,
    Sugar,
    Sodium,
}

/// Keyword priority: the first nutrient whose keyword appears in a line owns it.
const NUTRIENT_KEYWORDS: &[(Nutrient, &[&str])] = &[
    (Nutrient::Calories, &["calor", "kcal"]),
    (Nutrient::Protein, &["protein"]),
    (Nutrient::Carbs, &["carb"]),
    (Nutrient::Fat, &["fat"]),
    (Nutrient::Fiber, &["fiber", "fibre"]),
    (Nutrient::Sugar, &["sugar"]),
    (Nutrient::Sodium, &["sodium"]),
];

impl NutritionInfo {
    fn slot(&mut self, nutrient: Nutrient) -> &mut Option<u32> {
        match nutrient {
            Nutrient::Calories => &mut self.calories,
            Nutrient::Protein => &mut self.protein,
            Nutrient::Carbs => &mut self.carbs,
            Nutrient::Fat => &mut self.fat,
            Nutrient::Fiber => &mut self.fiber,
            Nutrient::Sugar => &mut self.sugar,
            Nutrient::Sodium => &mut self.sodium,
        }
    }

    fn push_highlight(&mut self, line: &str) {
        match &mut self.highlights {
            Some(existing) => {
                existing.push(' ');
                existing.push_str(line);
            }
            None => self.highlights = Some(line.to_string()),
        }
    }
}

/// Fold one trimmed, non-blank nutrition-section line into `info`.
///
/// A nutrient keyword claims the line only if a digit run follows it (after
/// the first colon when the line has one). Otherwise colon-free, digit-free
/// prose longer than 15 characters is appended to the highlights.
pub fn apply_nutrition_line(info: &mut NutritionInfo, line: &str) {
    let lower = line.to_lowercase();
    let value_region = line.split_once(':').map_or(line, |(_, rest)| rest);

    let nutrient = NUTRIENT_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| lower.contains(k)))
        .map(|&(nutrient, _)| nutrient);

    if let Some(nutrient) = nutrient {
        if let Some(value) = first_number(value_region) {
            tracing::trace!(?nutrient, value, "nutrition value");
            *info.slot(nutrient) = Some(value);
            return;
        }
    }

    if !line.contains(':')
        && !DIGITS.is_match(line)
        && line.chars().count() > HIGHLIGHT_MIN_CHARS
    {
        info.push_highlight(line);
    }
}

fn first_number(s: &str) -> Option<u32> {
    DIGITS.find(s).and_then(|m| m.as_str().parse().ok())
}

/// Leading count of a free-text servings value ("4-6 people" is 4).
pub fn servings_count(servings: &str) -> Option<u32> {
    first_number(servings).filter(|&n| n > 0)
}

/// Nutrition summary produced by a nutrition-analysis generation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NutritionReport {
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_nutrition: NutritionTotals,

    #[serde(default, deserialize_with = "null_as_default")]
    pub ingredients: Vec<IngredientNutrition>,

    /// The model reply, kept when no usable JSON was found
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub raw_response: Option<String>,

    /// Decoder message when the JSON block did not decode
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub parse_error: Option<String>,
}

/// Whole-recipe totals
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NutritionTotals {
    #[serde(deserialize_with = "lenient_number")]
    pub calories: f64,
    #[serde(deserialize_with = "lenient_number")]
    pub protein: f64,
    #[serde(deserialize_with = "lenient_number")]
    pub carbs: f64,
    #[serde(deserialize_with = "lenient_number")]
    pub fat: f64,
    #[serde(deserialize_with = "lenient_number")]
    pub fiber: f64,
    #[serde(deserialize_with = "lenient_number")]
    pub sugar: f64,
    #[serde(deserialize_with = "lenient_number")]
    pub sodium: f64,
}

/// Per-ingredient breakdown
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngredientNutrition {
    #[serde(deserialize_with = "lenient_text")]
    pub name: String,
    #[serde(deserialize_with = "lenient_text")]
    pub amount: String,
    #[serde(deserialize_with = "lenient_number")]
    pub calories: f64,
    #[serde(deserialize_with = "lenient_number")]
    pub protein: f64,
    #[serde(deserialize_with = "lenient_number")]
    pub carbs: f64,
    #[serde(deserialize_with = "lenient_number")]
    pub fat: f64,
}

/// A nutrient amount as models write it: a number, a string such as `"12g"`,
/// or `null`. Anything without a leading number counts as zero.
fn lenient_number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match &value {
        Value::Number(n) => n.as_f64().unwrap_or_default(),
        Value::String(s) => LEADING_NUMBER
            .captures(s)
            .and_then(|c| c[1].parse().ok())
            .unwrap_or_default(),
        _ => 0.0,
    })
}

fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Null => String::new(),
        Value::String(s) => s,
        other => other.to_string(),
    })
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl NutritionTotals {
    /// Divide the totals across `servings` portions.
    ///
    /// Calories and sodium are whole numbers, the rest keep one decimal.
    pub fn per_serving(&self, servings: u32) -> NutritionTotals {
        let n = f64::from(servings.max(1));
        NutritionTotals {
            calories: (self.calories / n).round(),
            protein: round_tenth(self.protein / n),
            carbs: round_tenth(self.carbs / n),
            fat: round_tenth(self.fat / n),
            fiber: round_tenth(self.fiber / n),
            sugar: round_tenth(self.sugar / n),
            sodium: (self.sodium / n).round(),
        }
    }
}

fn round_tenth(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

/// Pull the JSON summary out of a nutrition-analysis reply.
///
/// The span from the first `{` to the last `}` is decoded. Replies without
/// such a span, or whose span does not decode, yield zero totals with the
/// raw reply attached.
pub fn extract_nutrition_report(text: &str) -> NutritionReport {
    let span = match (text.find('{'), text.rfind('}')) {
        (Some(open), Some(close)) if open < close => &text[open..=close],
        _ => {
            tracing::debug!("no JSON object in nutrition reply");
            return NutritionReport {
                raw_response: Some(text.to_string()),
                ..Default::default()
            };
        }
    };

    match serde_json::from_str::<NutritionReport>(span) {
        Ok(report) => report,
        Err(e) => {
            tracing::warn!(error = %e, "nutrition reply JSON did not decode");
            NutritionReport {
                raw_response: Some(text.to_string()),
                parse_error: Some(e.to_string()),
                ..Default::default()
            }
        }
    }
}
