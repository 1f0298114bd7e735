//! Recipe document parser
//!
//! Recovers a [`ParsedRecipe`] from the heading-delimited markdown a model
//! writes. Nothing about the layout is guaranteed, so every field degrades
//! to empty rather than failing.

use crate::nutrition::apply_nutrition_line;
use crate::schema::ParsedRecipe;
use crate::sections::{classify_heading, Section};

/// Glyph prepended to ingredient lines that arrive without one.
pub const INGREDIENT_BULLET: &str = "•";

/// Metadata labels checked before the first section, in priority order.
const METADATA_LABELS: &[(MetadataField, &[&str])] = &[
    (MetadataField::PrepTime, &["prep time:", "preparation time:"]),
    (MetadataField::CookTime, &["cook time:", "cooking time:"]),
    (MetadataField::TotalTime, &["total time:"]),
    (MetadataField::Servings, &["serves:", "servings:", "yield:"]),
];

/// Words that keep a preamble line from becoming the description.
const NON_DESCRIPTION_WORDS: &[&str] = &["prep", "cook", "serve"];

#[derive(Debug, Clone, Copy)]
enum MetadataField {
    PrepTime,
    CookTime,
    TotalTime,
    Servings,
}

/// Parse a model-written recipe document.
pub fn parse(document: &str) -> ParsedRecipe {
    let mut recipe = ParsedRecipe::default();
    let mut section = Section::None;

    for line in document.lines() {
        let line = line.trim();

        if let Some(title) = line.strip_prefix("## ") {
            recipe.title = title.trim().to_string();
            section = Section::Title;
        } else if let Some(heading) = line.strip_prefix("### ") {
            section = classify_heading(heading);
            tracing::debug!(heading, ?section, "section heading");
        } else if line.is_empty() || line.starts_with('#') {
            continue;
        } else if section.is_preamble() {
            parse_preamble_line(&mut recipe, line);
        } else {
            parse_section_line(&mut recipe, section, line);
        }
    }

    recipe
}

fn parse_preamble_line(recipe: &mut ParsedRecipe, line: &str) {
    let lower = line.to_lowercase();

    if recipe.description.is_empty()
        && !line.contains(':')
        && !NON_DESCRIPTION_WORDS.iter().any(|w| lower.contains(w))
    {
        recipe.description = line.to_string();
    }

    let field = METADATA_LABELS
        .iter()
        .find(|(_, labels)| labels.iter().any(|l| lower.contains(l)))
        .map(|&(field, _)| field);

    if let Some(field) = field {
        let value = line
            .split_once(':')
            .map(|(_, rest)| rest.trim().to_string())
            .unwrap_or_default();
        let slot = match field {
            MetadataField::PrepTime => &mut recipe.prep_time,
            MetadataField::CookTime => &mut recipe.cook_time,
            MetadataField::TotalTime => &mut recipe.total_time,
            MetadataField::Servings => &mut recipe.servings,
        };
        *slot = value;
    }
}

fn parse_section_line(recipe: &mut ParsedRecipe, section: Section, line: &str) {
    match section {
        Section::Ingredients => recipe.ingredients.push(normalize_ingredient(line)),
        Section::Instructions => recipe.instructions.push(line.to_string()),
        Section::Tips => recipe.tips.push(line.to_string()),
        Section::Variations => recipe.variations.push(line.to_string()),
        Section::SeasonalAdditions => recipe.seasonal_additions.push(line.to_string()),
        Section::Nutrition => {
            let info = recipe.nutrition_info.get_or_insert_with(Default::default);
            apply_nutrition_line(info, line);
        }
        Section::Other | Section::None | Section::Title => {}
    }
}

/// Keep lines that already start with a bullet or numeral, bullet the rest.
fn normalize_ingredient(line: &str) -> String {
    let bulleted = line.starts_with(['-', '*', '+'])
        || line.starts_with(INGREDIENT_BULLET)
        || line.starts_with(|c: char| c.is_ascii_digit());
    if bulleted {
        line.to_string()
    } else {
        format!("{INGREDIENT_BULLET} {line}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::NutritionInfo;

    const BANANA_BREAD: &str = "## Banana Bread\n### Ingredients\n- 2 bananas\n- 1 cup flour\n### Instructions\n1. Mash bananas\n2. Mix with flour\n### Nutrition Information\nCalories: 210\nProtein: 4g\nA hearty, fiber-rich snack perfect any time of day.";

    #[test]
    fn test_banana_bread() {
        let recipe = parse(BANANA_BREAD);
        assert_eq!(recipe.title, "Banana Bread");
        assert_eq!(recipe.ingredients, vec!["- 2 bananas", "- 1 cup flour"]);
        assert_eq!(recipe.instructions, vec!["1. Mash bananas", "2. Mix with flour"]);
        assert_eq!(
            recipe.nutrition_info,
            Some(NutritionInfo {
                calories: Some(210),
                protein: Some(4),
                highlights: Some("A hearty, fiber-rich snack perfect any time of day.".to_string()),
                ..Default::default()
            })
        );
        assert!(recipe.tips.is_empty());
    }

    #[test]
    fn test_no_headings_yields_empty_record() {
        for doc in ["", "\n\n", "just some words\n- a bullet\n1. a step"] {
            let recipe = parse(doc);
            assert_eq!(recipe.title, "");
            assert!(recipe.ingredients.is_empty());
            assert!(recipe.instructions.is_empty());
            assert!(recipe.tips.is_empty());
            assert!(recipe.variations.is_empty());
            assert!(recipe.seasonal_additions.is_empty());
            assert!(recipe.nutrition_info.is_none());
        }
    }

    #[test]
    fn test_preamble_metadata_and_description() {
        let doc = "## Weeknight Chili\n\
                   A smoky, slow-simmered chili for cold nights.\n\
                   Prep Time: 15 minutes\n\
                   Cook Time: 1:30 hours\n\
                   Total Time: 1 hour 45 minutes\n\
                   Serves: 6\n\
                   Another line that should not replace the description\n\
                   ### Ingredients\n\
                   Prep Time: not metadata here";
        let recipe = parse(doc);
        assert_eq!(recipe.description, "A smoky, slow-simmered chili for cold nights.");
        assert_eq!(recipe.prep_time, "15 minutes");
        assert_eq!(recipe.cook_time, "1:30 hours");
        assert_eq!(recipe.total_time, "1 hour 45 minutes");
        assert_eq!(recipe.servings, "6");
        assert_eq!(recipe.ingredients, vec!["• Prep Time: not metadata here"]);
    }

    #[test]
    fn test_description_skips_metadata_like_lines() {
        let recipe = parse("Preparation is easy\nServe with rice\nA bright summer salad");
        assert_eq!(recipe.description, "A bright summer salad");

        let recipe = parse("Yield: 12 cookies\nCrisp edges, chewy middles");
        assert_eq!(recipe.servings, "12 cookies");
        assert_eq!(recipe.description, "Crisp edges, chewy middles");
    }

    #[test]
    fn test_ingredient_normalization() {
        let doc = "### Ingredients\n- flour\n* sugar\n+ butter\n2 eggs\n• milk\nsalt to taste";
        let recipe = parse(doc);
        assert_eq!(
            recipe.ingredients,
            vec!["- flour", "* sugar", "+ butter", "2 eggs", "• milk", "• salt to taste"]
        );
    }

    #[test]
    fn test_bullet_normalization_round_trips() {
        let first = parse("### Ingredients\nflour\n- sugar\n3 eggs\n### Instructions\n1. Mix\nBake");
        let rebuilt = format!(
            "### Ingredients\n{}\n### Instructions\n{}",
            first.ingredients.join("\n"),
            first.instructions.join("\n")
        );
        let second = parse(&rebuilt);
        assert_eq!(second.ingredients, first.ingredients);
        assert_eq!(second.instructions, first.instructions);
    }

    #[test]
    fn test_all_sections() {
        let doc = "## Unified Pancake Recipe\n\
                   ### Seasonal Context:\n\
                   Autumn apples are at their best.\n\
                   ### Ingredients:\n\
                   - 1 cup flour\n\
                   ### Step-by-Step Directions\n\
                   Whisk everything.\n\
                   ### Variations:\n\
                   - Add blueberries\n\
                   ### Local/Seasonal Additions:\n\
                   - Maple syrup from nearby farms\n\
                   ### Chef's Tips\n\
                   Rest the batter.\n\
                   ### Equipment\n\
                   A skillet";
        let recipe = parse(doc);
        assert_eq!(recipe.title, "Unified Pancake Recipe");
        assert_eq!(
            recipe.seasonal_additions,
            vec!["Autumn apples are at their best.", "- Maple syrup from nearby farms"]
        );
        assert_eq!(recipe.ingredients, vec!["- 1 cup flour"]);
        assert_eq!(recipe.instructions, vec!["Whisk everything."]);
        assert_eq!(recipe.variations, vec!["- Add blueberries"]);
        assert_eq!(recipe.tips, vec!["Rest the batter."]);
        assert_eq!(recipe.description, "");
    }

    #[test]
    fn test_other_headings_are_ignored() {
        let doc = "# Cookbook\n## Toast\n#### Aside\n### Ingredients\n- bread\n##### deeper\n- butter";
        let recipe = parse(doc);
        assert_eq!(recipe.title, "Toast");
        assert_eq!(recipe.ingredients, vec!["- bread", "- butter"]);
    }

    #[test]
    fn test_nutrition_heading_without_content() {
        let recipe = parse("## Tea\n### Nutrition\n\n");
        assert!(recipe.nutrition_info.is_none());

        let recipe = parse("## Tea\n### Nutrition\nSoothing.");
        assert_eq!(recipe.nutrition_info, Some(NutritionInfo::default()));
    }

    #[test]
    fn test_later_title_resets_to_preamble() {
        let recipe = parse("## First\n### Tips\nkeep\n## Second\nServes: 2\n- not a tip");
        assert_eq!(recipe.title, "Second");
        assert_eq!(recipe.tips, vec!["keep"]);
        assert_eq!(recipe.servings, "2");
        assert_eq!(recipe.description, "- not a tip");
    }
}
