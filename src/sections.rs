//! Heading keyword table
//!
//! Maps `### ` heading text to the section it opens. Every caller routes
//! headings through [`classify_heading`] so the mapping cannot drift between
//! call sites.

/// Revision of [`SECTION_KEYWORDS`]. Bump when an entry is added, removed or
/// reordered.
pub const SECTION_TABLE_VERSION: u32 = 1;

/// Section a recipe line belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    /// Nothing seen yet
    None,
    /// After a `## ` heading, before any `### ` heading
    Title,
    Ingredients,
    Instructions,
    Tips,
    Variations,
    SeasonalAdditions,
    Nutrition,
    /// A `### ` heading that matched no keyword
    Other,
}

impl Section {
    /// True while no `### ` heading has been seen.
    pub fn is_preamble(self) -> bool {
        matches!(self, Section::None | Section::Title)
    }
}

/// Ordered keyword table. The first keyword contained in the lower-cased
/// heading wins.
pub const SECTION_KEYWORDS: &[(&str, Section)] = &[
    ("ingredient", Section::Ingredients),
    ("instruction", Section::Instructions),
    ("direction", Section::Instructions),
    ("step", Section::Instructions),
    ("tip", Section::Tips),
    ("note", Section::Tips),
    ("chef", Section::Tips),
    ("variation", Section::Variations),
    ("seasonal", Section::SeasonalAdditions),
    ("local", Section::SeasonalAdditions),
    ("nutrition", Section::Nutrition),
];

/// Classify the text of a `### ` heading (without the hashes).
pub fn classify_heading(heading: &str) -> Section {
    let heading = heading.to_lowercase();
    SECTION_KEYWORDS
        .iter()
        .find(|(keyword, _)| heading.contains(keyword))
        .map_or(Section::Other, |&(_, section)| section)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_heading() {
        assert_eq!(classify_heading("Ingredients:"), Section::Ingredients);
        assert_eq!(classify_heading("Step-by-step Directions"), Section::Instructions);
        assert_eq!(classify_heading("Chef's Notes"), Section::Tips);
        assert_eq!(classify_heading("Variations"), Section::Variations);
        assert_eq!(classify_heading("Local/Seasonal Additions"), Section::SeasonalAdditions);
        assert_eq!(classify_heading("Nutrition Information"), Section::Nutrition);
        assert_eq!(classify_heading("Equipment"), Section::Other);
    }

    #[test]
    fn test_table_order_breaks_ties() {
        // "ingredient" precedes "note" in the table
        assert_eq!(classify_heading("Ingredient Notes"), Section::Ingredients);
        // "note" precedes "nutrition"
        assert_eq!(classify_heading("Nutrition Notes"), Section::Tips);
    }

    #[test]
    fn test_preamble() {
        assert!(Section::None.is_preamble());
        assert!(Section::Title.is_preamble());
        assert!(!Section::Other.is_preamble());
    }
}
