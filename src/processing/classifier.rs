//! Rule-based category detection for catalog rows

use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse audience category assigned to every catalog row at load time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Farmer,
    Student,
    Senior,
    Health,
    General,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Farmer,
        Category::Student,
        Category::Senior,
        Category::Health,
        Category::General,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Farmer => "farmer",
            Category::Student => "student",
            Category::Senior => "senior",
            Category::Health => "health",
            Category::General => "general",
        }
    }

    /// Exact label lookup used for occupations in the hybrid path.
    /// `general` is not an occupation, so it never maps.
    pub fn from_occupation(occupation: &str) -> Option<Category> {
        match occupation.trim().to_lowercase().as_str() {
            "farmer" => Some(Category::Farmer),
            "student" => Some(Category::Student),
            "senior" => Some(Category::Senior),
            "health" => Some(Category::Health),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered rule list; the first rule with any keyword present wins.
const RULES: &[(Category, &[&str])] = &[
    (Category::Farmer, &["kisan", "farmer", "crop", "agriculture"]),
    (Category::Student, &["student", "education", "scholar", "vidya"]),
    (Category::Senior, &["pension", "senior", "old age"]),
    (Category::Health, &["health", "insurance", "medical"]),
];

/// Classify text into exactly one category (case-insensitive)
pub fn classify(text: &str) -> Category {
    let text = text.to_lowercase();
    RULES
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|kw| text.contains(kw)))
        .map(|(category, _)| *category)
        .unwrap_or(Category::General)
}

/// Whether a row of `row_category` survives the hard filter for `target`
pub fn passes_filter(row_category: Category, target: Option<Category>) -> bool {
    match target {
        Some(target) => row_category == target || row_category == Category::General,
        None => true,
    }
}
