//! Keyword tables and multi-pattern presence counting

use aho_corasick::AhoCorasick;
use log::warn;

/// Occupation → scheme keyword table, checked in order; first match wins.
/// `unemployed` sits before `employed` because it contains it.
const OCCUPATION_KEYWORDS: &[(&[&str], &[&str])] = &[
    (
        &["student", "graduating"],
        &["scholarship", "education", "student", "learning", "skill", "training"],
    ),
    (
        &["unemployed"],
        &["employment", "loan", "skill", "pension", "livelihood", "guarantee"],
    ),
    (
        &["employed"],
        &["housing", "insurance", "pension", "tech", "finance"],
    ),
    (
        &["farmer", "agriculture"],
        &["farmer", "agriculture", "kisan", "crop", "loan", "irrigation", "rural"],
    ),
    (
        &["business"],
        &["business", "loan", "msme", "startup", "credit", "entrepreneur"],
    ),
    (&["retired"], &["pension", "senior", "health", "security"]),
];

/// Used when the occupation matches no row of the table
pub const GENERIC_KEYWORDS: &[&str] = &["citizen", "welfare", "scheme", "financial", "support"];

/// Extra job keywords for students and freshers
pub const STUDENT_JOB_KEYWORDS: &[&str] = &["internship", "fresher", "entry", "scholarship", "training"];

/// Entry-level markers that trigger the fresher boost on job rows
pub const FRESHER_MARKERS: &[&str] = &["fresher", "intern", "entry", "training"];

/// Well-known portals that get a small tie-break boost
pub const MAJOR_PORTALS: &[&str] = &["naukri", "indeed", "linkedin", "monster", "glassdoor", "shine"];

/// Map a free-text occupation to its scheme keyword set
pub fn occupation_keywords(occupation: &str) -> &'static [&'static str] {
    let occupation = occupation.to_lowercase();
    OCCUPATION_KEYWORDS
        .iter()
        .find(|(triggers, _)| triggers.iter().any(|t| occupation.contains(t)))
        .map(|(_, keywords)| *keywords)
        .unwrap_or(GENERIC_KEYWORDS)
}

/// Whether the occupation marks a student or fresher
pub fn is_student(occupation: &str) -> bool {
    let occupation = occupation.to_lowercase();
    ["student", "graduating", "fresher"]
        .iter()
        .any(|t| occupation.contains(t))
}

/// A multiset of keywords matched by substring presence.
///
/// Each keyword counts once per occurrence in the input list (not per
/// occurrence in the text), so a keyword supplied twice contributes twice.
#[derive(Debug, Clone)]
pub struct KeywordSet {
    patterns: Vec<String>,
    multiplicity: Vec<usize>,
    matcher: Option<AhoCorasick>,
}

impl KeywordSet {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut patterns: Vec<String> = Vec::new();
        let mut multiplicity: Vec<usize> = Vec::new();

        for keyword in keywords {
            let keyword = keyword.as_ref().trim().to_lowercase();
            if keyword.is_empty() {
                continue;
            }
            match patterns.iter().position(|p| *p == keyword) {
                Some(i) => multiplicity[i] += 1,
                None => {
                    patterns.push(keyword);
                    multiplicity.push(1);
                }
            }
        }

        let matcher = if patterns.is_empty() {
            None
        } else {
            match AhoCorasick::new(&patterns) {
                Ok(matcher) => Some(matcher),
                Err(e) => {
                    warn!("Keyword automaton unavailable, using plain search: {}", e);
                    None
                }
            }
        };

        Self {
            patterns,
            multiplicity,
            matcher,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn len(&self) -> usize {
        self.multiplicity.iter().sum()
    }

    /// Flags for which distinct patterns occur anywhere in `text`
    fn presence(&self, text: &str) -> Vec<bool> {
        let mut present = vec![false; self.patterns.len()];
        match &self.matcher {
            Some(matcher) => {
                for mat in matcher.find_overlapping_iter(text) {
                    present[mat.pattern().as_usize()] = true;
                }
            }
            None => {
                for (i, pattern) in self.patterns.iter().enumerate() {
                    present[i] = text.contains(pattern.as_str());
                }
            }
        }
        present
    }

    /// Number of listed keywords present in `text` (with list multiplicity)
    pub fn count_present(&self, text: &str) -> usize {
        if self.patterns.is_empty() {
            return 0;
        }
        self.presence(text)
            .into_iter()
            .zip(&self.multiplicity)
            .filter(|(present, _)| *present)
            .map(|(_, n)| *n)
            .sum()
    }

    pub fn any_present(&self, text: &str) -> bool {
        self.count_present(text) > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_occupation_table_order() {
        assert_eq!(occupation_keywords("Unemployed youth")[0], "employment");
        assert_eq!(occupation_keywords("salaried employed")[0], "housing");
        assert_eq!(occupation_keywords("Farmer")[2], "kisan");
        assert_eq!(occupation_keywords("small business owner")[2], "msme");
        assert_eq!(occupation_keywords("astronaut"), GENERIC_KEYWORDS);
    }

    #[test]
    fn test_student_detection() {
        assert!(is_student("Final-year Student"));
        assert!(is_student("fresher"));
        assert!(!is_student("farmer"));
    }

    #[test]
    fn test_count_present_uses_substring_semantics() {
        let set = KeywordSet::new(["loan", "crop", "irrigation"]);
        assert_eq!(set.count_present("kisan credit loan for crops"), 2);
        // occurrences in text do not multiply
        assert_eq!(set.count_present("loan loan loan"), 1);
    }

    #[test]
    fn test_overlapping_keywords_are_all_found() {
        let set = KeywordSet::new(["intern", "internship"]);
        assert_eq!(set.count_present("summer internship"), 2);
    }

    #[test]
    fn test_duplicate_keywords_count_twice() {
        let set = KeywordSet::new(["python", "Python ", ""]);
        assert_eq!(set.len(), 2);
        assert_eq!(set.count_present("python developer"), 2);
    }

    #[test]
    fn test_empty_set() {
        let set = KeywordSet::new(Vec::<String>::new());
        assert!(set.is_empty());
        assert_eq!(set.count_present("anything"), 0);
        assert!(!set.any_present("anything"));
    }
}
