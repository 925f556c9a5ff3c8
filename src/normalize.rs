//! # Name Normalization Module
//!
//! This module provides the deterministic text utilities the pantry core
//! needs when matching free-text product and ingredient names:
//!
//! ## Features
//!
//! - Canonical-name extraction: strips parentheticals, punctuation and
//!   descriptor words, keeps the trailing head noun and singularizes it
//! - A [`CategoryClassifier`] trait for category guessing, with a
//!   keyword-table fallback implementation that needs no external model
//!
//! Both paths are pure and side-effect free; callers may cache results.

use lazy_static::lazy_static;
use log::trace;
use regex::Regex;

lazy_static! {
    // "(16 oz)", "(pack of 2)" and similar trailing qualifiers
    static ref PARENTHETICAL: Regex =
        Regex::new(r"\([^)]*\)").expect("Parenthetical pattern should be valid");
    // Everything that is not a letter, digit, hyphen or whitespace
    static ref PUNCTUATION: Regex =
        Regex::new(r"[^A-Za-z0-9\-\s]").expect("Punctuation pattern should be valid");
}

// Descriptors that never serve as the head noun of a product name
const DESCRIPTOR_WORDS: &[&str] = &[
    "organic", "fresh", "frozen", "raw", "cooked", "dried", "whole", "sliced", "diced",
    "chopped", "shredded", "grated", "minced", "boneless", "skinless", "unsalted", "salted",
    "sweetened", "unsweetened", "large", "small", "medium", "mini", "jumbo", "extra",
    "premium", "classic", "original", "style", "cut", "pack", "bag", "box",
];

// Plurals that the suffix rules below would mangle
const IRREGULAR_SINGULARS: &[(&str, &str)] = &[
    ("leaves", "leaf"),
    ("loaves", "loaf"),
    ("halves", "half"),
    ("knives", "knife"),
];

/// Reduce a raw product or ingredient name to its canonical form.
///
/// The canonical form is the final non-descriptor word of the name,
/// singularized and lowercased. Deterministic: the same input always
/// yields the same output.
///
/// # Examples
///
/// ```rust
/// use wastenot::normalize::normalize;
///
/// assert_eq!(normalize("Organic Chicken Thighs"), "thigh");
/// assert_eq!(normalize("Baby Spinach (6 oz)"), "spinach");
/// assert_eq!(normalize("Heirloom Tomatoes"), "tomato");
/// ```
pub fn normalize(raw: &str) -> String {
    let stripped = PARENTHETICAL.replace_all(raw, " ");
    let stripped = PUNCTUATION.replace_all(&stripped, " ");
    let lowered = stripped.to_lowercase();

    let tokens: Vec<&str> = lowered
        .split_whitespace()
        .filter(|t| !DESCRIPTOR_WORDS.contains(t))
        .collect();

    let head = match tokens.last() {
        Some(word) => word,
        // Every word was a descriptor; fall back to the last raw token
        None => match lowered.split_whitespace().last() {
            Some(word) => word,
            None => return String::new(),
        },
    };

    let canonical = singularize(head);
    trace!("Normalized '{raw}' -> '{canonical}'");
    canonical
}

/// Singularize a lowercase English word using suffix rules.
///
/// Handles the plural shapes that occur in grocery data (berries, tomatoes,
/// radishes, glasses, thighs) and leaves mass nouns (hummus, swiss,
/// asparagus) alone. Irregular food plurals come from a small lookup table.
pub fn singularize(word: &str) -> String {
    for (plural, singular) in IRREGULAR_SINGULARS {
        if word == *plural {
            return (*singular).to_string();
        }
    }

    if word.len() > 4 && word.ends_with("ies") {
        return format!("{}y", &word[..word.len() - 3]);
    }
    if ["sses", "ches", "shes", "xes", "zes", "oes"]
        .iter()
        .any(|suffix| word.ends_with(suffix))
    {
        return word[..word.len() - 2].to_string();
    }
    if word.ends_with('s')
        && !word.ends_with("ss")
        && !word.ends_with("us")
        && !word.ends_with("is")
        && word.len() > 3
    {
        return word[..word.len() - 1].to_string();
    }
    word.to_string()
}

/// One ranked guess from a category classifier
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryPrediction {
    /// Finer-grained category label
    pub sub_category: String,
    /// Relative confidence in [0, 1]
    pub score: f64,
    /// Top-level category label used for multiplier lookup
    pub main_category: String,
}

/// Category guessing over free-text names.
///
/// The production classifier is an external model; the core only ever
/// consumes the top-ranked results and must keep working when no
/// classifier is available at all (unknown category, default multiplier).
pub trait CategoryClassifier {
    /// Rank likely categories for a name, best first, at most `top_k`
    fn predict_category(&self, name: &str, top_k: usize) -> Vec<CategoryPrediction>;
}

// (main category, sub category, keywords matched against the lowered name)
const CATEGORY_KEYWORDS: &[(&str, &str, &[&str])] = &[
    (
        "Fresh Fruits & Veggies",
        "Vegetables",
        &[
            "spinach", "lettuce", "kale", "carrot", "pepper", "onion", "broccoli", "tomato",
            "cucumber", "squash", "zucchini", "celery",
        ],
    ),
    (
        "Fresh Fruits & Veggies",
        "Fruit",
        &[
            "apple", "banana", "berry", "berries", "orange", "mango", "grape", "lemon", "lime",
            "avocado", "peach",
        ],
    ),
    (
        "Meat, Seafood & Plant-based",
        "Meat",
        &["chicken", "beef", "pork", "turkey", "lamb", "sausage", "bacon", "thigh", "breast"],
    ),
    (
        "Meat, Seafood & Plant-based",
        "Seafood",
        &["salmon", "shrimp", "tuna", "cod", "fish", "scallop"],
    ),
    (
        "Meat, Seafood & Plant-based",
        "Plant-based",
        &["tofu", "tempeh", "seitan"],
    ),
    (
        "Dairy & Eggs",
        "Dairy",
        &["milk", "yogurt", "cream", "butter", "egg", "kefir"],
    ),
    (
        "Cheese",
        "Cheese",
        &["cheese", "cheddar", "mozzarella", "parmesan", "brie", "feta", "gouda"],
    ),
    (
        "Bakery",
        "Bread",
        &["bread", "bagel", "bun", "roll", "tortilla", "croissant", "baguette"],
    ),
    (
        "Dips, Sauces & Dressings",
        "Dips & Sauces",
        &["hummus", "salsa", "dip", "dressing", "pesto", "marinara"],
    ),
    (
        "Snacks & Sweets",
        "Snacks",
        &["chip", "cracker", "chocolate", "candy", "cookie", "pretzel"],
    ),
    (
        "For the Pantry",
        "Staples",
        &["rice", "pasta", "bean", "flour", "sugar", "oil", "broth", "stock", "quinoa", "lentil"],
    ),
    ("From the Freezer", "Frozen", &["frozen"]),
];

/// Fallback classifier backed by a fixed keyword table
#[derive(Debug, Clone, Default)]
pub struct KeywordClassifier;

impl KeywordClassifier {
    /// Create a keyword classifier
    pub fn new() -> Self {
        Self
    }
}

impl CategoryClassifier for KeywordClassifier {
    fn predict_category(&self, name: &str, top_k: usize) -> Vec<CategoryPrediction> {
        let lowered = name.to_lowercase();
        let mut predictions: Vec<CategoryPrediction> = CATEGORY_KEYWORDS
            .iter()
            .filter_map(|(main, sub, keywords)| {
                let hits = keywords.iter().filter(|kw| lowered.contains(*kw)).count();
                if hits == 0 {
                    return None;
                }
                Some(CategoryPrediction {
                    sub_category: (*sub).to_string(),
                    score: hits as f64 / keywords.len() as f64,
                    main_category: (*main).to_string(),
                })
            })
            .collect();
        predictions.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        predictions.truncate(top_k);
        predictions
    }
}
