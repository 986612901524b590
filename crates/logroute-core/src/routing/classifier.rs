//! Keyword-based request complexity classification

use crate::error::{Result, RouterError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Routing bucket driving provider preference order.
///
/// Declaration order is the tie-break priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoutingCategory {
    Simple,
    Complex,
    Code,
}

impl RoutingCategory {
    pub const ALL: [RoutingCategory; 3] = [Self::Simple, Self::Complex, Self::Code];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Simple => "simple",
            Self::Complex => "complex",
            Self::Code => "code",
        }
    }

    fn keywords(&self) -> &'static [&'static str] {
        match self {
            Self::Simple => SIMPLE_KEYWORDS,
            Self::Complex => COMPLEX_KEYWORDS,
            Self::Code => CODE_KEYWORDS,
        }
    }
}

impl fmt::Display for RoutingCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Retrieval verbs and recency words
const SIMPLE_KEYWORDS: &[&str] = &[
    "show", "list", "find", "get", "count", "total", "status", "latest", "recent", "today",
    "yesterday",
];

/// Analytical verbs
const COMPLEX_KEYWORDS: &[&str] = &[
    "analyze",
    "correlate",
    "predict",
    "recommend",
    "optimize",
    "pattern",
    "anomaly",
    "trend",
    "insight",
    "cause",
    "impact",
    "compare",
    "relationship",
    "dependency",
];

/// Query-language vocabulary
const CODE_KEYWORDS: &[&str] = &[
    "elasticsearch",
    "dsl",
    "query",
    "json",
    "filter",
    "bool",
    "terms",
    "range",
    "match",
];

/// Result of classifying a request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComplexityAnalysis {
    pub category: RoutingCategory,
    pub scores: BTreeMap<RoutingCategory, usize>,
    pub confidence: f64,
}

/// Classify request text into a routing category.
///
/// Each keyword counts at most once, matched as a case-insensitive
/// substring. Ties resolve in [`RoutingCategory`] declaration order.
pub fn classify(text: &str) -> Result<ComplexityAnalysis> {
    let word_count = text.split_whitespace().count();
    if word_count == 0 {
        return Err(RouterError::Classification(
            "request text is empty".to_string(),
        ));
    }

    let lower = text.to_lowercase();
    let scores: BTreeMap<RoutingCategory, usize> = RoutingCategory::ALL
        .iter()
        .map(|category| {
            let hits = category
                .keywords()
                .iter()
                .filter(|keyword| lower.contains(*keyword))
                .count();
            (*category, hits)
        })
        .collect();

    let mut category = RoutingCategory::Simple;
    let mut max_score = 0;
    for candidate in RoutingCategory::ALL {
        let score = scores[&candidate];
        if score > max_score {
            category = candidate;
            max_score = score;
        }
    }

    Ok(ComplexityAnalysis {
        category,
        scores,
        confidence: max_score as f64 / word_count as f64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_simple_retrieval() {
        let analysis = classify("show me the latest logs from today").unwrap();
        assert_eq!(analysis.category, RoutingCategory::Simple);
        assert_eq!(analysis.scores[&RoutingCategory::Simple], 3);
        assert!((analysis.confidence - 3.0 / 7.0).abs() < 1e-9);
    }

    #[test]
    fn test_complex_analysis() {
        let analysis =
            classify("Analyze the trend and correlate anomaly spikes with deploys").unwrap();
        assert_eq!(analysis.category, RoutingCategory::Complex);
        assert_eq!(analysis.scores[&RoutingCategory::Complex], 4);
    }

    #[test]
    fn test_code_vocabulary() {
        let analysis = classify("write a bool query with a range filter").unwrap();
        assert_eq!(analysis.category, RoutingCategory::Code);
        assert_eq!(analysis.scores[&RoutingCategory::Code], 4);
    }

    #[test]
    fn test_repeated_keyword_counts_once() {
        let analysis = classify("show show show").unwrap();
        assert_eq!(analysis.scores[&RoutingCategory::Simple], 1);
    }

    #[test]
    fn test_tie_prefers_simple_then_complex() {
        // one simple ("count"), one complex ("trend"), one code ("json")
        let analysis = classify("count trend json").unwrap();
        assert_eq!(analysis.category, RoutingCategory::Simple);

        let analysis = classify("trend json").unwrap();
        assert_eq!(analysis.category, RoutingCategory::Complex);
    }

    #[test]
    fn test_no_keywords_defaults_to_simple_with_zero_confidence() {
        let analysis = classify("hello there").unwrap();
        assert_eq!(analysis.category, RoutingCategory::Simple);
        assert_eq!(analysis.confidence, 0.0);
    }

    #[test]
    fn test_empty_input_is_rejected() {
        assert!(matches!(classify(""), Err(RouterError::Classification(_))));
        assert!(matches!(classify("   \n\t"), Err(RouterError::Classification(_))));
    }

    proptest! {
        #[test]
        fn prop_classification_is_deterministic(text in "[a-z ]{1,80}") {
            prop_assume!(!text.trim().is_empty());
            let first = classify(&text).unwrap();
            let second = classify(&text).unwrap();
            prop_assert_eq!(first, second);
        }

        #[test]
        fn prop_category_holds_max_score(text in "[a-zA-Z ]{1,120}") {
            prop_assume!(!text.trim().is_empty());
            let analysis = classify(&text).unwrap();
            let max = analysis.scores.values().copied().max().unwrap();
            prop_assert_eq!(analysis.scores[&analysis.category], max);
            prop_assert!(analysis.confidence >= 0.0);
        }
    }
}
