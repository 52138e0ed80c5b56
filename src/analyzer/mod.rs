//! # Query Complexity Analyzer
//!
//! Scores a natural-language query on six bounded signals (length, domain
//! terms, questions, domain indicators, research intensity, generic
//! complexity), classifies it into one of four ordered tiers and maps the
//! tier to a model and retrieval recommendation.
//!
//! The analyzer is a pure function of its input and fixed vocabularies: no
//! I/O, no failure modes. Empty input classifies as [`ComplexityLevel::Simple`].
//!
//! ```rust
//! use query_tier::analyzer::{analyze, ComplexityLevel};
//!
//! let analysis = analyze("What is trading?");
//! assert_eq!(analysis.complexity_level, ComplexityLevel::Simple);
//! assert_eq!(analysis.recommended_retrieval_params.final_top_k, 3);
//! ```

pub mod profile;
pub mod vocabulary;

pub use profile::{RetrievalParams, TierProfile, TierProfiles};

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;
use vocabulary::{count_matches, count_question_words, DOMAIN_TERMS, GENERIC_TERMS, RESEARCH_TERMS};

/// Complexity tiers, ordered from cheapest to most expensive
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComplexityLevel {
    /// Short factual lookups
    Simple,
    /// General questions with some context
    Medium,
    /// Multi-part or domain-heavy questions
    Complex,
    /// Requests for in-depth, research-style answers
    Research,
}

impl ComplexityLevel {
    /// All levels in ascending order
    pub const ALL: [ComplexityLevel; 4] = [
        ComplexityLevel::Simple,
        ComplexityLevel::Medium,
        ComplexityLevel::Complex,
        ComplexityLevel::Research,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ComplexityLevel::Simple => "simple",
            ComplexityLevel::Medium => "medium",
            ComplexityLevel::Complex => "complex",
            ComplexityLevel::Research => "research",
        }
    }
}

impl fmt::Display for ComplexityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of analyzing one query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryAnalysis {
    /// Combined score in [0.0, 1.0]
    pub complexity_score: f64,
    pub complexity_level: ComplexityLevel,
    pub word_count: usize,
    pub technical_term_count: usize,
    pub question_count: usize,
    pub has_multiple_questions: bool,
    pub domain_indicator_count: usize,
    pub research_indicator_count: usize,
    pub generic_indicator_count: usize,
    pub recommended_model: String,
    pub recommended_retrieval_params: RetrievalParams,
}

/// Heuristic complexity analyzer backed by a tier table
#[derive(Debug, Clone, Default)]
pub struct ComplexityAnalyzer {
    profiles: TierProfiles,
}

impl ComplexityAnalyzer {
    /// Create an analyzer with a custom tier table
    pub fn new(profiles: TierProfiles) -> Self {
        Self { profiles }
    }

    /// The tier table used for recommendations
    pub fn profiles(&self) -> &TierProfiles {
        &self.profiles
    }

    /// Analyze a query and recommend a configuration for it
    pub fn analyze(&self, query: &str) -> QueryAnalysis {
        let normalized = query.trim().to_lowercase();

        let word_count = normalized.split_whitespace().count();
        let technical_term_count = count_matches(&normalized, DOMAIN_TERMS);

        let question_marks = normalized.matches('?').count();
        let question_count = question_marks.max(count_question_words(&normalized));
        let has_multiple_questions = question_count > 1;

        let domain_indicator_count = count_matches(&normalized, DOMAIN_TERMS);
        let research_indicator_count = count_matches(&normalized, RESEARCH_TERMS);
        let generic_indicator_count = count_matches(&normalized, GENERIC_TERMS);

        let word_score = (word_count as f64 / 50.0).min(0.30);
        let technical_score = (technical_term_count as f64 / 10.0).min(0.20);
        // Only questions beyond the first add to the score
        let extra_questions = question_count.saturating_sub(1);
        let mut question_score = (extra_questions as f64 / 5.0).min(0.20);
        if has_multiple_questions {
            question_score += 0.10;
        }
        let domain_score = (domain_indicator_count as f64 / 15.0).min(0.10);
        let research_score = (research_indicator_count as f64 / 5.0).min(0.20);
        let generic_score = (generic_indicator_count as f64 / 10.0).min(0.10);

        let complexity_score = (word_score
            + technical_score
            + question_score
            + domain_score
            + research_score
            + generic_score)
            .min(1.0);

        let complexity_level = classify(complexity_score, word_count, research_indicator_count);
        let profile = self.profiles.for_level(complexity_level);

        debug!(
            "Analyzed query ({} words): score={:.3}, level={}",
            word_count, complexity_score, complexity_level
        );

        QueryAnalysis {
            complexity_score,
            complexity_level,
            word_count,
            technical_term_count,
            question_count,
            has_multiple_questions,
            domain_indicator_count,
            research_indicator_count,
            generic_indicator_count,
            recommended_model: profile.model.clone(),
            recommended_retrieval_params: profile.retrieval,
        }
    }
}

/// Analyze a query with the default tier table
pub fn analyze(query: &str) -> QueryAnalysis {
    ComplexityAnalyzer::default().analyze(query)
}

/// Ordered, first-match-wins classification.
///
/// The `research_indicators > 0` clauses in the complex and medium arms can
/// never fire because the research arm already claims them. They are kept
/// as-is.
pub(crate) fn classify(score: f64, word_count: usize, research_indicators: usize) -> ComplexityLevel {
    if research_indicators > 0 || word_count > 30 || score > 0.7 {
        ComplexityLevel::Research
    } else if score > 0.5 || word_count > 15 || research_indicators > 0 {
        ComplexityLevel::Complex
    } else if score > 0.2 || word_count > 5 || research_indicators > 0 {
        ComplexityLevel::Medium
    } else {
        ComplexityLevel::Simple
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_question() {
        let analysis = analyze("What is trading?");
        assert_eq!(analysis.word_count, 3);
        assert_eq!(analysis.question_count, 1);
        assert!(!analysis.has_multiple_questions);
        assert_eq!(analysis.complexity_level, ComplexityLevel::Simple);
        assert_eq!(analysis.recommended_retrieval_params, RetrievalParams::new(10, 10, 3));
        assert_eq!(analysis.recommended_model, "gpt-4o-mini");
    }

    #[test]
    fn test_research_indicators_force_research() {
        let analysis =
            analyze("Provide a comprehensive, in-depth, thorough analysis of market conditions");
        assert!(analysis.research_indicator_count >= 2);
        assert_eq!(analysis.complexity_level, ComplexityLevel::Research);
        assert_eq!(analysis.recommended_retrieval_params.vector_top_k, 50);
    }

    #[test]
    fn test_empty_query_is_simple() {
        for query in ["", "   ", "\n\t"] {
            let analysis = analyze(query);
            assert_eq!(analysis.word_count, 0);
            assert_eq!(analysis.complexity_score, 0.0);
            assert_eq!(analysis.complexity_level, ComplexityLevel::Simple);
        }
    }

    #[test]
    fn test_multiple_questions() {
        let analysis = analyze("What is leverage? Why does it matter? How is it used?");
        assert_eq!(analysis.question_count, 3);
        assert!(analysis.has_multiple_questions);
        // 11 words (0.22) + leverage (0.1 + 0.0667) + questions (0.2 + 0.1)
        assert!(analysis.complexity_score > 0.5);
        assert_eq!(analysis.complexity_level, ComplexityLevel::Complex);
    }

    #[test]
    fn test_edge_question_words_are_not_counted() {
        let analysis = analyze("why and how");
        assert_eq!(analysis.question_count, 0);
        assert!(!analysis.has_multiple_questions);
        assert_eq!(analysis.complexity_level, ComplexityLevel::Simple);

        // Inner question words still count
        let analysis = analyze("tell me why and how");
        assert_eq!(analysis.question_count, 1);
    }

    #[test]
    fn test_word_count_thresholds() {
        let six_words = "tell me about the stock market";
        assert_eq!(analyze(six_words).complexity_level, ComplexityLevel::Medium);

        let sixteen_words = "one two three four five six seven eight nine ten eleven twelve thirteen fourteen fifteen sixteen";
        assert_eq!(analyze(sixteen_words).complexity_level, ComplexityLevel::Complex);

        let thirty_one_words = vec!["word"; 31].join(" ");
        assert_eq!(analyze(&thirty_one_words).complexity_level, ComplexityLevel::Research);
    }

    #[test]
    fn test_score_is_clamped() {
        let mut query = String::from("comprehensive in-depth thorough research exhaustive ");
        query.push_str("portfolio volatility hedging arbitrage liquidity leverage futures forex ");
        query.push_str("dividend earnings valuation momentum drawdown backtest inflation ");
        query.push_str("analyze explain compare evaluate assess impact strategy predict forecast ");
        query.push_str("what? why? how? when? where? which? ");
        query.push_str(&vec!["filler"; 60].join(" "));

        let analysis = analyze(&query);
        assert!(analysis.complexity_score <= 1.0);
        assert!((analysis.complexity_score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_technical_and_domain_counts_share_vocabulary() {
        let analysis = analyze("how does hedging reduce portfolio volatility");
        assert_eq!(analysis.technical_term_count, 3);
        assert_eq!(analysis.domain_indicator_count, 3);
    }

    #[test]
    fn test_research_clause_in_lower_arms_is_unreachable() {
        // Every input with a research indicator lands in the research arm,
        // whatever its score and length.
        for score in [0.0, 0.3, 0.6] {
            for words in [0, 6, 16] {
                assert_eq!(classify(score, words, 1), ComplexityLevel::Research);
            }
        }
        // Without research indicators the lower arms behave on score and length alone.
        assert_eq!(classify(0.21, 0, 0), ComplexityLevel::Medium);
        assert_eq!(classify(0.51, 0, 0), ComplexityLevel::Complex);
        assert_eq!(classify(0.71, 0, 0), ComplexityLevel::Research);
        assert_eq!(classify(0.2, 5, 0), ComplexityLevel::Simple);
    }

    #[test]
    fn test_custom_profiles() {
        let analyzer = ComplexityAnalyzer::new(
            TierProfiles::default().with_model(ComplexityLevel::Simple, "local-small"),
        );
        assert_eq!(analyzer.analyze("hi").recommended_model, "local-small");
    }

    #[test]
    fn test_level_ordering_and_display() {
        assert!(ComplexityLevel::Simple < ComplexityLevel::Medium);
        assert!(ComplexityLevel::Medium < ComplexityLevel::Complex);
        assert!(ComplexityLevel::Complex < ComplexityLevel::Research);
        assert_eq!(ComplexityLevel::Research.to_string(), "research");
        assert_eq!(
            serde_json::to_string(&ComplexityLevel::Medium).unwrap(),
            "\"medium\""
        );
    }
}
