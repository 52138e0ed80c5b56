//! Integration tests for query complexity analysis
//!
//! These tests cover:
//! - Determinism of the analysis
//! - Monotonicity of the level in query length
//! - The reference scenarios
//! - Recommendations drawn from configured tier tables

use query_tier::{analyze, ComplexityAnalyzer, ComplexityLevel, QueryAnalysis, Settings};

#[test]
fn test_analysis_is_deterministic() {
    let queries = [
        "What is trading?",
        "Compare momentum and mean reversion strategies for futures. Which works better in volatile markets?",
        "",
        "Provide a comprehensive, in-depth, thorough analysis of market conditions",
    ];

    for query in queries {
        let first = analyze(query);
        let second = analyze(query);
        assert_eq!(first, second, "analysis differs for {:?}", query);
    }
}

#[test]
fn test_level_never_decreases_as_words_are_added() {
    let mut previous = ComplexityLevel::Simple;
    let mut previous_score = 0.0;

    for n in 1..=40 {
        let query = vec!["word"; n].join(" ");
        let analysis = analyze(&query);

        assert_eq!(analysis.word_count, n);
        assert!(
            analysis.complexity_level >= previous,
            "{} words classified {} after {}",
            n,
            analysis.complexity_level,
            previous
        );
        assert!(analysis.complexity_score >= previous_score);

        previous = analysis.complexity_level;
        previous_score = analysis.complexity_score;
    }

    assert_eq!(previous, ComplexityLevel::Research);
}

#[test]
fn test_simple_scenario() {
    let analysis = analyze("What is trading?");

    assert_eq!(analysis.word_count, 3);
    assert_eq!(analysis.complexity_level, ComplexityLevel::Simple);
    assert_eq!(analysis.recommended_model, "gpt-4o-mini");

    let params = analysis.recommended_retrieval_params;
    assert_eq!(
        (params.vector_top_k, params.keyword_top_k, params.final_top_k),
        (10, 10, 3)
    );
}

#[test]
fn test_research_scenario() {
    let analysis =
        analyze("Provide a comprehensive, in-depth, thorough analysis of market conditions");

    assert!(analysis.research_indicator_count >= 2);
    assert_eq!(analysis.complexity_level, ComplexityLevel::Research);
    assert_eq!(analysis.recommended_model, "gpt-4o");
    assert_eq!(analysis.recommended_retrieval_params.final_top_k, 12);
}

#[test]
fn test_case_and_whitespace_do_not_matter() {
    let a = analyze("  WHAT IS LEVERAGE?  ");
    let b = analyze("what is leverage?");
    assert_eq!(a, b);
}

#[test]
fn test_score_bounds() {
    let queries = [
        "hi",
        "what? why? how? when? where? which? who? whom? whose?",
        "comprehensive in-depth thorough exhaustive extensive research analysis of portfolio \
         volatility hedging arbitrage liquidity leverage futures forex dividend earnings",
    ];

    for query in queries {
        let score = analyze(query).complexity_score;
        assert!((0.0..=1.0).contains(&score), "score {} out of range", score);
    }
}

#[test]
fn test_recommendations_follow_settings_profiles() {
    let settings = Settings::from_lookup(|name| match name {
        "QUERY_MODEL_SIMPLE" => Some("small-model".to_string()),
        "QUERY_MODEL_RESEARCH" => Some("large-model".to_string()),
        _ => None,
    })
    .unwrap();
    let analyzer = ComplexityAnalyzer::new(settings.profiles);

    assert_eq!(analyzer.analyze("What is trading?").recommended_model, "small-model");
    assert_eq!(
        analyzer
            .analyze("Provide a comprehensive, in-depth, thorough analysis of market conditions")
            .recommended_model,
        "large-model"
    );
    assert_eq!(
        analyzer.analyze("tell me about the stock market").recommended_model,
        "gpt-4o-mini"
    );
}

#[test]
fn test_analysis_serializes_with_lowercase_level() {
    let analysis = analyze("What is trading?");
    let json = serde_json::to_value(&analysis).unwrap();

    assert_eq!(json["complexity_level"], "simple");
    assert_eq!(json["recommended_retrieval_params"]["final_top_k"], 3);

    let parsed: QueryAnalysis = serde_json::from_value(json).unwrap();
    assert_eq!(parsed, analysis);
}
