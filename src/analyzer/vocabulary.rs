//! Fixed vocabularies used by the complexity analyzer
//!
//! All terms are lowercase and matched as substrings of the normalized query,
//! so multi-word phrases and hyphenated forms are listed explicitly.

/// Domain terms (trading and markets). Backs both the technical-term count
/// and the domain-indicator count.
pub const DOMAIN_TERMS: &[&str] = &[
    "portfolio",
    "volatility",
    "implied volatility",
    "derivative",
    "options chain",
    "hedging",
    "arbitrage",
    "liquidity",
    "market maker",
    "order book",
    "bid-ask",
    "leverage",
    "futures",
    "forex",
    "equity",
    "equities",
    "bond yield",
    "dividend",
    "earnings",
    "valuation",
    "moving average",
    "candlestick",
    "support and resistance",
    "stop loss",
    "stop-loss",
    "risk management",
    "position sizing",
    "backtest",
    "sharpe ratio",
    "drawdown",
    "momentum",
    "mean reversion",
    "technical analysis",
    "fundamental analysis",
    "market cap",
    "short selling",
    "margin call",
    "macroeconomic",
    "interest rate",
    "inflation",
    "cryptocurrency",
    "algorithmic trading",
    "high-frequency",
    "market microstructure",
    "asset allocation",
];

/// Research-intensity terms. Any match classifies the query as research.
pub const RESEARCH_TERMS: &[&str] = &[
    "comprehensive",
    "in-depth",
    "in depth",
    "thorough",
    "detailed analysis",
    "deep dive",
    "research",
    "systematic review",
    "literature",
    "compare and contrast",
    "exhaustive",
    "extensive",
    "investigate",
    "case study",
    "empirical",
    "historical analysis",
    "meta-analysis",
];

/// Generic complexity terms, independent of domain.
pub const GENERIC_TERMS: &[&str] = &[
    "analyze",
    "analysis",
    "explain",
    "compare",
    "evaluate",
    "assess",
    "difference between",
    "relationship",
    "impact",
    "implications",
    "strategy",
    "pros and cons",
    "advantages",
    "disadvantages",
    "trade-off",
    "step by step",
    "optimize",
    "predict",
    "forecast",
    "correlation",
];

/// Interrogative words, matched as whole space-delimited words.
pub const QUESTION_WORDS: &[&str] = &[
    "what", "why", "how", "when", "where", "which", "who", "whom", "whose",
];

/// Number of `terms` occurring in `text`, each term counted at most once.
pub fn count_matches(text: &str, terms: &[&str]) -> usize {
    terms.iter().filter(|term| text.contains(*term)).count()
}

/// Number of question words that appear surrounded by spaces.
///
/// A question word at the very start or end of `text` has no space on one
/// side and does not count.
pub fn count_question_words(text: &str) -> usize {
    QUESTION_WORDS
        .iter()
        .filter(|word| text.contains(&format!(" {} ", word)))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vocabularies_are_lowercase() {
        for term in DOMAIN_TERMS
            .iter()
            .chain(RESEARCH_TERMS)
            .chain(GENERIC_TERMS)
            .chain(QUESTION_WORDS)
        {
            assert_eq!(*term, term.to_lowercase(), "term not lowercase: {}", term);
        }
    }

    #[test]
    fn test_count_matches_counts_each_term_once() {
        let text = "hedging and more hedging with leverage";
        assert_eq!(count_matches(text, DOMAIN_TERMS), 2);
    }

    #[test]
    fn test_count_question_words_boundaries() {
        // Leading and trailing words lack a surrounding space
        assert_eq!(count_question_words("what is trading?"), 0);
        assert_eq!(count_question_words("why and how"), 0);
        assert_eq!(count_question_words("tell me why and how it works"), 2);
        // "somewhat" and "showhow" are not standalone question words
        assert_eq!(count_question_words("somewhat showhow"), 0);
        assert_eq!(count_question_words(""), 0);
    }
}
