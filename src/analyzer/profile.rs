//! Per-tier processing recommendations

use crate::analyzer::ComplexityLevel;
use serde::{Deserialize, Serialize};

/// Retrieval parameters for the hybrid search stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrievalParams {
    /// Candidates fetched from the vector channel
    pub vector_top_k: usize,

    /// Candidates fetched from the keyword channel
    pub keyword_top_k: usize,

    /// Results kept after fusion
    pub final_top_k: usize,
}

impl RetrievalParams {
    pub const fn new(vector_top_k: usize, keyword_top_k: usize, final_top_k: usize) -> Self {
        Self {
            vector_top_k,
            keyword_top_k,
            final_top_k,
        }
    }
}

/// Model and retrieval recommendation for one complexity tier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierProfile {
    /// Opaque model identifier handed to the generation pipeline
    pub model: String,

    /// Retrieval parameters for this tier
    pub retrieval: RetrievalParams,
}

impl TierProfile {
    pub fn new(model: impl Into<String>, retrieval: RetrievalParams) -> Self {
        Self {
            model: model.into(),
            retrieval,
        }
    }
}

/// Lookup table with exactly one row per complexity level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierProfiles {
    pub simple: TierProfile,
    pub medium: TierProfile,
    pub complex: TierProfile,
    pub research: TierProfile,
}

impl Default for TierProfiles {
    fn default() -> Self {
        Self {
            simple: TierProfile::new("gpt-4o-mini", RetrievalParams::new(10, 10, 3)),
            medium: TierProfile::new("gpt-4o-mini", RetrievalParams::new(20, 20, 5)),
            complex: TierProfile::new("gpt-4o", RetrievalParams::new(30, 30, 8)),
            research: TierProfile::new("gpt-4o", RetrievalParams::new(50, 50, 12)),
        }
    }
}

impl TierProfiles {
    /// Get the profile for a level
    pub fn for_level(&self, level: ComplexityLevel) -> &TierProfile {
        match level {
            ComplexityLevel::Simple => &self.simple,
            ComplexityLevel::Medium => &self.medium,
            ComplexityLevel::Complex => &self.complex,
            ComplexityLevel::Research => &self.research,
        }
    }

    fn for_level_mut(&mut self, level: ComplexityLevel) -> &mut TierProfile {
        match level {
            ComplexityLevel::Simple => &mut self.simple,
            ComplexityLevel::Medium => &mut self.medium,
            ComplexityLevel::Complex => &mut self.complex,
            ComplexityLevel::Research => &mut self.research,
        }
    }

    /// Replace the model recommended for one level
    pub fn with_model(mut self, level: ComplexityLevel, model: impl Into<String>) -> Self {
        self.for_level_mut(level).model = model.into();
        self
    }

    /// Replace the retrieval parameters for one level
    pub fn with_retrieval(mut self, level: ComplexityLevel, retrieval: RetrievalParams) -> Self {
        self.for_level_mut(level).retrieval = retrieval;
        self
    }

    /// Validate the table
    ///
    /// Channel counts must grow strictly from simple to research, and every
    /// tier needs a model and a non-zero final result count.
    pub fn validate(&self) -> Result<(), String> {
        let rows = ComplexityLevel::ALL.map(|level| (level, self.for_level(level)));

        for (level, profile) in &rows {
            if profile.model.trim().is_empty() {
                return Err(format!("model for tier '{}' must not be empty", level));
            }
            if profile.retrieval.final_top_k == 0 {
                return Err(format!("final_top_k for tier '{}' must be greater than 0", level));
            }
        }

        for pair in rows.windows(2) {
            let (lower_level, lower) = pair[0];
            let (upper_level, upper) = pair[1];
            if upper.retrieval.vector_top_k <= lower.retrieval.vector_top_k
                || upper.retrieval.keyword_top_k <= lower.retrieval.keyword_top_k
            {
                return Err(format!(
                    "retrieval channel counts must increase from '{}' to '{}'",
                    lower_level, upper_level
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_profiles() {
        let profiles = TierProfiles::default();
        assert_eq!(profiles.simple.retrieval, RetrievalParams::new(10, 10, 3));
        assert_eq!(profiles.medium.retrieval, RetrievalParams::new(20, 20, 5));
        assert_eq!(profiles.complex.retrieval, RetrievalParams::new(30, 30, 8));
        assert_eq!(profiles.research.retrieval, RetrievalParams::new(50, 50, 12));
        assert!(profiles.validate().is_ok());
    }

    #[test]
    fn test_with_model_override() {
        let profiles = TierProfiles::default().with_model(ComplexityLevel::Research, "o1");
        assert_eq!(profiles.for_level(ComplexityLevel::Research).model, "o1");
        assert_eq!(profiles.for_level(ComplexityLevel::Simple).model, "gpt-4o-mini");
    }

    #[test]
    fn test_validation_rejects_non_increasing_channels() {
        let profiles = TierProfiles::default()
            .with_retrieval(ComplexityLevel::Complex, RetrievalParams::new(20, 30, 8));
        let err = profiles.validate().unwrap_err();
        assert!(err.contains("'medium' to 'complex'"));
    }

    #[test]
    fn test_validation_rejects_empty_model() {
        let profiles = TierProfiles::default().with_model(ComplexityLevel::Medium, "  ");
        assert!(profiles.validate().is_err());
    }

    #[test]
    fn test_profiles_deserialize() {
        let json = r#"{
            "simple":   {"model": "a", "retrieval": {"vector_top_k": 5,  "keyword_top_k": 5,  "final_top_k": 2}},
            "medium":   {"model": "b", "retrieval": {"vector_top_k": 10, "keyword_top_k": 10, "final_top_k": 4}},
            "complex":  {"model": "c", "retrieval": {"vector_top_k": 15, "keyword_top_k": 15, "final_top_k": 6}},
            "research": {"model": "d", "retrieval": {"vector_top_k": 25, "keyword_top_k": 25, "final_top_k": 9}}
        }"#;
        let profiles: TierProfiles = serde_json::from_str(json).unwrap();
        assert_eq!(profiles.research.model, "d");
        assert!(profiles.validate().is_ok());
    }
}
