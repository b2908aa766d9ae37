//! Closed enumeration of the 39 psychometric domains.
//!
//! Scores are stored sparsely per learner; keys are validated against this
//! enum at the storage boundary, so arbitrary strings never reach the
//! engines.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DomainCategory {
    Personality,
    Cognitive,
    Motivation,
    LearningStyle,
    Emotional,
    Social,
    Metacognition,
    Executive,
}

/// One of the 39 scored psychometric domains, grouped into 8 categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    // Personality (Big Five)
    Openness,
    Conscientiousness,
    Extraversion,
    Agreeableness,
    Neuroticism,
    // Cognitive
    WorkingMemory,
    ProcessingSpeed,
    AttentionSpan,
    AbstractThinking,
    PatternRecognition,
    SpatialReasoning,
    // Motivation
    IntrinsicMotivation,
    ExtrinsicMotivation,
    SelfEfficacy,
    Grit,
    GrowthMindset,
    // Learning style
    VisualPreference,
    AuditoryPreference,
    KinestheticPreference,
    ReadingPreference,
    LearningStyles,
    // Emotional
    Anxiety,
    StressTolerance,
    EmotionalRegulation,
    MoodStability,
    FrustrationTolerance,
    // Social
    CollaborationPreference,
    Competitiveness,
    SocialConfidence,
    Empathy,
    // Metacognition
    SelfMonitoring,
    Planning,
    Reflection,
    StrategyUse,
    // Executive
    TaskInitiation,
    Organization,
    TimeManagement,
    ImpulseControl,
    CognitiveFlexibility,
}

impl Domain {
    pub const COUNT: usize = 39;

    pub const ALL: [Domain; Self::COUNT] = [
        Domain::Openness,
        Domain::Conscientiousness,
        Domain::Extraversion,
        Domain::Agreeableness,
        Domain::Neuroticism,
        Domain::WorkingMemory,
        Domain::ProcessingSpeed,
        Domain::AttentionSpan,
        Domain::AbstractThinking,
        Domain::PatternRecognition,
        Domain::SpatialReasoning,
        Domain::IntrinsicMotivation,
        Domain::ExtrinsicMotivation,
        Domain::SelfEfficacy,
        Domain::Grit,
        Domain::GrowthMindset,
        Domain::VisualPreference,
        Domain::AuditoryPreference,
        Domain::KinestheticPreference,
        Domain::ReadingPreference,
        Domain::LearningStyles,
        Domain::Anxiety,
        Domain::StressTolerance,
        Domain::EmotionalRegulation,
        Domain::MoodStability,
        Domain::FrustrationTolerance,
        Domain::CollaborationPreference,
        Domain::Competitiveness,
        Domain::SocialConfidence,
        Domain::Empathy,
        Domain::SelfMonitoring,
        Domain::Planning,
        Domain::Reflection,
        Domain::StrategyUse,
        Domain::TaskInitiation,
        Domain::Organization,
        Domain::TimeManagement,
        Domain::ImpulseControl,
        Domain::CognitiveFlexibility,
    ];

    pub fn category(&self) -> DomainCategory {
        match self {
            Self::Openness
            | Self::Conscientiousness
            | Self::Extraversion
            | Self::Agreeableness
            | Self::Neuroticism => DomainCategory::Personality,
            Self::WorkingMemory
            | Self::ProcessingSpeed
            | Self::AttentionSpan
            | Self::AbstractThinking
            | Self::PatternRecognition
            | Self::SpatialReasoning => DomainCategory::Cognitive,
            Self::IntrinsicMotivation
            | Self::ExtrinsicMotivation
            | Self::SelfEfficacy
            | Self::Grit
            | Self::GrowthMindset => DomainCategory::Motivation,
            Self::VisualPreference
            | Self::AuditoryPreference
            | Self::KinestheticPreference
            | Self::ReadingPreference
            | Self::LearningStyles => DomainCategory::LearningStyle,
            Self::Anxiety
            | Self::StressTolerance
            | Self::EmotionalRegulation
            | Self::MoodStability
            | Self::FrustrationTolerance => DomainCategory::Emotional,
            Self::CollaborationPreference
            | Self::Competitiveness
            | Self::SocialConfidence
            | Self::Empathy => DomainCategory::Social,
            Self::SelfMonitoring | Self::Planning | Self::Reflection | Self::StrategyUse => {
                DomainCategory::Metacognition
            }
            Self::TaskInitiation
            | Self::Organization
            | Self::TimeManagement
            | Self::ImpulseControl
            | Self::CognitiveFlexibility => DomainCategory::Executive,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Openness => "openness",
            Self::Conscientiousness => "conscientiousness",
            Self::Extraversion => "extraversion",
            Self::Agreeableness => "agreeableness",
            Self::Neuroticism => "neuroticism",
            Self::WorkingMemory => "working_memory",
            Self::ProcessingSpeed => "processing_speed",
            Self::AttentionSpan => "attention_span",
            Self::AbstractThinking => "abstract_thinking",
            Self::PatternRecognition => "pattern_recognition",
            Self::SpatialReasoning => "spatial_reasoning",
            Self::IntrinsicMotivation => "intrinsic_motivation",
            Self::ExtrinsicMotivation => "extrinsic_motivation",
            Self::SelfEfficacy => "self_efficacy",
            Self::Grit => "grit",
            Self::GrowthMindset => "growth_mindset",
            Self::VisualPreference => "visual_preference",
            Self::AuditoryPreference => "auditory_preference",
            Self::KinestheticPreference => "kinesthetic_preference",
            Self::ReadingPreference => "reading_preference",
            Self::LearningStyles => "learning_styles",
            Self::Anxiety => "anxiety",
            Self::StressTolerance => "stress_tolerance",
            Self::EmotionalRegulation => "emotional_regulation",
            Self::MoodStability => "mood_stability",
            Self::FrustrationTolerance => "frustration_tolerance",
            Self::CollaborationPreference => "collaboration_preference",
            Self::Competitiveness => "competitiveness",
            Self::SocialConfidence => "social_confidence",
            Self::Empathy => "empathy",
            Self::SelfMonitoring => "self_monitoring",
            Self::Planning => "planning",
            Self::Reflection => "reflection",
            Self::StrategyUse => "strategy_use",
            Self::TaskInitiation => "task_initiation",
            Self::Organization => "organization",
            Self::TimeManagement => "time_management",
            Self::ImpulseControl => "impulse_control",
            Self::CognitiveFlexibility => "cognitive_flexibility",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|d| d.as_str() == s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_covers_every_domain_once() {
        let mut seen = std::collections::HashSet::new();
        for d in Domain::ALL {
            assert!(seen.insert(d.as_str()));
        }
        assert_eq!(seen.len(), Domain::COUNT);
    }

    #[test]
    fn test_parse_round_trip() {
        for d in Domain::ALL {
            assert_eq!(Domain::parse(d.as_str()), Some(d));
        }
        assert_eq!(Domain::parse("not_a_domain"), None);
    }

    #[test]
    fn test_eight_categories() {
        let categories: std::collections::HashSet<_> =
            Domain::ALL.iter().map(|d| d.category()).collect();
        assert_eq!(categories.len(), 8);
    }
}
