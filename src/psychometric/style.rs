//! Learning-style and cognitive-profile derivation.
//!
//! Pure functions of the sparse score map. Missing domains fall back to a
//! neutral midpoint (score 50); invalid scores are rejected, never
//! defaulted. Same input always yields the same derived profile.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::psychometric::domains::Domain;
use crate::types::DomainScore;

/// Neutral fallback when a domain has no recorded score.
pub const NEUTRAL_SCORE: f64 = 50.0;

const LOW_THRESHOLD: f64 = 40.0;
const HIGH_THRESHOLD: f64 = 70.0;
const SECONDARY_FLOOR: f64 = 60.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StyleModality {
    Visual,
    Auditory,
    Kinesthetic,
    Reading,
}

impl StyleModality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Visual => "visual",
            Self::Auditory => "auditory",
            Self::Kinesthetic => "kinesthetic",
            Self::Reading => "reading",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SocialPreference {
    Solo,
    Collaborative,
    Mixed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PacePreference {
    SelfPaced,
    Structured,
    Intensive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackPreference {
    Immediate,
    Gentle,
    Detailed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningStyle {
    pub primary: StyleModality,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary: Option<StyleModality>,
    pub social_preference: SocialPreference,
    pub pace_preference: PacePreference,
    pub feedback_preference: FeedbackPreference,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Low,
    Medium,
    High,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CognitiveProfile {
    pub working_memory_capacity: Level,
    pub attention_span: Level,
    pub processing_speed: Level,
    pub abstract_thinking: Level,
}

pub(crate) fn validate_scores(scores: &HashMap<Domain, DomainScore>) -> Result<()> {
    for score in scores.values() {
        score.validate()?;
    }
    Ok(())
}

pub(crate) fn score_or_neutral(scores: &HashMap<Domain, DomainScore>, domain: Domain) -> f64 {
    scores.get(&domain).map(|s| s.score).unwrap_or(NEUTRAL_SCORE)
}

/// Three-way bucket used by every categorical derivation: <40 low,
/// 40-70 medium, >70 high.
pub fn bucket(score: f64) -> Level {
    if score < LOW_THRESHOLD {
        Level::Low
    } else if score <= HIGH_THRESHOLD {
        Level::Medium
    } else {
        Level::High
    }
}

/// Derives a categorical learning style from the sparse score map.
///
/// An empty map yields the default bucket (visual primary, mixed social,
/// self-paced), never an error.
pub fn derive_learning_style(scores: &HashMap<Domain, DomainScore>) -> Result<LearningStyle> {
    validate_scores(scores)?;

    let mut visual = score_or_neutral(scores, Domain::VisualPreference);
    let auditory = score_or_neutral(scores, Domain::AuditoryPreference);
    let kinesthetic = score_or_neutral(scores, Domain::KinestheticPreference);
    let mut reading = score_or_neutral(scores, Domain::ReadingPreference);

    // When no per-modality score exists, the composite learning_styles
    // score biases the choice: high leans visual, low leans reading.
    let no_modality_scores = [
        Domain::VisualPreference,
        Domain::AuditoryPreference,
        Domain::KinestheticPreference,
        Domain::ReadingPreference,
    ]
    .iter()
    .all(|d| !scores.contains_key(d));
    if no_modality_scores {
        let composite = score_or_neutral(scores, Domain::LearningStyles);
        if composite > HIGH_THRESHOLD {
            visual = composite;
        } else if composite < 30.0 {
            reading = 100.0 - composite;
        }
    }

    // Fixed order makes ties deterministic.
    let ranked = [
        (StyleModality::Visual, visual),
        (StyleModality::Auditory, auditory),
        (StyleModality::Kinesthetic, kinesthetic),
        (StyleModality::Reading, reading),
    ];
    let primary = ranked
        .iter()
        .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(m, _)| *m)
        .unwrap_or(StyleModality::Visual);
    let secondary = ranked
        .iter()
        .filter(|(m, _)| *m != primary)
        .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
        .filter(|(_, s)| *s >= SECONDARY_FLOOR)
        .map(|(m, _)| *m);

    let sociability = (score_or_neutral(scores, Domain::Extraversion)
        + score_or_neutral(scores, Domain::CollaborationPreference))
        / 2.0;
    let social_preference = if sociability > 60.0 {
        SocialPreference::Collaborative
    } else if sociability < 40.0 {
        SocialPreference::Solo
    } else {
        SocialPreference::Mixed
    };

    let conscientiousness = score_or_neutral(scores, Domain::Conscientiousness);
    let grit = score_or_neutral(scores, Domain::Grit);
    let pace_preference = if conscientiousness > HIGH_THRESHOLD && grit > HIGH_THRESHOLD {
        PacePreference::Intensive
    } else if conscientiousness < LOW_THRESHOLD {
        PacePreference::Structured
    } else {
        PacePreference::SelfPaced
    };

    let anxiety = score_or_neutral(scores, Domain::Anxiety);
    let neuroticism = score_or_neutral(scores, Domain::Neuroticism);
    let feedback_preference = if anxiety > HIGH_THRESHOLD || neuroticism > HIGH_THRESHOLD {
        FeedbackPreference::Gentle
    } else if conscientiousness > HIGH_THRESHOLD {
        FeedbackPreference::Detailed
    } else {
        FeedbackPreference::Immediate
    };

    Ok(LearningStyle {
        primary,
        secondary,
        social_preference,
        pace_preference,
        feedback_preference,
    })
}

/// Buckets the four cognitive axes from their corresponding domains.
pub fn estimate_cognitive_profile(
    scores: &HashMap<Domain, DomainScore>,
) -> Result<CognitiveProfile> {
    validate_scores(scores)?;

    Ok(CognitiveProfile {
        working_memory_capacity: bucket(score_or_neutral(scores, Domain::WorkingMemory)),
        attention_span: bucket(score_or_neutral(scores, Domain::AttentionSpan)),
        processing_speed: bucket(score_or_neutral(scores, Domain::ProcessingSpeed)),
        abstract_thinking: bucket(score_or_neutral(scores, Domain::AbstractThinking)),
    })
}
