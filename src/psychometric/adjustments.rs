//! Per-learner psychometric adjustments fed into the ZPD engine: difficulty
//! modifier, pacing, scaffolding selection, and presentation notes.
//!
//! Selection is an explicit rule table (signal -> strategy) so every
//! threshold boundary is unit-testable.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::psychometric::domains::Domain;
use crate::psychometric::style::{
    derive_learning_style, estimate_cognitive_profile, score_or_neutral, Level, SocialPreference,
    StyleModality,
};
use crate::types::{DomainScore, LearnerProfile};

const MODIFIER_MIN: f64 = -0.5;
const MODIFIER_MAX: f64 = 0.5;
const HIGH: f64 = 70.0;
const LOW: f64 = 40.0;

/// Fixed catalog of instructional supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaffoldType {
    WorkedExample,
    GuidedPractice,
    Hints,
    VisualAids,
    Chunking,
    PeerDiscussion,
    Analogy,
    Repetition,
}

impl ScaffoldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WorkedExample => "worked_example",
            Self::GuidedPractice => "guided_practice",
            Self::Hints => "hints",
            Self::VisualAids => "visual_aids",
            Self::Chunking => "chunking",
            Self::PeerDiscussion => "peer_discussion",
            Self::Analogy => "analogy",
            Self::Repetition => "repetition",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScaffoldingStrategy {
    #[serde(rename = "type")]
    pub kind: ScaffoldType,
    pub reason: String,
    pub priority: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaceRecommendation {
    Slower,
    Normal,
    Faster,
}

impl PaceRecommendation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Slower => "slower",
            Self::Normal => "normal",
            Self::Faster => "faster",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PsychometricAdjustments {
    /// Additive shift on readiness, negative is more conservative.
    pub difficulty_modifier: f64,
    pub pace_recommendation: PaceRecommendation,
    pub scaffolding_strategies: Vec<ScaffoldingStrategy>,
    pub presentation_style: String,
    pub attention_considerations: Vec<String>,
}

impl Default for PsychometricAdjustments {
    fn default() -> Self {
        Self {
            difficulty_modifier: 0.0,
            pace_recommendation: PaceRecommendation::Normal,
            scaffolding_strategies: Vec::new(),
            presentation_style: "visual-first, steady pacing".to_string(),
            attention_considerations: Vec::new(),
        }
    }
}

/// Derives the full adjustment set from a learner's raw scores. Computed
/// once per learner per engine invocation.
pub fn derive_adjustments(profile: &LearnerProfile) -> Result<PsychometricAdjustments> {
    let scores = &profile.psychometric_scores;
    let style = derive_learning_style(scores)?;
    let cognitive = estimate_cognitive_profile(scores)?;

    let difficulty_modifier = difficulty_modifier(scores);
    let pace_recommendation = pace_recommendation(scores);
    let scaffolding_strategies =
        select_scaffolding(scores, &style.primary, style.social_preference, &cognitive);
    let presentation_style = format!(
        "{}-first, {}",
        style.primary.as_str(),
        match pace_recommendation {
            PaceRecommendation::Slower => "deliberate pacing",
            PaceRecommendation::Normal => "steady pacing",
            PaceRecommendation::Faster => "accelerated pacing",
        }
    );
    let attention_considerations = attention_considerations(scores, &cognitive);

    Ok(PsychometricAdjustments {
        difficulty_modifier,
        pace_recommendation,
        scaffolding_strategies,
        presentation_style,
        attention_considerations,
    })
}

fn difficulty_modifier(scores: &HashMap<Domain, DomainScore>) -> f64 {
    let mut modifier: f64 = 0.0;

    if score_or_neutral(scores, Domain::Anxiety) > HIGH {
        modifier -= 0.15;
    }
    if score_or_neutral(scores, Domain::Neuroticism) > HIGH {
        modifier -= 0.10;
    }
    if score_or_neutral(scores, Domain::StressTolerance) < LOW {
        modifier -= 0.10;
    }
    if score_or_neutral(scores, Domain::SelfEfficacy) > HIGH {
        modifier += 0.15;
    }
    if score_or_neutral(scores, Domain::Openness) > HIGH {
        modifier += 0.10;
    }
    if score_or_neutral(scores, Domain::GrowthMindset) > HIGH {
        modifier += 0.05;
    }

    modifier.clamp(MODIFIER_MIN, MODIFIER_MAX)
}

fn pace_recommendation(scores: &HashMap<Domain, DomainScore>) -> PaceRecommendation {
    let throughput = (score_or_neutral(scores, Domain::ProcessingSpeed)
        + score_or_neutral(scores, Domain::WorkingMemory))
        / 2.0;
    if throughput < LOW {
        PaceRecommendation::Slower
    } else if throughput > HIGH {
        PaceRecommendation::Faster
    } else {
        PaceRecommendation::Normal
    }
}

fn select_scaffolding(
    scores: &HashMap<Domain, DomainScore>,
    primary: &StyleModality,
    social: SocialPreference,
    cognitive: &crate::psychometric::style::CognitiveProfile,
) -> Vec<ScaffoldingStrategy> {
    let mut candidates: Vec<(ScaffoldType, u8, &str)> = Vec::new();

    if cognitive.working_memory_capacity == Level::Low {
        candidates.push((
            ScaffoldType::Chunking,
            9,
            "low working memory: break content into small chunks",
        ));
        candidates.push((
            ScaffoldType::Repetition,
            6,
            "low working memory: schedule repeated exposures",
        ));
    }
    if score_or_neutral(scores, Domain::Anxiety) > HIGH {
        candidates.push((
            ScaffoldType::WorkedExample,
            9,
            "high anxiety: start from fully worked examples",
        ));
        candidates.push((
            ScaffoldType::GuidedPractice,
            7,
            "high anxiety: practice with guidance before solo work",
        ));
    }
    if score_or_neutral(scores, Domain::Neuroticism) > HIGH {
        candidates.push((
            ScaffoldType::Hints,
            6,
            "high neuroticism: offer hints to limit frustration",
        ));
    }
    if score_or_neutral(scores, Domain::SelfEfficacy) < LOW {
        candidates.push((
            ScaffoldType::GuidedPractice,
            8,
            "low self-efficacy: build confidence through guided practice",
        ));
    }
    if cognitive.abstract_thinking == Level::Low {
        candidates.push((
            ScaffoldType::Analogy,
            7,
            "concrete thinker: anchor abstractions in analogies",
        ));
    }
    if cognitive.processing_speed == Level::Low {
        candidates.push((
            ScaffoldType::Repetition,
            6,
            "slow processing: revisit material more than once",
        ));
    }
    if cognitive.attention_span == Level::Low {
        candidates.push((
            ScaffoldType::Chunking,
            6,
            "short attention span: small units of work",
        ));
    }
    match primary {
        StyleModality::Visual => candidates.push((
            ScaffoldType::VisualAids,
            8,
            "visual learner: diagrams and visual aids",
        )),
        StyleModality::Kinesthetic => candidates.push((
            ScaffoldType::GuidedPractice,
            6,
            "kinesthetic learner: learn by doing",
        )),
        StyleModality::Reading => candidates.push((
            ScaffoldType::WorkedExample,
            5,
            "reading learner: written step-by-step examples",
        )),
        StyleModality::Auditory => candidates.push((
            ScaffoldType::PeerDiscussion,
            5,
            "auditory learner: talk concepts through",
        )),
    }
    if social == SocialPreference::Collaborative {
        candidates.push((
            ScaffoldType::PeerDiscussion,
            5,
            "collaborative preference: discuss with peers",
        ));
    }

    // Dedupe by type keeping the highest priority, then rank.
    let mut best: HashMap<ScaffoldType, ScaffoldingStrategy> = HashMap::new();
    for (kind, priority, reason) in candidates {
        let entry = best.entry(kind).or_insert_with(|| ScaffoldingStrategy {
            kind,
            reason: reason.to_string(),
            priority,
        });
        if priority > entry.priority {
            entry.priority = priority;
            entry.reason = reason.to_string();
        }
    }
    let mut strategies: Vec<ScaffoldingStrategy> = best.into_values().collect();
    strategies.sort_by(|a, b| b.priority.cmp(&a.priority).then(a.kind.cmp(&b.kind)));
    strategies
}

fn attention_considerations(
    scores: &HashMap<Domain, DomainScore>,
    cognitive: &crate::psychometric::style::CognitiveProfile,
) -> Vec<String> {
    let mut notes = Vec::new();
    if cognitive.attention_span == Level::Low {
        notes.push("short attention span: keep sessions brief".to_string());
    }
    if score_or_neutral(scores, Domain::ImpulseControl) < LOW {
        notes.push("low impulse control: minimize distractions".to_string());
    }
    if score_or_neutral(scores, Domain::Anxiety) > HIGH {
        notes.push("high anxiety: avoid timed pressure".to_string());
    }
    if score_or_neutral(scores, Domain::MoodStability) < LOW {
        notes.push("variable mood: check engagement between sessions".to_string());
    }
    notes
}
