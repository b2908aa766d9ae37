//! Shared data model: concepts, prerequisite edges, learners, and
//! per-learner-per-concept knowledge states.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::psychometric::{CognitiveProfile, Domain, LearningStyle};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeStrength {
    Required,
    Recommended,
    Helpful,
}

impl EdgeStrength {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::Recommended => "recommended",
            Self::Helpful => "helpful",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "required" => Some(Self::Required),
            "recommended" => Some(Self::Recommended),
            "helpful" => Some(Self::Helpful),
            _ => None,
        }
    }

    /// Strengths that count toward prerequisite satisfaction.
    pub fn counts_for_readiness(&self) -> bool {
        matches!(self, Self::Required | Self::Recommended)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConceptDifficulty {
    /// Absolute difficulty on a 1-10 scale.
    pub absolute: f64,
    /// Intrinsic cognitive load, 0-1.
    pub cognitive_load: f64,
    /// How abstract the concept is, 0-1.
    pub abstractness: f64,
}

impl Default for ConceptDifficulty {
    fn default() -> Self {
        Self {
            absolute: 5.0,
            cognitive_load: 0.5,
            abstractness: 0.5,
        }
    }
}

impl ConceptDifficulty {
    pub fn validate(&self) -> Result<()> {
        if !(1.0..=10.0).contains(&self.absolute) {
            return Err(EngineError::InvalidInput(format!(
                "difficulty.absolute must be in [1,10], got {}",
                self.absolute
            )));
        }
        if !(0.0..=1.0).contains(&self.cognitive_load) {
            return Err(EngineError::InvalidInput(format!(
                "difficulty.cognitiveLoad must be in [0,1], got {}",
                self.cognitive_load
            )));
        }
        if !(0.0..=1.0).contains(&self.abstractness) {
            return Err(EngineError::InvalidInput(format!(
                "difficulty.abstractness must be in [0,1], got {}",
                self.abstractness
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConceptNode {
    pub concept_id: String,
    pub name: String,
    pub domain: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subdomain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub difficulty: ConceptDifficulty,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bloom_level: Option<u8>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl ConceptNode {
    pub fn validate(&self) -> Result<()> {
        if self.concept_id.is_empty() {
            return Err(EngineError::InvalidInput("conceptId must not be empty".into()));
        }
        self.difficulty.validate()?;
        if let Some(level) = self.bloom_level {
            validate_bloom_level(level)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrerequisiteEdge {
    pub from: String,
    pub to: String,
    pub strength: EdgeStrength,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainScore {
    /// Raw score, 0-100.
    pub score: f64,
    /// Trust in the source of this score, 0-1. Not score certainty.
    pub confidence: f64,
    pub last_updated: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl DomainScore {
    pub fn new(score: f64, confidence: f64, last_updated: DateTime<Utc>) -> Self {
        Self {
            score,
            confidence,
            last_updated,
            source: None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=100.0).contains(&self.score) {
            return Err(EngineError::InvalidInput(format!(
                "psychometric score must be in [0,100], got {}",
                self.score
            )));
        }
        if !(0.0..=1.0).contains(&self.confidence) {
            return Err(EngineError::InvalidInput(format!(
                "score confidence must be in [0,1], got {}",
                self.confidence
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearnerProfile {
    pub user_id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Sparse: anywhere from 0 to all 39 domains may be set.
    #[serde(default)]
    pub psychometric_scores: HashMap<Domain, DomainScore>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub learning_style: Option<LearningStyle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cognitive_profile: Option<CognitiveProfile>,
}

impl LearnerProfile {
    pub fn new(user_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            name: name.into(),
            email: None,
            psychometric_scores: HashMap::new(),
            learning_style: None,
            cognitive_profile: None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.user_id.is_empty() {
            return Err(EngineError::InvalidInput("userId must not be empty".into()));
        }
        for score in self.psychometric_scores.values() {
            score.validate()?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
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
pub struct Misconception {
    pub id: String,
    pub description: String,
    pub severity: Severity,
}

/// The central mutable entity the engines read: one learner's standing on
/// one concept. Created on first interaction, updated on every
/// mastery-affecting event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeState {
    pub user_id: String,
    pub concept_id: String,
    /// 0-100.
    pub mastery: f64,
    /// 1-6 (remember through create).
    pub bloom_level: u8,
    pub last_accessed: DateTime<Utc>,
    pub last_reviewed: DateTime<Utc>,
    /// Multiplier on the decay half-life; grows with successful reviews.
    pub retention_strength: f64,
    #[serde(default)]
    pub misconceptions: Vec<Misconception>,
}

impl KnowledgeState {
    pub fn new(
        user_id: impl Into<String>,
        concept_id: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            concept_id: concept_id.into(),
            mastery: 0.0,
            bloom_level: 1,
            last_accessed: now,
            last_reviewed: now,
            retention_strength: 1.0,
            misconceptions: Vec::new(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=100.0).contains(&self.mastery) {
            return Err(EngineError::InvalidInput(format!(
                "mastery must be in [0,100], got {}",
                self.mastery
            )));
        }
        validate_bloom_level(self.bloom_level)?;
        if self.retention_strength <= 0.0 {
            return Err(EngineError::InvalidInput(format!(
                "retentionStrength must be positive, got {}",
                self.retention_strength
            )));
        }
        Ok(())
    }
}

fn validate_bloom_level(level: u8) -> Result<()> {
    if !(1..=6).contains(&level) {
        return Err(EngineError::InvalidInput(format!(
            "bloomLevel must be in [1,6], got {level}"
        )));
    }
    Ok(())
}
