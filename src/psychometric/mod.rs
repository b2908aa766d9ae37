//! Psychometric model: 39 scored domains in 8 categories, categorical
//! profile derivation, and the adjustment factors fed into the ZPD engine.

pub mod adjustments;
pub mod domains;
pub mod style;

pub use adjustments::{
    derive_adjustments, PaceRecommendation, PsychometricAdjustments, ScaffoldType,
    ScaffoldingStrategy,
};
pub use domains::{Domain, DomainCategory};
pub use style::{
    bucket, derive_learning_style, estimate_cognitive_profile, CognitiveProfile,
    FeedbackPreference, LearningStyle, Level, PacePreference, SocialPreference, StyleModality,
    NEUTRAL_SCORE,
};
