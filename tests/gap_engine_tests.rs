//! Integration tests for GapEngine: detection, the review queue, and
//! remediation planning at a fixed instant.

use chrono::{DateTime, Duration, TimeZone, Utc};
use zpd_core::{
    ConceptDifficulty, ConceptNode, EdgeStrength, EngineConfig, EngineError, GapEngine, GapScope,
    GapType, KnowledgeState, LearnerProfile, MemoryStorage, Misconception, PrerequisiteEdge,
    ReviewPriority, Severity, Storage,
};

fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
}

fn concept(id: &str, name: &str, domain: &str) -> ConceptNode {
    ConceptNode {
        concept_id: id.to_string(),
        name: name.to_string(),
        domain: domain.to_string(),
        subdomain: None,
        description: None,
        difficulty: ConceptDifficulty {
            absolute: 4.0,
            cognitive_load: 0.5,
            abstractness: 0.5,
        },
        bloom_level: Some(2),
        tags: vec![],
    }
}

fn required(from: &str, to: &str) -> PrerequisiteEdge {
    PrerequisiteEdge {
        from: from.to_string(),
        to: to.to_string(),
        strength: EdgeStrength::Required,
        reason: None,
    }
}

fn state_reviewed(
    user: &str,
    concept: &str,
    mastery: f64,
    reviewed_days_ago: i64,
) -> KnowledgeState {
    let reviewed = fixed_now() - Duration::days(reviewed_days_ago);
    let mut s = KnowledgeState::new(user, concept, reviewed);
    s.mastery = mastery;
    s.bloom_level = 2;
    s
}

/// c1 -> c2 -> c3 in one domain, plus an unrelated concept elsewhere.
fn chain_store() -> MemoryStorage {
    let storage = MemoryStorage::new();
    storage.insert_concept(concept("c1", "C1", "math")).unwrap();
    storage.insert_concept(concept("c2", "C2", "math")).unwrap();
    storage.insert_concept(concept("c3", "C3", "math")).unwrap();
    storage
        .insert_concept(concept("hist1", "H1", "history"))
        .unwrap();
    storage.insert_edge(required("c1", "c2")).unwrap();
    storage.insert_edge(required("c2", "c3")).unwrap();
    storage
        .upsert_learner(LearnerProfile::new("u1", "Sam"))
        .unwrap();
    storage
}

#[test]
fn test_decayed_concept_is_a_forgotten_gap() {
    let storage = chain_store();
    // Learned well, untouched for a month: retention ~5%.
    storage
        .upsert_knowledge_state(state_reviewed("u1", "c1", 85.0, 30))
        .unwrap();

    let engine = GapEngine::new(&storage, EngineConfig::default());
    let report = engine
        .detect_gaps_at("u1", &GapScope::Concepts(vec!["c1".to_string()]), fixed_now())
        .unwrap();

    assert_eq!(report.forgotten.len(), 1);
    let gap = &report.forgotten[0];
    assert_eq!(gap.gap_type, GapType::Forgotten);
    assert_eq!(gap.severity, Severity::High);
    let retention = gap.predicted_retention.unwrap();
    assert!(retention < 80.0, "retention was {retention}");
    assert!(report.partial.is_empty());
    assert!(report.missing.is_empty());
}

#[test]
fn test_misconceptions_surface_alongside_mastery_gaps() {
    let storage = chain_store();
    let mut c1 = state_reviewed("u1", "c1", 55.0, 0);
    c1.misconceptions.push(Misconception {
        id: "m1".to_string(),
        description: "confuses the operand order".to_string(),
        severity: Severity::High,
    });
    c1.misconceptions.push(Misconception {
        id: "m1b".to_string(),
        description: "applies the rule to the wrong base".to_string(),
        severity: Severity::Medium,
    });
    storage.upsert_knowledge_state(c1).unwrap();
    let mut c2 = state_reviewed("u1", "c2", 90.0, 0);
    c2.misconceptions.push(Misconception {
        id: "m2".to_string(),
        description: "overgeneralizes the base case".to_string(),
        severity: Severity::Low,
    });
    storage.upsert_knowledge_state(c2).unwrap();

    let engine = GapEngine::new(&storage, EngineConfig::default());
    let report = engine
        .detect_gaps_at("u1", &GapScope::All, fixed_now())
        .unwrap();

    assert_eq!(report.misconceptions.len(), 2);
    let c1_gap = report
        .misconceptions
        .iter()
        .find(|g| g.concept_id == "c1")
        .unwrap();
    let descriptions: Vec<&str> = c1_gap
        .misconceptions
        .iter()
        .map(|m| m.description.as_str())
        .collect();
    assert_eq!(descriptions.len(), 2);
    assert!(descriptions.contains(&"confuses the operand order"));
    assert!(descriptions.contains(&"applies the rule to the wrong base"));
    // c1 shows up twice: weak mastery and a misconception.
    assert_eq!(report.partial.len(), 1);
    assert_eq!(report.partial[0].concept_id, "c1");
    assert_eq!(
        report.summary.total,
        report.missing.len()
            + report.partial.len()
            + report.forgotten.len()
            + report.misconceptions.len()
    );
    assert_eq!(report.summary.by_type["misconception"], 2);
}

#[test]
fn test_fresh_learner_reports_every_concept_missing() {
    let storage = chain_store();
    let engine = GapEngine::new(&storage, EngineConfig::default());
    let report = engine
        .detect_gaps_at("u1", &GapScope::Domains(vec!["math".to_string()]), fixed_now())
        .unwrap();

    let ids: Vec<&str> = report.missing.iter().map(|g| g.concept_id.as_str()).collect();
    assert_eq!(ids, vec!["c1", "c2", "c3"]);
    assert_eq!(report.summary.total, 3);
}

#[test]
fn test_missing_gap_names_its_blocked_dependents() {
    let storage = chain_store();
    let engine = GapEngine::new(&storage, EngineConfig::default());
    let report = engine
        .detect_gaps_at("u1", &GapScope::Domains(vec!["math".to_string()]), fixed_now())
        .unwrap();

    let gap = |id: &str| report.missing.iter().find(|g| g.concept_id == id).unwrap();
    assert_eq!(gap("c1").blocked_dependent_ids, vec!["c2".to_string()]);
    assert_eq!(gap("c1").blocked_dependents, 1);
    assert_eq!(gap("c2").blocked_dependent_ids, vec!["c3".to_string()]);
    assert!(gap("c3").blocked_dependent_ids.is_empty());
    assert_eq!(gap("c3").blocked_dependents, 0);
}

#[test]
fn test_scope_filters_by_domain() {
    let storage = chain_store();
    let engine = GapEngine::new(&storage, EngineConfig::default());
    let report = engine
        .detect_gaps_at(
            "u1",
            &GapScope::Domains(vec!["history".to_string()]),
            fixed_now(),
        )
        .unwrap();
    let ids: Vec<&str> = report.missing.iter().map(|g| g.concept_id.as_str()).collect();
    assert_eq!(ids, vec!["hist1"]);
}

#[test]
fn test_unready_concepts_are_not_missing_gaps() {
    let storage = chain_store();
    // c1 mastered, so c2 is ready; c3's prerequisite is not.
    storage
        .upsert_knowledge_state(state_reviewed("u1", "c1", 85.0, 0))
        .unwrap();

    let engine = GapEngine::new(&storage, EngineConfig::default());
    let report = engine
        .detect_gaps_at("u1", &GapScope::Domains(vec!["math".to_string()]), fixed_now())
        .unwrap();
    let ids: Vec<&str> = report.missing.iter().map(|g| g.concept_id.as_str()).collect();
    assert_eq!(ids, vec!["c2"]);
}

#[test]
fn test_remediation_plan_orders_prerequisites_first() {
    let storage = chain_store();
    // Both c2 and c3 missing (c1 mastered); a standalone misconception.
    storage
        .upsert_knowledge_state(state_reviewed("u1", "c1", 85.0, 0))
        .unwrap();
    storage
        .upsert_knowledge_state(state_reviewed("u1", "c2", 75.0, 0))
        .unwrap();
    let mut hist = state_reviewed("u1", "hist1", 80.0, 0);
    hist.misconceptions.push(Misconception {
        id: "m1".to_string(),
        description: "confuses cause and effect".to_string(),
        severity: Severity::Medium,
    });
    storage.upsert_knowledge_state(hist).unwrap();

    let engine = GapEngine::new(&storage, EngineConfig::default());
    let outcome = engine
        .remediation_plan_at("u1", &GapScope::All, fixed_now())
        .unwrap();

    let plan = &outcome.plan;
    assert!(!plan.steps.is_empty());
    // Misconceptions lead the plan.
    assert_eq!(plan.steps[0].gap_type, GapType::Misconception);
    assert_eq!(plan.steps[0].concept_id, "hist1");
    // Orders are 1-based and contiguous.
    for (i, step) in plan.steps.iter().enumerate() {
        assert_eq!(step.order, i + 1);
    }
    assert!(plan.estimated_total_time_minutes > 0.0);
    assert_eq!(outcome.gaps_total, plan.steps.len());
}

#[test]
fn test_remediation_plan_respects_chain_order_for_missing_gaps() {
    let storage = chain_store();
    let engine = GapEngine::new(&storage, EngineConfig::default());
    let outcome = engine
        .remediation_plan_at(
            "u1",
            &GapScope::Domains(vec!["math".to_string()]),
            fixed_now(),
        )
        .unwrap();

    let pos = |id: &str| {
        outcome
            .plan
            .steps
            .iter()
            .position(|s| s.concept_id == id)
            .unwrap_or_else(|| panic!("{id} missing from plan"))
    };
    assert!(pos("c1") < pos("c2"));
    assert!(pos("c2") < pos("c3"));
    assert_eq!(outcome.plan.priority_focus, Some(GapType::Missing));
}

#[test]
fn test_state_for_deleted_concept_is_ignored() {
    let storage = chain_store();
    storage
        .upsert_knowledge_state(state_reviewed("u1", "c1", 55.0, 0))
        .unwrap();
    storage.remove_concept("c1");

    let engine = GapEngine::new(&storage, EngineConfig::default());
    let report = engine
        .detect_gaps_at("u1", &GapScope::All, fixed_now())
        .unwrap();
    assert!(report.all_gaps().all(|g| g.concept_id != "c1"));
}

#[test]
fn test_review_queue_tiers_by_urgency() {
    let storage = chain_store();
    // A month stale: retention ~5%, urgent.
    storage
        .upsert_knowledge_state(state_reviewed("u1", "c1", 85.0, 30))
        .unwrap();
    // Five days: just past the ~3.6 day schedule, normal.
    storage
        .upsert_knowledge_state(state_reviewed("u1", "c2", 85.0, 5))
        .unwrap();
    // Below the review floor: never queued.
    storage
        .upsert_knowledge_state(state_reviewed("u1", "c3", 20.0, 30))
        .unwrap();

    let engine = GapEngine::new(&storage, EngineConfig::default());
    let queue = engine.review_queue_at("u1", fixed_now()).unwrap();

    assert_eq!(queue.stats.total_items, 2);
    assert_eq!(queue.stats.urgent, 1);
    assert_eq!(queue.stats.normal, 1);
    assert_eq!(queue.items[0].concept_id, "c1");
    assert_eq!(queue.items[0].priority, ReviewPriority::Urgent);
    assert_eq!(queue.items[1].concept_id, "c2");
    assert_eq!(queue.items[1].priority, ReviewPriority::Normal);
    assert!(queue.items[1].days_overdue > 0.0);
}

#[test]
fn test_fresh_review_is_not_queued() {
    let storage = chain_store();
    storage
        .upsert_knowledge_state(state_reviewed("u1", "c1", 85.0, 0))
        .unwrap();

    let engine = GapEngine::new(&storage, EngineConfig::default());
    let queue = engine.review_queue_at("u1", fixed_now()).unwrap();
    assert!(queue.items.is_empty());
}

#[test]
fn test_unknown_learner_is_not_found() {
    let storage = MemoryStorage::new();
    let engine = GapEngine::new(&storage, EngineConfig::default());
    let err = engine
        .detect_gaps_at("ghost", &GapScope::All, fixed_now())
        .unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));
}
