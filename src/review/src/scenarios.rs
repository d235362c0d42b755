// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (C) 2025 Jonathan D.A. Jewell

//! Scenario harness: run known posts through a backend and compare the
//! verdicts with what the board usage policy expects.

use policy_classifier::{ModerationBackend, Post, RecommendedAction, Severity, Status, ViolationKind};
use serde::{Deserialize, Serialize};
use std::time::Instant;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,

    pub description: String,

    pub post: Post,

    pub expected_status: Status,

    pub expected_priority: Option<Severity>,

    /// Kinds that must be present (others may also appear)
    pub expected_kinds: Vec<ViolationKind>,

    /// Kinds that must not be present
    pub forbidden_kinds: Vec<ViolationKind>,

    pub expected_confidence: Option<u8>,

    pub expected_action: Option<RecommendedAction>,
}

impl Scenario {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        post: Post,
        expected_status: Status,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            post,
            expected_status,
            expected_priority: None,
            expected_kinds: Vec::new(),
            forbidden_kinds: Vec::new(),
            expected_confidence: None,
            expected_action: None,
        }
    }

    pub fn expect_priority(mut self, priority: Severity) -> Self {
        self.expected_priority = Some(priority);
        self
    }

    pub fn expect_kind(mut self, kind: ViolationKind) -> Self {
        self.expected_kinds.push(kind);
        self
    }

    pub fn forbid_kind(mut self, kind: ViolationKind) -> Self {
        self.forbidden_kinds.push(kind);
        self
    }

    pub fn expect_confidence(mut self, confidence: u8) -> Self {
        self.expected_confidence = Some(confidence);
        self
    }

    pub fn expect_action(mut self, action: RecommendedAction) -> Self {
        self.expected_action = Some(action);
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub name: String,

    pub passed: bool,

    pub actual_status: Option<Status>,

    pub actual_priority: Option<Severity>,

    pub actual_kinds: Vec<ViolationKind>,

    /// Every mismatch, or the backend error
    pub failures: Vec<String>,

    pub duration_us: u64,
}

pub struct ScenarioHarness<B> {
    backend: B,
    results: Vec<ScenarioResult>,
}

impl<B: ModerationBackend> ScenarioHarness<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            results: Vec::new(),
        }
    }

    pub fn run(&mut self, scenario: &Scenario) -> ScenarioResult {
        let start = Instant::now();

        let result = match self.backend.analyze(&scenario.post) {
            Ok(verdict) => {
                let mut failures = Vec::new();

                if verdict.status != scenario.expected_status {
                    failures.push(format!(
                        "status: expected {:?}, got {:?}",
                        scenario.expected_status, verdict.status
                    ));
                }
                if let Some(expected) = scenario.expected_priority {
                    if verdict.priority != expected {
                        failures.push(format!(
                            "priority: expected {}, got {}",
                            expected, verdict.priority
                        ));
                    }
                }
                for kind in &scenario.expected_kinds {
                    if !verdict.has(*kind) {
                        failures.push(format!("missing violation {}", kind));
                    }
                }
                for kind in &scenario.forbidden_kinds {
                    if verdict.has(*kind) {
                        failures.push(format!("unexpected violation {}", kind));
                    }
                }
                if let Some(expected) = scenario.expected_confidence {
                    if verdict.confidence != expected {
                        failures.push(format!(
                            "confidence: expected {}, got {}",
                            expected, verdict.confidence
                        ));
                    }
                }
                if let Some(expected) = &scenario.expected_action {
                    if &verdict.recommended_action != expected {
                        failures.push(format!(
                            "action: expected {}, got {}",
                            expected, verdict.recommended_action
                        ));
                    }
                }

                ScenarioResult {
                    name: scenario.name.clone(),
                    passed: failures.is_empty(),
                    actual_status: Some(verdict.status),
                    actual_priority: Some(verdict.priority),
                    actual_kinds: verdict.kinds(),
                    failures,
                    duration_us: start.elapsed().as_micros() as u64,
                }
            }
            Err(e) => ScenarioResult {
                name: scenario.name.clone(),
                passed: false,
                actual_status: None,
                actual_priority: None,
                actual_kinds: Vec::new(),
                failures: vec![e.to_string()],
                duration_us: start.elapsed().as_micros() as u64,
            },
        };

        self.results.push(result.clone());
        result
    }

    pub fn run_all(&mut self, scenarios: &[Scenario]) -> Vec<ScenarioResult> {
        scenarios.iter().map(|s| self.run(s)).collect()
    }

    pub fn summary(&self) -> ScenarioSummary {
        let passed = self.results.iter().filter(|r| r.passed).count();
        ScenarioSummary {
            total: self.results.len(),
            passed,
            failed: self.results.len() - passed,
            total_duration_us: self.results.iter().map(|r| r.duration_us).sum(),
            results: self.results.clone(),
        }
    }

    pub fn clear(&mut self) {
        self.results.clear();
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub total_duration_us: u64,
    pub results: Vec<ScenarioResult>,
}

impl ScenarioSummary {
    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }

    pub fn failed_scenarios(&self) -> Vec<&str> {
        self.results
            .iter()
            .filter(|r| !r.passed)
            .map(|r| r.name.as_str())
            .collect()
    }
}

/// Reference posts every rule-based build must get right.
pub fn baseline_scenarios() -> Vec<Scenario> {
    vec![
        Scenario::new(
            "phone_number",
            "UK landline in the body is personal information",
            Post::new("Call me at 02012345678", "Selling", "u1"),
            Status::Flagged,
        )
        .expect_kind(ViolationKind::PiiPhone)
        .expect_priority(Severity::Critical)
        .expect_confidence(100),
        Scenario::new(
            "naming_and_shaming",
            "Named seller plus negative language",
            Post::new("Seller johndoe123 is a total scammer, avoid!", "Buying", "u1"),
            Status::Flagged,
        )
        .expect_kind(ViolationKind::NamingAndShaming)
        .expect_priority(Severity::High),
        Scenario::new(
            "insult_and_profanity",
            "Insult ranks above profanity",
            Post::new("You're all idiots, this is sh*t", "General Discussion", "u1"),
            Status::Flagged,
        )
        .expect_kind(ViolationKind::DisrespectInsult)
        .expect_kind(ViolationKind::DisrespectProfanity)
        .expect_priority(Severity::High),
        Scenario::new(
            "wrong_board",
            "Technical question posted to Selling",
            Post::new("My app crashes on login", "Selling", "u1"),
            Status::Flagged,
        )
        .expect_kind(ViolationKind::WrongBoard)
        .expect_priority(Severity::Medium)
        .expect_action(RecommendedAction::Move {
            board: "Technical Issues".to_string(),
        }),
        Scenario::new(
            "competitor_link",
            "Link to another marketplace",
            Post::new("Check out amazon.com for better deals!", "Selling", "u1"),
            Status::Flagged,
        )
        .expect_kind(ViolationKind::SpamExternalLink)
        .expect_priority(Severity::High)
        .expect_action(RecommendedAction::Remove),
        Scenario::new(
            "clean_question",
            "Ordinary on-topic question",
            Post::new("What's the best way to price vintage stamps?", "Selling", "u1"),
            Status::Clean,
        )
        .expect_confidence(95)
        .expect_action(RecommendedAction::None),
        Scenario::new(
            "postcode_without_context",
            "Postcode-shaped token with no address keyword",
            Post::new("Is the AB1 2CD model any good?", "General Discussion", "u1"),
            Status::Clean,
        )
        .forbid_kind(ViolationKind::PiiAddress),
        Scenario::new(
            "blank_post",
            "Whitespace-only content",
            Post::new("   ", "Selling", "u1"),
            Status::Clean,
        )
        .expect_confidence(95),
        Scenario::new(
            "unknown_board",
            "Unrecognized board skips placement but not PII",
            Post::new("My app crashes, email me at help@example.com", "Collectables", "u1"),
            Status::Flagged,
        )
        .expect_kind(ViolationKind::PiiEmail)
        .forbid_kind(ViolationKind::WrongBoard),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use llm_analyst::{LlmAnalyst, ReplayClient};
    use policy_classifier::Classifier;

    #[test]
    fn test_baseline_passes_with_rules() {
        let mut harness = ScenarioHarness::new(Classifier::with_forum_defaults());
        harness.run_all(&baseline_scenarios());
        let summary = harness.summary();
        assert!(
            summary.all_passed(),
            "failed: {:?}",
            summary
                .results
                .iter()
                .filter(|r| !r.passed)
                .collect::<Vec<_>>()
        );
        assert_eq!(summary.total, baseline_scenarios().len());
    }

    #[test]
    fn test_mismatches_are_reported() {
        let scenario = Scenario::new(
            "wrong_expectation",
            "Clean post expected to be flagged",
            Post::new("Lovely weather today", "General Discussion", "u1"),
            Status::Flagged,
        )
        .expect_kind(ViolationKind::PiiEmail);

        let mut harness = ScenarioHarness::new(Classifier::with_forum_defaults());
        let result = harness.run(&scenario);
        assert!(!result.passed);
        assert_eq!(result.failures.len(), 2);
        assert_eq!(harness.summary().failed_scenarios(), vec!["wrong_expectation"]);
    }

    #[test]
    fn test_backend_errors_fail_the_scenario() {
        let backend = LlmAnalyst::new(ReplayClient::new("no idea"));
        let mut harness = ScenarioHarness::new(backend);
        let result = harness.run(&baseline_scenarios()[0]);
        assert!(!result.passed);
        assert!(result.actual_status.is_none());
        assert!(result.failures[0].contains("Malformed"));
    }

    #[test]
    fn test_clear_resets_results() {
        let mut harness = ScenarioHarness::new(Classifier::with_forum_defaults());
        harness.run(&baseline_scenarios()[0]);
        harness.clear();
        assert_eq!(harness.summary().total, 0);
    }
}
