// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (C) 2025 Jonathan D.A. Jewell

//! Review Desk - Moderator workflow around a moderation backend
//!
//! A post moves through the desk in explicit steps:
//! - **submit**: validated, capped and stored as `pending`
//! - **analyze**: the backend produces a [`Verdict`] and the post is routed
//! - **decide**: a moderator approves, confirms, overrides, edits, moves or removes
//! - **report**: a member flags the post for another look
//!
//! Storage sits behind [`PostRepository`]; the backend behind
//! [`ModerationBackend`]. Every step lands in the audit log.

pub mod audit;
pub mod repository;
pub mod scenarios;
pub mod stats;

pub use audit::{AuditEntry, AuditEvent};
pub use repository::{InMemoryRepository, PostRepository};
pub use scenarios::{baseline_scenarios, Scenario, ScenarioHarness, ScenarioResult, ScenarioSummary};
pub use stats::ModerationStats;

use chrono::{DateTime, Utc};
use policy_classifier::{
    truncate_chars, BackendError, ModerationBackend, Post, RecommendedAction, Severity, Verdict,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Audit entry schema identifier
pub const AUDIT_SCHEMA: &str = "forum-moderation-audit-v1";

/// Longest post body the desk accepts, in characters
pub const DEFAULT_MAX_CONTENT_CHARS: usize = 20_000;

const DEFAULT_TITLE: &str = "Untitled Post";
const DEFAULT_REPORTER: &str = "Community Member";

// ============================================================================
// STORED POSTS
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Bucket {
    Pending,
    Approved,
    Flagged,
    Reported,
    Removed,
}

impl Bucket {
    pub fn all() -> &'static [Bucket] {
        &[
            Bucket::Pending,
            Bucket::Approved,
            Bucket::Flagged,
            Bucket::Reported,
            Bucket::Removed,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            Bucket::Pending => "pending",
            Bucket::Approved => "approved",
            Bucket::Flagged => "flagged",
            Bucket::Reported => "reported",
            Bucket::Removed => "removed",
        }
    }

    /// Where a fresh verdict sends a post
    fn for_verdict(verdict: &Verdict) -> Self {
        if verdict.is_flagged() {
            Bucket::Flagged
        } else {
            Bucket::Approved
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub reporter: String,
    pub reason: String,
    pub reported_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredPost {
    pub id: Uuid,

    pub post: Post,

    pub submitted_at: DateTime<Utc>,

    pub bucket: Bucket,

    /// Latest verdict, `None` until analyzed
    pub verdict: Option<Verdict>,

    /// Name of the backend that produced `verdict`
    pub backend: Option<String>,

    /// Moderator's reason when they overrode the backend
    pub human_override: Option<String>,

    pub reports: Vec<Report>,
}

impl StoredPost {
    pub fn new(post: Post) -> Self {
        Self {
            id: Uuid::new_v4(),
            post,
            submitted_at: Utc::now(),
            bucket: Bucket::Pending,
            verdict: None,
            backend: None,
            human_override: None,
            reports: Vec::new(),
        }
    }

    /// Verdict priority; unanalyzed posts sort as low
    pub fn priority(&self) -> Severity {
        self.verdict
            .as_ref()
            .map(|v| v.priority)
            .unwrap_or(Severity::Low)
    }
}

// ============================================================================
// DECISIONS
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "decision", rename_all = "lowercase")]
pub enum ModeratorDecision {
    /// Publish regardless of the verdict
    Approve,
    /// Accept the backend's routing
    Confirm,
    /// Reverse the backend's routing
    Override { reason: String },
    /// Replace the content and re-analyze
    Edit { content: String },
    /// Change board and re-analyze
    Move { board: String },
    Remove,
}

impl ModeratorDecision {
    pub fn label(&self) -> &'static str {
        match self {
            ModeratorDecision::Approve => "approve",
            ModeratorDecision::Confirm => "confirm",
            ModeratorDecision::Override { .. } => "override",
            ModeratorDecision::Edit { .. } => "edit",
            ModeratorDecision::Move { .. } => "move",
            ModeratorDecision::Remove => "remove",
        }
    }

    /// Reject decisions missing their payload before anything runs.
    pub fn validate(&self) -> Result<(), ReviewError> {
        let missing = match self {
            ModeratorDecision::Override { reason } if reason.trim().is_empty() => {
                "override needs a reason"
            }
            ModeratorDecision::Edit { content } if content.trim().is_empty() => {
                "edited content is empty"
            }
            ModeratorDecision::Move { board } if board.trim().is_empty() => {
                "target board is empty"
            }
            _ => return Ok(()),
        };
        Err(ReviewError::InvalidDecision(missing.to_string()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionOutcome {
    pub post_id: Uuid,
    pub decision: String,
    pub bucket: Bucket,
    pub verdict: Verdict,
}

/// A moderator disagreeing with the backend, kept as training data
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverrideRecord {
    pub post_id: Uuid,
    pub content: String,
    /// "flagged" or "clean", as the backend judged it
    pub backend_decision: String,
    pub reason: String,
    pub recorded_at: DateTime<Utc>,
}

// ============================================================================
// CONFIGURATION & ERRORS
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewConfig {
    pub max_content_chars: usize,
    pub default_title: String,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            max_content_chars: DEFAULT_MAX_CONTENT_CHARS,
            default_title: DEFAULT_TITLE.to_string(),
        }
    }
}

#[derive(Error, Debug)]
pub enum ReviewError {
    #[error("Post not found: {0}")]
    NotFound(Uuid),
    #[error("Invalid post: {0}")]
    InvalidPost(String),
    #[error("Invalid decision: {0}")]
    InvalidDecision(String),
    #[error("Invalid report: {0}")]
    InvalidReport(String),
    #[error("Backend failed: {0}")]
    Backend(#[from] BackendError),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

// ============================================================================
// REVIEW DESK
// ============================================================================

pub struct ReviewDesk<R, B> {
    repository: R,
    backend: B,
    config: ReviewConfig,
    stats: ModerationStats,
    overrides: Vec<OverrideRecord>,
    audit_log: Vec<AuditEntry>,
}

impl<B: ModerationBackend> ReviewDesk<InMemoryRepository, B> {
    pub fn in_memory(backend: B) -> Self {
        Self::new(InMemoryRepository::new(), backend)
    }
}

impl<R: PostRepository, B: ModerationBackend> ReviewDesk<R, B> {
    pub fn new(repository: R, backend: B) -> Self {
        Self::with_config(repository, backend, ReviewConfig::default())
    }

    pub fn with_config(repository: R, backend: B, config: ReviewConfig) -> Self {
        Self {
            repository,
            backend,
            config,
            stats: ModerationStats::default(),
            overrides: Vec::new(),
            audit_log: Vec::new(),
        }
    }

    /// Validate and store a post as pending.
    pub fn submit(&mut self, mut post: Post) -> Result<Uuid, ReviewError> {
        if post.content.trim().is_empty() {
            return Err(ReviewError::InvalidPost("content is empty".to_string()));
        }
        if post.username.trim().is_empty() {
            return Err(ReviewError::InvalidPost("username is empty".to_string()));
        }

        let chars = post.content.chars().count();
        if chars > self.config.max_content_chars {
            warn!(
                chars,
                max = self.config.max_content_chars,
                "truncating oversized post"
            );
            post.content = truncate_chars(&post.content, self.config.max_content_chars).to_string();
        }
        if post.title.as_deref().map_or(true, |t| t.trim().is_empty()) {
            post.title = Some(self.config.default_title.clone());
        }

        let stored = StoredPost::new(post);
        let id = stored.id;
        self.record(AuditEvent::Submitted, &stored, None);
        self.repository.insert(stored)?;
        debug!(%id, "post submitted");
        Ok(id)
    }

    /// Run the backend and route the post by its verdict.
    ///
    /// Reported and removed posts keep their bucket; a moderator moves them.
    pub fn analyze(&mut self, id: Uuid) -> Result<Verdict, ReviewError> {
        let mut stored = self.load(id)?;
        let verdict = self.run_backend(&mut stored)?;
        if !matches!(stored.bucket, Bucket::Reported | Bucket::Removed) {
            stored.bucket = Bucket::for_verdict(&verdict);
        }
        self.record(AuditEvent::Analyzed, &stored, None);
        self.repository.update(stored)?;
        Ok(verdict)
    }

    pub fn decide(
        &mut self,
        id: Uuid,
        decision: ModeratorDecision,
    ) -> Result<DecisionOutcome, ReviewError> {
        decision.validate()?;
        let mut stored = self.load(id)?;
        if stored.bucket == Bucket::Removed {
            return Err(ReviewError::InvalidDecision(format!(
                "post {} has been removed",
                id
            )));
        }

        let verdict = match &decision {
            ModeratorDecision::Edit { content } => {
                stored.post.content =
                    truncate_chars(content, self.config.max_content_chars).to_string();
                let verdict = self.run_backend(&mut stored)?;
                stored.bucket = Bucket::for_verdict(&verdict);
                verdict
            }
            ModeratorDecision::Move { board } => {
                stored.post.board = board.trim().to_string();
                let verdict = self.run_backend(&mut stored)?;
                stored.bucket = Bucket::for_verdict(&verdict);
                verdict
            }
            other => {
                let verdict = match stored.verdict.clone() {
                    Some(verdict) => verdict,
                    None => self.run_backend(&mut stored)?,
                };
                self.apply_judgment(&mut stored, &verdict, other);
                verdict
            }
        };

        info!(
            post_id = %id,
            decision = decision.label(),
            bucket = %stored.bucket,
            "moderator decision"
        );
        self.record(AuditEvent::Decided, &stored, Some(decision.label()));
        let bucket = stored.bucket;
        self.repository.update(stored)?;

        Ok(DecisionOutcome {
            post_id: id,
            decision: decision.label().to_string(),
            bucket,
            verdict,
        })
    }

    /// Member report. Sends the post back to the moderator queue.
    pub fn report(&mut self, id: Uuid, reporter: &str, reason: &str) -> Result<(), ReviewError> {
        if reason.trim().is_empty() {
            return Err(ReviewError::InvalidReport("reason is empty".to_string()));
        }
        let mut stored = self.load(id)?;
        if stored.bucket == Bucket::Removed {
            return Err(ReviewError::InvalidReport(format!(
                "post {} has been removed",
                id
            )));
        }

        let reporter = match reporter.trim() {
            "" => DEFAULT_REPORTER,
            name => name,
        };
        stored.reports.push(Report {
            reporter: reporter.to_string(),
            reason: reason.trim().to_string(),
            reported_at: Utc::now(),
        });
        stored.bucket = Bucket::Reported;

        info!(post_id = %id, reporter, reports = stored.reports.len(), "post reported");
        self.record(AuditEvent::Reported, &stored, None);
        self.repository.update(stored)
    }

    /// Posts in `bucket`, most urgent first, then oldest first.
    pub fn queue(&self, bucket: Bucket) -> Result<Vec<StoredPost>, ReviewError> {
        let mut posts = self.repository.list(bucket)?;
        posts.sort_by(|a, b| {
            b.priority()
                .cmp(&a.priority())
                .then(a.submitted_at.cmp(&b.submitted_at))
        });
        Ok(posts)
    }

    pub fn get(&self, id: Uuid) -> Result<StoredPost, ReviewError> {
        self.load(id)
    }

    pub fn stats(&self) -> &ModerationStats {
        &self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats.reset();
    }

    pub fn overrides(&self) -> &[OverrideRecord] {
        &self.overrides
    }

    pub fn audit_log(&self) -> &[AuditEntry] {
        &self.audit_log
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    // ============ internals ============

    fn load(&self, id: Uuid) -> Result<StoredPost, ReviewError> {
        self.repository.get(id)?.ok_or(ReviewError::NotFound(id))
    }

    fn run_backend(&mut self, stored: &mut StoredPost) -> Result<Verdict, ReviewError> {
        let verdict = self.backend.analyze(&stored.post)?;
        self.stats.record_verdict(&verdict);
        info!(
            post_id = %stored.id,
            backend = self.backend.name(),
            status = ?verdict.status,
            priority = %verdict.priority,
            violations = verdict.violations.len(),
            "post analyzed"
        );
        stored.verdict = Some(verdict.clone());
        stored.backend = Some(self.backend.name().to_string());
        Ok(verdict)
    }

    /// Approve, confirm, override or remove against an existing verdict.
    fn apply_judgment(
        &mut self,
        stored: &mut StoredPost,
        verdict: &Verdict,
        decision: &ModeratorDecision,
    ) {
        match decision {
            ModeratorDecision::Approve => {
                stored.bucket = Bucket::Approved;
                if verdict.is_flagged() {
                    self.stats.human_override += 1;
                } else {
                    self.stats.ai_accepted += 1;
                }
            }
            ModeratorDecision::Confirm => {
                stored.bucket = Bucket::for_verdict(verdict);
                self.stats.ai_accepted += 1;
            }
            ModeratorDecision::Override { reason } => {
                let reason = reason.trim();
                let backend_decision = if verdict.is_flagged() { "flagged" } else { "clean" };
                stored.bucket = if verdict.is_flagged() {
                    Bucket::Approved
                } else {
                    Bucket::Flagged
                };
                stored.human_override = Some(reason.to_string());
                self.overrides.push(OverrideRecord {
                    post_id: stored.id,
                    content: stored.post.content.clone(),
                    backend_decision: backend_decision.to_string(),
                    reason: reason.to_string(),
                    recorded_at: Utc::now(),
                });
                self.stats.human_override += 1;
            }
            ModeratorDecision::Remove => {
                stored.bucket = Bucket::Removed;
                if verdict.recommended_action == RecommendedAction::Remove {
                    self.stats.ai_accepted += 1;
                } else {
                    self.stats.human_override += 1;
                }
            }
            ModeratorDecision::Edit { .. } | ModeratorDecision::Move { .. } => {}
        }
    }

    fn record(&mut self, event: AuditEvent, stored: &StoredPost, decision: Option<&str>) {
        let entry = AuditEntry::from_post(event, stored, decision);
        entry.emit();
        self.audit_log.push(entry);
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use llm_analyst::{LlmAnalyst, ReplayClient};
    use policy_classifier::{Classifier, ViolationKind};

    fn desk() -> ReviewDesk<InMemoryRepository, Classifier> {
        ReviewDesk::in_memory(Classifier::with_forum_defaults())
    }

    fn submit(desk: &mut ReviewDesk<InMemoryRepository, Classifier>, content: &str, board: &str) -> Uuid {
        desk.submit(Post::new(content, board, "member1")).unwrap()
    }

    #[test]
    fn test_submit_stores_pending_with_default_title() {
        let mut desk = desk();
        let id = submit(&mut desk, "Any tips for pricing stamps?", "Selling");

        let stored = desk.get(id).unwrap();
        assert_eq!(stored.bucket, Bucket::Pending);
        assert_eq!(stored.post.title.as_deref(), Some("Untitled Post"));
        assert!(stored.verdict.is_none());
        assert_eq!(desk.audit_log().len(), 1);
        assert_eq!(desk.audit_log()[0].event, AuditEvent::Submitted);
    }

    #[test]
    fn test_submit_rejects_empty_content_and_username() {
        let mut desk = desk();
        assert!(matches!(
            desk.submit(Post::new("   ", "Selling", "member1")),
            Err(ReviewError::InvalidPost(_))
        ));
        assert!(matches!(
            desk.submit(Post::new("hello", "Selling", "")),
            Err(ReviewError::InvalidPost(_))
        ));
        assert!(desk.repository().is_empty());
    }

    #[test]
    fn test_submit_truncates_long_content() {
        let config = ReviewConfig {
            max_content_chars: 10,
            ..Default::default()
        };
        let mut desk = ReviewDesk::with_config(
            InMemoryRepository::new(),
            Classifier::with_forum_defaults(),
            config,
        );
        let id = desk
            .submit(Post::new("é".repeat(25), "General Discussion", "member1"))
            .unwrap();
        assert_eq!(desk.get(id).unwrap().post.content.chars().count(), 10);
    }

    #[test]
    fn test_analyze_routes_by_verdict() {
        let mut desk = desk();
        let clean = submit(&mut desk, "What's the best way to price vintage stamps?", "Selling");
        let flagged = submit(&mut desk, "Call me at 02012345678", "Selling");

        assert!(!desk.analyze(clean).unwrap().is_flagged());
        assert!(desk.analyze(flagged).unwrap().is_flagged());

        assert_eq!(desk.get(clean).unwrap().bucket, Bucket::Approved);
        let stored = desk.get(flagged).unwrap();
        assert_eq!(stored.bucket, Bucket::Flagged);
        assert_eq!(stored.backend.as_deref(), Some("rules"));

        let stats = desk.stats();
        assert_eq!(stats.total_analyzed, 2);
        assert_eq!(stats.violations_found, 1);
        assert_eq!(stats.clean_posts, 1);
        assert_eq!(stats.critical, 1);
    }

    #[test]
    fn test_analyze_unknown_post() {
        let mut desk = desk();
        let id = Uuid::new_v4();
        assert!(matches!(desk.analyze(id), Err(ReviewError::NotFound(x)) if x == id));
    }

    #[test]
    fn test_confirm_and_approve_count_acceptance() {
        let mut desk = desk();
        let flagged = submit(&mut desk, "Check out amazon.com for better deals!", "Selling");
        let clean = submit(&mut desk, "Any tips for pricing stamps?", "Selling");
        desk.analyze(flagged).unwrap();

        let outcome = desk.decide(flagged, ModeratorDecision::Confirm).unwrap();
        assert_eq!(outcome.bucket, Bucket::Flagged);
        assert_eq!(outcome.decision, "confirm");

        // Never analyzed: the decision analyzes it first
        let outcome = desk.decide(clean, ModeratorDecision::Approve).unwrap();
        assert_eq!(outcome.bucket, Bucket::Approved);
        assert_eq!(desk.stats().total_analyzed, 2);
        assert_eq!(desk.stats().ai_accepted, 2);
        assert_eq!(desk.stats().human_override, 0);
    }

    #[test]
    fn test_approving_flagged_post_is_an_override() {
        let mut desk = desk();
        let id = submit(&mut desk, "Seller johndoe123 is a total scammer, avoid!", "Buying");
        desk.analyze(id).unwrap();
        desk.decide(id, ModeratorDecision::Approve).unwrap();
        assert_eq!(desk.stats().human_override, 1);
        assert_eq!(desk.stats().acceptance_rate(), Some(0));
    }

    #[test]
    fn test_override_flips_routing_and_logs_training_record() {
        let mut desk = desk();
        let id = submit(&mut desk, "Call me at 02012345678", "Selling");
        desk.analyze(id).unwrap();

        let outcome = desk
            .decide(
                id,
                ModeratorDecision::Override {
                    reason: "Official store helpline".to_string(),
                },
            )
            .unwrap();
        assert_eq!(outcome.bucket, Bucket::Approved);

        let stored = desk.get(id).unwrap();
        assert_eq!(stored.human_override.as_deref(), Some("Official store helpline"));
        let records = desk.overrides();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].backend_decision, "flagged");
        assert_eq!(records[0].content, "Call me at 02012345678");
        assert_eq!(desk.stats().human_override, 1);
    }

    #[test]
    fn test_override_of_clean_post_flags_it() {
        let mut desk = desk();
        let id = submit(&mut desk, "Lovely weather for a car boot sale", "General Discussion");
        desk.analyze(id).unwrap();
        let outcome = desk
            .decide(
                id,
                ModeratorDecision::Override {
                    reason: "Coded harassment".to_string(),
                },
            )
            .unwrap();
        assert_eq!(outcome.bucket, Bucket::Flagged);
        assert_eq!(desk.overrides()[0].backend_decision, "clean");
    }

    #[test]
    fn test_override_requires_reason() {
        let mut desk = desk();
        let id = submit(&mut desk, "Call me at 02012345678", "Selling");
        desk.analyze(id).unwrap();
        assert!(matches!(
            desk.decide(id, ModeratorDecision::Override { reason: " ".to_string() }),
            Err(ReviewError::InvalidDecision(_))
        ));
        assert!(desk.overrides().is_empty());
        assert_eq!(desk.get(id).unwrap().bucket, Bucket::Flagged);
    }

    #[test]
    fn test_rejected_decision_on_unanalyzed_post_leaves_stats_alone() {
        let mut desk = desk();
        let id = submit(&mut desk, "Call me at 02012345678", "Selling");

        for _ in 0..2 {
            assert!(matches!(
                desk.decide(id, ModeratorDecision::Override { reason: " ".to_string() }),
                Err(ReviewError::InvalidDecision(_))
            ));
        }
        assert!(matches!(
            desk.decide(id, ModeratorDecision::Edit { content: String::new() }),
            Err(ReviewError::InvalidDecision(_))
        ));

        assert_eq!(desk.stats(), &ModerationStats::default());
        let stored = desk.get(id).unwrap();
        assert!(stored.verdict.is_none());
        assert_eq!(stored.bucket, Bucket::Pending);
        assert_eq!(desk.audit_log().len(), 1);
    }

    #[test]
    fn test_edit_reanalyzes() {
        let mut desk = desk();
        let id = submit(&mut desk, "Call me at 02012345678", "Selling");
        desk.analyze(id).unwrap();

        let outcome = desk
            .decide(
                id,
                ModeratorDecision::Edit {
                    content: "Call me at [removed]".to_string(),
                },
            )
            .unwrap();
        assert!(!outcome.verdict.is_flagged());
        assert_eq!(outcome.bucket, Bucket::Approved);
        assert_eq!(desk.get(id).unwrap().post.content, "Call me at [removed]");
        assert_eq!(desk.stats().total_analyzed, 2);
    }

    #[test]
    fn test_move_reanalyzes_on_new_board() {
        let mut desk = desk();
        let id = submit(&mut desk, "My app crashes on login", "Selling");
        let verdict = desk.analyze(id).unwrap();
        assert_eq!(
            verdict.recommended_action,
            RecommendedAction::Move {
                board: "Technical Issues".to_string()
            }
        );

        let outcome = desk
            .decide(
                id,
                ModeratorDecision::Move {
                    board: "Technical Issues".to_string(),
                },
            )
            .unwrap();
        assert!(!outcome.verdict.has(ViolationKind::WrongBoard));
        assert_eq!(outcome.bucket, Bucket::Approved);
        assert_eq!(desk.get(id).unwrap().post.board, "Technical Issues");
    }

    #[test]
    fn test_move_to_unknown_board_is_allowed() {
        let mut desk = desk();
        let id = submit(&mut desk, "My app crashes on login", "Selling");
        let outcome = desk
            .decide(
                id,
                ModeratorDecision::Move {
                    board: "Collectables".to_string(),
                },
            )
            .unwrap();
        assert!(!outcome.verdict.has(ViolationKind::WrongBoard));
    }

    #[test]
    fn test_remove_counts_against_recommendation() {
        let mut desk = desk();
        let spam = submit(&mut desk, "Check out amazon.com for better deals!", "Selling");
        let pii = submit(&mut desk, "Call me at 02012345678", "Selling");
        desk.analyze(spam).unwrap();
        desk.analyze(pii).unwrap();

        desk.decide(spam, ModeratorDecision::Remove).unwrap();
        desk.decide(pii, ModeratorDecision::Remove).unwrap();
        assert_eq!(desk.stats().ai_accepted, 1);
        assert_eq!(desk.stats().human_override, 1);
        assert_eq!(desk.queue(Bucket::Removed).unwrap().len(), 2);
    }

    #[test]
    fn test_removed_posts_are_final() {
        let mut desk = desk();
        let id = submit(&mut desk, "Check out amazon.com for better deals!", "Selling");
        desk.decide(id, ModeratorDecision::Remove).unwrap();

        assert!(matches!(
            desk.decide(id, ModeratorDecision::Approve),
            Err(ReviewError::InvalidDecision(_))
        ));
        assert!(matches!(
            desk.report(id, "member2", "spam"),
            Err(ReviewError::InvalidReport(_))
        ));
        // Re-analysis keeps it removed
        desk.analyze(id).unwrap();
        assert_eq!(desk.get(id).unwrap().bucket, Bucket::Removed);
    }

    #[test]
    fn test_report_moves_post_to_reported() {
        let mut desk = desk();
        let id = submit(&mut desk, "Any tips for pricing stamps?", "Selling");
        desk.analyze(id).unwrap();

        desk.report(id, "", "Looks like a scam").unwrap();
        let stored = desk.get(id).unwrap();
        assert_eq!(stored.bucket, Bucket::Reported);
        assert_eq!(stored.reports[0].reporter, "Community Member");
        assert_eq!(stored.reports[0].reason, "Looks like a scam");

        // Analysis leaves reported posts for the moderator
        desk.analyze(id).unwrap();
        assert_eq!(desk.get(id).unwrap().bucket, Bucket::Reported);

        desk.decide(id, ModeratorDecision::Confirm).unwrap();
        assert_eq!(desk.get(id).unwrap().bucket, Bucket::Approved);
    }

    #[test]
    fn test_report_requires_reason() {
        let mut desk = desk();
        let id = submit(&mut desk, "Any tips for pricing stamps?", "Selling");
        assert!(matches!(
            desk.report(id, "member2", ""),
            Err(ReviewError::InvalidReport(_))
        ));
        assert!(matches!(
            desk.report(Uuid::new_v4(), "member2", "spam"),
            Err(ReviewError::NotFound(_))
        ));
    }

    #[test]
    fn test_queue_orders_by_priority_then_age() {
        let mut desk = desk();
        let medium = submit(&mut desk, "My app crashes on login", "Selling");
        let critical = submit(&mut desk, "Call me at 02012345678", "Selling");
        let high_old = submit(&mut desk, "Check out amazon.com for better deals!", "Selling");
        let high_new = submit(&mut desk, "You're all idiots", "General Discussion");
        for id in [medium, critical, high_old, high_new] {
            desk.analyze(id).unwrap();
        }

        let order: Vec<Uuid> = desk
            .queue(Bucket::Flagged)
            .unwrap()
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(order, vec![critical, high_old, high_new, medium]);
    }

    #[test]
    fn test_audit_log_tracks_every_step() {
        let mut desk = desk();
        let id = submit(&mut desk, "Call me at 02012345678", "Selling");
        desk.analyze(id).unwrap();
        desk.decide(id, ModeratorDecision::Confirm).unwrap();
        desk.report(id, "member2", "phone number").unwrap();

        let events: Vec<AuditEvent> = desk.audit_log().iter().map(|e| e.event).collect();
        assert_eq!(
            events,
            vec![
                AuditEvent::Submitted,
                AuditEvent::Analyzed,
                AuditEvent::Decided,
                AuditEvent::Reported
            ]
        );
        assert_eq!(desk.audit_log()[2].decision.as_deref(), Some("confirm"));
        assert!(desk.audit_log().iter().all(|e| e.post_id == id));
    }

    #[test]
    fn test_reset_stats() {
        let mut desk = desk();
        let id = submit(&mut desk, "Call me at 02012345678", "Selling");
        desk.analyze(id).unwrap();
        desk.reset_stats();
        assert_eq!(desk.stats(), &ModerationStats::default());
    }

    #[test]
    fn test_llm_backend_swaps_in() {
        let reply = "VIOLATIONS: Yes\n- TYPE: Naming & Shaming\n- SEVERITY: High\n\
                     - EVIDENCE: \"johndoe123 is a scammer\"\n- CONFIDENCE: 88%";
        let mut desk = ReviewDesk::in_memory(LlmAnalyst::new(ReplayClient::new(reply)));
        let id = desk
            .submit(Post::new("johndoe123 is a scammer", "Buying", "member1"))
            .unwrap();

        let verdict = desk.analyze(id).unwrap();
        assert!(verdict.has(ViolationKind::NamingAndShaming));
        assert_eq!(verdict.confidence, 88);
        assert_eq!(desk.get(id).unwrap().backend.as_deref(), Some("llm"));
    }

    #[test]
    fn test_backend_failure_leaves_post_pending() {
        let mut desk = ReviewDesk::in_memory(LlmAnalyst::new(ReplayClient::new("not sure")));
        let id = desk
            .submit(Post::new("hello there", "General Discussion", "member1"))
            .unwrap();
        assert!(matches!(
            desk.analyze(id),
            Err(ReviewError::Backend(BackendError::MalformedResponse(_)))
        ));
        let stored = desk.get(id).unwrap();
        assert_eq!(stored.bucket, Bucket::Pending);
        assert!(stored.verdict.is_none());
        assert_eq!(desk.stats().total_analyzed, 0);
    }

    #[test]
    fn test_decision_serializes_with_tag() {
        let json = serde_json::to_string(&ModeratorDecision::Move {
            board: "Technical Issues".to_string(),
        })
        .unwrap();
        assert_eq!(json, r#"{"decision":"move","board":"Technical Issues"}"#);
        let back: ModeratorDecision = serde_json::from_str(r#"{"decision":"remove"}"#).unwrap();
        assert_eq!(back, ModeratorDecision::Remove);
    }
}
