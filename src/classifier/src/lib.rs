// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (C) 2025 Jonathan D.A. Jewell

//! Policy Classifier - Deterministic moderation rules for forum posts
//!
//! The classifier checks a post against the board usage policy without ML.
//! It catches contact details, naming and shaming, disrespectful language,
//! misplaced posts, competitor links and fee avoidance, and folds the
//! findings into a single [`Verdict`] a moderator can act on.
//!
//! Classification is a pure function of `(content, board, username)`: no
//! I/O, no logging, no hidden state. Every input maps to some verdict.

mod detectors;
pub mod rules;

pub use rules::{
    BoardRules, BoardTopics, DomainRules, NamedPattern, NamingRules, PatternListRules,
    PhraseRules, PiiRules, RuleSet, WordListRules,
};

use detectors::CompiledRules;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;
use thiserror::Error;

// ============ Core Types ============

/// A forum post as submitted by a member.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Post {
    pub content: String,
    pub board: String,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl Post {
    pub fn new(
        content: impl Into<String>,
        board: impl Into<String>,
        username: impl Into<String>,
    ) -> Self {
        Self {
            content: content.into(),
            board: board.into(),
            username: username.into(),
            title: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ViolationKind {
    #[serde(rename = "PII-Phone")]
    PiiPhone,
    #[serde(rename = "PII-Email")]
    PiiEmail,
    #[serde(rename = "PII-Address")]
    PiiAddress,
    #[serde(rename = "NamingAndShaming")]
    NamingAndShaming,
    #[serde(rename = "Disrespect-Profanity")]
    DisrespectProfanity,
    #[serde(rename = "Disrespect-Insult")]
    DisrespectInsult,
    #[serde(rename = "WrongBoard")]
    WrongBoard,
    #[serde(rename = "Spam-ExternalLink")]
    SpamExternalLink,
    #[serde(rename = "FeeAvoidance")]
    FeeAvoidance,
    #[serde(rename = "ModerationDiscussion")]
    ModerationDiscussion,
}

impl ViolationKind {
    /// Every kind, in pipeline order.
    pub fn all() -> &'static [ViolationKind] {
        &[
            ViolationKind::PiiPhone,
            ViolationKind::PiiEmail,
            ViolationKind::PiiAddress,
            ViolationKind::NamingAndShaming,
            ViolationKind::DisrespectProfanity,
            ViolationKind::DisrespectInsult,
            ViolationKind::WrongBoard,
            ViolationKind::SpamExternalLink,
            ViolationKind::FeeAvoidance,
            ViolationKind::ModerationDiscussion,
        ]
    }

    /// Wire name, identical to the serde representation
    pub fn label(&self) -> &'static str {
        match self {
            ViolationKind::PiiPhone => "PII-Phone",
            ViolationKind::PiiEmail => "PII-Email",
            ViolationKind::PiiAddress => "PII-Address",
            ViolationKind::NamingAndShaming => "NamingAndShaming",
            ViolationKind::DisrespectProfanity => "Disrespect-Profanity",
            ViolationKind::DisrespectInsult => "Disrespect-Insult",
            ViolationKind::WrongBoard => "WrongBoard",
            ViolationKind::SpamExternalLink => "Spam-ExternalLink",
            ViolationKind::FeeAvoidance => "FeeAvoidance",
            ViolationKind::ModerationDiscussion => "ModerationDiscussion",
        }
    }

    /// Severity is fixed per kind. Insults outrank profanity.
    pub fn severity(&self) -> Severity {
        match self {
            ViolationKind::PiiPhone | ViolationKind::PiiEmail | ViolationKind::PiiAddress => {
                Severity::Critical
            }
            ViolationKind::NamingAndShaming
            | ViolationKind::DisrespectInsult
            | ViolationKind::SpamExternalLink
            | ViolationKind::FeeAvoidance => Severity::High,
            ViolationKind::DisrespectProfanity
            | ViolationKind::WrongBoard
            | ViolationKind::ModerationDiscussion => Severity::Medium,
        }
    }

    /// Human-readable policy name shown to moderators
    pub fn policy_reference(&self) -> &'static str {
        match self {
            ViolationKind::PiiPhone => "Personal Information: phone numbers",
            ViolationKind::PiiEmail => "Personal Information: email addresses",
            ViolationKind::PiiAddress => "Personal Information: postal addresses",
            ViolationKind::NamingAndShaming => "Naming & Shaming",
            ViolationKind::DisrespectProfanity => "Disrespectful Language: profanity",
            ViolationKind::DisrespectInsult => "Disrespectful Language: personal insults",
            ViolationKind::WrongBoard => "Board Placement",
            ViolationKind::SpamExternalLink => "Spam & Advertising: external marketplaces",
            ViolationKind::FeeAvoidance => "Fee Avoidance: off-platform payment",
            ViolationKind::ModerationDiscussion => "Discussing Moderation Actions",
        }
    }
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ViolationKind {
    type Err = ClassifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        ViolationKind::all()
            .iter()
            .copied()
            .find(|k| k.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ClassifierError::UnknownKind(s.to_string()))
    }
}

/// Ordered from least to most urgent, so `max()` picks the priority.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    pub kind: ViolationKind,
    pub confidence: u8,
    pub evidence: String,
    pub severity: Severity,
    pub policy_reference: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_details: Option<String>,
}

impl Violation {
    /// Severity and policy reference are derived from `kind`.
    pub fn new(kind: ViolationKind, confidence: u8, evidence: impl Into<String>) -> Self {
        Self {
            kind,
            confidence: confidence.min(100),
            evidence: evidence.into(),
            severity: kind.severity(),
            policy_reference: kind.policy_reference().to_string(),
            action_details: None,
        }
    }

    pub fn with_action_details(mut self, details: impl Into<String>) -> Self {
        self.action_details = Some(details.into());
        self
    }
}

// ============ Verdict ============

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Clean,
    Flagged,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RecommendedAction {
    None,
    Edit,
    Remove,
    Move { board: String },
}

impl RecommendedAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecommendedAction::None => "none",
            RecommendedAction::Edit => "edit",
            RecommendedAction::Remove => "remove",
            RecommendedAction::Move { .. } => "move",
        }
    }
}

impl fmt::Display for RecommendedAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecommendedAction::Move { board } => write!(f, "move to {}", board),
            other => f.write_str(other.as_str()),
        }
    }
}

/// Complete judgment about one post
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Verdict {
    pub status: Status,
    pub priority: Severity,
    pub confidence: u8,
    pub violations: Vec<Violation>,
    pub recommended_action: RecommendedAction,
}

impl Verdict {
    /// Confidence reported when nothing matched
    pub const CLEAN_CONFIDENCE: u8 = 95;

    pub fn clean() -> Self {
        Self {
            status: Status::Clean,
            priority: Severity::Low,
            confidence: Self::CLEAN_CONFIDENCE,
            violations: Vec::new(),
            recommended_action: RecommendedAction::None,
        }
    }

    /// Fold violations (in detection order) into a verdict.
    ///
    /// Any backend producing violations goes through here, so the status,
    /// priority and confidence invariants hold regardless of the source.
    pub fn from_violations(violations: Vec<Violation>) -> Self {
        let Some(priority) = violations.iter().map(|v| v.severity).max() else {
            return Self::clean();
        };
        let confidence = violations
            .iter()
            .map(|v| v.confidence)
            .max()
            .unwrap_or(Self::CLEAN_CONFIDENCE);
        let recommended_action = recommend(priority, &violations);

        Self {
            status: Status::Flagged,
            priority,
            confidence,
            violations,
            recommended_action,
        }
    }

    pub fn is_flagged(&self) -> bool {
        self.status == Status::Flagged
    }

    pub fn kinds(&self) -> Vec<ViolationKind> {
        self.violations.iter().map(|v| v.kind).collect()
    }

    pub fn has(&self, kind: ViolationKind) -> bool {
        self.violations.iter().any(|v| v.kind == kind)
    }

    pub fn violation(&self, kind: ViolationKind) -> Option<&Violation> {
        self.violations.iter().find(|v| v.kind == kind)
    }
}

fn recommend(priority: Severity, violations: &[Violation]) -> RecommendedAction {
    match priority {
        Severity::Critical => RecommendedAction::Edit,
        Severity::High => {
            if violations
                .iter()
                .any(|v| v.kind == ViolationKind::SpamExternalLink)
            {
                RecommendedAction::Remove
            } else {
                RecommendedAction::Edit
            }
        }
        Severity::Medium | Severity::Low => {
            // Moving only helps when placement is the sole problem
            let target = violations
                .iter()
                .find(|v| v.kind == ViolationKind::WrongBoard)
                .and_then(|v| v.action_details.clone());
            match target {
                Some(board) if violations.iter().all(|v| v.kind == ViolationKind::WrongBoard) => {
                    RecommendedAction::Move { board }
                }
                _ => RecommendedAction::Edit,
            }
        }
    }
}

// ============ Errors ============

#[derive(Error, Debug)]
pub enum ClassifierError {
    #[error("Invalid pattern in rule '{rule}': {source}")]
    InvalidPattern {
        rule: String,
        #[source]
        source: regex::Error,
    },
    #[error("Rule set parse error: {0}")]
    RuleParse(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Unknown violation kind: {0}")]
    UnknownKind(String),
}

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Backend unavailable: {0}")]
    Unavailable(String),
    #[error("Malformed backend response: {0}")]
    MalformedResponse(String),
    #[error("Backend error: {0}")]
    Backend(String),
}

// ============ Backends ============

/// Anything that can turn a post into a verdict.
///
/// The rule-based [`Classifier`] is the reference implementation; alternate
/// backends must produce the same [`Verdict`] shape so callers stay agnostic.
pub trait ModerationBackend {
    fn name(&self) -> &str;

    fn analyze(&self, post: &Post) -> Result<Verdict, BackendError>;
}

impl<B: ModerationBackend + ?Sized> ModerationBackend for Box<B> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn analyze(&self, post: &Post) -> Result<Verdict, BackendError> {
        (**self).analyze(post)
    }
}

// ============ Classifier ============

pub struct Classifier {
    rules: RuleSet,
    compiled: CompiledRules,
}

impl Classifier {
    /// Compile a rule set. Fails only on an invalid custom regex.
    pub fn new(rules: RuleSet) -> Result<Self, ClassifierError> {
        let compiled = CompiledRules::compile(&rules)?;
        Ok(Self { rules, compiled })
    }

    pub fn with_forum_defaults() -> Self {
        Self::new(RuleSet::forum_default()).expect("built-in forum rules compile")
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Classify raw post text posted to `board`.
    ///
    /// `username` is accepted for parity with callers and never inspected.
    pub fn classify(&self, content: &str, board: &str, _username: &str) -> Verdict {
        if content.trim().is_empty() {
            return Verdict::clean();
        }
        Verdict::from_violations(self.compiled.detect(content, board))
    }

    pub fn classify_post(&self, post: &Post) -> Verdict {
        self.classify(&post.content, &post.board, &post.username)
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::with_forum_defaults()
    }
}

impl ModerationBackend for Classifier {
    fn name(&self) -> &str {
        "rules"
    }

    fn analyze(&self, post: &Post) -> Result<Verdict, BackendError> {
        Ok(self.classify_post(post))
    }
}

/// Classify with the built-in forum rules.
pub fn classify(content: &str, board: &str, username: &str) -> Verdict {
    static DEFAULT: OnceLock<Classifier> = OnceLock::new();
    DEFAULT
        .get_or_init(Classifier::with_forum_defaults)
        .classify(content, board, username)
}

/// Longest prefix of `content` holding at most `max_chars` characters.
pub fn truncate_chars(content: &str, max_chars: usize) -> &str {
    match content.char_indices().nth(max_chars) {
        Some((idx, _)) => &content[..idx],
        None => content,
    }
}

// ============ Tests ============
