// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (C) 2025 Jonathan D.A. Jewell

//! LLM Analyst - Language-model backend for forum moderation
//!
//! Sends a post and the board usage policy to a completion model, then
//! parses the structured reply into the same [`Verdict`] the rule-based
//! classifier produces. Callers can swap backends without caring which one
//! answered.
//!
//! The transport is abstracted behind [`CompletionClient`]. [`ReplayClient`]
//! returns a recorded reply and is used for offline runs and tests.
//!
//! Model output is not deterministic; the rule-based classifier remains the
//! reference for detection behaviour.

use policy_classifier::{
    BackendError, ModerationBackend, Post, RuleSet, Verdict, Violation, ViolationKind,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("Model unavailable: {0}")]
    Unavailable(String),
    #[error("Completion failed: {0}")]
    Completion(String),
    #[error("Malformed model reply: {0}")]
    MalformedResponse(String),
}

impl From<LlmError> for BackendError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::Unavailable(msg) => BackendError::Unavailable(msg),
            LlmError::MalformedResponse(msg) => BackendError::MalformedResponse(msg),
            LlmError::Completion(msg) => BackendError::Backend(msg),
        }
    }
}

/// A text-completion endpoint.
pub trait CompletionClient {
    fn model(&self) -> &str;

    fn complete(&self, prompt: &str) -> Result<String, LlmError>;
}

/// Replays a fixed reply regardless of the prompt
#[derive(Debug, Clone)]
pub struct ReplayClient {
    model: String,
    reply: String,
}

impl ReplayClient {
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            model: "replay".to_string(),
            reply: reply.into(),
        }
    }

    /// Stand-in used when no model is configured.
    pub fn simulation() -> Self {
        Self {
            model: "simulation".to_string(),
            reply: "VIOLATIONS: Yes\n- TYPE: Naming & Shaming\n- SEVERITY: High\n- CONFIDENCE: 85%"
                .to_string(),
        }
    }
}

impl CompletionClient for ReplayClient {
    fn model(&self) -> &str {
        &self.model
    }

    fn complete(&self, _prompt: &str) -> Result<String, LlmError> {
        Ok(self.reply.clone())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalystConfig {
    /// Boards offered to the model as move targets
    pub boards: Vec<String>,
    /// Used when a reply omits or garbles CONFIDENCE
    pub default_confidence: u8,
}

impl Default for AnalystConfig {
    fn default() -> Self {
        Self {
            boards: RuleSet::forum_default()
                .board_names()
                .into_iter()
                .map(String::from)
                .collect(),
            default_confidence: 50,
        }
    }
}

/// One `- TYPE:` block of a model reply
#[derive(Debug, Clone, Default, PartialEq)]
struct ReplyBlock {
    kind: String,
    severity: Option<String>,
    evidence: Option<String>,
    reason: Option<String>,
    action: Option<String>,
    confidence: Option<String>,
}

pub struct LlmAnalyst<C> {
    client: C,
    config: AnalystConfig,
}

impl<C: CompletionClient> LlmAnalyst<C> {
    pub fn new(client: C) -> Self {
        Self::with_config(client, AnalystConfig::default())
    }

    pub fn with_config(client: C, config: AnalystConfig) -> Self {
        Self { client, config }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn build_prompt(&self, post: &Post) -> String {
        format!(
            r#"You are an expert community moderator. Analyze this forum post for policy violations.

POST DETAILS:
Username: {username}
Board: {board}
Title: {title}
Content: {content}

AVAILABLE BOARDS: {boards}

BOARD USAGE POLICY - Check for these violations:

1. NAMING & SHAMING: Identifying other members (by username, item number, or description) with negative intent
2. DISRESPECTFUL LANGUAGE: Personal attacks, insults, vulgar language, harassment
3. PERSONAL INFORMATION: Email addresses, phone numbers, physical addresses, full real names
4. WRONG BOARD: Content that belongs in a different board
5. SPAM/ADVERTISING: Promoting external sites, services, or products
6. FEE AVOIDANCE: Arranging payment outside the platform

Respond in this EXACT format:

VIOLATIONS: [Yes/No]

If YES, list each violation as:
- TYPE: [violation type]
- SEVERITY: [Critical/High/Medium/Low]
- EVIDENCE: [quote the specific violating text]
- REASON: [why this violates policy]
- ACTION: [Edit/Remove/Move to X board/Warning]
- CONFIDENCE: [percentage]

If NO violations, respond:
- CLEAN POST
- REASON: [why it's compliant]

Focus on actual policy violations, not style or tone unless truly disrespectful."#,
            username = post.username,
            board = post.board,
            title = post.title.as_deref().unwrap_or(""),
            content = post.content,
            boards = self.config.boards.join(", "),
        )
    }

    pub fn analyze_post(&self, post: &Post) -> Result<Verdict, LlmError> {
        let prompt = self.build_prompt(post);
        debug!(model = self.client.model(), prompt_len = prompt.len(), "requesting analysis");
        let reply = self.client.complete(&prompt)?;
        self.parse_reply(&reply)
    }

    /// Turn a model reply into a verdict.
    ///
    /// Severity always comes from the violation kind, so the reply's own
    /// SEVERITY line is informational only.
    pub fn parse_reply(&self, reply: &str) -> Result<Verdict, LlmError> {
        if is_clean_reply(reply) {
            return Ok(Verdict::clean());
        }

        let blocks = parse_blocks(reply);
        if blocks.is_empty() {
            return Err(LlmError::MalformedResponse(
                "reply has neither a clean marker nor TYPE entries".to_string(),
            ));
        }

        let mut violations = Vec::new();
        for block in blocks {
            let Some(kind) = map_kind(&block.kind, block.evidence.as_deref()) else {
                warn!(kind = %block.kind, "dropping violation type outside the policy taxonomy");
                continue;
            };
            if let Some(stated) = &block.severity {
                if !stated.eq_ignore_ascii_case(kind.severity().label()) {
                    debug!(%kind, stated = %stated, "model severity differs from policy severity");
                }
            }

            let confidence = block
                .confidence
                .as_deref()
                .and_then(parse_confidence)
                .unwrap_or(self.config.default_confidence);
            let evidence = block
                .evidence
                .as_deref()
                .map(|e| e.trim_matches(|c| c == '"' || c == '\''))
                .filter(|e| !e.is_empty())
                .unwrap_or("See post content");

            let mut violation = Violation::new(kind, confidence, evidence);
            if kind == ViolationKind::WrongBoard {
                if let Some(target) = block.action.as_deref().and_then(|a| self.move_target(a)) {
                    violation = violation.with_action_details(target);
                }
            }
            if let Some(reason) = &block.reason {
                debug!(%kind, reason = %reason, "model reasoning");
            }
            violations.push(violation);
        }

        if violations.is_empty() {
            return Err(LlmError::MalformedResponse(
                "no violation type could be mapped onto the policy".to_string(),
            ));
        }

        // Same ordering and one-per-kind shape as the rule-based pipeline
        violations.sort_by_key(|v| v.kind);
        violations.dedup_by_key(|v| v.kind);

        Ok(Verdict::from_violations(violations))
    }

    /// "Move to Technical Issues board" -> "Technical Issues"
    fn move_target(&self, action: &str) -> Option<String> {
        let lower = action.trim().to_lowercase();
        let rest = lower.strip_prefix("move to")?.trim();
        let rest = rest.strip_prefix("the ").unwrap_or(rest);
        let rest = rest.strip_suffix("board").unwrap_or(rest).trim();
        if rest.is_empty() {
            return None;
        }
        let canonical = self
            .config
            .boards
            .iter()
            .find(|b| b.to_lowercase() == rest)
            .cloned();
        Some(canonical.unwrap_or_else(|| rest.to_string()))
    }
}

impl<C: CompletionClient> ModerationBackend for LlmAnalyst<C> {
    fn name(&self) -> &str {
        "llm"
    }

    fn analyze(&self, post: &Post) -> Result<Verdict, BackendError> {
        Ok(self.analyze_post(post)?)
    }
}

/// A clean marker counts only as a line of its own, never inside a REASON.
fn is_clean_reply(reply: &str) -> bool {
    reply.lines().any(|line| {
        let line = line.trim().trim_start_matches(['-', '*']).trim();
        if line.eq_ignore_ascii_case("CLEAN POST") {
            return true;
        }
        line.split_once(':').is_some_and(|(key, value)| {
            key.trim().eq_ignore_ascii_case("VIOLATIONS")
                && value.trim().trim_end_matches('.').eq_ignore_ascii_case("no")
        })
    })
}

fn parse_blocks(reply: &str) -> Vec<ReplyBlock> {
    let mut blocks = Vec::new();
    let mut current: Option<ReplyBlock> = None;

    for line in reply.lines() {
        let line = line.trim().trim_start_matches(['-', '*']).trim();
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim().to_string();

        match key.trim().to_uppercase().as_str() {
            "TYPE" => {
                if let Some(done) = current.take() {
                    blocks.push(done);
                }
                current = Some(ReplyBlock {
                    kind: value,
                    ..ReplyBlock::default()
                });
            }
            field => {
                let Some(block) = current.as_mut() else {
                    continue;
                };
                match field {
                    "SEVERITY" => block.severity = Some(value),
                    "EVIDENCE" => block.evidence = Some(value),
                    "REASON" => block.reason = Some(value),
                    "ACTION" => block.action = Some(value),
                    "CONFIDENCE" => block.confidence = Some(value),
                    _ => {}
                }
            }
        }
    }

    if let Some(done) = current {
        blocks.push(done);
    }
    blocks
}

fn parse_confidence(raw: &str) -> Option<u8> {
    let trimmed = raw.trim().trim_end_matches('%').trim();
    let value: f64 = trimmed.parse().ok()?;
    let percent = if value <= 1.0 && trimmed.contains('.') {
        value * 100.0
    } else {
        value
    };
    Some(percent.round().clamp(0.0, 100.0) as u8)
}

fn map_kind(text: &str, evidence: Option<&str>) -> Option<ViolationKind> {
    if let Ok(kind) = text.parse::<ViolationKind>() {
        return Some(kind);
    }

    let t = text.to_lowercase();
    let kind = if t.contains("phone") {
        ViolationKind::PiiPhone
    } else if t.contains("email") || t.contains("e-mail") {
        ViolationKind::PiiEmail
    } else if t.contains("address") {
        ViolationKind::PiiAddress
    } else if t.contains("personal") || t.contains("pii") {
        personal_info_kind(evidence.unwrap_or(""))
    } else if t.contains("naming") || t.contains("shaming") {
        ViolationKind::NamingAndShaming
    } else if t.contains("profan") || t.contains("vulgar") || t.contains("swear") {
        ViolationKind::DisrespectProfanity
    } else if t.contains("insult")
        || t.contains("disrespect")
        || t.contains("harass")
        || t.contains("attack")
    {
        ViolationKind::DisrespectInsult
    } else if t.contains("wrong board")
        || t.contains("off-topic")
        || t.contains("off topic")
        || t.contains("placement")
    {
        ViolationKind::WrongBoard
    } else if t.contains("spam")
        || t.contains("advert")
        || t.contains("promot")
        || t.contains("external link")
    {
        ViolationKind::SpamExternalLink
    } else if t.contains("fee") {
        ViolationKind::FeeAvoidance
    } else if t.contains("moderation") || t.contains("censor") {
        ViolationKind::ModerationDiscussion
    } else {
        return None;
    };
    Some(kind)
}

/// Pick the PII kind from what the model quoted.
fn personal_info_kind(evidence: &str) -> ViolationKind {
    if evidence.contains('@') {
        ViolationKind::PiiEmail
    } else if evidence.chars().filter(|c| c.is_ascii_digit()).count() >= 7 {
        ViolationKind::PiiPhone
    } else {
        ViolationKind::PiiAddress
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use policy_classifier::{RecommendedAction, Severity, Status};

    fn analyst(reply: &str) -> LlmAnalyst<ReplayClient> {
        LlmAnalyst::new(ReplayClient::new(reply))
    }

    fn post() -> Post {
        Post::new("My app crashes on login", "Selling", "u1").with_title("Help")
    }

    struct DownClient;

    impl CompletionClient for DownClient {
        fn model(&self) -> &str {
            "down"
        }

        fn complete(&self, _prompt: &str) -> Result<String, LlmError> {
            Err(LlmError::Unavailable("connection refused".to_string()))
        }
    }

    #[test]
    fn test_clean_reply() {
        let analyst = analyst("VIOLATIONS: No\n- CLEAN POST\n- REASON: On topic question");
        let verdict = analyst.analyze_post(&post()).unwrap();
        assert_eq!(verdict, Verdict::clean());
    }

    #[test]
    fn test_clean_marker_inside_reason_is_not_clean() {
        let reply = "VIOLATIONS: Yes\n\
            - TYPE: Spam\n\
            - EVIDENCE: amazon.com\n\
            - REASON: Competitor link, this is not a clean post\n\
            - CONFIDENCE: 90%";
        let verdict = analyst(reply).parse_reply(reply).unwrap();
        assert_eq!(verdict.status, Status::Flagged);
        assert_eq!(verdict.kinds(), vec![ViolationKind::SpamExternalLink]);

        assert!(is_clean_reply("* clean post"));
        assert!(is_clean_reply("Violations: No."));
        assert!(!is_clean_reply("VIOLATIONS: Not sure, but no clean post here"));
    }

    #[test]
    fn test_parses_violation_blocks() {
        let reply = "VIOLATIONS: Yes\n\
            - TYPE: Personal Information\n\
            - SEVERITY: Critical\n\
            - EVIDENCE: \"02012345678\"\n\
            - REASON: Phone number shared\n\
            - ACTION: Edit\n\
            - CONFIDENCE: 92%\n\
            - TYPE: Disrespectful Language\n\
            - SEVERITY: High\n\
            - EVIDENCE: idiots\n\
            - CONFIDENCE: 80%";
        let verdict = analyst(reply).parse_reply(reply).unwrap();

        assert_eq!(verdict.status, Status::Flagged);
        assert_eq!(
            verdict.kinds(),
            vec![ViolationKind::PiiPhone, ViolationKind::DisrespectInsult]
        );
        assert_eq!(verdict.violations[0].evidence, "02012345678");
        assert_eq!(verdict.priority, Severity::Critical);
        assert_eq!(verdict.confidence, 92);
    }

    #[test]
    fn test_wrong_board_reply_sets_move_target() {
        let reply = "VIOLATIONS: Yes\n\
            - TYPE: Wrong Board\n\
            - SEVERITY: Medium\n\
            - EVIDENCE: app crashes on login\n\
            - ACTION: Move to technical issues board\n\
            - CONFIDENCE: 0.9";
        let verdict = analyst(reply).analyze_post(&post()).unwrap();
        assert_eq!(verdict.confidence, 90);
        assert_eq!(
            verdict.recommended_action,
            RecommendedAction::Move {
                board: "Technical Issues".to_string()
            }
        );
    }

    #[test]
    fn test_severity_follows_kind_not_reply() {
        let reply = "- TYPE: Spam\n- SEVERITY: Low\n- EVIDENCE: amazon.com";
        let verdict = analyst(reply).parse_reply(reply).unwrap();
        assert_eq!(verdict.priority, Severity::High);
        assert_eq!(verdict.confidence, 50);
        assert_eq!(verdict.recommended_action, RecommendedAction::Remove);
    }

    #[test]
    fn test_duplicate_kinds_collapse() {
        let reply = "- TYPE: Insult\n- EVIDENCE: idiot\n- TYPE: Harassment\n- EVIDENCE: moron";
        let verdict = analyst(reply).parse_reply(reply).unwrap();
        assert_eq!(verdict.violations.len(), 1);
        assert_eq!(verdict.violations[0].evidence, "idiot");
    }

    #[test]
    fn test_unknown_types_are_dropped() {
        let reply = "- TYPE: Off-Topic\n- TYPE: Tone Policing";
        let verdict = analyst(reply).parse_reply(reply).unwrap();
        assert_eq!(verdict.kinds(), vec![ViolationKind::WrongBoard]);

        let reply = "VIOLATIONS: Yes\n- TYPE: Tone Policing";
        assert!(matches!(
            analyst(reply).parse_reply(reply),
            Err(LlmError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_malformed_reply() {
        let reply = "I think this post is probably fine?";
        assert!(matches!(
            analyst(reply).parse_reply(reply),
            Err(LlmError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_personal_information_uses_evidence() {
        assert_eq!(
            map_kind("Personal Information", Some("bob@example.com")),
            Some(ViolationKind::PiiEmail)
        );
        assert_eq!(
            map_kind("Personal Information", Some("0412 345 678")),
            Some(ViolationKind::PiiPhone)
        );
        assert_eq!(
            map_kind("Personal Information", Some("12 High Street")),
            Some(ViolationKind::PiiAddress)
        );
    }

    #[test]
    fn test_simulation_reply_flags_naming() {
        let analyst = LlmAnalyst::new(ReplayClient::simulation());
        let verdict = analyst.analyze_post(&post()).unwrap();
        assert_eq!(verdict.kinds(), vec![ViolationKind::NamingAndShaming]);
        assert_eq!(verdict.confidence, 85);
        assert_eq!(analyst.client().model(), "simulation");
    }

    #[test]
    fn test_prompt_carries_post_details() {
        let prompt = analyst("").build_prompt(&post());
        assert!(prompt.contains("Username: u1"));
        assert!(prompt.contains("Board: Selling"));
        assert!(prompt.contains("Title: Help"));
        assert!(prompt.contains("Content: My app crashes on login"));
        assert!(prompt.contains("Technical Issues"));
    }

    #[test]
    fn test_backend_errors_convert() {
        let analyst = LlmAnalyst::new(DownClient);
        assert_eq!(analyst.name(), "llm");
        assert!(matches!(
            analyst.analyze(&post()),
            Err(BackendError::Unavailable(_))
        ));
    }

    #[test]
    fn test_parse_confidence_forms() {
        assert_eq!(parse_confidence("85%"), Some(85));
        assert_eq!(parse_confidence(" 0.75 "), Some(75));
        assert_eq!(parse_confidence("140"), Some(100));
        assert_eq!(parse_confidence("high"), None);
    }
}
