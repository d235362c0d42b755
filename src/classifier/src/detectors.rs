// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (C) 2025 Jonathan D.A. Jewell

//! Compiled detectors.
//!
//! Each detector reports at most one violation. They share nothing and run
//! in a fixed order, which is the order violations appear in a verdict.

use regex::Regex;
use std::collections::HashSet;

use crate::rules::{same_board, NamedPattern, RuleSet};
use crate::{ClassifierError, Violation, ViolationKind};

pub(crate) struct CompiledRules {
    phone: Vec<Regex>,
    email: Vec<Regex>,
    address: Vec<Regex>,
    address_keywords: Option<Regex>,
    context_window: usize,
    pii_confidence: u8,

    negative: Option<Regex>,
    member_ref: Option<Regex>,
    ignored_tokens: HashSet<String>,
    naming_confidence: u8,

    profanity: Vec<Regex>,
    profanity_confidence: u8,

    insult: Option<Regex>,
    insult_confidence: u8,

    boards: Vec<CompiledBoard>,
    exempt: Vec<String>,
    board_confidence: u8,

    spam_domains: Vec<String>,
    spam_confidence: u8,

    fee_phrases: Option<Regex>,
    fee_confidence: u8,

    moderation_phrases: Option<Regex>,
    moderation_confidence: u8,
}

struct CompiledBoard {
    name: String,
    keywords: Option<Regex>,
}

impl CompiledRules {
    pub(crate) fn compile(rules: &RuleSet) -> Result<Self, ClassifierError> {
        let boards = rules
            .boards
            .boards
            .iter()
            .map(|b| {
                Ok(CompiledBoard {
                    name: b.name.clone(),
                    keywords: keyword_regex(&format!("board:{}", b.name), &b.keywords, &[])?,
                })
            })
            .collect::<Result<Vec<_>, ClassifierError>>()?;

        let moderation_phrases = if rules.moderation_discussion.enabled {
            keyword_regex(
                "moderation_discussion",
                &rules.moderation_discussion.phrases,
                &[],
            )?
        } else {
            None
        };

        let fee_phrases = if rules.fee_avoidance.enabled {
            keyword_regex("fee_avoidance", &rules.fee_avoidance.phrases, &[])?
        } else {
            None
        };

        let profanity = rules
            .profanity
            .patterns
            .iter()
            .enumerate()
            .map(|(i, p)| compile(&format!("profanity:{}", i), p))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            phone: compile_named("pii_phone", &rules.pii.phone)?,
            email: compile_named("pii_email", &rules.pii.email)?,
            address: compile_named("pii_address", &rules.pii.address)?,
            address_keywords: keyword_regex(
                "pii_address_keywords",
                &rules.pii.address_keywords,
                &[],
            )?,
            context_window: rules.pii.context_window,
            pii_confidence: rules.pii.confidence,

            negative: keyword_regex("naming_keywords", &rules.naming.negative_keywords, &[])?,
            member_ref: member_ref_regex(&rules.naming.member_roles)?,
            ignored_tokens: rules
                .naming
                .ignored_tokens
                .iter()
                .map(|t| t.to_lowercase())
                .collect(),
            naming_confidence: rules.naming.confidence,

            profanity,
            profanity_confidence: rules.profanity.confidence,

            insult: keyword_regex("insults", &rules.insults.words, &rules.insults.suffixes)?,
            insult_confidence: rules.insults.confidence,

            boards,
            exempt: rules.boards.exempt.clone(),
            board_confidence: rules.boards.confidence,

            spam_domains: rules
                .spam
                .domains
                .iter()
                .map(|d| d.to_lowercase())
                .collect(),
            spam_confidence: rules.spam.confidence,

            fee_phrases,
            fee_confidence: rules.fee_avoidance.confidence,

            moderation_phrases,
            moderation_confidence: rules.moderation_discussion.confidence,
        })
    }

    /// Run every detector over `content` in pipeline order.
    pub(crate) fn detect(&self, content: &str, board: &str) -> Vec<Violation> {
        let lowered = content.to_lowercase();

        [
            self.detect_pii(content),
            self.detect_naming(content),
            self.detect_profanity(content),
            self.detect_insult(content),
            self.detect_wrong_board(content, board),
            self.detect_spam(&lowered),
            self.detect_fee_avoidance(content),
            self.detect_moderation_discussion(content),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    fn detect_pii(&self, content: &str) -> Option<Violation> {
        if let Some(m) = first_match(&self.phone, content) {
            return Some(Violation::new(
                ViolationKind::PiiPhone,
                self.pii_confidence,
                m.as_str(),
            ));
        }

        if let Some(m) = first_match(&self.email, content) {
            return Some(Violation::new(
                ViolationKind::PiiEmail,
                self.pii_confidence,
                m.as_str(),
            ));
        }

        let keywords = self.address_keywords.as_ref()?;
        let spans: Vec<(usize, usize)> = keywords
            .find_iter(content)
            .map(|k| (k.start(), k.end()))
            .collect();
        if spans.is_empty() {
            return None;
        }
        for re in &self.address {
            for m in re.find_iter(content) {
                if near_any(&spans, m.start(), m.end(), self.context_window) {
                    return Some(Violation::new(
                        ViolationKind::PiiAddress,
                        self.pii_confidence,
                        m.as_str(),
                    ));
                }
            }
        }

        None
    }

    fn detect_naming(&self, content: &str) -> Option<Violation> {
        let keyword = self.negative.as_ref()?.find(content)?;
        let member_ref = self.member_ref.as_ref()?;

        for caps in member_ref.captures_iter(content) {
            let (Some(whole), Some(token)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let handle = token
                .as_str()
                .trim_end_matches(['.', '-', '\''])
                .to_lowercase();
            if handle.is_empty() || self.ignored_tokens.contains(&handle) {
                continue;
            }
            return Some(Violation::new(
                ViolationKind::NamingAndShaming,
                self.naming_confidence,
                format!("{} (with \"{}\")", whole.as_str(), keyword.as_str()),
            ));
        }

        None
    }

    fn detect_profanity(&self, content: &str) -> Option<Violation> {
        first_match(&self.profanity, content).map(|m| {
            Violation::new(
                ViolationKind::DisrespectProfanity,
                self.profanity_confidence,
                m.as_str(),
            )
        })
    }

    fn detect_insult(&self, content: &str) -> Option<Violation> {
        let m = self.insult.as_ref()?.find(content)?;
        Some(Violation::new(
            ViolationKind::DisrespectInsult,
            self.insult_confidence,
            m.as_str(),
        ))
    }

    fn detect_wrong_board(&self, content: &str, board: &str) -> Option<Violation> {
        if self.exempt.iter().any(|b| same_board(b, board)) {
            return None;
        }
        let own = self.boards.iter().find(|b| same_board(&b.name, board))?;

        if own.keywords.as_ref().is_some_and(|re| re.is_match(content)) {
            return None;
        }

        self.boards
            .iter()
            .filter(|b| !same_board(&b.name, board))
            .find_map(|b| {
                let m = b.keywords.as_ref()?.find(content)?;
                Some(
                    Violation::new(
                        ViolationKind::WrongBoard,
                        self.board_confidence,
                        format!("\"{}\" belongs in {}", m.as_str(), b.name),
                    )
                    .with_action_details(b.name.clone()),
                )
            })
    }

    fn detect_spam(&self, lowered: &str) -> Option<Violation> {
        self.spam_domains
            .iter()
            .find(|d| !d.is_empty() && lowered.contains(d.as_str()))
            .map(|d| Violation::new(ViolationKind::SpamExternalLink, self.spam_confidence, d.as_str()))
    }

    fn detect_fee_avoidance(&self, content: &str) -> Option<Violation> {
        let m = self.fee_phrases.as_ref()?.find(content)?;
        Some(Violation::new(
            ViolationKind::FeeAvoidance,
            self.fee_confidence,
            m.as_str(),
        ))
    }

    fn detect_moderation_discussion(&self, content: &str) -> Option<Violation> {
        let m = self.moderation_phrases.as_ref()?.find(content)?;
        Some(Violation::new(
            ViolationKind::ModerationDiscussion,
            self.moderation_confidence,
            m.as_str(),
        ))
    }
}

// Helpers

fn compile(rule: &str, pattern: &str) -> Result<Regex, ClassifierError> {
    Regex::new(pattern).map_err(|source| ClassifierError::InvalidPattern {
        rule: rule.to_string(),
        source,
    })
}

fn compile_named(group: &str, patterns: &[NamedPattern]) -> Result<Vec<Regex>, ClassifierError> {
    patterns
        .iter()
        .map(|p| compile(&format!("{}:{}", group, p.name), &p.regex))
        .collect()
}

/// Case-insensitive, word-bounded alternation over literal keywords.
///
/// Inner whitespace matches any run of whitespace. Longer keywords are tried
/// first so "rip off" wins over "rip". Returns `None` for an empty list.
fn keyword_regex(
    rule: &str,
    words: &[String],
    suffixes: &[String],
) -> Result<Option<Regex>, ClassifierError> {
    let mut words: Vec<&str> = words
        .iter()
        .map(|w| w.trim())
        .filter(|w| !w.is_empty())
        .collect();
    if words.is_empty() {
        return Ok(None);
    }
    words.sort_by_key(|w| std::cmp::Reverse(w.len()));

    let alternation = words
        .iter()
        .map(|w| {
            w.split_whitespace()
                .map(regex::escape)
                .collect::<Vec<_>>()
                .join(r"\s+")
        })
        .collect::<Vec<_>>()
        .join("|");

    let suffix = if suffixes.is_empty() {
        String::new()
    } else {
        let endings = suffixes
            .iter()
            .map(|s| regex::escape(s))
            .collect::<Vec<_>>()
            .join("|");
        format!("(?:{})?", endings)
    };

    compile(rule, &format!(r"(?i)\b(?:{}){}\b", alternation, suffix)).map(Some)
}

fn member_ref_regex(roles: &[String]) -> Result<Option<Regex>, ClassifierError> {
    let roles: Vec<String> = roles
        .iter()
        .map(|r| r.trim())
        .filter(|r| !r.is_empty())
        .map(regex::escape)
        .collect();
    if roles.is_empty() {
        return Ok(None);
    }
    let pattern = format!(
        r"(?i)\b(?:{})s?\s+@?([a-z0-9_][a-z0-9_.'-]{{2,}})",
        roles.join("|")
    );
    compile("naming_member_ref", &pattern).map(Some)
}

fn first_match<'t>(patterns: &[Regex], content: &'t str) -> Option<regex::Match<'t>> {
    patterns.iter().find_map(|re| re.find(content))
}

/// Whether any span in `spans` lies within `window` bytes of `start..end`.
///
/// `spans` must be sorted and non-overlapping, as `find_iter` yields them,
/// so both starts and ends are ascending and a binary search finds the only
/// candidate worth checking.
fn near_any(spans: &[(usize, usize)], start: usize, end: usize, window: usize) -> bool {
    let first = spans.partition_point(|&(_, span_end)| span_end.saturating_add(window) < start);
    spans
        .get(first)
        .is_some_and(|&(span_start, _)| span_start <= end.saturating_add(window))
}
