// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (C) 2025 Jonathan D.A. Jewell

//! Rule tables for the forum policy classifier.
//!
//! Everything the detectors match against lives here as plain data so a
//! deployment can export the defaults, adjust them and load them back from
//! JSON without touching the detection code.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::ClassifierError;

// ============ Rule Set ============

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RuleSet {
    pub name: String,
    pub pii: PiiRules,
    pub naming: NamingRules,
    pub profanity: PatternListRules,
    pub insults: WordListRules,
    pub boards: BoardRules,
    pub spam: DomainRules,
    pub fee_avoidance: PhraseRules,
    pub moderation_discussion: PhraseRules,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NamedPattern {
    pub name: String,
    pub regex: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PiiRules {
    pub phone: Vec<NamedPattern>,
    pub email: Vec<NamedPattern>,
    /// Postcode and street shapes. Only reported next to an address keyword.
    pub address: Vec<NamedPattern>,
    pub address_keywords: Vec<String>,
    /// Max distance in bytes between an address match and its keyword.
    pub context_window: usize,
    pub confidence: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NamingRules {
    pub negative_keywords: Vec<String>,
    /// Words that introduce a member handle, e.g. "seller" in "seller bob99".
    pub member_roles: Vec<String>,
    /// Tokens following a role word that are ordinary words, not handles.
    pub ignored_tokens: Vec<String>,
    pub confidence: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PatternListRules {
    pub patterns: Vec<String>,
    pub confidence: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WordListRules {
    pub words: Vec<String>,
    /// Optional endings accepted after each word ("s", "ic", ...).
    pub suffixes: Vec<String>,
    pub confidence: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BoardTopics {
    pub name: String,
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BoardRules {
    pub boards: Vec<BoardTopics>,
    pub exempt: Vec<String>,
    pub confidence: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DomainRules {
    pub domains: Vec<String>,
    pub confidence: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PhraseRules {
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
    pub phrases: Vec<String>,
    pub confidence: u8,
}

fn enabled_by_default() -> bool {
    true
}

impl RuleSet {
    pub fn from_json(json: &str) -> Result<Self, ClassifierError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, ClassifierError> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn to_json_pretty(&self) -> Result<String, ClassifierError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Names of every board the rule set knows about, in table order.
    pub fn board_names(&self) -> Vec<&str> {
        self.boards.boards.iter().map(|b| b.name.as_str()).collect()
    }

    /// Look up a board by name, ignoring case and surrounding whitespace.
    pub fn find_board(&self, name: &str) -> Option<&BoardTopics> {
        self.boards.boards.iter().find(|b| same_board(&b.name, name))
    }

    pub fn is_exempt_board(&self, name: &str) -> bool {
        self.boards.exempt.iter().any(|b| same_board(b, name))
    }
}

/// Board names compare case-insensitively, ignoring surrounding whitespace.
pub(crate) fn same_board(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

// ============ Default Rule Set ============

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn pattern(name: &str, regex: &str) -> NamedPattern {
    NamedPattern {
        name: name.to_string(),
        regex: regex.to_string(),
    }
}

fn board(name: &str, keywords: &[&str]) -> BoardTopics {
    BoardTopics {
        name: name.to_string(),
        keywords: strings(keywords),
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::forum_default()
    }
}

impl RuleSet {
    /// Board usage policy for the community forum
    pub fn forum_default() -> Self {
        Self {
            name: "Community Board Usage Policy".to_string(),
            pii: PiiRules {
                phone: vec![
                    pattern("uk_compact", r"\b0\d{9,10}\b"),
                    pattern("uk_spaced", r"\b0\d{2,4}[ -]\d{3,4}[ -]?\d{3,4}\b"),
                    pattern(
                        "uk_international",
                        r"\+44\s?(?:\(0\)\s?)?\d{2,4}[\s-]?\d{3,4}[\s-]?\d{3,4}\b",
                    ),
                    pattern("au_mobile", r"\b04\d{2}[ -]\d{3}[ -]?\d{3}\b"),
                    pattern("au_international", r"\+61\s?\d[\s-]?\d{4}[\s-]?\d{4}\b"),
                    pattern("north_american", r"\(?\b\d{3}\)?[\s.-]\d{3}[\s.-]\d{4}\b"),
                ],
                email: vec![pattern(
                    "email",
                    r"(?i)\b[a-z0-9._%+-]+@[a-z0-9.-]+\.[a-z]{2,}\b",
                )],
                address: vec![
                    pattern("uk_postcode", r"(?i)\b[a-z]{1,2}\d[a-z\d]?\s*\d[a-z]{2}\b"),
                    pattern(
                        "au_postcode",
                        r"(?i)\b(?:nsw|vic|qld|wa|sa|tas|act|nt)\s+\d{4}\b",
                    ),
                    pattern(
                        "street_address",
                        r"(?i)\b\d{1,5}\s+[a-z]+(?:\s+[a-z]+)?\s+(?:street|st|road|rd|avenue|ave|lane|ln|drive|dr|close|crescent|way)\b",
                    ),
                ],
                address_keywords: strings(&[
                    "address",
                    "ship to",
                    "send it to",
                    "send to",
                    "located",
                    "live at",
                    "collect from",
                    "postcode",
                    "post code",
                ]),
                context_window: 80,
                confidence: 100,
            },
            naming: NamingRules {
                negative_keywords: strings(&[
                    "scam",
                    "scammer",
                    "scammers",
                    "scammed",
                    "fraud",
                    "fraudster",
                    "terrible",
                    "awful",
                    "worst",
                    "avoid",
                    "fake",
                    "cheat",
                    "cheater",
                    "cheated",
                    "rip off",
                    "ripoff",
                    "rip-off",
                    "ripped me off",
                    "liar",
                    "dishonest",
                    "thief",
                    "con artist",
                ]),
                member_roles: strings(&["seller", "buyer"]),
                ignored_tokens: strings(&[
                    "a", "an", "and", "are", "but", "can", "claims", "could", "did", "didn't",
                    "does", "doesn't", "for", "from", "had", "has", "have", "here", "i", "in",
                    "is", "it", "me", "my", "never", "of", "on", "or", "refused", "refuses",
                    "said", "says", "sent", "should", "that", "the", "then", "there", "they",
                    "this", "to", "was", "were", "which", "who", "will", "with", "won't",
                    "would",
                ]),
                confidence: 94,
            },
            profanity: PatternListRules {
                patterns: strings(&[
                    r"(?i)\bf(?:[u*@#%]+c+|[*@#%]{2,3})k+\w*",
                    r"(?i)\bsh[i!1*]t+(?:s|ty|ting|ted|ter)?\b",
                    r"(?i)\bb[i!1*]+tch\w*",
                    r"(?i)\ba[s$*]{2}hole\w*",
                    r"(?i)\bbastard\w*",
                    r"(?i)\bbollocks\b",
                    r"(?i)\bcr[a@*]p(?:py)?\b",
                    r"(?i)\bpiss(?:ed)?\b",
                    r"(?i)\bd[a@*]mn\w*",
                    r"(?i)\bwtf\b",
                ]),
                confidence: 98,
            },
            insults: WordListRules {
                words: strings(&[
                    "idiot", "stupid", "dumb", "moron", "fool", "imbecile", "cretin", "halfwit",
                ]),
                suffixes: strings(&["s", "ic", "ish", "ity"]),
                confidence: 96,
            },
            boards: BoardRules {
                boards: vec![
                    board(
                        "Selling",
                        &[
                            "sell",
                            "selling",
                            "sold",
                            "listing",
                            "listings",
                            "relist",
                            "price",
                            "pricing",
                            "final value fee",
                            "item specifics",
                            "seller hub",
                            "promoted listing",
                        ],
                    ),
                    board(
                        "Buying",
                        &[
                            "buy",
                            "buying",
                            "bought",
                            "purchase",
                            "purchased",
                            "bid",
                            "bidding",
                            "outbid",
                            "item not received",
                            "watchlist",
                            "best offer",
                        ],
                    ),
                    board(
                        "Payments",
                        &[
                            "payment",
                            "payments",
                            "payout",
                            "payouts",
                            "refund",
                            "refunded",
                            "invoice",
                            "paypal",
                            "charged",
                            "card declined",
                            "managed payments",
                        ],
                    ),
                    board(
                        "Postage & Shipping",
                        &[
                            "postage",
                            "shipping",
                            "courier",
                            "tracking",
                            "parcel",
                            "royal mail",
                            "delivery",
                            "delivered",
                            "dispatch",
                            "dispatched",
                            "label",
                            "evri",
                        ],
                    ),
                    board(
                        "Technical Issues",
                        &[
                            "crash",
                            "crashes",
                            "crashed",
                            "crashing",
                            "app",
                            "bug",
                            "glitch",
                            "error",
                            "login",
                            "log in",
                            "sign in",
                            "password",
                            "website",
                            "browser",
                            "won't load",
                        ],
                    ),
                    board("Member to Member Support", &[]),
                    board("Mentors Forum", &[]),
                    board("General Discussion", &[]),
                    board("eBay Café", &[]),
                ],
                exempt: strings(&[
                    "General Discussion",
                    "eBay Café",
                    "Member to Member Support",
                    "Mentors Forum",
                ]),
                confidence: 87,
            },
            spam: DomainRules {
                domains: strings(&[
                    "amazon.com",
                    "amazon.co.uk",
                    "etsy.com",
                    "gumtree.com",
                    "facebook.com/marketplace",
                    "depop.com",
                    "vinted.com",
                    "vinted.co.uk",
                    "shpock.com",
                    "preloved.co.uk",
                    "craigslist.org",
                    "mercari.com",
                    "poshmark.com",
                    "bit.ly",
                    "tinyurl.com",
                ]),
                confidence: 100,
            },
            fee_avoidance: PhraseRules {
                enabled: true,
                phrases: strings(&[
                    "pay outside ebay",
                    "pay outside of ebay",
                    "outside of ebay",
                    "off ebay",
                    "deal direct",
                    "deal directly",
                    "contact me directly",
                    "email me directly",
                    "avoid fees",
                    "avoid the fees",
                    "avoid ebay fees",
                    "save on fees",
                    "save the fees",
                    "skip the fees",
                    "bank transfer",
                    "friends and family",
                ]),
                confidence: 95,
            },
            moderation_discussion: PhraseRules {
                enabled: true,
                phrases: strings(&[
                    "post was removed",
                    "post got removed",
                    "post was deleted",
                    "removed my post",
                    "deleted my post",
                    "censorship",
                    "censored",
                    "unfair moderation",
                    "the mods",
                    "moderators are",
                    "appeal",
                    "banned for no reason",
                    "suspended for no reason",
                ]),
                confidence: 90,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rules_round_trip_through_json() {
        let rules = RuleSet::forum_default();
        let json = rules.to_json_pretty().unwrap();
        let loaded = RuleSet::from_json(&json).unwrap();
        assert_eq!(rules, loaded);
    }

    #[test]
    fn test_find_board_ignores_case_and_padding() {
        let rules = RuleSet::forum_default();
        assert_eq!(
            rules.find_board("  technical issues ").map(|b| b.name.as_str()),
            Some("Technical Issues")
        );
        assert!(rules.find_board("Collectables").is_none());
    }

    #[test]
    fn test_general_boards_are_exempt() {
        let rules = RuleSet::forum_default();
        assert!(rules.is_exempt_board("general discussion"));
        assert!(rules.is_exempt_board("eBay Café"));
        assert!(!rules.is_exempt_board("Selling"));
    }

    #[test]
    fn test_missing_enabled_flag_defaults_to_on() {
        let json = r#"{"phrases": ["appeal"], "confidence": 90}"#;
        let rules: PhraseRules = serde_json::from_str(json).unwrap();
        assert!(rules.enabled);
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(matches!(
            RuleSet::from_json("{ not json"),
            Err(ClassifierError::RuleParse(_))
        ));
    }
}
