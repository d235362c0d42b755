// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (C) 2025 Jonathan D.A. Jewell

//! Running counters for the moderation session.

use policy_classifier::{Severity, Verdict};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ModerationStats {
    pub total_analyzed: u64,
    pub violations_found: u64,
    pub clean_posts: u64,
    /// Moderator agreed with the backend
    pub ai_accepted: u64,
    /// Moderator disagreed with the backend
    pub human_override: u64,
    // Per-violation severity counts
    pub critical: u64,
    pub high: u64,
    pub medium: u64,
    pub low: u64,
}

impl ModerationStats {
    pub fn record_verdict(&mut self, verdict: &Verdict) {
        self.total_analyzed += 1;
        if verdict.is_flagged() {
            self.violations_found += 1;
        } else {
            self.clean_posts += 1;
        }
        for violation in &verdict.violations {
            match violation.severity {
                Severity::Critical => self.critical += 1,
                Severity::High => self.high += 1,
                Severity::Medium => self.medium += 1,
                Severity::Low => self.low += 1,
            }
        }
    }

    /// Share of analyzed posts that were flagged, in whole percent
    pub fn violation_rate(&self) -> u8 {
        percent(self.violations_found, self.total_analyzed).unwrap_or(0)
    }

    /// Share of decisions that agreed with the backend, if any were made
    pub fn acceptance_rate(&self) -> Option<u8> {
        percent(self.ai_accepted, self.ai_accepted + self.human_override)
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

fn percent(part: u64, whole: u64) -> Option<u8> {
    if whole == 0 {
        return None;
    }
    Some((part * 100 / whole).min(100) as u8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use policy_classifier::classify;

    #[test]
    fn test_counts_verdicts_and_severities() {
        let mut stats = ModerationStats::default();
        stats.record_verdict(&classify("You're all idiots, this is sh*t", "General Discussion", "u1"));
        stats.record_verdict(&classify("Any tips for pricing stamps?", "Selling", "u1"));
        stats.record_verdict(&classify("Call me at 02012345678", "Selling", "u1"));

        assert_eq!(stats.total_analyzed, 3);
        assert_eq!(stats.violations_found, 2);
        assert_eq!(stats.clean_posts, 1);
        assert_eq!(stats.critical, 1);
        assert_eq!(stats.high, 1);
        assert_eq!(stats.medium, 1);
        assert_eq!(stats.low, 0);
        assert_eq!(stats.violation_rate(), 66);
    }

    #[test]
    fn test_rates_with_no_data() {
        let stats = ModerationStats::default();
        assert_eq!(stats.violation_rate(), 0);
        assert_eq!(stats.acceptance_rate(), None);
    }

    #[test]
    fn test_acceptance_rate_and_reset() {
        let mut stats = ModerationStats {
            ai_accepted: 3,
            human_override: 1,
            ..Default::default()
        };
        assert_eq!(stats.acceptance_rate(), Some(75));
        stats.reset();
        assert_eq!(stats, ModerationStats::default());
    }
}
