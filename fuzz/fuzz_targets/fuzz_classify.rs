// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (C) 2025 Jonathan D.A. Jewell

#![no_main]

use libfuzzer_sys::fuzz_target;
use policy_classifier::{classify, RuleSet, Severity, Status};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    // First line picks the board, the rest is the post body
    let (board_hint, content) = text.split_once('\n').unwrap_or(("", text));
    let boards = RuleSet::forum_default();
    let names = boards.board_names();
    let board = names
        .iter()
        .find(|b| b.eq_ignore_ascii_case(board_hint.trim()))
        .copied()
        .unwrap_or(board_hint);

    let verdict = classify(content, board, "fuzzer");

    assert_eq!(verdict.status == Status::Flagged, !verdict.violations.is_empty());
    let max = verdict
        .violations
        .iter()
        .map(|v| v.severity)
        .max()
        .unwrap_or(Severity::Low);
    assert_eq!(verdict.priority, max);
    assert!(verdict.confidence <= 100);
    assert_eq!(verdict, classify(content, board, "fuzzer"));
});
