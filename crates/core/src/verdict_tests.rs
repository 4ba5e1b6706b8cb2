// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn wire_values_are_upper_snake() {
    let v = Verdict::block("pins_scope");
    let json = serde_json::to_value(&v).unwrap();
    assert_eq!(json["schema_version"], "scc.verdict.v1");
    assert_eq!(json["verdict"], "BLOCK");
    assert_eq!(json["reasons"][0], "pins_scope");
    assert_eq!(json["actions"][0], "block");
}

#[test]
fn need_input_carries_missing_list() {
    let v = Verdict::need_input("preflight_failed", vec!["README.md".to_string()]);
    assert_eq!(v.verdict, VerdictKind::NeedInput);
    assert_eq!(v.needs_input, ["README.md"]);
    assert_eq!(v.primary_reason(), Some("preflight_failed"));
}

#[test]
fn pass_has_no_reasons_or_actions() {
    let v = Verdict::pass();
    assert!(v.reasons.is_empty());
    assert!(v.actions.is_empty());
    assert_eq!(v.primary_reason(), None);
}

#[test]
fn verdict_roundtrips() {
    let v = Verdict::retry("stale_map");
    let json = serde_json::to_string(&v).unwrap();
    let back: Verdict = serde_json::from_str(&json).unwrap();
    assert_eq!(back, v);
}
