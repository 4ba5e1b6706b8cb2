// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[parameterized(
    fast = { "fastlane", Lane::Fastlane, 900 },
    main = { "mainlane", Lane::Mainlane, 500 },
    batch = { "batchlane", Lane::Batchlane, 100 },
)]
fn lanes_parse_and_prioritize(name: &str, lane: Lane, priority: i64) {
    assert_eq!(name.parse::<Lane>().unwrap(), lane);
    assert_eq!(lane.default_priority(), priority);
    assert_eq!(lane.to_string(), name);
}

#[test]
fn unknown_lane_is_rejected() {
    let err = "slowlane".parse::<Lane>().unwrap_err();
    assert_eq!(err, UnknownLane("slowlane".to_string()));
}

#[test]
fn lane_serde_uses_lowercase() {
    assert_eq!(serde_json::to_string(&Lane::Fastlane).unwrap(), "\"fastlane\"");
    let lane: Lane = serde_json::from_str("\"batchlane\"").unwrap();
    assert_eq!(lane, Lane::Batchlane);
    assert!(serde_json::from_str::<Lane>("\"slowlane\"").is_err());
}
