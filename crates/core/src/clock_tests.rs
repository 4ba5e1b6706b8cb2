// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn fake_clock_starts_fixed_and_advances() {
    let clock = FakeClock::new();
    let start = clock.epoch_ms();

    clock.advance(Duration::from_secs(5));
    assert_eq!(clock.epoch_ms(), start + 5_000);

    clock.advance(Duration::from_millis(250));
    assert_eq!(clock.epoch_ms(), start + 5_250);
}

#[test]
fn fake_clock_clones_share_the_counter() {
    let clock = FakeClock::new();
    let other = clock.clone();
    clock.advance(Duration::from_millis(250));
    assert_eq!(other.epoch_ms(), clock.epoch_ms());

    other.set_epoch_ms(42);
    assert_eq!(clock.epoch_ms(), 42);
}

#[test]
fn system_clock_epoch_is_sane() {
    // 2020-01-01 in epoch ms
    assert!(SystemClock.epoch_ms() > 1_577_836_800_000);
}
