/*
 * Copyright © 2025, United States Government, as represented by the Administrator of 
 * the National Aeronautics and Space Administration. All rights reserved.
 *
 * The “ODIN” software is licensed under the Apache License, Version 2.0 (the "License"); 
 * you may not use this file except in compliance with the License. You may obtain a copy 
 * of the License at http://www.apache.org/licenses/LICENSE-2.0.
 *
 * Unless required by applicable law or agreed to in writing, software distributed under
 * the License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND,
 * either express or implied. See the License for the specific language governing permissions
 * and limitations under the License.
 */
#![allow(unused)]

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use orbview_common::sim_clock::{ClockMode, ManualWallClock, VirtualClock, WallClock};

/// unit tests for the virtual clock
/// run with "cargo test test_clock -- --nocapture"

#[derive(Debug)]
enum Step { Speed(f64), Reverse, Pause, Resume }

fn start_time ()->DateTime<Utc> {
    Utc.with_ymd_and_hms( 2025, 3, 17, 12, 0, 0).unwrap()
}

fn manual_clock ()->(ManualWallClock, VirtualClock<ManualWallClock>) {
    let wall = ManualWallClock::new( start_time());
    let clock = VirtualClock::with_wall_clock( wall.clone());
    (wall, clock)
}

#[test]
fn test_clock_live () {
    let (wall, clock) = manual_clock();
    assert!( clock.is_live());
    assert_eq!( clock.speed(), 1.0);
    assert_eq!( clock.effective_instant(), start_time());

    wall.advance_secs( 42.5);
    assert_eq!( clock.effective_instant(), start_time() + TimeDelta::milliseconds(42_500));
}

#[test]
fn test_clock_speed_change_scenario () {
    let (wall, mut clock) = manual_clock();
    wall.advance_secs( 5.0);

    let t = clock.effective_instant();
    assert!( clock.set_speed( 10.0));
    println!("T = {}, after setSpeed(10): {}", t, clock.effective_instant());
    assert_eq!( clock.effective_instant(), t);

    wall.advance_secs( 1.0);
    assert_eq!( clock.effective_instant(), t + TimeDelta::seconds(10));
}

#[test]
fn test_clock_continuity () {
    let (wall, mut clock) = manual_clock();

    // every transition is taken at a fixed wall time, so the effective instant before and after has to be identical
    let steps = [
        Step::Speed(3.0), Step::Reverse, Step::Speed(-250.5), Step::Pause, Step::Reverse,
        Step::Speed(0.25), Step::Pause, Step::Resume, Step::Speed(1e4), Step::Reverse
    ];

    for step in steps.iter() {
        wall.advance_secs( 1.7);
        let before = clock.effective_instant();
        match step {
            Step::Speed(s) => { clock.set_speed(*s); }
            Step::Reverse => clock.reverse(),
            Step::Pause => clock.pause(),
            Step::Resume => clock.resume(),
        }
        let after = clock.effective_instant();
        println!("  {:16} speed {:>8}  {} -> {}", format!("{:?}",step), clock.speed(), before, after);
        assert_eq!( before, after, "discontinuity at {:?}", step);
    }
}

#[test]
fn test_clock_pause_resume () {
    let (wall, mut clock) = manual_clock();
    clock.set_speed( -4.0);
    wall.advance_secs( 2.0);
    assert_eq!( clock.effective_instant(), start_time() - TimeDelta::seconds(8));

    clock.pause();
    assert!( clock.is_paused());
    let frozen = clock.effective_instant();
    for _ in 0..10 {
        wall.advance_secs( 3600.0);
        assert_eq!( clock.effective_instant(), frozen);
    }

    clock.resume(); // restores the last non-zero magnitude, forwards
    assert_eq!( clock.speed(), 4.0);
    wall.advance_secs( 1.0);
    assert_eq!( clock.effective_instant(), frozen + TimeDelta::seconds(4));

    clock.resume(); // not paused, no change
    assert_eq!( clock.speed(), 4.0);
}

#[test]
fn test_clock_resume_defaults_to_one () {
    let (wall, mut clock) = manual_clock();
    clock.set_speed( 0.0);
    assert!( clock.is_paused());
    clock.resume();
    assert_eq!( clock.speed(), 1.0);
}

#[test]
fn test_clock_reverse () {
    let (wall, mut clock) = manual_clock();
    clock.pause();
    clock.reverse();
    assert_eq!( clock.speed(), -1.0);

    clock.set_speed( 60.0);
    clock.reverse();
    assert_eq!( clock.speed(), -60.0);
    clock.reverse();
    assert_eq!( clock.speed(), 60.0);
}

#[test]
fn test_clock_invalid_input () {
    let (wall, mut clock) = manual_clock();
    clock.set_speed( 2.0);
    wall.advance_secs( 10.0);
    let before = clock.capture();

    assert!( !clock.set_speed( f64::NAN));
    assert!( !clock.set_speed( f64::INFINITY));
    assert!( !clock.set_speed( f64::NEG_INFINITY));
    assert!( !clock.set_instant_epoch_millis( f64::NAN));
    assert!( !clock.set_instant_epoch_millis( f64::INFINITY));

    assert_eq!( clock.speed(), 2.0);
    assert_eq!( clock.capture(), before);
}

#[test]
fn test_clock_set_instant () {
    let (wall, mut clock) = manual_clock();
    clock.set_speed( 5.0);

    let t = Utc.with_ymd_and_hms( 2000, 1, 1, 0, 0, 0).unwrap();
    clock.set_instant( t);
    assert_eq!( clock.effective_instant(), t);
    assert_eq!( clock.speed(), 5.0);

    wall.advance_secs( 2.0);
    assert_eq!( clock.effective_instant(), t + TimeDelta::seconds(10));

    assert!( clock.set_instant_epoch_millis( 946_684_800_000.0));
    assert_eq!( clock.effective_instant(), t);
}

#[test]
fn test_clock_reset_to_live () {
    let (wall, mut clock) = manual_clock();
    clock.set_speed( -30.0);
    wall.advance_secs( 100.0);
    clock.reset_to_live();

    assert!( clock.is_live());
    assert_eq!( clock.mode(), ClockMode::Live);
    assert_eq!( clock.speed(), 1.0);
    assert_eq!( clock.effective_instant(), wall.now());
}
