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

//! the virtual clock that owns simulated time.
//!
//! Simulated time is either `Live` (identical to wall time) or `Custom`, in which case it is
//! reconstructed from a captured [`SimulatedInstant`] as
//!
//! ```text
//! base.instant + (wall_now - base.wall) * base.speed
//! ```
//!
//! Every transition (speed change, reverse, pause, resume) first captures the current effective
//! instant and uses it as the new base, which makes the effective instant a continuous function of
//! wall time even though its slope changes. `set_instant` and `reset_to_live` are the only
//! operations that intentionally jump.
//!
//! There is no global clock - consumers get a reference to the instance they should use.

use std::sync::{Arc, Mutex};
use chrono::{DateTime, TimeDelta, Utc};
use tracing::{debug, warn};
use crate::datetime::{time_delta_as_secs_f64, time_delta_from_secs_f64};

/* #region wall clock sources *****************************************************************/

/// the source of wall clock time for a [`VirtualClock`]
pub trait WallClock {
    fn now (&self)->DateTime<Utc>;
}

#[derive(Debug,Clone,Copy,Default)]
pub struct SystemWallClock;

impl WallClock for SystemWallClock {
    #[inline]
    fn now (&self)->DateTime<Utc> { Utc::now() }
}

/// an explicitly advanced wall clock. Clones share the same time so that a test (or a host that
/// drives time from its own frame timestamps) can keep a handle after moving one into a VirtualClock
#[derive(Debug,Clone)]
pub struct ManualWallClock {
    now: Arc<Mutex<DateTime<Utc>>>
}

impl ManualWallClock {
    pub fn new (start: DateTime<Utc>)->Self {
        ManualWallClock { now: Arc::new( Mutex::new(start)) }
    }

    pub fn set (&self, t: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else( |e| e.into_inner()) = t;
    }

    pub fn advance (&self, dt: TimeDelta) {
        let mut now = self.now.lock().unwrap_or_else( |e| e.into_inner());
        if let Some(t) = now.checked_add_signed(dt) { *now = t }
    }

    pub fn advance_secs (&self, secs: f64) {
        if let Some(dt) = time_delta_from_secs_f64(secs) { self.advance(dt) }
    }
}

impl WallClock for ManualWallClock {
    fn now (&self)->DateTime<Utc> {
        *self.now.lock().unwrap_or_else( |e| e.into_inner())
    }
}

/* #endregion wall clock sources */

/* #region simulated instant ******************************************************************/

/// a point in simulated time together with the wall clock time it was captured at and the speed
/// that was in effect. This is all we need to reconstruct simulated time for any later wall time
#[derive(Debug,Clone,Copy,PartialEq)]
pub struct SimulatedInstant {
    pub instant: DateTime<Utc>,
    pub wall: DateTime<Utc>,
    pub speed: f64,
}

impl SimulatedInstant {
    /// simulated time at `wall_now`. Saturates at the chrono range limits
    pub fn project (&self, wall_now: DateTime<Utc>)->DateTime<Utc> {
        if self.speed == 0.0 { return self.instant }

        let elapsed = wall_now - self.wall;
        let sim_elapsed = match elapsed.num_nanoseconds() {
            Some(nanos) => time_delta_from_secs_f64( nanos as f64 * 1e-9 * self.speed),
            None => time_delta_from_secs_f64( time_delta_as_secs_f64(&elapsed) * self.speed)
        };

        let saturated = || {
            if (elapsed >= TimeDelta::zero()) == (self.speed > 0.0) { DateTime::<Utc>::MAX_UTC } else { DateTime::<Utc>::MIN_UTC }
        };

        match sim_elapsed {
            Some(dt) => self.instant.checked_add_signed(dt).unwrap_or_else( saturated),
            None => saturated()
        }
    }
}

/* #endregion simulated instant */

/* #region virtual clock **********************************************************************/

#[derive(Debug,Clone,Copy,PartialEq)]
pub enum ClockMode {
    /// simulated time is wall time (speed 1)
    Live,
    /// simulated time is derived from a captured base
    Custom(SimulatedInstant),
}

/// the clock every pipeline stage reads its notion of "now" from
#[derive(Debug)]
pub struct VirtualClock<W: WallClock = SystemWallClock> {
    wall: W,
    mode: ClockMode,
    resume_speed: f64, // last non-zero speed magnitude
}

impl VirtualClock<SystemWallClock> {
    pub fn new ()->Self {
        VirtualClock::with_wall_clock( SystemWallClock)
    }
}

impl Default for VirtualClock<SystemWallClock> {
    fn default()->Self { VirtualClock::new() }
}

impl<W: WallClock> VirtualClock<W> {
    pub fn with_wall_clock (wall: W)->Self {
        VirtualClock { wall, mode: ClockMode::Live, resume_speed: 1.0 }
    }

    pub fn wall_now (&self)->DateTime<Utc> {
        self.wall.now()
    }

    pub fn mode (&self)->ClockMode { self.mode }

    pub fn is_live (&self)->bool { matches!( self.mode, ClockMode::Live) }

    pub fn speed (&self)->f64 {
        match self.mode {
            ClockMode::Live => 1.0,
            ClockMode::Custom(base) => base.speed
        }
    }

    pub fn is_paused (&self)->bool { self.speed() == 0.0 }

    /// the current simulated instant together with the wall time and speed it was derived from
    pub fn capture (&self)->SimulatedInstant {
        let wall = self.wall.now();
        self.capture_at( wall)
    }

    fn capture_at (&self, wall: DateTime<Utc>)->SimulatedInstant {
        match self.mode {
            ClockMode::Live => SimulatedInstant { instant: wall, wall, speed: 1.0 },
            ClockMode::Custom(base) => SimulatedInstant { instant: base.project(wall), wall, speed: base.speed }
        }
    }

    pub fn effective_instant (&self)->DateTime<Utc> {
        self.capture().instant
    }

    /// capture the current effective instant and continue from there with `speed`.
    /// A speed of 0 pauses the clock. Non-finite speeds are ignored (returns false)
    pub fn set_speed (&mut self, speed: f64)->bool {
        if !speed.is_finite() {
            warn!("ignoring invalid clock speed {}", speed);
            return false
        }

        let speed = if speed == 0.0 { 0.0 } else { speed }; // no -0.0
        let mut base = self.capture();
        base.speed = speed;
        self.mode = ClockMode::Custom(base);
        if speed != 0.0 { self.resume_speed = speed.abs() }

        debug!("clock speed set to {} at {}", speed, base.instant);
        true
    }

    /// jump to simulated instant `t`, keeping the current speed
    pub fn set_instant (&mut self, t: DateTime<Utc>) {
        let base = SimulatedInstant { instant: t, wall: self.wall.now(), speed: self.speed() };
        self.mode = ClockMode::Custom(base);
        debug!("clock set to {}", t);
    }

    /// boundary version of [`set_instant`](Self::set_instant) for hosts that use epoch milliseconds.
    /// Non-finite or out of range values are ignored (returns false)
    pub fn set_instant_epoch_millis (&mut self, millis: f64)->bool {
        if millis.is_finite() && millis.abs() < i64::MAX as f64 {
            if let Some(t) = DateTime::<Utc>::from_timestamp_millis( millis.round() as i64) {
                self.set_instant(t);
                return true
            }
        }
        warn!("ignoring invalid clock instant {}", millis);
        false
    }

    pub fn pause (&mut self) {
        if !self.is_paused() { self.set_speed(0.0); }
    }

    /// continue with the magnitude of the last non-zero speed (forward). No-op if not paused
    pub fn resume (&mut self) {
        if self.is_paused() {
            let speed = if self.resume_speed > 0.0 { self.resume_speed } else { 1.0 };
            self.set_speed( speed);
        }
    }

    /// flip the direction of time, or start running backwards at -1 if paused
    pub fn reverse (&mut self) {
        let speed = self.speed();
        if speed == 0.0 { self.set_speed( -1.0); } else { self.set_speed( -speed); }
    }

    pub fn reset_to_live (&mut self) {
        self.mode = ClockMode::Live;
        self.resume_speed = 1.0;
        debug!("clock reset to live");
    }
}

/* #endregion virtual clock */
