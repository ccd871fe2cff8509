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

//! orbit polylines for the scene, computed from one orbital period worth of propagated samples.
//!
//! The goal here is a curve that never breaks or jumps, not numerical exactness. Failed samples
//! are bridged by interpolating between their accepted neighbors, and if too many samples
//! failed we blend with the last accepted set of the same body. Both are lossy approximations
//! for rendering smoothness. In particular the blended points are not physical positions and
//! must not be used as such - position queries always go through the propagation engine.

use std::time::Duration;
use chrono::{DateTime, Utc};
use hashbrown::HashMap;
use serde::{Serialize,Deserialize};
use tracing::{debug, trace};
use orbview_common::{cartesian3::Cartesian3, sim_clock::SimulatedInstant};
use orbview_common::datetime::{de_duration_from_fractional_secs, ser_duration_as_fractional_secs, time_delta_as_secs_f64, time_delta_from_secs_f64};
use crate::bodies::{BodyId, PeriodPolicy};
use crate::element_record::{ElementRecord, RecordSource};
use crate::frames::SceneProjection;
use crate::propagation::PropagationEngine;

/* #region config *****************************************************************************/

#[derive(Debug,Clone,PartialEq,Serialize,Deserialize)]
#[serde(default)]
pub struct SamplerConfig {
    /// number of samples per period
    pub point_count: usize,

    /// fraction of successful samples at or above which we only interpolate
    pub min_success_ratio: f64,

    /// recompute interval at speed 1, scaled by 1/|speed| and clamped to [min_interval,max_interval]
    #[serde(serialize_with="ser_duration_as_fractional_secs", deserialize_with="de_duration_from_fractional_secs")]
    pub reference_interval: Duration,

    #[serde(serialize_with="ser_duration_as_fractional_secs", deserialize_with="de_duration_from_fractional_secs")]
    pub min_interval: Duration,

    /// also used while paused
    #[serde(serialize_with="ser_duration_as_fractional_secs", deserialize_with="de_duration_from_fractional_secs")]
    pub max_interval: Duration,

    /// wall clock age after which a set is recomputed
    #[serde(serialize_with="ser_duration_as_fractional_secs", deserialize_with="de_duration_from_fractional_secs")]
    pub max_cache_age: Duration,

    /// simulated time distance from the start of a set after which it is recomputed
    #[serde(serialize_with="ser_duration_as_fractional_secs", deserialize_with="de_duration_from_fractional_secs")]
    pub max_simulated_drift: Duration,

    /// previous sets that started more than this many periods of simulated time away are not used for blending
    pub max_previous_laps: f64,

    /// samples with any scene coordinate beyond this are treated as failed
    pub max_scene_coordinate: f64,

    /// longest plausible orbital period
    #[serde(serialize_with="ser_duration_as_fractional_secs", deserialize_with="de_duration_from_fractional_secs")]
    pub max_period: Duration,
}

impl Default for SamplerConfig {
    fn default()->Self {
        SamplerConfig {
            point_count: 120,
            min_success_ratio: 0.8,
            reference_interval: Duration::from_secs(1),
            min_interval: Duration::from_millis(50),
            max_interval: Duration::from_secs(2),
            max_cache_age: Duration::from_secs(30),
            max_simulated_drift: Duration::from_secs(30),
            max_previous_laps: 2.0,
            max_scene_coordinate: 50.0,
            max_period: Duration::from_secs( 30 * 86400),
        }
    }
}

impl SamplerConfig {
    /// minimum wall time between two recomputations at the given clock speed
    pub fn cadence_interval (&self, speed: f64)->Duration {
        if speed == 0.0 || !speed.is_finite() {
            self.max_interval
        } else {
            let secs = self.reference_interval.as_secs_f64() / speed.abs();
            Duration::from_secs_f64( secs.clamp( self.min_interval.as_secs_f64(), self.max_interval.as_secs_f64()))
        }
    }
}

/* #endregion config */

/* #region sample sets ************************************************************************/

/// how the points of a set were obtained
#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub enum SampleProvenance {
    /// enough samples succeeded, gaps (if any) were interpolated
    Interpolated,
    /// too few samples succeeded, points were blended with the previous set
    Blended,
    /// too few samples succeeded and there was no usable previous set
    Sparse,
    /// no usable samples at all
    Empty,
}

#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub enum RefreshReason {
    Missing,
    RecordChanged,
    SpeedChanged,
    Expired,
    Drifted,
}

/// one traversal of an orbit in scene coordinates. Closed (first point repeated at the end) if not empty
#[derive(Debug,Clone)]
pub struct OrbitSampleSet {
    points: Vec<Cartesian3>,
    computed_at: DateTime<Utc>,
    speed: f64,
    sim_start: DateTime<Utc>,
    period_secs: f64,
    record_epoch: DateTime<Utc>,
    record_source: RecordSource,
    provenance: SampleProvenance,
    n_accepted: usize,
    n_target: usize,
}

impl OrbitSampleSet {
    pub fn points (&self)->&[Cartesian3] { &self.points }
    /// wall clock time this set was computed at
    pub fn computed_at (&self)->DateTime<Utc> { self.computed_at }
    /// clock speed at the time of computation
    pub fn speed (&self)->f64 { self.speed }
    /// simulated instant of the first point
    pub fn sim_start (&self)->DateTime<Utc> { self.sim_start }
    pub fn period_secs (&self)->f64 { self.period_secs }
    pub fn provenance (&self)->SampleProvenance { self.provenance }
    pub fn n_accepted (&self)->usize { self.n_accepted }
    pub fn n_target (&self)->usize { self.n_target }

    pub fn is_closed (&self)->bool {
        match (self.points.first(), self.points.last()) {
            (Some(first), Some(last)) => self.points.len() > 1 && first == last,
            _ => false
        }
    }
}

/// the last accepted (open) set of a body that had fresh samples, as (fraction of period, point) pairs
#[derive(Debug,Clone)]
struct PreviousSet {
    samples: Vec<(f64,Cartesian3)>,
    sim_start: DateTime<Utc>,
    period_secs: f64,
}

impl PreviousSet {
    fn is_stale (&self, sim_now: &DateTime<Utc>, max_laps: f64)->bool {
        if !(self.period_secs.is_finite() && self.period_secs > 0.0) { return true }
        let dist = time_delta_as_secs_f64( &(*sim_now - self.sim_start)).abs();
        dist > max_laps * self.period_secs
    }

    /// position of `sim_start` within this set, as a fraction of its period
    fn phase_offset (&self, sim_start: &DateTime<Utc>)->f64 {
        time_delta_as_secs_f64( &(*sim_start - self.sim_start)) / self.period_secs
    }
}

#[derive(Debug,Default)]
struct SamplerEntry {
    current: Option<OrbitSampleSet>,
    previous: Option<PreviousSet>,
}

/* #endregion sample sets */

/* #region sampling functions *****************************************************************/

/// orbital period in seconds for a record, or None if we should not draw an orbit
pub fn resolve_period (record: &ElementRecord, policy: &PeriodPolicy, max_period_secs: f64)->Option<f64> {
    let p = record.period_secs();
    let plausible = p.is_finite() && p > 0.0 && p <= max_period_secs;

    match policy {
        PeriodPolicy::Computed => plausible.then_some(p),
        PeriodPolicy::FixedFallback { period_secs, min_plausible_secs } => {
            if plausible && p >= *min_plausible_secs { Some(p) } else { Some(*period_secs) }
        }
    }
}

/// propagate `n` samples evenly spaced over one period starting at `sim_start` and project them into
/// the scene. Failed, non-finite or out of range samples are None
pub fn sample_orbit<E: PropagationEngine + ?Sized> (
    engine: &E, record: &ElementRecord, projection: &SceneProjection,
    sim_start: &DateTime<Utc>, period_secs: f64, n: usize, max_scene_coordinate: f64
)->Vec<Option<Cartesian3>> {
    (0..n).map( |i| {
        let dt = time_delta_from_secs_f64( period_secs * i as f64 / n as f64)?;
        let t = sim_start.checked_add_signed( dt)?;
        match engine.propagate( record, &t) {
            Ok(state) => {
                let p = projection.project( &state.position);
                (p.is_finite() && p.max_abs_component() <= max_scene_coordinate).then_some(p)
            }
            Err(e) => {
                trace!("sample {} of {} failed: {}", i, record.norad_id(), e);
                None
            }
        }
    }).collect()
}

/// point at period fraction `f` of a periodic curve given by (fraction,point) samples sorted by fraction
/// (which have to be in [0,1)). Segments are linear, the segment between the last and the first sample
/// wraps around
fn interpolate_at (samples: &[(f64,Cartesian3)], f: f64)->Option<Cartesian3> {
    let (first, last) = (samples.first()?, samples.last()?);
    let k = samples.partition_point( |(a,_)| *a <= f);

    let (f0, p0) = if k > 0 { samples[k-1] } else { (last.0 - 1.0, last.1) };
    let (f1, p1) = if k < samples.len() { samples[k] } else { (first.0 + 1.0, first.1) };

    let span = f1 - f0;
    let r = if span > 0.0 { (f - f0) / span } else { 0.0 };
    Some( Cartesian3::linear_interpolation( &p0, &p1, r))
}

/// resample accepted (fraction,point) samples to `target` evenly spaced points ("arc interpolation").
/// Accepted samples that fall on the target grid are kept as is
pub fn interpolate_arc (samples: &[(f64,Cartesian3)], target: usize)->Vec<Cartesian3> {
    (0..target).filter_map( |j| interpolate_at( samples, j as f64 / target as f64)).collect()
}

/// rendering-smoothness heuristic: blend the fresh samples with the previous set of the same body,
/// weighted by the fraction of fresh samples (`fresh_weight`). The previous set is aligned in time:
/// fraction `f` of the new set maps to `phase_offset + f * period_ratio` of the previous one, with
/// `period_ratio` being new period / previous period. The result is not a physical position
pub fn blend_with_previous (
    samples: &[(f64,Cartesian3)], target: usize, fresh_weight: f64,
    previous: &[(f64,Cartesian3)], phase_offset: f64, period_ratio: f64
)->Vec<Cartesian3> {
    (0..target).filter_map( |j| {
        let f = j as f64 / target as f64;
        let g = (phase_offset + f * period_ratio).rem_euclid( 1.0);
        let prev = interpolate_at( previous, g);

        match (interpolate_at( samples, f), prev) {
            (Some(fresh), Some(prev)) => Some( Cartesian3::linear_interpolation( &prev, &fresh, fresh_weight)),
            (fresh, prev) => fresh.or(prev)
        }
    }).collect()
}

pub fn close_loop (points: &mut Vec<Cartesian3>) {
    if let Some(first) = points.first().copied() {
        points.push( first);
    }
}

/* #endregion sampling functions */

/// computes and caches one orbit polyline per body, and keeps the previous accepted set for gap filling
pub struct OrbitSampler {
    config: SamplerConfig,
    projection: SceneProjection,
    entries: HashMap<BodyId,SamplerEntry>,
}

impl OrbitSampler {
    pub fn new (config: SamplerConfig, projection: SceneProjection)->Self {
        OrbitSampler { config, projection, entries: HashMap::new() }
    }

    pub fn config (&self)->&SamplerConfig { &self.config }

    pub fn sample_set (&self, body: BodyId)->Option<&OrbitSampleSet> {
        self.entries.get( &body).and_then( |e| e.current.as_ref())
    }

    /// the current closed polyline for `body`, empty if we don't have one yet
    pub fn polyline (&self, body: BodyId)->&[Cartesian3] {
        self.sample_set( body).map( |s| s.points()).unwrap_or( &[])
    }

    /// why the cached set of `body` should be recomputed now, or None if it is still good
    pub fn refresh_reason (&self, body: BodyId, record: &ElementRecord, now: &SimulatedInstant)->Option<RefreshReason> {
        let Some(cur) = self.sample_set( body) else { return Some(RefreshReason::Missing) };

        // immediate - these change the shape of "one period from now"
        if cur.record_epoch != record.epoch() || cur.record_source != record.source() {
            return Some(RefreshReason::RecordChanged)
        }
        if cur.speed != now.speed {
            return Some(RefreshReason::SpeedChanged)
        }

        let age = time_delta_as_secs_f64( &(now.wall - cur.computed_at)).abs();
        if age < self.config.cadence_interval( now.speed).as_secs_f64() {
            return None
        }
        if age >= self.config.max_cache_age.as_secs_f64() {
            return Some(RefreshReason::Expired)
        }

        let drift = time_delta_as_secs_f64( &(now.instant - cur.sim_start)).abs();
        if drift >= self.config.max_simulated_drift.as_secs_f64() {
            return Some(RefreshReason::Drifted)
        }

        None
    }

    /// recompute the set for `body` if it is due. Returns the reason if it was recomputed
    pub fn update<E: PropagationEngine + ?Sized> (&mut self, body: BodyId, record: &ElementRecord, engine: &E, now: &SimulatedInstant)->Option<RefreshReason> {
        let reason = self.refresh_reason( body, record, now)?;
        let set = self.compute( body, record, engine, now);
        debug!("orbit of {} recomputed ({:?}): {:?} {}/{} samples", body, reason, set.provenance, set.n_accepted, set.n_target);
        Some(reason)
    }

    /// unconditionally recompute the set for `body`, starting at the simulated instant of `now`
    pub fn compute<E: PropagationEngine + ?Sized> (&mut self, body: BodyId, record: &ElementRecord, engine: &E, now: &SimulatedInstant)->&OrbitSampleSet {
        let cfg = &self.config;
        let n = cfg.point_count.max(2);
        let entry = self.entries.entry( body).or_default();

        let period = resolve_period( record, &body.config().period_policy, cfg.max_period.as_secs_f64());

        let (mut points, provenance, n_accepted, period_secs) = match period {
            Some(period_secs) => {
                let is_stale = entry.previous.as_ref().is_some_and( |prev| prev.is_stale( &now.instant, cfg.max_previous_laps));
                if is_stale {
                    debug!("discarding stale previous orbit of {}", body);
                    entry.previous = None;
                }

                let samples: Vec<(f64,Cartesian3)> = sample_orbit( engine, record, &self.projection, &now.instant, period_secs, n, cfg.max_scene_coordinate)
                    .into_iter()
                    .enumerate()
                    .filter_map( |(i,p)| p.map( |p| (i as f64 / n as f64, p)))
                    .collect();
                let n_accepted = samples.len();
                let fresh_weight = n_accepted as f64 / n as f64;

                let (points, provenance) = if n_accepted > 0 && fresh_weight >= cfg.min_success_ratio {
                    (interpolate_arc( &samples, n), SampleProvenance::Interpolated)
                } else if let Some(prev) = &entry.previous {
                    let phase_offset = prev.phase_offset( &now.instant);
                    debug_assert!( phase_offset.is_finite());
                    let period_ratio = period_secs / prev.period_secs;
                    (blend_with_previous( &samples, n, fresh_weight, &prev.samples, phase_offset, period_ratio), SampleProvenance::Blended)
                } else if n_accepted > 0 {
                    (samples.iter().map( |(_,p)| *p).collect(), SampleProvenance::Sparse)
                } else {
                    (Vec::new(), SampleProvenance::Empty)
                };

                // a set without fresh samples is only the old one moved forward, keep the old one
                if n_accepted > 0 && !points.is_empty() {
                    let prev_samples = if provenance == SampleProvenance::Sparse {
                        samples
                    } else {
                        points.iter().enumerate().map( |(j,p)| (j as f64 / points.len() as f64, *p)).collect()
                    };
                    entry.previous = Some( PreviousSet { samples: prev_samples, sim_start: now.instant, period_secs });
                }

                (points, provenance, n_accepted, period_secs)
            }
            None => {
                debug!("no plausible orbital period for {} ({:.1}s)", body, record.period_secs());
                (Vec::new(), SampleProvenance::Empty, 0, f64::NAN)
            }
        };

        close_loop( &mut points);

        let set = OrbitSampleSet {
            points,
            computed_at: now.wall,
            speed: now.speed,
            sim_start: now.instant,
            period_secs,
            record_epoch: record.epoch(),
            record_source: record.source(),
            provenance,
            n_accepted,
            n_target: n,
        };

        entry.current.insert( set)
    }
}
