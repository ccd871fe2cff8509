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

//! the propagation engine capability: turn an element record and an instant into an inertial state.
//!
//! The pipeline only relies on the contract of [`PropagationEngine`] (deterministic, never panics,
//! returns an error if the result is not usable). We provide an SGP4/SDP4 engine for parsed
//! records, a secular-J2 Keplerian engine for the built-in fallback records, and [`EngineSelector`]
//! which picks one of them based on where the record came from.

use std::{cell::RefCell, rc::Rc, time::Duration};
use chrono::{DateTime, Utc};
use hashbrown::HashMap;
use tracing::{debug, trace};
use orbview_common::{cartesian3::Cartesian3, datetime::time_delta_as_secs_f64, geo_constants::{GM_EARTH, J2_EARTH, WGS72_EARTH_RADIUS}};
use crate::element_record::{ElementRecord, RecordSource};
use crate::errors::{propagation_error, tle_error, OrbitalError, Result};

/// position (km) and velocity (km/s) in the (quasi) inertial frame of the propagator (TEME),
/// valid for `instant`
#[derive(Debug,Clone,Copy,PartialEq)]
pub struct InertialState {
    pub position: Cartesian3,
    pub velocity: Cartesian3,
    pub instant: DateTime<Utc>,
}

impl InertialState {
    pub fn new (position: Cartesian3, velocity: Cartesian3, instant: DateTime<Utc>)->Self {
        InertialState { position, velocity, instant }
    }

    pub fn is_finite (&self)->bool {
        self.position.is_finite() && self.velocity.is_finite()
    }
}

pub trait PropagationEngine {
    /// deterministic for a given (record,instant). Returns an error if the numerical method diverges,
    /// the orbit has decayed or `instant` is too far from the record epoch
    fn propagate (&self, record: &ElementRecord, instant: &DateTime<Utc>)->Result<InertialState>;
}

fn check_span (record: &ElementRecord, instant: &DateTime<Utc>, max_span: Duration)->Result<f64> {
    let dt = time_delta_as_secs_f64( &(*instant - record.epoch()));
    if dt.abs() > max_span.as_secs_f64() {
        Err( propagation_error!("{} is {:.1} days from epoch of {}", instant, dt / 86400.0, record.norad_id()))
    } else {
        Ok(dt)
    }
}

fn checked_state (position: Cartesian3, velocity: Cartesian3, instant: &DateTime<Utc>)->Result<InertialState> {
    let state = InertialState::new( position, velocity, *instant);
    if state.is_finite() { Ok(state) } else { Err( propagation_error!("non-finite state at {}", instant)) }
}

/* #region SGP4 *******************************************************************************/

struct Sgp4Model {
    elements: sgp4::Elements,
    constants: sgp4::Constants,
}

/// prepared model for one record. Failed preparations are kept so that we don't retry every sample
struct PreparedRecord {
    epoch: DateTime<Utc>,
    model: std::result::Result<Sgp4Model, String>,
}

/// SGP4 (near earth) / SDP4 (deep space) based on the `sgp4` crate. Prepared models are cached per
/// catalog number and replaced when a record with a different epoch shows up
pub struct Sgp4Engine {
    max_span: Duration,
    models: RefCell<HashMap<u32,Rc<PreparedRecord>>>,
}

impl Sgp4Engine {
    pub fn new (max_span: Duration)->Self {
        Sgp4Engine { max_span, models: RefCell::new( HashMap::new()) }
    }

    fn prepare (record: &ElementRecord)->std::result::Result<Sgp4Model, String> {
        let (line1, line2) = record.lines();
        let elements = sgp4::Elements::from_tle( record.name().map( |s| s.to_string()), line1.as_bytes(), line2.as_bytes())
            .map_err( |e| format!("{:?}", e))?;
        let constants = sgp4::Constants::from_elements( &elements).map_err( |e| format!("{:?}", e))?;
        Ok( Sgp4Model { elements, constants })
    }

    fn prepared (&self, record: &ElementRecord)->Rc<PreparedRecord> {
        let mut models = self.models.borrow_mut();
        if let Some(p) = models.get( &record.norad_id()) {
            if p.epoch == record.epoch() { return p.clone() }
        }

        let model = Self::prepare( record);
        if let Err(e) = &model { debug!("cannot initialize SGP4 for {}: {}", record.norad_id(), e) }

        let p = Rc::new( PreparedRecord { epoch: record.epoch(), model });
        models.insert( record.norad_id(), p.clone());
        p
    }
}

impl PropagationEngine for Sgp4Engine {
    fn propagate (&self, record: &ElementRecord, instant: &DateTime<Utc>)->Result<InertialState> {
        check_span( record, instant, self.max_span)?;

        let prepared = self.prepared( record);
        let model = prepared.model.as_ref().map_err( |e| tle_error!("unusable elements for {}: {}", record.norad_id(), e))?;

        let minutes = model.elements.datetime_to_minutes_since_epoch( &instant.naive_utc())
            .map_err( |e| propagation_error!("{:?}", e))?;
        let prediction = model.constants.propagate( minutes)
            .map_err( |e| propagation_error!("{} at {}: {:?}", record.norad_id(), instant, e))?;

        checked_state( Cartesian3::from_array( &prediction.position), Cartesian3::from_array( &prediction.velocity), instant)
    }
}

/* #endregion SGP4 */

/* #region Kepler *****************************************************************************/

/// two body propagation with secular J2 drift of node, periapsis and mean anomaly. No drag.
/// This is what we use for the built-in fallback elements, which are only meant to show a
/// plausible orbit of the right shape and inclination. `max_span` only applies to parsed records
pub struct KeplerEngine {
    max_span: Duration,
}

const KEPLER_TOLERANCE: f64 = 1e-12;
const KEPLER_MAX_ITERATIONS: usize = 50;

impl KeplerEngine {
    pub fn new (max_span: Duration)->Self {
        KeplerEngine { max_span }
    }
}

/// solve E - e·sin E = M with Newton-Raphson. None if it does not converge
pub fn solve_kepler (mean_anomaly: f64, e: f64)->Option<f64> {
    let mut ea = if e < 0.8 { mean_anomaly } else { std::f64::consts::PI };

    for _ in 0..KEPLER_MAX_ITERATIONS {
        let f = ea - e * ea.sin() - mean_anomaly;
        let d = ea - (f / (1.0 - e * ea.cos()));
        let delta = (d - ea).abs();
        ea = d;
        if delta < KEPLER_TOLERANCE { return Some(ea) }
    }
    None
}

impl PropagationEngine for KeplerEngine {
    fn propagate (&self, record: &ElementRecord, instant: &DateTime<Utc>)->Result<InertialState> {
        // built-in fallback elements have a fixed epoch and have to stay usable indefinitely. There is
        // nothing to diverge in a two-body model, so only parsed records are limited to max_span
        let dt = match record.source() {
            RecordSource::Parsed => check_span( record, instant, self.max_span)?,
            RecordSource::Fallback => time_delta_as_secs_f64( &(*instant - record.epoch()))
        };

        let e = record.eccentricity();
        let i = record.inclination();
        let n0 = record.mean_motion_rad_per_sec();
        let a = (GM_EARTH / (n0*n0)).cbrt();
        let p = a * (1.0 - e*e);
        if !(p > 0.0) {
            return Err( propagation_error!("degenerate orbit for {}", record.norad_id()))
        }

        let (sin_i, cos_i) = i.sin_cos();
        let k = 1.5 * J2_EARTH * (WGS72_EARTH_RADIUS / p).powi(2) * n0;
        let raan_dot = -k * cos_i;
        let argp_dot = k * (2.0 - 2.5 * sin_i * sin_i);
        let m_dot = n0 + k * (1.0 - e*e).sqrt() * (1.0 - 1.5 * sin_i * sin_i);

        let raan = record.raan() + raan_dot * dt;
        let argp = record.arg_periapsis() + argp_dot * dt;
        let m = (record.mean_anomaly() + m_dot * dt) % std::f64::consts::TAU;

        let ea = solve_kepler( m, e).ok_or_else( || propagation_error!("Kepler equation did not converge for {}", record.norad_id()))?;
        let (sin_e, cos_e) = ea.sin_cos();
        let nu = 2.0 * ((1.0 + e).sqrt() * (ea/2.0).sin()).atan2( (1.0 - e).sqrt() * (ea/2.0).cos());
        let r = a * (1.0 - e * cos_e);
        let (sin_nu, cos_nu) = nu.sin_cos();

        // perifocal to inertial
        let (sin_o, cos_o) = raan.sin_cos();
        let (sin_w, cos_w) = argp.sin_cos();
        let pv = Cartesian3::new( cos_o*cos_w - sin_o*sin_w*cos_i, sin_o*cos_w + cos_o*sin_w*cos_i, sin_w*sin_i);
        let qv = Cartesian3::new( -cos_o*sin_w - sin_o*cos_w*cos_i, -sin_o*sin_w + cos_o*cos_w*cos_i, cos_w*sin_i);

        let h = (GM_EARTH / p).sqrt();
        let position = pv * (r * cos_nu) + qv * (r * sin_nu);
        let velocity = pv * (-h * sin_nu) + qv * (h * (e + cos_nu));

        checked_state( position, velocity, instant)
    }
}

/* #endregion Kepler */

/// picks the engine by record provenance: parsed records go to the primary engine, built-in
/// fallback records to the fallback engine. Parsed records the primary cannot initialize for
/// also go to the fallback
pub struct EngineSelector<P: PropagationEngine = Sgp4Engine, F: PropagationEngine = KeplerEngine> {
    primary: P,
    fallback: F,
}

impl EngineSelector<Sgp4Engine,KeplerEngine> {
    pub fn with_max_span (max_span: Duration)->Self {
        EngineSelector { primary: Sgp4Engine::new(max_span), fallback: KeplerEngine::new(max_span) }
    }
}

impl<P: PropagationEngine, F: PropagationEngine> EngineSelector<P,F> {
    pub fn new (primary: P, fallback: F)->Self {
        EngineSelector { primary, fallback }
    }
}

impl<P: PropagationEngine, F: PropagationEngine> PropagationEngine for EngineSelector<P,F> {
    fn propagate (&self, record: &ElementRecord, instant: &DateTime<Utc>)->Result<InertialState> {
        match record.source() {
            RecordSource::Parsed => match self.primary.propagate( record, instant) {
                Err(OrbitalError::TleError(msg)) => {
                    trace!("primary engine rejected {}: {}", record.norad_id(), msg);
                    self.fallback.propagate( record, instant)
                }
                res => res
            }
            RecordSource::Fallback => self.fallback.propagate( record, instant)
        }
    }
}
