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

use chrono::{DateTime, Utc};
use strum::IntoEnumIterator;
use tracing::{debug, trace};
use orbview_common::{cartesian3::Cartesian3, cartographic::Cartographic, sim_clock::{VirtualClock, WallClock}};
use crate::bodies::BodyId;
use crate::config::OrbitalConfig;
use crate::errors::{op_failed, propagation_error, OrbitalError, Result};
use crate::frames::{earth_fixed_to_geodetic, inertial_to_earth_fixed, inertial_to_geodetic, SceneProjection, ScenePositionFrame};
use crate::orbit_sampler::{OrbitSampleSet, OrbitSampler};
use crate::propagation::{EngineSelector, InertialState, PropagationEngine};
use crate::tle_store::ElementCatalog;

/// the per-tick query surface for the scene. Owns the element catalog, the propagation engine and
/// the orbit sampler. Everything in here runs synchronously inside the host's frame tick
pub struct SatelliteTracker<E: PropagationEngine = EngineSelector> {
    engine: E,
    catalog: ElementCatalog,
    sampler: OrbitSampler,
    projection: SceneProjection,
    position_frame: ScenePositionFrame,
}

impl SatelliteTracker<EngineSelector> {
    /// a tracker with the default SGP4/Kepler engine selection
    pub fn new (config: OrbitalConfig)->Self {
        let engine = EngineSelector::with_max_span( config.propagation.max_span);
        SatelliteTracker::with_engine( config, engine)
    }
}

impl<E: PropagationEngine> SatelliteTracker<E> {
    pub fn with_engine (config: OrbitalConfig, engine: E)->Self {
        SatelliteTracker {
            engine,
            catalog: ElementCatalog::new( config.fetch),
            sampler: OrbitSampler::new( config.sampler, config.projection),
            projection: config.projection,
            position_frame: config.position_frame,
        }
    }

    pub fn catalog (&self)->&ElementCatalog { &self.catalog }
    pub fn catalog_mut (&mut self)->&mut ElementCatalog { &mut self.catalog }

    pub fn engine (&self)->&E { &self.engine }

    pub fn projection (&self)->&SceneProjection { &self.projection }

    pub fn position_frame (&self)->ScenePositionFrame { self.position_frame }
    pub fn set_position_frame (&mut self, frame: ScenePositionFrame) { self.position_frame = frame }

    /// refresh orbit polylines that are due. Returns the number of recomputed orbits
    pub fn tick<W: WallClock> (&mut self, clock: &VirtualClock<W>)->usize {
        let now = clock.capture();
        let mut n = 0;

        for body in BodyId::iter() {
            if let Some(record) = self.catalog.latest( body) {
                if self.sampler.update( body, record, &self.engine, &now).is_some() { n += 1 }
            }
        }
        n
    }

    pub fn propagate (&self, body: BodyId, instant: &DateTime<Utc>)->Result<InertialState> {
        let record = self.catalog.latest( body).ok_or_else( || op_failed!("no elements for {}", body))?;
        self.engine.propagate( record, instant)
    }

    /// scene position of `body` at `instant`, or the reason why there is none for this instant
    pub fn try_scene_position (&self, body: BodyId, instant: &DateTime<Utc>)->Result<Cartesian3> {
        let state = self.propagate( body, instant)?;

        let p = match self.position_frame {
            ScenePositionFrame::Inertial => self.projection.project( &state.position),
            ScenePositionFrame::EarthFixed => {
                let ef = inertial_to_earth_fixed( &state);
                let geo = earth_fixed_to_geodetic( &ef.position)?;
                self.projection.geodetic_to_scene( &geo)
            }
        };

        if p.is_finite() { Ok(p) } else { Err( propagation_error!("non-finite scene position for {}", body)) }
    }

    /// scene position of `body` at `instant`. None means there is nothing to render for this instant
    pub fn get_scene_position (&self, body: BodyId, instant: &DateTime<Utc>)->Option<Cartesian3> {
        match self.try_scene_position( body, instant) {
            Ok(p) => Some(p),
            Err(e) => {
                trace!("no scene position for {} at {}: {}", body, instant, e);
                None
            }
        }
    }

    /// geodetic position (radians, km above ellipsoid) of `body` at `instant`
    pub fn get_geodetic_position (&self, body: BodyId, instant: &DateTime<Utc>)->Result<Cartographic> {
        inertial_to_geodetic( &self.propagate( body, instant)?)
    }

    /// the current closed orbit polyline of `body` in scene coordinates. Empty if there is no data yet
    pub fn get_orbit_polyline (&self, body: BodyId)->&[Cartesian3] {
        self.sampler.polyline( body)
    }

    pub fn orbit_sample_set (&self, body: BodyId)->Option<&OrbitSampleSet> {
        self.sampler.sample_set( body)
    }
}
