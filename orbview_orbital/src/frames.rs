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

//! the frame transform chain: inertial → earth fixed → geodetic → scene.
//! All functions are pure. Angles are radians, distances km until we hit the scene projection

use chrono::{DateTime, Utc};
use serde::{Serialize,Deserialize};
use orbview_common::{angle::normalize_two_pi, cartesian3::Cartesian3, cartographic::Cartographic, datetime::days_since_j2000, TWO_PI};
use orbview_common::geo_constants::{EARTH_ANGULAR_VELOCITY, EQUATORIAL_EARTH_RADIUS};
use crate::errors::{OrbitalError, Result};
use crate::propagation::InertialState;

/* #region inertial <-> earth fixed ***********************************************************/

/// Earth Rotation Angle (IAU 2000) in [0,2π), using UT1 = UTC
pub fn earth_rotation_angle (t: &DateTime<Utc>)->f64 {
    let d = days_since_j2000(t);
    // split off the integral days to keep precision in the fraction
    let frac = d.fract() + 0.7790572732640 + 0.00273781191135448 * d;
    normalize_two_pi( TWO_PI * frac)
}

#[derive(Debug,Clone,Copy,PartialEq)]
pub struct EarthFixedState {
    pub position: Cartesian3,  // km
    pub velocity: Cartesian3,  // km/s, relative to the rotating frame
    pub instant: DateTime<Utc>,
}

/// earth fixed position of an inertial position at instant t
pub fn inertial_to_earth_fixed_position (pos: &Cartesian3, t: &DateTime<Utc>)->Cartesian3 {
    pos.rotate_z( -earth_rotation_angle(t))
}

pub fn earth_fixed_to_inertial_position (pos: &Cartesian3, t: &DateTime<Utc>)->Cartesian3 {
    pos.rotate_z( earth_rotation_angle(t))
}

/// rotate an inertial state into the earth fixed frame. The velocity is relative to the rotating
/// frame, i.e. we subtract ω × r
pub fn inertial_to_earth_fixed (state: &InertialState)->EarthFixedState {
    let era = earth_rotation_angle( &state.instant);
    let position = state.position.rotate_z( -era);
    let velocity = state.velocity.rotate_z( -era) - earth_rotation_cross( &position);
    EarthFixedState { position, velocity, instant: state.instant }
}

pub fn earth_fixed_to_inertial (state: &EarthFixedState)->InertialState {
    let era = earth_rotation_angle( &state.instant);
    let velocity = (state.velocity + earth_rotation_cross( &state.position)).rotate_z( era);
    InertialState::new( state.position.rotate_z( era), velocity, state.instant)
}

/// ω × r for the earth angular velocity vector (0,0,ω)
#[inline]
fn earth_rotation_cross (r: &Cartesian3)->Cartesian3 {
    Cartesian3::new( -EARTH_ANGULAR_VELOCITY * r.y, EARTH_ANGULAR_VELOCITY * r.x, 0.0)
}

/* #endregion inertial <-> earth fixed */

/* #region earth fixed <-> geodetic ***********************************************************/

pub fn earth_fixed_to_geodetic (pos: &Cartesian3)->Result<Cartographic> {
    Cartographic::from_earth_fixed( pos).ok_or_else( || OrbitalError::DegenerateGeometry( format!("no geodetic position for {}", pos)))
}

pub fn geodetic_to_earth_fixed (p: &Cartographic)->Cartesian3 {
    Cartesian3::from(p)
}

/// geodetic position of an inertial state, the full chain minus projection
pub fn inertial_to_geodetic (state: &InertialState)->Result<Cartographic> {
    earth_fixed_to_geodetic( &inertial_to_earth_fixed_position( &state.position, &state.instant))
}

/// the point on the ellipsoid surface below an inertial state
pub fn sub_satellite_point (state: &InertialState)->Result<Cartographic> {
    inertial_to_geodetic( state).map( |p| p.ground_point())
}

/* #endregion earth fixed <-> geodetic */

/* #region scene projection *******************************************************************/

/// in which frame scene positions of bodies are reported
#[derive(Debug,Clone,Copy,PartialEq,Eq,Serialize,Deserialize,Default)]
pub enum ScenePositionFrame {
    /// same frame as the orbit polylines, the scene has to rotate the globe by the earth rotation angle
    #[default]
    Inertial,
    /// through the geodetic stage, for scenes with a non-rotating globe
    EarthFixed,
}

/// the mapping into the renderer's right handed, y-up basis and distance scale. This is a pure
/// change of basis and units
#[derive(Debug,Clone,Copy,PartialEq,Serialize,Deserialize)]
#[serde(default)]
pub struct SceneProjection {
    /// radius of the rendered globe in scene units
    pub scene_earth_radius: f64,
    /// the earth radius in km this corresponds to
    pub earth_radius_km: f64,
}

impl Default for SceneProjection {
    fn default()->Self {
        SceneProjection { scene_earth_radius: 5.0, earth_radius_km: EQUATORIAL_EARTH_RADIUS }
    }
}

impl SceneProjection {
    #[inline]
    pub fn scale (&self)->f64 {
        self.scene_earth_radius / self.earth_radius_km
    }

    /// map a km position (inertial or earth fixed) into the scene: z-up becomes y-up
    pub fn project (&self, p: &Cartesian3)->Cartesian3 {
        let s = self.scale();
        Cartesian3::new( p.x * s, p.z * s, -p.y * s)
    }

    /// spherical placement of a geodetic position (radius is R + height). Lat/lon 0 is on the +x axis,
    /// the north pole on +y
    pub fn geodetic_to_scene (&self, p: &Cartographic)->Cartesian3 {
        let r = self.scale() * (self.earth_radius_km + p.height);
        let (sin_lat, cos_lat) = p.latitude.sin_cos();
        let (sin_lon, cos_lon) = p.longitude.sin_cos();
        Cartesian3::new( r * cos_lat * cos_lon, r * sin_lat, -r * cos_lat * sin_lon)
    }
}

/* #endregion scene projection */
