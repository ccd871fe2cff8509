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

// cartographic (geodetic) coordinates based on radians and km, which is what we use in all
// internal computations. Conversion to degrees only happens at the presentation boundary

use crate::{angle::normalize_pi, cartesian3::Cartesian3, HALF_PI};
use crate::geo_constants::{EQUATORIAL_EARTH_RADIUS, E_EARTH_SQUARED, POLAR_EARTH_RADIUS};

/// max number of latitude refinement steps in [`Cartographic::from_earth_fixed`]
pub const MAX_GEODETIC_ITERATIONS: usize = 5;

/// latitude change (radians) below which we stop iterating. This is ~6e-6 m on the surface
const LATITUDE_EPSILON: f64 = 1e-12;

/// distance from the rotation axis (km) below which we treat a point as polar
const POLAR_AXIS_EPSILON: f64 = 1e-9;

#[derive(Debug,Clone,Copy,PartialEq)]
pub struct Cartographic {
    pub longitude: f64, // radians (-π, π]
    pub latitude: f64,  // radians [-π/2, π/2]
    pub height: f64     // km above ellipsoid
}

impl Cartographic {
    pub fn new (longitude:f64, latitude: f64, height: f64)->Self {
        Cartographic { longitude, latitude, height }
    }

    pub fn from_degrees (lon: f64, lat: f64, height: f64)->Self {
        Cartographic::new( lon.to_radians(), lat.to_radians(), height)
    }

    pub fn longitude_deg (&self)-> f64 { self.longitude.to_degrees() }
    pub fn latitude_deg (&self)-> f64 { self.latitude.to_degrees() }

    pub fn is_finite (&self)->bool {
        self.longitude.is_finite() && self.latitude.is_finite() && self.height.is_finite()
    }

    /// the same point on the ellipsoid surface
    pub fn ground_point (&self)->Self {
        Cartographic { height: 0.0, ..*self }
    }

    /// convert earth fixed coordinates (km) into geodetic coordinates.
    /// Longitude is closed form, latitude is refined by fixed point iteration of
    /// `φ = atan2( z + e²·N(φ)·sin φ, p )`
    /// starting from the geocentric latitude scaled by 1/(1-e²), which converges to below
    /// 1e-12 rad within [`MAX_GEODETIC_ITERATIONS`] for anything between the surface and GEO.
    /// Height is computed with the form that stays stable near the poles:
    /// `h = p·cos φ + z·sin φ - a·√(1 - e²·sin²φ)`
    ///
    /// Returns None for the degenerate zero vector (or non-finite input), which has no direction
    pub fn from_earth_fixed (pos: &Cartesian3)->Option<Self> {
        if !pos.is_finite() || pos.length_squared() == 0.0 {
            return None
        }

        let Cartesian3 { x, y, z } = *pos;
        let p = (x*x + y*y).sqrt();

        if p < POLAR_AXIS_EPSILON {
            let latitude = if z >= 0.0 { HALF_PI } else { -HALF_PI };
            return Some( Cartographic::new( 0.0, latitude, z.abs() - POLAR_EARTH_RADIUS))
        }

        let longitude = normalize_pi( y.atan2(x));
        let mut latitude = z.atan2( p * (1.0 - E_EARTH_SQUARED));

        for _ in 0..MAX_GEODETIC_ITERATIONS {
            let sin_φ = latitude.sin();
            let n = EQUATORIAL_EARTH_RADIUS / (1.0 - E_EARTH_SQUARED * sin_φ * sin_φ).sqrt();
            let next = (z + E_EARTH_SQUARED * n * sin_φ).atan2( p);
            let delta = (next - latitude).abs();
            latitude = next;
            if delta < LATITUDE_EPSILON { break }
        }

        let (sin_φ, cos_φ) = latitude.sin_cos();
        let height = p * cos_φ + z * sin_φ - EQUATORIAL_EARTH_RADIUS * (1.0 - E_EARTH_SQUARED * sin_φ * sin_φ).sqrt();

        Some( Cartographic::new( longitude, latitude, height))
    }
}

impl std::fmt::Display for Cartographic {
    fn fmt (&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{ longitude: {:.6}, latitude: {:.6}, height: {:.3}km }}",
            self.longitude.to_degrees(), self.latitude.to_degrees(), self.height)
    }
}
