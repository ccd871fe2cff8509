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

// WGS84 constants. Note these are in kilometers since this is what element sets and
// propagators use (positions in km, velocities in km/s)

/// semi major axis in km
pub const EQUATORIAL_EARTH_RADIUS: f64 = 6378.137;

/// WGS84 flattening
pub const F_EARTH: f64 = 1.0 / 298.257223563;
pub const INVERSE_F_EARTH: f64 = 298.257223563;

/// semi minor axis in km
pub const POLAR_EARTH_RADIUS: f64 = EQUATORIAL_EARTH_RADIUS * (1.0 - F_EARTH);

/// first eccentricity squared e² = f(2-f)
pub const E_EARTH_SQUARED: f64 = F_EARTH * (2.0 - F_EARTH);

/// b²/a² - squared ratio of minor/major axis
pub const EARTH_RADIUS_RATIO_SQUARED: f64 = 1.0 - E_EARTH_SQUARED;

/// earth rotation rate in rad/s (IERS)
pub const EARTH_ANGULAR_VELOCITY: f64 = 7.2921151467e-5;

/// geocentric gravitational constant μ in km³/s² (WGS72, which is what TLE mean elements are fitted with)
pub const GM_EARTH: f64 = 398600.8;

/// second zonal harmonic (WGS72)
pub const J2_EARTH: f64 = 0.001082616;

/// equatorial radius used together with GM_EARTH and J2_EARTH (WGS72) in km
pub const WGS72_EARTH_RADIUS: f64 = 6378.135;

pub const SECONDS_PER_DAY: f64 = 86400.0;
