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

use std::ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign};
use serde::{Serialize,Deserialize};
use crate::geo_constants::{EARTH_RADIUS_RATIO_SQUARED, EQUATORIAL_EARTH_RADIUS, E_EARTH_SQUARED};
use crate::cartographic::Cartographic;

/// a plain 3D vector. Note we do not attach units or frames here - the same type is used for
/// inertial (km), earth fixed (km) and renderer-local (scene units) coordinates. Which frame a
/// value is in is determined by the function that produced it

#[derive(Debug,Clone,Copy,PartialEq,Serialize,Deserialize)]
pub struct Cartesian3 {
    pub x: f64,
    pub y: f64,
    pub z: f64
}

impl Cartesian3 {
    pub fn new (x: f64, y: f64, z: f64)->Cartesian3 {
        Cartesian3{x,y,z}
    }

    pub fn from_array (a: &[f64;3])->Cartesian3 {
        Cartesian3{ x: a[0], y: a[1], z: a[2] }
    }

    pub fn zero ()->Cartesian3 {
        Cartesian3{x: 0.0, y: 0.0, z: 0.0}
    }

    pub fn cross (&self, p: &Cartesian3)->Self {
        Cartesian3 {
            x: (self.y * p.z) - (self.z * p.y),
            y: (self.z * p.x) - (self.x * p.z),
            z: (self.x * p.y) - (self.y * p.x)
        }
    }

    pub fn dot(&self, p: &Cartesian3) -> f64 {
        (self.x * p.x) + (self.y * p.y) +(self.z * p.z)
    }

    pub fn length(&self) -> f64 {
        self.length_squared().sqrt()
    }

    pub fn length_squared(&self) -> f64 {
        (self.x * self.x) + (self.y * self.y) + (self.z * self.z)
    }

    pub fn distance (&self, p: &Cartesian3)->f64 {
        (p - self).length()
    }

    /// unit vector, or None if this is a zero vector
    pub fn to_unit_length (&self)->Option<Self> {
        let len = self.length();
        if len > 0.0 && len.is_finite() { Some( *self * (1.0 / len)) } else { None }
    }

    /// rotate around the z-axis by `angle` radians (positive is counter clockwise seen from +z)
    pub fn rotate_z (&self, angle: f64)->Self {
        let (s, c) = angle.sin_cos();
        Cartesian3 {
            x: c * self.x - s * self.y,
            y: s * self.x + c * self.y,
            z: self.z
        }
    }

    pub fn is_finite (&self)->bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    pub fn max_abs_component (&self)->f64 {
        self.x.abs().max( self.y.abs()).max( self.z.abs())
    }

    /// linear interpolation bewteen two points with factor r ∈ [0..1]
    pub fn linear_interpolation (p1: &Cartesian3, p2: &Cartesian3, r: f64) -> Self {
        *p1 + (p2-p1)*r
    }
}

impl std::fmt::Display for Cartesian3 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[ {}, {}, {} ]", self.x, self.y, self.z)
    }
}

impl Add for Cartesian3 {
    type Output = Self;

    fn add (self, rhs: Self) -> Self {
        Self { x: self.x + rhs.x, y: self.y + rhs.y, z: self.z + rhs.z }
    }
}

impl Add for &Cartesian3 {
    type Output = Cartesian3;

    fn add (self, rhs: &Cartesian3) -> Cartesian3 {
        Cartesian3 { x: self.x + rhs.x, y: self.y + rhs.y, z: self.z + rhs.z }
    }
}

impl AddAssign for Cartesian3 {
    fn add_assign (&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
        self.z += rhs.z;
    }
}

impl Sub for Cartesian3 {
    type Output = Self;

    fn sub (self, rhs: Self) -> Self {
        Self { x: self.x - rhs.x, y: self.y - rhs.y, z: self.z - rhs.z }
    }
}

impl Sub for &Cartesian3 {
    type Output = Cartesian3;

    fn sub (self, rhs: &Cartesian3) -> Cartesian3 {
        Cartesian3 { x: self.x - rhs.x, y: self.y - rhs.y, z: self.z - rhs.z }
    }
}

impl SubAssign for Cartesian3 {
    fn sub_assign (&mut self, rhs: Self)  {
        self.x -= rhs.x;
        self.y -= rhs.y;
        self.z -= rhs.z;
    }
}

impl Mul<f64> for Cartesian3 {
    type Output = Self;

    fn mul (self, rhs: f64) -> Self {
        Self { x: self.x * rhs, y: self.y * rhs, z: self.z * rhs }
    }
}

impl Mul<f64> for &Cartesian3 {
    type Output = Cartesian3;

    fn mul (self, rhs: f64) -> Cartesian3 {
        Cartesian3 { x: self.x * rhs, y: self.y * rhs, z: self.z * rhs }
    }
}

impl MulAssign<f64> for Cartesian3 {
    fn mul_assign (&mut self, rhs: f64) {
        self.x *= rhs;
        self.y *= rhs;
        self.z *= rhs;
    }
}

impl Neg for Cartesian3 {
    type Output = Self;

    fn neg (self)->Self {
        Self { x: -self.x, y: -self.y, z: -self.z }
    }
}

/// convert geodetic (WGS84) into earth fixed coordinates in km
impl From<Cartographic> for Cartesian3 {
    fn from(p: Cartographic) -> Self {
        Cartesian3::from(&p)
    }
}

impl From<&Cartographic> for Cartesian3 {
    fn from(p: &Cartographic) -> Self {
        let φ = p.latitude;
        let λ = p.longitude;
        let h = p.height;

        let (sin_φ, cos_φ) = φ.sin_cos();

        // prime vertical radius of curvature
        let n = EQUATORIAL_EARTH_RADIUS / ( 1.0 - E_EARTH_SQUARED * (sin_φ * sin_φ)).sqrt();
        let c = (n + h)*cos_φ;

        let x = c * λ.cos();
        let y = c * λ.sin();
        let z = (EARTH_RADIUS_RATIO_SQUARED * n + h) * sin_φ;

        Cartesian3::new( x, y, z)
    }
}
