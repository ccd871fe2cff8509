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

use crate::{PI, TWO_PI};

/// normalize radians to the half open interval (-π, π]. This is the canonical longitude range
#[inline]
pub fn normalize_pi (a: f64) -> f64 {
    let x = a % TWO_PI;

    if x <= -PI { x + TWO_PI }
    else if x > PI { x - TWO_PI }
    else { x }
}

/// normalize radians to [0, 2π)
#[inline]
pub fn normalize_two_pi (a: f64) -> f64 {
    let x = a % TWO_PI;
    let x = if x < 0.0 { x + TWO_PI } else { x };
    if x >= TWO_PI { 0.0 } else { x } // x + 2π can round up for tiny negative x
}
