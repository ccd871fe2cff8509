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

//! the orbital state pipeline: element records, propagation, frame transforms and orbit sampling
//! for the bodies we track. The clock this runs on lives in `orbview_common::sim_clock`

pub mod errors;
pub use errors::{OrbitalError, Result};

pub mod config;
pub mod bodies;
pub mod element_record;
pub mod propagation;
pub mod frames;
pub mod orbit_sampler;
pub mod tle_store;
pub mod tracker;

pub use bodies::BodyId;
pub use config::{load_config, OrbitalConfig};
pub use tracker::SatelliteTracker;
