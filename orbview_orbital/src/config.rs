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

use std::{env, fs, path::PathBuf, time::Duration};
use serde::{Serialize,Deserialize};
use tracing::{debug, info};
use orbview_common::datetime::{de_duration_from_fractional_secs, ser_duration_as_fractional_secs};
use crate::errors::{OrbitalError, Result};
use crate::frames::{SceneProjection, ScenePositionFrame};
use crate::orbit_sampler::SamplerConfig;
use crate::tle_store::FetchConfig;

/// environment variable that can point to a directory with config files
pub const CONFIG_DIR_ENV: &str = "ORBVIEW_CONFIG_DIR";

pub const CONFIGS: &str = "configs";

pub const DEFAULT_CONFIG_FILE: &str = "orbital.ron";

static EMBEDDED_CONFIG: &str = include_str!("../configs/orbital.ron");

#[derive(Debug,Clone,PartialEq,Serialize,Deserialize)]
#[serde(default)]
pub struct PropagationConfig {
    /// max distance of a requested instant from the record epoch
    #[serde(serialize_with="ser_duration_as_fractional_secs", deserialize_with="de_duration_from_fractional_secs")]
    pub max_span: Duration,
}

impl Default for PropagationConfig {
    fn default()->Self {
        PropagationConfig { max_span: Duration::from_secs( 365 * 86400) }
    }
}

#[derive(Debug,Clone,PartialEq,Serialize,Deserialize,Default)]
#[serde(default)]
pub struct OrbitalConfig {
    pub sampler: SamplerConfig,
    pub projection: SceneProjection,
    pub propagation: PropagationConfig,
    pub fetch: FetchConfig,
    pub position_frame: ScenePositionFrame,
}

impl OrbitalConfig {
    pub fn from_ron (s: &str)->Result<Self> {
        ron::from_str( s).map_err( |e| OrbitalError::ConfigError( e.to_string()))
    }

    pub fn embedded ()->Result<Self> {
        Self::from_ron( EMBEDDED_CONFIG)
    }
}

/// find a config file, first in the directory named by ORBVIEW_CONFIG_DIR, then in ./configs
pub fn find_config_file (filename: &str)->Option<PathBuf> {
    let mut candidates: Vec<PathBuf> = Vec::new();
    if let Ok(dir) = env::var( CONFIG_DIR_ENV) {
        candidates.push( PathBuf::from(dir).join( filename));
    }
    candidates.push( PathBuf::from( CONFIGS).join( filename));

    candidates.into_iter().find( |p| p.is_file())
}

/// load config from the filesystem if there is a matching file, otherwise use the embedded default
pub fn load_config (filename: &str)->Result<OrbitalConfig> {
    match find_config_file( filename) {
        Some(path) => {
            info!("loading config from {:?}", path);
            let s = fs::read_to_string( &path)?;
            OrbitalConfig::from_ron( &s)
        }
        None => {
            debug!("no {} found, using embedded config", filename);
            OrbitalConfig::embedded()
        }
    }
}
