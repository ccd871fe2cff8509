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

use strum::{Display, EnumIter, EnumString, IntoEnumIterator};
use serde::{Serialize,Deserialize};
use crate::errors::Result;
use crate::element_record::{parse_tle_lines, ElementRecord, RecordSource};

/// the closed set of bodies we track. Everything that is body specific (NORAD id, fallback
/// elements, period policy, render tuning) is resolved through [`BodyId::config`]
#[derive(Debug,Clone,Copy,PartialEq,Eq,Hash,PartialOrd,Ord,Serialize,Deserialize,Display,EnumString,EnumIter)]
#[strum(ascii_case_insensitive)]
pub enum BodyId {
    Lumelite4,
    Iss,
    Hubble,
    Starlink,
    Tiangong,
    Gps,
}

/// how to obtain the orbital period for the sampler
#[derive(Debug,Clone,Copy,PartialEq)]
pub enum PeriodPolicy {
    /// derived from the mean motion of the current element record
    Computed,
    /// use the computed period only if it is plausible and at least `min_plausible_secs`,
    /// otherwise use the fixed `period_secs`
    FixedFallback { period_secs: f64, min_plausible_secs: f64 },
}

/// render tuning that is passed through to the scene consumer
#[derive(Debug,Clone,Copy,PartialEq)]
pub struct BodyStyle {
    pub color: &'static str,
    pub marker_size: f64,
}

#[derive(Debug,Clone,Copy)]
pub struct BodyConfig {
    pub id: BodyId,
    pub norad_id: u32,
    pub name: &'static str,
    pub period_policy: PeriodPolicy,
    /// known-good element set we use if nothing parseable is available
    pub fallback_tle: [&'static str; 2],
    pub style: BodyStyle,
}

const GPS_PERIOD_POLICY: PeriodPolicy = PeriodPolicy::FixedFallback { period_secs: 43200.0, min_plausible_secs: 3600.0 };

static BODY_CONFIGS: [BodyConfig; 6] = [
    BodyConfig {
        id: BodyId::Lumelite4,
        norad_id: 56309,
        name: "LUMELITE-4",
        period_policy: PeriodPolicy::Computed,
        fallback_tle: [
            "1 56309U 23057B   25268.21372113  .00018713  00000+0  92768-3 0  9997",
            "2 56309   9.9929 258.2316 0005640 174.9481 185.0791 15.14929629133702",
        ],
        style: BodyStyle { color: "#ffff00", marker_size: 0.08 },
    },
    BodyConfig {
        id: BodyId::Iss,
        norad_id: 25544,
        name: "ISS (ZARYA)",
        period_policy: PeriodPolicy::Computed,
        fallback_tle: [
            "1 25544U 98067A   25001.12345678  .00001234  00000+0  12345-4 0  9992",
            "2 25544  51.6441 123.4567 0001234 123.4567 236.5432 15.49000000123458",
        ],
        style: BodyStyle { color: "#00ff00", marker_size: 0.12 },
    },
    BodyConfig {
        id: BodyId::Hubble,
        norad_id: 20580,
        name: "HST",
        period_policy: PeriodPolicy::Computed,
        fallback_tle: [
            "1 20580U 90037B   25001.12345678  .00001234  00000+0  12345-4 0  9996",
            "2 20580  28.4692 345.6789 0001234 234.5678 125.4321 14.68000000123457",
        ],
        style: BodyStyle { color: "#ff8800", marker_size: 0.10 },
    },
    BodyConfig {
        id: BodyId::Starlink,
        norad_id: 44294,
        name: "STARLINK-1007",
        period_policy: PeriodPolicy::Computed,
        fallback_tle: [
            "1 44294U 19029A   25001.12345678  .00001234  00000+0  12345-4 0  9996",
            "2 44294  53.0000 234.5678 0001234 345.6789  14.3210 14.80000000123459",
        ],
        style: BodyStyle { color: "#0088ff", marker_size: 0.06 },
    },
    BodyConfig {
        id: BodyId::Tiangong,
        norad_id: 48274,
        name: "CSS (TIANHE)",
        period_policy: PeriodPolicy::Computed,
        fallback_tle: [
            "1 48274U 21087A   25001.12345678  .00001234  00000+0  12345-4 0  9995",
            "2 48274  41.5000 156.7890 0001234 267.8901  92.1098 15.25000000123453",
        ],
        style: BodyStyle { color: "#ff0088", marker_size: 0.11 },
    },
    BodyConfig {
        id: BodyId::Gps,
        norad_id: 36585,
        name: "GPS BIIF-1",
        period_policy: GPS_PERIOD_POLICY,
        fallback_tle: [
            "1 36585U 18085A   25001.12345678  .00001234  00000+0  12345-4 0  9991",
            "2 36585  55.0000  78.9012 0001234 189.0123 171.0987  2.00000000123450",
        ],
        style: BodyStyle { color: "#88ff00", marker_size: 0.09 },
    },
];

impl BodyId {
    pub fn config (&self)->&'static BodyConfig {
        &BODY_CONFIGS[*self as usize]
    }

    pub fn norad_id (&self)->u32 { self.config().norad_id }

    pub fn from_norad_id (norad_id: u32)->Option<BodyId> {
        BodyId::iter().find( |b| b.norad_id() == norad_id)
    }

    /// the known-good element record for this body, tagged as [`RecordSource::Fallback`]
    pub fn fallback_record (&self)->Result<ElementRecord> {
        let cfg = self.config();
        let rec = parse_tle_lines( Some(cfg.name), cfg.fallback_tle[0], cfg.fallback_tle[1])?;
        Ok( rec.with_source( RecordSource::Fallback))
    }
}
