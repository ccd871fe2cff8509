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
use tracing::{debug, warn};
use orbview_common::{datetime::from_year_and_fractional_day, geo_constants::{GM_EARTH, SECONDS_PER_DAY}, TWO_PI};
use crate::bodies::BodyId;
use crate::errors::{tle_error, OrbitalError, Result};

/// where an element record came from
#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub enum RecordSource {
    /// parsed from externally obtained text
    Parsed,
    /// the built-in known-good record for the body
    Fallback,
}

/// an immutable snapshot of a body's mean orbital elements at its epoch. Angles are in radians.
/// Records are never mutated - fresher data supersedes them as a whole
#[derive(Debug,Clone,PartialEq)]
pub struct ElementRecord {
    norad_id: u32,
    name: Option<String>,
    epoch: DateTime<Utc>,
    mean_motion: f64,      // rev/day
    mean_motion_dot: f64,  // rev/day², as given in line 1 (first derivative / 2)
    eccentricity: f64,
    inclination: f64,
    raan: f64,
    arg_periapsis: f64,
    mean_anomaly: f64,
    drag_term: f64,        // B*, 1/earth radii
    source: RecordSource,
    line1: String,
    line2: String,
}

impl ElementRecord {
    pub fn norad_id (&self)->u32 { self.norad_id }
    pub fn name (&self)->Option<&str> { self.name.as_deref() }
    pub fn epoch (&self)->DateTime<Utc> { self.epoch }
    pub fn mean_motion (&self)->f64 { self.mean_motion }
    pub fn mean_motion_dot (&self)->f64 { self.mean_motion_dot }
    pub fn eccentricity (&self)->f64 { self.eccentricity }
    pub fn inclination (&self)->f64 { self.inclination }
    pub fn raan (&self)->f64 { self.raan }
    pub fn arg_periapsis (&self)->f64 { self.arg_periapsis }
    pub fn mean_anomaly (&self)->f64 { self.mean_anomaly }
    pub fn drag_term (&self)->f64 { self.drag_term }
    pub fn source (&self)->RecordSource { self.source }

    /// the two element lines, normalized to 69 columns with a valid checksum
    pub fn lines (&self)->(&str,&str) { (&self.line1, &self.line2) }

    /// mean motion in rad/s
    pub fn mean_motion_rad_per_sec (&self)->f64 {
        self.mean_motion * TWO_PI / SECONDS_PER_DAY
    }

    /// orbital period in seconds (2π / n). Not necessarily plausible - see `orbit_sampler::resolve_period`
    pub fn period_secs (&self)->f64 {
        SECONDS_PER_DAY / self.mean_motion
    }

    /// Keplerian semi-major axis in km
    pub fn semi_major_axis (&self)->f64 {
        let n = self.mean_motion_rad_per_sec();
        (GM_EARTH / (n*n)).cbrt()
    }

    pub fn is_newer_than (&self, other: &ElementRecord)->bool {
        self.epoch > other.epoch
    }

    pub (crate) fn with_source (mut self, source: RecordSource)->Self {
        self.source = source;
        self
    }
}

impl std::fmt::Display for ElementRecord {
    fn fmt (&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({}) epoch: {}, n: {:.8} rev/day, e: {:.7}, i: {:.4}°, src: {:?}", 
            self.name.as_deref().unwrap_or("?"), self.norad_id, self.epoch, self.mean_motion, self.eccentricity, 
            self.inclination.to_degrees(), self.source)
    }
}

/* #region parsing ****************************************************************************/

const TLE_LINE_LEN: usize = 69;

/// parse a 2-line or 3-line (leading name line) element set. Blank lines are ignored
pub fn parse_tle_text (text: &str)->Result<ElementRecord> {
    let lines: Vec<&str> = text.lines().map( |l| l.trim_end()).filter( |l| !l.trim().is_empty()).collect();

    match lines.len() {
        2 => parse_tle_lines( None, lines[0], lines[1]),
        3 => {
            let name = lines[0].trim();
            let name = name.strip_prefix("0 ").unwrap_or(name).trim(); // 3LE name lines can carry a '0 ' line number
            parse_tle_lines( Some(name), lines[1], lines[2])
        }
        n => Err( tle_error!("expected 2 or 3 lines, got {}", n))
    }
}

/// parse the two element lines. This rejects records with missing or non-numeric required columns,
/// mismatching catalog numbers, e ∉ [0,1) or n <= 0. A checksum mismatch is only reported
pub fn parse_tle_lines (name: Option<&str>, line1: &str, line2: &str)->Result<ElementRecord> {
    let l1 = check_line( line1, '1')?;
    let l2 = check_line( line2, '2')?;

    let norad_id: u32 = field( l1, 2, 7, "catalog number")?;
    let norad_id2: u32 = field( l2, 2, 7, "catalog number")?;
    if norad_id != norad_id2 {
        return Err( tle_error!("catalog number mismatch {} != {}", norad_id, norad_id2))
    }

    let yy: i32 = field( l1, 18, 20, "epoch year")?;
    let year = if yy < 57 { 2000 + yy } else { 1900 + yy };
    let day: f64 = field( l1, 20, 32, "epoch day")?;
    let epoch = from_year_and_fractional_day( year, day).ok_or_else( || tle_error!("invalid epoch {} {}", year, day))?;

    let mean_motion_dot: f64 = field( l1, 33, 43, "mean motion derivative")?;
    let drag_term = implied_decimal( &l1[53..61]).ok_or_else( || tle_error!("invalid drag term '{}'", &l1[53..61]))?;

    let inclination: f64 = field( l2, 8, 16, "inclination")?;
    let raan: f64 = field( l2, 17, 25, "right ascension")?;
    let eccentricity = eccentricity( &l2[26..33]).ok_or_else( || tle_error!("invalid eccentricity '{}'", &l2[26..33]))?;
    let arg_periapsis: f64 = field( l2, 34, 42, "argument of periapsis")?;
    let mean_anomaly: f64 = field( l2, 43, 51, "mean anomaly")?;
    let mean_motion: f64 = field( l2, 52, 63, "mean motion")?;

    if !(0.0..1.0).contains( &eccentricity) {
        return Err( tle_error!("eccentricity {} does not describe a closed orbit", eccentricity))
    }
    if !mean_motion.is_finite() || mean_motion <= 0.0 {
        return Err( tle_error!("invalid mean motion {}", mean_motion))
    }

    for (l, ln) in [(l1, 1), (l2, 2)] {
        let expected = checksum(l);
        if l.as_bytes()[68] != b'0' + expected {
            warn!("checksum mismatch in line {} of {} (expected {})", ln, norad_id, expected);
        }
    }

    Ok( ElementRecord {
        norad_id,
        name: name.map( |s| s.to_string()),
        epoch,
        mean_motion,
        mean_motion_dot,
        eccentricity,
        inclination: inclination.to_radians(),
        raan: raan.to_radians(),
        arg_periapsis: arg_periapsis.to_radians(),
        mean_anomaly: mean_anomaly.to_radians(),
        drag_term,
        source: RecordSource::Parsed,
        line1: with_checksum( l1),
        line2: with_checksum( l2),
    })
}

/// parse text that is supposed to describe `body`, substituting the body's fallback record if it can't be parsed
/// or describes a different body. This only fails if the built-in fallback itself is broken
pub fn record_or_fallback (body: BodyId, text: &str)->Result<ElementRecord> {
    match parse_for_body( body, text) {
        Ok(rec) => Ok(rec),
        Err(e) => {
            debug!("using fallback elements for {}: {}", body, e);
            body.fallback_record()
        }
    }
}

/// parse and check that the record belongs to `body`
pub fn parse_for_body (body: BodyId, text: &str)->Result<ElementRecord> {
    let rec = parse_tle_text( text)?;
    if rec.norad_id() != body.norad_id() {
        Err( tle_error!("record for {} does not match {} ({})", rec.norad_id(), body, body.norad_id()))
    } else {
        Ok(rec)
    }
}

/// TLE checksum: sum of all digits plus one for each '-', modulo 10
pub fn checksum (line: &str)->u8 {
    let sum: u32 = line.bytes().take(68).map( |b| match b {
        b'0'..=b'9' => (b - b'0') as u32,
        b'-' => 1,
        _ => 0
    }).sum();
    (sum % 10) as u8
}

fn check_line<'a> (line: &'a str, line_no: char)->Result<&'a str> {
    let line = line.trim_end();
    if !line.is_ascii() {
        return Err( tle_error!("non-ASCII characters in line {}", line_no))
    }
    if line.len() < TLE_LINE_LEN {
        return Err( tle_error!("line {} too short ({} < {})", line_no, line.len(), TLE_LINE_LEN))
    }
    if !line.starts_with(line_no) || line.as_bytes()[1] != b' ' {
        return Err( tle_error!("not a line {}: '{}'", line_no, line))
    }
    Ok( &line[..TLE_LINE_LEN])
}

fn with_checksum (line: &str)->String {
    let mut s = line[..68].to_string();
    s.push( (b'0' + checksum(line)) as char);
    s
}

fn field<T: std::str::FromStr> (line: &str, start: usize, end: usize, what: &str)->Result<T> {
    let s = line[start..end].trim();
    s.parse::<T>().map_err( |_| tle_error!("invalid {} '{}'", what, s))
}

/// eccentricity columns have an implied leading "0."
fn eccentricity (s: &str)->Option<f64> {
    let s = s.trim();
    if s.is_empty() || !s.bytes().all( |b| b.is_ascii_digit()) { return None }
    format!("0.{}", s).parse().ok()
}

/// fields like " 12345-4" meaning 0.12345e-4. A blank field is zero
fn implied_decimal (s: &str)->Option<f64> {
    let s = s.trim();
    if s.is_empty() { return Some(0.0) }
    if s.len() < 3 { return None }

    let (mantissa, exp) = s.split_at( s.len() - 2);
    let exp: i32 = exp.parse().ok()?;

    let (sign, digits) = match mantissa.as_bytes()[0] {
        b'-' => (-1.0, &mantissa[1..]),
        b'+' => (1.0, &mantissa[1..]),
        _ => (1.0, mantissa)
    };
    let digits = digits.strip_prefix('.').unwrap_or(digits);
    if digits.is_empty() || !digits.bytes().all( |b| b.is_ascii_digit()) { return None }

    let m: f64 = format!("0.{}", digits).parse().ok()?;
    Some( sign * m * 10f64.powi(exp))
}

/* #endregion parsing */
