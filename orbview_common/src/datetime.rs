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

use chrono::{DateTime, NaiveDate, TimeDelta, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serializer, de::Error as DeError};
use std::time::Duration;

const NANOS_PER_DAY: f64 = 86_400_000_000_000.0;

/// unix timestamp of J2000.0
pub const J2000_UNIX_SECS: i64 = 946_728_000;

/// fractional days since J2000.0. Computed from the integral seconds offset so that we don't lose
/// precision by going through the (large) julian date
pub fn days_since_j2000 (dt: &DateTime<Utc>)->f64 {
    let secs = dt.timestamp() - J2000_UNIX_SECS;
    let nanos = dt.timestamp_subsec_nanos();
    (secs as f64 / 86400.0) + (nanos as f64 / NANOS_PER_DAY)
}

/// convert fractional seconds into a TimeDelta with nanosecond resolution.
/// Returns None if secs is not finite or out of the representable range
pub fn time_delta_from_secs_f64 (secs: f64)->Option<TimeDelta> {
    if !secs.is_finite() { return None }

    let nanos = (secs * 1e9).round();
    if nanos.abs() >= i64::MAX as f64 { return None }

    Some( TimeDelta::nanoseconds( nanos as i64))
}

pub fn time_delta_as_secs_f64 (td: &TimeDelta)->f64 {
    match td.num_nanoseconds() {
        Some(nanos) => nanos as f64 / 1e9,
        None => td.num_milliseconds() as f64 / 1e3 // more than ±292 years
    }
}

/// instant for a (4 digit) year and fractional day-of-year, with Jan 1 00:00 being day 1.0
pub fn from_year_and_fractional_day (year: i32, day_of_year: f64)->Option<DateTime<Utc>> {
    if !day_of_year.is_finite() || day_of_year < 1.0 || day_of_year >= 367.0 { return None }

    let jan1 = NaiveDate::from_ymd_opt( year, 1, 1)?.and_hms_opt( 0, 0, 0)?;
    let offset = time_delta_from_secs_f64( (day_of_year - 1.0) * 86400.0)?;
    let dt = jan1.checked_add_signed( offset)?;
    Some( Utc.from_utc_datetime( &dt))
}

/// duration between two instants, or Duration::ZERO if dt_later is before dt_earlier
pub fn duration_since (dt_later: &DateTime<Utc>, dt_earlier: &DateTime<Utc>)->Duration {
    (*dt_later - *dt_earlier).to_std().unwrap_or( Duration::ZERO)
}

//--- serde support for config structs

pub fn ser_duration_as_fractional_secs<S: Serializer> (dur: &Duration, s: S) -> Result<S::Ok, S::Error>  {
    let secs = dur.as_secs_f64();
    s.serialize_f64( secs)
}

pub fn de_duration_from_fractional_secs <'a,D>(deserializer: D) -> Result<Duration,D::Error> where D: Deserializer<'a> {
    let secs: f64 = f64::deserialize(deserializer)?;
    Duration::try_from_secs_f64(secs).map_err( |e| D::Error::custom( format!("invalid duration {secs}: {e}")))
}
