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

//! obtaining element records from external sources, and the catalog of the latest resolved record per body.
//!
//! Fetching is async and owned by whoever drives it (see [`refresh_catalog`]). The pipeline only reads
//! [`ElementCatalog::latest`] and never waits for a fetch. If nothing parseable arrives we keep the last
//! parsed record, or fall back to the built-in one for the body

use std::{sync::LazyLock, time::Duration};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hashbrown::{HashMap, HashSet};
use regex::Regex;
use reqwest::Client;
use serde::{Serialize,Deserialize};
use strum::IntoEnumIterator;
use tracing::{debug, info, warn};
use orbview_common::datetime::{de_duration_from_fractional_secs, duration_since, ser_duration_as_fractional_secs};
use crate::bodies::BodyId;
use crate::element_record::{parse_tle_lines, ElementRecord, RecordSource};
use crate::errors::{tle_error, OrbitalError, Result};

/// regex to extract the (optional) name line and the two element lines from a text response
pub static TLE_LINES_RE: LazyLock<Regex> = LazyLock::new(||
    Regex::new( r"(?m)^(?:([^\r\n]*\S)[ \t\r]*\n)?(1 [^\r\n]*\S)[ \t\r]*\n(2 [^\r\n]*\S)").unwrap()
);

#[derive(Debug,Clone,PartialEq,Serialize,Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// celestrak GP query endpoint
    pub url: String,

    #[serde(serialize_with="ser_duration_as_fractional_secs", deserialize_with="de_duration_from_fractional_secs")]
    pub request_timeout: Duration,

    /// age of a parsed record after which we try to get a new one
    #[serde(serialize_with="ser_duration_as_fractional_secs", deserialize_with="de_duration_from_fractional_secs")]
    pub max_record_age: Duration,

    /// min time between two fetch attempts for the same body
    #[serde(serialize_with="ser_duration_as_fractional_secs", deserialize_with="de_duration_from_fractional_secs")]
    pub retry_interval: Duration,
}

impl Default for FetchConfig {
    fn default()->Self {
        FetchConfig {
            url: "https://celestrak.org/NORAD/elements/gp.php".to_string(),
            request_timeout: Duration::from_secs(10),
            max_record_age: Duration::from_secs( 24 * 3600),
            retry_interval: Duration::from_secs( 10 * 60),
        }
    }
}

/// extract and parse the first element set found in `text`
pub fn parse_tle_response (text: &str)->Result<ElementRecord> {
    let caps = TLE_LINES_RE.captures( text).ok_or_else( || tle_error!("no element lines in response"))?;

    let name = caps.get(1).map( |m| m.as_str().trim()).map( |s| s.strip_prefix("0 ").unwrap_or(s));
    let line1 = caps.get(2).map( |m| m.as_str()).unwrap_or_default();
    let line2 = caps.get(3).map( |m| m.as_str()).unwrap_or_default();

    parse_tle_lines( name, line1, line2)
}

/* #region sources ****************************************************************************/

/// a source of element set text for a given NORAD catalog number
#[async_trait]
pub trait TleSource {
    async fn fetch_tle_text (&self, norad_id: u32)->Result<String>;
}

pub struct CelestrakTleSource {
    client: Client,
    base_url: String,
}

impl CelestrakTleSource {
    pub fn new (config: &FetchConfig)->Result<Self> {
        let client = Client::builder().timeout( config.request_timeout).build()?;
        Ok( CelestrakTleSource { client, base_url: config.url.clone() })
    }
}

#[async_trait]
impl TleSource for CelestrakTleSource {
    async fn fetch_tle_text (&self, norad_id: u32)->Result<String> {
        let url = format!("{}?CATNR={}&FORMAT=TLE", self.base_url, norad_id);
        debug!("fetching {}", url);

        let response = self.client.get( &url).send().await?.error_for_status()?;
        Ok( response.text().await? )
    }
}

/// fetch and parse the current record of `body`. Dropping the future cancels the request
pub async fn fetch_element_record<S: TleSource + ?Sized> (source: &S, body: BodyId, timeout: Duration)->Result<ElementRecord> {
    let text = fetch_with_timeout( source, body, timeout).await?;
    let rec = parse_tle_response( &text)?;
    if rec.norad_id() != body.norad_id() {
        return Err( tle_error!("got record for {} instead of {}", rec.norad_id(), body.norad_id()))
    }
    Ok(rec)
}

async fn fetch_with_timeout<S: TleSource + ?Sized> (source: &S, body: BodyId, timeout: Duration)->Result<String> {
    match tokio::time::timeout( timeout, source.fetch_tle_text( body.norad_id())).await {
        Ok(res) => res,
        Err(_) => Err( OrbitalError::Timeout( format!("no elements for {} within {:?}", body, timeout)))
    }
}

/* #endregion sources */

/* #region catalog ****************************************************************************/

#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub enum IngestOutcome {
    /// the record is now the latest for its body
    Accepted,
    /// the record was not newer than what we have
    Ignored,
    /// input was unusable, we keep the last parsed record
    KeptStale,
    /// input was unusable and we had nothing parsed, the built-in record is used
    Fallback,
}

#[derive(Debug)]
struct CatalogEntry {
    record: ElementRecord,
    received: DateTime<Utc>,
    last_attempt: Option<DateTime<Utc>>,
}

/// the latest resolved element record per body
#[derive(Debug)]
pub struct ElementCatalog {
    config: FetchConfig,
    entries: HashMap<BodyId,CatalogEntry>,
    warned: HashSet<BodyId>,
}

impl ElementCatalog {
    pub fn new (config: FetchConfig)->Self {
        ElementCatalog { config, entries: HashMap::new(), warned: HashSet::new() }
    }

    pub fn config (&self)->&FetchConfig { &self.config }

    pub fn latest (&self, body: BodyId)->Option<&ElementRecord> {
        self.entries.get( &body).map( |e| &e.record)
    }

    /// when the current record of `body` was stored
    pub fn received (&self, body: BodyId)->Option<DateTime<Utc>> {
        self.entries.get( &body).map( |e| e.received)
    }

    /// install built-in records for all bodies we don't have anything for yet
    pub fn seed_fallbacks (&mut self, now: DateTime<Utc>)->Result<usize> {
        let mut n = 0;
        for body in BodyId::iter() {
            if !self.entries.contains_key( &body) {
                let record = body.fallback_record()?;
                self.entries.insert( body, CatalogEntry { record, received: now, last_attempt: None });
                n += 1;
            }
        }
        Ok(n)
    }

    /// store `record` if it is more current than what we have. Parsed records always supersede fallbacks,
    /// otherwise the newer epoch wins
    pub fn supersede (&mut self, body: BodyId, record: ElementRecord, now: DateTime<Utc>)->IngestOutcome {
        if record.norad_id() != body.norad_id() {
            warn!("ignoring record {} for {}", record.norad_id(), body);
            return IngestOutcome::Ignored
        }

        let accept = match self.entries.get_mut( &body) {
            None => true,
            Some(e) => {
                e.last_attempt = Some(now);
                match (e.record.source(), record.source()) {
                    (RecordSource::Fallback, RecordSource::Parsed) => true,
                    (RecordSource::Parsed, RecordSource::Fallback) => false,
                    _ => {
                        if record.epoch() == e.record.epoch() { e.received = now } // confirmed current
                        record.is_newer_than( &e.record)
                    }
                }
            }
        };

        if accept {
            info!("new elements for {}: {}", body, record);
            self.entries.insert( body, CatalogEntry { record, received: now, last_attempt: Some(now) });
            self.warned.remove( &body);
            IngestOutcome::Accepted
        } else {
            IngestOutcome::Ignored
        }
    }

    /// ingest externally obtained text for `body`, falling back if it is not a usable record for this body
    pub fn ingest_text (&mut self, body: BodyId, text: &str, now: DateTime<Utc>)->Result<IngestOutcome> {
        let res = parse_tle_response( text).and_then( |rec| {
            if rec.norad_id() == body.norad_id() { Ok(rec) } else { Err( tle_error!("record {} is not for {}", rec.norad_id(), body)) }
        });

        match res {
            Ok(rec) => Ok( self.supersede( body, rec, now)),
            Err(e) => self.ingest_failure( body, &e, now)
        }
    }

    /// record a failed attempt to obtain data for `body`. We keep a parsed record if we have one, otherwise
    /// use the built-in fallback. This is logged once per body until we get usable data again
    pub fn ingest_failure (&mut self, body: BodyId, err: &OrbitalError, now: DateTime<Utc>)->Result<IngestOutcome> {
        if self.warned.insert( body) {
            warn!("no usable elements for {}: {}", body, err);
        } else {
            debug!("still no usable elements for {}: {}", body, err);
        }

        if let Some(e) = self.entries.get_mut( &body) {
            e.last_attempt = Some(now);
            if e.record.source() == RecordSource::Parsed {
                return Ok( IngestOutcome::KeptStale)
            }
        }

        let record = body.fallback_record()?;
        self.entries.insert( body, CatalogEntry { record, received: now, last_attempt: Some(now) });
        Ok( IngestOutcome::Fallback)
    }

    /// should we try to fetch a new record for `body`
    pub fn needs_refresh (&self, body: BodyId, now: DateTime<Utc>)->bool {
        match self.entries.get( &body) {
            None => true,
            Some(e) => {
                if let Some(t) = e.last_attempt {
                    if duration_since( &now, &t) < self.config.retry_interval { return false }
                }
                e.record.source() == RecordSource::Fallback || duration_since( &now, &e.received) >= self.config.max_record_age
            }
        }
    }
}

/// fetch new records for all bodies that need one and ingest the results. Returns the number of accepted records
pub async fn refresh_catalog<S: TleSource + ?Sized> (catalog: &mut ElementCatalog, source: &S, now: DateTime<Utc>)->Result<usize> {
    let timeout = catalog.config().request_timeout;
    let mut n = 0;

    for body in BodyId::iter() {
        if catalog.needs_refresh( body, now) {
            let outcome = match fetch_with_timeout( source, body, timeout).await {
                Ok(text) => catalog.ingest_text( body, &text, now)?,
                Err(e) => catalog.ingest_failure( body, &e, now)?
            };
            if outcome == IngestOutcome::Accepted { n += 1 }
        }
    }
    Ok(n)
}

/* #endregion catalog */
