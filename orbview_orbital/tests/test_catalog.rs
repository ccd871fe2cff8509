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

use std::{sync::atomic::{AtomicUsize, Ordering}, time::Duration};
use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use hashbrown::HashMap;
use strum::IntoEnumIterator;
use tracing_subscriber::EnvFilter;
use orbview_orbital::{BodyId, OrbitalError, Result};
use orbview_orbital::element_record::RecordSource;
use orbview_orbital::tle_store::{fetch_element_record, parse_tle_response, refresh_catalog, ElementCatalog, FetchConfig, IngestOutcome, TleSource};

/// unit tests for the element catalog and TLE sources
/// run with "cargo test test_catalog -- --nocapture"

/* #region test-data *************************************************************/

const ISS_2020: &str = "ISS (ZARYA)
1 25544U 98067A   20194.88612269 -.00002218  00000-0 -31515-4 0  9992
2 25544  51.6461 221.2784 0001413  89.1723 280.4612 15.49507896236008
";

const ISS_2020_NEXT: &str = "0 ISS (ZARYA)
1 25544U 98067A   20195.88612269 -.00002218  00000-0 -31515-4 0  9993
2 25544  51.6461 216.3000 0001413  89.1723 280.4612 15.49507896236008
";

const ISS_2020_PREV: &str = "1 25544U 98067A   20193.88612269 -.00002218  00000-0 -31515-4 0  9991
2 25544  51.6461 226.2500 0001413  89.1723 280.4612 15.49507896236008
";

const GARBAGE: &str = "<html><body>No GP data found</body></html>";

// use RUST_LOG to see what the catalog reports. This only succeeds for the first test that calls it
fn init_logging () {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn now ()->DateTime<Utc> { Utc.with_ymd_and_hms( 2020, 7, 14, 12, 0, 0).unwrap() }

/// serves fixed texts per catalog number and counts requests
struct MapSource {
    texts: HashMap<u32,String>,
    requests: AtomicUsize,
}

impl MapSource {
    fn new (texts: &[(u32,&str)])->Self {
        MapSource {
            texts: texts.iter().map( |(id,s)| (*id, s.to_string())).collect(),
            requests: AtomicUsize::new(0)
        }
    }
}

#[async_trait]
impl TleSource for MapSource {
    async fn fetch_tle_text (&self, norad_id: u32)->Result<String> {
        self.requests.fetch_add( 1, Ordering::Relaxed);
        self.texts.get( &norad_id).cloned().ok_or_else( || OrbitalError::OpFailedError( format!("no data for {}", norad_id)))
    }
}

/// never answers in time
struct SlowSource;

#[async_trait]
impl TleSource for SlowSource {
    async fn fetch_tle_text (&self, norad_id: u32)->Result<String> {
        tokio::time::sleep( Duration::from_secs(5)).await;
        Ok( ISS_2020.to_string())
    }
}

/* #endregion test-data */

#[test]
fn test_catalog_response () {
    let rec = parse_tle_response( ISS_2020_NEXT).unwrap();
    println!("{}", rec);
    assert_eq!( rec.norad_id(), 25544);
    assert_eq!( rec.name(), Some("ISS (ZARYA)"));

    // leading noise and CRLF line ends
    let text = format!("\r\n{}", ISS_2020.replace( "\n", "\r\n"));
    let rec = parse_tle_response( &text).unwrap();
    assert_eq!( rec.norad_id(), 25544);

    let rec = parse_tle_response( ISS_2020_PREV).unwrap();
    assert_eq!( rec.name(), None);

    assert!( matches!( parse_tle_response( GARBAGE), Err(OrbitalError::TleError(_))));
    assert!( parse_tle_response( "").is_err());
}

#[test]
fn test_catalog_ingest () {
    init_logging();
    let mut catalog = ElementCatalog::new( FetchConfig::default());
    let t = now();
    assert!( catalog.latest( BodyId::Iss).is_none());

    // nothing usable and nothing parsed yet
    assert_eq!( catalog.ingest_text( BodyId::Iss, GARBAGE, t).unwrap(), IngestOutcome::Fallback);
    assert_eq!( catalog.latest( BodyId::Iss).unwrap().source(), RecordSource::Fallback);

    // parsed records always supersede fallbacks
    assert_eq!( catalog.ingest_text( BodyId::Iss, ISS_2020, t).unwrap(), IngestOutcome::Accepted);
    let epoch = catalog.latest( BodyId::Iss).unwrap().epoch();
    assert_eq!( catalog.latest( BodyId::Iss).unwrap().source(), RecordSource::Parsed);

    // newer epoch wins
    assert_eq!( catalog.ingest_text( BodyId::Iss, ISS_2020_PREV, t).unwrap(), IngestOutcome::Ignored);
    assert_eq!( catalog.ingest_text( BodyId::Iss, ISS_2020, t).unwrap(), IngestOutcome::Ignored);
    assert_eq!( catalog.latest( BodyId::Iss).unwrap().epoch(), epoch);

    assert_eq!( catalog.ingest_text( BodyId::Iss, ISS_2020_NEXT, t).unwrap(), IngestOutcome::Accepted);
    let next_epoch = catalog.latest( BodyId::Iss).unwrap().epoch();
    assert_eq!( next_epoch - epoch, TimeDelta::days(1));

    // garbage does not replace what we have
    assert_eq!( catalog.ingest_text( BodyId::Iss, GARBAGE, t).unwrap(), IngestOutcome::KeptStale);
    assert_eq!( catalog.ingest_text( BodyId::Iss, GARBAGE, t).unwrap(), IngestOutcome::KeptStale);
    assert_eq!( catalog.latest( BodyId::Iss).unwrap().epoch(), next_epoch);
    assert_eq!( catalog.latest( BodyId::Iss).unwrap().source(), RecordSource::Parsed);

    // a valid record for the wrong body is unusable for this body
    assert_eq!( catalog.ingest_text( BodyId::Hubble, ISS_2020, t).unwrap(), IngestOutcome::Fallback);
    assert_eq!( catalog.latest( BodyId::Hubble).unwrap().norad_id(), BodyId::Hubble.norad_id());

    let iss = catalog.latest( BodyId::Iss).unwrap().clone();
    assert_eq!( catalog.supersede( BodyId::Hubble, iss, t), IngestOutcome::Ignored);
}

#[test]
fn test_catalog_seed () {
    let mut catalog = ElementCatalog::new( FetchConfig::default());
    let t = now();

    catalog.ingest_text( BodyId::Iss, ISS_2020, t).unwrap();
    assert_eq!( catalog.seed_fallbacks( t).unwrap(), BodyId::iter().count() - 1);
    assert_eq!( catalog.seed_fallbacks( t).unwrap(), 0);

    for body in BodyId::iter() {
        let rec = catalog.latest( body).unwrap();
        println!("{:10} {}", body.to_string(), rec);
        assert_eq!( rec.norad_id(), body.norad_id());
        let expected = if body == BodyId::Iss { RecordSource::Parsed } else { RecordSource::Fallback };
        assert_eq!( rec.source(), expected);
    }
}

#[test]
fn test_catalog_needs_refresh () {
    let mut catalog = ElementCatalog::new( FetchConfig::default());
    let t = now();

    assert!( catalog.needs_refresh( BodyId::Iss, t));

    catalog.seed_fallbacks( t).unwrap();
    assert!( catalog.needs_refresh( BodyId::Iss, t)); // seeded, never attempted

    catalog.ingest_text( BodyId::Iss, ISS_2020, t).unwrap();
    catalog.ingest_text( BodyId::Hubble, GARBAGE, t).unwrap();

    // retry interval
    assert!( !catalog.needs_refresh( BodyId::Iss, t + TimeDelta::minutes(1)));
    assert!( !catalog.needs_refresh( BodyId::Hubble, t + TimeDelta::minutes(1)));

    // fallbacks are retried, current parsed records are not
    assert!( catalog.needs_refresh( BodyId::Hubble, t + TimeDelta::minutes(11)));
    assert!( !catalog.needs_refresh( BodyId::Iss, t + TimeDelta::minutes(11)));

    assert!( catalog.needs_refresh( BodyId::Iss, t + TimeDelta::hours(25)));
}

#[tokio::test]
async fn test_catalog_fetch () {
    let source = MapSource::new( &[(25544, ISS_2020), (BodyId::Hubble.norad_id(), ISS_2020_NEXT)]);
    let timeout = Duration::from_secs(1);

    let rec = fetch_element_record( &source, BodyId::Iss, timeout).await.unwrap();
    assert_eq!( rec.norad_id(), 25544);
    assert_eq!( rec.source(), RecordSource::Parsed);

    // wrong record for body
    let res = fetch_element_record( &source, BodyId::Hubble, timeout).await;
    assert!( matches!( res, Err(OrbitalError::TleError(_))));

    let res = fetch_element_record( &source, BodyId::Gps, timeout).await;
    assert!( matches!( res, Err(OrbitalError::OpFailedError(_))));
}

#[tokio::test]
async fn test_catalog_timeout () {
    let res = fetch_element_record( &SlowSource, BodyId::Iss, Duration::from_millis(50)).await;
    println!("slow source: {:?}", res);
    assert!( matches!( res, Err(OrbitalError::Timeout(_))));

    let mut config = FetchConfig::default();
    config.request_timeout = Duration::from_millis(50);
    let mut catalog = ElementCatalog::new( config);
    let t = now();

    catalog.ingest_text( BodyId::Iss, ISS_2020, t).unwrap();

    // ISS is current, everything else ends up with fallbacks
    let n = refresh_catalog( &mut catalog, &SlowSource, t).await.unwrap();
    assert_eq!( n, 0);
    for body in BodyId::iter() {
        let expected = if body == BodyId::Iss { RecordSource::Parsed } else { RecordSource::Fallback };
        assert_eq!( catalog.latest( body).unwrap().source(), expected);
    }
}

#[tokio::test]
async fn test_catalog_refresh () {
    init_logging();
    let source = MapSource::new( &[(25544, ISS_2020)]);
    let mut catalog = ElementCatalog::new( FetchConfig::default());
    let t = now();
    let n_bodies = BodyId::iter().count();

    let n = refresh_catalog( &mut catalog, &source, t).await.unwrap();
    println!("accepted {} records in {} requests", n, source.requests.load( Ordering::Relaxed));
    assert_eq!( n, 1);
    assert_eq!( source.requests.load( Ordering::Relaxed), n_bodies);
    for body in BodyId::iter() {
        assert!( catalog.latest( body).is_some());
    }

    // nothing is due yet
    let n = refresh_catalog( &mut catalog, &source, t + TimeDelta::minutes(1)).await.unwrap();
    assert_eq!( n, 0);
    assert_eq!( source.requests.load( Ordering::Relaxed), n_bodies);

    // only fallbacks are retried
    let n = refresh_catalog( &mut catalog, &source, t + TimeDelta::minutes(11)).await.unwrap();
    assert_eq!( n, 0);
    assert_eq!( source.requests.load( Ordering::Relaxed), 2 * n_bodies - 1);
}
