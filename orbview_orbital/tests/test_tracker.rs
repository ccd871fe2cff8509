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

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use strum::IntoEnumIterator;
use orbview_common::sim_clock::{ManualWallClock, VirtualClock};
use orbview_orbital::{load_config, BodyId, OrbitalConfig, OrbitalError, SatelliteTracker};
use orbview_orbital::config::DEFAULT_CONFIG_FILE;
use orbview_orbital::frames::ScenePositionFrame;
use orbview_orbital::orbit_sampler::SampleProvenance;

/// tests for the scene query surface
/// run with "cargo test test_tracker -- --nocapture"

fn start ()->DateTime<Utc> { Utc.with_ymd_and_hms( 2025, 6, 1, 12, 0, 0).unwrap() }

fn seeded_tracker ()->SatelliteTracker {
    let mut tracker = SatelliteTracker::new( OrbitalConfig::default());
    tracker.catalog_mut().seed_fallbacks( start()).unwrap();
    tracker
}

#[test]
fn test_tracker_no_data () {
    let tracker = SatelliteTracker::new( OrbitalConfig::default());
    let t = start();

    assert!( tracker.get_orbit_polyline( BodyId::Iss).is_empty());
    assert!( tracker.get_scene_position( BodyId::Iss, &t).is_none());
    assert!( matches!( tracker.get_geodetic_position( BodyId::Iss, &t), Err(OrbitalError::OpFailedError(_))));
}

#[test]
fn test_tracker_tick () {
    let wall = ManualWallClock::new( start());
    let mut clock = VirtualClock::with_wall_clock( wall.clone());
    let mut tracker = seeded_tracker();
    let n_bodies = BodyId::iter().count();

    assert_eq!( tracker.tick( &clock), n_bodies);
    assert_eq!( tracker.tick( &clock), 0);

    for body in BodyId::iter() {
        let set = tracker.orbit_sample_set( body).unwrap();
        let polyline = tracker.get_orbit_polyline( body);
        println!("{:10} {:?} {} points, period {:.0}s", body.to_string(), set.provenance(), polyline.len(), set.period_secs());

        assert_eq!( set.provenance(), SampleProvenance::Interpolated);
        assert_eq!( polyline.len(), 121);
        assert_eq!( polyline.first(), polyline.last());
    }

    wall.advance_secs( 5.0);
    assert_eq!( tracker.tick( &clock), 0);

    wall.advance_secs( 30.0);
    assert_eq!( tracker.tick( &clock), n_bodies); // expired

    // speed changes are picked up immediately
    clock.set_speed( 100.0);
    assert_eq!( tracker.tick( &clock), n_bodies);
    wall.advance_secs( 0.03);
    assert_eq!( tracker.tick( &clock), 0);
    wall.advance_secs( 0.3);
    assert_eq!( tracker.tick( &clock), n_bodies); // drifted more than 30s of simulated time

    clock.pause();
    assert_eq!( tracker.tick( &clock), n_bodies);
    wall.advance_secs( 10.0);
    assert_eq!( tracker.tick( &clock), 0);
}

#[test]
fn test_tracker_scene_position () {
    let wall = ManualWallClock::new( start());
    let clock = VirtualClock::with_wall_clock( wall.clone());
    let mut tracker = seeded_tracker();
    tracker.tick( &clock);

    let t = clock.effective_instant();
    for body in BodyId::iter() {
        let polyline = tracker.get_orbit_polyline( body);
        let p = tracker.get_scene_position( body, &t).unwrap();

        // the orbit starts at the current simulated instant
        assert!( p.distance( &polyline[0]) < 1e-9);

        // and the body stays on it
        let period = tracker.orbit_sample_set( body).unwrap().period_secs();
        let seg = polyline[0].distance( &polyline[1]);
        for k in 1..7 {
            let tk = t + TimeDelta::seconds( (period * k as f64 / 7.3) as i64);
            let pk = tracker.get_scene_position( body, &tk).unwrap();
            let d = polyline.iter().map( |q| q.distance( &pk)).fold( f64::MAX, f64::min);
            assert!( d < seg);
        }
    }
}

#[test]
fn test_tracker_earth_fixed () {
    let clock = VirtualClock::with_wall_clock( ManualWallClock::new( start()));
    let mut tracker = seeded_tracker();
    let t = clock.effective_instant();

    assert_eq!( tracker.position_frame(), ScenePositionFrame::Inertial);
    let p_inertial = tracker.get_scene_position( BodyId::Iss, &t).unwrap();

    tracker.set_position_frame( ScenePositionFrame::EarthFixed);
    let p_fixed = tracker.get_scene_position( BodyId::Iss, &t).unwrap();
    println!("inertial {}, earth fixed {}", p_inertial, p_fixed);

    // same altitude, different place
    assert!( (p_inertial.length() - p_fixed.length()).abs() < 0.03);

    let geo = tracker.get_geodetic_position( BodyId::Iss, &t).unwrap();
    println!("ISS at {}", geo);
    assert!( geo.height > 380.0 && geo.height < 480.0);
    assert!( geo.latitude.abs() <= 52f64.to_radians());

    // orbit polylines are always inertial
    tracker.tick( &clock);
    assert!( tracker.get_orbit_polyline( BodyId::Iss)[0].distance( &p_inertial) < 1e-9);
}

#[test]
fn test_tracker_config () {
    let embedded = OrbitalConfig::embedded().unwrap();
    assert_eq!( embedded, OrbitalConfig::default());

    // tests run in the package dir, which has configs/orbital.ron
    assert_eq!( load_config( DEFAULT_CONFIG_FILE).unwrap(), embedded);
    assert_eq!( load_config( "no-such-config.ron").unwrap(), embedded);

    let config = OrbitalConfig::from_ron( "(sampler: (point_count: 60), position_frame: EarthFixed)").unwrap();
    assert_eq!( config.sampler.point_count, 60);
    assert_eq!( config.position_frame, ScenePositionFrame::EarthFixed);
    assert_eq!( config.fetch, embedded.fetch);

    assert!( matches!( OrbitalConfig::from_ron( "(sampler: 42)"), Err(OrbitalError::ConfigError(_))));
}

#[test]
fn test_tracker_fallback_years_later () {
    // without any fetched data the built-in records have to be usable long after their epoch
    for t in [ Utc.with_ymd_and_hms( 2026, 10, 19, 12, 0, 0).unwrap(), Utc.with_ymd_and_hms( 2031, 3, 1, 0, 0, 0).unwrap() ] {
        let mut tracker = SatelliteTracker::new( OrbitalConfig::default());
        tracker.catalog_mut().seed_fallbacks( t).unwrap();
        let clock = VirtualClock::with_wall_clock( ManualWallClock::new( t));

        assert_eq!( tracker.tick( &clock), BodyId::iter().count());

        for body in BodyId::iter() {
            let p = tracker.try_scene_position( body, &t);
            println!("{} {:10} {:?}", t, body.to_string(), p);
            assert!( p.is_ok());

            let set = tracker.orbit_sample_set( body).unwrap();
            assert_eq!( set.provenance(), SampleProvenance::Interpolated);
            assert_eq!( tracker.get_orbit_polyline( body).len(), 121);
        }

        let geo = tracker.get_geodetic_position( BodyId::Iss, &t).unwrap();
        assert!( geo.height > 380.0 && geo.height < 480.0);
    }
}
