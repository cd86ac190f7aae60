use geom::LonLat;
use trip::{AnimationOverride, TransportMode, Waypoint, WaypointID};

use crate::{
    camera_directive, live_duration_ms, AnimationConfig, CameraPhase, Directive, Frame, Session,
    MAX_SEGMENT_DURATION_MS, MIN_SEGMENT_DURATION_MS,
};

fn trip(pts: &[(f64, f64)]) -> Vec<Waypoint> {
    pts.iter()
        .enumerate()
        .map(|(idx, (lat, lon))| {
            let mut wp = Waypoint::new(
                WaypointID(idx),
                &idx.to_string(),
                Some(LonLat::new(*lon, *lat)),
            );
            wp.name = Some(format!("stop {}", idx));
            wp
        })
        .collect()
}

fn no_frills() -> AnimationConfig {
    AnimationConfig {
        zoom_at_start: false,
        pause_on_arrival_seconds: 0.0,
        ..Default::default()
    }
}

fn run_to_end(session: &mut Session, dt: f64) -> Vec<Frame> {
    let mut frames = Vec::new();
    while !session.is_complete() {
        frames.push(session.advance(dt));
        assert!(frames.len() < 100_000, "never finished");
    }
    frames
}

// Advances in 16ms chunks
fn advance_in_frames(session: &mut Session, total: f64) {
    let mut remaining = total;
    while remaining > 0.0 {
        let dt = remaining.min(16.0);
        session.advance(dt);
        remaining -= dt;
    }
}

#[test]
fn progress_never_goes_backwards() {
    let config = AnimationConfig {
        pause_on_arrival_seconds: 1.0,
        ..Default::default()
    };
    let mut session = Session::new(
        &trip(&[(0.0, 0.0), (0.0, 1.0), (0.0, 1.0), (1.0, 1.5)]),
        config,
    );
    let deltas = [16.0, 33.3, 7.1, 250.0, 0.0, -5.0, f64::NAN];

    let mut prev = session.overall_progress_percent();
    assert_eq!(prev, 0.0);
    for i in 0..100_000 {
        let frame = session.advance(deltas[i % deltas.len()]);
        assert!(
            frame.progress_percent >= prev,
            "went from {} to {}",
            prev,
            frame.progress_percent
        );
        if frame.is_complete {
            assert_eq!(frame.progress_percent, 100.0);
            break;
        }
        assert!(frame.progress_percent < 100.0);
        prev = frame.progress_percent;
    }
    assert!(session.is_complete());
}

#[test]
fn seek_lands_on_requested_progress() {
    let mut session = Session::new(
        &trip(&[
            (0.0, 0.0),
            (0.0, 1.0),
            (0.5, 1.2),
            (0.5, 1.2),
            (2.0, 2.0),
        ]),
        AnimationConfig::default(),
    );
    for i in 0..40 {
        let pct = 2.5 * i as f64;
        let frame = session.seek(pct);
        assert!(
            (frame.progress_percent - pct).abs() < 1e-6,
            "seek to {} gave {}",
            pct,
            frame.progress_percent
        );
        assert!(!frame.is_complete);
        assert_eq!(frame.camera, None);
        assert_eq!(session.state().camera_phase, CameraPhase::Maintain);
        assert!(session.state().initial_zoom_done);
    }

    assert_eq!(session.seek(-10.0).progress_percent, 0.0);
    let frame = session.seek(250.0);
    assert_eq!(frame.progress_percent, 100.0);
    assert!(frame.is_complete);

    let before = session.state().clone();
    session.seek(f64::NAN);
    assert_eq!(session.state(), &before);
}

#[test]
fn seek_clears_pause() {
    let mut session = Session::new(&trip(&[(0.0, 0.0), (0.0, 1.0), (0.0, 2.0)]), no_frills());
    let config = AnimationConfig {
        zoom_at_start: false,
        ..Default::default()
    };
    let mut paused = Session::new(&trip(&[(0.0, 0.0), (0.0, 1.0), (0.0, 2.0)]), config);
    let live = live_duration_ms(paused.timing().duration_ms(0));
    assert!(paused.advance(live + 100.0).is_paused);
    let frame = paused.seek(10.0);
    assert!(!frame.is_paused);
    assert_eq!(paused.state().pause_elapsed_ms, 0.0);

    // Seeking back after finishing reopens the session
    run_to_end(&mut session, 50.0);
    let frame = session.seek(20.0);
    assert!(!frame.is_complete);
    assert!(!session.is_complete());
}

#[test]
fn short_legs_take_at_least_the_floor() {
    for (lon, speed) in [(0.0001, 1.0), (0.01, 1.0), (1.0, 3.0), (5.0, 3.0)] {
        let config = AnimationConfig {
            speed_multiplier: speed,
            ..no_frills()
        };
        let mut session = Session::new(&trip(&[(0.0, 0.0), (0.0, lon)]), config);
        assert!(session.timing().duration_ms(0) >= MIN_SEGMENT_DURATION_MS);

        let mut elapsed = 0.0;
        while !session.is_complete() {
            session.advance(16.0);
            elapsed += 16.0;
        }
        assert!(elapsed >= MIN_SEGMENT_DURATION_MS, "{} took {}", lon, elapsed);
    }
}

#[test]
fn zero_length_trip_finishes_instantly() {
    let mut session = Session::new(&trip(&[(1.0, 1.0), (1.0, 1.0)]), AnimationConfig::default());
    assert!(session.is_playable());
    assert_eq!(session.overall_progress_percent(), 0.0);
    assert_eq!(session.timing().total_ms(), 0.0);

    let mut frames = Vec::new();
    while !session.is_complete() {
        frames.push(session.advance(16.0));
        assert!(frames.len() < 1000);
    }
    assert!(frames.iter().all(|f| !f.is_paused));
    assert_eq!(frames.last().unwrap().progress_percent, 100.0);
    assert_eq!(session.current_position(), Some(LonLat::new(1.0, 1.0)));
}

#[test]
fn one_big_step_matches_many_small_ones() {
    let mut waypoints = trip(&[(0.0, 0.0), (0.0, 1.0), (0.0, 2.0)]);
    waypoints[1].animation.pause_on_arrival_seconds = Some(2.0);

    // Covers the start sequence, cruising, braking, pausing, the second leg, and the end
    for total in [2000.0, 5000.0, 8000.0, 10000.0, 13000.0, 30000.0] {
        let mut big = Session::new(&waypoints, AnimationConfig::default());
        big.advance(total);
        let mut small = Session::new(&waypoints, AnimationConfig::default());
        advance_in_frames(&mut small, total);

        let (a, b) = (big.state(), small.state());
        assert_eq!(a.current_segment, b.current_segment, "after {}", total);
        assert_eq!(a.is_paused, b.is_paused, "after {}", total);
        assert_eq!(a.is_complete, b.is_complete, "after {}", total);
        assert_eq!(a.initial_zoom_done, b.initial_zoom_done, "after {}", total);
        assert_eq!(a.camera_phase, b.camera_phase, "after {}", total);
        assert!(
            (a.segment_progress - b.segment_progress).abs() < 1e-6,
            "after {}: {} vs {}",
            total,
            a.segment_progress,
            b.segment_progress
        );
        assert!((a.pause_elapsed_ms - b.pause_elapsed_ms).abs() < 1e-6);
        assert!((big.overall_progress_percent() - small.overall_progress_percent()).abs() < 1e-6);
    }
}

#[test]
fn arriving_in_one_frame_still_zooms_to_dest() {
    let config = AnimationConfig {
        zoom_at_start: false,
        ..Default::default()
    };
    let mut session = Session::new(&trip(&[(0.0, 0.0), (0.0, 1.0), (0.0, 2.0)]), config);
    let live = live_duration_ms(session.timing().duration_ms(0));
    // Never stops below 66% of the first leg
    let frame = session.advance(live + 10.0);
    assert!(frame.is_paused);
    assert_eq!(session.state().camera_phase, CameraPhase::ZoomToDest);
    assert_eq!(
        frame.camera,
        camera_directive(
            CameraPhase::ZoomToDest,
            LonLat::new(0.0, 0.0),
            LonLat::new(1.0, 0.0)
        )
    );
}

#[test]
fn start_sequence_timing() {
    let (a, b) = (LonLat::new(0.0, 0.0), LonLat::new(1.0, 0.0));
    let mut session = Session::new(&trip(&[(0.0, 0.0), (0.0, 1.0)]), AnimationConfig::default());

    let frame = session.advance(999.0);
    assert_eq!(session.state().camera_phase, CameraPhase::ZoomToStart);
    assert!(!session.state().initial_zoom_done);
    assert_eq!(frame.camera, camera_directive(CameraPhase::ZoomToStart, a, b));
    assert_eq!(frame.position, Some(a));
    assert_eq!(frame.progress_percent, 0.0);

    // 1000ms
    let frame = session.advance(1.0);
    assert_eq!(session.state().camera_phase, CameraPhase::ZoomOutToBoth);
    assert!(!session.state().initial_zoom_done);
    assert_eq!(frame.camera, camera_directive(CameraPhase::ZoomOutToBoth, a, b));
    assert_eq!(frame.progress_percent, 0.0);

    // 2999ms
    let frame = session.advance(1999.0);
    assert_eq!(session.state().camera_phase, CameraPhase::ZoomOutToBoth);
    assert!(!session.state().initial_zoom_done);
    assert_eq!(frame.camera, None);
    assert_eq!(frame.position, Some(a));
    assert_eq!(frame.progress_percent, 0.0);
    assert_eq!(session.state().segment_progress, 0.0);

    // 3001ms, so the marker has had 1ms to move
    let frame = session.advance(2.0);
    assert!(session.state().initial_zoom_done);
    assert_eq!(session.state().camera_phase, CameraPhase::ZoomOutToBoth);
    assert_eq!(frame.camera, None);
    assert!(session.state().segment_progress > 0.0);
    assert!(frame.progress_percent > 0.0);
    let expected = 100.0 / session.timing().total_ms();
    assert!((frame.progress_percent - expected).abs() < 1e-9);
}

#[test]
fn start_sequence_frames_the_first_moving_leg() {
    let mut session = Session::new(
        &trip(&[(0.0, 0.0), (0.0, 0.0), (1.0, 1.0)]),
        AnimationConfig::default(),
    );
    let (b, c) = (LonLat::new(0.0, 0.0), LonLat::new(1.0, 1.0));
    let directives: Vec<Directive> = run_to_end(&mut session, 16.0)
        .into_iter()
        .filter_map(|f| f.camera)
        .collect();

    let expected = vec![
        camera_directive(CameraPhase::ZoomToStart, b, c).unwrap(),
        camera_directive(CameraPhase::ZoomOutToBoth, b, c).unwrap(),
        camera_directive(CameraPhase::ZoomToDest, b, c).unwrap(),
        session.overview().unwrap(),
    ];
    assert_eq!(directives, expected);
    for directive in directives {
        if let Directive::FitBounds {
            southwest,
            northeast,
            ..
        } = directive
        {
            assert_ne!(southwest, northeast);
        }
    }
}

#[test]
fn tiny_speed_multiplier_stays_finite() {
    let config = AnimationConfig {
        speed_multiplier: 1e-300,
        ..no_frills()
    };
    let mut session = Session::new(&trip(&[(0.0, 0.0), (0.0, 1.0)]), config);
    assert_eq!(session.timing().total_ms(), MAX_SEGMENT_DURATION_MS);
    assert!(!session.timing().total_duration().to_string().is_empty());

    let frame = session.advance(16.0);
    assert!(frame.progress_percent.is_finite());
    assert!(frame.progress_percent > 0.0);
    assert!(!frame.is_complete);
    let progress = session.state().segment_progress;
    assert!(progress > 0.0 && progress < 1.0);
}

#[test]
fn zero_length_leg_skipped() {
    let config = AnimationConfig {
        zoom_at_start: false,
        ..Default::default()
    };
    let mut session = Session::new(&trip(&[(0.0, 0.0), (0.0, 0.0), (1.0, 1.0)]), config);
    let frame = session.advance(16.0);
    assert_eq!(session.state().current_segment, 1);
    assert!(!frame.is_paused);
    assert!(session.state().segment_progress > 0.0);
    assert!(frame.progress_percent > 0.0);

    let frames = run_to_end(&mut session, 16.0);
    assert!(frames.iter().all(|f| !f.is_paused));
}

#[test]
fn pause_on_arrival() {
    let mut waypoints = trip(&[(0.0, 0.0), (0.0, 1.0), (0.0, 2.0)]);
    waypoints[1].name = Some("Museum".to_string());
    waypoints[1].animation.pause_on_arrival_seconds = Some(2.0);
    let config = AnimationConfig {
        zoom_at_start: false,
        ..Default::default()
    };
    let mut session = Session::new(&waypoints, config);

    let live = live_duration_ms(session.timing().duration_ms(0));
    let frame = session.advance(live);
    assert!(frame.is_paused);
    assert_eq!(frame.label, Some("Museum".to_string()));
    assert_eq!(frame.position, Some(LonLat::new(1.0, 0.0)));
    assert_eq!(session.state().current_segment, 0);

    assert!(session.advance(1000.0).is_paused);
    assert!(session.advance(999.0).is_paused);

    let frame = session.advance(1.0);
    assert!(!frame.is_paused);
    assert_eq!(frame.label, None);
    assert_eq!(session.state().current_segment, 1);
    assert!(session.state().segment_progress < 1e-9);
}

#[test]
fn final_arrival_does_not_pause() {
    let config = AnimationConfig {
        zoom_at_start: false,
        ..Default::default()
    };
    let mut session = Session::new(&trip(&[(0.0, 0.0), (0.0, 1.0)]), config);
    let live = live_duration_ms(session.timing().duration_ms(0));
    let frame = session.advance(live + 1.0);
    assert!(frame.is_complete);
    assert!(!frame.is_paused);
    assert_eq!(frame.label, Some("stop 1".to_string()));
}

#[test]
fn seek_to_end() {
    let mut session = Session::new(
        &trip(&[(0.0, 0.0), (0.0, 1.0), (3.0, 2.5)]),
        AnimationConfig::default(),
    );
    let frame = session.seek(100.0);
    assert!(frame.is_complete);
    assert_eq!(frame.progress_percent, 100.0);
    assert_eq!(frame.position, Some(LonLat::new(2.5, 3.0)));

    // Nothing left to do
    let again = session.advance(16.0);
    assert!(again.is_complete);
    assert_eq!(again.position, frame.position);
}

#[test]
fn unplayable_routes() {
    let mut unlocated = trip(&[(0.0, 0.0), (0.0, 1.0)]);
    unlocated[1].pos = Some(LonLat::new(1.0, f64::NAN));
    for waypoints in [Vec::new(), trip(&[(0.0, 0.0)]), unlocated] {
        let mut session = Session::new(&waypoints, AnimationConfig::default());
        assert!(!session.is_playable());
        assert!(session.is_complete());
        assert_eq!(session.overall_progress_percent(), 100.0);

        let frame = session.advance(16.0);
        assert_eq!(frame.position, None);
        assert_eq!(frame.camera, None);
        assert_eq!(frame.progress_percent, 100.0);
        assert!(frame.is_complete);

        let frame = session.seek(50.0);
        assert_eq!(frame.position, None);
        assert_eq!(frame.progress_percent, 100.0);
    }
}

#[test]
fn bad_deltas_ignored() {
    let mut session = Session::new(&trip(&[(0.0, 0.0), (0.0, 1.0)]), no_frills());
    session.advance(500.0);
    let before = session.state().clone();
    for dt in [f64::NAN, -5.0, f64::INFINITY, f64::NEG_INFINITY] {
        session.advance(dt);
        assert_eq!(session.state(), &before);
    }
}

#[test]
fn camera_choreography() {
    let config = AnimationConfig {
        pause_on_arrival_seconds: 0.0,
        ..Default::default()
    };
    let (a, b, c) = (
        LonLat::new(0.0, 0.0),
        LonLat::new(1.0, 0.0),
        LonLat::new(1.0, 1.0),
    );
    let mut session = Session::new(&trip(&[(0.0, 0.0), (0.0, 1.0), (1.0, 1.0)]), config);
    let directives: Vec<Directive> = run_to_end(&mut session, 16.0)
        .into_iter()
        .filter_map(|f| f.camera)
        .collect();

    let expected = vec![
        camera_directive(CameraPhase::ZoomToStart, a, b).unwrap(),
        camera_directive(CameraPhase::ZoomOutToBoth, a, b).unwrap(),
        camera_directive(CameraPhase::ZoomToDest, a, b).unwrap(),
        camera_directive(CameraPhase::ZoomOutToBoth, b, c).unwrap(),
        camera_directive(CameraPhase::ZoomToDest, b, c).unwrap(),
        session.overview().unwrap(),
    ];
    assert_eq!(directives, expected);
}

#[test]
fn no_overview_at_end_when_disabled() {
    let config = AnimationConfig {
        zoom_out_at_end: false,
        ..no_frills()
    };
    let mut session = Session::new(&trip(&[(0.0, 0.0), (0.0, 1.0), (1.0, 1.0)]), config);
    let overview = session.overview();
    let directives: Vec<Directive> = run_to_end(&mut session, 16.0)
        .into_iter()
        .filter_map(|f| f.camera)
        .collect();
    assert!(!directives.contains(overview.as_ref().unwrap()));
    assert!(matches!(directives.last(), Some(Directive::FlyTo { .. })));
}

#[test]
fn seek_keeps_choreography_latched() {
    let mut session = Session::new(
        &trip(&[(0.0, 0.0), (0.0, 1.0), (0.0, 2.0), (0.0, 3.0)]),
        AnimationConfig::default(),
    );
    let frame = session.seek(50.0);
    assert_eq!(frame.camera, None);
    assert_eq!(session.state().current_segment, 1);
    assert!((session.state().segment_progress - 0.5).abs() < 1e-9);

    // Still in the middle of the leg, so the camera stays put
    let frame = session.advance(16.0);
    assert_eq!(frame.camera, None);
    assert_eq!(session.state().camera_phase, CameraPhase::Maintain);
}

#[test]
fn progress_per_frame_is_bounded() {
    let mut session = Session::new(&trip(&[(0.0, 0.0), (0.0, 1.0), (1.0, 1.0)]), no_frills());
    let bound = 100.0 * 16.0 / session.timing().total_ms();

    let mut prev = session.overall_progress_percent();
    for frame in run_to_end(&mut session, 16.0) {
        let delta = frame.progress_percent - prev;
        assert!(delta > 0.0, "stalled at {}", prev);
        assert!(delta <= bound + 1e-9, "jumped by {}", delta);
        prev = frame.progress_percent;
    }
}

#[test]
fn waypoint_speed_applies_to_the_leg_leaving_it() {
    let plain = trip(&[(0.0, 0.0), (0.0, 2.0), (0.0, 4.0)]);
    let mut fast = plain.clone();
    fast[0].animation = AnimationOverride {
        speed_multiplier: Some(2.0),
        ..Default::default()
    };

    let slow = Session::new(&plain, AnimationConfig::default());
    let quick = Session::new(&fast, AnimationConfig::default());
    let ratio = slow.timing().duration_ms(0) / quick.timing().duration_ms(0);
    assert!((ratio - 2.0).abs() < 1e-9);
    assert_eq!(slow.timing().duration_ms(1), quick.timing().duration_ms(1));
}

#[test]
fn marker_icon_follows_transport_mode() {
    let mut waypoints = trip(&[(0.0, 0.0), (0.0, 1.0), (0.0, 2.0)]);
    waypoints[1].transport_mode = Some(TransportMode::Train);
    let config = AnimationConfig {
        default_travel_icon: "bus".to_string(),
        ..no_frills()
    };
    let mut session = Session::new(&waypoints, config);
    assert_eq!(session.advance(16.0).icon, Some("train".to_string()));
    session.seek(90.0);
    assert_eq!(session.snapshot().icon, Some("bus".to_string()));
}

#[test]
fn labels_respect_settings() {
    let mut waypoints = trip(&[(0.0, 0.0), (0.0, 1.0), (0.0, 2.0)]);
    waypoints[1].animation.show_name = Some(false);
    let config = AnimationConfig {
        zoom_at_start: false,
        ..Default::default()
    };
    let mut session = Session::new(&waypoints, config.clone());
    let live = live_duration_ms(session.timing().duration_ms(0));
    let frame = session.advance(live + 10.0);
    assert!(frame.is_paused);
    assert_eq!(frame.label, None);

    let quiet = AnimationConfig {
        show_on_arrival: false,
        ..config
    };
    let mut session = Session::new(&trip(&[(0.0, 0.0), (0.0, 1.0), (0.0, 2.0)]), quiet);
    let frame = session.advance(live + 10.0);
    assert!(frame.is_paused);
    assert_eq!(frame.label, None);
}

#[test]
fn restart_starts_over() {
    let mut session = Session::new(&trip(&[(0.0, 0.0), (0.0, 1.0)]), AnimationConfig::default());
    run_to_end(&mut session, 100.0);
    session.restart();
    assert!(!session.is_complete());
    assert!(!session.state().initial_zoom_done);
    assert_eq!(session.state().camera_phase, CameraPhase::InitialZoomOut);
    assert_eq!(session.overall_progress_percent(), 0.0);
    // The choreography plays again
    assert!(matches!(
        session.advance(16.0).camera,
        Some(Directive::FlyTo { .. })
    ));
}
