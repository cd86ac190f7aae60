#[macro_use]
extern crate anyhow;
#[macro_use]
extern crate log;

mod surface;

use std::time::Instant;

use abstutil::{prettyprint_usize, Timer};
use anyhow::{Context, Result};
use geom::Duration;
use serde::Serialize;
use structopt::StructOpt;

use playback::{AnimationConfig, FrameDriver, SPEED_SLIDER_RANGE};
use trip::Trip;

use self::surface::ConsoleSurface;

#[derive(StructOpt)]
struct Args {
    /// The path to a trip, either a .csv itinerary or a .geojson file
    #[structopt(long)]
    trip: String,
    /// The path to a JSON file with animation settings. Missing fields use defaults.
    #[structopt(long)]
    config: Option<String>,
    /// Overrides the global speed multiplier
    #[structopt(long)]
    speed: Option<f64>,
    /// How many frames per second to simulate
    #[structopt(long, default_value = "60")]
    fps: f64,
    /// Start from this percent of the trip, instead of the beginning
    #[structopt(long)]
    seek: Option<f64>,
    /// Pace frames with the real clock, instead of simulating them as fast as possible
    #[structopt(long)]
    realtime: bool,
    /// Write the trip to this path as GeoJSON, with a line for the route
    #[structopt(long)]
    export_geojson: Option<String>,
    /// Write a JSON summary of the playback to this path
    #[structopt(long)]
    summary: Option<String>,
}

impl Args {
    fn load_trip(&self, timer: &mut Timer) -> Result<Trip> {
        let path = &self.trip;
        timer.start(format!("load {}", path));
        let name = std::path::Path::new(path)
            .file_stem()
            .map(|x| x.to_string_lossy().to_string());
        let trip = if path.ends_with(".csv") {
            Trip::load_csv(name, fs_err::File::open(path)?)
        } else if path.ends_with(".geojson") || path.ends_with(".json") {
            Trip::load_geojson(name, &fs_err::read_to_string(path)?)
        } else {
            bail!("Don't know how to load {}, it should be .csv or .geojson", path);
        };
        let trip = trip.with_context(|| format!("loading {}", path))?;
        timer.stop(format!("load {}", path));
        Ok(trip)
    }

    fn load_config(&self, timer: &mut Timer) -> Result<AnimationConfig> {
        let mut config = match self.config {
            Some(ref path) => abstio::maybe_read_json::<AnimationConfig>(path.clone(), timer)
                .with_context(|| format!("loading {}", path))?,
            None => AnimationConfig::default(),
        };
        if let Some(speed) = self.speed {
            let (min, max) = SPEED_SLIDER_RANGE;
            if speed < min || speed > max {
                warn!(
                    "--speed={} is outside the usual range of {} to {}",
                    speed, min, max
                );
            }
            config.speed_multiplier = speed;
        }
        Ok(config.sanitized())
    }
}

#[derive(Serialize)]
struct Summary {
    trip: Option<String>,
    waypoints: usize,
    located_waypoints: usize,
    waypoints_with_overrides: usize,
    segments: usize,
    distance: String,
    expected_travel_time: String,
    animation_time: String,
    frames: usize,
    camera_moves: usize,
    arrivals: usize,
    completed: bool,
}

fn main() {
    abstutil::logger::setup();

    let args = Args::from_iter(abstutil::cli_args());
    if let Err(err) = run(args) {
        error!("{:?}", err);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    if !(args.fps.is_finite() && args.fps > 0.0) {
        bail!("--fps must be positive, not {}", args.fps);
    }

    let mut timer = Timer::new("play a trip");
    let trip = args.load_trip(&mut timer)?;
    let config = args.load_config(&mut timer)?;

    if let Some(ref path) = args.export_geojson {
        abstio::write_json(path.clone(), &trip.to_geojson());
    }

    let mut driver = FrameDriver::new(&trip.waypoints, config, ConsoleSurface::new());
    if !driver.session().is_playable() {
        warn!(
            "Only {} waypoints have a location, nothing to play",
            trip.num_located()
        );
    }
    if let Some(pct) = args.seek {
        driver.seek(pct);
    }

    let frame_ms = 1000.0 / args.fps;
    let mut animation_ms = 0.0;
    // Seeking to the end leaves nothing to play
    if !driver.session().is_complete() {
        driver.play();
    }
    if args.realtime {
        let start = Instant::now();
        while driver.is_playing() {
            animation_ms = start.elapsed().as_secs_f64() * 1000.0;
            driver.tick(animation_ms);
            std::thread::sleep(std::time::Duration::from_secs_f64(frame_ms / 1000.0));
        }
    } else {
        while driver.is_playing() {
            driver.tick(animation_ms);
            if driver.is_playing() {
                animation_ms += frame_ms;
            }
        }
    }

    let session = driver.session();
    let route = session.route();
    let surface = driver.surface();
    let summary = Summary {
        trip: trip.name.clone(),
        waypoints: trip.waypoints.len(),
        located_waypoints: route.points().len(),
        waypoints_with_overrides: trip
            .waypoints
            .iter()
            .filter(|wp| !wp.animation.is_empty())
            .count(),
        segments: route.segments().len(),
        distance: route.total_length().to_string(),
        expected_travel_time: session.timing().total_duration().to_string(),
        animation_time: Duration::seconds(animation_ms / 1000.0).to_string(),
        frames: surface.frames,
        camera_moves: surface.camera_moves,
        arrivals: surface.arrivals,
        completed: session.is_complete(),
    };
    driver.stop();
    info!(
        "Played {} frames over {}, with {} camera moves",
        prettyprint_usize(summary.frames),
        summary.animation_time,
        prettyprint_usize(summary.camera_moves)
    );
    if let Some(path) = args.summary {
        abstio::write_json(path, &summary);
    }
    Ok(())
}
