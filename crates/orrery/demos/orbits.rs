//! Demo: a toy planetary system computed on a background thread and pushed
//! into the viewer as JSON, the way a simulation host would.
//!
//! The thread plays the role of the external simulation: it knows nothing
//! about the viewer beyond the handle and the payload format.

use std::{thread, time::Duration};

use orrery::visuals as ov;
use serde_json::json;

/// One orbiting body of the toy system.
struct Planet {
    id: u64,
    orbit_radius: f64,
    /// Radians per second; Kepler-ish, slower further out.
    angular_vel: f64,
    phase: f64,
    /// Orbital plane tilt around the x axis.
    inclination: f64,
    color: &'static str,
    radius: f64,
}

fn planets() -> Vec<Planet> {
    let table: [(u64, f64, f64, &str, f64); 5] = [
        (1, 60.0, 0.0, "orangered", 4.0),
        (2, 110.0, 1.8, "royalblue", 6.0),
        (3, 170.0, 3.5, "mediumseagreen", 5.0),
        (4, 240.0, 5.0, "mediumorchid", 8.0),
        (5, 320.0, 0.9, "lightsteelblue", 3.0),
    ];
    table.iter()
        .map(|&(id, orbit_radius, phase, color, radius)| Planet {
            id,
            orbit_radius,
            angular_vel: 80.0 * orbit_radius.powf(-1.5),
            phase,
            inclination: 0.04 * id as f64,
            color,
            radius,
        })
        .collect()
}

/// Serialize the system state at time `t` into the host payload format.
fn bodies_json(planets: &[Planet], t: f64) -> String {
    let mut bodies = vec![json!({
        "id": 0,
        "pos": [0.0, 0.0, 0.0],
        "color": "gold",
        "radius": 14.0,
    })];
    for planet in planets {
        let angle = planet.angular_vel * t + planet.phase;
        let (x, z) = (
            planet.orbit_radius * angle.cos(),
            planet.orbit_radius * angle.sin(),
        );
        let (sin_inc, cos_inc) = planet.inclination.sin_cos();
        bodies.push(json!({
            "id": planet.id,
            "pos": [x, -z * sin_inc, z * cos_inc],
            "color": planet.color,
            "radius": planet.radius,
        }));
    }
    serde_json::Value::Array(bodies).to_string()
}

/// A square lattice in the orbital plane, in the host's grid units
/// (the viewer scales them down by its grid scale).
fn grid_json() -> String {
    let mut points = Vec::new();
    let step = 250;
    for x in (-2000..=2000).step_by(step) {
        for z in (-2000..=2000).step_by(step) {
            points.push(json!([x, 0, z]));
        }
    }
    json!({ "grid": points }).to_string()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let planets = planets();
    let initial_bodies = orrery::parse_bodies(&bodies_json(&planets, 0.0))?;

    let mut window = ov::ViewerWindow::new(ov::WindowParams::default())?;
    let handle = window.handle();

    // the "host": pushes a refreshed state 30 times a second
    thread::spawn(move || {
        handle.update_grid_json(grid_json());

        let tick = Duration::from_millis(33);
        let mut t = 0.0;
        loop {
            t += tick.as_secs_f64();
            handle.update_bodies_json(bodies_json(&planets, t));
            thread::sleep(tick);
        }
    });

    window.run_view(ov::SimulationView {
        initial_bodies,
        params: ov::ViewParams {
            camera_distance: 600.0,
            axis_half_extent: 150.0,
            ..Default::default()
        },
    })?;

    Ok(())
}
