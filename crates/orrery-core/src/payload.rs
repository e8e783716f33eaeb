//! Parsing and validation of the data payloads pushed in by the host.
//!
//! The host owns the simulation and the transport; this module only fixes the
//! JSON schema of what arrives and turns it into typed records. Body lists
//! are validated strictly (one bad record rejects the whole payload, so the
//! caller can skip the update), while grid batches are validated per point
//! (bad points are dropped, the rest of the batch survives).

use nalgebra as na;
use serde::Deserialize;

/// Error in interpreting a payload pushed by the host.
#[derive(thiserror::Error, Debug)]
pub enum PayloadError {
    /// The payload was not valid JSON of the expected shape.
    #[error("malformed payload")]
    Json(#[from] serde_json::Error),
    /// A body record contained a non-finite position component.
    #[error("body {id}: non-finite position")]
    NonFinitePosition {
        /// Id of the offending record.
        id: u64,
    },
    /// A body record contained a non-finite or non-positive radius.
    #[error("body {id}: invalid radius {radius}")]
    InvalidRadius {
        /// Id of the offending record.
        id: u64,
        /// The rejected value.
        radius: f64,
    },
}

/// One simulated point mass, as delivered by the host.
///
/// `id` is stable across updates and is the key the viewer tracks the body's
/// visual under. The viewer never creates or destroys bodies, it only renders
/// whatever the latest payload describes.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Body {
    /// Unique, stable identifier.
    pub id: u64,
    /// Position in simulation units.
    pub pos: [f64; 3],
    /// Display color.
    pub color: ColorSpec,
    /// Sphere radius in simulation units.
    pub radius: f64,
}

/// A body color as the host encodes it: either a packed `0xRRGGBB` integer
/// or a CSS color name.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ColorSpec {
    /// `0xRRGGBB` with the blue channel in the low byte.
    Packed(u32),
    /// A CSS color name such as `"red"` or `"rebeccapurple"`.
    Named(String),
}

/// Color used when a payload names a color we don't know.
pub const FALLBACK_COLOR: ColorSpec = ColorSpec::Packed(0x0077ff);

impl ColorSpec {
    /// Resolve to a linear sRGB color for rendering.
    ///
    /// Unknown color names degrade to [`FALLBACK_COLOR`] with a logged
    /// warning rather than rejecting the record; a misspelled color is not
    /// worth losing a body over.
    pub fn to_linear(&self) -> palette::LinSrgb {
        match self {
            ColorSpec::Packed(rgb) => palette::Srgb::new(
                ((rgb >> 16) & 0xff) as u8,
                ((rgb >> 8) & 0xff) as u8,
                (rgb & 0xff) as u8,
            )
            .into_format::<f32>()
            .into_linear(),
            ColorSpec::Named(name) => match palette::named::from_str(name) {
                Some(srgb) => srgb.into_format::<f32>().into_linear(),
                None => {
                    log::warn!("unknown color name {name:?}, using fallback");
                    FALLBACK_COLOR.to_linear()
                }
            },
        }
    }
}

/// Parse a JSON body list, e.g.
/// `[{"id": 1, "pos": [0.0, 1.0, 2.0], "color": "red", "radius": 5.0}]`.
///
/// The whole payload is rejected if any record is malformed;
/// the caller is expected to log the error and treat the update as a no-op
/// (the host's next push is the de facto retry).
pub fn parse_bodies(json: &str) -> Result<Vec<Body>, PayloadError> {
    let bodies: Vec<Body> = serde_json::from_str(json)?;
    for body in &bodies {
        if !body.pos.iter().all(|c| c.is_finite()) {
            return Err(PayloadError::NonFinitePosition { id: body.id });
        }
        if !body.radius.is_finite() || body.radius <= 0.0 {
            return Err(PayloadError::InvalidRadius {
                id: body.id,
                radius: body.radius,
            });
        }
    }
    Ok(bodies)
}

/// A validated grid payload: the points that survived validation
/// and a count of the entries that didn't.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GridBatch {
    /// Points in simulation units (unscaled).
    pub points: Vec<na::Point3<f32>>,
    /// Number of entries dropped by validation.
    pub dropped: usize,
}

#[derive(Deserialize)]
struct GridPayload {
    grid: Vec<serde_json::Value>,
}

/// Parse a grid overlay payload, `{"grid": [[x, y, z], ...]}`.
///
/// Entries that are not arrays of exactly three finite numbers are logged
/// and dropped individually; the rest of the batch is still used.
pub fn parse_grid(json: &str) -> Result<GridBatch, PayloadError> {
    let payload: GridPayload = serde_json::from_str(json)?;
    let mut batch = GridBatch::default();
    for (idx, entry) in payload.grid.iter().enumerate() {
        match grid_point(entry) {
            Some(point) => batch.points.push(point),
            None => {
                log::warn!("dropping malformed grid point at index {idx}: {entry}");
                batch.dropped += 1;
            }
        }
    }
    Ok(batch)
}

fn grid_point(entry: &serde_json::Value) -> Option<na::Point3<f32>> {
    let triple = entry.as_array()?;
    if triple.len() != 3 {
        return None;
    }
    let mut coords = [0.0_f32; 3];
    for (coord, value) in coords.iter_mut().zip(triple) {
        let num = value.as_f64()?;
        if !num.is_finite() {
            return None;
        }
        *coord = num as f32;
    }
    Some(na::Point3::new(coords[0], coords[1], coords[2]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_list_parses() {
        let bodies = parse_bodies(
            r#"[
                {"id": 1, "pos": [0.0, 0.0, 0.0], "color": "red", "radius": 5.0},
                {"id": 2, "pos": [1.0, 2.0, 3.0], "color": 255, "radius": 0.5}
            ]"#,
        )
        .expect("valid payload should parse");

        assert_eq!(bodies.len(), 2);
        assert_eq!(bodies[0].id, 1);
        assert_eq!(bodies[0].color, ColorSpec::Named("red".to_string()));
        assert_eq!(bodies[1].pos, [1.0, 2.0, 3.0]);
        assert_eq!(bodies[1].color, ColorSpec::Packed(255));
    }

    #[test]
    fn empty_list_is_valid() {
        assert_eq!(parse_bodies("[]").expect("empty list is valid"), vec![]);
    }

    #[test]
    fn malformed_json_is_rejected() {
        assert!(matches!(
            parse_bodies("not json at all"),
            Err(PayloadError::Json(_))
        ));
        // a record missing required fields rejects the whole payload
        assert!(matches!(
            parse_bodies(r#"[{"id": 1, "pos": [0.0, 0.0, 0.0]}]"#),
            Err(PayloadError::Json(_))
        ));
    }

    #[test]
    fn invalid_radius_is_rejected() {
        let err = parse_bodies(r#"[{"id": 7, "pos": [0, 0, 0], "color": 0, "radius": -1.0}]"#)
            .expect_err("negative radius must be rejected");
        assert!(matches!(
            err,
            PayloadError::InvalidRadius { id: 7, radius } if radius == -1.0
        ));
    }

    #[test]
    fn overflowing_position_is_rejected() {
        // parses to f64 infinity, which must not reach the scene
        let err = parse_bodies(r#"[{"id": 3, "pos": [1e999, 0, 0], "color": 0, "radius": 1.0}]"#)
            .expect_err("non-finite position must be rejected");
        assert!(matches!(err, PayloadError::NonFinitePosition { id: 3 }));
    }

    #[test]
    fn packed_color_resolves() {
        let red = ColorSpec::Packed(0xff0000).to_linear();
        assert_eq!(red, palette::Srgb::new(255u8, 0, 0).into_format::<f32>().into_linear());
    }

    #[test]
    fn named_color_resolves() {
        let named = ColorSpec::Named("red".to_string()).to_linear();
        let packed = ColorSpec::Packed(0xff0000).to_linear();
        assert_eq!(named, packed);
    }

    #[test]
    fn unknown_color_name_falls_back() {
        let color = ColorSpec::Named("not-a-color".to_string()).to_linear();
        assert_eq!(color, FALLBACK_COLOR.to_linear());
    }

    #[test]
    fn grid_batch_keeps_valid_points() {
        // one invalid triple among nine valid ones
        let batch = parse_grid(
            r#"{"grid": [
                [0, 0, 0], [1, 0, 0], [2, 0, 0],
                [0, 1, 0], ["oops", 1, 0], [2, 1, 0],
                [0, 2, 0], [1, 2, 0], [2, 2, 0], [3, 2, 0]
            ]}"#,
        )
        .expect("batch with bad points still parses");

        assert_eq!(batch.points.len(), 9);
        assert_eq!(batch.dropped, 1);
    }

    #[test]
    fn grid_wrong_arity_is_dropped() {
        let batch = parse_grid(r#"{"grid": [[1, 2], [1, 2, 3, 4], [1, 2, 3]]}"#)
            .expect("batch still parses");
        assert_eq!(batch.points, vec![na::Point3::new(1.0, 2.0, 3.0)]);
        assert_eq!(batch.dropped, 2);
    }

    #[test]
    fn grid_missing_key_is_rejected() {
        assert!(matches!(
            parse_grid(r#"{"points": []}"#),
            Err(PayloadError::Json(_))
        ));
    }
}
