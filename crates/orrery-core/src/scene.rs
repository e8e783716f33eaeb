//! The viewer's object graph: one renderable visual per tracked body,
//! plus the grid overlay point set.
//!
//! The scene is reconciled against each incoming payload rather than patched
//! in place: existing visuals are updated, visuals for newly seen ids are
//! created, and visuals whose id is absent from the payload are pruned.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use nalgebra as na;

use crate::payload::{Body, GridBatch};

/// Parameters controlling how host data maps into the scene.
#[derive(Clone, Copy, Debug)]
pub struct SceneParams {
    /// Scale applied to body positions and radii on ingestion. Default: 1.0.
    pub position_scale: f32,
    /// Scale applied to grid points on ingestion. Default: 0.1.
    pub grid_scale: f32,
    /// Maximum number of retained trace samples per body. Default: 2000.
    pub trace_cap: usize,
    /// Radius floor (after scaling) so tiny bodies stay visible.
    /// Default: 0.05.
    pub min_radius: f32,
}

impl Default for SceneParams {
    fn default() -> Self {
        Self {
            position_scale: 1.0,
            grid_scale: 0.1,
            trace_cap: 2000,
            min_radius: 0.05,
        }
    }
}

/// The renderable state of one tracked body.
#[derive(Clone, Debug)]
pub struct BodyVisual {
    /// Current position in world units.
    pub position: na::Point3<f32>,
    /// Sphere radius in world units, already floored by
    /// [`SceneParams::min_radius`].
    pub radius: f32,
    /// Resolved display color.
    pub color: palette::LinSrgb,
    /// History of past positions, rendered as a connected line.
    pub trace: Trace,
}

/// Bounded history of a body's past positions.
#[derive(Clone, Debug)]
pub struct Trace {
    points: VecDeque<na::Point3<f32>>,
    cap: usize,
}

impl Trace {
    fn new(cap: usize, first: na::Point3<f32>) -> Self {
        let mut points = VecDeque::with_capacity(cap.min(64));
        points.push_back(first);
        Self { points, cap }
    }

    /// Append a sample, evicting the oldest one first when at capacity.
    pub fn push(&mut self, point: na::Point3<f32>) {
        if self.points.len() >= self.cap {
            self.points.pop_front();
        }
        self.points.push_back(point);
    }

    /// Number of retained samples.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether no samples are retained.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The retained samples, oldest first.
    pub fn points(&self) -> impl ExactSizeIterator<Item = &na::Point3<f32>> {
        self.points.iter()
    }
}

/// Summary of one reconciliation pass, mostly useful for logging.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UpdateSummary {
    /// Ids seen for the first time.
    pub added: usize,
    /// Ids that were already tracked.
    pub updated: usize,
    /// Ids pruned because the payload no longer mentions them.
    pub removed: usize,
}

/// The set of everything the viewer draws, keyed by body id.
#[derive(Clone, Debug)]
pub struct Scene {
    params: SceneParams,
    bodies: BTreeMap<u64, BodyVisual>,
    grid: Vec<na::Point3<f32>>,
    grid_visible: bool,
}

impl Scene {
    /// Create an empty scene.
    pub fn new(params: SceneParams) -> Self {
        Self {
            params,
            bodies: BTreeMap::new(),
            grid: Vec::new(),
            grid_visible: true,
        }
    }

    /// Create a scene seeded with the initial body list delivered on attach.
    pub fn seed(params: SceneParams, bodies: &[Body]) -> Self {
        let mut scene = Self::new(params);
        scene.apply_update(bodies);
        scene
    }

    /// Reconcile the scene against a refreshed body list.
    ///
    /// Existing visuals get the new position appended to their trace;
    /// unseen ids get a fresh visual with a one-sample trace;
    /// ids absent from the payload are pruned.
    pub fn apply_update(&mut self, bodies: &[Body]) -> UpdateSummary {
        let mut summary = UpdateSummary::default();
        let mut seen = BTreeSet::new();

        for body in bodies {
            let position = self.scale_position(body.pos);
            let radius =
                (body.radius as f32 * self.params.position_scale).max(self.params.min_radius);
            let color = body.color.to_linear();
            seen.insert(body.id);

            match self.bodies.get_mut(&body.id) {
                Some(visual) => {
                    visual.position = position;
                    visual.radius = radius;
                    visual.color = color;
                    visual.trace.push(position);
                    summary.updated += 1;
                }
                None => {
                    self.bodies.insert(
                        body.id,
                        BodyVisual {
                            position,
                            radius,
                            color,
                            trace: Trace::new(self.params.trace_cap, position),
                        },
                    );
                    summary.added += 1;
                }
            }
        }

        let before = self.bodies.len();
        self.bodies.retain(|id, _| seen.contains(id));
        summary.removed = before - self.bodies.len();
        summary
    }

    fn scale_position(&self, pos: [f64; 3]) -> na::Point3<f32> {
        na::Point3::from(
            na::Vector3::new(pos[0] as f32, pos[1] as f32, pos[2] as f32)
                * self.params.position_scale,
        )
    }

    /// Replace the grid overlay with a validated batch,
    /// scaling points by [`SceneParams::grid_scale`].
    pub fn set_grid(&mut self, batch: GridBatch) {
        self.grid = batch
            .points
            .into_iter()
            .map(|p| na::Point3::from(p.coords * self.params.grid_scale))
            .collect();
    }

    /// Flip grid overlay visibility.
    pub fn toggle_grid(&mut self) {
        self.grid_visible = !self.grid_visible;
    }

    /// Whether the grid overlay should be drawn.
    pub fn grid_visible(&self) -> bool {
        self.grid_visible
    }

    /// The grid overlay points in world units.
    pub fn grid_points(&self) -> &[na::Point3<f32>] {
        &self.grid
    }

    /// Number of tracked bodies.
    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    /// Whether any bodies are tracked.
    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// The tracked visuals in ascending id order.
    pub fn visuals(&self) -> impl ExactSizeIterator<Item = (u64, &BodyVisual)> {
        self.bodies.iter().map(|(id, visual)| (*id, visual))
    }

    /// Look up one visual by id.
    pub fn visual(&self, id: u64) -> Option<&BodyVisual> {
        self.bodies.get(&id)
    }

    /// Current position of a tracked body.
    pub fn body_position(&self, id: u64) -> Option<na::Point3<f32>> {
        self.bodies.get(&id).map(|v| v.position)
    }

    /// Arithmetic mean of all tracked body positions.
    pub fn centroid(&self) -> Option<na::Point3<f32>> {
        if self.bodies.is_empty() {
            return None;
        }
        let sum: na::Vector3<f32> = self.bodies.values().map(|v| v.position.coords).sum();
        Some(na::Point3::from(sum / self.bodies.len() as f32))
    }

    /// A sphere around the centroid containing every tracked body.
    ///
    /// Not the minimal bounding sphere, but cheap and good enough
    /// to frame the scene with.
    pub fn bounding_sphere(&self) -> Option<(na::Point3<f32>, f32)> {
        let center = self.centroid()?;
        let radius = self
            .bodies
            .values()
            .map(|v| (v.position - center).norm() + v.radius)
            .fold(0.0_f32, f32::max);
        Some((center, radius))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::ColorSpec;
    use approx::assert_relative_eq;

    fn body(id: u64, pos: [f64; 3]) -> Body {
        Body {
            id,
            pos,
            color: ColorSpec::Named("red".to_string()),
            radius: 5.0,
        }
    }

    #[test]
    fn seeding_tracks_every_body() {
        let bodies: Vec<Body> = (0..4).map(|i| body(i, [i as f64, 0.0, 0.0])).collect();
        let scene = Scene::seed(SceneParams::default(), &bodies);

        assert_eq!(scene.len(), 4);
        for (id, visual) in scene.visuals() {
            assert_relative_eq!(visual.position.x, id as f32);
            assert_eq!(visual.trace.len(), 1);
        }
    }

    #[test]
    fn position_scale_applies_on_ingestion() {
        let params = SceneParams {
            position_scale: 0.5,
            ..Default::default()
        };
        let scene = Scene::seed(params, &[body(1, [10.0, -4.0, 8.0])]);

        let visual = scene.visual(1).expect("body 1 should be tracked");
        assert_relative_eq!(visual.position, na::Point3::new(5.0, -2.0, 4.0));
        assert_relative_eq!(visual.radius, 2.5);
    }

    #[test]
    fn update_moves_body_and_extends_trace() {
        // the concrete scenario from the host contract:
        // seed at the origin, move to (10, 0, 0)
        let mut scene = Scene::seed(SceneParams::default(), &[body(1, [0.0, 0.0, 0.0])]);
        scene.apply_update(&[body(1, [10.0, 0.0, 0.0])]);

        let visual = scene.visual(1).expect("body 1 should be tracked");
        assert_relative_eq!(visual.position, na::Point3::new(10.0, 0.0, 0.0));
        assert_eq!(visual.trace.len(), 2);
    }

    #[test]
    fn repeated_update_is_idempotent_on_position() {
        let update = [body(1, [3.0, 2.0, 1.0])];
        let mut scene = Scene::seed(SceneParams::default(), &update);

        scene.apply_update(&update);
        scene.apply_update(&update);

        let visual = scene.visual(1).expect("body 1 should be tracked");
        assert_relative_eq!(visual.position, na::Point3::new(3.0, 2.0, 1.0));
        // one sample per call, including the seeding one
        assert_eq!(visual.trace.len(), 3);
    }

    #[test]
    fn trace_evicts_oldest_at_capacity() {
        let params = SceneParams {
            trace_cap: 3,
            ..Default::default()
        };
        let mut scene = Scene::seed(params, &[body(1, [0.0, 0.0, 0.0])]);
        for step in 1..=5 {
            scene.apply_update(&[body(1, [step as f64, 0.0, 0.0])]);
        }

        let visual = scene.visual(1).expect("body 1 should be tracked");
        assert_eq!(visual.trace.len(), 3);
        let xs: Vec<f32> = visual.trace.points().map(|p| p.x).collect();
        assert_eq!(xs, vec![3.0, 4.0, 5.0]);
    }

    #[test]
    fn reconciliation_adds_and_prunes() {
        let mut scene = Scene::seed(
            SceneParams::default(),
            &[body(1, [0.0, 0.0, 0.0]), body(2, [1.0, 0.0, 0.0])],
        );

        // body 2 disappears, body 3 appears
        let summary = scene.apply_update(&[body(1, [0.5, 0.0, 0.0]), body(3, [2.0, 0.0, 0.0])]);

        assert_eq!(
            summary,
            UpdateSummary {
                added: 1,
                updated: 1,
                removed: 1
            }
        );
        assert!(scene.visual(2).is_none(), "stale visual should be pruned");
        let added = scene.visual(3).expect("new id should be tracked");
        assert_eq!(added.trace.len(), 1);
    }

    #[test]
    fn empty_update_clears_the_scene() {
        let mut scene = Scene::seed(SceneParams::default(), &[body(1, [0.0, 0.0, 0.0])]);
        let summary = scene.apply_update(&[]);
        assert_eq!(summary.removed, 1);
        assert!(scene.is_empty());
    }

    #[test]
    fn radius_floor_applies() {
        let mut scene = Scene::new(SceneParams::default());
        scene.apply_update(&[Body {
            id: 1,
            pos: [0.0, 0.0, 0.0],
            color: ColorSpec::Packed(0),
            radius: 1e-6,
        }]);
        let visual = scene.visual(1).expect("body 1 should be tracked");
        assert_relative_eq!(visual.radius, 0.05);
    }

    #[test]
    fn grid_points_are_scaled_and_toggleable() {
        let mut scene = Scene::new(SceneParams::default());
        scene.set_grid(GridBatch {
            points: vec![na::Point3::new(10.0, 0.0, -20.0)],
            dropped: 0,
        });

        assert_eq!(scene.grid_points(), &[na::Point3::new(1.0, 0.0, -2.0)]);
        assert!(scene.grid_visible());
        scene.toggle_grid();
        assert!(!scene.grid_visible());
    }

    #[test]
    fn centroid_and_bounding_sphere() {
        let scene = Scene::seed(
            SceneParams::default(),
            &[body(1, [-10.0, 0.0, 0.0]), body(2, [10.0, 0.0, 0.0])],
        );

        let centroid = scene.centroid().expect("non-empty scene has a centroid");
        assert_relative_eq!(centroid, na::Point3::origin());

        let (center, radius) = scene.bounding_sphere().expect("non-empty scene");
        assert_relative_eq!(center, na::Point3::origin());
        // distance to the farthest body plus its radius
        assert_relative_eq!(radius, 15.0);
    }

    #[test]
    fn empty_scene_has_no_centroid() {
        let scene = Scene::new(SceneParams::default());
        assert!(scene.centroid().is_none());
        assert!(scene.bounding_sphere().is_none());
    }
}
