//! Vegetation placement by rejection sampling
//!
//! Candidate origins are drawn over `[-1, 1]^2`, gated by a two-octave
//! density field, then dropped straight down onto the indexed surface.
//! Every accepted blade also contributes a pair of placeholder triangles
//! spanning its bounds widened by the largest runtime displacement, so the
//! scene index stays valid when blades sway later.

pub mod params;

pub use params::ScatterParams;

use std::f32::consts::TAU;

use bytemuck::{Pod, Zeroable};
use glam::{Quat, Vec3};
use log::{debug, warn};

use crate::error::{Result, TerrainError};
use crate::mesh::{containment_radius, inside_containment};
use crate::sampling::{ColorSampler, NoiseSource, RandomSource};
use crate::spatial::{Aabb, Ray, SpatialIndex, Triangle};

/// Candidates with a lower density are rejected.
const MIN_DENSITY: f32 = 0.01;

/// Blade height jitter range.
const HEIGHT_JITTER: (f32, f32) = (0.8, 2.618);

/// Render vertex: position plus one extra component.
///
/// Blade corners carry one color channel each in `w`; the root vertex
/// carries the blade height.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct BladeVertex {
    pub position: [f32; 3],
    pub w: f32,
}

impl BladeVertex {
    fn new(position: Vec3, w: f32) -> Self {
        Self {
            position: position.to_array(),
            w,
        }
    }

    pub fn position(&self) -> Vec3 {
        Vec3::from_array(self.position)
    }
}

/// One accepted blade
#[derive(Clone, Debug, PartialEq)]
pub struct BladeRecord {
    /// Left base, right base, tip
    pub triangle: [BladeVertex; 3],
    /// Surface point the blade grows from
    pub root: BladeVertex,
    /// Two triangles spanning the displacement-padded bounds
    pub placeholder: [Triangle; 2],
}

impl BladeRecord {
    /// Bounds covered by the placeholder pair.
    pub fn placeholder_bounds(&self) -> Aabb {
        let [a, b] = &self.placeholder;
        Aabb::from_points(a).merged(&Aabb::from_points(b))
    }
}

/// Everything produced by a placement run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BladeField {
    pub records: Vec<BladeRecord>,
    /// Placeholder triangles, two per blade, for the scene index
    pub index_triangles: Vec<Triangle>,
    /// Three corners plus the root per blade, for upload
    pub render_vertices: Vec<BladeVertex>,
    /// Candidates drawn to produce this field
    pub attempts: usize,
}

impl BladeField {
    fn push(&mut self, record: BladeRecord) {
        self.index_triangles.extend_from_slice(&record.placeholder);
        self.render_vertices.extend_from_slice(&record.triangle);
        self.render_vertices.push(record.root);
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Raw render vertex bytes for upload.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.render_vertices)
    }
}

/// Result of a bounded placement run.
#[derive(Clone, Debug, PartialEq)]
pub enum PlacementOutcome {
    /// Exactly `target` blades were placed.
    Placed(BladeField),
    /// The attempt budget ran out first.
    Exhausted {
        partial: BladeField,
        target: usize,
        attempts: usize,
    },
}

impl PlacementOutcome {
    pub fn is_placed(&self) -> bool {
        matches!(self, PlacementOutcome::Placed(_))
    }

    pub fn field(&self) -> &BladeField {
        match self {
            PlacementOutcome::Placed(field) => field,
            PlacementOutcome::Exhausted { partial, .. } => partial,
        }
    }

    /// Treat exhaustion as an error.
    pub fn into_result(self) -> Result<BladeField> {
        match self {
            PlacementOutcome::Placed(field) => Ok(field),
            PlacementOutcome::Exhausted {
                partial,
                target,
                attempts,
            } => Err(TerrainError::PlacementExhausted {
                placed: partial.len(),
                target,
                attempts,
            }),
        }
    }
}

/// Scatter `params.target` blades over the surface behind `index`.
///
/// Draw order per candidate is fixed (origin x, origin z, density jitter,
/// then rotation and height jitter once accepted), so the same random
/// sequence always reproduces the same field.
pub fn place_blades<I, R>(
    index: &I,
    params: &ScatterParams,
    noise: &dyn NoiseSource,
    palette: &dyn ColorSampler,
    rng: &mut R,
) -> Result<PlacementOutcome>
where
    I: SpatialIndex + ?Sized,
    R: RandomSource + ?Sized,
{
    params.validate()?;

    let radius = containment_radius(params.padding_percent);
    let budget = params.attempt_budget();
    // Buffers grow with accepted blades; the target alone may be unreachable
    let mut field = BladeField::default();
    let mut attempts = 0usize;

    while field.len() < params.target {
        if attempts >= budget {
            warn!(
                "Blade placement exhausted: {}/{} placed after {} attempts",
                field.len(),
                params.target,
                attempts
            );
            field.attempts = attempts;
            return Ok(PlacementOutcome::Exhausted {
                partial: field,
                target: params.target,
                attempts,
            });
        }
        attempts += 1;

        if let Some(record) = try_candidate(index, params, noise, palette, rng, radius) {
            field.push(record);
        }
    }

    field.attempts = attempts;
    debug!(
        "Placed {} blades in {} attempts ({:.1}% accepted)",
        field.len(),
        attempts,
        100.0 * field.len() as f32 / attempts.max(1) as f32
    );

    Ok(PlacementOutcome::Placed(field))
}

/// Draw one candidate and run it through the acceptance tests.
fn try_candidate<I, R>(
    index: &I,
    params: &ScatterParams,
    noise: &dyn NoiseSource,
    palette: &dyn ColorSampler,
    rng: &mut R,
    radius: f32,
) -> Option<BladeRecord>
where
    I: SpatialIndex + ?Sized,
    R: RandomSource + ?Sized,
{
    let x = rng.uniform(-1.0, 1.0);
    let z = rng.uniform(-1.0, 1.0);

    let density = noise.sample2(10.0 * x, 10.0 * z)
        * noise.sample3(33.0 * x, 33.0 * z, params.phase_offset)
        + rng.uniform(0.0, 0.5);
    if density < MIN_DENSITY {
        return None;
    }

    let ray = Ray::down(Vec3::new(x, params.origin_height, z));
    let hit = index.intersect(&ray)?;
    let root = ray.at(hit.distance);
    if !inside_containment(root, radius) {
        return None;
    }

    let angle = rng.uniform(0.0, TAU);
    let height = params.z_multiplier * density * rng.uniform(HEIGHT_JITTER.0, HEIGHT_JITTER.1);
    let color = palette.sample(density.clamp(0.0, 1.0));

    Some(build_blade(root, angle, height, color, params))
}

fn build_blade(root: Vec3, angle: f32, height: f32, color: [f32; 3], params: &ScatterParams) -> BladeRecord {
    let rotation = Quat::from_rotation_y(angle);
    let half = 0.5 * params.box_size;
    let offsets = [
        rotation * Vec3::new(-half, 0.0, 0.0),
        rotation * Vec3::new(half, 0.0, 0.0),
        Vec3::new(0.0, height, 0.0),
    ];
    let corners = offsets.map(|offset| root + offset);

    let bounds = Aabb::from_points(&corners).padded_horizontal(params.max_displacement);
    let (lo, hi) = (bounds.min, bounds.max);
    // Both triangles share the box diagonal, so together they span the box
    let placeholder = [
        [lo, Vec3::new(hi.x, lo.y, lo.z), hi],
        [lo, Vec3::new(lo.x, hi.y, hi.z), hi],
    ];

    BladeRecord {
        triangle: std::array::from_fn(|k| BladeVertex::new(corners[k], color[k])),
        root: BladeVertex::new(root, height),
        placeholder,
    }
}
