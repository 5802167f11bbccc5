//! Bounding volume hierarchy over triangles.

use log::debug;

use super::{Aabb, Ray, RayHit, SpatialIndex, Triangle};

/// Triangles per leaf before splitting stops.
const MAX_LEAF_SIZE: usize = 4;

#[derive(Debug)]
enum BvhNode {
    /// Leaf holding indices into the triangle list.
    Leaf { bounds: Aabb, primitives: Vec<usize> },
    Internal {
        bounds: Aabb,
        left: Box<BvhNode>,
        right: Box<BvhNode>,
    },
}

impl BvhNode {
    fn bounds(&self) -> &Aabb {
        match self {
            BvhNode::Leaf { bounds, .. } | BvhNode::Internal { bounds, .. } => bounds,
        }
    }
}

/// A bounding volume hierarchy answering closest-hit ray queries.
///
/// Built once with a median split along the longest axis of the centroid
/// bounds. An index built from no triangles misses every ray.
#[derive(Debug)]
pub struct TriangleBvh {
    triangles: Vec<Triangle>,
    root: Option<BvhNode>,
}

impl TriangleBvh {
    pub fn build(triangles: &[Triangle]) -> Self {
        let triangles = triangles.to_vec();
        if triangles.is_empty() {
            return Self { triangles, root: None };
        }

        let bounds: Vec<Aabb> = triangles.iter().map(|t| Aabb::from_points(t)).collect();
        let indices: Vec<usize> = (0..triangles.len()).collect();
        let root = Self::build_recursive(&bounds, indices);

        debug!("Built BVH over {} triangles", triangles.len());

        Self {
            triangles,
            root: Some(root),
        }
    }

    fn build_recursive(bounds: &[Aabb], mut indices: Vec<usize>) -> BvhNode {
        let node_bounds = indices
            .iter()
            .fold(Aabb::EMPTY, |acc, &i| acc.merged(&bounds[i]));

        if indices.len() <= MAX_LEAF_SIZE {
            return BvhNode::Leaf {
                bounds: node_bounds,
                primitives: indices,
            };
        }

        let mut centroids = Aabb::EMPTY;
        for &i in &indices {
            centroids.expand(bounds[i].center());
        }
        let axis = centroids.longest_axis();

        indices.sort_by(|&a, &b| {
            bounds[a].center()[axis]
                .partial_cmp(&bounds[b].center()[axis])
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let mid = indices.len() / 2;
        let right_indices = indices.split_off(mid);

        BvhNode::Internal {
            bounds: node_bounds,
            left: Box::new(Self::build_recursive(bounds, indices)),
            right: Box::new(Self::build_recursive(bounds, right_indices)),
        }
    }

    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Bounds of everything in the index.
    pub fn bounds(&self) -> Option<Aabb> {
        self.root.as_ref().map(|root| *root.bounds())
    }

    fn intersect_recursive(&self, node: &BvhNode, ray: &Ray, closest: &mut Option<RayHit>) {
        let Some((t_near, _)) = ray.intersects_aabb(node.bounds()) else {
            return;
        };
        if let Some(hit) = closest {
            if t_near > hit.distance {
                return;
            }
        }

        match node {
            BvhNode::Leaf { primitives, .. } => {
                for &primitive in primitives {
                    if let Some(distance) = ray.intersects_triangle(&self.triangles[primitive]) {
                        let closer = closest.map_or(true, |hit| distance < hit.distance);
                        if closer {
                            *closest = Some(RayHit { distance, primitive });
                        }
                    }
                }
            }
            BvhNode::Internal { left, right, .. } => {
                self.intersect_recursive(left, ray, closest);
                self.intersect_recursive(right, ray, closest);
            }
        }
    }
}

impl SpatialIndex for TriangleBvh {
    fn intersect(&self, ray: &Ray) -> Option<RayHit> {
        let root = self.root.as_ref()?;
        let mut closest = None;
        self.intersect_recursive(root, ray, &mut closest);
        closest
    }
}
