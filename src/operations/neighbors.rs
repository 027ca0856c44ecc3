use std::collections::HashMap;

use kiddo::{KdTree, SquaredEuclidean};
use nalgebra::Rotation3;

use crate::math::Point3;

/// Fixed rotation applied to the cloud before it is indexed.
///
/// Block centroids usually sit on a grid, and a k-d tree leaf cannot be split
/// on an axis where all of its points share one coordinate. A generic rotation
/// breaks those alignments while preserving distances.
fn index_rotation() -> Rotation3<f64> {
    Rotation3::from_euler_angles(0.5, 0.7, 1.1)
}

/// Coincident points grouped under one indexed site.
struct Sites {
    positions: Vec<Point3>,
    members: Vec<Vec<usize>>,
}

impl Sites {
    fn group(points: &[Point3]) -> Self {
        let mut slots: HashMap<[u64; 3], usize> = HashMap::new();
        let mut positions = Vec::new();
        let mut members: Vec<Vec<usize>> = Vec::new();
        for (i, p) in points.iter().enumerate() {
            // `+ 0.0` folds -0.0 into 0.0.
            let key = [p.x, p.y, p.z].map(|c| (c + 0.0).to_bits());
            let site = *slots.entry(key).or_insert_with(|| {
                positions.push(*p);
                members.push(Vec::new());
                positions.len() - 1
            });
            members[site].push(i);
        }
        Self { positions, members }
    }
}

/// Finds the nearest neighbours of every point in a cloud.
///
/// Each result list holds up to `nmax` indices into the input. The query
/// point itself comes first; the rest are sorted by ascending distance with
/// ties broken by index. Callers filter the query point out.
pub struct NearestNeighbors {
    nmax: usize,
}

impl NearestNeighbors {
    /// Creates a new `NearestNeighbors` query.
    #[must_use]
    pub fn new(nmax: usize) -> Self {
        Self { nmax }
    }

    /// Executes the query. `nmax` is clamped to the number of points; an
    /// empty cloud yields an empty result. Coincident points are indexed
    /// once and expanded again in the results.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn execute(&self, points: &[Point3]) -> Vec<Vec<usize>> {
        if points.is_empty() {
            return Vec::new();
        }
        let n = self.nmax.min(points.len());
        let sites = Sites::group(points);
        let m = n.min(sites.positions.len());

        let rotation = index_rotation();
        let rotated: Vec<[f64; 3]> = sites
            .positions
            .iter()
            .map(|p| {
                let q = rotation.transform_point(p);
                [q.x, q.y, q.z]
            })
            .collect();

        let mut tree: KdTree<f64, 3> = KdTree::new();
        for (s, q) in rotated.iter().enumerate() {
            tree.add(q, s as u64);
        }

        let mut result = vec![Vec::new(); points.len()];
        for (s, q) in rotated.iter().enumerate() {
            let origin = sites.positions[s];
            // Distances are recomputed in world space so that exact ties
            // are broken by index rather than by rounding.
            let mut found: Vec<(f64, usize)> = tree
                .nearest_n::<SquaredEuclidean>(q, m)
                .into_iter()
                .flat_map(|nb| {
                    let site = nb.item as usize;
                    let d = (sites.positions[site] - origin).norm_squared();
                    sites.members[site].iter().map(move |&j| (d, j))
                })
                .collect();
            found.sort_by(|a, b| a.0.total_cmp(&b.0).then_with(|| a.1.cmp(&b.1)));

            for &i in &sites.members[s] {
                let list = &mut result[i];
                list.push(i);
                list.extend(found.iter().map(|&(_, j)| j).filter(|&j| j != i).take(n - 1));
            }
        }
        result
    }
}
