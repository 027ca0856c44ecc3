mod params;

pub use params::InterfaceParams;

use rayon::prelude::*;
use tracing::{debug, info, trace, warn};

use super::NearestNeighbors;
use crate::assembly::{Assembly, Block, BlockKey, Interface};
use crate::error::{GeometryError, RbeError, Result};
use crate::geometry::Frame;
use crate::math::{Point3, Polygon2};

/// A face, or a face pair, skipped because its geometry could not be processed.
#[derive(Debug)]
pub struct SkippedFace {
    /// Base block.
    pub block: BlockKey,
    /// Face of the base block.
    pub face: usize,
    /// Neighbouring block and face, when the failure concerned a face pair.
    pub neighbor: Option<(BlockKey, usize)>,
    /// What went wrong.
    pub error: RbeError,
}

/// Summary of an identification pass.
#[derive(Debug, Default)]
pub struct IdentifyReport {
    /// Number of interfaces added to the assembly.
    pub interfaces_created: usize,
    /// Number of face pairs that reached the coplanarity test.
    pub face_pairs_tested: usize,
    /// Diagnostics for faces skipped because of degenerate geometry.
    pub skipped: Vec<SkippedFace>,
}

/// Interfaces found for one base block, before they are committed.
#[derive(Debug, Default)]
struct Proposal {
    interfaces: Vec<(BlockKey, Interface)>,
    face_pairs_tested: usize,
    skipped: Vec<SkippedFace>,
}

/// Identifies the face-face interfaces between the blocks of an assembly.
///
/// For every block, the `nmax` nearest blocks (by centroid) are candidates.
/// Every face of the block is used as a base plane; candidate faces whose
/// vertices all lie within `tmax` of that plane are intersected with the base
/// face in its local frame, and overlaps with an area of at least `amin`
/// become interfaces. At most one interface is created per pair of blocks.
///
/// Base blocks are processed in parallel against the immutable assembly; the
/// proposed interfaces are then committed in block order, so the result does
/// not depend on scheduling.
pub struct IdentifyInterfaces {
    params: InterfaceParams,
}

impl IdentifyInterfaces {
    /// Creates a new `IdentifyInterfaces` operation.
    #[must_use]
    pub fn new(params: InterfaceParams) -> Self {
        Self { params }
    }

    /// Executes identification, adding interfaces to the assembly.
    ///
    /// Pairs that are already connected are left untouched, so running the
    /// operation again on the same assembly adds nothing.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigurationError` for invalid parameters (before any
    /// geometric work), and a `GraphError` if the assembly is inconsistent.
    /// Degenerate faces are not errors; they are listed in the report.
    pub fn execute(&self, assembly: &mut Assembly) -> Result<IdentifyReport> {
        self.params.validate()?;
        if self.params.face_edge {
            warn!("face-edge interfaces are not supported, skipping");
        }
        if self.params.face_vertex {
            warn!("face-vertex interfaces are not supported, skipping");
        }

        let mut report = IdentifyReport::default();
        let keys: Vec<BlockKey> = assembly.block_keys().collect();
        if !self.params.face_face || keys.is_empty() {
            return Ok(report);
        }

        let centroids = keys
            .iter()
            .map(|&k| assembly.node(k).map(|node| node.position))
            .collect::<Result<Vec<Point3>>>()?;
        let neighbors = NearestNeighbors::new(self.params.nmax).execute(&centroids);

        let shared: &Assembly = assembly;
        let proposals = keys
            .par_iter()
            .zip(neighbors.par_iter())
            .map(|(&k, nbrs)| {
                let candidates: Vec<BlockKey> = nbrs
                    .iter()
                    .map(|&j| keys[j])
                    .filter(|&n| n != k && !shared.has_interface(k, n))
                    .collect();
                self.propose(shared, k, &candidates)
            })
            .collect::<Result<Vec<Proposal>>>()?;

        for (&k, proposal) in keys.iter().zip(proposals) {
            report.face_pairs_tested += proposal.face_pairs_tested;
            report.skipped.extend(proposal.skipped);
            for (n, interface) in proposal.interfaces {
                // Both blocks of a pair usually propose the same contact.
                if assembly.has_interface(k, n) {
                    continue;
                }
                trace!(from = ?k, to = ?n, area = interface.size, "interface");
                assembly.add_interface(k, n, interface)?;
                report.interfaces_created += 1;
            }
        }

        info!(
            blocks = keys.len(),
            interfaces = report.interfaces_created,
            face_pairs = report.face_pairs_tested,
            skipped = report.skipped.len(),
            "interface identification finished"
        );
        Ok(report)
    }

    /// Finds the interfaces between base block `k` and its candidates.
    fn propose(&self, assembly: &Assembly, k: BlockKey, candidates: &[BlockKey]) -> Result<Proposal> {
        let block = assembly.block(k)?;
        let mut proposal = Proposal::default();
        let mut connected = vec![false; candidates.len()];
        debug!(block = ?k, candidates = candidates.len(), "testing block");

        for f0 in 0..block.face_count() {
            let (frame, p0) = match base_face(block, f0, self.params.tmax) {
                Ok(base) => base,
                Err(error) => {
                    warn!(block = ?k, face = f0, %error, "skipping face");
                    proposal.skipped.push(SkippedFace {
                        block: k,
                        face: f0,
                        neighbor: None,
                        error,
                    });
                    continue;
                }
            };

            for (c, &n) in candidates.iter().enumerate() {
                if connected[c] {
                    continue;
                }
                let nbr = assembly.block(n)?;
                let rst = frame.to_local_all(nbr.vertices())?;

                for f1 in 0..nbr.face_count() {
                    proposal.face_pairs_tested += 1;
                    match self.match_face(&frame, &p0, nbr, f1, &rst) {
                        Ok(Some(interface)) => {
                            proposal.interfaces.push((n, interface));
                            connected[c] = true;
                            break;
                        }
                        Ok(None) => {}
                        Err(error) => {
                            warn!(block = ?k, face = f0, neighbor = ?n, neighbor_face = f1, %error, "skipping face pair");
                            proposal.skipped.push(SkippedFace {
                                block: k,
                                face: f0,
                                neighbor: Some((n, f1)),
                                error,
                            });
                        }
                    }
                }
            }
        }
        Ok(proposal)
    }

    /// Tests face `f1` of `nbr` against the base face polygon `p0`.
    ///
    /// `rst` holds all vertices of `nbr` in the base frame.
    fn match_face(
        &self,
        frame: &Frame,
        p0: &Polygon2,
        nbr: &Block,
        f1: usize,
        rst: &[Point3],
    ) -> Result<Option<Interface>> {
        let rst1: Vec<Point3> = nbr.face_vertices(f1).iter().map(|&i| rst[i]).collect();
        if rst1.iter().any(|p| p.z.abs() > self.params.tmax) {
            return Ok(None);
        }

        let p1 = Polygon2::from_local(&rst1);
        if p1.area() <= 0.0 {
            return Ok(None);
        }

        let overlap = p0.intersection(&p1)?;
        let area = overlap.area();
        if area <= 0.0 || area < self.params.amin {
            return Ok(None);
        }

        let points = overlap
            .points()
            .iter()
            .map(|q| frame.to_global(&Point3::new(q.x, q.y, 0.0)))
            .collect();
        Ok(Some(Interface::face_face(frame, points, area)))
    }
}

/// Frame of a base face and the face itself as a polygon in that frame.
///
/// Faces with a vertex further than `tmax` from their own plane are rejected.
fn base_face(block: &Block, face: usize, tmax: f64) -> Result<(Frame, Polygon2)> {
    let frame = block.face_frame(face)?;
    let rst0 = frame.to_local_all(&block.face_coordinates(face))?;
    if let Some(offset) = rst0.iter().map(|p| p.z.abs()).find(|t| *t > tmax) {
        return Err(GeometryError::Degenerate(format!(
            "non-planar face {face}: a vertex lies {offset} off its plane"
        ))
        .into());
    }
    Ok((frame, Polygon2::from_local(&rst0)))
}
