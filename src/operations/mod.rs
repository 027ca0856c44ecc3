pub mod identify;
mod neighbors;

pub use identify::{IdentifyInterfaces, IdentifyReport, InterfaceParams, SkippedFace};
pub use neighbors::NearestNeighbors;
