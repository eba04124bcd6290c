/// Pairwise difference accumulation and thresholding
pub mod difference;
/// Bit-packed binary masks
pub mod mask;
/// Connected-component labeling and region filtering
pub mod regions;

pub use difference::DiffAccumulator;
pub use mask::BinaryMask;
pub use regions::{BoundingBox, Connectivity, Region, RegionExtractor};
