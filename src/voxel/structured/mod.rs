//! Voxel sources over regular grids

pub mod volume;
pub mod raw;
pub mod test_volume;
pub mod source;
pub mod segmented;

pub use volume::{LogicalVolume, Scalar, Volume};
pub use raw::{load_raw, load_raw_as, ScalarKind};
pub use test_volume::{create_test_volume, TEST_VOLUME_ISO};
pub use source::StructuredVolumeSource;
pub use segmented::{RefinementPolicy, SegmentedVolumeSource, MAX_SUBDIVISIONS};
