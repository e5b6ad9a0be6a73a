pub mod align;
pub mod config;
pub mod continuity;
pub mod error;
pub mod frame;
pub mod gap;
pub mod interpolation;
pub mod resample;
pub mod series;

pub use align::{align_blocks, align_series, AlignedBlock, Alignment, BlockSource};
pub use config::{AlignmentConfig, ResampleConfig};
pub use continuity::{group_consecutive_hours, group_file_names, ContinuityBlock, HourKey};
pub use error::ResampleError;
pub use gap::GapTolerance;
pub use resample::{resample, resample_anchored, resample_free_running};
pub use series::{ResampledSeries, Sample, SensorSeries};
