mod builders;
mod harness;
mod mock_compute_client;
mod mock_fixed_set;

pub use builders::*;
pub use harness::*;
pub use mock_compute_client::{BatchCall, CountingComputeClient};
pub use mock_fixed_set::RecordingFixedSet;
