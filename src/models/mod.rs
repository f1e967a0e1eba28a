mod envelope;
mod placement;

pub use envelope::MessageEnvelope;
pub use placement::{PartitionHint, Placement};
