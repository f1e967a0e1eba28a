use std::fmt;

/// Where a message landed: the (partition, offset) pair that identifies it
/// within its topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub partition: i32,
    pub offset: i64,
}

impl Placement {
    /// Human-readable confirmation returned to the HTTP caller.
    pub fn confirmation(&self, topic: &str) -> String {
        format!(
            "Success to store one message into [{topic}], partition:{}, offset:{}",
            self.partition, self.offset
        )
    }
}

/// Partition routing requested for a single send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartitionHint {
    /// Let the client library's partitioner decide.
    Automatic,
    /// Pin the record to this partition id.
    Explicit(i32),
}

impl fmt::Display for PartitionHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PartitionHint::Automatic => write!(f, "automatic"),
            PartitionHint::Explicit(id) => write!(f, "{id}"),
        }
    }
}
