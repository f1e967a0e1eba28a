pub mod messages;

pub use messages::{not_found, publish_message};
