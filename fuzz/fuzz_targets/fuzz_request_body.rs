//! Fuzz the request body decoder.
//!
//! ```bash
//! cargo +nightly fuzz run fuzz_request_body -- -max_total_time=60
//! ```
//!
//! Any input must decode or fail with a client error, never panic, and a
//! decoded topic must always pass topic validation.

#![no_main]

use kafka_http_gateway::MessageEnvelope;
use kafka_http_gateway::validation::validate_topic_name;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    match MessageEnvelope::from_json(data) {
        Ok(envelope) => assert!(validate_topic_name(&envelope.topic).is_ok()),
        Err(e) => assert_eq!(e.status_code().as_u16(), 400),
    }
});
