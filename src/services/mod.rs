mod publisher;

pub use publisher::PublisherService;
