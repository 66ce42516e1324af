pub mod pubsub_rest;

pub use pubsub_rest::{BackendError, PubSubRestPublisher};
