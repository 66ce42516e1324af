pub mod clock;
pub mod config;
pub mod generator;
pub mod observability;
pub mod pipeline;
pub mod publishers;
pub mod topic;

pub use pipeline::{PublishLoop, Publisher, PublisherError};
