use serde::Deserialize;
use std::{fs, path::Path};

use crate::pipeline::PublisherError;

/// Relative path of the Terraform variables file shared with the infra setup.
pub const CONFIG_PATH: &str = "terraform.tfvars.json";

/// Connection parameters for the target topic. Any other Terraform
/// variables in the file are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct PublisherConfig {
    pub project_id: String,
    pub topic_id: String,
}

impl PublisherConfig {
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, PublisherError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .map_err(|e| PublisherError::Config(format!("failed to read {}: {e}", path.display())))?;
        let cfg: PublisherConfig = serde_json::from_str(&contents)
            .map_err(|e| PublisherError::Config(format!("failed to parse {}: {e}", path.display())))?;
        Ok(cfg)
    }
}
