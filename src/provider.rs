use anyhow::{anyhow, Result};
use std::{path::Path, process::Command};

/// Canonical compose document as returned by the config provider, after
/// variable and override expansion.
pub type Document = serde_yaml::Value;

pub trait ConfigProvider {
    fn canonical_document(&mut self, path: &Path) -> Result<Document>;
}

/// Shells out to `docker-compose config`, which expands variables and
/// merges overrides before we ever look at the document.
pub struct DockerComposeProvider;

impl DockerComposeProvider {
    pub fn new() -> DockerComposeProvider {
        DockerComposeProvider
    }
}

impl ConfigProvider for DockerComposeProvider {
    fn canonical_document(&mut self, path: &Path) -> Result<Document> {
        let output = Command::new("docker-compose")
            .arg("-f")
            .arg(path)
            .arg("config")
            .output()?;

        if !output.status.success() {
            return Err(anyhow!(
                "docker-compose config failed for {:?}: {}",
                path,
                String::from_utf8_lossy(&output.stderr).trim()
            ));
        }

        let document = serde_yaml::from_slice(&output.stdout)?;

        Ok(document)
    }
}
