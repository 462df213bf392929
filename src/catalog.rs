use serde_yaml::Mapping;
use std::path::{Path, PathBuf};

use crate::{errors::ResolveError, provider::Document};

/// Holds the canonical document of every loaded input file. Populated once
/// per run and read-only afterwards. Documents keep the order their files
/// were loaded in, so aggregation follows file order.
pub struct ServiceCatalog {
    documents: Vec<(PathBuf, Document)>,
}

impl ServiceCatalog {
    pub fn new() -> ServiceCatalog {
        ServiceCatalog {
            documents: Vec::new(),
        }
    }

    /// Stores a document keyed by its file. Adding the same file twice
    /// overwrites the earlier document, keeping its original position.
    pub fn add(&mut self, path: PathBuf, document: Document) {
        match self.documents.iter_mut().find(|(p, _)| *p == path) {
            Some(slot) => slot.1 = document,
            None => self.documents.push((path, document)),
        }
    }

    pub fn files(&self) -> impl Iterator<Item = &Path> {
        self.documents.iter().map(|(path, _)| path.as_path())
    }

    /// The service-name to sub-document mapping of one file, or
    /// `NoServicesDefined` when the document has no services section. That
    /// condition is per file and never aborts the run.
    pub fn services_of(&self, path: &Path) -> Result<&Mapping, ResolveError> {
        self.documents
            .iter()
            .find(|(p, _)| p.as_path() == path)
            .and_then(|(_, document)| document.get("services"))
            .and_then(|services| services.as_mapping())
            .ok_or_else(|| ResolveError::NoServicesDefined(path.to_owned()))
    }
}
