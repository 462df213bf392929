use serde::Serialize;
use std::{collections::BTreeMap as Map, path::PathBuf};

use crate::errors::ResolveError;

/// A parsed `name:tag` image reference. Two references are equal iff both
/// fields match exactly; no digest or alias resolution is attempted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageReference {
    pub name: String,
    pub tag: String,
}

impl ImageReference {
    /// Splits a raw image string on its single colon. No colon means the tag
    /// defaults to `latest`. More than one colon is rejected rather than
    /// mis-split, so `host:port/name` registry references are a known
    /// limitation.
    pub fn parse(raw: &str) -> Result<ImageReference, ResolveError> {
        let raw = raw.trim();
        let mut parts = raw.splitn(3, ':');

        match (parts.next(), parts.next(), parts.next()) {
            (Some(name), None, None) => Ok(ImageReference {
                name: name.into(),
                tag: "latest".into(),
            }),
            (Some(name), Some(tag), None) => Ok(ImageReference {
                name: name.into(),
                tag: tag.into(),
            }),
            _ => Err(ResolveError::MalformedReference(raw.into())),
        }
    }

    /// Placeholder for services that declare no resolvable image name.
    pub fn untagged() -> ImageReference {
        ImageReference {
            name: "unnamed".into(),
            tag: "untagged".into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuildSpec {
    pub context: PathBuf,
    pub dockerfile: Option<PathBuf>,
}

/// The per-service entry that ends up in the serialized output.
/// `base_images` is present iff the service had a `build` entry; it may be
/// empty when directive parsing failed recoverably.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ServiceRecord {
    pub path: PathBuf,
    pub service_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_images: Option<Vec<String>>,
}

#[derive(Clone, Debug)]
pub struct ServiceProvenance {
    pub image: ImageReference,
    pub record: ServiceRecord,
}

/// Aggregate result: image name, then tag, then the services using that
/// image in discovery order. The sorted maps keep the serialized output
/// deterministic.
pub type ImageTree = Map<String, Map<String, Vec<ServiceRecord>>>;
