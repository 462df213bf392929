use log::{error, warn};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::{
    catalog::ServiceCatalog,
    dockerfile,
    models::{BuildSpec, ImageReference, ServiceProvenance, ServiceRecord},
    provider::Document,
};

#[derive(Clone, Debug, Default, Deserialize)]
struct ServiceConfig {
    image: Option<String>,
    build: Option<Build>,
}

/// Compose allows `build: ./dir` as a shorthand for the extended form.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
enum Build {
    Short(String),
    Extended {
        context: PathBuf,
        dockerfile: Option<PathBuf>,
    },
}

impl From<Build> for BuildSpec {
    fn from(build: Build) -> BuildSpec {
        match build {
            Build::Short(context) => BuildSpec {
                context: PathBuf::from(context),
                dockerfile: None,
            },
            Build::Extended {
                context,
                dockerfile,
            } => BuildSpec {
                context,
                dockerfile,
            },
        }
    }
}

/// Produces one provenance record per service across every file in the
/// catalog, in file-then-service order. Per-item failures are logged and
/// degrade to sentinel or empty values; no service is ever dropped.
pub fn resolve(catalog: &ServiceCatalog) -> Vec<ServiceProvenance> {
    let mut provenances = Vec::new();

    for path in catalog.files() {
        let services = match catalog.services_of(path) {
            Ok(services) => services,
            Err(err) => {
                error!("{}", err);
                continue;
            }
        };

        for (name, service) in services {
            let name = match name.as_str() {
                Some(name) => name,
                None => {
                    warn!("skipping non-string service key {:?} in {:?}", name, path);
                    continue;
                }
            };

            provenances.push(resolve_service(path, name, service));
        }
    }

    provenances
}

fn resolve_service(path: &Path, name: &str, service: &Document) -> ServiceProvenance {
    let config: ServiceConfig = match serde_yaml::from_value(service.clone()) {
        Ok(config) => config,
        Err(err) => {
            warn!("could not decode service {:?} in {:?}: {}", name, path, err);
            ServiceConfig::default()
        }
    };

    let base_images = config.build.map(|build| {
        let build = BuildSpec::from(build);
        match dockerfile::base_images(&build) {
            Ok(sources) => sources,
            Err(err) => {
                warn!("service {:?} in {:?}: {}", name, path, err);
                Vec::new()
            }
        }
    });

    let image = match config.image {
        Some(raw) => match ImageReference::parse(&raw) {
            Ok(image) => image,
            Err(err) => {
                warn!("service {:?} in {:?}: {}", name, path, err);
                ImageReference::untagged()
            }
        },
        None => ImageReference::untagged(),
    };

    ServiceProvenance {
        image,
        record: ServiceRecord {
            path: path.to_owned(),
            service_name: name.into(),
            base_images,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{fs, io::Write};
    use tempfile::TempDir;

    fn catalog_with(path: &str, source: &str) -> ServiceCatalog {
        let mut catalog = ServiceCatalog::new();
        catalog.add(PathBuf::from(path), serde_yaml::from_str(source).unwrap());
        catalog
    }

    #[test]
    fn pulled_image_is_normalized() {
        let catalog = catalog_with(
            "web/docker-compose.yml",
            "services:\n  web:\n    image: nginx:1.21\n",
        );

        let provenances = resolve(&catalog);
        assert_eq!(provenances.len(), 1);

        let provenance = &provenances[0];
        assert_eq!(provenance.image.name, "nginx");
        assert_eq!(provenance.image.tag, "1.21");
        assert_eq!(provenance.record.service_name, "web");
        assert_eq!(provenance.record.path, Path::new("web/docker-compose.yml"));
        assert_eq!(provenance.record.base_images, None);
    }

    #[test]
    fn built_service_records_base_images_under_the_sentinel() {
        let dir = TempDir::new().unwrap();
        let mut dockerfile = fs::File::create(dir.path().join("Dockerfile")).unwrap();
        dockerfile.write_all(b"FROM python:3.9\n").unwrap();

        let source = format!(
            "services:\n  app:\n    build:\n      context: {}\n",
            dir.path().display()
        );
        let catalog = catalog_with("app/docker-compose.yml", &source);

        let provenances = resolve(&catalog);
        let provenance = &provenances[0];
        assert_eq!(provenance.image, ImageReference::untagged());
        assert_eq!(
            provenance.record.base_images,
            Some(vec!["python:3.9".to_owned()])
        );
    }

    #[test]
    fn built_service_with_short_form_context() {
        let dir = TempDir::new().unwrap();
        let mut dockerfile = fs::File::create(dir.path().join("Dockerfile")).unwrap();
        dockerfile.write_all(b"FROM alpine:3.18\n").unwrap();

        let source = format!(
            "services:\n  app:\n    build: {}\n",
            dir.path().display()
        );
        let catalog = catalog_with("app/docker-compose.yml", &source);

        let provenances = resolve(&catalog);
        assert_eq!(
            provenances[0].record.base_images,
            Some(vec!["alpine:3.18".to_owned()])
        );
    }

    #[test]
    fn built_service_with_explicit_image_keeps_both() {
        let dir = TempDir::new().unwrap();
        let mut dockerfile = fs::File::create(dir.path().join("Dockerfile")).unwrap();
        dockerfile.write_all(b"FROM debian:12\n").unwrap();

        let source = format!(
            "services:\n  app:\n    image: myorg/app:2.0\n    build:\n      context: {}\n",
            dir.path().display()
        );
        let catalog = catalog_with("app/docker-compose.yml", &source);

        let provenance = &resolve(&catalog)[0];
        assert_eq!(provenance.image.name, "myorg/app");
        assert_eq!(provenance.image.tag, "2.0");
        assert_eq!(
            provenance.record.base_images,
            Some(vec!["debian:12".to_owned()])
        );
    }

    #[test]
    fn remote_build_context_degrades_to_empty_base_images() {
        let catalog = catalog_with(
            "app/docker-compose.yml",
            "services:\n  app:\n    build:\n      context: http://example.com/ctx\n",
        );

        let provenance = &resolve(&catalog)[0];
        assert_eq!(provenance.image, ImageReference::untagged());
        assert_eq!(provenance.record.base_images, Some(Vec::new()));
    }

    #[test]
    fn unreadable_build_file_degrades_to_empty_base_images() {
        let catalog = catalog_with(
            "app/docker-compose.yml",
            "services:\n  app:\n    build:\n      context: /nonexistent/build/dir\n",
        );

        let provenance = &resolve(&catalog)[0];
        assert_eq!(provenance.record.base_images, Some(Vec::new()));
    }

    #[test]
    fn service_without_image_or_build_gets_the_sentinel() {
        let catalog = catalog_with(
            "bare/docker-compose.yml",
            "services:\n  bare:\n    ports:\n      - '8080:80'\n",
        );

        let provenance = &resolve(&catalog)[0];
        assert_eq!(provenance.image, ImageReference::untagged());
        assert_eq!(provenance.record.base_images, None);
    }

    #[test]
    fn malformed_image_reference_degrades_to_the_sentinel() {
        let catalog = catalog_with(
            "web/docker-compose.yml",
            "services:\n  web:\n    image: 'registry:5000/app:1.0'\n",
        );

        let provenance = &resolve(&catalog)[0];
        assert_eq!(provenance.image, ImageReference::untagged());
    }

    #[test]
    fn file_without_services_contributes_nothing() {
        let mut catalog = ServiceCatalog::new();
        catalog.add(
            PathBuf::from("empty/docker-compose.yml"),
            serde_yaml::from_str("version: '3'\n").unwrap(),
        );
        catalog.add(
            PathBuf::from("web/docker-compose.yml"),
            serde_yaml::from_str("services:\n  web:\n    image: nginx\n").unwrap(),
        );

        let provenances = resolve(&catalog);
        assert_eq!(provenances.len(), 1);
        assert_eq!(provenances[0].record.service_name, "web");
    }

    #[test]
    fn undecodable_service_degrades_to_a_sentinel_record() {
        let catalog = catalog_with(
            "odd/docker-compose.yml",
            "services:\n  odd:\n    build:\n      dockerfile: Dockerfile.dev\n",
        );

        let provenances = resolve(&catalog);
        assert_eq!(provenances.len(), 1);
        assert_eq!(provenances[0].image, ImageReference::untagged());
        assert_eq!(provenances[0].record.base_images, None);
    }
}
