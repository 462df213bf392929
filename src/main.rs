use anyhow::Result;
use log::{error, warn};
use std::{fs, path::PathBuf};
use structopt::StructOpt;

use catalog::ServiceCatalog;
use errors::ResolveError;
use models::ImageTree;
use provider::{ConfigProvider, DockerComposeProvider};

mod aggregate;
mod catalog;
mod dockerfile;
mod errors;
mod models;
mod provider;
mod resolver;

const COMPOSE_FILE: &str = "docker-compose.yml";

#[derive(Debug, StructOpt)]
#[structopt(
    name = "compose-inventory",
    about = "Maps the images of a docker-compose deployment to the services using them, \
             including the base images of locally built services."
)]
struct Opt {
    /// Compose files, or directories containing a docker-compose.yml.
    #[structopt(parse(from_os_str), required = true)]
    compose_files: Vec<PathBuf>,

    /// Write the result to this file instead of stdout.
    #[structopt(short, long, parse(from_os_str))]
    output: Option<PathBuf>,

    /// Skip input paths containing any of these substrings.
    #[structopt(short, long)]
    ignore: Vec<String>,
}

fn main() -> Result<()> {
    pretty_env_logger::init_custom_env("LOG");

    let opt = Opt::from_args();

    let mut provider = DockerComposeProvider::new();
    let tree = run(&opt.compose_files, &opt.ignore, &mut provider);

    let serialized = serde_json::to_string_pretty(&tree)?;
    match opt.output {
        Some(path) => fs::write(path, serialized)?,
        None => println!("{}", serialized),
    }

    Ok(())
}

/// Loads every input into the catalog, then resolves and aggregates. A
/// failing input is skipped with a report; the run always produces a tree,
/// possibly empty.
fn run(files: &[PathBuf], ignores: &[String], provider: &mut impl ConfigProvider) -> ImageTree {
    let mut catalog = ServiceCatalog::new();

    for file in files {
        let display = file.to_string_lossy();
        if ignores.iter().any(|pattern| display.contains(pattern)) {
            warn!("skip {:?} due to ignore rule", file);
            continue;
        }

        let file = if file.ends_with(COMPOSE_FILE) {
            file.clone()
        } else {
            warn!("guessing compose file location under {:?}", file);
            file.join(COMPOSE_FILE)
        };

        if !file.exists() {
            error!("{}", ResolveError::MissingInputFile(file));
            continue;
        }

        match provider.canonical_document(&file) {
            Ok(document) => catalog.add(file, document),
            Err(err) => error!("could not load {:?}: {:#}", file, err),
        }
    }

    aggregate::aggregate(resolver::resolve(&catalog))
}
