use log::warn;
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{errors::ResolveError, models::BuildSpec};

const DOCKERFILE: &str = "Dockerfile";
const FROM_KEYWORD: &str = "FROM";

/// Extracts every base-image reference declared in the build file of the
/// given build spec, in file order, duplicates preserved and un-normalized.
pub fn base_images(build: &BuildSpec) -> Result<Vec<String>, ResolveError> {
    let path = build_file_path(build);

    if let Some(remote) = path.to_str().filter(|p| is_remote(p)) {
        return Err(ResolveError::UnsupportedSource(remote.into()));
    }

    let source = fs::read_to_string(&path).map_err(|source| ResolveError::IoFailure {
        path: path.clone(),
        source,
    })?;

    let sources = source
        .lines()
        .filter_map(base_image_of_line)
        .map(str::to_owned)
        .collect();

    Ok(sources)
}

/// An explicit `dockerfile` joins with the context; otherwise the
/// conventional name is guessed inside the context, unless the context
/// already names a build file itself.
fn build_file_path(build: &BuildSpec) -> PathBuf {
    match &build.dockerfile {
        Some(dockerfile) => build.context.join(dockerfile),
        None if context_names_build_file(&build.context) => build.context.clone(),
        None => {
            warn!("guessing build file location under {:?}", build.context);
            build.context.join(DOCKERFILE)
        }
    }
}

fn context_names_build_file(context: &Path) -> bool {
    context
        .to_str()
        .map(|context| context.ends_with(DOCKERFILE))
        .unwrap_or(false)
}

fn is_remote(path: &str) -> bool {
    path.starts_with("http://") || path.starts_with("https://")
}

/// The second space-separated token of a line whose trimmed content starts
/// with `FROM`. The keyword match is case-sensitive, a known gap.
fn base_image_of_line(line: &str) -> Option<&str> {
    let line = line.trim();
    if line.starts_with(FROM_KEYWORD) {
        line.split(' ').nth(1)
    } else {
        None
    }
}
