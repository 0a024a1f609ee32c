use std::io;
use std::path::{Component, Path, PathBuf};

/// Why a request path could not be mapped to a file.
#[derive(Debug, PartialEq, Eq)]
pub enum Rejection {
    /// Nothing readable at the resolved location.
    NotFound,
    /// The path names something outside the group's root.
    Escapes,
}

/// Resolve `requested` (already percent-decoded) to a file under `root`.
///
/// `..`, absolute paths and drive prefixes are refused before touching the
/// filesystem; after canonicalization the target must still live under the
/// canonical root, which also catches symlinks pointing elsewhere.
pub async fn resolve_within(root: &Path, requested: &str) -> Result<PathBuf, Rejection> {
    let relative = Path::new(requested);
    if !relative
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
    {
        return Err(Rejection::Escapes);
    }

    let root = tokio::fs::canonicalize(root).await.map_err(not_found)?;
    let target = tokio::fs::canonicalize(root.join(relative))
        .await
        .map_err(not_found)?;

    if !target.starts_with(&root) {
        return Err(Rejection::Escapes);
    }

    let meta = tokio::fs::metadata(&target).await.map_err(not_found)?;
    if !meta.is_file() {
        return Err(Rejection::NotFound);
    }

    Ok(target)
}

fn not_found(_: io::Error) -> Rejection {
    Rejection::NotFound
}
