//! Conversions between filesystem paths and `file://` URIs.

use std::path::{Component, Path, PathBuf};

fn scheme(uri: &str) -> Option<&str> {
    let (scheme, _) = uri.split_once("://")?;
    let valid = !scheme.is_empty()
        && scheme
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    valid.then_some(scheme)
}

/// True for `http://` and `https://` URIs.
pub fn is_remote(uri: &str) -> bool {
    matches!(
        scheme(uri).map(|s| s.to_ascii_lowercase()).as_deref(),
        Some("http") | Some("https")
    )
}

/// Percent-encode `path` into an absolute `file://` URI.
pub fn path_to_uri(path: &Path) -> String {
    let abs = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|d| d.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    };

    let mut uri = String::from("file://");
    for component in abs.components() {
        match component {
            Component::Normal(seg) => {
                uri.push('/');
                uri.push_str(&urlencoding::encode(&seg.to_string_lossy()));
            }
            Component::ParentDir => uri.push_str("/.."),
            Component::RootDir | Component::CurDir | Component::Prefix(_) => {}
        }
    }
    if uri.len() == "file://".len() {
        uri.push('/');
    }
    uri
}

/// Decode a `file://` URI back into a path; `None` for any other scheme.
pub fn uri_to_path(uri: &str) -> Option<PathBuf> {
    let rest = uri.strip_prefix("file://")?;
    // `file://host/path`: only the path part is meaningful locally.
    let rest = if rest.starts_with('/') {
        rest
    } else {
        &rest[rest.find('/')?..]
    };
    let decoded = urlencoding::decode(rest).ok()?;
    Some(PathBuf::from(decoded.into_owned()))
}

/// Derive a display title from the final path segment of a URI: decoded,
/// query and fragment dropped, extension stripped.
pub fn title_from_uri(uri: &str) -> Option<String> {
    let without_query = uri.split(['?', '#']).next().unwrap_or(uri);
    let path_part = match without_query.split_once("://") {
        Some((_, rest)) => rest,
        None => without_query,
    };
    let segment = path_part.trim_end_matches('/').rsplit('/').next()?;
    let decoded = urlencoding::decode(segment).ok()?;
    let stem = Path::new(decoded.as_ref())
        .file_stem()
        .map(|s| s.to_string_lossy().trim().to_string())?;
    (!stem.is_empty()).then_some(stem)
}
