//! Reference strings and canonical document locations
//!
//! A reference is `<base>`, `<base>#<anchor>` or `#<anchor>`. The base may be
//! a `file://` marker, an `http(s)://` URL, a path (absolute, or relative to
//! the referencing document), or a dotted package name such as
//! `suites.uspace.flight_auth` resolved against the package root.
//!
//! Copyright (c) 2025 Refdoc Contributors
//! Licensed under the Apache-2.0 license

use crate::loader::error::{LoaderError, LoaderResult};
use crate::loader::format::RECOGNIZED_EXTENSIONS;
use std::fmt;
use std::path::{Component, Path, PathBuf};
use url::Url;

pub const FILE_PREFIX: &str = "file://";
pub const HTTP_PREFIX: &str = "http://";
pub const HTTPS_PREFIX: &str = "https://";

/// Extensions that mark a bare reference as a relative path rather than a package name
const PATH_LIKE_EXTENSIONS: [&str; 3] = [".yaml", ".json", ".jsonnet"];

/// Extensions that have a package name
const DICTIONARY_EXTENSIONS: [&str; 2] = ["yaml", "json"];

/// Canonical identity of a loaded document, used as the cache key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Location {
    /// Absolute, lexically normalized local path
    File(PathBuf),
    /// Remote document
    Url(Url),
}

impl Location {
    /// Parse an absolute URL location
    pub fn parse_url(reference: &str) -> LoaderResult<Self> {
        Url::parse(reference)
            .map(Location::Url)
            .map_err(|e| LoaderError::location_not_found(reference, format!("invalid URL: {e}")))
    }

    /// Lowercased extension of the file name, without the dot
    pub fn extension(&self) -> Option<String> {
        let name = match self {
            Location::File(path) => path.file_name()?.to_str()?.to_string(),
            Location::Url(url) => url.path_segments()?.last()?.to_string(),
        };
        let (_, extension) = name.rsplit_once('.')?;
        Some(extension.to_lowercase())
    }

    /// Resolve `relative` against the directory containing this location
    pub fn join(&self, relative: &str) -> LoaderResult<Self> {
        match self {
            Location::File(path) => {
                let dir = path.parent().unwrap_or_else(|| Path::new("/"));
                Ok(Location::File(normalize_path(&dir.join(relative))))
            }
            Location::Url(url) => url.join(relative).map(Location::Url).map_err(|e| {
                LoaderError::location_not_found(relative, format!("cannot join onto {url}: {e}"))
            }),
        }
    }

    /// Location of `relative` inside the directory `folder`, which is a path or a URL
    pub fn in_folder(folder: &str, relative: &str) -> LoaderResult<Self> {
        if is_url(relative) {
            return Self::parse_url(relative);
        }
        if is_url(folder) {
            let base = if folder.ends_with('/') {
                folder.to_string()
            } else {
                format!("{folder}/")
            };
            return Url::parse(&base)
                .and_then(|url| url.join(relative))
                .map(Location::Url)
                .map_err(|e| {
                    LoaderError::location_not_found(relative, format!("cannot join onto {folder}: {e}"))
                });
        }
        absolute(&Path::new(folder).join(relative), relative).map(Location::File)
    }

    /// Directory containing this location, as handed to template import callbacks
    pub fn directory(&self) -> String {
        match self {
            Location::File(path) => path
                .parent()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "/".to_string()),
            Location::Url(url) => url
                .join(".")
                .map(|u| u.to_string())
                .unwrap_or_else(|_| url.to_string()),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::File(path) => write!(f, "{}", path.display()),
            Location::Url(url) => write!(f, "{url}"),
        }
    }
}

/// Split a reference at its first `#` into base and anchor
pub fn split_anchor(reference: &str) -> (&str, Option<&str>) {
    match reference.split_once('#') {
        Some((base, anchor)) => (base, Some(anchor)),
        None => (reference, None),
    }
}

/// Whether a reference names an http(s) resource
pub fn is_url(reference: &str) -> bool {
    reference.starts_with(HTTP_PREFIX) || reference.starts_with(HTTPS_PREFIX)
}

fn looks_like_path(reference: &str) -> bool {
    let lower = reference.to_lowercase();
    reference.starts_with('.')
        || reference.contains('/')
        || reference.contains('\\')
        || PATH_LIKE_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

/// Lexically resolve `.` and `..` components without touching the filesystem
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push(component);
                }
            }
            other => normalized.push(other),
        }
    }
    normalized
}

/// Turns reference strings into canonical [`Location`]s
#[derive(Debug, Clone)]
pub struct Canonicalizer {
    package_root: PathBuf,
    extensions: Vec<String>,
}

impl Canonicalizer {
    /// Create a canonicalizer resolving package names under `package_root`
    pub fn new(package_root: impl Into<PathBuf>) -> Self {
        Self {
            package_root: package_root.into(),
            extensions: RECOGNIZED_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        }
    }

    /// Replace the ordered list of extensions probed for package names
    pub fn with_extensions(mut self, extensions: Vec<String>) -> Self {
        self.extensions = extensions;
        self
    }

    pub fn package_root(&self) -> &Path {
        &self.package_root
    }

    /// Canonicalize the base of a reference (no `#anchor`) relative to `context`
    pub fn canonicalize(&self, reference: &str, context: Option<&Location>) -> LoaderResult<Location> {
        if is_url(reference) {
            return Location::parse_url(reference);
        }

        if let Some(path) = reference.strip_prefix(FILE_PREFIX) {
            return self.file_location(reference, path, context);
        }

        if Path::new(reference).is_absolute() {
            return Ok(Location::File(normalize_path(Path::new(reference))));
        }

        if looks_like_path(reference) {
            return self.file_location(reference, reference, context);
        }

        self.resolve_package_name(reference)
    }

    fn file_location(&self, reference: &str, path: &str, context: Option<&Location>) -> LoaderResult<Location> {
        if Path::new(path).is_absolute() {
            return Ok(Location::File(normalize_path(Path::new(path))));
        }
        match context {
            Some(context) => context.join(path),
            None => absolute(Path::new(path), reference).map(Location::File),
        }
    }

    /// Probe `<root>/<a>/<b>` plus each recognized extension for the name `a.b`
    pub fn resolve_package_name(&self, name: &str) -> LoaderResult<Location> {
        let mut base = self.package_root.clone();
        for part in name.split('.') {
            base.push(part);
        }
        let base = absolute(&base, name)?;

        for extension in &self.extensions {
            let mut candidate = base.clone().into_os_string();
            candidate.push(extension);
            let candidate = PathBuf::from(candidate);
            if candidate.exists() {
                tracing::trace!(package = name, path = %candidate.display(), "resolved package name");
                return Ok(Location::File(candidate));
            }
        }

        Err(LoaderError::location_not_found(
            name,
            format!(
                "no file {}{{{}}} exists",
                base.display(),
                self.extensions.join(",")
            ),
        ))
    }

    /// Package-style name of a local YAML or JSON file, e.g. `suites.astm.netrid`
    pub fn package_name_of(&self, path: &Path) -> LoaderResult<String> {
        let display = path.display().to_string();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();
        if !DICTIONARY_EXTENSIONS.contains(&extension.as_str()) {
            return Err(LoaderError::unsupported_format(display));
        }

        let full = absolute(&path.with_extension(""), &display)?;
        let root = absolute(&self.package_root, &display)?;
        let relative = full.strip_prefix(&root).map_err(|_| {
            LoaderError::location_not_found(
                display.clone(),
                format!("not inside package root {}", root.display()),
            )
        })?;

        let parts: Vec<String> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        Ok(parts.join("."))
    }
}

fn absolute(path: &Path, reference: &str) -> LoaderResult<PathBuf> {
    std::path::absolute(path)
        .map(|p| normalize_path(&p))
        .map_err(|e| LoaderError::location_not_found(reference, e.to_string()))
}
