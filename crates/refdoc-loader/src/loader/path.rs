//! Tree paths and anchor selection
//!
//! A [`TreePath`] names one node of a parsed document (`$.servers[0].url`)
//! and is what discovery records for every `$ref`. Anchors (`/a/b/c`) are the
//! fragment half of a reference string and only ever walk mapping keys.
//!
//! Copyright (c) 2025 Refdoc Contributors
//! Licensed under the Apache-2.0 license

use crate::loader::error::{LoaderError, LoaderResult};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Key of an `allOf` composition array
pub const ALL_OF_KEY: &str = "allOf";

/// A single step in a tree path
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// Mapping key
    Key(String),
    /// Sequence index
    Index(usize),
}

/// Location of a node inside a document tree, rooted at `$`
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct TreePath {
    segments: Vec<PathSegment>,
}

impl TreePath {
    /// The document root
    pub fn root() -> Self {
        Self::default()
    }

    /// Build the path an anchor such as `/a/b` points at
    pub fn from_anchor(anchor: &str) -> LoaderResult<Self> {
        let rest = anchor
            .strip_prefix('/')
            .ok_or_else(|| LoaderError::invalid_anchor(anchor))?;
        Ok(Self {
            segments: rest
                .split('/')
                .map(|key| PathSegment::Key(key.to_string()))
                .collect(),
        })
    }

    /// Parse the rendered form (`$.a[0]['b.c']`) back into a path
    pub fn parse(expression: &str) -> LoaderResult<Self> {
        let rest = expression
            .strip_prefix('$')
            .ok_or_else(|| LoaderError::invalid_path(expression, "must start with '$'"))?;
        let chars: Vec<char> = rest.chars().collect();
        let error = |position: usize, reason: &str| {
            LoaderError::invalid_path(expression, format!("{reason} at position {}", position + 1))
        };

        let mut segments = Vec::new();
        let mut i = 0;
        while i < chars.len() {
            match chars[i] {
                '.' => {
                    let start = i + 1;
                    let mut end = start;
                    while end < chars.len() && chars[end] != '.' && chars[end] != '[' {
                        // Anything else that needs quoting must use the bracket form
                        if matches!(chars[end], ']' | '\'' | '"' | ' ') {
                            return Err(error(end, "unexpected character in key"));
                        }
                        end += 1;
                    }
                    if end == start {
                        return Err(error(i, "empty key"));
                    }
                    segments.push(PathSegment::Key(chars[start..end].iter().collect()));
                    i = end;
                }
                '[' => {
                    i += 1;
                    if chars.get(i) == Some(&'\'') {
                        i += 1;
                        let mut key = String::new();
                        loop {
                            match chars.get(i) {
                                Some('\\') => {
                                    let escaped = chars.get(i + 1).ok_or_else(|| error(i, "dangling escape"))?;
                                    key.push(*escaped);
                                    i += 2;
                                }
                                Some('\'') => {
                                    i += 1;
                                    break;
                                }
                                Some(c) => {
                                    key.push(*c);
                                    i += 1;
                                }
                                None => return Err(error(i, "unterminated quoted key")),
                            }
                        }
                        segments.push(PathSegment::Key(key));
                    } else {
                        let start = i;
                        while i < chars.len() && chars[i].is_ascii_digit() {
                            i += 1;
                        }
                        let index = chars[start..i]
                            .iter()
                            .collect::<String>()
                            .parse::<usize>()
                            .map_err(|_| error(start, "expected index"))?;
                        segments.push(PathSegment::Index(index));
                    }
                    if chars.get(i) != Some(&']') {
                        return Err(error(i, "expected ']'"));
                    }
                    i += 1;
                }
                _ => return Err(error(i, "unexpected character")),
            }
        }
        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Path of a child reached through a mapping key
    pub fn child_key(&self, key: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.push(PathSegment::Key(key.to_string()));
        Self { segments }
    }

    /// Path of a child reached through a sequence index
    pub fn child_index(&self, index: usize) -> Self {
        let mut segments = self.segments.clone();
        segments.push(PathSegment::Index(index));
        Self { segments }
    }

    /// Path with the last segment removed; `None` at the root
    pub fn parent(&self) -> Option<Self> {
        let (_, init) = self.segments.split_last()?;
        Some(Self {
            segments: init.to_vec(),
        })
    }

    /// True when `self` equals `ancestor` or lies beneath it
    pub fn is_descendant_of(&self, ancestor: &TreePath) -> bool {
        self.segments.len() >= ancestor.segments.len()
            && self.segments[..ancestor.segments.len()] == ancestor.segments[..]
    }

    /// For a path ending in `allOf[i]`, the path of the `allOf` array itself
    pub fn enclosing_all_of(&self) -> Option<Self> {
        match self.segments.as_slice() {
            [.., PathSegment::Key(key), PathSegment::Index(_)] if key == ALL_OF_KEY => self.parent(),
            _ => None,
        }
    }
}

impl fmt::Display for TreePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "$")?;
        for segment in &self.segments {
            match segment {
                PathSegment::Key(key) if is_plain_key(key) => write!(f, ".{key}")?,
                PathSegment::Key(key) => {
                    write!(f, "['{}']", key.replace('\\', "\\\\").replace('\'', "\\'"))?
                }
                PathSegment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

impl FromStr for TreePath {
    type Err = LoaderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn is_plain_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|c| !matches!(c, '.' | '[' | ']' | '\'' | '"' | ' '))
}

/// Select the single node at `path`
pub fn select_one<'a>(tree: &'a Value, path: &TreePath) -> LoaderResult<&'a Value> {
    let mut current = tree;
    for segment in path.segments() {
        let next = match (segment, current) {
            (PathSegment::Key(key), Value::Object(map)) => map.get(key),
            (PathSegment::Index(index), Value::Array(items)) => items.get(*index),
            _ => None,
        };
        current = next.ok_or_else(|| LoaderError::ambiguous_path(path.to_string(), 0))?;
    }
    Ok(current)
}

/// Select the single node at `path` for in-place mutation
pub fn select_one_mut<'a>(tree: &'a mut Value, path: &TreePath) -> LoaderResult<&'a mut Value> {
    let mut current = tree;
    for segment in path.segments() {
        let next = match (segment, current) {
            (PathSegment::Key(key), Value::Object(map)) => map.get_mut(key),
            (PathSegment::Index(index), Value::Array(items)) => items.get_mut(*index),
            _ => None,
        };
        current = next.ok_or_else(|| LoaderError::ambiguous_path(path.to_string(), 0))?;
    }
    Ok(current)
}

/// Walk a slash-delimited anchor such as `/foo/bar` through mapping keys
pub fn select_anchor<'a>(tree: &'a Value, anchor: &str) -> LoaderResult<&'a Value> {
    let rest = anchor
        .strip_prefix('/')
        .ok_or_else(|| LoaderError::invalid_anchor(anchor))?;

    let mut current = tree;
    for key in rest.split('/') {
        current = match current {
            Value::Object(map) => map.get(key).ok_or_else(|| {
                LoaderError::key_not_found(key, anchor, map.keys().cloned().collect())
            })?,
            _ => return Err(LoaderError::key_not_found(key, anchor, Vec::new())),
        };
    }
    Ok(current)
}
