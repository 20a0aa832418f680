use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use serde::Deserialize;

static MANIFEST: Lazy<Manifest> = Lazy::new(|| {
    let raw = include_str!("../../../../fixtures/manifest.json");
    serde_json::from_str(raw).expect("fixtures manifest should parse")
});

#[derive(Debug, Deserialize)]
struct Manifest {
    documents: HashMap<String, DocumentEntry>,
}

/// What a fixture document is expected to compile to.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct Expectation {
    /// Bone records in the encoded stream.
    #[serde(default)]
    pub records: Option<usize>,
    #[serde(default)]
    pub warnings: Option<usize>,
    /// Error category when the document must fail.
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DocumentEntry {
    path: String,
    #[serde(flatten)]
    expect: Expectation,
}

fn fixtures_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../../fixtures")
}

fn resolve_path(rel: &str) -> PathBuf {
    fixtures_root().join(rel)
}

fn read_to_string(rel: &str) -> Result<String> {
    let path = resolve_path(rel);
    fs::read_to_string(&path)
        .with_context(|| format!("failed to read fixture at {}", path.display()))
}

fn lookup<'a, T>(map: &'a HashMap<String, T>, kind: &str, name: &str) -> Result<&'a T> {
    map.get(name)
        .ok_or_else(|| anyhow!("unknown {kind} fixture '{name}'"))
}

pub mod documents {
    use super::*;

    /// Fixture names, sorted.
    pub fn keys() -> Vec<String> {
        let mut keys: Vec<String> = MANIFEST.documents.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// MPL source text of a fixture.
    pub fn source(name: &str) -> Result<String> {
        let entry = lookup(&MANIFEST.documents, "document", name)?;
        read_to_string(&entry.path)
    }

    pub fn expectation(name: &str) -> Result<Expectation> {
        let entry = lookup(&MANIFEST.documents, "document", name)?;
        Ok(entry.expect.clone())
    }

    pub fn path(name: &str) -> Result<PathBuf> {
        let entry = lookup(&MANIFEST.documents, "document", name)?;
        Ok(resolve_path(&entry.path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_entries_exist_on_disk() {
        for key in documents::keys() {
            let path = documents::path(&key).unwrap();
            assert!(path.exists(), "missing fixture file {}", path.display());
        }
    }

    #[test]
    fn unknown_fixture_is_an_error() {
        let err = documents::source("nope").unwrap_err();
        assert!(err.to_string().contains("unknown document fixture 'nope'"));
    }

    #[test]
    fn failing_fixtures_declare_a_category() {
        let exp = documents::expectation("unknown-pose").unwrap();
        assert_eq!(exp.error.as_deref(), Some("name"));
        assert_eq!(exp.records, None);
    }
}
