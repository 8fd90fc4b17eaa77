//! Generate-and-write cycle for `org.eclipse.core.resources.prefs`.
//!
//! One [`ResourceEncodingGenerator`] run:
//! 1. reads the existing preference file (a missing file yields the built-in default)
//! 2. loads it into a fresh [`EncodingDocument`] according to the [`LoadPolicy`]
//! 3. runs [`merge_encodings`] (before hook, registry, after hook)
//! 4. serializes, transforms and atomically replaces the file
//!
//! Nothing touches the disk until every step before the write has succeeded.

use crate::encoding::{
    DEFAULT_RESOURCE, EncodingDocument, EncodingRegistry, LoadPolicy, PropertiesFileMerger,
    merge_encodings,
};
use crate::properties::{self, Properties};
use crate::{Error, Result};
use serde::Serialize;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Directory holding Eclipse project settings.
pub const SETTINGS_DIR: &str = ".settings";

/// File name of the resource preferences.
pub const PREFS_FILE_NAME: &str = "org.eclipse.core.resources.prefs";

/// Default location of the preference file for a project.
pub fn default_output_path(project_dir: &Path) -> PathBuf {
    project_dir.join(SETTINGS_DIR).join(PREFS_FILE_NAME)
}

/// Outcome of a generation run.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationReport {
    /// File that was (or would be) written
    pub output: PathBuf,
    /// Whether a preference file existed before the run
    pub existed: bool,
    /// Whether the written content differs from what was on disk
    pub changed: bool,
    /// Whether the file was actually written
    pub written: bool,
    /// Final entries in file order
    pub entries: Properties,
    /// Final file content
    pub content: String,
}

/// Generates the resource encoding preference file.
#[derive(Debug)]
pub struct ResourceEncodingGenerator {
    output: PathBuf,
    registry: EncodingRegistry,
    merger: PropertiesFileMerger,
    load_policy: LoadPolicy,
}

impl ResourceEncodingGenerator {
    /// Create a generator writing to `output` with no hooks and the default load policy.
    pub fn new(output: impl Into<PathBuf>, registry: EncodingRegistry) -> Self {
        Self {
            output: output.into(),
            registry,
            merger: PropertiesFileMerger::new(),
            load_policy: LoadPolicy::default(),
        }
    }

    pub fn with_merger(mut self, merger: PropertiesFileMerger) -> Self {
        self.merger = merger;
        self
    }

    pub fn with_load_policy(mut self, load_policy: LoadPolicy) -> Self {
        self.load_policy = load_policy;
        self
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    pub fn registry(&self) -> &EncodingRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut EncodingRegistry {
        &mut self.registry
    }

    pub fn merger_mut(&mut self) -> &mut PropertiesFileMerger {
        &mut self.merger
    }

    /// Build the final content without writing it.
    pub fn render(&mut self) -> Result<GenerationReport> {
        let existing = self.read_existing()?;

        let persisted = match existing.as_deref() {
            Some(text) => self.parse(text)?,
            None => self.parse(DEFAULT_RESOURCE)?,
        };

        if existing.is_some() && self.load_policy == LoadPolicy::Discard {
            tracing::warn!(
                path = %self.output.display(),
                "discarding existing preference entries"
            );
        }

        let mut document = EncodingDocument::with_load_policy(self.load_policy);
        document.load(&persisted);
        merge_encodings(&self.registry, &mut document, &mut self.merger)?;

        let entries = document.store();
        let content = self
            .merger
            .transformer()
            .transform(properties::to_string(&entries));

        Ok(GenerationReport {
            output: self.output.clone(),
            existed: existing.is_some(),
            changed: existing.as_deref() != Some(content.as_str()),
            written: false,
            entries,
            content,
        })
    }

    /// Build the final content and write it atomically.
    ///
    /// The file is left untouched when the content is unchanged.
    pub fn generate(&mut self) -> Result<GenerationReport> {
        let mut report = self.render()?;

        if !report.changed {
            tracing::debug!(path = %self.output.display(), "preference file up to date");
            return Ok(report);
        }

        write_atomic(&self.output, &properties::encode_latin1(&report.content))?;
        tracing::info!(
            path = %self.output.display(),
            entries = report.entries.len(),
            "wrote preference file"
        );
        report.written = true;
        Ok(report)
    }

    /// Delete the generated file. Returns `false` if it did not exist.
    pub fn clean(&self) -> Result<bool> {
        match std::fs::remove_file(&self.output) {
            Ok(()) => {
                tracing::info!(path = %self.output.display(), "removed preference file");
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn read_existing(&self) -> Result<Option<String>> {
        match std::fs::read(&self.output) {
            Ok(bytes) => {
                tracing::debug!(path = %self.output.display(), "read existing preference file");
                Ok(Some(properties::decode_latin1(&bytes)))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn parse(&self, text: &str) -> Result<Properties> {
        properties::parse(text).map_err(|source| Error::Properties {
            path: self.output.display().to_string(),
            source,
        })
    }
}

/// Write through a temp file in the target directory, then rename over `path`.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&parent)?;

    let mut tmp = tempfile::NamedTempFile::new_in(&parent)?;
    tmp.write_all(bytes)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| Error::Io(e.error))?;
    Ok(())
}
