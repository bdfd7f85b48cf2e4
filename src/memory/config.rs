//! Configuration types for attaching to the statistics segment

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::layout::SHARED_MEMORY_NAME;

/// How the segment is reached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BackingType {
    /// Named file mapping published by the server (Windows-specific)
    Named,
    /// Existing file mapped read/write, for servers that expose the
    /// segment through a file or for local testing
    FileBacked,
}

impl Default for BackingType {
    fn default() -> Self {
        Self::Named
    }
}

impl BackingType {
    /// Check if this backing type is supported on the current platform
    pub fn is_supported(&self) -> bool {
        match self {
            BackingType::Named => cfg!(windows),
            BackingType::FileBacked => true,
        }
    }

    /// Get a human-readable name for the backing type
    pub fn name(&self) -> &'static str {
        match self {
            BackingType::Named => "named",
            BackingType::FileBacked => "file-backed",
        }
    }
}

/// Configuration for attaching to a segment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentConfig {
    /// Name of the segment (the mapping name for named backing)
    pub name: String,
    /// Backing type of the segment
    pub backing_type: BackingType,
    /// File to map for file-backed segments
    pub file_path: Option<PathBuf>,
}

impl Default for SegmentConfig {
    fn default() -> Self {
        Self {
            name: SHARED_MEMORY_NAME.to_string(),
            backing_type: BackingType::default(),
            file_path: None,
        }
    }
}

impl SegmentConfig {
    /// Create a configuration for a named segment
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Configuration mapping an existing file instead of a named segment
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::default()
            .with_backing_type(BackingType::FileBacked)
            .with_file_path(path)
    }

    /// Set the backing type
    pub fn with_backing_type(mut self, backing_type: BackingType) -> Self {
        self.backing_type = backing_type;
        self
    }

    /// Set the file path for file-backed segments
    pub fn with_file_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.file_path = Some(path.into());
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> crate::Result<()> {
        use crate::error::RtssError;

        if self.name.trim().is_empty() {
            return Err(RtssError::validation(
                "name",
                "Segment name cannot be empty",
            ));
        }

        if !self.backing_type.is_supported() {
            return Err(RtssError::validation(
                "backing_type",
                format!(
                    "Backing type {} is not supported on this platform",
                    self.backing_type.name()
                ),
            ));
        }

        if self.backing_type == BackingType::FileBacked && self.file_path.is_none() {
            return Err(RtssError::validation(
                "file_path",
                "File path must be specified for file-backed segments",
            ));
        }

        Ok(())
    }
}
