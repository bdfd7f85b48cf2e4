//! Error types and handling for rtss-shm

/// Result type alias for rtss-shm operations
pub type Result<T> = std::result::Result<T, RtssError>;

/// Errors surfaced by segment access, OSD publishing and statistics scans
#[derive(Debug, thiserror::Error)]
pub enum RtssError {
    /// Caller-supplied input violates a precondition. Raised before the
    /// segment is touched.
    #[error("Invalid parameter: {parameter} - {message}")]
    Validation { parameter: String, message: String },

    /// The shared segment could not be opened or mapped
    #[error("Failed to attach to shared memory '{name}': {message}")]
    Attach {
        name: String,
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },

    /// The segment was mapped but is not a compatible statistics segment
    #[error("Invalid segment format: {message}")]
    Format { message: String },

    /// I/O related errors outside the attach path
    #[error("I/O error: {message}")]
    Io {
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },
}

impl RtssError {
    /// Create an I/O error from a standard I/O error
    pub fn from_io(source: std::io::Error, context: &str) -> Self {
        Self::Io {
            message: format!("{}: {}", context, source),
            source: Some(source),
        }
    }

    /// Create a validation error
    pub fn validation(parameter: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            parameter: parameter.into(),
            message: message.into(),
        }
    }

    /// Create an attach error without an underlying OS error
    pub fn attach(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Attach {
            name: name.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Create an attach error wrapping the OS error that caused it
    pub fn attach_io(name: impl Into<String>, source: std::io::Error) -> Self {
        Self::Attach {
            name: name.into(),
            message: source.to_string(),
            source: Some(source),
        }
    }

    /// Create a format error
    pub fn format(message: impl Into<String>) -> Self {
        Self::Format {
            message: message.into(),
        }
    }

    /// True for caller input errors
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// True when the segment could not be reached at all
    pub fn is_attach(&self) -> bool {
        matches!(self, Self::Attach { .. })
    }

    /// True when the segment was reached but rejected
    pub fn is_format(&self) -> bool {
        matches!(self, Self::Format { .. })
    }
}

impl From<std::io::Error> for RtssError {
    fn from(err: std::io::Error) -> Self {
        Self::from_io(err, "I/O operation failed")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = RtssError::validation("name", "too long");
        assert!(err.is_validation());

        let err = RtssError::attach("RTSSSharedMemoryV2", "not running");
        assert!(err.is_attach());

        let err = RtssError::format("bad signature");
        assert!(err.is_format());
    }

    #[test]
    fn test_error_display() {
        let err = RtssError::validation("text", "exceeds 4095 bytes");
        let display = format!("{}", err);
        assert!(display.contains("Invalid parameter"));
        assert!(display.contains("text"));
        assert!(display.contains("4095"));

        let err = RtssError::attach_io(
            "RTSSSharedMemoryV2",
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        );
        let display = format!("{}", err);
        assert!(display.contains("RTSSSharedMemoryV2"));
        assert!(display.contains("missing"));
    }

    #[test]
    fn test_attach_keeps_source() {
        use std::error::Error;

        let err = RtssError::attach_io(
            "seg",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(err.source().is_some());
        assert!(RtssError::attach("seg", "x").source().is_none());
    }
}
