//! Validated owner names and OSD text

use std::fmt;

use crate::{
    error::{RtssError, Result},
    layout::{MAX_OWNER_NAME_LEN, MAX_TEXT_LEN},
};

/// Publisher name as stored in the owner field of claimed slots
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OwnerName(String);

impl OwnerName {
    pub fn new(name: &str) -> Result<Self> {
        if name.trim().is_empty() {
            return Err(RtssError::validation(
                "name",
                "Entry name cannot be empty or whitespace",
            ));
        }
        if name.contains('\0') {
            return Err(RtssError::validation("name", "Entry name contains a NUL byte"));
        }
        if name.len() > MAX_OWNER_NAME_LEN {
            return Err(RtssError::validation(
                "name",
                format!(
                    "Entry name is {} bytes, max is {}",
                    name.len(),
                    MAX_OWNER_NAME_LEN
                ),
            ));
        }
        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Display for OwnerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Text accepted by `update`: no NUL, at most 4095 encoded bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OsdText<'a>(&'a str);

impl<'a> OsdText<'a> {
    pub fn new(text: &'a str) -> Result<Self> {
        if text.contains('\0') {
            return Err(RtssError::validation("text", "Text contains a NUL byte"));
        }
        if text.len() > MAX_TEXT_LEN {
            return Err(RtssError::validation(
                "text",
                format!("Text is {} bytes, max is {}", text.len(), MAX_TEXT_LEN),
            ));
        }
        Ok(Self(text))
    }

    pub fn as_str(&self) -> &'a str {
        self.0
    }

    /// Longest prefix of at most `max_len` bytes that ends on a character
    /// boundary
    pub fn fit(&self, max_len: usize) -> &'a [u8] {
        if self.0.len() <= max_len {
            return self.0.as_bytes();
        }
        let mut end = max_len;
        while !self.0.is_char_boundary(end) {
            end -= 1;
        }
        &self.0.as_bytes()[..end]
    }
}
