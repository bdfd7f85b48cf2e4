//! Mapped views onto the statistics segment

use std::{
    fs::OpenOptions,
    sync::{atomic::Ordering, Arc},
};

use log::debug;
use memmap2::{MmapMut, MmapOptions};

use crate::error::{RtssError, Result};

use super::{
    config::{BackingType, SegmentConfig},
    simulated::SimulatedState,
};

#[cfg(windows)]
use super::named::NamedMapping;

/// What keeps a view's memory alive
#[derive(Debug)]
#[allow(dead_code)] // held for its Drop
enum Mapping {
    /// Mapping of an existing file
    File(MmapMut),
    /// View onto an in-process simulated segment
    Simulated(Arc<SimulatedState>),
    /// View of a named file mapping
    #[cfg(windows)]
    Named(NamedMapping),
}

/// One attached view of the segment.
///
/// Dropping the view unmaps it and releases the mapping handle, so every
/// attach is paired with exactly one detach on every exit path.
#[derive(Debug)]
pub struct SegmentView {
    name: String,
    base: *mut u8,
    len: usize,
    mapping: Mapping,
}

// SAFETY: the base pointer stays valid for as long as `mapping` is owned by
// the view, and the mapped memory is process-shared by construction.
unsafe impl Send for SegmentView {}

impl SegmentView {
    /// Open the segment described by `config`
    pub fn open(config: &SegmentConfig) -> Result<Self> {
        config.validate()?;

        match config.backing_type {
            BackingType::FileBacked => Self::open_file(config),
            BackingType::Named => Self::open_named(config),
        }
    }

    fn open_file(config: &SegmentConfig) -> Result<Self> {
        // validate() guarantees a path for file-backed segments
        let path = config
            .file_path
            .as_ref()
            .ok_or_else(|| RtssError::validation("file_path", "missing"))?;

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(|e| RtssError::attach_io(&config.name, e))?;

        let mut mmap = unsafe {
            MmapOptions::new()
                .map_mut(&file)
                .map_err(|e| RtssError::attach_io(&config.name, e))?
        };

        let base = mmap.as_mut_ptr();
        let len = mmap.len();
        debug!("Attached file-backed segment {} at {:?} ({} bytes)", config.name, path, len);

        Ok(Self {
            name: config.name.clone(),
            base,
            len,
            mapping: Mapping::File(mmap),
        })
    }

    #[cfg(windows)]
    fn open_named(config: &SegmentConfig) -> Result<Self> {
        let named = NamedMapping::open(&config.name)?;
        let base = named.as_ptr();
        let len = named.len();
        debug!("Attached named segment {} ({} bytes)", config.name, len);

        Ok(Self {
            name: config.name.clone(),
            base,
            len,
            mapping: Mapping::Named(named),
        })
    }

    #[cfg(not(windows))]
    fn open_named(config: &SegmentConfig) -> Result<Self> {
        // Unreachable after validate(); kept so the match stays exhaustive
        Err(RtssError::attach(
            &config.name,
            "Named segments are only available on Windows",
        ))
    }

    /// View onto a simulated segment
    pub(crate) fn simulated(name: &str, state: Arc<SimulatedState>) -> Self {
        let base = state.base();
        let len = state.len();
        state.live_views.fetch_add(1, Ordering::SeqCst);

        Self {
            name: name.to_string(),
            base,
            len,
            mapping: Mapping::Simulated(state),
        }
    }

    /// Name the segment was opened under
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Base address of the mapping
    pub fn as_ptr(&self) -> *mut u8 {
        self.base
    }

    /// Mapped length in bytes
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Drop for SegmentView {
    fn drop(&mut self) {
        if let Mapping::Simulated(state) = &self.mapping {
            state.live_views.fetch_sub(1, Ordering::SeqCst);
        }
        debug!("Detached segment {}", self.name);
        // The mapping itself is released when `mapping` drops
    }
}
