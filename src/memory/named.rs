//! Windows named file mappings

use std::mem::size_of;

use windows::core::PCWSTR;
use windows::Win32::Foundation::{CloseHandle, HANDLE};
use windows::Win32::System::Memory::{
    MapViewOfFile, OpenFileMappingW, UnmapViewOfFile, VirtualQuery, FILE_MAP_ALL_ACCESS,
    MEMORY_BASIC_INFORMATION, MEMORY_MAPPED_VIEW_ADDRESS,
};

use crate::error::{RtssError, Result};

/// An opened file mapping together with a full view of it
pub(crate) struct NamedMapping {
    handle: HANDLE,
    view: MEMORY_MAPPED_VIEW_ADDRESS,
    len: usize,
}

impl NamedMapping {
    /// Open an existing mapping by name and map all of it read/write
    pub(crate) fn open(name: &str) -> Result<Self> {
        let name_wide: Vec<u16> = name.encode_utf16().chain(std::iter::once(0)).collect();

        let handle = unsafe {
            OpenFileMappingW(FILE_MAP_ALL_ACCESS.0, false, PCWSTR(name_wide.as_ptr()))
        }
        .map_err(|e| RtssError::attach_io(name, std::io::Error::from(e)))?;

        if handle.is_invalid() {
            return Err(RtssError::attach(name, "OpenFileMappingW returned invalid handle"));
        }

        let view = unsafe { MapViewOfFile(handle, FILE_MAP_ALL_ACCESS, 0, 0, 0) };
        if view.Value.is_null() {
            let err = std::io::Error::last_os_error();
            unsafe {
                let _ = CloseHandle(handle);
            }
            return Err(RtssError::attach_io(name, err));
        }

        let mut info = MEMORY_BASIC_INFORMATION::default();
        let written = unsafe {
            VirtualQuery(
                Some(view.Value as *const _),
                &mut info,
                size_of::<MEMORY_BASIC_INFORMATION>(),
            )
        };
        if written == 0 {
            let err = std::io::Error::last_os_error();
            unsafe {
                let _ = UnmapViewOfFile(view);
                let _ = CloseHandle(handle);
            }
            return Err(RtssError::attach_io(name, err));
        }

        Ok(Self {
            handle,
            view,
            len: info.RegionSize,
        })
    }

    pub(crate) fn as_ptr(&self) -> *mut u8 {
        self.view.Value as *mut u8
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }
}

impl std::fmt::Debug for NamedMapping {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NamedMapping")
            .field("view", &self.view.Value)
            .field("len", &self.len)
            .finish()
    }
}

impl Drop for NamedMapping {
    fn drop(&mut self) {
        unsafe {
            let _ = UnmapViewOfFile(self.view);
            let _ = CloseHandle(self.handle);
        }
    }
}
