//! Application statistics records

use std::{fmt, ops};

/// Graphics API and state bits reported for a hooked process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct AppFlags(u32);

impl AppFlags {
    pub const NONE: Self = Self(0);
    pub const OPENGL: Self = Self(0x0000_0001);
    pub const DIRECTDRAW: Self = Self(0x0000_0010);
    pub const DIRECT3D8: Self = Self(0x0000_0100);
    pub const DIRECT3D9: Self = Self(0x0000_1000);
    pub const DIRECT3D9EX: Self = Self(0x0000_2000);
    pub const DIRECT3D10: Self = Self(0x0001_0000);
    pub const DIRECT3D11: Self = Self(0x0002_0000);
    pub const PROFILE_UPDATE_REQUESTED: Self = Self(0x1000_0000);

    /// Union of every graphics API bit
    pub const API_MASK: Self = Self(
        Self::OPENGL.0
            | Self::DIRECTDRAW.0
            | Self::DIRECT3D8.0
            | Self::DIRECT3D9.0
            | Self::DIRECT3D9EX.0
            | Self::DIRECT3D10.0
            | Self::DIRECT3D11.0,
    );

    const NAMED: [(Self, &'static str); 8] = [
        (Self::OPENGL, "OpenGL"),
        (Self::DIRECTDRAW, "DirectDraw"),
        (Self::DIRECT3D8, "Direct3D8"),
        (Self::DIRECT3D9, "Direct3D9"),
        (Self::DIRECT3D9EX, "Direct3D9Ex"),
        (Self::DIRECT3D10, "Direct3D10"),
        (Self::DIRECT3D11, "Direct3D11"),
        (Self::PROFILE_UPDATE_REQUESTED, "ProfileUpdateRequested"),
    ];

    /// Keep unknown bits; the server may report APIs newer than this crate
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn bits(&self) -> u32 {
        self.0
    }

    pub const fn contains(&self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Only the graphics API bits
    pub const fn api(&self) -> Self {
        Self(self.0 & Self::API_MASK.0)
    }
}

impl ops::BitOr for AppFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl ops::BitOrAssign for AppFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl ops::BitAnd for AppFlags {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl fmt::Display for AppFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("None");
        }

        let mut rest = self.0;
        let mut first = true;
        for (flag, name) in Self::NAMED {
            if self.contains(flag) {
                if !first {
                    f.write_str(" | ")?;
                }
                f.write_str(name)?;
                rest &= !flag.0;
                first = false;
            }
        }
        if rest != 0 {
            if !first {
                f.write_str(" | ")?;
            }
            write!(f, "{:#x}", rest)?;
        }
        Ok(())
    }
}

/// One live process as reported by the statistics server.
///
/// Owned snapshot: it holds no reference into the segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppEntry {
    pub process_id: u32,
    pub name: String,
    pub flags: AppFlags,
    /// Start of the current framerate window, in milliseconds
    pub instantaneous_time_start: u32,
    /// End of the current framerate window, in milliseconds
    pub instantaneous_time_end: u32,
    /// Frames rendered inside the window
    pub instantaneous_frames: u32,
}

impl AppEntry {
    /// Frames per second over the current window, `None` for an empty window
    pub fn instantaneous_fps(&self) -> Option<f64> {
        let elapsed = self
            .instantaneous_time_end
            .wrapping_sub(self.instantaneous_time_start);
        if elapsed == 0 {
            return None;
        }
        Some(self.instantaneous_frames as f64 * 1000.0 / elapsed as f64)
    }
}

impl fmt::Display for AppEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}, {}", self.process_id, self.name, self.flags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(time0: u32, time1: u32, frames: u32) -> AppEntry {
        AppEntry {
            process_id: 1234,
            name: "game.exe".to_string(),
            flags: AppFlags::DIRECT3D11,
            instantaneous_time_start: time0,
            instantaneous_time_end: time1,
            instantaneous_frames: frames,
        }
    }

    #[test]
    fn test_flag_masks() {
        let flags = AppFlags::DIRECT3D11 | AppFlags::PROFILE_UPDATE_REQUESTED;
        assert!(flags.contains(AppFlags::DIRECT3D11));
        assert!(!flags.contains(AppFlags::OPENGL));
        assert_eq!(flags.api(), AppFlags::DIRECT3D11);
        assert_eq!(AppFlags::API_MASK.bits(), 0x0003_3111);
    }

    #[test]
    fn test_flag_display() {
        assert_eq!(AppFlags::NONE.to_string(), "None");
        assert_eq!(
            (AppFlags::OPENGL | AppFlags::from_bits(0x100_0000)).to_string(),
            "OpenGL | 0x1000000"
        );
    }

    #[test]
    fn test_instantaneous_fps() {
        assert_eq!(entry(0, 1000, 60).instantaneous_fps(), Some(60.0));
        assert_eq!(entry(500, 500, 60).instantaneous_fps(), None);
        assert_eq!(entry(u32::MAX - 99, 400, 30).instantaneous_fps(), Some(60.0));
    }

    #[test]
    fn test_entry_display() {
        assert_eq!(entry(0, 0, 0).to_string(), "1234:game.exe, Direct3D11");
    }
}
