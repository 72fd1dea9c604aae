//! Human-readable rendering of encoded region sizes.

use std::fmt;

/// Magnitude units in ascending order; each step is a factor of 1024.
pub const SIZE_UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

/// Literal rendered for the `0` sentinel (a full 4 GB region).
pub const FULL_ADDRESS_SPACE_TEXT: &str = "4 GB";

/// Display adapter that renders a byte count with the largest exact unit.
///
/// A unit is only chosen when the division by 1024 leaves no remainder, so
/// `1536` renders as `1536 B` rather than a rounded `1.5 KB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HumanSize(pub u32);

impl HumanSize {
    /// Returns the scaled value and the index into [`SIZE_UNITS`].
    ///
    /// Returns `None` for the `0` sentinel.
    #[must_use]
    pub const fn scaled(self) -> Option<(u32, usize)> {
        if self.0 == 0 {
            return None;
        }

        let mut value = self.0;
        let mut unit = 0;
        while value % 1024 == 0 && unit < SIZE_UNITS.len() - 1 {
            value /= 1024;
            unit += 1;
        }
        Some((value, unit))
    }
}

impl fmt::Display for HumanSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.scaled() {
            Some((value, unit)) => write!(f, "{value} {}", SIZE_UNITS[unit]),
            None => f.write_str(FULL_ADDRESS_SPACE_TEXT),
        }
    }
}

/// Formats an encoded region size; `0` means the maximum size (4 GB).
#[must_use]
pub fn format_size(byte_count: u32) -> String {
    HumanSize(byte_count).to_string()
}
