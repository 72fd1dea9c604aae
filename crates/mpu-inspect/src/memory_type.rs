//! Memory-type classification from the `TEX`, `C` and `B` attribute bits.

use std::fmt;

/// Semantic memory type assigned to a `(TEX, C, B)` combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct MemoryType {
    /// Type name (e.g. `Normal`, `Device`).
    pub name: &'static str,
    /// Cache policy or ordering description.
    pub description: &'static str,
}

impl fmt::Display for MemoryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.description)
    }
}

/// One row of the classification table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MemoryTypeEntry {
    /// Type-extension field value.
    pub tex: u8,
    /// Cacheable bit.
    pub cacheable: u8,
    /// Bufferable bit.
    pub bufferable: u8,
    /// Classification for this key.
    pub memory_type: MemoryType,
}

const fn entry(
    tex: u8,
    cacheable: u8,
    bufferable: u8,
    name: &'static str,
    description: &'static str,
) -> MemoryTypeEntry {
    MemoryTypeEntry {
        tex,
        cacheable,
        bufferable,
        memory_type: MemoryType { name, description },
    }
}

/// Ordered classification table; the first matching key wins.
///
/// Keys absent from this table have no classification.
pub const MEMORY_TYPE_TABLE: [MemoryTypeEntry; 9] = [
    entry(0, 0, 0, "Strongly-ordered", "Strongly-ordered"),
    entry(0, 0, 1, "Device", "Shared Device"),
    entry(0, 1, 0, "Normal", "Write-Through No Write-Allocate"),
    entry(0, 1, 1, "Normal", "Write-Back, no Write-Allocate"),
    entry(1, 0, 0, "Normal", "Non-cacheable"),
    entry(1, 0, 1, "Reserved", "Reserved"),
    entry(1, 1, 0, "Undefined", "Undefined"),
    entry(1, 1, 1, "Normal", "Write-Back, Write and Read Allocate"),
    entry(2, 0, 0, "Device", "Non-Shareable device"),
];

/// Classifies a `(TEX, C, B)` triple by linear scan of [`MEMORY_TYPE_TABLE`].
#[must_use]
pub fn classify(tex: u8, cacheable: u8, bufferable: u8) -> Option<MemoryType> {
    MEMORY_TYPE_TABLE.iter().find_map(|entry| {
        (entry.tex == tex && entry.cacheable == cacheable && entry.bufferable == bufferable)
            .then_some(entry.memory_type)
    })
}
