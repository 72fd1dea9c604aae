//! JSON register snapshots captured from a target.
//!
//! ```json
//! {
//!   "regions": [{ "rbar": 134217728, "rasr": 100794409 }],
//!   "memory_map": [{ "base": 134217728, "name": "Flash" }]
//! }
//! ```
//!
//! `memory_map` is optional; without it the default board map is used.

use std::fs;
use std::path::Path;

use mpu_inspect::{KnownRegion, MemoryMap, RegionRegisters, StaticMpu};
use serde::Deserialize;

/// Named memory-map area as stored in a snapshot file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MapEntry {
    pub base: u32,
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SnapshotFile {
    regions: Vec<RegionRegisters>,
    #[serde(default)]
    memory_map: Option<Vec<MapEntry>>,
}

/// Loaded snapshot: captured registers plus an optional board map override.
#[derive(Debug)]
pub struct Snapshot {
    pub mpu: StaticMpu,
    pub memory_map: Option<Vec<MapEntry>>,
}

impl Snapshot {
    pub fn parse(text: &str) -> Result<Self, String> {
        let file: SnapshotFile =
            serde_json::from_str(text).map_err(|e| format!("invalid snapshot: {e}"))?;
        let mpu = StaticMpu::from_regions(file.regions).map_err(|e| e.to_string())?;
        Ok(Self {
            mpu,
            memory_map: file.memory_map,
        })
    }

    pub fn load(path: &Path) -> Result<Self, String> {
        let text = fs::read_to_string(path)
            .map_err(|e| format!("failed to read {}: {e}", path.display()))?;
        Self::parse(&text)
    }

    /// Borrows the override table in file order, if one was given.
    pub fn known_regions(&self) -> Option<Vec<KnownRegion<'_>>> {
        self.memory_map.as_ref().map(|entries| {
            entries
                .iter()
                .map(|entry| KnownRegion::new(entry.base, &entry.name))
                .collect()
        })
    }
}

/// Selects the override table when present, the default board map otherwise.
pub fn memory_map<'a>(known_regions: Option<&'a [KnownRegion<'a>]>) -> MemoryMap<'a> {
    match known_regions {
        Some(regions) => MemoryMap::new(regions),
        None => MemoryMap::default(),
    }
}
