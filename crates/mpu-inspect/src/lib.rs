//! Read-only introspection of Armv7-M MPU region configuration.
//!
//! Raw region registers are split into plain attribute records, classified
//! through fixed lookup tables, and rendered as a human-readable report.

/// Human-readable size rendering.
pub mod size;
pub use size::{format_size, HumanSize, FULL_ADDRESS_SPACE_TEXT, SIZE_UNITS};

/// Access-permission decoding.
pub mod access;
pub use access::{decode_privileged, decode_unprivileged, AccessPermission, AccessPolicy};

/// Memory-type classification table.
pub mod memory_type;
pub use memory_type::{classify, MemoryType, MemoryTypeEntry, MEMORY_TYPE_TABLE};

/// Board memory-map lookup.
pub mod known_region;
pub use known_region::{match_known_region, KnownRegion, MemoryMap, STM32H7RS_MEMORY_MAP};

/// `RASR` field layout and attribute extraction.
pub mod attributes;
pub use attributes::{
    RegionAttributes, RASR_AP_MSK, RASR_AP_POS, RASR_B_MSK, RASR_B_POS, RASR_C_MSK, RASR_C_POS,
    RASR_ENABLE_MSK, RASR_ENABLE_POS, RASR_SIZE_MSK, RASR_SIZE_POS, RASR_SRD_MSK, RASR_SRD_POS,
    RASR_S_MSK, RASR_S_POS, RASR_TEX_MSK, RASR_TEX_POS, RASR_XN_MSK, RASR_XN_POS,
};

/// Register-access capability and captured-register backend.
pub mod registers;
pub use registers::{
    region_size_bytes, MpuRegisters, RegionRegisters, SnapshotError, StaticMpu,
    MAX_REGION_COUNT, RBAR_ADDR_MSK,
};

/// Report assembly and emission.
pub mod report;
pub use report::{
    print_all_regions, EnabledRegion, IoSink, MpuReport, Pacer, RegionSummary, ReportConfig,
    ReportSink, ThreadSleep, DEFAULT_PACING,
};

#[cfg(test)]
use proptest as _;
#[cfg(test)]
use rstest as _;
