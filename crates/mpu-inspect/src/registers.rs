//! Register-access capability consumed by the report emitter.

use thiserror::Error;

use crate::attributes::{RASR_ENABLE_MSK, RASR_SIZE_MSK, RASR_SIZE_POS};

const RASR_SIZE_FIELD_MAX: u32 = RASR_SIZE_MSK >> RASR_SIZE_POS;

/// Mask of the `ADDR` field in the region base address register.
pub const RBAR_ADDR_MSK: u32 = 0xFFFF_FFE0;

/// Largest region count addressable with an 8-bit region number.
pub const MAX_REGION_COUNT: usize = u8::MAX as usize;

/// Read-only view of the MPU region registers.
///
/// Every operation is infallible; implementations decide what an
/// out-of-range index reads as.
pub trait MpuRegisters {
    /// Number of regions the MPU implements.
    fn region_count(&self) -> u8;
    /// Returns `true` when region `index` is enabled.
    fn is_enabled(&self, index: u8) -> bool;
    /// Base address of region `index`.
    fn base_address(&self, index: u8) -> u32;
    /// Size of region `index` in bytes; `0` means 4 GB.
    fn encoded_size(&self, index: u8) -> u32;
    /// Raw `RASR` word of region `index`, holding the attribute bundle.
    fn raw_attributes(&self, index: u8) -> u32;
}

impl<T: MpuRegisters + ?Sized> MpuRegisters for &T {
    fn region_count(&self) -> u8 {
        (**self).region_count()
    }

    fn is_enabled(&self, index: u8) -> bool {
        (**self).is_enabled(index)
    }

    fn base_address(&self, index: u8) -> u32 {
        (**self).base_address(index)
    }

    fn encoded_size(&self, index: u8) -> u32 {
        (**self).encoded_size(index)
    }

    fn raw_attributes(&self, index: u8) -> u32 {
        (**self).raw_attributes(index)
    }
}

/// Converts a `RASR.SIZE` field value to a byte count.
///
/// Regions span `2^(SIZE+1)` bytes; the 4 GB encoding (`SIZE = 31`) does
/// not fit in 32 bits and yields `0`. Only the low five bits of `size_field`
/// are significant, matching the width of the register field.
#[must_use]
pub const fn region_size_bytes(size_field: u8) -> u32 {
    let shift = (size_field as u32 & RASR_SIZE_FIELD_MAX) + 1;
    match 1u32.checked_shl(shift) {
        Some(bytes) => bytes,
        None => 0,
    }
}

/// Raw register words captured for one region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct RegionRegisters {
    /// Region base address register.
    pub rbar: u32,
    /// Region attribute and size register.
    pub rasr: u32,
}

impl RegionRegisters {
    /// Returns `true` when the region enable bit is set.
    #[must_use]
    pub const fn enabled(self) -> bool {
        self.rasr & RASR_ENABLE_MSK != 0
    }

    /// Base address with the region-number and valid bits stripped.
    #[must_use]
    pub const fn base(self) -> u32 {
        self.rbar & RBAR_ADDR_MSK
    }

    /// Region size in bytes; `0` for a 4 GB region.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn size_bytes(self) -> u32 {
        region_size_bytes(((self.rasr & RASR_SIZE_MSK) >> RASR_SIZE_POS) as u8)
    }
}

/// Errors raised when building a [`StaticMpu`] from captured registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SnapshotError {
    /// More regions than an 8-bit region number can address.
    #[error(
        "snapshot holds {count} regions, at most {max} are addressable",
        max = MAX_REGION_COUNT
    )]
    TooManyRegions {
        /// Number of regions supplied.
        count: usize,
    },
}

/// In-memory MPU backed by captured register words.
///
/// Indices past the captured regions read as disabled, all-zero regions.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StaticMpu {
    regions: Vec<RegionRegisters>,
}

impl StaticMpu {
    /// Creates an MPU view over captured region registers.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::TooManyRegions`] when more than
    /// [`MAX_REGION_COUNT`] regions are supplied.
    pub fn from_regions(regions: Vec<RegionRegisters>) -> Result<Self, SnapshotError> {
        if regions.len() > MAX_REGION_COUNT {
            return Err(SnapshotError::TooManyRegions {
                count: regions.len(),
            });
        }
        Ok(Self { regions })
    }

    /// Returns the captured registers in region order.
    #[must_use]
    pub fn regions(&self) -> &[RegionRegisters] {
        &self.regions
    }

    fn region(&self, index: u8) -> RegionRegisters {
        self.regions
            .get(usize::from(index))
            .copied()
            .unwrap_or_default()
    }
}

impl MpuRegisters for StaticMpu {
    #[allow(clippy::cast_possible_truncation)]
    fn region_count(&self) -> u8 {
        self.regions.len() as u8
    }

    fn is_enabled(&self, index: u8) -> bool {
        self.region(index).enabled()
    }

    fn base_address(&self, index: u8) -> u32 {
        self.region(index).base()
    }

    fn encoded_size(&self, index: u8) -> u32 {
        self.region(index).size_bytes()
    }

    fn raw_attributes(&self, index: u8) -> u32 {
        self.region(index).rasr
    }
}
