//! Region attribute and size register (`RASR`) field layout and extraction.
//!
//! Extraction is purely mask/shift; classification of the extracted values
//! lives in [`crate::access`] and [`crate::memory_type`].

use crate::access::AccessPolicy;
use crate::memory_type::{classify, MemoryType};

/// Bit position of the region enable flag.
pub const RASR_ENABLE_POS: u32 = 0;
/// Mask of the region enable flag.
pub const RASR_ENABLE_MSK: u32 = 0x1 << RASR_ENABLE_POS;
/// Bit position of the `SIZE` field.
pub const RASR_SIZE_POS: u32 = 1;
/// Mask of the `SIZE` field.
pub const RASR_SIZE_MSK: u32 = 0x1F << RASR_SIZE_POS;
/// Bit position of the sub-region disable field.
pub const RASR_SRD_POS: u32 = 8;
/// Mask of the sub-region disable field.
pub const RASR_SRD_MSK: u32 = 0xFF << RASR_SRD_POS;
/// Bit position of the bufferable bit.
pub const RASR_B_POS: u32 = 16;
/// Mask of the bufferable bit.
pub const RASR_B_MSK: u32 = 0x1 << RASR_B_POS;
/// Bit position of the cacheable bit.
pub const RASR_C_POS: u32 = 17;
/// Mask of the cacheable bit.
pub const RASR_C_MSK: u32 = 0x1 << RASR_C_POS;
/// Bit position of the shareable bit.
pub const RASR_S_POS: u32 = 18;
/// Mask of the shareable bit.
pub const RASR_S_MSK: u32 = 0x1 << RASR_S_POS;
/// Bit position of the type-extension field.
pub const RASR_TEX_POS: u32 = 19;
/// Mask of the type-extension field.
pub const RASR_TEX_MSK: u32 = 0x7 << RASR_TEX_POS;
/// Bit position of the access-permission field.
pub const RASR_AP_POS: u32 = 24;
/// Mask of the access-permission field.
pub const RASR_AP_MSK: u32 = 0x7 << RASR_AP_POS;
/// Bit position of the execute-never bit.
pub const RASR_XN_POS: u32 = 28;
/// Mask of the execute-never bit.
pub const RASR_XN_MSK: u32 = 0x1 << RASR_XN_POS;

#[allow(clippy::cast_possible_truncation)]
const fn field(word: u32, mask: u32, pos: u32) -> u8 {
    ((word & mask) >> pos) as u8
}

/// Attribute sub-fields extracted from a raw `RASR` word.
///
/// Values are kept exactly as encoded so reports can print the raw bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct RegionAttributes {
    /// `XN`: instruction fetches fault when set.
    pub execute_never: u8,
    /// `AP`: 3-bit access-permission code.
    pub access_permission: u8,
    /// `TEX`: 3-bit type-extension field.
    pub type_extension: u8,
    /// `S`: shareable bit.
    pub shareable: u8,
    /// `C`: cacheable bit.
    pub cacheable: u8,
    /// `B`: bufferable bit.
    pub bufferable: u8,
    /// `SRD`: one disable bit per eighth of the region.
    pub subregion_disable: u8,
}

impl RegionAttributes {
    /// Extracts every attribute sub-field from a raw `RASR` word.
    ///
    /// The enable flag and `SIZE` field are not part of the bundle.
    #[must_use]
    pub const fn decode(rasr: u32) -> Self {
        Self {
            execute_never: field(rasr, RASR_XN_MSK, RASR_XN_POS),
            access_permission: field(rasr, RASR_AP_MSK, RASR_AP_POS),
            type_extension: field(rasr, RASR_TEX_MSK, RASR_TEX_POS),
            shareable: field(rasr, RASR_S_MSK, RASR_S_POS),
            cacheable: field(rasr, RASR_C_MSK, RASR_C_POS),
            bufferable: field(rasr, RASR_B_MSK, RASR_B_POS),
            subregion_disable: field(rasr, RASR_SRD_MSK, RASR_SRD_POS),
        }
    }

    /// Packs the bundle back into `RASR` attribute bits.
    ///
    /// Oversized field values are truncated to their field width.
    #[must_use]
    pub const fn to_rasr(self) -> u32 {
        ((self.execute_never as u32) << RASR_XN_POS) & RASR_XN_MSK
            | ((self.access_permission as u32) << RASR_AP_POS) & RASR_AP_MSK
            | ((self.type_extension as u32) << RASR_TEX_POS) & RASR_TEX_MSK
            | ((self.shareable as u32) << RASR_S_POS) & RASR_S_MSK
            | ((self.cacheable as u32) << RASR_C_POS) & RASR_C_MSK
            | ((self.bufferable as u32) << RASR_B_POS) & RASR_B_MSK
            | ((self.subregion_disable as u32) << RASR_SRD_POS) & RASR_SRD_MSK
    }

    /// Decodes the access permissions for both privilege levels.
    #[must_use]
    pub const fn access_policy(&self) -> AccessPolicy {
        AccessPolicy::decode(self.access_permission)
    }

    /// Classifies the memory type from `TEX`, `C` and `B`.
    #[must_use]
    pub fn memory_type(&self) -> Option<MemoryType> {
        classify(self.type_extension, self.cacheable, self.bufferable)
    }
}
