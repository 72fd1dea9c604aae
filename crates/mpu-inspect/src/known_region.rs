//! Board memory-map lookup for annotating region base addresses.

/// A named start address in a board's memory map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct KnownRegion<'a> {
    /// Start address of the named area.
    pub base: u32,
    /// Human-readable area name.
    pub name: &'a str,
}

impl<'a> KnownRegion<'a> {
    /// Creates a memory-map entry.
    #[must_use]
    pub const fn new(base: u32, name: &'a str) -> Self {
        Self { base, name }
    }
}

/// Memory map of the STM32H7R/S family.
pub const STM32H7RS_MEMORY_MAP: [KnownRegion<'static>; 12] = [
    KnownRegion::new(0x0000_0000, "ITCM/All"),
    KnownRegion::new(0x0800_0000, "Flash"),
    KnownRegion::new(0x08FF_F000, "OTP area"),
    KnownRegion::new(0x08FF_F800, "Flash Read Only (ID, Trim, Stack ID)"),
    KnownRegion::new(0x2000_0000, "DTCM"),
    KnownRegion::new(0x2400_0000, "AXI SRAM"),
    KnownRegion::new(0x3000_0000, "AHB SRAM1"),
    KnownRegion::new(0x3000_4000, "AHB SRAM2"),
    KnownRegion::new(0x3880_0000, "BB SRAM"),
    KnownRegion::new(0x4000_0000, "Peripherals"),
    KnownRegion::new(0x7000_0000, "XSPI2"),
    KnownRegion::new(0x9000_0000, "XSPI1"),
];

const _: () = assert_unique_bases(&STM32H7RS_MEMORY_MAP);

const fn assert_unique_bases(map: &[KnownRegion<'_>]) {
    let mut outer = 0;
    while outer < map.len() {
        let mut inner = outer + 1;
        while inner < map.len() {
            assert!(
                map[outer].base != map[inner].base,
                "memory map bases must be unique"
            );
            inner += 1;
        }
        outer += 1;
    }
}

/// Returns the name of the first entry whose base equals `base`.
#[must_use]
pub fn match_known_region<'a>(map: &[KnownRegion<'a>], base: u32) -> Option<&'a str> {
    map.iter()
        .find_map(|region| (region.base == base).then_some(region.name))
}

/// Borrowed memory-map table used to annotate report base addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryMap<'a> {
    regions: &'a [KnownRegion<'a>],
}

impl<'a> MemoryMap<'a> {
    /// Wraps a board-specific table.
    #[must_use]
    pub const fn new(regions: &'a [KnownRegion<'a>]) -> Self {
        Self { regions }
    }

    /// Map without any entries; no base address is annotated.
    #[must_use]
    pub const fn empty() -> Self {
        Self { regions: &[] }
    }

    /// Returns the underlying table in lookup order.
    #[must_use]
    pub const fn regions(&self) -> &'a [KnownRegion<'a>] {
        self.regions
    }

    /// Looks up the area starting exactly at `base`.
    #[must_use]
    pub fn match_base(&self, base: u32) -> Option<&'a str> {
        match_known_region(self.regions, base)
    }
}

impl Default for MemoryMap<'static> {
    fn default() -> Self {
        Self::new(&STM32H7RS_MEMORY_MAP)
    }
}
