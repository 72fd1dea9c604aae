#![no_main]

use std::time::Duration;

use libfuzzer_sys::fuzz_target;
use mpu_inspect::{
    decode_privileged, decode_unprivileged, format_size, MpuReport, Pacer, RegionRegisters,
    StaticMpu,
};

struct NoPause;

impl Pacer for NoPause {
    fn pause(&mut self, _interval: Duration) {}
}

fuzz_target!(|data: &[u8]| {
    let regions: Vec<_> = data
        .chunks_exact(8)
        .take(usize::from(u8::MAX))
        .map(|chunk| RegionRegisters {
            rbar: u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]),
            rasr: u32::from_le_bytes([chunk[4], chunk[5], chunk[6], chunk[7]]),
        })
        .collect();
    let expected_blocks = regions.len();

    for region in &regions {
        let _ = format_size(region.rbar);
        let _ = decode_privileged(region.rasr.to_le_bytes()[3]);
        let _ = decode_unprivileged(region.rasr.to_le_bytes()[3]);
    }

    let Ok(mpu) = StaticMpu::from_regions(regions) else {
        return;
    };
    let mut text = String::new();
    MpuReport::new(&mpu).print_all_regions(&mut text, &mut NoPause);

    let blocks = text
        .lines()
        .filter(|line| line.starts_with("MPU Region "))
        .count();
    assert_eq!(blocks, expected_blocks);
});
