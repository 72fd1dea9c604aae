//! Dumps a representative STM32H7R/S MPU layout to stdout.
//!
//! Run with `cargo run -p mpu-inspect --example stm32h7rs_dump`.

use std::io;

use log as _;
use mpu_inspect::{
    MpuReport, RegionAttributes, RegionRegisters, ReportConfig, StaticMpu, ThreadSleep,
};
use proptest as _;
use rstest as _;
#[cfg(feature = "serde")]
use serde as _;
use thiserror as _;

fn region(rbar: u32, size_field: u32, attributes: RegionAttributes) -> RegionRegisters {
    RegionRegisters {
        rbar,
        rasr: attributes.to_rasr() | (size_field << 1) | 1,
    }
}

fn main() -> io::Result<()> {
    let normal_rw = RegionAttributes {
        execute_never: 1,
        access_permission: 3,
        type_extension: 1,
        cacheable: 1,
        bufferable: 1,
        ..RegionAttributes::default()
    };
    let flash_ro = RegionAttributes {
        access_permission: 6,
        cacheable: 1,
        ..RegionAttributes::default()
    };
    let device = RegionAttributes {
        execute_never: 1,
        access_permission: 3,
        type_extension: 2,
        ..RegionAttributes::default()
    };

    let mpu = StaticMpu::from_regions(vec![
        region(0x0800_0000, 15, flash_ro),
        region(0x2000_0000, 16, normal_rw),
        region(0x2400_0000, 17, normal_rw),
        region(0x3000_0000, 13, RegionAttributes {
            subregion_disable: 0xF0,
            ..normal_rw
        }),
        region(0x4000_0000, 28, device),
        RegionRegisters::default(),
        RegionRegisters::default(),
        RegionRegisters::default(),
    ])
    .map_err(|error| io::Error::new(io::ErrorKind::InvalidInput, error))?;

    MpuReport::new(&mpu)
        .with_config(ReportConfig::unpaced())
        .print_to_stdout(&mut ThreadSleep)
}
