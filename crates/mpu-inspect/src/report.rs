//! Region report assembly and raw text emission.
//!
//! The report is written to a [`ReportSink`] line by line, without any log
//! decoration. A [`Pacer`] is invoked after every region so slow consoles
//! can drain between blocks.

use std::fmt;
use std::io::{self, Write};
use std::panic::Location;
use std::thread;
use std::time::Duration;

use crate::access::AccessPolicy;
use crate::attributes::RegionAttributes;
use crate::known_region::MemoryMap;
use crate::memory_type::MemoryType;
use crate::registers::MpuRegisters;
use crate::size::HumanSize;

/// Default pause after each region block.
pub const DEFAULT_PACING: Duration = Duration::from_millis(100);

/// Tunables for a report run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct ReportConfig {
    /// Pause inserted after every region block; zero disables pacing.
    pub pacing: Duration,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            pacing: DEFAULT_PACING,
        }
    }
}

impl ReportConfig {
    /// Configuration with the given inter-region pause.
    #[must_use]
    pub const fn with_pacing(pacing: Duration) -> Self {
        Self { pacing }
    }

    /// Configuration without any inter-region pause.
    #[must_use]
    pub const fn unpaced() -> Self {
        Self::with_pacing(Duration::ZERO)
    }
}

/// Raw text transport receiving the report.
pub trait ReportSink {
    /// Writes `text` verbatim. May block.
    fn write_str(&mut self, text: &str);

    /// Returns `true` once the sink drops everything written to it.
    fn is_closed(&self) -> bool {
        false
    }
}

impl ReportSink for String {
    fn write_str(&mut self, text: &str) {
        self.push_str(text);
    }
}

/// [`ReportSink`] over any [`io::Write`].
///
/// The first write error is latched and later writes are dropped, since the
/// dump itself has no error path.
#[derive(Debug)]
pub struct IoSink<W: Write> {
    writer: W,
    error: Option<io::Error>,
}

impl<W: Write> IoSink<W> {
    /// Wraps a writer.
    #[must_use]
    pub const fn new(writer: W) -> Self {
        Self {
            writer,
            error: None,
        }
    }

    /// Flushes and returns the writer, or the first error seen.
    ///
    /// # Errors
    ///
    /// Returns the latched write error, or the flush error.
    pub fn finish(mut self) -> io::Result<W> {
        if let Some(error) = self.error.take() {
            return Err(error);
        }
        self.writer.flush()?;
        Ok(self.writer)
    }
}

impl<W: Write> ReportSink for IoSink<W> {
    fn write_str(&mut self, text: &str) {
        if self.error.is_some() {
            return;
        }
        if let Err(error) = self.writer.write_all(text.as_bytes()) {
            log::debug!("report sink write failed: {error}");
            self.error = Some(error);
        }
    }

    fn is_closed(&self) -> bool {
        self.error.is_some()
    }
}

/// Cooperative delay between region blocks.
pub trait Pacer {
    /// Blocks for roughly `interval`.
    fn pause(&mut self, interval: Duration);
}

/// [`Pacer`] that sleeps the current thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleep;

impl Pacer for ThreadSleep {
    fn pause(&mut self, interval: Duration) {
        if !interval.is_zero() {
            thread::sleep(interval);
        }
    }
}

/// Decoded view of one enabled region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct EnabledRegion<'a> {
    /// Region number.
    pub index: u8,
    /// Region base address.
    pub base: u32,
    /// Memory-map area starting at `base`, if any.
    pub known_region: Option<&'a str>,
    /// Size in bytes; `0` means 4 GB.
    pub size: u32,
    /// Decoded access permissions.
    pub access: AccessPolicy,
    /// Raw attribute bits.
    pub attributes: RegionAttributes,
    /// Memory type classification, if the `TEX`/`C`/`B` key is known.
    pub memory_type: Option<MemoryType>,
}

/// Report entry for one region number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(tag = "state", rename_all = "snake_case"))]
pub enum RegionSummary<'a> {
    /// Region is not enabled; no other field is read.
    Disabled {
        /// Region number.
        index: u8,
    },
    /// Region is enabled and fully decoded.
    Enabled(EnabledRegion<'a>),
}

impl<'a> RegionSummary<'a> {
    /// Reads and decodes region `index`.
    ///
    /// Only the enable flag is read for disabled regions.
    #[must_use]
    pub fn read<R: MpuRegisters + ?Sized>(
        registers: &R,
        index: u8,
        memory_map: &MemoryMap<'a>,
    ) -> Self {
        if !registers.is_enabled(index) {
            return Self::Disabled { index };
        }

        let base = registers.base_address(index);
        let size = registers.encoded_size(index);
        let attributes = RegionAttributes::decode(registers.raw_attributes(index));
        let memory_type = attributes.memory_type();
        if memory_type.is_none() {
            log::debug!(
                "MPU region {index}: no memory type for TEX{} C{} B{}",
                attributes.type_extension,
                attributes.cacheable,
                attributes.bufferable
            );
        }

        Self::Enabled(EnabledRegion {
            index,
            base,
            known_region: memory_map.match_base(base),
            size,
            access: attributes.access_policy(),
            attributes,
            memory_type,
        })
    }

    /// Region number of this entry.
    #[must_use]
    pub const fn index(&self) -> u8 {
        match self {
            Self::Disabled { index } => *index,
            Self::Enabled(region) => region.index,
        }
    }
}

impl fmt::Display for RegionSummary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let region = match self {
            Self::Disabled { index } => return writeln!(f, "MPU Region {index}: Disabled"),
            Self::Enabled(region) => region,
        };

        writeln!(f, "MPU Region {}:", region.index)?;

        write!(f, "   Base = {:#x}", region.base)?;
        if let Some(name) = region.known_region {
            write!(f, " - Start of {name}")?;
        }
        writeln!(f)?;

        writeln!(f, "   Size = {}", HumanSize(region.size))?;
        writeln!(f, "   AP: {}", region.access)?;

        let bits = &region.attributes;
        write!(
            f,
            "   Attributes: XN{} TEX{} S{} C{} B{} SRD{:x}",
            bits.execute_never,
            bits.type_extension,
            bits.shareable,
            bits.cacheable,
            bits.bufferable,
            bits.subregion_disable
        )?;
        if let Some(memory_type) = region.memory_type {
            write!(f, " - Memory Type: {memory_type}")?;
        }
        writeln!(f)
    }
}

/// Report over every region of an MPU.
#[derive(Debug)]
pub struct MpuReport<'a, R: ?Sized> {
    registers: &'a R,
    memory_map: MemoryMap<'a>,
    config: ReportConfig,
}

impl<'a, R: MpuRegisters + ?Sized> MpuReport<'a, R> {
    /// Report with the default memory map and pacing.
    #[must_use]
    pub fn new(registers: &'a R) -> Self {
        Self {
            registers,
            memory_map: MemoryMap::default(),
            config: ReportConfig::default(),
        }
    }

    /// Replaces the memory map used to annotate base addresses.
    #[must_use]
    pub const fn with_memory_map(mut self, memory_map: MemoryMap<'a>) -> Self {
        self.memory_map = memory_map;
        self
    }

    /// Replaces the report configuration.
    #[must_use]
    pub const fn with_config(mut self, config: ReportConfig) -> Self {
        self.config = config;
        self
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> ReportConfig {
        self.config
    }

    /// Decodes every region without emitting or pacing.
    #[must_use]
    pub fn summaries(&self) -> Vec<RegionSummary<'a>> {
        (0..self.registers.region_count())
            .map(|index| RegionSummary::read(self.registers, index, &self.memory_map))
            .collect()
    }

    /// Writes the full report to `sink`, pausing after every region.
    ///
    /// The header names the source location that requested the dump.
    #[track_caller]
    pub fn print_all_regions<S, P>(&self, sink: &mut S, pacer: &mut P)
    where
        S: ReportSink + ?Sized,
        P: Pacer + ?Sized,
    {
        let caller = Location::caller();
        sink.write_str(&format!(
            "Printing MPU Regions Configuration (called from {caller}):\n"
        ));

        let count = self.registers.region_count();
        log::debug!("dumping {count} MPU regions for {caller}");

        for index in 0..count {
            let summary = RegionSummary::read(self.registers, index, &self.memory_map);
            sink.write_str(&summary.to_string());
            if sink.is_closed() {
                log::debug!("report sink closed at MPU region {index}, stopping dump");
                break;
            }

            log::trace!("pausing {:?} after MPU region {index}", self.config.pacing);
            pacer.pause(self.config.pacing);
        }
    }

    /// Writes the full report to stdout.
    ///
    /// Stdout is locked per block, never across a pause.
    ///
    /// # Errors
    ///
    /// Returns the first error raised while writing or flushing stdout.
    #[track_caller]
    pub fn print_to_stdout<P: Pacer + ?Sized>(&self, pacer: &mut P) -> io::Result<()> {
        let mut sink = IoSink::new(io::stdout());
        self.print_all_regions(&mut sink, pacer);
        sink.finish().map(drop)
    }
}

/// Dumps every region to stdout with the default map and pacing.
#[track_caller]
pub fn print_all_regions<R: MpuRegisters + ?Sized>(registers: &R) {
    if let Err(error) = MpuReport::new(registers).print_to_stdout(&mut ThreadSleep) {
        log::warn!("MPU report output incomplete: {error}");
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;

    use proptest::prelude::*;

    use super::{
        IoSink, MpuReport, Pacer, RegionSummary, ReportConfig, ReportSink, ThreadSleep,
        DEFAULT_PACING,
    };
    use crate::attributes::RegionAttributes;
    use crate::known_region::{KnownRegion, MemoryMap};
    use crate::registers::{RegionRegisters, StaticMpu};

    #[derive(Default)]
    struct RecordingPacer {
        pauses: Vec<Duration>,
    }

    impl Pacer for RecordingPacer {
        fn pause(&mut self, interval: Duration) {
            self.pauses.push(interval);
        }
    }

    /// Tries to take stdout from another thread during every pause.
    #[derive(Default)]
    struct StdoutContender {
        acquired: Vec<bool>,
    }

    impl Pacer for StdoutContender {
        fn pause(&mut self, _interval: Duration) {
            let (sender, receiver) = mpsc::channel();
            thread::spawn(move || {
                let _stdout = io::stdout().lock();
                let _ = sender.send(());
            });
            self.acquired
                .push(receiver.recv_timeout(Duration::from_secs(2)).is_ok());
        }
    }

    #[derive(Debug)]
    struct FailingWriter;

    impl io::Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "console gone"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn sram_region() -> RegionRegisters {
        let attributes = RegionAttributes {
            execute_never: 1,
            access_permission: 3,
            type_extension: 1,
            shareable: 0,
            cacheable: 1,
            bufferable: 1,
            subregion_disable: 0xC0,
        };
        RegionRegisters {
            rbar: 0x2400_0000,
            // SIZE=18 (512 KB), enabled.
            rasr: attributes.to_rasr() | (18 << 1) | 1,
        }
    }

    fn mpu(regions: Vec<RegionRegisters>) -> StaticMpu {
        StaticMpu::from_regions(regions).expect("region count fits")
    }

    #[test]
    fn enabled_region_block_matches_format() {
        let mpu = mpu(vec![sram_region()]);
        let summary = RegionSummary::read(&mpu, 0, &MemoryMap::default());
        assert_eq!(
            summary.to_string(),
            "MPU Region 0:\n\
             \x20  Base = 0x24000000 - Start of AXI SRAM\n\
             \x20  Size = 512 KB\n\
             \x20  AP: Priv=RW, Unpriv=RW\n\
             \x20  Attributes: XN1 TEX1 S0 C1 B1 SRDc0 - Memory Type: Normal (Write-Back, Write and Read Allocate)\n"
        );
    }

    #[test]
    fn disabled_region_is_a_single_line() {
        let mpu = mpu(vec![RegionRegisters::default(); 4]);
        let summary = RegionSummary::read(&mpu, 3, &MemoryMap::default());
        assert_eq!(summary, RegionSummary::Disabled { index: 3 });
        assert_eq!(summary.to_string(), "MPU Region 3: Disabled\n");
    }

    #[test]
    fn unknown_base_and_memory_type_omit_annotations() {
        let region = RegionRegisters {
            rbar: 0x1234_5660,
            // TEX=4, C=0, B=1 has no classification; SIZE=31 (4 GB).
            rasr: RegionAttributes {
                type_extension: 4,
                bufferable: 1,
                ..RegionAttributes::default()
            }
            .to_rasr()
                | (31 << 1)
                | 1,
        };
        let mpu = mpu(vec![region]);
        let text = RegionSummary::read(&mpu, 0, &MemoryMap::empty()).to_string();
        assert_eq!(
            text,
            "MPU Region 0:\n\
             \x20  Base = 0x12345660\n\
             \x20  Size = 4 GB\n\
             \x20  AP: Priv=NA, Unpriv=NA\n\
             \x20  Attributes: XN0 TEX4 S0 C0 B1 SRD0\n"
        );
    }

    #[test]
    fn custom_memory_map_annotates_base() {
        let map = [KnownRegion::new(0x2400_0000, "frame buffer")];
        let mpu = mpu(vec![sram_region()]);
        let report = MpuReport::new(&mpu).with_memory_map(MemoryMap::new(&map));
        let RegionSummary::Enabled(region) = report.summaries()[0] else {
            panic!("region 0 is enabled");
        };
        assert_eq!(region.known_region, Some("frame buffer"));
    }

    #[test]
    fn report_has_header_and_one_block_per_region() {
        let mpu = mpu(vec![
            sram_region(),
            RegionRegisters::default(),
            sram_region(),
        ]);
        let mut text = String::new();
        let mut pacer = RecordingPacer::default();
        MpuReport::new(&mpu).print_all_regions(&mut text, &mut pacer);

        let mut lines = text.lines();
        let header = lines.next().expect("header line");
        assert!(header.starts_with("Printing MPU Regions Configuration (called from "));
        assert!(header.contains(file!()));
        assert!(header.ends_with("):"));

        let blocks: Vec<_> = text
            .lines()
            .filter(|line| line.starts_with("MPU Region "))
            .collect();
        assert_eq!(
            blocks,
            ["MPU Region 0:", "MPU Region 1: Disabled", "MPU Region 2:"]
        );
        assert_eq!(pacer.pauses, vec![DEFAULT_PACING; 3]);
    }

    #[test]
    fn pacing_interval_is_configurable() {
        let mpu = mpu(vec![RegionRegisters::default(); 2]);
        let mut pacer = RecordingPacer::default();
        let config = ReportConfig::with_pacing(Duration::from_millis(5));
        MpuReport::new(&mpu)
            .with_config(config)
            .print_all_regions(&mut String::new(), &mut pacer);
        assert_eq!(pacer.pauses, vec![Duration::from_millis(5); 2]);
    }

    #[test]
    fn empty_mpu_emits_only_the_header() {
        let mpu = StaticMpu::default();
        let mut text = String::new();
        let mut pacer = RecordingPacer::default();
        MpuReport::new(&mpu).print_all_regions(&mut text, &mut pacer);
        assert_eq!(text.lines().count(), 1);
        assert!(pacer.pauses.is_empty());
    }

    #[test]
    fn unpaced_thread_sleep_returns_immediately() {
        let mpu = mpu(vec![RegionRegisters::default(); 8]);
        let report = MpuReport::new(&mpu).with_config(ReportConfig::unpaced());
        assert_eq!(report.config().pacing, Duration::ZERO);
        report.print_all_regions(&mut String::new(), &mut ThreadSleep);
    }

    #[test]
    fn io_sink_collects_bytes() {
        let mut sink = IoSink::new(Vec::new());
        sink.write_str("MPU Region 0: Disabled\n");
        let bytes = sink.finish().expect("vec writes succeed");
        assert_eq!(bytes, b"MPU Region 0: Disabled\n");
    }

    #[test]
    fn io_sink_latches_first_error() {
        let mut sink = IoSink::new(FailingWriter);
        sink.write_str("a");
        sink.write_str("b");
        let error = sink.finish().expect_err("writer always fails");
        assert_eq!(error.kind(), io::ErrorKind::BrokenPipe);
    }

    #[test]
    fn stdout_is_free_while_pausing() {
        let mpu = mpu(vec![RegionRegisters::default(); 3]);
        let mut pacer = StdoutContender::default();
        MpuReport::new(&mpu)
            .print_to_stdout(&mut pacer)
            .expect("stdout accepts the report");
        assert_eq!(pacer.acquired, vec![true; 3]);
    }

    #[test]
    fn closed_sink_stops_pacing() {
        let mpu = mpu(vec![sram_region(), RegionRegisters::default(), sram_region()]);
        let mut sink = IoSink::new(FailingWriter);
        let mut pacer = RecordingPacer::default();
        MpuReport::new(&mpu).print_all_regions(&mut sink, &mut pacer);
        assert!(sink.is_closed());
        assert!(pacer.pauses.is_empty());
    }

    #[test]
    fn healthy_sinks_stay_open() {
        let mut sink = IoSink::new(Vec::new());
        sink.write_str("MPU Region 0: Disabled\n");
        assert!(!sink.is_closed());
        assert!(!String::new().is_closed());
    }

    proptest! {
        #[test]
        fn one_block_per_region_for_arbitrary_registers(
            words in prop::collection::vec((any::<u32>(), any::<u32>()), 0..=16)
        ) {
            let regions: Vec<_> = words
                .iter()
                .map(|&(rbar, rasr)| RegionRegisters { rbar, rasr })
                .collect();
            let mpu = mpu(regions);
            let mut text = String::new();
            let mut pacer = RecordingPacer::default();
            MpuReport::new(&mpu).print_all_regions(&mut text, &mut pacer);

            let blocks = text.lines().filter(|line| line.starts_with("MPU Region ")).count();
            prop_assert_eq!(blocks, words.len());
            prop_assert_eq!(pacer.pauses.len(), words.len());

            for (index, &(_, rasr)) in words.iter().enumerate() {
                let expected = if rasr & 1 == 0 {
                    format!("MPU Region {index}: Disabled")
                } else {
                    format!("MPU Region {index}:")
                };
                prop_assert!(text.lines().any(|line| line == expected));
            }
        }
    }
}
