//! Parsing of the Linux `/proc/diskstats` table.

use crate::pal::DiskIoCounters;

/// The kernel reports transfer sizes in 512-byte units regardless of the device's sector size.
const SECTOR_SIZE: u64 = 512;

/// Sums the counters of every device line for which `is_whole_disk` holds.
///
/// Partitions are excluded by the caller's predicate so that I/O on `sda1` is not counted a
/// second time under `sda`. Lines that are too short or carry non-numeric counters are skipped.
pub(crate) fn sum_whole_disks(
    contents: &str,
    is_whole_disk: impl Fn(&str) -> bool,
) -> DiskIoCounters {
    let mut totals = DiskIoCounters::default();

    for line in contents.lines() {
        let Some(device) = parse_line(line) else {
            continue;
        };

        if !is_whole_disk(device.name) {
            continue;
        }

        totals.read_count = totals.read_count.saturating_add(device.reads);
        totals.write_count = totals.write_count.saturating_add(device.writes);
        totals.read_bytes = totals
            .read_bytes
            .saturating_add(device.read_sectors.saturating_mul(SECTOR_SIZE));
        totals.write_bytes = totals
            .write_bytes
            .saturating_add(device.write_sectors.saturating_mul(SECTOR_SIZE));
    }

    totals
}

#[derive(Debug)]
struct DeviceLine<'a> {
    name: &'a str,
    reads: u64,
    read_sectors: u64,
    writes: u64,
    write_sectors: u64,
}

// Columns: major minor name reads reads_merged sectors_read ms_reading writes writes_merged
// sectors_written ...
fn parse_line(line: &str) -> Option<DeviceLine<'_>> {
    let mut fields = line.split_whitespace();

    let _major = fields.next()?;
    let _minor = fields.next()?;
    let name = fields.next()?;

    let mut counters = fields.take(7).map(str::parse::<u64>);
    let reads = counters.next()?.ok()?;
    let _reads_merged = counters.next()?.ok()?;
    let read_sectors = counters.next()?.ok()?;
    let _read_ms = counters.next()?.ok()?;
    let writes = counters.next()?.ok()?;
    let _writes_merged = counters.next()?.ok()?;
    let write_sectors = counters.next()?.ok()?;

    Some(DeviceLine {
        name,
        reads,
        read_sectors,
        writes,
        write_sectors,
    })
}
