/*!
 * Core DOSCAR split operation
 */

pub mod header;
pub mod sink;
pub mod splitter;

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::config::SplitConfig;
use crate::error::{Result, SplitError};

use header::{read_preamble, DosHeader};
use sink::{BlockSink, DryRunSink, FileSink};
use splitter::Splitter;

/// Statistics about a split run
#[derive(Debug, Clone)]
pub struct SplitStats {
    /// Output files produced (or that would be, in dry-run mode)
    pub files: usize,
    /// Data lines of a kept truncated final block
    pub partial_lines: Option<usize>,
    /// Input lines read, preamble included
    pub lines_read: usize,
    pub bytes_written: u64,
    pub header: DosHeader,
    pub dry_run: bool,
    pub duration: Duration,
}

/// Split the configured DOSCAR into per-block files
pub fn split_doscar(config: &SplitConfig) -> Result<SplitStats> {
    let file = File::open(&config.input).map_err(|e| {
        debug!("Cannot open {}: {}", config.input.display(), e);
        SplitError::MissingInputFile(config.input.clone())
    })?;

    info!(
        "Splitting {} into {}",
        config.input.display(),
        config.block_path(0).display()
    );

    let mut reader = BufReader::new(file);
    if config.dry_run {
        split_reader(&mut reader, config, DryRunSink::new())
    } else {
        split_reader(
            &mut reader,
            config,
            FileSink::new(&config.output_dir, &config.prefix),
        )
    }
}

/// Split an already-open DOSCAR stream into `sink`
pub fn split_reader<R: BufRead, S: BlockSink>(
    reader: &mut R,
    config: &SplitConfig,
    sink: S,
) -> Result<SplitStats> {
    let start_time = Instant::now();

    let preamble = read_preamble(reader)?;
    let header = preamble.header;

    let mut splitter = Splitter::new(
        header.rows,
        config.first_block_header,
        config.trailing_block,
        sink,
    );
    splitter.consume(reader)?;
    let outcome = splitter.finish()?;

    let files = outcome.files();
    if let Some(expected) = header.expected_blocks() {
        // Files without projections carry the total DOS only
        if files != expected && files != 1 {
            warn!(
                "Header lists {} ions ({} blocks expected) but {} blocks were found",
                expected - 1,
                expected,
                files
            );
        }
    }

    let stats = SplitStats {
        files,
        partial_lines: outcome.kept_partial,
        lines_read: preamble.lines_read + outcome.lines,
        bytes_written: if config.dry_run { 0 } else { outcome.bytes },
        header,
        dry_run: config.dry_run,
        duration: start_time.elapsed(),
    };

    info!(
        files = stats.files,
        rows = stats.header.rows,
        lines = stats.lines_read,
        bytes = stats.bytes_written,
        "Split complete"
    );

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FirstBlockHeader, TrailingBlockPolicy};
    use crate::core::sink::MemorySink;
    use crate::logging::init_test_logging;
    use std::io::Cursor;

    const PREAMBLE: &str = "p0\np1\np2\np3\np4\n";

    #[test]
    fn test_split_reader_counts_all_lines() {
        init_test_logging();
        let input = format!("{PREAMBLE}x x 2\nh0\na\nb\nh1\nc\nd\n");
        let config = SplitConfig::default();

        let stats = split_reader(&mut Cursor::new(input.as_bytes()), &config, MemorySink::new())
            .unwrap();

        assert_eq!(stats.files, 2);
        assert_eq!(stats.lines_read, 12);
        assert_eq!(stats.bytes_written, 8);
        assert_eq!(stats.header.rows, 2);
        assert!(!stats.dry_run);
    }

    #[test]
    fn test_split_reader_header_error_touches_no_sink() {
        let config = SplitConfig::default();
        let err = split_reader(
            &mut Cursor::new(PREAMBLE.as_bytes()),
            &config,
            MemorySink::new(),
        )
        .unwrap_err();
        assert!(err.is_header_error());
    }

    #[test]
    fn test_split_reader_shared_layout() {
        init_test_logging();
        let input = "   1   1   1   0\np1\np2\np3\np4\n 10.0 -5.0 2 4.5 1.0\nt1\nt2\n 10.0 -5.0 2 4.5 1.0\ns1\ns2\n";
        let config = SplitConfig {
            first_block_header: FirstBlockHeader::Shared,
            trailing_block: TrailingBlockPolicy::Error,
            ..Default::default()
        };

        let stats = split_reader(&mut Cursor::new(input.as_bytes()), &config, MemorySink::new())
            .unwrap();
        assert_eq!(stats.files, 2);
        assert_eq!(stats.header.expected_blocks(), Some(2));
        assert_eq!(stats.header.efermi, Some(4.5));
    }

    #[test]
    fn test_huge_ion_count_does_not_abort() {
        let input = format!("{}\np1\np2\np3\np4\nx x 1\nh0\na\nh1\nb\n", usize::MAX);
        let config = SplitConfig::default();

        let stats = split_reader(&mut Cursor::new(input.as_bytes()), &config, MemorySink::new())
            .unwrap();
        assert_eq!(stats.files, 2);
        assert_eq!(stats.header.expected_blocks(), None);
    }

    #[test]
    fn test_dry_run_reports_no_bytes_written() {
        let input = format!("{PREAMBLE}x x 2\nh0\na\nb\n");
        let config = SplitConfig {
            dry_run: true,
            ..Default::default()
        };

        let stats = split_reader(&mut Cursor::new(input.as_bytes()), &config, DryRunSink::new())
            .unwrap();
        assert_eq!(stats.files, 1);
        assert_eq!(stats.bytes_written, 0);
    }

    #[test]
    fn test_split_doscar_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let config = SplitConfig {
            input: dir.path().join("DOSCAR"),
            output_dir: dir.path().to_path_buf(),
            ..Default::default()
        };
        let err = split_doscar(&config).unwrap_err();
        assert!(matches!(err, SplitError::MissingInputFile(_)));
    }
}
