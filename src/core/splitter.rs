/*!
 * Block splitter: a linear scan with a row counter and a file-rotation rule
 */

use std::io::BufRead;

use tracing::{debug, warn};

use super::sink::BlockSink;
use crate::config::{FirstBlockHeader, TrailingBlockPolicy};
use crate::error::{Result, SplitError};

/// What the splitter saw after the preamble
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SplitOutcome {
    /// Blocks written in full
    pub complete_blocks: usize,
    /// Data lines of a truncated final block kept under `TrailingBlockPolicy::Keep`
    pub kept_partial: Option<usize>,
    /// Lines consumed after the preamble, headers included
    pub lines: usize,
    /// Bytes handed to the sink
    pub bytes: u64,
}

impl SplitOutcome {
    /// Number of output files produced
    pub fn files(&self) -> usize {
        self.complete_blocks + usize::from(self.kept_partial.is_some())
    }
}

/// Partitions post-preamble lines into blocks of `rows` data lines.
///
/// A block's output is opened lazily on its first data line, so a block that
/// never receives data never touches the sink.
pub struct Splitter<S: BlockSink> {
    rows: usize,
    policy: TrailingBlockPolicy,
    sink: S,
    block_index: usize,
    block_lines: usize,
    block_open: bool,
    awaiting_header: bool,
    header_blank: bool,
    /// Whitespace-only lines seen after a blank header, held until data shows up
    pending_blank: Vec<Vec<u8>>,
    outcome: SplitOutcome,
}

impl<S: BlockSink> Splitter<S> {
    pub fn new(
        rows: usize,
        layout: FirstBlockHeader,
        policy: TrailingBlockPolicy,
        sink: S,
    ) -> Self {
        debug_assert!(rows > 0, "row count is validated by the header parser");
        Self {
            rows,
            policy,
            sink,
            block_index: 0,
            block_lines: 0,
            block_open: false,
            awaiting_header: layout == FirstBlockHeader::Separate,
            header_blank: false,
            pending_blank: Vec::new(),
            outcome: SplitOutcome::default(),
        }
    }

    /// Feed one input line, terminator included
    pub fn push_line(&mut self, line: &[u8]) -> Result<()> {
        self.outcome.lines += 1;
        self.route(line)
    }

    fn route(&mut self, line: &[u8]) -> Result<()> {
        if self.awaiting_header {
            self.awaiting_header = false;
            self.header_blank = is_blank(line);
            self.block_lines = 0;
            return Ok(());
        }

        // Blank lines after a blank header stay pending: trailing padding is
        // dropped at end of input, anything followed by data is data.
        if self.header_blank && self.block_lines == 0 {
            if is_blank(line) {
                self.pending_blank.push(line.to_vec());
                return Ok(());
            }
            self.header_blank = false;
            for pending in std::mem::take(&mut self.pending_blank) {
                self.route(&pending)?;
            }
            return self.route(line);
        }

        if !self.block_open {
            self.sink.begin_block(self.block_index)?;
            self.block_open = true;
        }

        self.sink.write_line(line)?;
        self.outcome.bytes += line.len() as u64;
        self.block_lines += 1;

        if self.block_lines == self.rows {
            self.sink.end_block()?;
            debug!(block = self.block_index, rows = self.rows, "Block complete");
            self.block_open = false;
            self.block_lines = 0;
            self.block_index += 1;
            self.outcome.complete_blocks += 1;
            self.awaiting_header = true;
        }

        Ok(())
    }

    /// Drain `reader` line by line into the splitter.
    ///
    /// On error the open block is abandoned before returning.
    pub fn consume<R: BufRead>(&mut self, reader: &mut R) -> Result<()> {
        let mut buf = Vec::new();
        loop {
            buf.clear();
            let read = match reader.read_until(b'\n', &mut buf) {
                Ok(n) => n,
                Err(e) => {
                    self.close_open_block();
                    return Err(e.into());
                }
            };
            if read == 0 {
                return Ok(());
            }
            if let Err(e) = self.push_line(&buf) {
                self.close_open_block();
                return Err(e);
            }
        }
    }

    /// Settle the final block according to the trailing-block policy
    pub fn finish(&mut self) -> Result<SplitOutcome> {
        if self.awaiting_header {
            return Ok(self.outcome.clone());
        }

        // Only blank lines followed the last complete block
        if self.block_lines == 0 && self.header_blank {
            debug!(
                "Ignoring {} trailing blank line(s) after block {}",
                self.pending_blank.len() + 1,
                self.block_index
            );
            return Ok(self.outcome.clone());
        }

        let found = self.block_lines;
        match self.policy {
            TrailingBlockPolicy::Error => {
                self.close_open_block();
                Err(SplitError::IncompleteBlock {
                    index: self.block_index,
                    expected: self.rows,
                    found,
                })
            }
            TrailingBlockPolicy::Keep => {
                if !self.block_open {
                    self.sink.begin_block(self.block_index)?;
                }
                self.block_open = false;
                self.sink.end_block()?;
                warn!(
                    "Kept truncated block {} ({} of {} lines)",
                    self.block_index, found, self.rows
                );
                self.outcome.kept_partial = Some(found);
                Ok(self.outcome.clone())
            }
            TrailingBlockPolicy::Discard => {
                self.close_open_block();
                warn!(
                    "Discarded truncated block {} ({} of {} lines)",
                    self.block_index, found, self.rows
                );
                Ok(self.outcome.clone())
            }
        }
    }

    fn close_open_block(&mut self) {
        if self.block_open {
            self.block_open = false;
            if let Err(e) = self.sink.abandon_block() {
                warn!("Failed to clean up block {}: {}", self.block_index, e);
            }
        }
    }

    pub fn into_sink(self) -> S {
        self.sink
    }
}

fn is_blank(line: &[u8]) -> bool {
    line.iter().all(u8::is_ascii_whitespace)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::sink::MemorySink;
    use std::io::Cursor;

    fn split(
        body: &str,
        rows: usize,
        layout: FirstBlockHeader,
        policy: TrailingBlockPolicy,
    ) -> (Result<SplitOutcome>, MemorySink) {
        let mut splitter = Splitter::new(rows, layout, policy, MemorySink::new());
        splitter.consume(&mut Cursor::new(body.as_bytes())).unwrap();
        let result = splitter.finish();
        (result, splitter.into_sink())
    }

    fn texts(sink: &MemorySink) -> Vec<(usize, String)> {
        sink.blocks
            .iter()
            .map(|(i, data)| (*i, String::from_utf8(data.clone()).unwrap()))
            .collect()
    }

    #[test]
    fn test_two_blocks_with_headers() {
        let (result, sink) = split(
            "h0\na\nb\nh1\nc\nd\n",
            2,
            FirstBlockHeader::Separate,
            TrailingBlockPolicy::Error,
        );
        let outcome = result.unwrap();
        assert_eq!(outcome.files(), 2);
        assert_eq!(outcome.lines, 6);
        assert_eq!(outcome.bytes, 8);
        assert_eq!(
            texts(&sink),
            vec![(0, "a\nb\n".to_string()), (1, "c\nd\n".to_string())]
        );
    }

    #[test]
    fn test_single_row_blocks() {
        let (result, sink) = split(
            "h0\na\nh1\nb\nh2\nc\n",
            1,
            FirstBlockHeader::Separate,
            TrailingBlockPolicy::Error,
        );
        assert_eq!(result.unwrap().files(), 3);
        assert_eq!(
            texts(&sink),
            vec![
                (0, "a\n".to_string()),
                (1, "b\n".to_string()),
                (2, "c\n".to_string())
            ]
        );
    }

    #[test]
    fn test_shared_layout_first_block_has_no_header() {
        let (result, sink) = split(
            "a\nb\nh1\nc\nd\n",
            2,
            FirstBlockHeader::Shared,
            TrailingBlockPolicy::Error,
        );
        assert_eq!(result.unwrap().files(), 2);
        assert_eq!(
            texts(&sink),
            vec![(0, "a\nb\n".to_string()), (1, "c\nd\n".to_string())]
        );
    }

    #[test]
    fn test_lines_are_copied_verbatim() {
        let (result, sink) = split(
            "h0\r\n  -5.000  0.1E-01\r\nno newline",
            2,
            FirstBlockHeader::Separate,
            TrailingBlockPolicy::Error,
        );
        result.unwrap();
        assert_eq!(sink.blocks[0].1, b"  -5.000  0.1E-01\r\nno newline");
    }

    #[test]
    fn test_no_blocks_after_header() {
        let (result, sink) = split("", 3, FirstBlockHeader::Separate, TrailingBlockPolicy::Error);
        assert_eq!(result.unwrap().files(), 0);
        assert!(sink.blocks.is_empty());
    }

    #[test]
    fn test_incomplete_block_is_an_error_by_default() {
        let (result, sink) = split(
            "h0\na\nb\nh1\nc\n",
            2,
            FirstBlockHeader::Separate,
            TrailingBlockPolicy::Error,
        );
        match result {
            Err(SplitError::IncompleteBlock {
                index,
                expected,
                found,
            }) => {
                assert_eq!((index, expected, found), (1, 2, 1));
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert_eq!(sink.blocks.len(), 1);
        assert_eq!(sink.abandoned, vec![1]);
        assert!(!sink.is_open());
    }

    #[test]
    fn test_incomplete_block_kept() {
        let (result, sink) = split(
            "h0\na\nb\nh1\nc\n",
            2,
            FirstBlockHeader::Separate,
            TrailingBlockPolicy::Keep,
        );
        let outcome = result.unwrap();
        assert_eq!(outcome.complete_blocks, 1);
        assert_eq!(outcome.kept_partial, Some(1));
        assert_eq!(outcome.files(), 2);
        assert_eq!(texts(&sink)[1], (1, "c\n".to_string()));
        assert!(!sink.is_open());
    }

    #[test]
    fn test_incomplete_block_discarded() {
        let (result, sink) = split(
            "h0\na\nb\nh1\nc\n",
            2,
            FirstBlockHeader::Separate,
            TrailingBlockPolicy::Discard,
        );
        assert_eq!(result.unwrap().files(), 1);
        assert_eq!(sink.abandoned, vec![1]);
    }

    #[test]
    fn test_header_without_data_is_incomplete() {
        let (result, sink) = split(
            "h0\na\nh1\n",
            1,
            FirstBlockHeader::Separate,
            TrailingBlockPolicy::Error,
        );
        assert!(matches!(
            result,
            Err(SplitError::IncompleteBlock { index: 1, found: 0, .. })
        ));
        // Nothing was opened for block 1, so nothing to abandon
        assert!(sink.abandoned.is_empty());
    }

    #[test]
    fn test_header_without_data_kept_as_empty_file() {
        let (result, sink) = split(
            "h0\na\nh1\n",
            1,
            FirstBlockHeader::Separate,
            TrailingBlockPolicy::Keep,
        );
        assert_eq!(result.unwrap().kept_partial, Some(0));
        assert_eq!(texts(&sink)[1], (1, String::new()));
    }

    #[test]
    fn test_trailing_blank_line_ignored() {
        let (result, sink) = split(
            "h0\na\nb\n\n",
            2,
            FirstBlockHeader::Separate,
            TrailingBlockPolicy::Error,
        );
        assert_eq!(result.unwrap().files(), 1);
        assert_eq!(sink.blocks.len(), 1);
    }

    #[test]
    fn test_several_trailing_blank_lines_ignored() {
        let (result, sink) = split(
            "h0\na\nb\n\n\r\n  \n\n",
            2,
            FirstBlockHeader::Separate,
            TrailingBlockPolicy::Error,
        );
        let outcome = result.unwrap();
        assert_eq!(outcome.files(), 1);
        assert_eq!(outcome.lines, 7);
        assert_eq!(sink.blocks.len(), 1);
        assert!(sink.abandoned.is_empty());
    }

    #[test]
    fn test_blank_lines_before_data_are_data() {
        let (result, sink) = split(
            "h0\na\nb\n\n\nc\n",
            2,
            FirstBlockHeader::Separate,
            TrailingBlockPolicy::Error,
        );
        assert_eq!(result.unwrap().files(), 2);
        assert_eq!(
            texts(&sink),
            vec![(0, "a\nb\n".to_string()), (1, "\nc\n".to_string())]
        );
    }

    #[test]
    fn test_round_trip_reconstructs_body() {
        let body = "h0\n1 2\n3 4\n5 6\nh1\n7 8\n9 0\n1 1\n";
        let headers = ["h0\n", "h1\n"];
        let (result, sink) = split(
            body,
            3,
            FirstBlockHeader::Separate,
            TrailingBlockPolicy::Error,
        );
        assert_eq!(result.unwrap().files(), 2);

        let rebuilt: String = texts(&sink)
            .into_iter()
            .zip(headers)
            .map(|((_, data), header)| format!("{header}{data}"))
            .collect();
        assert_eq!(rebuilt, body);
    }
}
