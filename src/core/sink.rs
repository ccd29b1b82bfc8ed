//! Block sinks: where split blocks end up
//!
//! - `FileSink`: one file per block on disk
//! - `DryRunSink`: logs the blocks it would create, writes nothing
//! - `MemorySink`: keeps blocks in memory (tests only)

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::Result;

/// Destination for the blocks produced by the splitter.
///
/// The splitter drives a sink strictly in order: `begin_block`, any number
/// of `write_line`, then exactly one of `end_block` or `abandon_block`.
/// At most one block is open at a time.
pub trait BlockSink {
    /// Open the output for block `index`
    fn begin_block(&mut self, index: usize) -> Result<()>;

    /// Append one line, terminator included, to the open block
    fn write_line(&mut self, line: &[u8]) -> Result<()>;

    /// Flush and close the open block
    fn end_block(&mut self) -> Result<()>;

    /// Close the open block and remove whatever it wrote
    fn abandon_block(&mut self) -> Result<()>;
}

/// Writes block `i` to `{dir}/{prefix}{i}`, overwriting existing files
pub struct FileSink {
    dir: PathBuf,
    prefix: String,
    dir_ready: bool,
    current: Option<(PathBuf, BufWriter<File>)>,
}

impl FileSink {
    pub fn new(dir: &Path, prefix: &str) -> Self {
        Self {
            dir: dir.to_path_buf(),
            prefix: prefix.to_string(),
            dir_ready: false,
            current: None,
        }
    }

    fn path_for(&self, index: usize) -> PathBuf {
        self.dir.join(format!("{}{}", self.prefix, index))
    }
}

impl BlockSink for FileSink {
    fn begin_block(&mut self, index: usize) -> Result<()> {
        // Output directory is created on first use so header errors leave no trace
        if !self.dir_ready {
            fs::create_dir_all(&self.dir)?;
            self.dir_ready = true;
        }

        let path = self.path_for(index);
        debug!("Creating {}", path.display());
        let writer = BufWriter::new(File::create(&path)?);
        self.current = Some((path, writer));
        Ok(())
    }

    fn write_line(&mut self, line: &[u8]) -> Result<()> {
        if let Some((_, writer)) = self.current.as_mut() {
            writer.write_all(line)?;
        }
        Ok(())
    }

    fn end_block(&mut self) -> Result<()> {
        if let Some((path, mut writer)) = self.current.take() {
            writer.flush()?;
            writer.into_inner().map_err(|e| e.into_error())?.sync_all()?;
            debug!("Closed {}", path.display());
        }
        Ok(())
    }

    fn abandon_block(&mut self) -> Result<()> {
        if let Some((path, writer)) = self.current.take() {
            drop(writer);
            match fs::remove_file(&path) {
                Ok(()) => debug!("Removed partial {}", path.display()),
                Err(e) => warn!("Could not remove partial {}: {}", path.display(), e),
            }
        }
        Ok(())
    }
}

/// Logs what would be written without touching the filesystem
#[derive(Debug, Default)]
pub struct DryRunSink {
    open: Option<usize>,
}

impl DryRunSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BlockSink for DryRunSink {
    fn begin_block(&mut self, index: usize) -> Result<()> {
        info!(target: "dry_run", "[DRY-RUN] Would create block {}", index);
        self.open = Some(index);
        Ok(())
    }

    fn write_line(&mut self, _line: &[u8]) -> Result<()> {
        Ok(())
    }

    fn end_block(&mut self) -> Result<()> {
        if let Some(index) = self.open.take() {
            debug!(target: "dry_run", "[DRY-RUN] Block {} complete", index);
        }
        Ok(())
    }

    fn abandon_block(&mut self) -> Result<()> {
        if let Some(index) = self.open.take() {
            debug!(target: "dry_run", "[DRY-RUN] Would discard block {}", index);
        }
        Ok(())
    }
}

/// In-memory sink recording finished blocks in order
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemorySink {
    pub blocks: Vec<(usize, Vec<u8>)>,
    pub abandoned: Vec<usize>,
    open: Option<(usize, Vec<u8>)>,
}

#[cfg(test)]
impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }
}

#[cfg(test)]
impl BlockSink for MemorySink {
    fn begin_block(&mut self, index: usize) -> Result<()> {
        assert!(self.open.is_none(), "block {index} opened while another is open");
        self.open = Some((index, Vec::new()));
        Ok(())
    }

    fn write_line(&mut self, line: &[u8]) -> Result<()> {
        let (_, data) = self.open.as_mut().expect("write without open block");
        data.extend_from_slice(line);
        Ok(())
    }

    fn end_block(&mut self) -> Result<()> {
        if let Some(block) = self.open.take() {
            self.blocks.push(block);
        }
        Ok(())
    }

    fn abandon_block(&mut self) -> Result<()> {
        if let Some((index, _)) = self.open.take() {
            self.abandoned.push(index);
        }
        Ok(())
    }
}
