/*!
 * dossplit - split a VASP DOSCAR into per-block DOS files
 *
 * - Parses the fixed six-line preamble (ion count, NEDOS, Fermi energy)
 * - Writes each block of NEDOS lines verbatim to `DOS0`, `DOS1`, ...
 * - Explicit policy for a truncated final block
 * - Dry-run and JSON summary modes
 */

pub mod config;
pub mod core;
pub mod error;
pub mod logging;
pub mod output;

// Re-export commonly used types
pub use config::{FirstBlockHeader, LogLevel, SplitConfig, TrailingBlockPolicy};
pub use self::core::{split_doscar, split_reader, SplitStats};
pub use error::{Result, SplitError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
