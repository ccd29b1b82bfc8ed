/*!
 * DOSCAR preamble parsing
 *
 * The first six lines of a DOSCAR are a fixed header. Line 0 starts with the
 * ion count; line 5 reads `EMAX EMIN NEDOS EFERMI weight`, where NEDOS is the
 * number of data lines in every block that follows.
 */

use std::io::BufRead;

use tracing::debug;

use crate::error::{Result, SplitError};

/// Zero-based index of the line carrying the row count
pub const HEADER_LINE: usize = 5;

/// Whitespace-separated field of the header line holding the row count
pub const ROWS_FIELD: usize = 2;

/// Values read from the DOSCAR preamble
#[derive(Debug, Clone, PartialEq)]
pub struct DosHeader {
    /// Number of ions, when line 0 starts with an integer
    pub ions: Option<usize>,
    pub emax: Option<f64>,
    pub emin: Option<f64>,
    /// Data lines per block (NEDOS)
    pub rows: usize,
    /// Fermi energy
    pub efermi: Option<f64>,
}

impl DosHeader {
    /// Parse the energy/row-count line (line 5)
    pub fn parse_energy_line(line: &str) -> Result<Self> {
        let fields: Vec<&str> = line.split_whitespace().collect();

        let token = fields
            .get(ROWS_FIELD)
            .ok_or_else(|| SplitError::MalformedHeader {
                line: HEADER_LINE + 1,
                reason: format!(
                    "expected at least {} fields, found {}",
                    ROWS_FIELD + 1,
                    fields.len()
                ),
            })?;

        let rows = parse_rows(token)?;
        let float_at = |i: usize| fields.get(i).and_then(|f| f.parse::<f64>().ok());

        Ok(Self {
            ions: None,
            emax: float_at(0),
            emin: float_at(1),
            rows,
            efermi: float_at(3),
        })
    }

    /// Number of blocks a projected DOSCAR should hold: total DOS plus one per ion
    pub fn expected_blocks(&self) -> Option<usize> {
        self.ions.and_then(|n| n.checked_add(1))
    }
}

fn parse_rows(token: &str) -> Result<usize> {
    match token.parse::<usize>() {
        Ok(0) | Err(_) => Err(SplitError::InvalidRowCount {
            token: token.to_string(),
        }),
        Ok(rows) => Ok(rows),
    }
}

/// Header plus how many input lines it consumed
#[derive(Debug, Clone)]
pub struct Preamble {
    pub header: DosHeader,
    pub lines_read: usize,
}

/// Consume lines 0..=5 from `reader` and parse the header.
///
/// Nothing past line 5 is read, so the caller continues from the first
/// line after the header.
pub fn read_preamble<R: BufRead>(reader: &mut R) -> Result<Preamble> {
    let mut buf = Vec::new();
    let mut ions = None;

    for index in 0..=HEADER_LINE {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            return Err(SplitError::MalformedHeader {
                line: HEADER_LINE + 1,
                reason: format!("input has only {} lines", index),
            });
        }

        if index == 0 {
            ions = String::from_utf8_lossy(&buf)
                .split_whitespace()
                .next()
                .and_then(|t| t.parse::<usize>().ok());
        }
    }

    let line = String::from_utf8_lossy(&buf);
    let mut header = DosHeader::parse_energy_line(&line)?;
    header.ions = ions;

    debug!(
        rows = header.rows,
        ions = ?header.ions,
        efermi = ?header.efermi,
        "Parsed DOSCAR header"
    );

    Ok(Preamble {
        header,
        lines_read: HEADER_LINE + 1,
    })
}
