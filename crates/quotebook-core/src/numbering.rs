//! # Document Numbering
//!
//! Pure half of the number allocator: formatting, parsing and picking the
//! next number from the ones already used. The database layer supplies the
//! existing numbers from inside its transaction.
//!
//! ## Format
//! ```text
//!   DEV 2025 0042
//!   ─┬─ ──┬─ ──┬─
//!    │    │    └── sequence, zero-padded to 4 digits, restarts every year
//!    │    └─────── calendar year of creation
//!    └──────────── prefix of the document kind
//! ```

use crate::error::{CoreError, CoreResult};
use crate::{MAX_SEQUENCE, SEQUENCE_WIDTH};

/// The part every number of a prefix and year starts with (`DEV2025`).
pub fn series(prefix: &str, year: i32) -> String {
    format!("{}{}", prefix, year)
}

/// Formats a full document number.
///
/// ## Example
/// ```rust
/// use quotebook_core::numbering::format_number;
///
/// assert_eq!(format_number("DEV", 2025, 1), "DEV20250001");
/// assert_eq!(format_number("PRJ", 2026, 312), "PRJ20260312");
/// ```
pub fn format_number(prefix: &str, year: i32, sequence: u32) -> String {
    format!("{}{:0width$}", series(prefix, year), sequence, width = SEQUENCE_WIDTH)
}

/// Extracts the sequence from a number of the given prefix and year.
///
/// Returns `None` for numbers of another series and for suffixes that are
/// not exactly four ASCII digits (legacy or hand-typed numbers).
pub fn parse_sequence(prefix: &str, year: i32, number: &str) -> Option<u32> {
    let suffix = number.strip_prefix(series(prefix, year).as_str())?;

    if suffix.len() != SEQUENCE_WIDTH || !suffix.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    suffix.parse().ok()
}

/// Picks the number following the highest one already used in the series.
///
/// Unparseable entries are skipped. An empty series starts at `0001`.
///
/// ## Example
/// ```rust
/// use quotebook_core::numbering::next_number;
///
/// let used = ["DEV20250001", "DEV20250007", "DEV2025-OLD"];
/// assert_eq!(next_number("DEV", 2025, used).unwrap(), "DEV20250008");
/// ```
pub fn next_number<'a, I>(prefix: &str, year: i32, existing: I) -> CoreResult<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let highest = existing
        .into_iter()
        .filter_map(|number| parse_sequence(prefix, year, number))
        .max()
        .unwrap_or(0);

    if highest >= MAX_SEQUENCE {
        return Err(CoreError::SequenceExhausted {
            prefix: prefix.to_string(),
            year,
        });
    }

    Ok(format_number(prefix, year, highest + 1))
}

// =============================================================================
// Unit Tests
// =============================================================================
