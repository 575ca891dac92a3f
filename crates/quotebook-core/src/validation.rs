//! # Validation Module
//!
//! Request validation for documents and line items.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP layer                                                   │
//! │  └── Deserialization, required JSON fields                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE (called by the coordinator)                      │
//! │  └── Business rules, before any transaction is opened                  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / CHECK constraints                                      │
//! │  ├── UNIQUE (prefix, number)                                           │
//! │  └── Foreign key line → document                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use quotebook_core::validation::{validate_prefix, validate_title};
//!
//! validate_prefix("DEV").unwrap();
//! validate_title("Menuiseries alu - Villa Martin").unwrap();
//! ```

use rust_decimal::Decimal;

use crate::error::ValidationError;
use crate::types::{DocumentUpdate, NewDocument, NewLineItem};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

const MAX_TITLE_LEN: usize = 200;
const MAX_NOTES_LEN: usize = 4000;
const MAX_DESCRIPTION_LEN: usize = 1000;
const MAX_UNIT_LEN: usize = 20;
const MAX_PREFIX_LEN: usize = 8;
const MAX_NUMBER_LEN: usize = 32;

// =============================================================================
// String Validators
// =============================================================================

fn required(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(())
}

/// Validates a document title.
pub fn validate_title(title: &str) -> ValidationResult<()> {
    required("title", title, MAX_TITLE_LEN)
}

/// Validates free-form notes (optional, bounded).
pub fn validate_notes(notes: Option<&str>) -> ValidationResult<()> {
    match notes {
        Some(n) if n.chars().count() > MAX_NOTES_LEN => Err(ValidationError::TooLong {
            field: "notes".to_string(),
            max: MAX_NOTES_LEN,
        }),
        _ => Ok(()),
    }
}

/// Validates a number prefix.
///
/// ## Rules
/// - 1 to 8 characters
/// - Uppercase ASCII letters only, so the year that follows is unambiguous
///
/// ## Example
/// ```rust
/// use quotebook_core::validation::validate_prefix;
///
/// assert!(validate_prefix("DEV").is_ok());
/// assert!(validate_prefix("dev").is_err());
/// assert!(validate_prefix("DEV2").is_err());
/// ```
pub fn validate_prefix(prefix: &str) -> ValidationResult<()> {
    if prefix.is_empty() {
        return Err(ValidationError::Required {
            field: "prefix".to_string(),
        });
    }

    if prefix.len() > MAX_PREFIX_LEN {
        return Err(ValidationError::TooLong {
            field: "prefix".to_string(),
            max: MAX_PREFIX_LEN,
        });
    }

    if !prefix.bytes().all(|b| b.is_ascii_uppercase()) {
        return Err(ValidationError::InvalidFormat {
            field: "prefix".to_string(),
            reason: "must contain only uppercase letters A-Z".to_string(),
        });
    }

    Ok(())
}

/// Validates a caller-supplied document number.
///
/// Imported numbers do not have to follow `PREFIX + YYYY + NNNN`, but they
/// must be printable on a single line.
pub fn validate_number(number: &str) -> ValidationResult<()> {
    if number.is_empty() {
        return Err(ValidationError::Required {
            field: "number".to_string(),
        });
    }

    if number.len() > MAX_NUMBER_LEN {
        return Err(ValidationError::TooLong {
            field: "number".to_string(),
            max: MAX_NUMBER_LEN,
        });
    }

    if !number
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '/')
    {
        return Err(ValidationError::InvalidFormat {
            field: "number".to_string(),
            reason: "must contain only letters, digits, '-' and '/'".to_string(),
        });
    }

    Ok(())
}

/// Checks that a supplied number belongs to the series of its own kind.
///
/// ## Rules
/// - Must start with `prefix`
/// - Must not start with any of `other_prefixes` that is longer than
///   `prefix` (`D` vs `DEV`), since those numbers are allocated elsewhere
///
/// ## Example
/// ```rust
/// use quotebook_core::validation::validate_number_prefix;
///
/// assert!(validate_number_prefix("DEV-2019-118", "DEV", &["PRJ"]).is_ok());
/// assert!(validate_number_prefix("PRJ20250001", "DEV", &["PRJ"]).is_err());
/// ```
pub fn validate_number_prefix(number: &str, prefix: &str, other_prefixes: &[&str]) -> ValidationResult<()> {
    let foreign = other_prefixes
        .iter()
        .any(|other| other.len() > prefix.len() && number.starts_with(other));

    if !number.starts_with(prefix) || foreign {
        return Err(ValidationError::InvalidFormat {
            field: "number".to_string(),
            reason: format!("must start with the {prefix} prefix"),
        });
    }

    Ok(())
}

/// Validates an opaque user or client identifier (UUID).
///
/// ## Example
/// ```rust
/// use quotebook_core::validation::validate_uuid;
///
/// assert!(validate_uuid("user", "550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("user", "not-a-uuid").is_err());
/// ```
pub fn validate_uuid(field: &str, id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a tax rate in percent.
///
/// ## Rules
/// - Between 0 and 100 inclusive
pub fn validate_tax_rate(percent: Decimal) -> ValidationResult<()> {
    if percent < Decimal::ZERO || percent > Decimal::ONE_HUNDRED {
        return Err(ValidationError::OutOfRange {
            field: "tax_rate".to_string(),
            min: "0".to_string(),
            max: "100".to_string(),
        });
    }

    Ok(())
}

/// Validates a line quantity.
///
/// ## Rules
/// - Must not be negative; zero is allowed (optional rows priced at 0 qty)
pub fn validate_quantity(quantity: Decimal) -> ValidationResult<()> {
    if quantity.is_sign_negative() && !quantity.is_zero() {
        return Err(ValidationError::Negative {
            field: "quantity".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Line Item Validators
// =============================================================================

/// Validates one line item. Unit prices may be negative (discount rows).
pub fn validate_line_item(line: &NewLineItem) -> ValidationResult<()> {
    required("description", &line.description, MAX_DESCRIPTION_LEN)?;
    required("unit", &line.unit, MAX_UNIT_LEN)?;
    validate_quantity(line.quantity)?;
    Ok(())
}

/// Validates a full line set.
///
/// ## Rules
/// - At most `max_lines` entries
/// - Every line valid; the error names the 1-based position of the first
///   bad line
pub fn validate_line_items(lines: &[NewLineItem], max_lines: usize) -> ValidationResult<()> {
    if lines.len() > max_lines {
        return Err(ValidationError::TooMany {
            field: "lines".to_string(),
            max: max_lines,
        });
    }

    for (idx, line) in lines.iter().enumerate() {
        validate_line_item(line).map_err(|e| e.at_line(idx + 1))?;
    }

    Ok(())
}

// =============================================================================
// Document Validators
// =============================================================================

/// Validates a create request.
pub fn validate_new_document(doc: &NewDocument, max_lines: usize) -> ValidationResult<()> {
    validate_title(&doc.title)?;
    validate_notes(doc.notes.as_deref())?;
    validate_uuid("created_by", &doc.created_by)?;

    if let Some(client_id) = &doc.client_id {
        validate_uuid("client_id", client_id)?;
    }
    if let Some(rate) = doc.tax_rate {
        validate_tax_rate(rate)?;
    }
    if let Some(number) = &doc.number {
        validate_number(number)?;
    }

    validate_line_items(&doc.lines, max_lines)
}

/// Validates an update request.
pub fn validate_document_update(update: &DocumentUpdate, max_lines: usize) -> ValidationResult<()> {
    validate_title(&update.title)?;
    validate_notes(update.notes.as_deref())?;
    validate_uuid("updated_by", &update.updated_by)?;

    if let Some(client_id) = &update.client_id {
        validate_uuid("client_id", client_id)?;
    }
    if let Some(rate) = update.tax_rate {
        validate_tax_rate(rate)?;
    }

    validate_line_items(&update.lines, max_lines)
}

// =============================================================================
// Unit Tests
// =============================================================================
