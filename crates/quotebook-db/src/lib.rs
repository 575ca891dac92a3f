//! # quotebook-db: Database Layer for Quotebook
//!
//! SQLite storage for quotes and projects, with the transaction coordinator
//! that keeps a document header, its line items and its number consistent.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Quotebook Data Flow                              │
//! │                                                                         │
//! │  HTTP handler (create quote)                                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  quotebook-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │  Coordinator  │    │  Repository   │    │  Migrations  │  │   │
//! │  │   │               │    │               │    │  (embedded)  │  │   │
//! │  │   │ create        │───►│ allocator     │    │              │  │   │
//! │  │   │ update        │    │ headers       │    │ 001_initial  │  │   │
//! │  │   │ transition    │    │ lines         │    │              │  │   │
//! │  │   │ delete        │    │ queries       │    │              │  │   │
//! │  │   └───────┬───────┘    └───────────────┘    └──────────────┘  │   │
//! │  │           │ BEGIN IMMEDIATE … COMMIT / ROLLBACK                 │   │
//! │  │   ┌───────▼───────┐                                            │   │
//! │  │   │   Database    │  SqlitePool, WAL, foreign keys             │   │
//! │  │   └───────────────┘                                            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite file (QUOTEBOOK_DATABASE_PATH)                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`config`] - Coordinator settings (prefixes, default tax rate)
//! - [`coordinator`] - Atomic create / update / status / delete
//! - [`repository`] - Document queries and number allocation
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Storage and coordinator error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use quotebook_core::{DocumentKind, NewDocument, NewLineItem};
//! use quotebook_db::{CoordinatorConfig, Database, DbConfig};
//!
//! let db = Database::new(DbConfig::from_env()?).await?;
//! let coordinator = db.coordinator(CoordinatorConfig::load()?);
//!
//! let quote = coordinator
//!     .create(NewDocument::new(DocumentKind::Quote, "Véranda", user_id).with_lines(lines))
//!     .await?;
//! println!("{} → {}", quote.number, quote.grand_total);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod coordinator;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{ConfigError, CoordinatorConfig};
pub use coordinator::DocumentCoordinator;
pub use error::{DbError, DocumentError, DocumentResult, ErrorKind};
pub use pool::{Database, DbConfig};

pub use repository::document::DocumentRepository;
