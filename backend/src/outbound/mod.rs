//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! This module follows the hexagonal architecture pattern, providing concrete
//! implementations of domain port traits:
//!
//! - **persistence**: the in-process `MemoryStore` with optional JSON
//!   snapshot files
//! - **mail**: a logging stand-in for an SMTP relay
//! - **images**: local filesystem storage for listing images
//! - **password**: Argon2 password hashing
//!
//! Adapters are thin translators that convert between domain types and
//! infrastructure-specific representations. They contain no business logic.

pub mod images;
pub mod mail;
pub mod password;
pub mod persistence;

pub use images::LocalImageStore;
pub use mail::LoggingOtpMailer;
pub use password::Argon2Hasher;
pub use persistence::{MemoryStore, SnapshotError};
