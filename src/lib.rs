//! Makhraj Server Library
//!
//! Scores recorded pronunciations of the hijaiyah letters and keeps a
//! per-user practice history. This library exposes the internal modules for
//! the server binary and the end-to-end tests.

pub mod analysis;
pub mod config;
pub mod letters;
pub mod reports;
pub mod server;
pub mod sqlite_persistence;
pub mod store;
pub mod transcription;

// Re-export commonly used types for convenience
pub use letters::LetterTable;
pub use server::{run_server, RequestsLoggingLevel};
pub use store::{PronunciationStore, SqlitePronunciationStore};
