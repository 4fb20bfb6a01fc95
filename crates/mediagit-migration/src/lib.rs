//! Storage backend migration tool for MediaGit

pub mod state;
pub mod verify;

pub use state::MigrationState;
pub use verify::IntegrityVerifier;
