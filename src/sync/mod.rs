use std::fmt;

pub mod commands;
pub mod engine;
pub mod plan;
pub mod report;

#[derive(Debug)]
pub struct SyncError;

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Sync error")
    }
}

impl std::error::Error for SyncError {}

pub type SyncResult<T> = error_stack::Result<T, SyncError>;
