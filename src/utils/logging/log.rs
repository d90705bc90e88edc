//! Logging helpers
//!
//! Consistent wording for the start and end of engine operations.

use std::time::Duration;

/// Log an operation start
///
/// # Arguments
/// * `operation` - Description of the operation
/// * `subject` - What the operation works on (a file, a record id, a batch)
pub fn log_operation_start(operation: &str, subject: &str) {
    log::info!("{operation} {subject}");
}

/// Log an operation completion
///
/// # Arguments
/// * `operation` - Past-tense description of the operation
/// * `subject` - What the operation worked on
/// * `items` - Number of items processed
/// * `elapsed` - Optional elapsed time
pub fn log_operation_complete(operation: &str, subject: &str, items: usize, elapsed: Option<Duration>) {
    if let Some(duration) = elapsed {
        log::info!("Successfully {operation} {items} items from {subject} in {duration:?}");
    } else {
        log::info!("Successfully {operation} {items} items from {subject}");
    }
}

/// Log a warning, optionally naming what it concerns
pub fn log_warning(message: &str, subject: Option<&str>) {
    if let Some(subject) = subject {
        log::warn!("{message}: {subject}");
    } else {
        log::warn!("{message}");
    }
}
