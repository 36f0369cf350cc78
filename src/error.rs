/*!
error.rs - Rust-API-level error type.

This is deliberately small. Per spec.md's error-handling design, almost
every fault this core encounters is modeled as emulated-machine behavior
(a NOP, a dropped write, a status bit) rather than a `Result` the host has
to handle. `CoreError` only covers misuse of the construction-time API,
where silently ignoring the caller's mistake would be more surprising
than returning an error.
*/

use thiserror::Error;

/// Errors surfaced by the public construction API of [`crate::bus::Bus`].
///
/// Instruction execution and device register access never return this
/// type; see spec.md §7 for the policy governing those paths.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    /// A device window overlaps one already registered on the bus.
    #[error("device window {new_start:#06x}..={new_end:#06x} overlaps existing window {existing_start:#06x}..={existing_end:#06x}")]
    OverlappingWindow {
        new_start: u16,
        new_end: u16,
        existing_start: u16,
        existing_end: u16,
    },

    /// `add_range`/`remove_range` received an inverted `(start, end)` pair.
    #[error("invalid range {start:#06x}..={end:#06x}: start must not exceed end")]
    InvalidRange { start: u16, end: u16 },
}

pub type Result<T> = std::result::Result<T, CoreError>;
