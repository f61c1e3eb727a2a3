//! ## Session Provider
//!
//! Capability contract over the opaque hardware session provider (a VISA
//! library, a USBTMC stack, or a simulator). The session layer never sees
//! transport details; it drives the instrument through this trait and
//! interprets the ordered status codes it returns.
//!

use crate::constants::status;

/// Ordered provider status code. Codes below [`status::SUCCESS`] are
/// failures; non-negative codes may carry warnings but the operation
/// completed.
pub type Status = i32;

/// Opaque identifier for one open provider session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProviderHandle(pub u32);

/// True when `s` indicates a failed operation.
pub fn is_failure(s: Status) -> bool {
    s < status::SUCCESS
}

/// ### Session Provider
///
/// The operations the hardware boundary must supply. Every blocking call
/// observes the timeout configured once at `open`; it is not adjustable for
/// the lifetime of the handle.
///
pub trait SessionProvider {
    /// Open a session to `resource`, applying `timeout_ms` to all
    /// subsequent blocking operations on the returned handle. The handle
    /// is only meaningful when the status is not a failure.
    fn open(&mut self, resource: &str, timeout_ms: u32) -> (ProviderHandle, Status);

    /// Close the session. The handle is invalid afterwards regardless of
    /// the returned status.
    fn close(&mut self, handle: ProviderHandle) -> Status;

    /// Write `data` in full, returning the number of bytes accepted.
    fn write(&mut self, handle: ProviderHandle, data: &[u8]) -> (usize, Status);

    /// Read up to `max_len` bytes. On failure the returned buffer may be
    /// partial or garbage and is passed along for diagnostics only.
    fn read(&mut self, handle: ProviderHandle, max_len: usize) -> (Vec<u8>, Status);

    /// Clear the device's I/O buffers.
    fn clear(&mut self, handle: ProviderHandle) -> Status;

    /// Human-readable description of a status code, fetched on every
    /// failure path before the failure propagates.
    fn describe_status(&self, status: Status) -> String;
}
