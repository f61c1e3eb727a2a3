//! ## Instrument Session
//!
//! One logical connection to one instrument, layered over a
//! [`SessionProvider`]. Owns the provider handle exclusively and drives the
//! Disconnected/Connected state machine: connect (open + clear + identity
//! handshake), synchronous write/read/query, device clear, and disconnect.
//!
//! Everything here blocks until the provider completes or hits the fixed
//! timeout configured at connect time. No retries are performed at this
//! layer; a failed operation is surfaced to the caller immediately.
//!

use crate::constants::misc;
use crate::error::Error;
use crate::provider::{is_failure, ProviderHandle, SessionProvider, Status};

use anyhow::Result;
use log::{error, info, warn};

/// Connection state of an [`InstrumentSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    Connected,
}

/// ### Instrument Session
///
/// Client connected to a SCPI instrument through a session provider.
///
pub struct InstrumentSession {
    provider: Box<dyn SessionProvider>,
    handle: Option<ProviderHandle>,
    resource: String,
    identity: String,
    state: SessionState,
}

impl InstrumentSession {
    /// Create a disconnected session over `provider`.
    pub fn new(provider: Box<dyn SessionProvider>) -> InstrumentSession {
        InstrumentSession {
            provider,
            handle: None,
            resource: String::new(),
            identity: String::new(),
            state: SessionState::Disconnected,
        }
    }

    /// The resource identifier given at connect time.
    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// The trimmed `*IDN?` response captured during connect. Empty when the
    /// identity handshake failed or the session is disconnected.
    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == SessionState::Connected
    }

    /// Human-readable description of a provider status code.
    pub fn describe_status(&self, status: Status) -> String {
        self.provider.describe_status(status)
    }

    /// ### Connect
    ///
    /// Open a session to `resource` with the fixed per-session timeout,
    /// clear the device, and perform the identity handshake.
    ///
    /// On a failed open the session stays Disconnected and the handshake is
    /// not attempted. A failed handshake is logged but leaves the session
    /// Connected; the instrument is usable without its identity.
    ///
    pub fn connect(&mut self, resource: &str) -> Result<()> {
        let (handle, status) = self.provider.open(resource, misc::DEFAULT_TIMEOUT_MS);
        if is_failure(status) {
            let description = self.provider.describe_status(status);
            error!("error connecting to instrument {resource}: {status} {description}");
            return Err(Error::ConnectFailure {
                resource: resource.to_string(),
                status,
                description,
            }
            .into());
        }

        self.resource = resource.to_string();
        self.handle = Some(handle);
        self.state = SessionState::Connected;

        // clear the session just to make sure
        let status = self.clear()?;
        info!("device clear status: {status}");

        info!("instrument {resource} connected");

        match self.query(misc::IDENTITY_QUERY) {
            Ok(reply) => {
                self.identity = reply.trim().to_string();
                info!("identity string set to {}", self.identity);
            }
            Err(err) => warn!("identity handshake failed, session stays connected: {err}"),
        }

        Ok(())
    }

    /// ### Disconnect
    ///
    /// Close the provider session. The state becomes Disconnected and the
    /// handle is released whether or not the close succeeds, so a stale
    /// handle can never pin the session in Connected.
    ///
    pub fn disconnect(&mut self) -> Result<()> {
        let Some(handle) = self.handle.take() else {
            return Ok(());
        };

        self.state = SessionState::Disconnected;
        self.identity.clear();

        let status = self.provider.close(handle);
        if is_failure(status) {
            let description = self.provider.describe_status(status);
            error!("error disconnecting instrument: {status} {description}");
            return Err(Error::DisconnectFailure {
                status,
                description,
            }
            .into());
        }

        info!("instrument disconnected successfully");
        Ok(())
    }

    /// ### Write
    ///
    /// Send the full byte length of `command` to the instrument. Not
    /// retried on failure.
    ///
    pub fn write(&mut self, command: &str) -> Result<()> {
        let handle = self.connected_handle()?;

        let (_, status) = self.provider.write(handle, command.as_bytes());
        if is_failure(status) {
            let description = self.provider.describe_status(status);
            error!("error writing to instrument, command {command:?}: {status} {description}");
            return Err(Error::WriteFailure {
                command: command.to_string(),
                status,
                description,
            }
            .into());
        }

        info!("write successful, command: {command}");
        Ok(())
    }

    /// ### Read
    ///
    /// Read one response of up to [`misc::READ_BUFFER_SIZE`] bytes and
    /// return it as a string. On provider failure the partial buffer rides
    /// inside the error for diagnostics and must not be trusted as
    /// instrument output.
    ///
    pub fn read(&mut self) -> Result<String> {
        let handle = self.connected_handle()?;

        let (bytes, status) = self.provider.read(handle, misc::READ_BUFFER_SIZE);
        let text = String::from_utf8_lossy(&bytes).to_string();
        if is_failure(status) {
            let description = self.provider.describe_status(status);
            error!("error reading response from instrument: {status} {description}");
            return Err(Error::ReadFailure {
                status,
                description,
                partial: text,
            }
            .into());
        }

        info!("read successful, returned value: {text}");
        Ok(text)
    }

    /// ### Query
    ///
    /// Write `command` and immediately read the response, with no delay and
    /// no retry. A failed write does not short-circuit the read; the query
    /// result is the read result.
    ///
    pub fn query(&mut self, command: &str) -> Result<String> {
        if let Err(err) = self.write(command) {
            warn!("query write failed, still attempting read: {err}");
        }
        self.read()
    }

    /// ### Clear
    ///
    /// Issue a device clear and return the raw provider status for
    /// diagnostic logging.
    ///
    pub fn clear(&mut self) -> Result<Status> {
        let handle = self.connected_handle()?;

        let status = self.provider.clear(handle);
        if is_failure(status) {
            let description = self.provider.describe_status(status);
            warn!("device clear reported {status} {description}");
        }
        Ok(status)
    }

    fn connected_handle(&self) -> Result<ProviderHandle> {
        match self.handle {
            Some(handle) if self.state == SessionState::Connected => Ok(handle),
            _ => Err(Error::NotConnected.into()),
        }
    }
}

impl Drop for InstrumentSession {
    fn drop(&mut self) {
        if self.is_connected() {
            if let Err(err) = self.disconnect() {
                warn!("implicit disconnect on drop failed: {err}");
            }
        }
    }
}
