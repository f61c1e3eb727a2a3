//! # rs-scopectl
//!
//! Control a bench oscilloscope over a synchronous SCPI-style text protocol.
//!
//! Command strings are not hard-coded: they come from a hierarchical command
//! set (YAML) as templates with `{name}` placeholders, filled in with runtime
//! values before being written to the instrument. Measurement replies in
//! scientific notation are decoded into a value plus a valid SI exponent so
//! results render naturally as `3.14 uV` or `1.0 kHz`.
//!
//! The hardware boundary is the [`SessionProvider`] capability trait, so the
//! same control flow runs against a real VISA/USBTMC backend or against the
//! bundled [`SimProvider`] simulator.
//!
//! ## Example
//!
//! ```rust
//! use rs_scopectl::{CommandSet, ScopeClient, SimProvider};
//!
//! const COMMANDS: &str = r#"
//! utils:
//!   autoscale: ":AUToscale"
//! measurements:
//!   frequency: ":MEASure:FREQuency"
//!   get_result: ""
//! "#;
//!
//! fn main() -> anyhow::Result<()> {
//!     let sim = SimProvider::new();
//!     sim.respond("*IDN?", "ACME,SCOPE-1000,0,1.00");
//!     sim.respond(":MEASure:FREQuency?", "+2.5000E+04");
//!
//!     let commands = CommandSet::from_str(COMMANDS)?;
//!     let mut scope = ScopeClient::new(Box::new(sim), Box::new(commands));
//!
//!     scope.connect("TCPIP0::192.168.0.10::INSTR")?;
//!     scope.autoscale()?;
//!
//!     let measured = scope.measure("frequency")?;
//!     println!("{} {}", measured.value, measured.unit_label("Hz"));
//!     Ok(())
//! }
//! ```
//!

mod commands;
pub mod constants;
mod error;
mod measurement;
mod provider;
mod session;
mod sim;
mod template;

pub use commands::CommandSet;
pub use error::Error;
pub use measurement::{
    decode_scientific, exponent_to_si_prefix, si_prefix_to_exponent, ScaledMeasurement,
};
pub use provider::{is_failure, ProviderHandle, SessionProvider, Status};
pub use session::{InstrumentSession, SessionState};
pub use sim::SimProvider;
pub use template::{CommandLookup, CommandTemplate};

use anyhow::Result;
use log::warn;

/// ### Scope Client
///
/// The operations a control surface calls: each one resolves its command
/// template(s) from the command set, substitutes the runtime values, and
/// submits the result through the instrument session. Measurement queries
/// additionally decode the reply into a [`ScaledMeasurement`].
///
pub struct ScopeClient {
    session: InstrumentSession,
    commands: Box<dyn CommandLookup>,
}

impl ScopeClient {
    /// Create a disconnected client over a session provider and a command set.
    pub fn new(provider: Box<dyn SessionProvider>, commands: Box<dyn CommandLookup>) -> ScopeClient {
        ScopeClient {
            session: InstrumentSession::new(provider),
            commands,
        }
    }

    /// Connect to the instrument at `resource`.
    pub fn connect(&mut self, resource: &str) -> Result<()> {
        self.session.connect(resource)
    }

    /// Disconnect from the instrument.
    pub fn disconnect(&mut self) -> Result<()> {
        self.session.disconnect()
    }

    /// The connected instrument's identity string, empty when unknown.
    pub fn identity(&self) -> &str {
        self.session.identity()
    }

    pub fn is_connected(&self) -> bool {
        self.session.is_connected()
    }

    /// Direct access to the underlying session for commands this layer does
    /// not model.
    pub fn session(&mut self) -> &mut InstrumentSession {
        &mut self.session
    }

    /// ### Device Clear
    ///
    /// Clear the instrument's I/O buffers.
    ///
    pub fn device_clear(&mut self) -> Result<()> {
        let status = self.session.clear()?;
        if is_failure(status) {
            return Err(Error::ClearFailure {
                status,
                description: self.session.describe_status(status),
            }
            .into());
        }
        Ok(())
    }

    /// ### Send Command
    ///
    /// Resolve the template at `path`, substitute `subs`, and write the
    /// result as a fire-and-forget command.
    ///
    pub fn send_command(&mut self, path: &[&str], subs: &[(&str, &str)]) -> Result<()> {
        let command = self.template(path)?.resolve(subs);
        self.session.write(&command)
    }

    /// ### Query Command
    ///
    /// Resolve the template at `path`, substitute `subs`, and query the
    /// instrument, returning the raw reply text.
    ///
    pub fn query_command(&mut self, path: &[&str], subs: &[(&str, &str)]) -> Result<String> {
        let command = self.template(path)?.resolve(subs);
        self.session.query(&command)
    }

    /// Run the instrument's autoscale routine.
    pub fn autoscale(&mut self) -> Result<()> {
        self.send_command(&["utils", "autoscale"], &[])
    }

    /// Select the channel subsequent measurements read from.
    pub fn select_channel(&mut self, channel: u32) -> Result<()> {
        self.send_command(
            &["measurements", "source_channel"],
            &[("channel_number", &channel.to_string())],
        )
    }

    /// Show or hide a channel trace on the instrument display.
    pub fn set_channel_visible(&mut self, channel: u32, visible: bool) -> Result<()> {
        let state_key = if visible { "on" } else { "off" };
        let state = self.template(&["channels", "states", state_key])?;
        self.send_command(
            &["channels", "display_state"],
            &[
                ("channel_number", &channel.to_string()),
                ("display_state", state.text()),
            ],
        )
    }

    /// Set a channel's vertical scale to `value` units at the given SI
    /// prefix, e.g. `(1, 20, "m")` for 20 mV per division.
    pub fn set_vertical_scale(&mut self, channel: u32, value: i32, prefix: &str) -> Result<()> {
        self.set_scaled(&["channels", "scale", "vertical"], "scale_value", channel, value, prefix)
    }

    /// Set a channel's vertical offset.
    pub fn set_vertical_offset(&mut self, channel: u32, value: i32, prefix: &str) -> Result<()> {
        self.set_scaled(&["channels", "offset", "vertical"], "offset_value", channel, value, prefix)
    }

    /// Set the horizontal (timebase) scale.
    pub fn set_horizontal_scale(&mut self, channel: u32, value: i32, prefix: &str) -> Result<()> {
        self.set_scaled(&["channels", "scale", "horizontal"], "scale_value", channel, value, prefix)
    }

    /// Set the horizontal (timebase) offset.
    pub fn set_horizontal_offset(&mut self, channel: u32, value: i32, prefix: &str) -> Result<()> {
        self.set_scaled(&["channels", "offset", "horizontal"], "offset_value", channel, value, prefix)
    }

    /// ### Set Acquisition Mode
    ///
    /// Configure averaging count and acquisition mode, where `type_index`
    /// selects from the `acquisition/types` list. The count command is sent
    /// before the mode command; a failed count write is logged but does not
    /// stop the mode command from being issued.
    ///
    pub fn set_acquisition_mode(&mut self, type_index: usize, count: u32) -> Result<()> {
        let mode_token = self
            .template(&["acquisition", "types", &type_index.to_string()])?
            .text()
            .to_string();
        let count_command = self
            .template(&["acquisition", "acq_count"])?
            .resolve(&[("count", &count.to_string())]);
        let mode_command = self
            .template(&["acquisition", "mode"])?
            .resolve(&[("acquire_mode", &mode_token)]);

        let count_result = self.session.write(&count_command);
        if let Err(err) = &count_result {
            warn!("acquisition count write failed, still sending mode command: {err}");
        }
        let mode_result = self.session.write(&mode_command);

        count_result.and(mode_result)
    }

    /// ### Measure
    ///
    /// Run the measurement named by the `measurements/<kind>` template
    /// (e.g. `frequency`, `voltage_rms`) and decode the scientific-notation
    /// reply. When `measurements/get_result` is non-empty the query is
    /// `<set>;<get_result>?`, otherwise `<set>?`.
    ///
    pub fn measure(&mut self, kind: &str) -> Result<ScaledMeasurement> {
        let set_command = self.template(&["measurements", kind])?;
        let get_result = self
            .commands
            .lookup(&["measurements", "get_result"])
            .unwrap_or_default();

        let command = if get_result.is_empty() {
            format!("{}?", set_command.text())
        } else {
            format!("{};{}?", set_command.text(), get_result)
        };

        let reply = self.session.query(&command)?;
        decode_scientific(&reply)
    }

    /// Look up the template at `path`; a missing path resolves to the empty
    /// template, which must never be sent.
    fn template(&self, path: &[&str]) -> Result<CommandTemplate> {
        let template = CommandTemplate::new(self.commands.lookup(path).unwrap_or_default());
        if template.is_empty() {
            return Err(Error::TemplateNotFound {
                path: path.join("/"),
            }
            .into());
        }
        Ok(template)
    }

    fn set_scaled(
        &mut self,
        path: &[&str],
        value_name: &str,
        channel: u32,
        value: i32,
        prefix: &str,
    ) -> Result<()> {
        // numeric argument goes on the wire as <integer>E<exponent>
        let scaled = format!("{}E{}", value, si_prefix_to_exponent(prefix));
        self.send_command(
            path,
            &[
                ("channel_number", &channel.to_string()),
                (value_name, &scaled),
            ],
        )
    }
}
