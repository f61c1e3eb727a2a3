//! End-to-end tests driving [`ScopeClient`] against the simulated provider
//! and an in-memory YAML command set, covering the flows a control surface
//! performs: connect, channel setup, acquisition configuration, and decoded
//! measurements.

use rs_scopectl::{CommandSet, Error, ScopeClient, SimProvider};

const COMMANDS: &str = r#"
utils:
  autoscale: ":AUToscale"
measurements:
  frequency: ":MEASure:FREQuency"
  voltage_rms: ":MEASure:VRMS"
  get_result: "RESults"
  source_channel: ":MEASure:SOURce CHANnel{channel_number}"
acquisition:
  acq_count: ":ACQuire:COUNt {count}"
  mode: ":ACQuire:TYPE {acquire_mode}"
  types:
    - NORMal
    - AVERage
    - HRESolution
channels:
  display_state: ":CHANnel{channel_number}:DISPlay {display_state}"
  states:
    "on": "ON"
    "off": "OFF"
  scale:
    vertical: ":CHANnel{channel_number}:SCALe {scale_value}"
    horizontal: ":TIMebase:SCALe {scale_value}"
  offset:
    vertical: ":CHANnel{channel_number}:OFFSet {offset_value}"
    horizontal: ":TIMebase:POSition {offset_value}"
"#;

fn connected_scope(sim: &SimProvider) -> ScopeClient {
    let _ = env_logger::builder().is_test(true).try_init();
    sim.respond("*IDN?", "ACME,SCOPE-1000,MY00000001,1.00\n");
    let commands = CommandSet::from_str(COMMANDS).expect("command set parses");
    let mut scope = ScopeClient::new(Box::new(sim.clone()), Box::new(commands));
    scope.connect("TCPIP0::192.168.0.10::INSTR").expect("connect");
    scope
}

#[test]
fn connect_performs_identity_handshake() {
    let sim = SimProvider::new();
    let scope = connected_scope(&sim);
    assert!(scope.is_connected());
    assert_eq!(scope.identity(), "ACME,SCOPE-1000,MY00000001,1.00");
}

#[test]
fn autoscale_sends_the_configured_command() {
    let sim = SimProvider::new();
    let mut scope = connected_scope(&sim);
    scope.autoscale().unwrap();
    assert_eq!(sim.writes().last().map(String::as_str), Some(":AUToscale"));
}

#[test]
fn channel_setup_substitutes_runtime_values() {
    let sim = SimProvider::new();
    let mut scope = connected_scope(&sim);

    scope.select_channel(3).unwrap();
    scope.set_channel_visible(2, true).unwrap();
    scope.set_channel_visible(2, false).unwrap();

    let writes = sim.writes();
    let tail = &writes[writes.len() - 3..];
    assert_eq!(
        tail,
        [
            ":MEASure:SOURce CHANnel3",
            ":CHANnel2:DISPlay ON",
            ":CHANnel2:DISPlay OFF",
        ]
    );
}

#[test]
fn scale_and_offset_encode_value_and_si_exponent() {
    let sim = SimProvider::new();
    let mut scope = connected_scope(&sim);

    scope.set_vertical_scale(1, 20, "m").unwrap();
    scope.set_vertical_offset(1, -5, "m").unwrap();
    scope.set_horizontal_scale(1, 10, "u").unwrap();
    scope.set_horizontal_offset(1, 0, "").unwrap();

    let writes = sim.writes();
    let tail = &writes[writes.len() - 4..];
    assert_eq!(
        tail,
        [
            ":CHANnel1:SCALe 20E-3",
            ":CHANnel1:OFFSet -5E-3",
            ":TIMebase:SCALe 10E-6",
            ":TIMebase:POSition 0E0",
        ]
    );
}

#[test]
fn acquisition_count_is_sent_before_mode() {
    let sim = SimProvider::new();
    let mut scope = connected_scope(&sim);

    scope.set_acquisition_mode(1, 64).unwrap();

    let writes = sim.writes();
    let tail = &writes[writes.len() - 2..];
    assert_eq!(tail, [":ACQuire:COUNt 64", ":ACQuire:TYPE AVERage"]);
}

#[test]
fn acquisition_mode_is_still_sent_after_failed_count_write() {
    let sim = SimProvider::new();
    let mut scope = connected_scope(&sim);

    sim.fail_write(true);
    let first = scope.set_acquisition_mode(0, 8);
    assert!(first.is_err());

    // both commands went out despite the failure
    let writes = sim.writes();
    let tail = &writes[writes.len() - 2..];
    assert_eq!(tail, [":ACQuire:COUNt 8", ":ACQuire:TYPE NORMal"]);
}

#[test]
fn measure_appends_result_query_and_decodes_reply() {
    let sim = SimProvider::new();
    let mut scope = connected_scope(&sim);
    sim.respond(":MEASure:FREQuency;RESults?", "+1.2340E+04\n");

    let measured = scope.measure("frequency").unwrap();
    // 12.34E3 after snapping 4 down to the SI grid
    assert!((measured.value - 12.34).abs() < 1e-9);
    assert_eq!(measured.exponent, 3);
    assert_eq!(measured.unit_label("Hz"), "kHz");
}

#[test]
fn measure_voltage_snaps_onto_micro() {
    let sim = SimProvider::new();
    let mut scope = connected_scope(&sim);
    sim.respond(":MEASure:VRMS;RESults?", "+5.0000E-05\n");

    let measured = scope.measure("voltage_rms").unwrap();
    assert!((measured.value - 50.0).abs() < 1e-9);
    assert_eq!(measured.exponent, -6);
    assert_eq!(measured.unit_label("V"), "uV");
}

#[test]
fn malformed_reply_is_an_error_not_a_crash() {
    let sim = SimProvider::new();
    let mut scope = connected_scope(&sim);
    sim.respond(":MEASure:FREQuency;RESults?", "****ERROR****");

    let err = scope.measure("frequency").unwrap_err();
    assert!(matches!(
        err.downcast_ref::<Error>(),
        Some(Error::MalformedReply { .. })
    ));
}

#[test]
fn missing_template_is_reported_with_its_path() {
    let sim = SimProvider::new();
    let mut scope = connected_scope(&sim);

    let err = scope.measure("rise_time").unwrap_err();
    match err.downcast_ref::<Error>() {
        Some(Error::TemplateNotFound { path }) => {
            assert_eq!(path, "measurements/rise_time");
        }
        other => panic!("unexpected error {other:?}"),
    }
    // nothing was written for the unknown measurement
    assert_eq!(sim.writes(), vec!["*IDN?"]);
}

#[test]
fn device_clear_maps_failing_status_to_error() {
    let sim = SimProvider::new();
    let mut scope = connected_scope(&sim);

    scope.device_clear().unwrap();

    sim.fail_clear(true);
    let err = scope.device_clear().unwrap_err();
    assert!(matches!(
        err.downcast_ref::<Error>(),
        Some(Error::ClearFailure { .. })
    ));
}

#[test]
fn disconnect_releases_the_session() {
    let sim = SimProvider::new();
    let mut scope = connected_scope(&sim);

    scope.disconnect().unwrap();
    assert!(!scope.is_connected());
    assert!(scope.identity().is_empty());
    assert_eq!(sim.closes(), 1);

    let err = scope.autoscale().unwrap_err();
    assert!(matches!(err.downcast_ref::<Error>(), Some(Error::NotConnected)));
}
