use mcp_bridge::bridge::ConnectionSettings;
use mcp_bridge::config::Config;
use std::time::Duration;

/// Settings pointing at `base` (e.g. a wiremock server URI) with a short
/// reconnect delay.
pub fn settings_for(base: &str) -> ConnectionSettings {
    let config = Config {
        url: format!("{}/sse", base),
        reconnect_delay_ms: 50,
        ..Config::default()
    };
    ConnectionSettings::from_config(&config).unwrap()
}

/// Settings with debug on and a profile, so the X-Profile header is sent.
pub fn debug_settings_for(base: &str, profile: &str) -> ConnectionSettings {
    let config = Config {
        url: format!("{}/sse", base),
        profile: profile.to_string(),
        debug: true,
        reconnect_delay_ms: 50,
        ..Config::default()
    };
    ConnectionSettings::from_config(&config).unwrap()
}

/// A port nothing listens on.
pub const UNREACHABLE: &str = "http://127.0.0.1:1";

pub const WAIT: Duration = Duration::from_secs(5);
