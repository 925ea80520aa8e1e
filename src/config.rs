use crate::uav_control::Position;
use crate::warn;
use std::{env, str::FromStr, time::Duration};

/// Park Maisonneuve, Montreal: the default home for simulation runs.
const DEFAULT_HOME: Position = Position::new(45.564_489, -73.562_537, 0.0);
const DEFAULT_SCRIPT_TICK_MS: u64 = 100;
const DEFAULT_DISPATCH_MS: u64 = 20;
const DEFAULT_TELEMETRY_MS: u64 = 50;

/// Runtime settings, read from `BRIDGE_*` environment variables.
#[derive(Debug, Clone, PartialEq)]
pub struct BridgeConfig {
    script_tick: Duration,
    dispatch_interval: Duration,
    telemetry_interval: Duration,
    home: Position,
    heap_limit: Option<usize>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            script_tick: Duration::from_millis(DEFAULT_SCRIPT_TICK_MS),
            dispatch_interval: Duration::from_millis(DEFAULT_DISPATCH_MS),
            telemetry_interval: Duration::from_millis(DEFAULT_TELEMETRY_MS),
            home: DEFAULT_HOME,
            heap_limit: None,
        }
    }
}

impl BridgeConfig {
    pub fn from_env() -> Self { Self::from_lookup(|key| env::var(key).ok()) }

    /// Builds the configuration from an arbitrary key lookup. Missing keys keep their
    /// default, unparsable ones are reported and also keep their default.
    pub fn from_lookup<F>(lookup: F) -> Self
    where F: Fn(&str) -> Option<String> {
        let read_ms = |key: &str, default: u64| {
            Duration::from_millis(parse_or(&lookup, key).unwrap_or(default))
        };
        Self {
            script_tick: read_ms("BRIDGE_SCRIPT_TICK_MS", DEFAULT_SCRIPT_TICK_MS),
            dispatch_interval: read_ms("BRIDGE_DISPATCH_MS", DEFAULT_DISPATCH_MS),
            telemetry_interval: read_ms("BRIDGE_TELEMETRY_MS", DEFAULT_TELEMETRY_MS),
            home: Position::new(
                parse_or(&lookup, "BRIDGE_HOME_LAT").unwrap_or(DEFAULT_HOME.latitude),
                parse_or(&lookup, "BRIDGE_HOME_LON").unwrap_or(DEFAULT_HOME.longitude),
                parse_or(&lookup, "BRIDGE_HOME_ALT").unwrap_or(DEFAULT_HOME.altitude),
            ),
            heap_limit: parse_or(&lookup, "BRIDGE_HEAP_LIMIT"),
        }
    }

    pub fn script_tick(&self) -> Duration { self.script_tick }
    pub fn dispatch_interval(&self) -> Duration { self.dispatch_interval }
    pub fn telemetry_interval(&self) -> Duration { self.telemetry_interval }
    pub fn home(&self) -> Position { self.home }
    pub fn heap_limit(&self) -> Option<usize> { self.heap_limit }
}

fn parse_or<F, T>(lookup: &F, key: &str) -> Option<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    let raw = lookup(key)?;
    match raw.trim().parse::<T>() {
        Ok(val) => Some(val),
        Err(_) => {
            warn!("Ignoring unparsable value '{raw}' for {key}, using default");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_env() {
        assert_eq!(BridgeConfig::from_lookup(|_| None), BridgeConfig::default());
    }

    #[test]
    fn test_overrides() {
        let config = BridgeConfig::from_lookup(lookup_from(&[
            ("BRIDGE_SCRIPT_TICK_MS", "250"),
            ("BRIDGE_HOME_LAT", " 46.0 "),
            ("BRIDGE_HEAP_LIMIT", "4096"),
        ]));
        assert_eq!(config.script_tick(), Duration::from_millis(250));
        assert_eq!(config.dispatch_interval(), Duration::from_millis(DEFAULT_DISPATCH_MS));
        assert!((config.home().latitude - 46.0).abs() < f64::EPSILON);
        assert!((config.home().longitude - DEFAULT_HOME.longitude).abs() < f64::EPSILON);
        assert_eq!(config.heap_limit(), Some(4096));
    }

    #[test]
    fn test_garbage_falls_back() {
        let config = BridgeConfig::from_lookup(lookup_from(&[
            ("BRIDGE_DISPATCH_MS", "fast"),
            ("BRIDGE_HEAP_LIMIT", "-1"),
        ]));
        assert_eq!(config.dispatch_interval(), Duration::from_millis(DEFAULT_DISPATCH_MS));
        assert_eq!(config.heap_limit(), None);
    }
}
