/// Simulated round trip of the in-memory API when no latency is configured.
pub const DEFAULT_LATENCY_MILLIS: u64 = 150;
/// Upper bound of the random jitter added on top of the simulated latency.
pub const LATENCY_JITTER_MILLIS: u64 = 50;

pub const LATENCY_ENV_VAR: &str = "ORDER_CLIENT_LATENCY_MS";
pub const LOG_LEVEL_ENV_VAR: &str = "ORDER_CLIENT_LOG";

pub const NO_DRIVER_LABEL: &str = "No driver assigned";
pub const NO_RESTAURANT_LABEL: &str = "Unknown restaurant";
pub const CURRENCY_SYMBOL: &str = "₩";
