/// Application name, used for platform directories and environment prefixes.
pub const APP_NAME: &str = "chartdeck";

/// Environment variable overriding the application store directory.
pub const STORE_ENV: &str = "CHARTDECK_STORE";

/// Default configuration file name inside the config directory.
pub const CONFIG_FILENAME: &str = "config.toml";
