//! Configuration for omnibot receivers.
//!
//! Settings are layered with figment from defaults, TOML/YAML files and
//! `OMNIBOT_*` environment variables, then checked by [`validate_config`].

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, Profile, load_config, load_config_from_file};
pub use schema::{
    LogFormat, LogLevel, LogOutput, LogRotation, LoggingConfig, OmnibotConfig, RouterConfig,
    SpanEventConfig,
};
pub use validation::validate_config;
