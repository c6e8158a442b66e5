//! Server configuration.
//! Handles loading, interpolation and validation of
//! ~/.config/bstack/config.json.

mod interpolation;
mod io;
mod model;
mod validation;

pub use interpolation::interpolate_config;
pub use io::{CONFIG_PATH_ENV, default_config_path, load_config, load_config_from_path};
pub use model::{ConfigError, DEFAULT_DEVICES_URL, DEFAULT_HTTP_BIND_ADDRESS, DEFAULT_REQUEST_TIMEOUT_SECS, ServerConfig};
pub use validation::{ValidationError, validate_bind_address, validate_config};
