pub mod interpolation;
pub mod path_processing;
pub mod text_processing;

pub use interpolation::{InterpolationError, interpolate_env};
pub use path_processing::{config_file_path, expand_tilde};
pub use text_processing::{fuzzy_score, redact_sensitive, redact_sensitive_with};
