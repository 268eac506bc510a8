//! Environment variable name constants and accessors
//!
//! Every variable the CLI reads is named here, and read only through the
//! functions below.

/// Environment variable names
pub mod names {
    /// Output directory: `GENMACHINE_OUT_DIR`
    /// Overrides `out_dir` from the configuration files
    pub const OUT_DIR: &str = "GENMACHINE_OUT_DIR";

    /// Class name suffix: `GENMACHINE_CLASS_SUFFIX`
    /// Overrides `compile.class_suffix` from the configuration files
    pub const CLASS_SUFFIX: &str = "GENMACHINE_CLASS_SUFFIX";

    /// Configuration file: `GENMACHINE_CONFIG`
    /// When set, this file is loaded instead of the default search paths
    pub const CONFIG: &str = "GENMACHINE_CONFIG";

    /// Log filter: `GENMACHINE_LOG`
    /// A `tracing_subscriber::EnvFilter` directive such as `genmachine=debug`
    pub const LOG: &str = "GENMACHINE_LOG";
}

/// Get the output directory from environment
/// Returns `None` if not set
pub fn get_out_dir() -> Option<String> {
    std::env::var(names::OUT_DIR).ok()
}

/// Get the class name suffix from environment
/// Returns `None` if not set
pub fn get_class_suffix() -> Option<String> {
    std::env::var(names::CLASS_SUFFIX).ok()
}

/// Get the explicit configuration file path from environment
/// Returns `None` if not set
pub fn get_config_path() -> Option<String> {
    std::env::var(names::CONFIG).ok()
}
