use tracing_subscriber::EnvFilter;

use crate::env;

/// Install the stderr subscriber.
///
/// `GENMACHINE_LOG` wins when it holds a valid filter. Otherwise `--verbose`
/// selects `debug` and the default is `warn`.
pub fn init(verbose: bool) {
    let filter = EnvFilter::try_from_env(env::names::LOG).unwrap_or_else(|_| {
        EnvFilter::new(if verbose { "debug" } else { "warn" })
    });
    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbose)
        .without_time()
        .with_writer(std::io::stderr)
        .try_init();
    if installed.is_ok() {
        tracing::debug!("tracing initialized");
    }
}
