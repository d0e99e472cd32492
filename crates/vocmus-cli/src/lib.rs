//! Shared helpers for the vocmus binaries

pub mod output;

/// Initialize env_logger: Info with `--verbose`, otherwise warnings only
///
/// Logs go to stderr so stdout stays clean JSON.
pub fn init_logger(verbose: bool) {
    let level = if verbose {
        log::LevelFilter::Info
    } else {
        log::LevelFilter::Warn
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();
}
