//! Logging initialization

/// Initialize the logging system
///
/// Uses env_logger with default filter level of `info`.
/// Override with RUST_LOG environment variable, e.g. `RUST_LOG=impi=debug`
/// to see per-source scan statistics.
///
/// # Example
/// ```
/// impi::core::logging::init();
/// log::info!("Extraction started");
/// ```
pub fn init() {
    // Tolerate repeated calls (tests, embedding hosts that already set a logger)
    let _ = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info")
    ).try_init();
}
