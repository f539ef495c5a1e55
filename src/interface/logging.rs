use log::LevelFilter;

/// Maps the CLI verbosity flags onto a level; `RUST_LOG` still overrides it.
pub fn level_filter(verbosity: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::Error;
    }
    match verbosity {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Installs the global `env_logger` backend on stderr.
pub fn setup_logging(verbosity: u8, quiet: bool) {
    let mut builder = env_logger::Builder::new();
    builder
        .filter_level(level_filter(verbosity, quiet))
        .format_target(false)
        .parse_default_env();
    // A second initialisation (tests, embedding) keeps the first logger.
    let _ = builder.try_init();
}
