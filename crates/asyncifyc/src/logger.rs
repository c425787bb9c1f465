//! Log output for the command line.
//!
//! Compact `LEVEL message` lines on stderr, no timestamps and no module
//! paths. Library crates only emit `debug!` and `trace!` events, so the
//! default WARN level keeps a normal run silent.

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer, Registry};

/// Map the `-v` count to a level.
pub fn level_for(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

/// Install the global subscriber.
pub fn init(verbose: u8) {
    let layer = tracing_subscriber::fmt::layer()
        .without_time()
        .with_target(false)
        .with_level(true)
        .with_ansi(false)
        .with_writer(std::io::stderr)
        .compact()
        .with_filter(level_for(verbose));

    Registry::default().with(layer).init();
}
