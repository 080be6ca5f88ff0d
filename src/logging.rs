use std::io::IsTerminal;
use tracing::Level;

/// Audit log on stderr, so stdout only carries the operator-facing listing.
pub fn init(level: Level) {
    let result = tracing_subscriber::fmt()
        .with_max_level(level)
        // disable printing the name of the module in every log line.
        .with_target(false)
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr)
        .try_init();

    if let Err(err) = result {
        eprintln!("Logging could not be set up: {err}");
    }
}
