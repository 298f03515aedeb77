use dir_squeeze_core::DaemonState;
use std::io;
use std::sync::Arc;
use tracing::warn;

/// Turn SIGTERM and SIGINT into a stop request. The current scan and its
/// report always finish first.
#[cfg(unix)]
pub fn install_stop_handler(state: Arc<DaemonState>) -> io::Result<()> {
    use signal_hook::consts::{SIGINT, SIGTERM};
    use signal_hook::iterator::Signals;
    use std::thread;

    let mut signals = Signals::new([SIGTERM, SIGINT])?;
    thread::Builder::new()
        .name("stop-signals".to_string())
        .spawn(move || {
            for sig in signals.forever() {
                warn!(
                    "Signal {} received, stopping after the current directory scan...",
                    sig
                );
                state.request_stop();
            }
        })?;
    Ok(())
}

#[cfg(not(unix))]
pub fn install_stop_handler(_state: Arc<DaemonState>) -> io::Result<()> {
    warn!("Stop signals are not supported on this platform");
    Ok(())
}
