use crate::{Error, Result};
use std::io;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

/// Install a SIGINT/SIGTERM handler that clears the returned flag so the
/// tick loop can exit between iterations.
pub(super) fn create_shutdown_flag() -> Result<Arc<AtomicBool>> {
    let running = Arc::new(AtomicBool::new(true));
    let flag = running.clone();
    ctrlc::set_handler(move || flag.store(false, Ordering::SeqCst)).map_err(|err| {
        Error::Io(io::Error::new(
            io::ErrorKind::Other,
            format!("failed to install signal handler: {err}"),
        ))
    })?;
    Ok(running)
}
