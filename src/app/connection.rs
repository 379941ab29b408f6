use super::Logger;
use crate::serial::{errors::classify_error, SerialOptions, SerialPort};

/// Attempt to open the node link, logging the outcome; the caller schedules
/// any retry through its backoff controller.
pub(crate) fn attempt_serial_connect(
    logger: &Logger,
    device: &str,
    options: SerialOptions,
) -> Option<SerialPort> {
    match SerialPort::connect(device, options) {
        Ok(port) => {
            logger.info(format!("serial connected ({device})"));
            Some(port)
        }
        Err(err) => {
            logger.warn(format!(
                "serial connect failed ({}): {err}; will retry",
                classify_error(&err)
            ));
            None
        }
    }
}
