//! Panic logging.
//!
//! A custom panic hook writes the panic reason and location to the log at
//! error level, so a crash shows up in the same stream operators already
//! watch, then defers to the previously installed hook.

use core::any::Any;

/// Human-readable reason carried by a panic payload.
pub fn panic_reason(payload: &(dyn Any + Send)) -> &str {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.as_str()
    } else {
        "unknown panic"
    }
}

// ───────────────────────────────────────────────────────────────
// Custom panic handler
// ───────────────────────────────────────────────────────────────

/// Install a panic hook that logs the panic before the default output.
///
/// Call once during init, after the logger is ready.
pub fn install_panic_handler() {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let reason = panic_reason(info.payload());
        match info.location() {
            Some(loc) => log::error!("PANIC: {} at {}:{}", reason, loc.file(), loc.line()),
            None => log::error!("PANIC: {}", reason),
        }
        previous(info);
    }));
}
