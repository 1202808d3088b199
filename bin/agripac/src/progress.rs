//! Busy indicator for in-flight requests.
//!
//! Wired into the client's busy hook: the marker appears on stderr when a
//! request starts and is erased when it finishes, success or failure. Only
//! active on a terminal so piped output stays clean.

use std::io::{IsTerminal, Write};

use agripac_client::http::BusyHook;

pub fn stderr_busy_hook() -> BusyHook {
    Box::new(|busy| {
        let mut err = std::io::stderr();
        if !err.is_terminal() {
            return;
        }
        if busy {
            let _ = write!(err, "… attendere");
        } else {
            // Erase the marker and return to column zero.
            let _ = write!(err, "\r{}\r", " ".repeat(12));
        }
        let _ = err.flush();
    })
}
