//! A single mutable terminal line for dev-server status: explicit
//! `start()`/`update()`/`stop()` over a scoped resource rather than
//! global mutable state. The full TUI progress display stays out of
//! scope; this only redraws one line over stderr.

use std::io::Write;
use std::sync::Mutex;

pub struct StatusLine {
    current: Mutex<Option<String>>,
}

impl StatusLine {
    pub fn new() -> Self {
        Self { current: Mutex::new(None) }
    }

    pub fn start(&self, text: &str) {
        self.update(text);
    }

    pub fn update(&self, text: &str) {
        let mut current = self.current.lock().unwrap();
        let previous_width = current.as_ref().map(String::len).unwrap_or(0);
        let mut stderr = std::io::stderr();
        let _ = write!(stderr, "\r{:width$}\r{text}", "", width = previous_width);
        let _ = stderr.flush();
        *current = Some(text.to_string());
    }

    pub fn stop(&self) {
        let mut current = self.current.lock().unwrap();
        if current.is_some() {
            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr);
            let _ = stderr.flush();
        }
        *current = None;
    }
}

impl Default for StatusLine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_then_stop_clears_current_line_state() {
        let line = StatusLine::new();
        line.start("watching for changes...");
        line.update("regenerating manifest...");
        line.stop();
        assert!(line.current.lock().unwrap().is_none());
    }
}
