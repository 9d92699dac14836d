use std::time::{Duration, Instant};

pub struct AppState {
    pub started_at: Instant,
    pub status_line: String,
    pub terminal_size: (u16, u16),
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self {
            started_at: Instant::now(),
            status_line: "sampling".to_string(),
            terminal_size: (0, 0),
        }
    }

    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }
}
