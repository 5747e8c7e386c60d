//! ANSI escape sequence constants and helpers
//!
//! Centralizes the raw terminal control codes used by the renderer, giving
//! readable names to the handful of colors the views need.

/// Reset all text attributes
pub const RESET: &str = "\x1b[0m";

/// Bold text attribute
pub const BOLD: &str = "\x1b[1m";

/// Set foreground color using 256-color palette
#[inline]
pub fn fg(color: u8) -> String {
    format!("\x1b[38;5;{}m", color)
}

/// Named colors (256-color palette)
pub mod color {
    /// Green (83) - additions
    pub const GREEN: u8 = 83;

    /// Red (203) - deletions
    pub const RED: u8 = 203;

    /// Cyan (45) - hunk headers
    pub const CYAN: u8 = 45;

    /// Yellow (220) - renamed/status tags
    pub const YELLOW: u8 = 220;

    /// Gray (245) - muted context and line numbers
    pub const GRAY: u8 = 245;
}
