// ABOUTME: Stderr messages printed outside the full-screen viewer
// ABOUTME: Colors error and hint prefixes when stderr is a terminal

use owo_colors::OwoColorize;
use std::io::IsTerminal;

pub struct CliOutput {
    use_color: bool,
}

impl CliOutput {
    /// Create CLI output with TTY detection (and NO_COLOR respected)
    pub fn new() -> Self {
        Self {
            use_color: std::io::stderr().is_terminal() && std::env::var_os("NO_COLOR").is_none(),
        }
    }

    pub fn with_color(use_color: bool) -> Self {
        Self { use_color }
    }

    pub fn format_error(&self, message: &str) -> String {
        if self.use_color {
            format!("{} {}", "error:".red().bold(), message)
        } else {
            format!("error: {}", message)
        }
    }

    pub fn format_hint(&self, message: &str) -> String {
        if self.use_color {
            format!("{} {}", "hint:".cyan().bold(), message)
        } else {
            format!("hint: {}", message)
        }
    }

    pub fn error(&self, message: &str) {
        eprintln!("{}", self.format_error(message));
    }

    pub fn hint(&self, message: &str) {
        eprintln!("{}", self.format_hint(message));
    }

    /// Report a top-level failure, with a hint when the cause is a known image error
    pub fn report(&self, err: &anyhow::Error) {
        self.error(&format!("{:#}", err));

        let help = err
            .chain()
            .find_map(|cause| cause.downcast_ref::<imgcat_core::ImageError>())
            .and_then(|e| e.help_text());
        if let Some(help) = help {
            self.hint(help);
        }
    }
}

impl Default for CliOutput {
    fn default() -> Self {
        Self::new()
    }
}
