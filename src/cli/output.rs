//! Styled status output for the scorepipe CLI
//!
//! Status lines go to stderr so that a report written to stdout stays
//! machine-readable.

use console::style;

/// Output handler for consistent CLI formatting
#[derive(Debug, Clone, Copy)]
pub struct Output {
    verbose: bool,
    quiet: bool,
}

impl Output {
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self { verbose, quiet }
    }

    pub fn success(&self, message: &str) {
        if !self.quiet {
            eprintln!("{} {}", style("✔").green(), message);
        }
    }

    /// Errors are always shown, even in quiet mode
    pub fn error(&self, message: &str) {
        eprintln!("{} {}", style("✖").red(), message);
    }

    pub fn warning(&self, message: &str) {
        if !self.quiet {
            eprintln!("{} {}", style("⚠").yellow(), message);
        }
    }

    pub fn info(&self, message: &str) {
        if !self.quiet {
            eprintln!("{} {}", style("ℹ").blue(), message);
        }
    }

    /// Only shown with `-v`
    pub fn verbose(&self, message: &str) {
        if self.verbose && !self.quiet {
            eprintln!("{} {}", style("ℹ").dim(), style(message).dim());
        }
    }

    pub fn is_quiet(&self) -> bool {
        self.quiet
    }

    pub fn category(&self, category: &str) {
        if !self.quiet {
            eprintln!("\n{}", style(category).bold().cyan());
        }
    }

    /// Print a key-value pair with consistent styling
    pub fn key_value(&self, key: &str, value: &str, highlight: bool) {
        if !self.quiet {
            let styled_value = if highlight {
                style(value).green().bold()
            } else {
                style(value).white()
            };
            eprintln!("  {} {}", style(key).dim(), styled_value);
        }
    }

    pub fn summary_stats(&self, label: &str, value: usize) {
        if !self.quiet {
            eprintln!("  {:<12} {}", style(label).dim(), style(value.to_string()).bold());
        }
    }
}
