//! Styled terminal output
//!
//! Status lines go to stderr so that reports on stdout stay pipeable.

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

    /// Report or listing body, always on stdout
    pub fn print(&self, body: &str) {
        print!("{body}");
        if !body.ends_with('\n') {
            println!();
        }
    }

    pub fn header(&self, title: &str) {
        println!("{}", style(title).bold().underlined());
    }
}
