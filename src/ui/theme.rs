//! Visual theme and styling.

use console::Style;

/// Colors used in terminal output.
#[derive(Debug, Clone)]
pub struct LintTheme {
    /// Style for success messages (green).
    pub success: Style,
    /// Style for warnings (orange).
    pub warning: Style,
    /// Style for errors (red bold).
    pub error: Style,
    /// Style for dim/secondary text such as node paths.
    pub dim: Style,
    /// Style for highlighted/important text (bold).
    pub highlight: Style,
    /// Style for file headers (bold).
    pub header: Style,
    /// Style for suggestions (magenta).
    pub hint: Style,
}

impl Default for LintTheme {
    fn default() -> Self {
        Self::new()
    }
}

impl LintTheme {
    /// Create the default theme.
    pub fn new() -> Self {
        Self {
            success: Style::new().green(),
            warning: Style::new().color256(208),
            error: Style::new().red().bold(),
            dim: Style::new().dim(),
            highlight: Style::new().bold(),
            header: Style::new().bold(),
            hint: Style::new().magenta(),
        }
    }

    /// Create a theme without colors (for non-TTY or --no-color).
    pub fn plain() -> Self {
        Self {
            success: Style::new(),
            warning: Style::new(),
            error: Style::new(),
            dim: Style::new(),
            highlight: Style::new(),
            header: Style::new(),
            hint: Style::new(),
        }
    }

    /// Format a success message (icon + text in green).
    pub fn format_success(&self, msg: &str) -> String {
        format!("{}", self.success.apply_to(format!("✓ {}", msg)))
    }

    /// Format a warning message (icon + text in orange).
    pub fn format_warning(&self, msg: &str) -> String {
        format!("{}", self.warning.apply_to(format!("⚠ {}", msg)))
    }

    /// Format an error message (icon + text in red bold).
    pub fn format_error(&self, msg: &str) -> String {
        format!("{}", self.error.apply_to(format!("✗ {}", msg)))
    }

    /// Format a header.
    pub fn format_header(&self, title: &str) -> String {
        format!("{}", self.header.apply_to(title))
    }
}

/// Check if colors should be enabled.
pub fn should_use_colors() -> bool {
    // https://no-color.org/
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    console::Term::stdout().is_term()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn theme_formats_success() {
        let msg = LintTheme::plain().format_success("No issues found");
        assert_eq!(msg, "✓ No issues found");
    }

    #[test]
    fn theme_formats_warning() {
        let msg = LintTheme::plain().format_warning("No view files found");
        assert!(msg.contains("⚠"));
        assert!(msg.contains("No view files found"));
    }

    #[test]
    fn theme_formats_error() {
        let msg = LintTheme::plain().format_error("Failed");
        assert!(msg.contains("✗"));
        assert!(msg.contains("Failed"));
    }

    #[test]
    fn plain_header_is_unstyled() {
        assert_eq!(LintTheme::plain().format_header("view.json"), "view.json");
    }
}
