//! Console output formatting
//!
//! Every user-facing line carries one of four prefixes so the kind of
//! message is visible at a glance. The helpers here only build strings;
//! printing is left to the caller.

/// Prompt printed before each line of input, on the same line
pub const PROMPT: &str = "portbind: ";

/// Formats a command response
pub fn response(context: &str) -> String {
    format!("(i) {}", context)
}

/// Formats an error message
pub fn error(context: &str) -> String {
    format!("(ERROR) {}", context)
}

/// Formats a warning message
pub fn warning(context: &str) -> String {
    format!("(WARN) {}", context)
}

/// Formats a status/config informative message
pub fn details(context: &str) -> String {
    format!("(INFO) {}", context)
}

/// Formats a syntax error, prefixed with the command that produced it
pub fn syntax_error(command: &str) -> String {
    error(&format!(
        "[{}] Invalid syntax. See \"help\" for command help.",
        command
    ))
}
