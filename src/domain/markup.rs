//! Inline markup for free-text entry fields.
//!
//! Backticks delimit inline code. Each delimiter flips a two-state automaton and
//! is replaced by the matching tag; spans never nest.

use super::entries::ErrorEntry;

pub const CODE_DELIMITER: char = '`';
pub const CODE_OPEN_TAG: &str = "<code>";
pub const CODE_CLOSE_TAG: &str = "</code>";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CodeSpan {
    Closed,
    Open,
}

impl CodeSpan {
    /// The single transition: consume one delimiter, emit one tag.
    fn on_delimiter(self) -> (Self, &'static str) {
        match self {
            CodeSpan::Closed => (CodeSpan::Open, CODE_OPEN_TAG),
            CodeSpan::Open => (CodeSpan::Closed, CODE_CLOSE_TAG),
        }
    }
}

/// Replace backtick pairs with `<code>` tags.
///
/// An odd number of delimiters ends in the `Open` state and leaves the final
/// `<code>` unterminated; nothing is rebalanced.
pub fn render_inline_code(text: &str) -> String {
    let mut rendered = String::with_capacity(text.len());
    let mut state = CodeSpan::Closed;

    for ch in text.chars() {
        if ch == CODE_DELIMITER {
            let (next, tag) = state.on_delimiter();
            rendered.push_str(tag);
            state = next;
        } else {
            rendered.push(ch);
        }
    }

    rendered
}

/// Copy of `entry` with inline code rendered in `context`, `explanation` and
/// `solution`. Title, tags and dates pass through untouched.
pub fn render_entry_fields(entry: &ErrorEntry) -> ErrorEntry {
    ErrorEntry {
        context: render_inline_code(&entry.context),
        explanation: render_inline_code(&entry.explanation),
        solution: render_inline_code(&entry.solution),
        ..entry.clone()
    }
}
