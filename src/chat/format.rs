/// Column at which posted messages are wrapped.
const WRAP_WIDTH: usize = 70;

/// Renders a posted message the way it appears in an actor's history window.
///
/// The `User {name} posted:` header keeps the model from mistaking earlier
/// posts for part of its own prompt. Blank messages collapse to a
/// `<{name} said nothing>` marker.
pub fn format_chat_message(username: &str, message: &str) -> String {
    if message.trim().is_empty() {
        return format!("<{username} said nothing>");
    }
    let wrapped = textwrap::fill(message, WRAP_WIDTH);
    format!("User {username} posted:\n{wrapped}")
}

#[cfg(test)]
mod tests {
    use super::format_chat_message;

    #[test]
    fn prefixes_speaker() {
        assert_eq!(
            format_chat_message("alice", "hello there"),
            "User alice posted:\nhello there"
        );
    }

    #[test]
    fn blank_message_becomes_marker() {
        assert_eq!(format_chat_message("bob", "  \n "), "<bob said nothing>");
        assert_eq!(format_chat_message("bob", ""), "<bob said nothing>");
    }

    #[test]
    fn long_message_is_wrapped() {
        let message = "word ".repeat(40);
        let formatted = format_chat_message("carol", message.trim_end());
        for line in formatted.lines().skip(1) {
            assert!(line.chars().count() <= 70, "line too long: {line:?}");
        }
        assert!(formatted.lines().count() > 2);
    }
}
