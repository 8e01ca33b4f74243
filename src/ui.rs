use colored::Colorize;
use declarative::Value;

/// Print an info message
pub fn info(msg: &str) {
    println!("{} {}", "ℹ".blue(), msg);
}

/// Print a success message
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print a warning message
pub fn warn(msg: &str) {
    println!("{} {}", "⚠".yellow(), msg);
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Print a dim/muted message
pub fn dim(msg: &str) {
    println!("  {}", msg.dimmed());
}

/// Print a header/title
pub fn header(title: &str) {
    println!();
    println!("{}", title.bold());
    println!("{}", "─".repeat(title.chars().count()).dimmed());
}

/// Print a section header
pub fn section(title: &str) {
    println!();
    println!("{}", title.cyan().bold());
}

/// Print a key-value pair
pub fn kv(key: &str, value: &str) {
    println!("  {}: {}", key.dimmed(), value);
}

// ============================================================================
// Value Formatting
// ============================================================================

/// Placeholder for values that only exist once resources are applied
pub const KNOWN_AFTER_APPLY: &str = "(known after apply)";

/// Render an attribute value for display.
///
/// Anything that depends on another resource is unknown until apply.
pub fn format_value(value: &Value) -> String {
    if value.is_literal() {
        value.to_string()
    } else {
        KNOWN_AFTER_APPLY.to_string()
    }
}

/// "1 resource", "3 resources"
pub fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{count} {noun}")
    } else {
        format!("{count} {noun}s")
    }
}

/// Shorten a value for one-line display
pub fn truncate(text: &str, max_len: usize) -> String {
    if text.chars().count() <= max_len {
        text.to_string()
    } else if max_len <= 3 {
        ".".repeat(max_len)
    } else {
        let kept: String = text.chars().take(max_len - 3).collect();
        format!("{kept}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use declarative::Reference;

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(&Value::String("t3.micro".into())), "\"t3.micro\"");
        assert_eq!(format_value(&Value::Integer(8)), "8");
        assert_eq!(
            format_value(&Value::Reference(Reference::parse("instance.web.public_ip").unwrap())),
            KNOWN_AFTER_APPLY
        );
        let list = Value::List(vec![
            Value::String("a".into()),
            Value::Reference(Reference::parse("subnet.a.id").unwrap()),
        ]);
        assert_eq!(format_value(&list), KNOWN_AFTER_APPLY);
    }

    #[test]
    fn test_plural() {
        assert_eq!(plural(1, "resource"), "1 resource");
        assert_eq!(plural(0, "resource"), "0 resources");
        assert_eq!(plural(12, "wave"), "12 waves");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a/very/long/value", 10), "a/very/...");
        assert_eq!(truncate("abcdef", 3), "...");
    }
}
