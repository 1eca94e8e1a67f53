/// Whether `s` is already wrapped in double quotes.
pub fn is_quoted(s: &str) -> bool {
    s.len() >= 2 && s.starts_with('"') && s.ends_with('"')
}

/// Wrap `s` in double quotes unless it already is. Inner quotes are escaped
/// so the joined command line splits back into the same token.
pub fn add_quotes_if_necessary(s: &str) -> String {
    if s.is_empty() || is_quoted(s) {
        return s.to_string();
    }
    format!("\"{}\"", s.replace('"', "\\\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quotes_plain() {
        assert_eq!(add_quotes_if_necessary("a b.txt"), "\"a b.txt\"");
    }

    #[test]
    fn test_already_quoted_untouched() {
        assert_eq!(add_quotes_if_necessary("\"a b.txt\""), "\"a b.txt\"");
    }

    #[test]
    fn test_empty_untouched() {
        assert_eq!(add_quotes_if_necessary(""), "");
    }

    #[test]
    fn test_lone_quote_is_not_quoted() {
        assert!(!is_quoted("\""));
        assert_eq!(add_quotes_if_necessary("\""), "\"\\\"\"");
    }

    #[test]
    fn test_inner_quotes_escaped() {
        assert_eq!(add_quotes_if_necessary("say \"hi\" now"), "\"say \\\"hi\\\" now\"");
    }
}
