/// Splits a runtime message into whitespace separated arguments.
pub fn split_args(message: &str) -> Vec<&str> { message.split_whitespace().collect() }

/// Splits a delimited list, trimming every item. Empty items are kept so that
/// `"1,,2"` reports the missing value instead of silently skipping it.
pub fn split_list(list: &str, delimiter: char) -> Vec<&str> {
    if list.trim().is_empty() {
        return Vec::new();
    }
    list.split(delimiter).map(str::trim).collect()
}

/// Removes one leading and one trailing quote character, if present.
pub fn strip_quotes(value: &str) -> &str {
    let is_quote = |c: char| c == '"' || c == '\'';
    let value = value.strip_prefix(is_quote).unwrap_or(value);
    value.strip_suffix(is_quote).unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_args_collapses_whitespace() {
        assert_eq!(split_args("  adjustweight   exact 2 "), vec!["adjustweight", "exact", "2"]);
        assert!(split_args("   ").is_empty());
    }

    #[test]
    fn split_list_trims_items() {
        assert_eq!(split_list("1, 2 ,3", ','), vec!["1", "2", "3"]);
    }

    #[test]
    fn split_list_keeps_empty_items() {
        assert_eq!(split_list("1,,2", ','), vec!["1", "", "2"]);
    }

    #[test]
    fn split_list_of_blank_string_is_empty() {
        assert!(split_list("", ',').is_empty());
        assert!(split_list("  ", ',').is_empty());
    }

    #[test]
    fn strip_quotes_removes_one_pair() {
        assert_eq!(strip_quotes("\"2,1\""), "2,1");
        assert_eq!(strip_quotes("'2,1'"), "2,1");
        assert_eq!(strip_quotes("\"\"x\"\""), "\"x\"");
        assert_eq!(strip_quotes("2,1"), "2,1");
    }
}
