//! UTF-8-safe string helpers for log output

use std::borrow::Cow;

use super::constants::SQL_LOG_PREVIEW_CHARS;

/// Safely truncate a string to a maximum number of CHARACTERS (not bytes).
///
/// Respects UTF-8 character boundaries and never panics on multi-byte input.
///
/// # Examples
/// ```
/// # use kodegen_tools_dbfeed::utils::string_utils::safe_truncate_chars;
/// assert_eq!(safe_truncate_chars("Hello, World!", 5), "Hello");
/// assert_eq!(safe_truncate_chars("ğüş", 2), "ğü");
/// assert_eq!(safe_truncate_chars("Hi", 100), "Hi");
/// ```
#[inline]
#[must_use]
pub fn safe_truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        None => s,
        Some((byte_idx, _)) => &s[..byte_idx],
    }
}

/// Single-line, length-capped rendering of a SQL statement for log lines
///
/// # Examples
/// ```
/// # use kodegen_tools_dbfeed::utils::string_utils::sql_preview;
/// assert_eq!(sql_preview("select id\n  from docs"), "select id from docs");
/// ```
#[must_use]
pub fn sql_preview(sql: &str) -> Cow<'_, str> {
    let single_line = sql.split_whitespace().collect::<Vec<_>>().join(" ");
    let truncated = safe_truncate_chars(&single_line, SQL_LOG_PREVIEW_CHARS);
    if truncated.len() == single_line.len() {
        if single_line == sql {
            Cow::Borrowed(sql)
        } else {
            Cow::Owned(single_line)
        }
    } else {
        Cow::Owned(format!("{truncated}…"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_sql_is_capped() {
        let sql = format!("select {} from t", "x, ".repeat(200));
        let preview = sql_preview(&sql);
        assert_eq!(preview.chars().count(), SQL_LOG_PREVIEW_CHARS + 1);
        assert!(preview.ends_with('…'));
    }

    #[test]
    fn short_single_line_sql_is_borrowed() {
        assert!(matches!(sql_preview("select 1"), Cow::Borrowed(_)));
    }
}
