//! Common type definitions.
//!
//! Entity ids are PostgreSQL `SERIAL` columns, so they are plain `i32` aliases rather than
//! newtypes.

// Type aliases for IDs
pub type UserId = i32;
pub type BmiRecordId = i32;

/// Parse an id taken from a URL path segment. Only strictly positive integers are ids.
pub fn parse_id(raw: &str) -> Option<i32> {
    raw.trim().parse::<i32>().ok().filter(|id| *id > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("42"), Some(42));
        assert_eq!(parse_id(" 7 "), Some(7));
        assert_eq!(parse_id("0"), None);
        assert_eq!(parse_id("-3"), None);
        assert_eq!(parse_id("abc"), None);
        assert_eq!(parse_id("1.5"), None);
        assert_eq!(parse_id("99999999999"), None);
    }
}
