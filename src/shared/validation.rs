use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Regex for validating slugs
    /// Must be lowercase alphanumeric with single hyphens between words
    /// - Valid: "bien-etre", "article-2", "general"
    /// - Invalid: "-post", "post-", "post--name", "Post", "post_name"
    pub static ref SLUG_REGEX: Regex = Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").unwrap();

    /// Regex for optional phone numbers on the contact form
    /// - Valid: "+33 6 12 34 56 78", "(555) 123-4567", "0612345678"
    /// - Invalid: "12345", "06-AB-34", "phone"
    pub static ref PHONE_REGEX: Regex = Regex::new(r"^\+?[0-9\s\-()]{10,20}$").unwrap();

    /// Regex for `#RRGGBB` category colours
    pub static ref HEX_COLOR_REGEX: Regex = Regex::new(r"^#[0-9A-Fa-f]{6}$").unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug_regex_valid() {
        assert!(SLUG_REGEX.is_match("bien-etre"));
        assert!(SLUG_REGEX.is_match("article-2"));
        assert!(SLUG_REGEX.is_match("a"));
    }

    #[test]
    fn test_slug_regex_invalid() {
        assert!(!SLUG_REGEX.is_match("-post")); // starts with hyphen
        assert!(!SLUG_REGEX.is_match("post-")); // ends with hyphen
        assert!(!SLUG_REGEX.is_match("post--name")); // double hyphen
        assert!(!SLUG_REGEX.is_match("Post")); // uppercase
        assert!(!SLUG_REGEX.is_match("")); // empty
    }

    #[test]
    fn test_phone_regex() {
        assert!(PHONE_REGEX.is_match("+33 6 12 34 56 78"));
        assert!(PHONE_REGEX.is_match("(555) 123-4567"));
        assert!(PHONE_REGEX.is_match("0612345678"));
        assert!(!PHONE_REGEX.is_match("12345"));
        assert!(!PHONE_REGEX.is_match("06-AB-34-56-78"));
    }

    #[test]
    fn test_hex_color_regex() {
        assert!(HEX_COLOR_REGEX.is_match("#3B82F6"));
        assert!(HEX_COLOR_REGEX.is_match("#10b981"));
        assert!(!HEX_COLOR_REGEX.is_match("3B82F6"));
        assert!(!HEX_COLOR_REGEX.is_match("#FFF"));
    }
}
