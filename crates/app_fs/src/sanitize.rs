//! Export file name sanitization

/// Characters that would split a name into path components
const SEPARATOR_CHARS: &[char] = &['/', ':'];

/// Replace `/` and `:` with `_`.
///
/// Nothing else is touched: names are otherwise written exactly as the
/// catalog reports them.
pub fn sanitize_export_name(name: &str) -> String {
    name.chars()
        .map(|c| if SEPARATOR_CHARS.contains(&c) { '_' } else { c })
        .collect()
}

/// Check that a name can be used as a single path component
pub fn is_valid_component(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.chars().any(|c| SEPARATOR_CHARS.contains(&c) || c == '\\' || c == '\0')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_separators() {
        assert_eq!(sanitize_export_name("icons/arrow:left"), "icons_arrow_left");
        assert_eq!(sanitize_export_name("a//b"), "a__b");
    }

    #[test]
    fn test_sanitize_leaves_other_chars() {
        assert_eq!(sanitize_export_name("Icon @2x *?"), "Icon @2x *?");
        assert_eq!(sanitize_export_name("颜色"), "颜色");
        assert_eq!(sanitize_export_name(""), "");
    }

    #[test]
    fn test_is_valid_component() {
        assert!(is_valid_component("AppIcon"));
        assert!(!is_valid_component("a/b"));
        assert!(!is_valid_component(".."));
        assert!(!is_valid_component(""));
    }
}
