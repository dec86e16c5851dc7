//! Meeting join-link parsing.
//!
//! Join links carry the numeric meeting id in a `/j/<digits>` path segment,
//! optionally followed by a `?pwd=` passcode parameter which is ignored here.

use std::sync::LazyLock;

use regex::Regex;

/// Regex capturing the numeric meeting id from a join link.
static JOIN_LINK_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/j/(\d+)").expect("valid join link regex"));

/// Extracts the numeric meeting id from a join link.
///
/// Returns `None` when the link has no `/j/<digits>` segment. A trailing
/// passcode query parameter does not affect the result.
///
/// # Example
///
/// ```
/// use meetbook_core::links::extract_meeting_id;
///
/// let id = extract_meeting_id("https://zoom.us/j/1234567890?pwd=abc");
/// assert_eq!(id.as_deref(), Some("1234567890"));
/// ```
pub fn extract_meeting_id(link: &str) -> Option<String> {
    JOIN_LINK_REGEX
        .captures(link)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_plain_join_link() {
        assert_eq!(
            extract_meeting_id("https://zoom.us/j/1234567890").as_deref(),
            Some("1234567890")
        );
    }

    #[test]
    fn ignores_passcode_parameter() {
        assert_eq!(
            extract_meeting_id("https://zoom.us/j/1234567890?pwd=abc").as_deref(),
            Some("1234567890")
        );
    }

    #[test]
    fn handles_subdomain_links() {
        assert_eq!(
            extract_meeting_id("https://company.zoom.us/j/987654321").as_deref(),
            Some("987654321")
        );
    }

    #[test]
    fn rejects_links_without_join_segment() {
        assert_eq!(extract_meeting_id("https://zoom.us/my/room"), None);
        assert_eq!(extract_meeting_id("not a link"), None);
        assert_eq!(extract_meeting_id(""), None);
    }

    #[test]
    fn rejects_non_numeric_ids() {
        assert_eq!(extract_meeting_id("https://zoom.us/j/abcdef"), None);
    }
}
