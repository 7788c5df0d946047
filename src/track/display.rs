/// Decode the handful of HTML entities the search backend leaves in titles.
///
/// `&amp;` is handled last so `&amp;quot;` decodes to `&quot;`, not `"`.
pub fn decode_html_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    s.replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#039;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}
