use scraper::Html;

/// Turn an HTML-encoded string (`&quot;`, `&#039;`, `&eacute;`...) into plain text.
///
/// Any tags are dropped; only text content survives.
#[must_use]
pub fn decode_entities(raw: &str) -> String {
    if !raw.contains('&') && !raw.contains('<') {
        return raw.to_owned();
    }
    let fragment = Html::parse_fragment(raw);
    fragment.root_element().text().collect::<String>()
}
