use std::collections::HashSet;

/// Length of a derived excerpt, in characters.
pub const EXCERPT_CHARS: usize = 160;

/// Clean HTML content using the ammonia library.
///
/// Whitelist-based: safe tags (like <b>, <p>) stay, dangerous tags (like <script>, <iframe>)
/// and event-handler attributes are removed. Applied to article bodies before they are stored.
pub fn clean_html(input: &str) -> String {
    ammonia::clean(input)
}

/// Plain-text excerpt of an HTML body: tags stripped, whitespace collapsed,
/// cut to `EXCERPT_CHARS` characters with an ellipsis when shortened.
pub fn excerpt_from_html(html: &str) -> String {
    let text = strip_tags(html);
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");

    if collapsed.chars().count() <= EXCERPT_CHARS {
        return collapsed;
    }
    let mut cut: String = collapsed.chars().take(EXCERPT_CHARS).collect();
    cut.push('…');
    cut
}

/// Removes every tag, keeping the text content. Script and style bodies are dropped.
fn strip_tags(html: &str) -> String {
    let stripped = ammonia::Builder::default()
        .tags(HashSet::new())
        .clean(html)
        .to_string();
    decode_entities(&stripped)
}

/// ammonia escapes text it emits; an excerpt is plain text, so undo the common entities.
fn decode_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}
