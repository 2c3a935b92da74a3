use html2text::render::TrivialDecorator;
use log::warn;

// html2text hard-wraps runs longer than the width and the wrap then collapses into a space,
// so an unbroken word (a long URL) longer than this gets split in two.
const RENDER_WIDTH: usize = 65_536;

/// Strips all markup from `html`, decoding entities, and returns the text on a single line.
///
/// The trivial decorator adds nothing of its own: no link brackets, list bullets, quote
/// markers or heading hashes.
pub fn extract_text(html: &str) -> String {
    if html.trim().is_empty() {
        return String::new();
    }
    let rendered = html2text::config::with_decorator(TrivialDecorator::new())
        .string_from_read(html.as_bytes(), RENDER_WIDTH);
    match rendered {
        Ok(text) => collapse_whitespace(&text),
        Err(err) => {
            warn!("could not parse activity HTML, dropping it: {}", err);
            String::new()
        }
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::extract_text;

    #[test]
    fn strips_nested_tags() {
        assert_eq!(extract_text("<p>Hi <b>there</b></p>"), "Hi there");
    }

    #[test]
    fn empty_input_is_empty() {
        assert_eq!(extract_text(""), "");
        assert_eq!(extract_text("   "), "");
    }

    #[test]
    fn decodes_entities() {
        assert_eq!(extract_text("Tom &amp; Jerry &lt;3"), "Tom & Jerry <3");
    }

    #[test]
    fn plain_text_passes_through() {
        assert_eq!(extract_text("just words"), "just words");
    }

    #[test]
    fn paragraphs_join_on_one_line() {
        assert_eq!(
            extract_text("<p>first</p>\n<p>second</p>"),
            "first second"
        );
    }

    #[test]
    fn linked_member_name_has_no_brackets() {
        let title = r#"<a href="https://social.example/members/alice/">alice</a> posted an update"#;
        assert_eq!(extract_text(title), "alice posted an update");
    }

    #[test]
    fn block_markup_leaves_no_markers() {
        assert_eq!(extract_text("<ul><li>one</li><li>two</li></ul>"), "one two");
        assert_eq!(extract_text("<blockquote>quoted</blockquote>"), "quoted");
        assert_eq!(extract_text("<h3>Heading</h3>text"), "Heading text");
    }

    #[test]
    fn long_unbroken_word_is_not_split() {
        let word = "x".repeat(5_000);
        let text = extract_text(&format!("<p>{}</p>", word));
        assert_eq!(text, word);
    }

    #[test]
    fn buddypress_title_markup() {
        let title = r#"<span class="activity-user">alice</span> posted an update&nbsp;"#;
        assert_eq!(extract_text(title), "alice posted an update");
    }
}
