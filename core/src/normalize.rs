use lazy_static::lazy_static;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref COMMENTS: Regex = Regex::new(r"(?s)<!--.*?-->").expect("valid regex");
    static ref HEAD: Regex = element_regex("head");
    static ref STYLE: Regex = element_regex("style");
    static ref SCRIPT: Regex = element_regex("script");
    static ref TAGS: Regex = Regex::new(r"(?s)</?.*?>").expect("valid regex");
    static ref ENTITIES: Regex = Regex::new(r"&\S+?;").expect("valid regex");
    static ref NON_LETTERS: Regex = Regex::new(r"[^\p{L}\s]+").expect("valid regex");
    static ref SPACES: Regex = Regex::new(r"\s{2,}").expect("valid regex");
}

fn element_regex(name: &str) -> Regex {
    // The whole element is removed, open tag through close tag.
    Regex::new(&format!(r"(?is)<{name}.*?</{name}.*?>")).expect("valid regex")
}

/// Strips simple, validating HTML down to plain lower-cased words separated
/// by single spaces. Comments, the head/style/script elements, tags, and
/// entities each collapse to a space before the plain-text cleanup runs.
pub fn strip_html(html: &str) -> String {
    let text = COMMENTS.replace_all(html, " ");
    let text = HEAD.replace_all(&text, " ");
    let text = STYLE.replace_all(&text, " ");
    let text = SCRIPT.replace_all(&text, " ");
    let text = TAGS.replace_all(&text, " ");
    let text = ENTITIES.replace_all(&text, " ");
    clean_text(&text)
}

/// Normalizes one raw query line: punctuation and digits stripped,
/// whitespace collapsed, lower-cased, trimmed.
pub fn clean_query(line: &str) -> String {
    clean_text(line)
}

/// NFKC-normalizes, replaces everything that is not a letter or whitespace
/// with a space, collapses runs of whitespace, lower-cases, and trims.
fn clean_text(text: &str) -> String {
    let text: String = text.nfkc().collect();
    let text = NON_LETTERS.replace_all(&text, " ");
    let text = SPACES.replace_all(&text, " ");
    text.to_lowercase().trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_tags_and_entities() {
        let text = strip_html("<p>A<b>B</b>C</p> 2010&ndash;2012");
        assert_eq!(text, "a b c");
    }

    #[test]
    fn strips_script_and_comments() {
        let html = "<!-- hidden -->visible<script>var x = 1;</script> words";
        assert_eq!(strip_html(html), "visible words");
    }

    #[test]
    fn query_drops_punctuation_and_digits() {
        assert_eq!(clean_query("  Dog, 42 CAT!  "), "dog cat");
    }

    #[test]
    fn empty_input_stays_empty() {
        assert_eq!(strip_html("<html><head><title>x</title></head></html>"), "");
    }
}
