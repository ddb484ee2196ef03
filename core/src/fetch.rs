use anyhow::{anyhow, Context, Result};
use lazy_static::lazy_static;
use regex::Regex;
use std::io::{Read, Write};
use std::net::TcpStream;
use std::time::Duration;
use url::Url;

/// Port used when the URL does not carry one. For web servers, port 80.
pub const DEFAULT_PORT: u16 = 80;

/// Give up on servers that stall mid-response.
const READ_TIMEOUT: Duration = Duration::from_secs(10);

lazy_static! {
    // Opening anchor tags only: never </a>, never <link>.
    static ref ANCHOR: Regex = Regex::new(r"(?is)<a\b[^>]*>").expect("valid regex");
    static ref HREF: Regex = Regex::new(r#"(?is)href\s*=\s*"([^"]*)""#).expect("valid regex");
}

/// Crafts the minimal literal HTTP/1.1 request for a URL.
pub fn craft_request(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    let resource = if url.path().is_empty() { "/" } else { url.path() };
    match url.query() {
        Some(query) => format!(
            "GET {resource}?{query} HTTP/1.1\r\nHost: {host}\r\nConnection: close\r\n\r\n"
        ),
        None => format!("GET {resource} HTTP/1.1\r\nHost: {host}\r\nConnection: close\r\n\r\n"),
    }
}

/// Fetches a URL over a raw socket and returns the body, or `None` when the
/// response is not HTML. Redirects are not followed and only the
/// `Content-Type` header is inspected.
pub fn fetch_html(url: &Url) -> Result<Option<String>> {
    let host = url
        .host_str()
        .ok_or_else(|| anyhow!("url has no host: {url}"))?;
    let port = url.port().unwrap_or(DEFAULT_PORT);

    let mut stream =
        TcpStream::connect((host, port)).with_context(|| format!("connect to {host}:{port}"))?;
    stream.set_read_timeout(Some(READ_TIMEOUT))?;
    stream.write_all(craft_request(url).as_bytes())?;

    let mut raw = Vec::new();
    stream
        .read_to_end(&mut raw)
        .with_context(|| format!("read response from {url}"))?;

    let response = String::from_utf8_lossy(&raw);
    Ok(parse_response(&response).map(str::to_string))
}

/// Splits the header block from the body at the first blank line and returns
/// the body only when the `Content-Type` header says this is HTML.
pub fn parse_response(response: &str) -> Option<&str> {
    let (head, body) = response
        .split_once("\r\n\r\n")
        .or_else(|| response.split_once("\n\n"))?;

    let content_type = head.lines().find_map(|line| {
        let (name, value) = line.split_once(':')?;
        name.trim()
            .eq_ignore_ascii_case("content-type")
            .then(|| value.trim())
    })?;

    content_type
        .to_lowercase()
        .contains("html")
        .then_some(body)
}

/// Lists the links found in the href attributes of opening anchor tags,
/// resolved against the page's own URL with fragments stripped. Candidates
/// that fail to resolve or have no host are discarded.
pub fn list_links(page: &Url, html: &str) -> Vec<Url> {
    let mut links = Vec::new();
    for tag in ANCHOR.find_iter(html) {
        let Some(capture) = HREF.captures(tag.as_str()) else {
            continue;
        };
        let href = capture[1].trim();
        if href.is_empty() {
            continue;
        }
        let Ok(mut resolved) = page.join(href) else {
            tracing::debug!(href, "skipping malformed link");
            continue;
        };
        resolved.set_fragment(None);
        if resolved.host().is_none() {
            continue;
        }
        links.push(resolved);
    }
    links
}

/// Whether a URL plausibly names an HTML resource: an `.html`/`.htm`
/// extension, or a final path segment with no extension at all.
pub fn looks_like_html(url: &Url) -> bool {
    let last = url.path().rsplit('/').next().unwrap_or_default();
    match last.rsplit_once('.') {
        Some((_, ext)) => ext.eq_ignore_ascii_case("html") || ext.eq_ignore_ascii_case("htm"),
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_is_literal_http11() {
        let url = Url::parse("http://example.com/docs/page.html").unwrap();
        assert_eq!(
            craft_request(&url),
            "GET /docs/page.html HTTP/1.1\r\nHost: example.com\r\nConnection: close\r\n\r\n"
        );
    }

    #[test]
    fn response_body_requires_html_content_type() {
        let html = "HTTP/1.1 200 OK\r\nContent-Type: text/html; charset=utf-8\r\n\r\n<p>hi</p>";
        assert_eq!(parse_response(html), Some("<p>hi</p>"));

        let json = "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\n\r\n{}";
        assert_eq!(parse_response(json), None);

        let missing = "HTTP/1.1 200 OK\r\n\r\n<p>hi</p>";
        assert_eq!(parse_response(missing), None);
    }

    #[test]
    fn links_come_from_opening_anchors_only() {
        let page = Url::parse("http://example.com/a/index.html").unwrap();
        let html = concat!(
            r#"<a href="one.html">one</a>"#,
            r#"<link href="style.css">"#,
            r#"<A HREF="/two.htm#frag">two</A>"#,
            r#"<a name="no-href">none</a>"#,
        );
        let links = list_links(&page, html);
        let listed: Vec<String> = links.iter().map(|u| u.to_string()).collect();
        assert_eq!(
            listed,
            vec![
                "http://example.com/a/one.html".to_string(),
                "http://example.com/two.htm".to_string(),
            ]
        );
    }

    #[test]
    fn html_resource_check_uses_extension() {
        let yes = ["http://h.test/a.html", "http://h.test/b.HTM", "http://h.test/dir/"];
        let no = ["http://h.test/img.png", "http://h.test/data.json"];
        for u in yes {
            assert!(looks_like_html(&Url::parse(u).unwrap()), "{u}");
        }
        for u in no {
            assert!(!looks_like_html(&Url::parse(u).unwrap()), "{u}");
        }
    }
}
