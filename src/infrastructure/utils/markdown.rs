use ammonia::{Builder, UrlRelative};
use once_cell::sync::Lazy;
use pulldown_cmark::{html, Options, Parser};
use regex::Regex;

static TAG_RE: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"(?s)<[^>]*>").ok());

/// Converts Markdown content to sanitized HTML.
pub fn safe_markdown_to_html(markdown: &str) -> String {
    let options = Options::all();
    let parser = Parser::new_ext(markdown, options);

    let mut raw_html = String::with_capacity(markdown.len() * 2);
    html::push_html(&mut raw_html, parser);

    sanitize_html(&raw_html)
}

pub fn sanitize_html(content: &str) -> String {
    Builder::default()
        .link_rel(Some("nofollow noopener noreferrer"))
        .url_relative(UrlRelative::PassThrough)
        .clean(content)
        .to_string()
}

/// Drops markup, keeping the text between tags.
pub fn strip_html(html: &str) -> String {
    match TAG_RE.as_ref() {
        Some(re) => re.replace_all(html, " ").into_owned(),
        None => ammonia::Builder::empty().clean(html).to_string(),
    }
}

/// Words in an HTML fragment after removing its tags.
pub fn word_count(html: &str) -> usize {
    strip_html(html).split_whitespace().count()
}
