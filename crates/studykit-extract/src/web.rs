//! Web page content extraction

use crate::{
    body::{read_limited, LimitedBody},
    config::ExtractorConfig,
    detect::ContentType,
    error::Result,
    text::{collapse_whitespace, normalize_whitespace, truncate_with_marker},
    ExtractError, ExtractedContent, Extractor,
};
use once_cell::sync::Lazy;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE};
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use std::fmt;
use std::time::Duration;
use tracing::{debug, info};

/// Containers that usually wrap the main text, most specific first
const CONTENT_SELECTORS: &[&str] = &[
    "article",
    "[role='main']",
    "main",
    ".post-content",
    ".entry-content",
    ".article-content",
    ".article-body",
    ".story-body",
    ".content",
    "#content",
    "#main-content",
];

/// Elements that never carry article text
const SKIP_TAGS: &[&str] = &[
    "script", "style", "noscript", "nav", "header", "footer", "aside", "form", "iframe", "svg",
    "template", "button",
];

/// Class / id tokens marking ads, sidebars and similar page furniture
const NOISE_TOKENS: &[&str] = &[
    "ad",
    "ads",
    "promo",
    "sponsored",
    "social-share",
    "share-buttons",
    "cookie-banner",
    "cookie-notice",
    "newsletter",
    "related-posts",
    "comments",
    "breadcrumb",
    "breadcrumbs",
    "popup",
    "modal",
];

const NOISE_ROLES: &[&str] = &["navigation", "banner", "contentinfo", "complementary"];

const BLOCK_TAGS: &[&str] = &[
    "p", "div", "br", "li", "ul", "ol", "h1", "h2", "h3", "h4", "h5", "h6", "tr", "table",
    "blockquote", "pre", "section", "article", "main", "hr", "figcaption", "dd", "dt",
];

static CANDIDATES: Lazy<Vec<(&'static str, Selector)>> = Lazy::new(|| {
    CONTENT_SELECTORS
        .iter()
        .map(|s| (*s, Selector::parse(s).unwrap()))
        .collect()
});
static TITLE: Lazy<Selector> = Lazy::new(|| Selector::parse("title").unwrap());
static DESCRIPTION: Lazy<Selector> =
    Lazy::new(|| Selector::parse("meta[name='description']").unwrap());
static PARAGRAPH: Lazy<Selector> = Lazy::new(|| Selector::parse("p").unwrap());
static BODY: Lazy<Selector> = Lazy::new(|| Selector::parse("body").unwrap());

/// How the page text was found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// A content container matched
    Selector(&'static str),
    /// Long paragraphs collected from the whole page
    Paragraphs,
    /// Everything in `<body>`; may include boilerplate
    Body,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Selector(s) => write!(f, "selector:{s}"),
            Strategy::Paragraphs => f.write_str("paragraphs"),
            Strategy::Body => f.write_str("body"),
        }
    }
}

/// Readable text pulled out of an HTML document, before length checks
#[derive(Debug, Clone)]
pub struct PageText {
    /// Normalized text
    pub text: String,
    /// Contents of `<title>`
    pub title: Option<String>,
    /// `<meta name="description">`
    pub description: Option<String>,
    /// Which strategy produced the text
    pub strategy: Strategy,
}

/// Web page content extractor
pub struct WebExtractor {
    config: ExtractorConfig,
    client: Client,
}

impl WebExtractor {
    /// Create a new web extractor with the given configuration
    pub fn new(config: ExtractorConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.timeout_secs))
            .redirect(if config.follow_redirects {
                reqwest::redirect::Policy::limited(config.max_redirects)
            } else {
                reqwest::redirect::Policy::none()
            })
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| ExtractError::Other(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { config, client })
    }

    /// Fetch a page body, refusing anything over the byte limit
    async fn fetch(&self, url: &url::Url) -> Result<LimitedBody> {
        let timeout = self.config.timeout_secs;
        let response = self
            .client
            .get(url.as_str())
            .header(ACCEPT, "text/html,application/xhtml+xml;q=0.9,*/*;q=0.8")
            .header(ACCEPT_LANGUAGE, "en-US,en;q=0.9")
            .send()
            .await
            .map_err(|e| ExtractError::from_reqwest(e, timeout))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExtractError::from_status(
                status.as_u16(),
                status.canonical_reason().unwrap_or("unexpected status"),
            ));
        }

        read_limited(response, self.config.max_body_bytes, timeout).await
    }
}

#[async_trait::async_trait]
impl Extractor for WebExtractor {
    async fn extract(&self, source: &str) -> Result<ExtractedContent> {
        let source = source.trim();
        let url = url::Url::parse(source)
            .map_err(|e| ExtractError::InvalidUrl(format!("{source} ({e})")))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ExtractError::InvalidUrl(format!(
                "{source} (only http and https links are supported)"
            )));
        }

        let body = self.fetch(&url).await?;
        let html = body.text();
        let original_length = html.chars().count();

        let page = extract_from_html(&html, &self.config);
        let length = page.text.chars().count();
        if length < self.config.min_content_chars {
            debug!(url = %url, length, strategy = %page.strategy, "Page text too short");
            return Err(ExtractError::NoMeaningfulContent);
        }

        let (text, truncated) = truncate_with_marker(&page.text, self.config.max_length);
        info!(
            url = %url,
            strategy = %page.strategy,
            original_length,
            text_length = length,
            truncated,
            "Extracted page text"
        );

        let mut result = ExtractedContent::new(text, ContentType::Url, source)
            .with_original_length(original_length)
            .with_truncated(truncated)
            .with_metadata("strategy", page.strategy.to_string());

        if let Some(ct) = body.content_type {
            result = result.with_metadata("content_type", ct);
        }
        if let Some(description) = page.description {
            result = result.with_metadata("description", description);
        }
        if let Some(title) = page.title {
            result = result.with_title(title);
        }

        Ok(result)
    }
}

/// Pull readable text out of an HTML document.
///
/// Tries the content containers in order and takes the first one whose text is
/// longer than `min_selector_chars`. Otherwise collects paragraphs longer than
/// `min_paragraph_chars`, and if even that yields less than
/// `min_fallback_chars`, takes the whole body.
pub fn extract_from_html(html: &str, config: &ExtractorConfig) -> PageText {
    let document = Html::parse_document(html);

    let title = document
        .select(&TITLE)
        .next()
        .map(|el| collapse_whitespace(&el.text().collect::<String>()))
        .filter(|t| !t.is_empty());

    let description = document
        .select(&DESCRIPTION)
        .next()
        .and_then(|el| el.value().attr("content"))
        .map(collapse_whitespace)
        .filter(|d| !d.is_empty());

    let (text, strategy) = from_containers(&document, config.min_selector_chars)
        .or_else(|| from_paragraphs(&document, config))
        .unwrap_or_else(|| (from_body(&document), Strategy::Body));

    PageText {
        text,
        title,
        description,
        strategy,
    }
}

fn from_containers(document: &Html, min_chars: usize) -> Option<(String, Strategy)> {
    for (name, selector) in CANDIDATES.iter() {
        for element in document.select(selector) {
            if in_noise(&element) {
                continue;
            }
            let text = normalize_whitespace(&element_text(&element));
            if text.chars().count() > min_chars {
                return Some((text, Strategy::Selector(*name)));
            }
        }
    }
    None
}

fn from_paragraphs(document: &Html, config: &ExtractorConfig) -> Option<(String, Strategy)> {
    let paragraphs: Vec<String> = document
        .select(&PARAGRAPH)
        .filter(|p| !in_noise(p))
        .map(|p| collapse_whitespace(&element_text(&p)))
        .filter(|p| p.chars().count() > config.min_paragraph_chars)
        .collect();

    let text = paragraphs.join("\n\n");
    (text.chars().count() >= config.min_fallback_chars).then_some((text, Strategy::Paragraphs))
}

fn from_body(document: &Html) -> String {
    let root = document
        .select(&BODY)
        .next()
        .unwrap_or_else(|| document.root_element());
    normalize_whitespace(&element_text(&root))
}

/// Text of an element, skipping page furniture, with a line break after blocks
fn element_text(element: &ElementRef) -> String {
    let mut text = String::new();
    collect_text(element, &mut text);
    text
}

fn collect_text(element: &ElementRef, out: &mut String) {
    for child in element.children() {
        if let Some(child_element) = ElementRef::wrap(child) {
            if is_noise(&child_element) {
                continue;
            }
            collect_text(&child_element, out);
            if BLOCK_TAGS.contains(&child_element.value().name()) {
                out.push('\n');
            }
        } else if let Some(text_node) = child.value().as_text() {
            out.push_str(text_node);
        }
    }
}

/// The element or one of its ancestors is page furniture
fn in_noise(element: &ElementRef) -> bool {
    is_noise(element) || element.ancestors().filter_map(ElementRef::wrap).any(|a| is_noise(&a))
}

fn is_noise(element: &ElementRef) -> bool {
    let value = element.value();
    if SKIP_TAGS.contains(&value.name()) {
        return true;
    }
    if value
        .attr("role")
        .is_some_and(|role| NOISE_ROLES.contains(&role.to_ascii_lowercase().as_str()))
    {
        return true;
    }
    value.classes().any(is_noise_token) || value.id().is_some_and(is_noise_token)
}

fn is_noise_token(token: &str) -> bool {
    let token = token.to_ascii_lowercase();
    NOISE_TOKENS.contains(&token.as_str())
        || token.starts_with("ad-")
        || token.contains("advert")
        || token.contains("sidebar")
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARTICLE_TEXT: &str = "The mitochondrion is the powerhouse of the cell. \
        It produces most of the chemical energy needed to power biochemical reactions. \
        Chemical energy produced by the mitochondria is stored in a small molecule \
        called adenosine triphosphate.";

    fn config() -> ExtractorConfig {
        ExtractorConfig::default()
    }

    #[test]
    fn test_article_wins() {
        let html = format!(
            r#"<html><head><title> Cell  Biology </title></head><body>
            <nav>Home | About | Contact</nav>
            <article>
                <script>alert('ignore me')</script>
                <p>{ARTICLE_TEXT}</p>
                <footer>Copyright 2024</footer>
            </article>
            <footer>Site footer</footer>
            </body></html>"#
        );

        let page = extract_from_html(&html, &config());
        assert_eq!(page.strategy, Strategy::Selector("article"));
        assert_eq!(page.text, ARTICLE_TEXT);
        assert_eq!(page.title.as_deref(), Some("Cell Biology"));
    }

    #[test]
    fn test_short_container_is_skipped() {
        let html = format!(
            r#"<body><article>Too short.</article>
            <div class="post-content"><p>{ARTICLE_TEXT}</p></div></body>"#
        );
        let page = extract_from_html(&html, &config());
        assert_eq!(page.strategy, Strategy::Selector(".post-content"));
        assert!(page.text.starts_with("The mitochondrion"));
    }

    #[test]
    fn test_noise_inside_container_is_dropped() {
        let html = format!(
            r#"<body><main>
            <div class="ad-banner">Buy now! Limited offer for new customers today only.</div>
            <div id="sidebar-left">Popular posts</div>
            <section role="complementary">Related</section>
            <p>{ARTICLE_TEXT}</p>
            <div class="comments">First!</div>
            </main></body>"#
        );
        let page = extract_from_html(&html, &config());
        assert_eq!(page.strategy, Strategy::Selector("main"));
        assert_eq!(page.text, ARTICLE_TEXT);
    }

    #[test]
    fn test_container_inside_sidebar_is_ignored() {
        let filler = "Sidebar text that should never be used as the article body. ".repeat(5);
        let html = format!(
            r#"<body><aside><div class="content">{filler}</div></aside>
            <div id="content"><p>{ARTICLE_TEXT}</p></div></body>"#
        );
        let page = extract_from_html(&html, &config());
        assert_eq!(page.strategy, Strategy::Selector("#content"));
    }

    #[test]
    fn test_paragraph_fallback() {
        let html = r#"<body><div>
            <p>Short one.</p>
            <p>Volcanoes form where tectonic plates diverge or converge beneath the crust.</p>
            <p>Magma that reaches the surface is called lava and cools into igneous rock.</p>
            </div></body>"#;
        let page = extract_from_html(html, &config());
        assert_eq!(page.strategy, Strategy::Paragraphs);
        assert_eq!(
            page.text,
            "Volcanoes form where tectonic plates diverge or converge beneath the crust.\n\n\
             Magma that reaches the surface is called lava and cools into igneous rock."
        );
    }

    #[test]
    fn test_body_fallback() {
        let html = "<body><span>Just a few words</span><script>x()</script></body>";
        let page = extract_from_html(html, &config());
        assert_eq!(page.strategy, Strategy::Body);
        assert_eq!(page.text, "Just a few words");
    }

    #[test]
    fn test_description() {
        let html = r#"<head><meta name="description" content=" A page  about cells "></head>"#;
        let page = extract_from_html(html, &config());
        assert_eq!(page.description.as_deref(), Some("A page about cells"));
        assert!(page.title.is_none());
    }

    #[test]
    fn test_noise_tokens() {
        assert!(is_noise_token("ad"));
        assert!(is_noise_token("ADS"));
        assert!(is_noise_token("ad-slot"));
        assert!(is_noise_token("advertisement"));
        assert!(is_noise_token("right-sidebar"));
        assert!(is_noise_token("cookie-banner"));
        assert!(!is_noise_token("header-image"));
        assert!(!is_noise_token("lead"));
        assert!(!is_noise_token("download"));
    }

    #[tokio::test]
    async fn test_rejects_non_http_scheme() {
        let extractor = WebExtractor::new(config()).unwrap();
        let err = extractor.extract("ftp://example.com/file").await.unwrap_err();
        assert!(matches!(err, ExtractError::InvalidUrl(_)));

        let err = extractor.extract("not a url").await.unwrap_err();
        assert!(matches!(err, ExtractError::InvalidUrl(_)));
    }
}
