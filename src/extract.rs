//! Featured image and subtitle extraction from post description fragments.
//!
//! Medium emits two description shapes:
//!
//! - Public posts: the article body, typically opening with `<h3>` (title)
//!   followed by `<h4>` (subtitle), or with the `<h4>` directly.
//! - Member-only posts: a preview wrapped in `.medium-feed-snippet`.
//!
//! The subtitle heuristic checks the member-only snippet first, then the
//! two public shapes.

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Node, Selector};

static IMAGE: Lazy<Selector> = Lazy::new(|| Selector::parse("img").expect("static selector"));
static MEMBER_SNIPPET: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".medium-feed-snippet").expect("static selector"));

/// `src` of the first image in the fragment.
///
/// ```rust
/// use medium_embed::extract_featured_image;
///
/// let html = r#"<figure><img src="https://cdn-images-1.medium.com/a.png"></figure><img src="b.png">"#;
/// assert_eq!(
///     extract_featured_image(html).as_deref(),
///     Some("https://cdn-images-1.medium.com/a.png")
/// );
/// assert_eq!(extract_featured_image("<p>no images</p>"), None);
/// ```
pub fn extract_featured_image(fragment: &str) -> Option<String> {
    let html = Html::parse_fragment(fragment);
    let image = html.select(&IMAGE).next()?;
    image
        .value()
        .attr("src")
        .map(str::trim)
        .filter(|src| !src.is_empty())
        .map(str::to_string)
}

/// Subtitle of a post, or an empty string when none is recognisable.
///
/// Fallback order:
/// 1. text of the first `.medium-feed-snippet` element
/// 2. the first child, when it is a sub-heading (`h4`)
/// 3. the second child, when it is a sub-heading following a heading (`h1`-`h3`)
///
/// Children are elements and non-blank text; whitespace and comments
/// between tags are skipped. Leading text is a child that is no heading.
pub fn extract_subtitle(fragment: &str) -> String {
    let html = Html::parse_fragment(fragment);

    if let Some(snippet) = html.select(&MEMBER_SNIPPET).next() {
        return text_of(snippet);
    }

    let mut children = html.root_element().children().filter(|node| match node.value() {
        Node::Element(_) => true,
        Node::Text(text) => !text.trim().is_empty(),
        _ => false,
    });
    let first = children.next().and_then(ElementRef::wrap);
    let second = children.next().and_then(ElementRef::wrap);

    match (first, second) {
        (Some(first), _) if is_subheading(first) => text_of(first),
        (Some(first), Some(second)) if is_heading(first) && is_subheading(second) => {
            text_of(second)
        }
        _ => String::new(),
    }
}

fn is_heading(element: ElementRef<'_>) -> bool {
    matches!(element.value().name(), "h1" | "h2" | "h3")
}

fn is_subheading(element: ElementRef<'_>) -> bool {
    element.value().name() == "h4"
}

fn text_of(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}
