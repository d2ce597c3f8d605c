//! Vertical list: optional image beside the text block.

use super::{
    image_html, link_html, subtitle_html, title_html, LayoutTemplate, PostView, RenderedMarkup,
    POST_CLASS,
};
use crate::config::EmbedConfig;

pub struct DefaultLayout;

impl LayoutTemplate for DefaultLayout {
    fn name(&self) -> &'static str {
        "default"
    }

    fn render_posts(&self, posts: &[PostView], _config: &EmbedConfig) -> RenderedMarkup {
        let items: String = posts.iter().map(render_item).collect();
        RenderedMarkup::new(format!(
            "    <ul class=\"list-none p-0\">\n{items}    </ul>\n"
        ))
    }
}

fn render_item(view: &PostView) -> String {
    let mut html = format!("      <li class=\"{POST_CLASS} mb-6 flex gap-4\">\n");

    if let Some(image) = image_html(view, "w-32 h-24 object-cover rounded flex-shrink-0") {
        html.push_str(&format!("        {image}\n"));
    }

    html.push_str("        <div class=\"flex-1 min-w-0\">\n");
    let fields = [
        title_html(view, "font-semibold text-lg mb-2"),
        subtitle_html(view, "text-gray-600 mb-2"),
        view.byline()
            .map(|byline| format!(r#"<p class="text-gray-600 text-sm">{byline}</p>"#)),
        Some(link_html(view, "Read more", "text-blue-600 hover:underline text-sm")),
    ];
    for field in fields.into_iter().flatten() {
        html.push_str(&format!("          {field}\n"));
    }
    html.push_str("        </div>\n      </li>\n");

    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Visibility;
    use crate::render::tests::{config, sample_post};
    use crate::render::Layout;

    #[test]
    fn renders_list_items() {
        let views: Vec<PostView> = (1..=2)
            .map(|i| PostView::from_post(&sample_post(i), &config(Layout::Default, Visibility::ALL)))
            .collect();
        let html = DefaultLayout
            .render_posts(&views, &config(Layout::Default, Visibility::ALL))
            .into_string();

        assert!(html.starts_with("    <ul class=\"list-none p-0\">"));
        assert_eq!(html.matches("<li ").count(), 2);
        assert!(html.contains("Ada Author - Mar 4, 2024"));
        assert!(html.contains(">Read more</a>"));
    }

    #[test]
    fn image_comes_before_text_block() {
        let view = PostView::from_post(&sample_post(1), &config(Layout::Default, Visibility::ALL));
        let html = render_item(&view);
        let image = html.find("<img").unwrap();
        let text = html.find("<div class=\"flex-1").unwrap();
        assert!(image < text);
    }
}
