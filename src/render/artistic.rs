//! Artistic layout: a rotated date stamp beside the image, with a call to
//! action per post.

use super::{
    escape_html, image_html, link_html, subtitle_html, title_html, LayoutTemplate, PostView,
    RenderedMarkup, POST_CLASS,
};
use crate::config::EmbedConfig;

pub struct ArtisticLayout;

impl LayoutTemplate for ArtisticLayout {
    fn name(&self) -> &'static str {
        "artistic"
    }

    fn container_class(&self) -> &'static str {
        "max-w-3xl mx-auto"
    }

    fn render_posts(&self, posts: &[PostView], _config: &EmbedConfig) -> RenderedMarkup {
        let items: String = posts.iter().map(render_item).collect();
        RenderedMarkup::new(format!("    <div class=\"space-y-12\">\n{items}    </div>\n"))
    }
}

fn render_item(view: &PostView) -> String {
    let mut html = format!("      <article class=\"{POST_CLASS} flex items-stretch gap-6\">\n");

    if let Some(date) = &view.date {
        html.push_str(&format!(
            "        <div class=\"flex items-center w-8\"><span class=\"block -rotate-90 whitespace-nowrap text-xs uppercase tracking-widest text-gray-500\">{}</span></div>\n",
            escape_html(date)
        ));
    }

    if let Some(image) = image_html(view, "w-48 h-48 object-cover rounded-lg shadow-lg flex-shrink-0") {
        html.push_str(&format!("        {image}\n"));
    }

    html.push_str("        <div class=\"flex-1 flex flex-col justify-center\">\n");
    let fields = [
        title_html(view, "font-serif text-2xl mb-2"),
        subtitle_html(view, "italic text-gray-600 mb-2"),
        view.author.as_ref().map(|author| {
            format!(
                r#"<p class="text-sm text-gray-500">by {}</p>"#,
                escape_html(author)
            )
        }),
        Some(link_html(
            view,
            "Read article",
            "self-start mt-4 px-4 py-2 border border-gray-900 text-xs uppercase tracking-widest hover:bg-gray-900 hover:text-white transition-colors",
        )),
    ];
    for field in fields.into_iter().flatten() {
        html.push_str(&format!("          {field}\n"));
    }
    html.push_str("        </div>\n      </article>\n");

    html
}
