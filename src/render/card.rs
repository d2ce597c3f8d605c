//! Card grid: image on top, metadata below, `cards_per_row` columns.

use super::{
    image_html, link_html, subtitle_html, title_html, LayoutTemplate, PostView, RenderedMarkup,
    POST_CLASS,
};
use crate::config::EmbedConfig;

pub struct CardLayout;

impl LayoutTemplate for CardLayout {
    fn name(&self) -> &'static str {
        "card"
    }

    fn container_class(&self) -> &'static str {
        "max-w-5xl mx-auto"
    }

    fn render_posts(&self, posts: &[PostView], config: &EmbedConfig) -> RenderedMarkup {
        let columns = config.cards_per_row();
        let cards: String = posts.iter().map(render_card).collect();
        // Single column on narrow screens.
        RenderedMarkup::new(format!(
            "    <div class=\"grid grid-cols-1 sm:grid-cols-{columns} gap-6\">\n{cards}    </div>\n"
        ))
    }
}

fn render_card(view: &PostView) -> String {
    let mut html = format!(
        "      <article class=\"{POST_CLASS} flex flex-col border border-gray-200 rounded-lg overflow-hidden shadow-sm\">\n"
    );

    if let Some(image) = image_html(view, "w-full h-40 object-cover") {
        html.push_str(&format!("        {image}\n"));
    }

    html.push_str("        <div class=\"p-4 flex flex-col flex-1\">\n");
    let fields = [
        title_html(view, "font-semibold text-lg mb-2 leading-snug"),
        subtitle_html(view, "text-gray-600 text-sm mb-3"),
        view.byline()
            .map(|byline| format!(r#"<p class="text-gray-500 text-xs mt-auto">{byline}</p>"#)),
        Some(link_html(view, "Read more", "text-blue-600 hover:underline text-sm mt-2")),
    ];
    for field in fields.into_iter().flatten() {
        html.push_str(&format!("          {field}\n"));
    }
    html.push_str("        </div>\n      </article>\n");

    html
}
