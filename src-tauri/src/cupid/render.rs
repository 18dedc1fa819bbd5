use pulldown_cmark::{html, Options, Parser};

/// Renders model markdown to HTML that is safe to assign to `innerHTML`.
///
/// Tables, strikethrough and `$...$` math are enabled. Math comes out as
/// `<span class="math math-inline">` / `math-display` for the window to
/// typeset. Raw HTML and script-capable URLs from the model are removed.
pub fn markdown_to_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_MATH);

    let mut raw = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut raw, Parser::new_ext(markdown, options));

    ammonia::Builder::default()
        .add_tag_attributes("span", &["class"])
        .clean(&raw)
        .to_string()
}
