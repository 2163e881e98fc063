use std::sync::Arc;

use pulldown_cmark::{Options, Parser, html};

/// Markdown-to-safe-HTML boundary. Swappable on the catalog via
/// [`crate::Catalog::with_readme_compiler`]; the default is
/// [`compile_readme`].
pub type ReadmeCompiler = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Render a raw markdown readme to sanitized HTML.
///
/// The sanitizer allow-lists headings and images on top of its default safe
/// tag set; anything else (scripts, event handlers, inline styles) is
/// stripped.
pub fn compile_readme(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);

    let parser = Parser::new_ext(markdown, options);
    let mut raw_html = String::new();
    html::push_html(&mut raw_html, parser);

    ammonia::Builder::default()
        .add_tags(["h1", "h2", "img"])
        .add_tag_attributes("img", ["src", "alt"])
        .clean(&raw_html)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_headings_and_emphasis() {
        let html = compile_readme("# Title\n\nsome **bold** text");
        assert!(html.contains("<h1>Title</h1>"));
        assert!(html.contains("<strong>bold</strong>"));
    }

    #[test]
    fn strips_script_tags() {
        let html = compile_readme("hello\n\n<script>alert(1)</script>");
        assert!(!html.contains("<script"));
        assert!(!html.contains("alert(1)"));
        assert!(html.contains("hello"));
    }

    #[test]
    fn keeps_images() {
        let html = compile_readme("![logo](https://registry.test/icon.png)");
        assert!(html.contains("<img"));
        assert!(html.contains("https://registry.test/icon.png"));
    }

    #[test]
    fn renders_strikethrough() {
        let html = compile_readme("~~gone~~");
        assert!(html.contains("<del>gone</del>"));
    }
}
