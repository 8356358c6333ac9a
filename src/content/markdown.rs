//! Markdown rendering with syntax highlighting

use anyhow::Result;
use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd};
use syntect::highlighting::{Theme, ThemeSet};
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;

use crate::config::HighlightConfig;

/// Markdown renderer with syntax highlighting
pub struct MarkdownRenderer {
    syntax_set: SyntaxSet,
    theme: Option<Theme>,
    line_numbers: bool,
}

impl MarkdownRenderer {
    /// Create a new markdown renderer with default highlighting
    pub fn new() -> Self {
        Self::with_config(&HighlightConfig::default())
    }

    /// Create a renderer from the site's highlight settings
    pub fn with_config(config: &HighlightConfig) -> Self {
        let theme = if config.enable {
            let mut theme_set = ThemeSet::load_defaults();
            theme_set.themes.remove(&config.theme).or_else(|| {
                tracing::warn!(
                    "Unknown highlight theme {:?}, using base16-ocean.dark",
                    config.theme
                );
                theme_set.themes.remove("base16-ocean.dark")
            })
        } else {
            None
        };

        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme,
            line_numbers: config.line_number,
        }
    }

    /// Render markdown to HTML
    pub fn render(&self, markdown: &str) -> Result<String> {
        // Front-matter is split off before we get here, so no metadata blocks
        let options = Options::ENABLE_TABLES
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_SMART_PUNCTUATION
            | Options::ENABLE_HEADING_ATTRIBUTES
            | Options::ENABLE_GFM;
        let parser = Parser::new_ext(markdown, options);

        let mut events: Vec<Event> = Vec::new();
        let mut code_block: Option<(Option<String>, String)> = None;

        for event in parser {
            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    let lang = match kind {
                        CodeBlockKind::Fenced(info) => info
                            .split_whitespace()
                            .next()
                            .map(|lang| lang.to_string()),
                        CodeBlockKind::Indented => None,
                    };
                    code_block = Some((lang, String::new()));
                }
                Event::End(TagEnd::CodeBlock) => {
                    if let Some((lang, code)) = code_block.take() {
                        let highlighted = self.highlight_code(&code, lang.as_deref());
                        events.push(Event::Html(CowStr::from(highlighted)));
                    }
                }
                Event::Text(text) => match code_block.as_mut() {
                    Some((_, code)) => code.push_str(&text),
                    None => events.push(Event::Text(text)),
                },
                other => events.push(other),
            }
        }

        let mut html_output = String::new();
        html::push_html(&mut html_output, events.into_iter());

        Ok(html_output)
    }

    /// Highlight a code block
    fn highlight_code(&self, code: &str, lang: Option<&str>) -> String {
        let lang = lang.unwrap_or("text");

        let Some(theme) = &self.theme else {
            return plain_code_block(code, lang);
        };

        let syntax = self
            .syntax_set
            .find_syntax_by_token(lang)
            .or_else(|| self.syntax_set.find_syntax_by_extension(lang))
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        match highlighted_html_for_string(code, &self.syntax_set, syntax, theme) {
            Ok(highlighted) if self.line_numbers => add_line_numbers(code, &highlighted, lang),
            Ok(highlighted) => format!(r#"<figure class="highlight {}">{}</figure>"#, lang, highlighted),
            Err(e) => {
                tracing::debug!("Highlighting {} failed: {}", lang, e);
                plain_code_block(code, lang)
            }
        }
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Put highlighted HTML next to a gutter numbering the source lines of `code`
fn add_line_numbers(code: &str, highlighted: &str, lang: &str) -> String {
    let gutter = (1..=code.lines().count())
        .map(|n| format!(r#"<span class="line-number">{}</span>"#, n))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"<figure class="highlight {}"><table><tr><td class="gutter"><pre>{}</pre></td><td class="code">{}</td></tr></table></figure>"#,
        lang, gutter, highlighted
    )
}

fn plain_code_block(code: &str, lang: &str) -> String {
    format!(
        r#"<pre><code class="language-{}">{}</code></pre>"#,
        lang,
        html_escape::encode_text(code)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_heading_and_emphasis() {
        let renderer = MarkdownRenderer::new();
        let html = renderer
            .render("# Hello World\n\nSome *emphasis* and **strong** text.")
            .unwrap();
        assert!(html.contains("<h1>Hello World</h1>"));
        assert!(html.contains("<em>emphasis</em>"));
        assert!(html.contains("<strong>strong</strong>"));
    }

    #[test]
    fn test_render_code_block() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("```rust\nfn main() {}\n```").unwrap();
        assert!(html.contains("highlight rust"));
        assert!(!html.contains("```"));
    }

    #[test]
    fn test_render_code_block_with_line_numbers() {
        let renderer = MarkdownRenderer::with_config(&HighlightConfig {
            line_number: true,
            ..Default::default()
        });
        let html = renderer.render("```rust\nlet a = 1;\nlet b = 2;\n```").unwrap();
        assert!(html.contains(r#"<span class="line-number">2</span>"#));
        assert!(!html.contains(r#"line-number">3<"#));
        assert_eq!(html.matches(r#"class="line-number""#).count(), 2);
        assert!(html.contains(r#"<td class="code"><pre style="#));
    }

    #[test]
    fn test_render_without_highlighting_escapes() {
        let renderer = MarkdownRenderer::with_config(&HighlightConfig {
            enable: false,
            ..Default::default()
        });
        let html = renderer.render("```html\n<b>hi</b>\n```").unwrap();
        assert!(html.contains(r#"<pre><code class="language-html">&lt;b&gt;hi&lt;/b&gt;"#));
    }

    #[test]
    fn test_render_table() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("| a | b |\n|---|---|\n| 1 | 2 |\n").unwrap();
        assert!(html.contains("<table>"));
        assert!(html.contains("<td>1</td>"));
    }
}
