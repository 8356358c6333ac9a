//! Built-in page templates using the Tera template engine
//!
//! The templates are embedded in the binary; a site needs nothing but its
//! config and content to render.

use anyhow::Result;
use serde::Serialize;
use std::collections::HashMap;
use tera::{Context, Tera};

use crate::content::parse_date_string;
use crate::helpers::format_date;

/// Template renderer with the embedded site templates
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a new renderer with all templates loaded
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("site/layout.html")),
            ("home.html", include_str!("site/home.html")),
            ("post.html", include_str!("site/post.html")),
            ("not_found.html", include_str!("site/not_found.html")),
        ])?;

        tera.register_filter("strip_html", strip_html_filter);
        tera.register_filter("date_format", date_format_filter);

        Ok(Self { tera })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }
}

/// Tera filter: strip HTML tags
fn strip_html_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("strip_html", "value", String, value);
    Ok(tera::Value::String(strip_html(&s)))
}

/// Tera filter: reformat a front-matter date string.
///
/// Strings that aren't a recognised date are passed through unchanged.
fn date_format_filter(
    value: &tera::Value,
    args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("date_format", "value", String, value);
    let format = match args.get("format") {
        Some(val) => tera::try_get_value!("date_format", "format", String, val),
        None => "YYYY-MM-DD".to_string(),
    };

    let formatted = match parse_date_string(&s) {
        Some(date) => format_date(&date, &format),
        None => s,
    };
    Ok(tera::Value::String(formatted))
}

/// Plain text of `html`: tags removed, entities decoded, whitespace collapsed
pub fn strip_html(html: &str) -> String {
    let mut result = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' => {
                in_tag = false;
                result.push(' ');
            }
            _ if !in_tag => result.push(c),
            _ => {}
        }
    }
    html_escape::decode_html_entities(&result)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

// Data structures for template context

/// A link to a post, as listed on the home page or in post navigation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostLink {
    pub id: u64,
    pub title: String,
    pub date: String,
    pub path: String,
}

/// Metadata of the post being rendered
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostData {
    pub id: u64,
    pub title: String,
    pub date: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_templates_load() {
        assert!(TemplateRenderer::new().is_ok());
    }

    #[test]
    fn test_strip_html() {
        assert_eq!(
            strip_html("<h1>Title</h1>\n<p>Some <em>text</em>.</p>"),
            "Title Some text ."
        );
        assert_eq!(
            strip_html("<p>Tom &amp; Jerry &lt;3 &quot;cheers&quot;</p>"),
            "Tom & Jerry <3 \"cheers\""
        );
    }

    #[test]
    fn test_date_format_filter() {
        let mut args = HashMap::new();
        args.insert(
            "format".to_string(),
            tera::Value::String("MMMM DD, YYYY".to_string()),
        );

        let value = tera::Value::String("2024-01-15".to_string());
        let out = date_format_filter(&value, &args).unwrap();
        assert_eq!(out, tera::Value::String("January 15, 2024".to_string()));

        let value = tera::Value::String("sometime".to_string());
        let out = date_format_filter(&value, &args).unwrap();
        assert_eq!(out, tera::Value::String("sometime".to_string()));
    }
}
