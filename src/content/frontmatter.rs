//! Front-matter parsing

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Accepts any scalar and keeps its textual form.
///
/// YAML happily types `date: 2024-01-15` or `title: 1984` as something other
/// than a string; the blog only ever wants the text back.
fn scalar_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::{self, Visitor};
    use std::fmt;

    struct ScalarString;

    impl<'de> Visitor<'de> for ScalarString {
        type Value = Option<String>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string, number or boolean")
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
            Ok(Some(value.to_string()))
        }

        fn visit_string<E: de::Error>(self, value: String) -> Result<Self::Value, E> {
            Ok(Some(value))
        }

        fn visit_bool<E: de::Error>(self, value: bool) -> Result<Self::Value, E> {
            Ok(Some(value.to_string()))
        }

        fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
            Ok(Some(value.to_string()))
        }

        fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
            Ok(Some(value.to_string()))
        }

        fn visit_f64<E: de::Error>(self, value: f64) -> Result<Self::Value, E> {
            Ok(Some(value.to_string()))
        }

        fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }
    }

    deserializer.deserialize_any(ScalarString)
}

/// Front-matter data from a post
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrontMatter {
    #[serde(deserialize_with = "scalar_string", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(deserialize_with = "scalar_string", skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(deserialize_with = "scalar_string", skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,

    /// Additional custom fields
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl FrontMatter {
    /// Split a leading metadata block from the body.
    ///
    /// Returns `Ok((None, content))` when the text carries no block at all, so
    /// the body is the full input. A block that is present but cannot be
    /// decoded is an error; callers decide whether that is fatal.
    pub fn split(content: &str) -> Result<(Option<Self>, &str), String> {
        let trimmed = content.trim_start();

        if trimmed.starts_with("---") {
            return Self::split_yaml(content, trimmed);
        }

        if trimmed.starts_with(";;;") || trimmed.starts_with('{') {
            return Self::split_json(trimmed).map(|(fm, body)| (Some(fm), body));
        }

        Ok((None, content))
    }

    fn split_yaml<'a>(original: &'a str, trimmed: &'a str) -> Result<(Option<Self>, &'a str), String> {
        // Drop the opening fence's line ending only, so a closing fence on
        // the very next line still counts
        let after_fence = &trimmed[3..];
        let rest = after_fence
            .strip_prefix("\r\n")
            .or_else(|| after_fence.strip_prefix('\n'))
            .unwrap_or(after_fence);

        let (yaml_content, after_close) = if let Some(after) = rest.strip_prefix("---") {
            ("", after)
        } else {
            match rest.find("\n---") {
                Some(end_pos) => (&rest[..end_pos], &rest[end_pos + 4..]),
                None => return Ok((None, original)),
            }
        };
        let remaining = after_close.trim_start_matches(['\n', '\r']);

        if yaml_content.trim().is_empty() {
            return Ok((Some(Self::default()), remaining));
        }

        // A `---` rule followed by prose is a thematic break, not metadata
        if !yaml_content.lines().any(looks_like_key_value) {
            return Ok((None, original));
        }

        serde_yaml::from_str::<FrontMatter>(yaml_content)
            .map(|fm| (Some(fm), remaining))
            .map_err(|e| e.to_string())
    }

    fn split_json(content: &str) -> Result<(Self, &str), String> {
        if let Some(rest) = content.strip_prefix(";;;") {
            let end_pos = rest
                .find(";;;")
                .ok_or_else(|| "unterminated ;;; block".to_string())?;
            let json_content = rest[..end_pos].trim();
            let remaining = rest[end_pos + 3..].trim_start_matches(['\n', '\r']);
            let json_content = if json_content.starts_with('{') {
                json_content.to_string()
            } else {
                format!("{{{}}}", json_content)
            };
            let fm = serde_json::from_str(&json_content).map_err(|e| e.to_string())?;
            return Ok((fm, remaining));
        }

        let mut depth = 0usize;
        let mut in_string = false;
        let mut escaped = false;
        for (i, c) in content.char_indices() {
            if in_string {
                match c {
                    _ if escaped => escaped = false,
                    '\\' => escaped = true,
                    '"' => in_string = false,
                    _ => {}
                }
                continue;
            }
            match c {
                '"' => in_string = true,
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        let fm = serde_json::from_str(&content[..=i]).map_err(|e| e.to_string())?;
                        let remaining = content[i + 1..].trim_start_matches(['\n', '\r']);
                        return Ok((fm, remaining));
                    }
                }
                _ => {}
            }
        }

        Err("unterminated JSON front-matter".to_string())
    }

    /// Render the metadata as a YAML block, delimiters included
    pub fn to_block(&self) -> String {
        let yaml = serde_yaml::to_string(self).unwrap_or_default();
        let yaml = if yaml.trim() == "{}" { "" } else { yaml.as_str() };
        format!("---\n{}---\n", yaml)
    }

    /// Parse the date string into a DateTime
    pub fn parse_date(&self) -> Option<DateTime<Local>> {
        self.date.as_deref().and_then(parse_date_string)
    }
}

/// `key: value` or `key:` with a plain identifier key; URLs don't count
fn looks_like_key_value(line: &str) -> bool {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return false;
    }

    let Some(colon_pos) = trimmed.find(':') else {
        return false;
    };
    let key = &trimmed[..colon_pos];
    let valid_key = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        && !matches!(key, "http" | "https" | "ftp");
    let after = &trimmed[colon_pos + 1..];

    valid_key && (after.is_empty() || after.starts_with(' '))
}

/// Parse a date string in the formats posts commonly use
pub(crate) fn parse_date_string(s: &str) -> Option<DateTime<Local>> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Local));
    }

    const DATETIME_FORMATS: [&str; 5] = [
        "%Y-%m-%d %H:%M:%S",
        "%Y/%m/%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
    ];
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Local.from_local_datetime(&dt).earliest();
        }
    }

    for fmt in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Local.from_local_datetime(&d.and_hms_opt(0, 0, 0)?).earliest();
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_yaml_frontmatter() {
        let content = r#"---
title: Understanding Modern Software Development
date: 2024-01-15
---

# Intro

This is the content.
"#;

        let (fm, body) = FrontMatter::split(content).unwrap();
        let fm = fm.unwrap();
        assert_eq!(
            fm.title.as_deref(),
            Some("Understanding Modern Software Development")
        );
        assert_eq!(fm.date.as_deref(), Some("2024-01-15"));
        assert!(body.starts_with("# Intro"));
    }

    #[test]
    fn test_missing_block_keeps_full_body() {
        let content = "# Just a heading\n\nNo metadata here.\n";
        let (fm, body) = FrontMatter::split(content).unwrap();
        assert!(fm.is_none());
        assert_eq!(body, content);
    }

    #[test]
    fn test_round_trip_title_and_date() {
        let original = FrontMatter {
            title: Some("Rust: the \"good\" parts".to_string()),
            date: Some("2024-03-01 09:15:00".to_string()),
            ..Default::default()
        };
        let text = format!("{}\nBody text.\n", original.to_block());

        let (parsed, body) = FrontMatter::split(&text).unwrap();
        let parsed = parsed.unwrap();
        assert_eq!(parsed.title, original.title);
        assert_eq!(parsed.date, original.date);
        assert_eq!(body, "Body text.\n");
    }

    #[test]
    fn test_numeric_scalars_kept_as_text() {
        let content = "---\ntitle: 1984\ndate: 2024\n---\nbody";
        let (fm, _) = FrontMatter::split(content).unwrap();
        let fm = fm.unwrap();
        assert_eq!(fm.title.as_deref(), Some("1984"));
        assert_eq!(fm.date.as_deref(), Some("2024"));
    }

    #[test]
    fn test_extra_fields_preserved() {
        let content = "---\ntitle: Hi\nmood: hoppy\n---\nbody";
        let (fm, _) = FrontMatter::split(content).unwrap();
        let fm = fm.unwrap();
        assert_eq!(
            fm.extra.get("mood").and_then(|v| v.as_str()),
            Some("hoppy")
        );
    }

    #[test]
    fn test_parse_json_frontmatter() {
        let content = r#"{"title": "Test {Post}", "date": "2024-01-15"}

This is content.
"#;

        let (fm, body) = FrontMatter::split(content).unwrap();
        let fm = fm.unwrap();
        assert_eq!(fm.title.as_deref(), Some("Test {Post}"));
        assert!(body.starts_with("This is content."));
    }

    #[test]
    fn test_parse_fenced_json_frontmatter() {
        let content = ";;;\n\"title\": \"Fenced\",\n\"date\": \"2024-02-02\"\n;;;\nBody";
        let (fm, body) = FrontMatter::split(content).unwrap();
        assert_eq!(fm.unwrap().title.as_deref(), Some("Fenced"));
        assert_eq!(body, "Body");
    }

    #[test]
    fn test_malformed_yaml_is_an_error() {
        let content = "---\ntitle: [unclosed\n---\nbody";
        assert!(FrontMatter::split(content).is_err());
    }

    #[test]
    fn test_empty_block() {
        let (fm, body) = FrontMatter::split("---\n---\nBody\n").unwrap();
        assert_eq!(fm, Some(FrontMatter::default()));
        assert_eq!(body, "Body\n");

        let block = FrontMatter::default().to_block();
        assert_eq!(block, "---\n---\n");
        let (fm, body) = FrontMatter::split(&block).unwrap();
        assert_eq!(fm, Some(FrontMatter::default()));
        assert_eq!(body, "");

        let (fm, body) = FrontMatter::split("---\n\n---\nBody").unwrap();
        assert_eq!(fm, Some(FrontMatter::default()));
        assert_eq!(body, "Body");
    }

    #[test]
    fn test_markdown_separator_not_yaml() {
        let content = r#"
---

Check out https://example.com/path and a list:
- Item 1
- Item 2

---
More content here.
"#;

        let (fm, body) = FrontMatter::split(content).unwrap();
        assert!(fm.is_none());
        assert!(body.contains("https://example.com"));
    }

    #[test]
    fn test_parse_date() {
        let fm = FrontMatter {
            date: Some("2024-01-15 10:30:00".to_string()),
            ..Default::default()
        };
        let dt = fm.parse_date().unwrap();
        assert_eq!(dt.format("%Y-%m-%d %H:%M").to_string(), "2024-01-15 10:30");

        let fm = FrontMatter {
            date: Some("2024/01/15".to_string()),
            ..Default::default()
        };
        assert_eq!(
            fm.parse_date().unwrap().format("%Y-%m-%d").to_string(),
            "2024-01-15"
        );

        let fm = FrontMatter {
            date: Some("last tuesday".to_string()),
            ..Default::default()
        };
        assert!(fm.parse_date().is_none());
    }
}
