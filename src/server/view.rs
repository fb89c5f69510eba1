//! Root view rendered on initial loads.
//!
//! The page object is embedded as an HTML attribute on the app mount point,
//! where the client bundle picks it up:
//!
//! ```html
//! <div id="app" data-page="{&quot;component&quot;:...}"></div>
//! ```
//!
//! Templates recognise two placeholders:
//!
//! | Placeholder | Replaced with |
//! |-------------|---------------|
//! | `@inertia` | the complete `<div id="app" data-page="...">` element |
//! | `{{ page }}` | the attribute-escaped page JSON only |

use crate::error::{InertiaError, Result};
use crate::types::Page;
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;

const DEFAULT_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
</head>
<body>
    @inertia
    <script type="module" src="{{ entry_script }}"></script>
</body>
</html>
"#;

fn placeholder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"@inertia|\{\{\s*page\s*\}\}")
            .unwrap_or_else(|_| unreachable!("static pattern is valid"))
    })
}

/// A loaded root template.
#[derive(Clone, Debug)]
pub struct RootView {
    template: String,
}

impl RootView {
    /// Use `template` as the root view.
    ///
    /// # Errors
    ///
    /// Rejects templates with no placeholder, since the client could never boot.
    pub fn new(template: impl Into<String>) -> Result<Self> {
        let template = template.into();
        if !placeholder_pattern().is_match(&template) {
            return Err(InertiaError::Template(
                "root view contains neither @inertia nor {{ page }}".into(),
            ));
        }
        Ok(Self { template })
    }

    /// Built-in document loading `entry_script`.
    #[must_use]
    pub fn builtin(entry_script: &str) -> Self {
        Self {
            template: DEFAULT_TEMPLATE
                .replace("{{ entry_script }}", &escape_attribute(entry_script)),
        }
    }

    /// Load a template file.
    pub fn load(path: &Path) -> Result<Self> {
        let template = std::fs::read_to_string(path).map_err(|e| {
            InertiaError::Template(format!("unable to read {}: {e}", path.display()))
        })?;
        Self::new(template)
    }

    /// Render the document for `page`.
    pub fn render(&self, page: &Page) -> Result<String> {
        let data = escape_attribute(&page.to_json()?);
        let mount = format!(r#"<div id="app" data-page="{data}"></div>"#);

        // Single pass, so placeholder text inside props is never expanded.
        Ok(placeholder_pattern()
            .replace_all(&self.template, |caps: &regex::Captures<'_>| {
                if &caps[0] == "@inertia" {
                    mount.clone()
                } else {
                    data.clone()
                }
            })
            .into_owned())
    }
}

/// Escape a string for use inside a double-quoted HTML attribute.
#[must_use]
pub fn escape_attribute(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + value.len() / 8);
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Reverse of [`escape_attribute`], for tests and tooling that read pages back out.
#[must_use]
pub fn unescape_attribute(value: &str) -> String {
    value
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn page() -> Page {
        let props = json!({"appName": "Demo", "html": "<b>\"x\" & 'y'</b>"});
        Page::new(
            "Users/Index",
            props.as_object().cloned().unwrap(),
            "/users",
            "v1",
        )
    }

    #[test]
    fn test_builtin_embeds_page_and_script() {
        let html = RootView::builtin("/build/app.js").render(&page()).unwrap();
        assert!(html.contains(r#"<div id="app" data-page=""#));
        assert!(html.contains(r#"src="/build/app.js""#));
        assert!(!html.contains("@inertia"));
    }

    #[test]
    fn test_attribute_is_escaped() {
        let html = RootView::builtin("/app.js").render(&page()).unwrap();
        let start = html.find("data-page=\"").unwrap() + "data-page=\"".len();
        let end = start + html[start..].find('"').unwrap();
        let attr = &html[start..end];
        assert!(!attr.contains('<'));

        let decoded: Page = serde_json::from_str(&unescape_attribute(attr)).unwrap();
        assert_eq!(decoded, page());
    }

    #[test]
    fn test_page_placeholder() {
        let view = RootView::new(r#"<main data-page="{{page}}"></main>"#).unwrap();
        let html = view.render(&page()).unwrap();
        assert!(html.starts_with(r#"<main data-page="{&quot;component&quot;"#));
    }

    #[test]
    fn test_dollar_signs_survive() {
        let props = json!({"price": "$1 $2"});
        let page = Page::new("P", props.as_object().cloned().unwrap(), "/", "v");
        let view = RootView::new("{{ page }}").unwrap();
        assert!(view.render(&page).unwrap().contains("$1 $2"));
    }

    #[test]
    fn test_placeholder_text_in_props_not_expanded() {
        let props = json!({"note": "{{ page }} @inertia"});
        let page = Page::new("P", props.as_object().cloned().unwrap(), "/", "v");
        let html = RootView::builtin("/app.js").render(&page).unwrap();
        assert_eq!(html.matches("data-page=").count(), 1);
        assert!(html.contains("{{ page }} @inertia"));
    }

    #[test]
    fn test_template_without_placeholder_rejected() {
        assert!(matches!(
            RootView::new("<html></html>"),
            Err(InertiaError::Template(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        assert!(RootView::load(Path::new("/nonexistent/root.html")).is_err());
    }
}
