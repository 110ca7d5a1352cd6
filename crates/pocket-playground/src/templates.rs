//! Built-in template catalog.

#![allow(missing_docs)]

use serde::Serialize;

use crate::buffers::DocumentBuffers;

/// Immutable catalog entry used to seed a playground.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TemplateDescriptor {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub html: &'static str,
    pub css: &'static str,
    pub js: &'static str,
}

/// Catalog listing without buffer bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TemplateSummary {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

static CATALOG: [TemplateDescriptor; 3] = [
    TemplateDescriptor {
        id: "basic",
        name: "Basic HTML Template",
        description: "Simple HTML page with CSS and JS",
        html: include_str!("assets/basic/index.html"),
        css: include_str!("assets/basic/style.css"),
        js: include_str!("assets/basic/script.js"),
    },
    TemplateDescriptor {
        id: "card",
        name: "Card Layout",
        description: "Responsive card grid",
        html: include_str!("assets/card/index.html"),
        css: include_str!("assets/card/style.css"),
        js: include_str!("assets/card/script.js"),
    },
    TemplateDescriptor {
        id: "interactive",
        name: "Interactive Counter",
        description: "Counter with animations",
        html: include_str!("assets/interactive/index.html"),
        css: include_str!("assets/interactive/style.css"),
        js: include_str!("assets/interactive/script.js"),
    },
];

#[must_use]
pub fn catalog() -> &'static [TemplateDescriptor] {
    &CATALOG
}

/// Look up a template by exact id.
#[must_use]
pub fn find(id: &str) -> Option<&'static TemplateDescriptor> {
    CATALOG.iter().find(|template| template.id == id)
}

impl TemplateDescriptor {
    #[must_use]
    pub fn buffers(&self) -> DocumentBuffers {
        DocumentBuffers::new(self.html, self.css, self.js)
    }

    #[must_use]
    pub fn summary(&self) -> TemplateSummary {
        TemplateSummary {
            id: self.id,
            name: self.name,
            description: self.description,
        }
    }

    /// Single pasteable text holding all three parts.
    #[must_use]
    pub fn snippet(&self) -> String {
        format!(
            "<!-- {} -->\n{}\n\n<!-- CSS -->\n<style>\n{}\n</style>\n\n<!-- JavaScript -->\n<script>\n{}\n</script>",
            self.name, self.html, self.css, self.js
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_ids_are_unique_and_ordered() {
        let ids = catalog().iter().map(|t| t.id).collect::<Vec<_>>();
        assert_eq!(ids, ["basic", "card", "interactive"]);
    }

    #[test]
    fn find_is_exact() {
        assert_eq!(find("card").map(|t| t.name), Some("Card Layout"));
        assert!(find("Card").is_none());
        assert!(find("").is_none());
    }

    #[test]
    fn every_template_has_all_three_parts() {
        for template in catalog() {
            assert!(template.html.starts_with("<!DOCTYPE html>"), "{}", template.id);
            assert!(!template.css.trim().is_empty(), "{}", template.id);
            assert!(!template.js.trim().is_empty(), "{}", template.id);
        }
    }

    #[test]
    fn snippet_wraps_each_part() {
        let template = find("basic").expect("basic template");
        let snippet = template.snippet();
        assert!(snippet.starts_with("<!-- Basic HTML Template -->\n<!DOCTYPE html>"));
        assert!(snippet.contains(&format!("<style>\n{}\n</style>", template.css)));
        assert!(snippet.ends_with(&format!("<script>\n{}\n</script>", template.js)));
    }

    #[test]
    fn summary_drops_bodies() {
        let value = serde_json::to_value(find("card").expect("card").summary()).expect("json");
        assert_eq!(
            value,
            serde_json::json!({
                "id": "card",
                "name": "Card Layout",
                "description": "Responsive card grid",
            })
        );
    }
}
