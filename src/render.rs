use minijinja::Environment;
use thiserror::Error;

/// Turns a view name and its parameters into markup.
pub trait Renderer: Send + Sync + 'static {
    fn render(&self, view: &str, params: &serde_json::Value) -> Result<String, RenderError>;
}

#[derive(Error, Debug)]
#[error("Failed to render view \"{view}\"")]
pub struct RenderError {
    view: String,
    #[source]
    source: minijinja::Error,
}

const TEMPLATES: &[(&str, &str)] = &[
    ("layout.html", include_str!("../templates/layout.html")),
    ("index.html", include_str!("../templates/index.html")),
    ("books/grid.html", include_str!("../templates/books/grid.html")),
    ("authors/index.html", include_str!("../templates/authors/index.html")),
    ("authors/form.html", include_str!("../templates/authors/form.html")),
    ("authors/new.html", include_str!("../templates/authors/new.html")),
    ("authors/edit.html", include_str!("../templates/authors/edit.html")),
    ("authors/show.html", include_str!("../templates/authors/show.html")),
    ("books/index.html", include_str!("../templates/books/index.html")),
    ("books/form.html", include_str!("../templates/books/form.html")),
    ("books/new.html", include_str!("../templates/books/new.html")),
    ("books/edit.html", include_str!("../templates/books/edit.html")),
    ("books/show.html", include_str!("../templates/books/show.html")),
];

/// Renders the HTML views compiled into the binary. View `books/show` maps
/// to template `books/show.html`; output is HTML-escaped.
#[derive(Debug)]
pub struct TemplateRenderer {
    env: Environment<'static>,
}

impl TemplateRenderer {
    pub fn new() -> anyhow::Result<Self> {
        let mut env = Environment::new();
        for &(name, source) in TEMPLATES {
            env.add_template(name, source)?;
        }
        Ok(Self { env })
    }
}

impl Renderer for TemplateRenderer {
    fn render(&self, view: &str, params: &serde_json::Value) -> Result<String, RenderError> {
        let name = format!("{view}.html");
        self.env
            .get_template(&name)
            .and_then(|template| template.render(params))
            .map_err(|source| RenderError {
                view: view.to_string(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn renders_escaped_markup() {
        let renderer = TemplateRenderer::new().unwrap();
        let markup = renderer
            .render(
                "authors/index",
                &json!({
                    "authors": [{ "id": 1, "name": "<b>Iain</b>" }],
                    "searchOptions": { "name": "" },
                }),
            )
            .unwrap();
        assert!(markup.contains("&lt;b&gt;Iain"));
        assert!(!markup.contains("<b>Iain"));
    }

    #[test]
    fn book_form_carries_cover_picker() {
        let renderer = TemplateRenderer::new().unwrap();
        let markup = renderer
            .render("books/new", &json!({ "book": {}, "authors": [] }))
            .unwrap();
        assert!(markup.contains(r#"type="file""#));
        assert!(markup.contains(r#"name="cover""#));
        assert!(markup.contains("readAsDataURL"));
    }

    #[test]
    fn unknown_view_is_an_error() {
        let renderer = TemplateRenderer::new().unwrap();
        assert!(renderer.render("missing", &json!({})).is_err());
    }
}
