use crate::{Config, Database};
use anyhow::Result;
use std::collections::HashMap;
use tera::{Tera, Value};

pub struct AppState {
    pub config: Config,
    pub db: Database,
    pub templates: Tera,
}

impl AppState {
    pub fn new(config: Config, db: Database) -> Result<Self> {
        Ok(Self {
            config,
            db,
            templates: load_templates()?,
        })
    }
}

pub fn load_templates() -> Result<Tera> {
    let mut templates = Tera::default();

    templates.register_filter("format_date", format_date_filter);
    templates.add_raw_templates(vec![
        ("base.html", include_str!("../../templates/base.html")),
        ("macros.html", include_str!("../../templates/macros.html")),
        ("_sidebar.html", include_str!("../../templates/_sidebar.html")),
        ("index.html", include_str!("../../templates/index.html")),
        ("post-details.html", include_str!("../../templates/post-details.html")),
        ("posts-list.html", include_str!("../../templates/posts-list.html")),
        ("contacts.html", include_str!("../../templates/contacts.html")),
        ("404.html", include_str!("../../templates/404.html")),
    ])?;

    Ok(templates)
}

fn format_date_filter(value: &Value, args: &HashMap<String, Value>) -> tera::Result<Value> {
    let date_str = value
        .as_str()
        .ok_or_else(|| tera::Error::msg("format_date requires a string"))?;

    let format = args
        .get("format")
        .and_then(|v| v.as_str())
        .unwrap_or("%B %d, %Y");

    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(date_str) {
        return Ok(Value::String(dt.format(format).to_string()));
    }

    if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(date_str, "%Y-%m-%d %H:%M:%S") {
        return Ok(Value::String(dt.format(format).to_string()));
    }

    Ok(Value::String(date_str.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_templates_render() {
        let tera = load_templates().unwrap();
        let mut ctx = tera::Context::new();
        ctx.insert(
            "site",
            &serde_json::json!({ "title": "Sensive", "description": "" }),
        );
        ctx.insert("message", "gone");

        let html = tera.render("404.html", &ctx).unwrap();
        assert!(html.contains("gone"));
        assert!(html.contains("<title>Not found | Sensive</title>"));
    }

    #[test]
    fn test_format_date_filter() {
        let value = Value::String("2024-05-01T10:00:00Z".to_string());
        let formatted = format_date_filter(&value, &HashMap::new()).unwrap();
        assert_eq!(formatted, Value::String("May 01, 2024".to_string()));

        let unparsable = Value::String("yesterday".to_string());
        let passthrough = format_date_filter(&unparsable, &HashMap::new()).unwrap();
        assert_eq!(passthrough, unparsable);
    }
}
