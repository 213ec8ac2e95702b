//! JSON-LD Metadata Parsing
//!
//! Schema.org objects embedded as `<script type="application/ld+json">`.
//! Every typed object in a script, including `@graph` members and nested
//! values such as `author` or `publisher`, is collected and ranked; the
//! article-like objects supply title, description and date, persons the
//! byline, organizations the site name.

use serde_json::{Map, Value};

use super::meta_tags::{parse_meta_date, validate_metadata_name};
use super::Metadata;
use crate::dom::Tree;

/// A typed schema object with its rank.
#[derive(Debug, Clone)]
struct SchemaObject {
    data: Map<String, Value>,
    /// Higher is more relevant: article types, shallow nesting.
    importance: i32,
}

/// Typed objects found in a document, by category.
#[derive(Debug, Default)]
struct SchemaCollection {
    persons: Vec<SchemaObject>,
    organizations: Vec<SchemaObject>,
    articles: Vec<SchemaObject>,
}

/// Fill empty metadata fields from JSON-LD scripts.
#[must_use]
pub fn extract_json_ld(tree: &Tree, original: Metadata) -> Metadata {
    let mut result = original;
    let schemas = decode_json_ld(tree);

    for article in &schemas.articles {
        if result.title.is_none() {
            result.title = single_string(&article.data, "headline")
                .or_else(|| single_string(&article.data, "name"));
        }
        if result.excerpt.is_none() {
            result.excerpt = single_string(&article.data, "description");
        }
        if result.published_time.is_none() {
            result.published_time =
                single_string(&article.data, "datePublished").and_then(|date| parse_meta_date(&date));
        }
        for image in schema_images(&article.data) {
            if !result.images.contains(&image) {
                result.images.push(image);
            }
        }
        if result.byline.is_none() {
            result.byline = article.data.get("author").and_then(author_names);
        }
    }

    if result.byline.is_none() {
        result.byline = schemas.persons.iter().find_map(|person| schema_name(&person.data));
    }
    if result.site_name.is_none() {
        result.site_name = schemas.organizations.iter().find_map(|org| schema_name(&org.data));
    }

    result
}

fn decode_json_ld(tree: &Tree) -> SchemaCollection {
    let mut schemas = SchemaCollection::default();

    let scripts = tree.select(tree.root(), |t, node| {
        t.is_tag(node, "script")
            && t.attr(node, "type")
                .is_some_and(|kind| kind.trim().eq_ignore_ascii_case("application/ld+json"))
    });

    for script in scripts {
        let json_text = tree.text_content(script);
        let json_text = json_text.trim();
        if json_text.is_empty() {
            continue;
        }
        match serde_json::from_str::<Value>(json_text) {
            Ok(value) => collect(&value, 0, &mut schemas),
            Err(err) => log::debug!("json-ld: skipping unparseable script: {err}"),
        }
    }

    schemas.persons.sort_by(|a, b| b.importance.cmp(&a.importance));
    schemas.organizations.sort_by(|a, b| b.importance.cmp(&a.importance));
    schemas.articles.sort_by(|a, b| b.importance.cmp(&a.importance));
    schemas
}

fn collect(value: &Value, depth: i32, schemas: &mut SchemaCollection) {
    match value {
        Value::Object(map) => {
            let types = schema_types(map);
            if !types.is_empty() {
                let base = if is_article_type(&types) { 100 } else { 50 };
                let object = SchemaObject {
                    data: map.clone(),
                    importance: base - depth * 10,
                };
                if is_person_type(&types) {
                    schemas.persons.push(object);
                } else if is_organization_type(&types) {
                    schemas.organizations.push(object);
                } else if is_article_type(&types) {
                    schemas.articles.push(object);
                }
            }
            let child_depth = if types.is_empty() { depth } else { depth + 1 };
            for child in map.values() {
                collect(child, child_depth, schemas);
            }
        }
        Value::Array(items) => {
            for item in items {
                collect(item, depth, schemas);
            }
        }
        _ => {}
    }
}

/// Lowercased `@type` values.
fn schema_types(map: &Map<String, Value>) -> Vec<String> {
    match map.get("@type") {
        Some(Value::String(kind)) => vec![kind.to_lowercase()],
        Some(Value::Array(kinds)) => kinds
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_lowercase)
            .collect(),
        _ => Vec::new(),
    }
}

fn is_person_type(types: &[String]) -> bool {
    types.iter().any(|t| matches!(t.as_str(), "person" | "author" | "creator"))
}

fn is_organization_type(types: &[String]) -> bool {
    types
        .iter()
        .any(|t| matches!(t.as_str(), "organization" | "newsmediaorganization" | "website" | "publisher"))
}

fn is_article_type(types: &[String]) -> bool {
    types.iter().any(|t| {
        matches!(
            t.as_str(),
            "article" | "newsarticle" | "blogposting" | "webpage" | "report" | "techarticle"
                | "scholarlyarticle" | "socialmediaposting" | "reportagenewsarticle"
        )
    })
}

/// `name`, or `givenName familyName`.
fn schema_name(data: &Map<String, Value>) -> Option<String> {
    if let Some(name) = single_string(data, "name") {
        return Some(name);
    }
    let given = data.get("givenName").and_then(Value::as_str).unwrap_or("").trim();
    let family = data.get("familyName").and_then(Value::as_str).unwrap_or("").trim();
    let full_name = format!("{given} {family}").trim().to_string();
    (!full_name.is_empty()).then_some(full_name)
}

/// Names from an `author` value: a string, a person object or a list.
fn author_names(value: &Value) -> Option<String> {
    let names: Vec<String> = match value {
        Value::String(name) => vec![name.trim().to_string()],
        Value::Object(map) => schema_name(map).into_iter().collect(),
        Value::Array(items) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(name) => Some(name.trim().to_string()),
                Value::Object(map) => schema_name(map),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    };
    let names: Vec<String> = names
        .into_iter()
        .filter(|name| validate_metadata_name(name))
        .collect();
    (!names.is_empty()).then(|| names.join(", "))
}

fn single_string(data: &Map<String, Value>, key: &str) -> Option<String> {
    let value = match data.get(key)? {
        Value::String(s) => s.as_str(),
        Value::Array(items) => items.first()?.as_str()?,
        _ => return None,
    };
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// `image` as a URL, an `ImageObject`, or a list of either.
fn schema_images(data: &Map<String, Value>) -> Vec<String> {
    let images: Vec<&Value> = match data.get("image") {
        Some(Value::Array(items)) => items.iter().collect(),
        Some(other) => vec![other],
        None => Vec::new(),
    };
    images
        .into_iter()
        .filter_map(|image| match image {
            Value::String(url) => Some(url.trim()),
            Value::Object(obj) => obj.get("url").and_then(Value::as_str).map(str::trim),
            _ => None,
        })
        .filter(|url| !url.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse;
    use chrono::Datelike;

    fn from_script(json: &str) -> Metadata {
        let html = format!(r#"<head><script type="application/ld+json">{json}</script></head>"#);
        extract_json_ld(&parse(&html), Metadata::default())
    }

    #[test]
    fn simple_article_schema() {
        let md = from_script(
            r#"{"@context":"https://schema.org","@type":"NewsArticle","headline":"Harbour Reopens",
                "description":"The old harbour reopened.","datePublished":"2024-01-15",
                "author":{"@type":"Person","name":"Jane Doe"},
                "publisher":{"@type":"Organization","name":"Example News"},
                "image":["https://example.com/a.jpg"]}"#,
        );
        assert_eq!(md.title.as_deref(), Some("Harbour Reopens"));
        assert_eq!(md.excerpt.as_deref(), Some("The old harbour reopened."));
        assert_eq!(md.byline.as_deref(), Some("Jane Doe"));
        assert_eq!(md.site_name.as_deref(), Some("Example News"));
        assert_eq!(md.images, vec!["https://example.com/a.jpg"]);
        assert_eq!(md.published_time.map(|d| d.year()), Some(2024));
    }

    #[test]
    fn image_objects_and_lists() {
        let md = from_script(
            r#"{"@type":"BlogPosting","image":[{"@type":"ImageObject","url":"https://example.com/b.jpg"},
                "https://example.com/c.jpg", 7]}"#,
        );
        assert_eq!(md.images, vec!["https://example.com/b.jpg", "https://example.com/c.jpg"]);
    }

    #[test]
    fn graph_array_schema() {
        let md = from_script(
            r#"{"@graph":[{"@type":"WebSite","name":"Example Site"},
                {"@type":"BlogPosting","headline":"Post","author":[{"name":"A One"},{"name":"B Two"}]}]}"#,
        );
        assert_eq!(md.title.as_deref(), Some("Post"));
        assert_eq!(md.byline.as_deref(), Some("A One, B Two"));
        assert_eq!(md.site_name.as_deref(), Some("Example Site"));
    }

    #[test]
    fn person_name_composition() {
        let md = from_script(r#"{"@type":"Person","givenName":"Jane","familyName":"Doe"}"#);
        assert_eq!(md.byline.as_deref(), Some("Jane Doe"));
    }

    #[test]
    fn invalid_json_skipped() {
        let md = from_script("{not json");
        assert_eq!(md, Metadata::default());
    }

    #[test]
    fn existing_fields_are_kept() {
        let html = r#"<script type="application/ld+json">{"@type":"Article","headline":"LD"}</script>"#;
        let md = extract_json_ld(
            &parse(html),
            Metadata {
                title: Some("Title Element".into()),
                ..Metadata::default()
            },
        );
        assert_eq!(md.title.as_deref(), Some("Title Element"));
    }
}
