//! Binding a remote collection's items to frames
//!
//! A collection endpoint answers with `{ "items": [...] }` where each item
//! carries its rendered document as HTML. The first `<img src>` of that HTML
//! is the item's image; item `i` goes to the frame the resolver returns for `i`.

use diorama_core::{DioramaError, ObjectId, Result};
use diorama_images::ImageFetcher;
use diorama_snapshot::ImageBindingRecord;
use regex::Regex;
use serde_json::Value;

/// First `src` of an `<img>` tag, tolerating JSON-escaped quotes
const IMG_SRC: &str = r#"<img[^>]+src=\\?"([^"]+?)\\?""#;

fn img_src_pattern() -> Result<Regex> {
    Regex::new(IMG_SRC).map_err(|e| DioramaError::ConfigError(format!("image pattern: {}", e)))
}

fn first_image_url(html: &str, pattern: &Regex) -> Option<String> {
    let url = pattern.captures(html)?.get(1)?.as_str().replace("\\/", "/");
    Some(url).filter(|u| !u.trim().is_empty())
}

/// Turn a collection document into bindings.
///
/// Items without HTML, without an image, or without a frame are skipped
/// with a warning. A document with no items yields no bindings.
pub fn collection_bindings<F>(json: &str, resolver: F) -> Result<Vec<ImageBindingRecord>>
where
    F: Fn(usize) -> Option<ObjectId>,
{
    let doc: Value = serde_json::from_str(json)
        .map_err(|e| DioramaError::ParseError(format!("collection: {}", e)))?;
    let items = match doc.get("items").and_then(Value::as_array) {
        Some(items) if !items.is_empty() => items,
        _ => {
            tracing::warn!("Collection has no items");
            return Ok(Vec::new());
        }
    };

    let pattern = img_src_pattern()?;
    let mut bindings = Vec::new();
    for (index, item) in items.iter().enumerate() {
        let Some(object_id) = resolver(index).filter(|id| !id.is_blank()) else {
            tracing::debug!("No frame left for collection item #{}", index);
            break;
        };
        let html = item
            .get("document_as_html")
            .and_then(Value::as_str)
            .unwrap_or_default();
        if html.trim().is_empty() {
            tracing::warn!("Collection item #{} has no document HTML", index);
            continue;
        }
        let Some(image_url) = first_image_url(html, &pattern) else {
            tracing::warn!("Collection item #{} has no image", index);
            continue;
        };
        bindings.push(ImageBindingRecord::new(object_id, image_url));
    }

    tracing::info!("Collection gave {} of {} items an image", bindings.len(), items.len());
    Ok(bindings)
}

/// Fetch the collection at `url` and turn it into bindings
pub async fn fetch_collection_bindings<F>(
    fetcher: &dyn ImageFetcher,
    url: &str,
    resolver: F,
) -> Result<Vec<ImageBindingRecord>>
where
    F: Fn(usize) -> Option<ObjectId>,
{
    tracing::info!("Loading collection from {}", url);
    let bytes = fetcher.fetch_bytes(url).await?;
    let json = String::from_utf8(bytes)
        .map_err(|e| DioramaError::ParseError(format!("collection at {} is not UTF-8: {}", url, e)))?;
    collection_bindings(&json, resolver)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artworks::ordered_resolver;

    const COLLECTION: &str = r#"{"items": [
        {"title": "Harbor", "document_as_html": "<p><img width=\"300\" src=\"https:\/\/acervo\/harbor.jpg\" class=\"a\"><\/p>"},
        {"title": "Text only", "document_as_html": "<p>No picture<\/p>"},
        {"title": "Empty", "document_as_html": ""},
        {"title": "Field", "document_as_html": "<img src=\"https://acervo/field.jpg\"><img src=\"https://acervo/second.jpg\">"},
        {"title": "No frame", "document_as_html": "<img src=\"https://acervo/extra.jpg\">"}
    ]}"#;

    fn frames() -> Vec<ObjectId> {
        ["f1", "f2", "f3", "f4"].into_iter().map(ObjectId::from).collect()
    }

    struct Canned(&'static str);

    #[async_trait::async_trait]
    impl ImageFetcher for Canned {
        async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
            if url == "https://acervo/items" {
                Ok(self.0.as_bytes().to_vec())
            } else {
                Err(DioramaError::FetchError {
                    url: url.to_string(),
                    reason: "404".to_string(),
                })
            }
        }
    }

    #[test]
    fn test_first_image_per_item_by_position() {
        let frames = frames();
        let bindings = collection_bindings(COLLECTION, ordered_resolver(&frames)).unwrap();
        assert_eq!(
            bindings,
            vec![
                ImageBindingRecord::new("f1", "https://acervo/harbor.jpg"),
                ImageBindingRecord::new("f4", "https://acervo/field.jpg"),
            ]
        );
    }

    #[test]
    fn test_escaped_html_in_raw_text() {
        let pattern = img_src_pattern().unwrap();
        let html = r#"<img src=\"https:\/\/acervo\/a.jpg\">"#;
        assert_eq!(
            first_image_url(html, &pattern).as_deref(),
            Some("https://acervo/a.jpg")
        );
        assert_eq!(first_image_url("<img alt=\"x\">", &pattern), None);
    }

    #[test]
    fn test_no_items() {
        let frames = frames();
        assert!(collection_bindings(r#"{"items": []}"#, ordered_resolver(&frames))
            .unwrap()
            .is_empty());
        assert!(collection_bindings(r#"{"total": 0}"#, ordered_resolver(&frames))
            .unwrap()
            .is_empty());
        assert!(matches!(
            collection_bindings("<html>", ordered_resolver(&frames)),
            Err(DioramaError::ParseError(_))
        ));
    }

    #[tokio::test]
    async fn test_fetch_through_fetcher() {
        let frames = frames();
        let fetcher = Canned(COLLECTION);
        let bindings =
            fetch_collection_bindings(&fetcher, "https://acervo/items", ordered_resolver(&frames))
                .await
                .unwrap();
        assert_eq!(bindings.len(), 2);

        let missing =
            fetch_collection_bindings(&fetcher, "https://acervo/other", ordered_resolver(&frames)).await;
        assert!(matches!(missing, Err(DioramaError::FetchError { .. })));
    }
}
