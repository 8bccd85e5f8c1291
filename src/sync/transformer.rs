use crate::sync::types::{Batch, RecognitionItem, RecognitionRequest};

/// Maps fetched records to the recognizer's input shape
#[derive(Debug, Clone)]
pub struct BatchTransformer {
    file_server_url: String,
}

impl BatchTransformer {
    pub fn new(file_server_url: impl Into<String>) -> Self {
        Self {
            file_server_url: file_server_url.into(),
        }
    }

    pub fn transform(&self, batch: &Batch) -> RecognitionRequest {
        let items = batch
            .records()
            .iter()
            .map(|record| RecognitionItem {
                id: record.id.clone(),
                url: self.resolve_url(&record.url),
            })
            .collect();

        RecognitionRequest { items }
    }

    /// Absolute URLs pass through; anything else is appended to the file server base.
    pub fn resolve_url(&self, url: &str) -> String {
        if is_absolute(url) {
            return url.to_string();
        }

        let base = self.file_server_url.trim_end_matches('/');
        if url.starts_with('/') {
            format!("{base}{url}")
        } else {
            format!("{base}/{url}")
        }
    }
}

fn is_absolute(url: &str) -> bool {
    reqwest::Url::parse(url)
        .map(|parsed| parsed.has_host())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::types::Record;

    #[test]
    fn test_relative_paths_are_resolved() {
        let transformer = BatchTransformer::new("https://inky.local:9501");
        assert_eq!(
            transformer.resolve_url("/images/a.png"),
            "https://inky.local:9501/images/a.png"
        );
        assert_eq!(
            transformer.resolve_url("images/a.png"),
            "https://inky.local:9501/images/a.png"
        );
    }

    #[test]
    fn test_trailing_slash_on_base() {
        let transformer = BatchTransformer::new("https://inky.local:9501/");
        assert_eq!(
            transformer.resolve_url("/images/a.png"),
            "https://inky.local:9501/images/a.png"
        );
    }

    #[test]
    fn test_absolute_urls_pass_through() {
        let transformer = BatchTransformer::new("https://inky.local:9501");
        assert_eq!(
            transformer.resolve_url("http://cdn.example.org/a.png"),
            "http://cdn.example.org/a.png"
        );
    }

    #[test]
    fn test_transform_preserves_order_and_ids() {
        let transformer = BatchTransformer::new("http://files");
        let batch = Batch::new(
            vec![Record::new("b", "/2.png"), Record::new("a", "/1.png")],
            2,
        );

        let request = transformer.transform(&batch);
        let ids: Vec<&str> = request.ids().map(|id| id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert_eq!(request.items[0].url, "http://files/2.png");
    }

    #[test]
    fn test_empty_batch_yields_empty_request() {
        let transformer = BatchTransformer::new("http://files");
        let request = transformer.transform(&Batch::new(Vec::new(), 5));
        assert!(request.is_empty());
    }
}
