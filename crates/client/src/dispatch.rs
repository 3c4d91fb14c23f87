//! Message dispatch for the action protocol.
//!
//! Every request yields a [`Response`]; errors are converted to the
//! `{success: false, error}` marker here and never propagate further.

use pdc_core::{Error, RenameOutcome, Request, Response, Store};

use crate::extract::Extractor;

/// Handle one request against the store.
pub async fn dispatch(store: &Store, extractor: &dyn Extractor, request: Request) -> Response {
    match handle(store, extractor, request).await {
        Ok(response) => response,
        Err(err) => {
            tracing::warn!(error = %err, "action failed");
            Response::failed(&err)
        }
    }
}

/// Parse one JSON message and dispatch it, returning the serialized reply.
pub async fn dispatch_json(store: &Store, extractor: &dyn Extractor, message: &str) -> String {
    let response = match serde_json::from_str::<Request>(message) {
        Ok(request) => dispatch(store, extractor, request).await,
        Err(e) => Response::failed(&Error::InvalidInput(format!("malformed request: {e}"))),
    };
    serde_json::to_string(&response)
        .unwrap_or_else(|_| r#"{"success":false,"error":"failed to encode response"}"#.to_string())
}

async fn handle(store: &Store, extractor: &dyn Extractor, request: Request) -> Result<Response, Error> {
    match request {
        Request::ExtractContent { custom_title, html, url } => {
            let record = extractor.extract(&html, &url, custom_title.as_deref())?;
            Ok(Response::Extracted(record))
        }
        Request::StoreContent { data } => {
            let outcome = store.insert(data).await?;
            Ok(Response::Stored { success: true, duplicate: outcome.is_duplicate() })
        }
        Request::RenameContent { hash, title } => {
            let outcome = store.rename(&hash, &title).await?;
            Ok(Response::Updated { success: true, found: outcome == RenameOutcome::Renamed })
        }
        Request::DeleteContent { index } => {
            let removed = store.delete(index).await?;
            Ok(Response::Updated { success: true, found: removed.is_some() })
        }
        Request::ListContent => {
            let records = store.list().await?;
            let bytes_used = store.bytes_used().await?;
            Ok(Response::Listed { size: records.len(), records, bytes_used })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::HeuristicExtractor;
    use pdc_core::{ContentRecord, Metadata};

    const ARTICLE: &str = r#"<html><head><title>Doc</title></head><body>
        <article><h1>Headline</h1><p>Lorem ipsum dolor sit amet consectetur adipiscing elit sed do eiusmod
        tempor incididunt ut labore et dolore magna aliqua ut enim ad minim veniam quis nostrud exercitation
        ullamco laboris nisi ut aliquip ex ea commodo consequat duis aute irure dolor in reprehenderit in
        voluptate velit esse cillum dolore eu fugiat nulla pariatur excepteur sint occaecat cupidatat non
        proident sunt in culpa qui officia deserunt mollit anim id est laborum.</p></article></body></html>"#;

    fn record(content: &str) -> ContentRecord {
        ContentRecord::new("Title", "https://example.com", content, Metadata::new())
    }

    #[tokio::test]
    async fn test_extract_then_store() {
        let store = Store::in_memory(10);
        let extractor = HeuristicExtractor::default();

        let request = Request::ExtractContent { custom_title: None, html: ARTICLE.into(), url: "https://a.b/x".into() };
        let Response::Extracted(record) = dispatch(&store, &extractor, request).await else {
            panic!("expected extracted record");
        };
        assert_eq!(record.title, "Headline");
        assert_eq!(store.size().await.unwrap(), 0);

        let stored = dispatch(&store, &extractor, Request::StoreContent { data: record.clone() }).await;
        assert_eq!(stored, Response::Stored { success: true, duplicate: false });

        let again = dispatch(&store, &extractor, Request::StoreContent { data: record }).await;
        assert_eq!(again, Response::Stored { success: true, duplicate: true });
        assert_eq!(store.size().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_extract_empty_html_fails() {
        let store = Store::in_memory(10);
        let request = Request::ExtractContent { custom_title: None, html: "  ".into(), url: "u".into() };
        let response = dispatch(&store, &HeuristicExtractor::default(), request).await;
        assert!(response.is_failure());
    }

    #[tokio::test]
    async fn test_store_invalid_record_fails_without_writing() {
        let store = Store::in_memory(10);
        let mut data = record(&"x".repeat(150_000));
        data.title = String::new();
        data.fingerprint = "not-a-hash".into();

        let response = dispatch(&store, &HeuristicExtractor::default(), Request::StoreContent { data }).await;
        assert!(response.is_failure());
        assert_eq!(store.size().await.unwrap(), 0);
        assert_eq!(store.bytes_used().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_rename_and_delete() {
        let store = Store::in_memory(10);
        let extractor = HeuristicExtractor::default();
        let rec = record("body");
        let hash = rec.fingerprint.clone();
        store.insert(rec).await.unwrap();

        let renamed =
            dispatch(&store, &extractor, Request::RenameContent { hash: hash.clone(), title: "New".into() }).await;
        assert_eq!(renamed, Response::Updated { success: true, found: true });
        assert_eq!(store.get(&hash).await.unwrap().unwrap().title, "New");

        let missing =
            dispatch(&store, &extractor, Request::RenameContent { hash: "000000000000".into(), title: "x".into() })
                .await;
        assert_eq!(missing, Response::Updated { success: true, found: false });

        let blank = dispatch(&store, &extractor, Request::RenameContent { hash, title: " ".into() }).await;
        assert!(blank.is_failure());

        let deleted = dispatch(&store, &extractor, Request::DeleteContent { index: 0 }).await;
        assert_eq!(deleted, Response::Updated { success: true, found: true });
        let gone = dispatch(&store, &extractor, Request::DeleteContent { index: 0 }).await;
        assert_eq!(gone, Response::Updated { success: true, found: false });
    }

    #[tokio::test]
    async fn test_list() {
        let store = Store::in_memory(10);
        store.insert(record("one")).await.unwrap();
        store.insert(record("two")).await.unwrap();

        let response = dispatch(&store, &HeuristicExtractor::default(), Request::ListContent).await;
        let Response::Listed { records, size, bytes_used } = response else {
            panic!("expected listing");
        };
        assert_eq!(size, 2);
        assert_eq!(records[0].content, "two");
        assert!(bytes_used > 2);
    }

    #[tokio::test]
    async fn test_dispatch_json() {
        let store = Store::in_memory(10);
        let extractor = HeuristicExtractor::default();

        let reply = dispatch_json(&store, &extractor, r#"{"action": "listContent"}"#).await;
        let value: serde_json::Value = serde_json::from_str(&reply).unwrap();
        assert_eq!(value["size"], 0);

        let reply = dispatch_json(&store, &extractor, r#"{"action": "explode"}"#).await;
        let value: serde_json::Value = serde_json::from_str(&reply).unwrap();
        assert_eq!(value["success"], false);
        assert!(value["error"].as_str().unwrap().starts_with("malformed request"));
    }
}
