//! Typed WeData API calls.
//!
//! Each submodule holds the request/response models of one entity and an
//! `impl WeDataClient` block with one method per action. Models use the
//! API's PascalCase field names; absent optional fields are not sent.

pub mod common;
pub mod data_source;
pub mod lineage;
pub mod project;
pub mod role;
pub mod sql_script_run;
pub mod task;
pub mod workflow;
pub mod workflow_folder;

use std::future::Future;

use serde::{Deserialize, Deserializer};
use tracing::debug;

use crate::error::ProviderError;

/// `{"Data": ...}` reply body used by most actions.
#[derive(Debug, Deserialize)]
pub struct DataResponse<T> {
    /// Payload, absent when the object does not exist.
    #[serde(rename = "Data")]
    pub data: Option<T>,
}

/// One page of a list action.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Page<T> {
    /// Items on this page.
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    /// Total across all pages, when reported.
    #[serde(default)]
    pub total_count: Option<u64>,
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            total_count: None,
        }
    }
}

/// Fetch pages 1, 2, 3... until a page is empty or shorter than `page_size`.
///
/// `fetch` receives the page number and returns that page's items.
pub async fn fetch_all_pages<T, F, Fut>(page_size: u64, mut fetch: F) -> Result<Vec<T>, ProviderError>
where
    F: FnMut(u64) -> Fut,
    Fut: Future<Output = Result<Vec<T>, ProviderError>>,
{
    let mut all_items = Vec::new();
    let mut page_number: u64 = 1;

    loop {
        let items = fetch(page_number).await?;
        let count = items.len() as u64;
        debug!(page_number, count, "Fetched page");

        if count == 0 {
            break;
        }
        all_items.extend(items);
        if count < page_size {
            break;
        }
        page_number += 1;
    }

    Ok(all_items)
}

/// Accepts `"12"`, `12` or `null` and yields `Option<String>`.
///
/// Some numeric fields come back as numbers but are configured as strings.
pub fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Str(String),
        Int(i64),
        Uint(u64),
        Float(f64),
    }

    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::Str(s) => s,
        Raw::Int(i) => i.to_string(),
        Raw::Uint(u) => u.to_string(),
        Raw::Float(f) => f.to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[tokio::test]
    async fn test_fetch_all_pages_advances_one_page_at_a_time() {
        let requested = Mutex::new(Vec::new());
        let items = fetch_all_pages(2, |page| {
            requested.lock().unwrap().push(page);
            async move {
                Ok(match page {
                    1 => vec!["a", "b"],
                    2 => vec!["c", "d"],
                    3 => vec!["e"],
                    _ => vec![],
                })
            }
        })
        .await
        .unwrap();

        assert_eq!(items, vec!["a", "b", "c", "d", "e"]);
        assert_eq!(*requested.lock().unwrap(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_fetch_all_pages_stops_on_empty_page() {
        let items: Vec<u32> = fetch_all_pages(2, |page| async move {
            Ok(if page == 1 { vec![1, 2] } else { vec![] })
        })
        .await
        .unwrap();
        assert_eq!(items, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_fetch_all_pages_propagates_errors() {
        let err = fetch_all_pages::<u32, _, _>(10, |_| async {
            Err(ProviderError::api("InternalError", "down"))
        })
        .await
        .unwrap_err();
        assert_eq!(err.code(), Some("InternalError"));
    }

    #[test]
    fn test_string_or_number() {
        #[derive(Deserialize)]
        struct Holder {
            #[serde(default, deserialize_with = "string_or_number")]
            value: Option<String>,
        }

        let h: Holder = serde_json::from_str(r#"{"value": 26}"#).unwrap();
        assert_eq!(h.value.as_deref(), Some("26"));
        let h: Holder = serde_json::from_str(r#"{"value": "26"}"#).unwrap();
        assert_eq!(h.value.as_deref(), Some("26"));
        let h: Holder = serde_json::from_str(r#"{"value": null}"#).unwrap();
        assert_eq!(h.value, None);
        let h: Holder = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(h.value, None);
    }

    #[test]
    fn test_page_defaults() {
        let page: Page<u32> = serde_json::from_str(r#"{"TotalCount": 0}"#).unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.total_count, Some(0));
    }
}
