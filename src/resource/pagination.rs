//! Paginated collection fetching
//!
//! List endpoints answer with `{ "members": [...], "nextPageUri": .., "uri": .. }`.
//! The fetcher follows `nextPageUri` until the server stops offering one.

use crate::client::{Headers, RequestOptions, RestClient};
use crate::error::Result;
use serde_json::Value;
use std::collections::HashSet;

/// One page of a collection response
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    /// `None` when the body carried no `members` key at all
    pub members: Option<Vec<Value>>,
    pub next_page_uri: Option<String>,
    pub uri: Option<String>,
}

impl Page {
    pub fn from_body(body: &Value) -> Self {
        let string_field = |key: &str| {
            body.get(key)
                .and_then(|v| v.as_str())
                .map(|s| s.to_string())
        };

        Self {
            members: body.get("members").and_then(|v| v.as_array()).cloned(),
            next_page_uri: string_field("nextPageUri"),
            uri: string_field("uri"),
        }
    }

    /// Link to follow, unless the page is the last one or points at itself
    pub fn next_link(&self) -> Option<&str> {
        match (&self.next_page_uri, &self.uri) {
            (Some(next), Some(own)) if next == own => None,
            (Some(next), _) => Some(next.as_str()),
            (None, _) => None,
        }
    }
}

/// Fetch one page
pub async fn fetch_page(client: &dyn RestClient, uri: &str, headers: &Headers) -> Result<Page> {
    let response = client
        .rest_get(uri, RequestOptions::with_headers(headers.clone()))
        .await?;
    let body = client.response_handler(response)?;
    Ok(Page::from_body(&body))
}

/// Fetch every member of a collection (auto-paginate).
///
/// Stops on a page without `members`, when `nextPageUri` is missing or
/// refers to the page itself, or when it leads back to a page already fetched.
pub async fn find_with_pagination(
    client: &dyn RestClient,
    uri: &str,
    headers: &Headers,
) -> Result<Vec<Value>> {
    let mut all_members = Vec::new();
    let mut current = uri.to_string();
    let mut visited = HashSet::new();
    let mut pages = 0usize;

    loop {
        let page = fetch_page(client, &current, headers).await?;
        visited.insert(current.clone());
        pages += 1;

        let Some(members) = page.members.as_ref() else {
            tracing::debug!("Page {} at {} has no members, stopping", pages, current);
            break;
        };
        all_members.extend(members.iter().cloned());

        match page.next_link() {
            Some(next) if visited.contains(next) => {
                tracing::warn!("Pagination cycle at {}, stopping", next);
                break;
            }
            Some(next) => current = next.to_string(),
            None => break,
        }
    }

    tracing::debug!(
        "Fetched {} members from {} across {} page(s)",
        all_members.len(),
        uri,
        pages
    );

    Ok(all_members)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::RawResponse;
    use crate::testing::MockClient;
    use reqwest::Method;
    use serde_json::json;

    fn page(uri: &str, members: Value, next: Option<&str>) -> RawResponse {
        RawResponse::json(
            200,
            &json!({"uri": uri, "members": members, "nextPageUri": next}),
        )
    }

    #[test]
    fn test_next_link_rules() {
        let self_ref = Page::from_body(&json!({"uri": "/p2", "nextPageUri": "/p2", "members": []}));
        assert_eq!(self_ref.next_link(), None);

        let null_next = Page::from_body(&json!({"uri": "/p1", "nextPageUri": null, "members": []}));
        assert_eq!(null_next.next_link(), None);

        let forward = Page::from_body(&json!({"uri": "/p1", "nextPageUri": "/p2", "members": []}));
        assert_eq!(forward.next_link(), Some("/p2"));
    }

    #[test]
    fn test_page_without_members_key() {
        let page = Page::from_body(&json!({"uri": "/p1", "nextPageUri": "/p2"}));
        assert!(page.members.is_none());
    }

    #[tokio::test]
    async fn test_follows_pages_in_order() {
        let client = MockClient::new();
        client.on(Method::GET, "/rest/fc-networks", page("/rest/fc-networks", json!([{"n": 1}, {"n": 2}]), Some("/rest/fc-networks?start=2")));
        client.on(Method::GET, "/rest/fc-networks?start=2", page("/rest/fc-networks?start=2", json!([{"n": 3}]), None));

        let members = find_with_pagination(&client, "/rest/fc-networks", &Headers::new())
            .await
            .unwrap();

        assert_eq!(members, vec![json!({"n": 1}), json!({"n": 2}), json!({"n": 3})]);
        assert_eq!(client.request_count(), 2);
    }

    #[tokio::test]
    async fn test_self_referential_link_terminates() {
        let client = MockClient::new();
        client.on(Method::GET, "/p1", page("/p1", json!([{"n": 1}, {"n": 2}]), Some("/p2")));
        client.on(Method::GET, "/p2", page("/p2", json!([{"n": 3}, {"n": 4}]), Some("/p2")));
        client.on(Method::GET, "/p3", page("/p3", json!([{"n": 5}, {"n": 6}]), Some("/p3")));

        let members = find_with_pagination(&client, "/p1", &Headers::new())
            .await
            .unwrap();

        assert_eq!(members.len(), 4);
        assert_eq!(members[3], json!({"n": 4}));
        assert!(client.requests().iter().all(|r| r.path != "/p3"));
    }

    #[tokio::test]
    async fn test_link_cycle_terminates() {
        let client = MockClient::new();
        client.on(Method::GET, "/p1", page("/p1", json!([{"n": 1}, {"n": 2}]), Some("/p2")));
        client.on(Method::GET, "/p2", page("/p2", json!([{"n": 3}]), Some("/p1")));

        let members = find_with_pagination(&client, "/p1", &Headers::new())
            .await
            .unwrap();

        assert_eq!(members.len(), 3);
        assert_eq!(client.request_count(), 2);
    }

    #[tokio::test]
    async fn test_missing_members_stops_immediately() {
        let client = MockClient::new();
        client.on(
            Method::GET,
            "/p1",
            RawResponse::json(200, &json!({"uri": "/p1", "nextPageUri": "/p2"})),
        );

        let members = find_with_pagination(&client, "/p1", &Headers::new())
            .await
            .unwrap();

        assert!(members.is_empty());
        assert_eq!(client.request_count(), 1);
    }

    #[tokio::test]
    async fn test_error_page_propagates() {
        let client = MockClient::new();
        client.on(Method::GET, "/p1", RawResponse::json(500, &json!({"message": "boom"})));

        let result = find_with_pagination(&client, "/p1", &Headers::new()).await;
        assert!(result.is_err());
    }
}
