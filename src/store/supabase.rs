use crate::config::StoreConfig;
use crate::error::{Error, Result};
use crate::recipe::Recipe;
use crate::store::{rows_to_recipes, validate_identifier, RecipeRow, RecipeSource};
use crate::utils::sanitize::truncate;
use async_trait::async_trait;
use reqwest::{header, Client, Response};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error};

/// Read-only client for a Supabase project's PostgREST API
#[derive(Clone)]
pub struct SupabaseSource {
    client: Client,
    base_url: String,
    table: String,
    /// Column the pages are ordered by so offsets stay stable
    order_column: String,
    page_size: usize,
}

/// Result of probing one table
#[derive(Debug, Clone, Serialize)]
pub struct TableReport {
    pub table: String,
    /// Exact row count reported by the server
    pub rows: Option<u64>,
    /// Column names of the first row
    pub columns: Vec<String>,
    pub sample: Option<Value>,
    pub error: Option<String>,
}

impl SupabaseSource {
    pub fn new(base_url: &str, key: &str, table: &str, page_size: usize) -> Result<Self> {
        url::Url::parse(base_url)?;
        validate_identifier(table)?;

        let mut headers = header::HeaderMap::new();
        let key_value = header::HeaderValue::from_str(key)
            .map_err(|e| Error::Config(format!("Invalid Supabase key: {e}")))?;
        headers.insert("apikey", key_value);
        headers.insert(
            header::AUTHORIZATION,
            header::HeaderValue::from_str(&format!("Bearer {key}"))
                .map_err(|e| Error::Config(format!("Invalid Supabase key: {e}")))?,
        );
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(Error::Http)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            table: table.to_string(),
            order_column: "title".to_string(),
            page_size: page_size.max(1),
        })
    }

    /// Order pages by `column` instead of `title`
    pub fn with_order_column(mut self, column: &str) -> Result<Self> {
        self.order_column = validate_identifier(column)?.to_string();
        Ok(self)
    }

    pub fn from_config(config: &StoreConfig) -> Result<Self> {
        let url = config
            .supabase_url
            .as_deref()
            .ok_or_else(|| Error::Config("SUPABASE_URL is not set".to_string()))?;
        let key = config
            .supabase_key
            .as_deref()
            .ok_or_else(|| Error::Config("SUPABASE_KEY is not set".to_string()))?;

        Self::new(url, key, &config.table, config.page_size)?
            .with_order_column(&config.order_column)
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    async fn check(response: Response, table: &str) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unable to read error response".to_string());
        error!("Supabase error for {}: {} - {}", table, status, truncate(&body, 200));

        Err(Error::Store(format!(
            "{table}: HTTP {status}: {}",
            truncate(&body, 200)
        )))
    }

    /// One page of rows plus the table total from `Content-Range`, when the
    /// server reports it
    async fn fetch_page(&self, offset: usize) -> Result<(Vec<RecipeRow>, Option<u64>)> {
        debug!(
            "Supabase request: GET {} (offset {}, limit {})",
            self.table, offset, self.page_size
        );

        let response = self
            .client
            .get(self.table_url(&self.table))
            .header("Prefer", "count=exact")
            .query(&[
                ("select", "*".to_string()),
                ("order", format!("{}.asc", self.order_column)),
                ("limit", self.page_size.to_string()),
                ("offset", offset.to_string()),
            ])
            .send()
            .await?;

        let response = Self::check(response, &self.table).await?;
        let total = content_range_total(&response);
        let rows = response
            .json::<Vec<RecipeRow>>()
            .await
            .map_err(|e| Error::Store(format!("Failed to parse {} rows: {e}", self.table)))?;

        Ok((rows, total))
    }

    /// Row count, columns and a sample row of any table in the project
    pub async fn probe_table(&self, table: &str) -> TableReport {
        let mut report = TableReport {
            table: table.to_string(),
            rows: None,
            columns: Vec::new(),
            sample: None,
            error: None,
        };

        if let Err(e) = validate_identifier(table) {
            report.error = Some(e.to_string());
            return report;
        }

        let result = async {
            let response = self
                .client
                .get(self.table_url(table))
                .header("Prefer", "count=exact")
                .query(&[("select", "*"), ("limit", "1")])
                .send()
                .await?;
            let response = Self::check(response, table).await?;

            let rows = content_range_total(&response);
            let body: Vec<Value> = response.json().await?;
            Ok::<_, Error>((rows, body))
        }
        .await;

        match result {
            Ok((rows, body)) => {
                report.rows = rows;
                if let Some(first) = body.into_iter().next() {
                    if let Some(object) = first.as_object() {
                        report.columns = object.keys().cloned().collect();
                    }
                    report.sample = Some(first);
                }
            }
            Err(e) => report.error = Some(e.log_safe()),
        }

        report
    }
}

fn content_range_total(response: &Response) -> Option<u64> {
    response
        .headers()
        .get(header::CONTENT_RANGE)
        .and_then(|v| v.to_str().ok())
        .and_then(parse_content_range_total)
}

/// Total from a PostgREST `Content-Range` header such as `0-0/123` or `*/0`
fn parse_content_range_total(value: &str) -> Option<u64> {
    value.rsplit_once('/')?.1.trim().parse().ok()
}

#[async_trait]
impl RecipeSource for SupabaseSource {
    fn name(&self) -> &str {
        "supabase"
    }

    /// Page until an empty page or the reported total. A page shorter than
    /// `page_size` is not the end: the server may cap rows per response.
    async fn fetch_all(&self) -> Result<Vec<Recipe>> {
        let mut rows = Vec::new();
        let mut offset = 0;

        loop {
            let (page, total) = self.fetch_page(offset).await?;
            if page.is_empty() {
                break;
            }
            offset += page.len();
            rows.extend(page);

            if total.is_some_and(|total| offset as u64 >= total) {
                break;
            }
        }

        Ok(rows_to_recipes(rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    #[test]
    fn test_parse_content_range() {
        assert_eq!(parse_content_range_total("0-0/123"), Some(123));
        assert_eq!(parse_content_range_total("*/0"), Some(0));
        assert_eq!(parse_content_range_total("0-9/*"), None);
        assert_eq!(parse_content_range_total("garbage"), None);
    }

    #[test]
    fn test_rejects_bad_table() {
        assert!(SupabaseSource::new("https://x.supabase.co", "key", "a;b", 10).is_err());
        assert!(SupabaseSource::new("not a url", "key", "recipes", 10).is_err());
    }

    #[tokio::test]
    async fn test_fetch_all_pages() {
        let mut server = Server::new_async().await;
        let first = server
            .mock("GET", "/rest/v1/recipes_raw_view")
            .match_header("apikey", "anon-key")
            .match_header("authorization", "Bearer anon-key")
            .match_header("prefer", "count=exact")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("select".into(), "*".into()),
                Matcher::UrlEncoded("order".into(), "title.asc".into()),
                Matcher::UrlEncoded("limit".into(), "2".into()),
                Matcher::UrlEncoded("offset".into(), "0".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_header("content-range", "0-1/3")
            .with_body(
                r#"[
                    {"title": "עוגת גזר", "raw_text": "עוגת גזר\nמצרכים\nגזר"},
                    {"title": "חומוס", "raw": "חומוס\nמצרכים\nחומוס"}
                ]"#,
            )
            .create_async()
            .await;
        let second = server
            .mock("GET", "/rest/v1/recipes_raw_view")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("limit".into(), "2".into()),
                Matcher::UrlEncoded("offset".into(), "2".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_header("content-range", "2-2/3")
            .with_body(r#"[{"title": "ללא גוף"}]"#)
            .create_async()
            .await;

        let source = SupabaseSource::new(&server.url(), "anon-key", "recipes_raw_view", 2).unwrap();
        let recipes = source.fetch_all().await.unwrap();

        assert_eq!(recipes.len(), 2);
        assert_eq!(recipes[0].title, "עוגת גזר");
        assert_eq!(recipes[1].raw_text, "חומוס\nמצרכים\nחומוס");
        first.assert_async().await;
        second.assert_async().await;
    }

    fn page(server: &mut mockito::ServerGuard, offset: &str, body: &str) -> mockito::Mock {
        server
            .mock("GET", "/rest/v1/recipes_raw_view")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("limit".into(), "5".into()),
                Matcher::UrlEncoded("offset".into(), offset.into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
    }

    #[tokio::test]
    async fn test_short_pages_keep_paging_until_empty() {
        // Server caps responses at fewer rows than asked for and reports no total
        let mut server = Server::new_async().await;
        let first = page(
            &mut server,
            "0",
            r#"[{"title": "א", "raw_text": "א"}, {"title": "ב", "raw_text": "ב"}]"#,
        )
        .create_async()
        .await;
        let second = page(&mut server, "2", r#"[{"title": "ג", "raw_text": "ג"}]"#)
            .create_async()
            .await;
        let last = page(&mut server, "3", "[]").create_async().await;

        let source = SupabaseSource::new(&server.url(), "anon-key", "recipes_raw_view", 5).unwrap();
        let recipes = source.fetch_all().await.unwrap();

        let titles: Vec<&str> = recipes.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["א", "ב", "ג"]);
        first.assert_async().await;
        second.assert_async().await;
        last.assert_async().await;
    }

    #[tokio::test]
    async fn test_reported_total_ends_paging() {
        let mut server = Server::new_async().await;
        let first = page(
            &mut server,
            "0",
            r#"[{"title": "א", "raw_text": "א"}, {"title": "ב", "raw_text": "ב"}]"#,
        )
        .with_header("content-range", "0-1/3")
        .create_async()
        .await;
        let second = page(&mut server, "2", r#"[{"title": "ג", "raw_text": "ג"}]"#)
            .with_header("content-range", "2-2/3")
            .create_async()
            .await;
        let beyond = page(&mut server, "3", "[]").expect(0).create_async().await;

        let source = SupabaseSource::new(&server.url(), "anon-key", "recipes_raw_view", 5).unwrap();
        let recipes = source.fetch_all().await.unwrap();

        assert_eq!(recipes.len(), 3);
        first.assert_async().await;
        second.assert_async().await;
        beyond.assert_async().await;
    }

    #[tokio::test]
    async fn test_custom_order_column() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/rest/v1/recipes_raw_view")
            .match_query(Matcher::UrlEncoded("order".into(), "id.asc".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_header("content-range", "*/0")
            .with_body("[]")
            .create_async()
            .await;

        let source = SupabaseSource::new(&server.url(), "anon-key", "recipes_raw_view", 5)
            .unwrap()
            .with_order_column("id")
            .unwrap();
        assert!(source.fetch_all().await.unwrap().is_empty());
        mock.assert_async().await;

        let source = SupabaseSource::new(&server.url(), "anon-key", "recipes_raw_view", 5).unwrap();
        assert!(source.with_order_column("id desc").is_err());
    }

    #[tokio::test]
    async fn test_fetch_all_error() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/rest/v1/recipes_raw_view")
            .match_query(Matcher::Any)
            .with_status(401)
            .with_body(r#"{"message": "Invalid API key"}"#)
            .create_async()
            .await;

        let source = SupabaseSource::new(&server.url(), "bad", "recipes_raw_view", 100).unwrap();
        let result = source.fetch_all().await;

        assert!(matches!(result, Err(Error::Store(_))));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_probe_table() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/rest/v1/substitutions_clean")
            .match_header("prefer", "count=exact")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_header("content-range", "0-0/42")
            .with_body(r#"[{"ingredient": "ביצה", "substitute": "זרעי פשתן"}]"#)
            .create_async()
            .await;

        let source = SupabaseSource::new(&server.url(), "anon", "recipes_raw_view", 100).unwrap();
        let report = source.probe_table("substitutions_clean").await;

        assert_eq!(report.rows, Some(42));
        assert_eq!(report.columns, vec!["ingredient", "substitute"]);
        assert!(report.error.is_none());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_probe_missing_table() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/rest/v1/nope")
            .match_query(Matcher::Any)
            .with_status(404)
            .with_body(r#"{"message": "relation does not exist"}"#)
            .create_async()
            .await;

        let source = SupabaseSource::new(&server.url(), "anon", "recipes_raw_view", 100).unwrap();
        let report = source.probe_table("nope").await;

        assert!(report.rows.is_none());
        assert!(report.error.is_some());
    }
}
