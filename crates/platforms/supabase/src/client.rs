//! Backend platform HTTP adapter.

use reqwest::Client;
use serde_json::json;
use webhub_core::error::ApiFailure;
use webhub_core::traits::{ApiResponse, ApiResult};
use webhub_core::types::Credential;

/// Default row limit when browsing a table.
pub const DEFAULT_ROW_LIMIT: u32 = 100;

/// Introspection query issued through the SQL RPC.
const TABLES_QUERY: &str = "SELECT table_name, table_schema FROM information_schema.tables \
                            WHERE table_schema = 'public' AND table_type = 'BASE TABLE' \
                            ORDER BY table_name";

/// HTTP adapter for the backend platform.
///
/// The backend is hosted per project, so there is no fixed base URL:
/// every operation takes the stored project URL alongside the
/// credential. The service key rides in both the `apikey` header and the
/// bearer slot, which is what the upstream gateway expects.
#[derive(Debug, Clone)]
pub struct SupabaseAdapter {
    http_client: Client,
}

impl SupabaseAdapter {
    pub fn new(http_client: Client) -> Self {
        Self { http_client }
    }

    /// Lists tables through the SQL RPC.
    ///
    /// Requires an `exec_sql` function in the project; callers fall back
    /// to [`fetch_rest_root`](Self::fetch_rest_root) when the RPC is
    /// absent or fails.
    pub async fn list_tables(&self, credential: &Credential, project_url: &str) -> ApiResult {
        let url = rpc_url(project_url);
        tracing::debug!("POST {url}");
        let request = self
            .http_client
            .post(url)
            .header("apikey", &credential.token)
            .bearer_auth(&credential.token)
            .header("Prefer", "return=representation")
            .json(&json!({ "query": TABLES_QUERY }));
        self.send(request).await
    }

    /// Fetches the REST root, an OpenAPI document with one path per
    /// exposed table.
    pub async fn fetch_rest_root(&self, credential: &Credential, project_url: &str) -> ApiResult {
        self.send(self.get(&format!("{project_url}/rest/v1/"), credential))
            .await
    }

    /// Fetches up to `limit` rows from one table.
    pub async fn fetch_table_rows(
        &self,
        credential: &Credential,
        project_url: &str,
        table: &str,
        limit: u32,
    ) -> ApiResult {
        self.send(self.get(&rows_url(project_url, table, limit), credential))
            .await
    }

    /// Lists users registered with the auth service.
    ///
    /// Needs the elevated service-role key; the anon key earns a 401.
    pub async fn list_auth_users(&self, credential: &Credential, project_url: &str) -> ApiResult {
        self.send(self.get(&format!("{project_url}/auth/v1/admin/users"), credential))
            .await
    }

    fn get(&self, url: &str, credential: &Credential) -> reqwest::RequestBuilder {
        tracing::debug!("GET {url}");
        self.http_client
            .get(url)
            .header("apikey", &credential.token)
            .bearer_auth(&credential.token)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> ApiResult {
        let response = request.send().await?;
        let status = response.status().as_u16();

        if !(200..300).contains(&status) {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiFailure::status(status, body));
        }

        let body = response.json().await?;
        Ok(ApiResponse { status, body })
    }
}

fn rpc_url(project_url: &str) -> String {
    format!("{project_url}/rest/v1/rpc/exec_sql")
}

fn rows_url(project_url: &str, table: &str, limit: u32) -> String {
    format!("{project_url}/rest/v1/{table}?limit={limit}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rpc_url() {
        assert_eq!(
            rpc_url("https://db.example.com"),
            "https://db.example.com/rest/v1/rpc/exec_sql"
        );
    }

    #[test]
    fn test_rows_url() {
        assert_eq!(
            rows_url("https://db.example.com", "todos", 100),
            "https://db.example.com/rest/v1/todos?limit=100"
        );
    }

    #[test]
    fn test_tables_query_targets_public_schema() {
        assert!(TABLES_QUERY.contains("table_schema = 'public'"));
        assert!(TABLES_QUERY.contains("BASE TABLE"));
    }
}
