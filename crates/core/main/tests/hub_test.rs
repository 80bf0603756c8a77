//! Facade integration tests over the in-memory credential store.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{broadcast, mpsc, Semaphore};
use webhub::prelude::*;
use webhub_adapter_memory::MemoryCredentialStore;

/// Unroutable base so an accidental upstream call fails fast instead of
/// reaching the real APIs.
const DEAD_BASE: &str = "http://127.0.0.1:9";

fn test_config() -> HubConfig {
    HubConfig::new()
        .with_timeout(Duration::from_millis(500))
        .with_vercel_base_url(DEAD_BASE)
        .with_github_base_url(DEAD_BASE)
}

fn test_hub() -> Hub {
    Hub::builder()
        .store(MemoryCredentialStore::new())
        .config(test_config())
        .build()
        .unwrap()
}

/// Serves the same canned JSON body for every request on a local port
/// and returns the base URL. The listener dies with the test runtime.
async fn serve_json(body: &'static str) -> String {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            tokio::spawn(async move {
                // Requests here are bodiless GETs; read to the header end.
                let mut request = Vec::new();
                let mut buf = [0u8; 1024];
                loop {
                    match socket.read(&mut buf).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => {
                            request.extend_from_slice(&buf[..n]);
                            if request.windows(4).any(|window| window == b"\r\n\r\n") {
                                break;
                            }
                        }
                    }
                }
                let response = format!(
                    "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn test_analytics_without_credential_is_unauthorized() {
    let hub = test_hub();
    let query = AnalyticsQuery::new("prj_1", 0, 1000);

    let err = hub.analytics(&query).await.unwrap_err();

    // An attempted call against the dead base would surface as
    // UpstreamUnavailable instead.
    assert!(matches!(err, HubError::Unauthorized { .. }));
    assert_eq!(err.platform(), Some(Platform::Deployment));
}

#[tokio::test]
async fn test_analytics_validates_before_credential_check() {
    let hub = test_hub();

    let err = hub
        .analytics(&AnalyticsQuery::new("", 0, 1000))
        .await
        .unwrap_err();
    assert!(matches!(err, HubError::InvalidRequest { .. }));

    let err = hub
        .analytics(&AnalyticsQuery::new("prj_1", 5, 5))
        .await
        .unwrap_err();
    assert!(matches!(err, HubError::InvalidRequest { .. }));
}

#[tokio::test]
async fn test_analytics_end_to_end_over_local_upstream() {
    let base = serve_json(
        r#"{"pageviews": [{"date": "2025-01-01", "count": 100}, {"date": "2025-01-02", "count": 50}]}"#,
    )
    .await;
    let hub = Hub::builder()
        .store(MemoryCredentialStore::new())
        .config(HubConfig::new().with_vercel_base_url(base))
        .build()
        .unwrap();
    hub.connect(Platform::Deployment, "tok").await.unwrap();

    let result = hub
        .analytics(&AnalyticsQuery::new("prj_1", 0, 1000))
        .await
        .unwrap();

    assert_eq!(result.series.len(), 2);
    assert_eq!(result.total.page_views, "150");
    assert!(result.visitors.is_estimated());
    assert_eq!(result.visitors.count(), 90);
}

#[tokio::test]
async fn test_connect_rejects_blank_token() {
    let hub = test_hub();
    let err = hub.connect(Platform::Deployment, "   ").await.unwrap_err();
    assert!(matches!(err, HubError::InvalidRequest { .. }));
}

#[tokio::test]
async fn test_connect_disconnect_lifecycle() {
    let hub = test_hub();
    let mut changes = hub.subscribe_changes();

    hub.connect(Platform::SourceHosting, "gho_abc").await.unwrap();
    assert_eq!(
        changes.recv().await.unwrap(),
        CredentialEvent::connected(Platform::SourceHosting)
    );

    let status = hub.connection_status().await.unwrap();
    assert_eq!(status.len(), 3);
    assert_eq!(status[0].platform, Platform::Deployment);
    assert!(!status[0].connected);
    assert!(status[1].connected);
    assert!(status[1].connected_at.is_some());

    assert!(hub.disconnect(Platform::SourceHosting).await.unwrap());
    assert_eq!(
        changes.recv().await.unwrap(),
        CredentialEvent::disconnected(Platform::SourceHosting)
    );
    assert!(!hub.disconnect(Platform::SourceHosting).await.unwrap());
}

#[tokio::test]
async fn test_overview_degrades_all_panels_without_credentials() {
    let hub = test_hub();

    let overview = hub.overview().await.unwrap();

    let deployment = overview.deployment.unwrap_err();
    assert_eq!(deployment.platform(), Some(Platform::Deployment));
    let source = overview.source.unwrap_err();
    assert_eq!(source.platform(), Some(Platform::SourceHosting));
    let backend = overview.backend.unwrap_err();
    assert_eq!(backend.platform(), Some(Platform::Backend));
}

#[tokio::test]
async fn test_overview_keeps_connected_panel_while_others_degrade() {
    let base = serve_json(r#"{"projects": []}"#).await;
    let hub = Hub::builder()
        .store(MemoryCredentialStore::new())
        .config(
            HubConfig::new()
                .with_timeout(Duration::from_millis(500))
                .with_vercel_base_url(base)
                .with_github_base_url(DEAD_BASE),
        )
        .build()
        .unwrap();
    hub.connect(Platform::Deployment, "tok").await.unwrap();
    hub.connect(Platform::SourceHosting, "tok").await.unwrap();

    let overview = hub.overview().await.unwrap();

    assert!(overview.deployment.is_ok());
    assert!(matches!(
        overview.source.unwrap_err(),
        HubError::UpstreamUnavailable { .. }
    ));
    assert!(matches!(
        overview.backend.unwrap_err(),
        HubError::Unauthorized { .. }
    ));
}

#[tokio::test]
async fn test_backend_overview_requires_project_url() {
    let hub = test_hub();
    hub.connect(Platform::Backend, "service-role-key")
        .await
        .unwrap();

    let err = hub.backend_overview().await.unwrap_err();
    assert!(matches!(err, HubError::InvalidRequest { .. }));
    assert!(err.to_string().contains("project URL"));
}

#[tokio::test]
async fn test_project_url_roundtrip_strips_trailing_slash() {
    let hub = test_hub();
    hub.set_project_url("https://db.example.co/").await.unwrap();
    assert_eq!(
        hub.project_url().await.unwrap().as_deref(),
        Some("https://db.example.co")
    );

    let err = hub.set_project_url("  ").await.unwrap_err();
    assert!(matches!(err, HubError::InvalidRequest { .. }));
}

#[tokio::test]
async fn test_table_rows_requires_table_name() {
    let hub = test_hub();
    let err = hub.table_rows(" ", 50).await.unwrap_err();
    assert!(matches!(err, HubError::InvalidRequest { .. }));
}

/// Store whose credential reads park on a semaphore, letting a test
/// hold several facade calls in flight at once.
struct GatedStore {
    inner: MemoryCredentialStore,
    entered: mpsc::UnboundedSender<()>,
    gate: Arc<Semaphore>,
}

#[async_trait]
impl CredentialStore for GatedStore {
    async fn get(&self, platform: Platform) -> HubResult<Option<Credential>> {
        let _ = self.entered.send(());
        let _permit = self.gate.acquire().await.expect("gate closed");
        self.inner.get(platform).await
    }

    async fn set(&self, platform: Platform, token: String) -> HubResult<Credential> {
        self.inner.set(platform, token).await
    }

    async fn delete(&self, platform: Platform) -> HubResult<bool> {
        self.inner.delete(platform).await
    }

    fn subscribe(&self) -> broadcast::Receiver<CredentialEvent> {
        self.inner.subscribe()
    }

    async fn get_project_url(&self) -> HubResult<Option<String>> {
        self.inner.get_project_url().await
    }

    async fn set_project_url(&self, url: String) -> HubResult<()> {
        self.inner.set_project_url(url).await
    }

    async fn delete_project_url(&self) -> HubResult<bool> {
        self.inner.delete_project_url().await
    }
}

#[tokio::test]
async fn test_stale_analytics_call_is_superseded() {
    let inner = MemoryCredentialStore::new();
    inner
        .set(Platform::Deployment, "tok".to_string())
        .await
        .unwrap();

    let (entered_tx, mut entered_rx) = mpsc::unbounded_channel();
    let gate = Arc::new(Semaphore::new(0));
    let hub = Arc::new(
        Hub::builder()
            .store(GatedStore {
                inner,
                entered: entered_tx,
                gate: gate.clone(),
            })
            .config(test_config())
            .build()
            .unwrap(),
    );
    let query = AnalyticsQuery::new("prj_1", 0, 1000);

    // Each call signals `entered` only after taking its ticket, so the
    // first call is known to hold the older ticket.
    let first = {
        let hub = hub.clone();
        let query = query.clone();
        tokio::spawn(async move { hub.analytics(&query).await })
    };
    entered_rx.recv().await.unwrap();

    let second = {
        let hub = hub.clone();
        let query = query.clone();
        tokio::spawn(async move { hub.analytics(&query).await })
    };
    entered_rx.recv().await.unwrap();

    gate.add_permits(2);

    let first = first.await.unwrap().unwrap_err();
    assert!(matches!(first, HubError::Superseded));

    let second = second.await.unwrap().unwrap_err();
    assert!(matches!(second, HubError::UpstreamUnavailable { .. }));
}
