//! Minimal dashboard wiring.
//!
//! Run with: cargo run --example dashboard

use webhub::prelude::*;
use webhub_adapter_memory::MemoryCredentialStore;

#[tokio::main]
async fn main() -> Result<(), HubError> {
    let hub = Hub::builder()
        .store(MemoryCredentialStore::new())
        .config(HubConfig::default())
        .build()?;

    // Connect whichever platforms have tokens in the environment.
    for (platform, var) in [
        (Platform::Deployment, "VERCEL_TOKEN"),
        (Platform::SourceHosting, "GITHUB_TOKEN"),
        (Platform::Backend, "SUPABASE_SERVICE_KEY"),
    ] {
        if let Ok(token) = std::env::var(var) {
            hub.connect(platform, token).await?;
            println!("connected {}", platform.display_name());
        }
    }
    if let Ok(url) = std::env::var("SUPABASE_URL") {
        hub.set_project_url(url).await?;
    }

    // Each panel degrades on its own; a missing token above shows up
    // here as an unavailable panel, not a failed run.
    let overview = hub.overview().await?;

    match &overview.deployment {
        Ok(projects) => println!("deployment: {} projects", projects.len()),
        Err(err) => println!("deployment unavailable: {err}"),
    }
    match &overview.source {
        Ok(source) => println!(
            "source: {} repositories, {} issues",
            source.repositories.len(),
            source.issues.len()
        ),
        Err(err) => println!("source unavailable: {err}"),
    }
    match &overview.backend {
        Ok(backend) => println!("backend: {} tables", backend.tables.len()),
        Err(err) => println!("backend unavailable: {err}"),
    }

    Ok(())
}
