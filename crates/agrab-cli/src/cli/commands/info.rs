//! `agrab info` – resolve a URL and print its metadata.

use agrab_core::config::AgrabConfig;
use agrab_core::coordinator::{CoordinatorEvent, JobCoordinator, MetadataReady, Services};
use anyhow::{bail, Result};

/// Runs one resolve on `coord` and waits for its outcome.
pub(super) async fn resolve_metadata(
    coord: &mut JobCoordinator,
    url: &str,
) -> Result<MetadataReady> {
    if !coord.request_resolve(url) {
        bail!("a metadata query is already running");
    }
    while let Some(event) = coord.next_event().await {
        match event {
            CoordinatorEvent::ResolveStarted { url } => eprintln!("Resolving {url} ..."),
            CoordinatorEvent::MetadataReady(ready) => return Ok(ready),
            CoordinatorEvent::Download(_) => {}
        }
    }
    bail!("metadata query ended without a result")
}

pub async fn run_info(cfg: &AgrabConfig, url: &str) -> Result<()> {
    let mut coord = JobCoordinator::new(Services::from_config(cfg));
    let ready = resolve_metadata(&mut coord, url).await?;
    if !ready.resolved {
        bail!("{}", ready.text);
    }
    println!("{}", ready.text);
    if let Some(name) = ready.suggested_filename {
        println!("File: {name}");
    }
    Ok(())
}
