//! Integration test: resolve, download and split through the coordinator,
//! with fakes standing in for the external programs.

mod common;

use std::sync::Arc;

use agrab_core::coordinator::{CoordinatorEvent, JobCoordinator, JobState, MetadataReady};
use agrab_core::download::{DownloadRequest, ProgressEvent};
use agrab_core::resolver::ResolveError;
use common::fakes;
use tempfile::tempdir;

async fn resolve(coord: &mut JobCoordinator, url: &str) -> MetadataReady {
    assert!(coord.request_resolve(url));
    while let Some(event) = coord.next_event().await {
        if let CoordinatorEvent::MetadataReady(ready) = event {
            return ready;
        }
    }
    panic!("no metadata event");
}

async fn drain_download(coord: &mut JobCoordinator) -> Vec<ProgressEvent> {
    let mut events = Vec::new();
    while let Some(event) = coord.next_event().await {
        if let CoordinatorEvent::Download(e) = event {
            events.push(e);
        }
    }
    events
}

fn assert_well_formed(events: &[ProgressEvent]) {
    assert_eq!(events.first(), Some(&ProgressEvent::Started));
    assert_eq!(events.iter().filter(|e| e.is_terminal()).count(), 1);
    assert!(events.last().unwrap().is_terminal());
    let percents: Vec<u8> = events
        .iter()
        .filter_map(|e| match e {
            ProgressEvent::Progress(p) => Some(*p),
            _ => None,
        })
        .collect();
    assert!(percents.windows(2).all(|w| w[0] <= w[1]), "{percents:?}");
}

#[tokio::test]
async fn download_splits_into_numbered_parts() {
    let dir = tempdir().unwrap();
    let mut coord = JobCoordinator::new(fakes::services(
        Ok(fakes::media("Long: Talk!", 190)),
        Arc::new(fakes::PartWriter {
            duration_seconds: 190,
        }),
    ));

    let ready = resolve(&mut coord, "https://example.com/talk").await;
    assert!(ready.download_enabled);
    let filename = ready.suggested_filename.unwrap();
    assert_eq!(filename, "Long Talk.mp3");

    let output = dir.path().join(&filename);
    assert!(coord.request_download(DownloadRequest::new(&output).with_segments(60)));
    let events = drain_download(&mut coord).await;

    assert_well_formed(&events);
    assert!(events.contains(&ProgressEvent::Info("splitting into 4 parts".to_string())));
    assert_eq!(events.last(), Some(&ProgressEvent::Finished));
    assert!(!output.exists());
    for i in 0..4 {
        assert!(dir.path().join(format!("Long Talk_{i:03}.mp3")).exists());
    }
    assert!(!dir.path().join("Long Talk_004.mp3").exists());
    assert_eq!(coord.download_state(), JobState::Idle);
}

#[tokio::test]
async fn single_part_keeps_original() {
    let dir = tempdir().unwrap();
    let mut coord = JobCoordinator::new(fakes::services(
        Ok(fakes::media("Song", 300)),
        Arc::new(fakes::PartWriter {
            duration_seconds: 300,
        }),
    ));
    resolve(&mut coord, "https://example.com/song").await;

    let output = dir.path().join("Song.mp3");
    assert!(coord.request_download(DownloadRequest::new(&output).with_segments(300)));
    let events = drain_download(&mut coord).await;

    assert_well_formed(&events);
    assert_eq!(events.last(), Some(&ProgressEvent::Finished));
    assert!(output.exists());
    assert!(!dir.path().join("Song_000.mp3").exists());
}

#[tokio::test]
async fn split_failure_keeps_downloaded_file() {
    let dir = tempdir().unwrap();
    let mut coord = JobCoordinator::new(fakes::services(
        Ok(fakes::media("Song", 400)),
        Arc::new(fakes::BrokenTool),
    ));
    resolve(&mut coord, "https://example.com/song").await;

    let output = dir.path().join("Song.mp3");
    assert!(coord.request_download(DownloadRequest::new(&output).with_segments(60)));
    let events = drain_download(&mut coord).await;

    assert_well_formed(&events);
    assert_eq!(
        events.last(),
        Some(&ProgressEvent::Failed("Invalid argument".to_string()))
    );
    assert!(output.exists());
    assert_eq!(coord.download_state(), JobState::Idle);
}

#[tokio::test]
async fn failed_resolve_blocks_download() {
    let dir = tempdir().unwrap();
    let mut coord = JobCoordinator::new(fakes::services(
        Err(ResolveError::new("Unsupported URL")),
        Arc::new(fakes::BrokenTool),
    ));
    let ready = resolve(&mut coord, "ftp://nope").await;
    assert_eq!(ready.text, "Unsupported URL");
    assert!(!ready.download_enabled);

    assert!(!coord.request_download(DownloadRequest::new(dir.path().join("x.mp3"))));
    assert!(coord.next_event().await.is_none());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn download_writes_to_requested_directory_with_codec_extension() {
    let dir = tempdir().unwrap();
    let mut coord = JobCoordinator::new(fakes::services(
        Ok(fakes::media("Song", 100)),
        Arc::new(fakes::BrokenTool),
    ));
    resolve(&mut coord, "https://example.com/song").await;

    let requested = dir.path().join("Song.m4a");
    assert!(coord.request_download(DownloadRequest::new(&requested)));
    let events = drain_download(&mut coord).await;

    assert_eq!(events.last(), Some(&ProgressEvent::Finished));
    assert!(dir.path().join("Song.mp3").exists());
    assert!(!requested.exists());
}
