//! Job coordinator: owns the current media and the resolve/download state,
//! starts workers and turns their messages into [`CoordinatorEvent`]s.
//!
//! Workers are tokio tasks that only send messages; every state change
//! happens in `JobCoordinator::apply` on the consuming side. Requests made
//! while a job of the same kind is running are dropped.

mod events;
mod state;

use std::sync::Arc;
use tokio::sync::mpsc;

use crate::config::AgrabConfig;
use crate::download::{
    AudioDownloader, DownloadJob, DownloadRequest, ProgressEvent, YtDlpDownloader,
};
use crate::media::MediaInfo;
use crate::resolver::{MediaExtractor, MetadataResolver, ResolveError, YtDlpExtractor};
use crate::segmenter::{Ffmpeg, SegmentTool, Segmenter};

pub use events::{CoordinatorEvent, MetadataReady};
pub use state::{JobSlot, JobState, JobToken};

/// External services the jobs run against.
#[derive(Clone)]
pub struct Services {
    pub extractor: Arc<dyn MediaExtractor>,
    pub downloader: Arc<dyn AudioDownloader>,
    pub segment_tool: Arc<dyn SegmentTool>,
    /// Target codec of the transcode (also the output extension).
    pub audio_codec: String,
}

impl Services {
    /// yt-dlp and ffmpeg, as configured.
    pub fn from_config(cfg: &AgrabConfig) -> Self {
        Self {
            extractor: Arc::new(YtDlpExtractor::new(cfg.ytdlp_bin.clone())),
            downloader: Arc::new(YtDlpDownloader::new(cfg.ytdlp_bin.clone())),
            segment_tool: Arc::new(Ffmpeg::new(cfg.ffmpeg_bin.clone())),
            audio_codec: cfg.audio_codec.clone(),
        }
    }
}

#[derive(Debug)]
enum WorkerMessage {
    ResolveStarted {
        token: JobToken,
        url: String,
    },
    Resolved {
        token: JobToken,
        result: Result<MediaInfo, ResolveError>,
    },
    Download {
        token: JobToken,
        event: ProgressEvent,
    },
}

pub struct JobCoordinator {
    resolver: MetadataResolver,
    downloader: Arc<dyn AudioDownloader>,
    segmenter: Segmenter,
    audio_codec: String,
    current_media: Option<MediaInfo>,
    resolve: JobSlot,
    download: JobSlot,
    tx: mpsc::UnboundedSender<WorkerMessage>,
    rx: mpsc::UnboundedReceiver<WorkerMessage>,
}

impl JobCoordinator {
    pub fn new(services: Services) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            resolver: MetadataResolver::new(services.extractor),
            downloader: services.downloader,
            segmenter: Segmenter::new(services.segment_tool),
            audio_codec: services.audio_codec,
            current_media: None,
            resolve: JobSlot::default(),
            download: JobSlot::default(),
            tx,
            rx,
        }
    }

    /// Last successfully resolved media, if any.
    pub fn current_media(&self) -> Option<&MediaInfo> {
        self.current_media.as_ref()
    }

    pub fn resolve_state(&self) -> JobState {
        self.resolve.state()
    }

    pub fn download_state(&self) -> JobState {
        self.download.state()
    }

    /// Whether any worker is still running.
    pub fn is_busy(&self) -> bool {
        self.resolve.is_running() || self.download.is_running()
    }

    /// Starts a metadata query for `url` in the background. Returns false
    /// (and does nothing) while a resolve is already running.
    ///
    /// Must be called from within a tokio runtime.
    pub fn request_resolve(&mut self, url: &str) -> bool {
        let Some(token) = self.resolve.try_start() else {
            tracing::debug!(url, "resolve already running; request dropped");
            return false;
        };
        tracing::info!(url, token = token.get(), "resolve started");

        let tx = self.tx.clone();
        let resolver = self.resolver.clone();
        let url = url.to_string();
        tokio::spawn(async move {
            let _ = tx.send(WorkerMessage::ResolveStarted {
                token,
                url: url.clone(),
            });
            let worker = tokio::spawn(async move { resolver.resolve(&url).await });
            let result = match worker.await {
                Ok(result) => result,
                Err(e) => {
                    tracing::error!(error = %e, "resolve worker aborted");
                    Err(ResolveError::new(format!("metadata query aborted: {e}")))
                }
            };
            let _ = tx.send(WorkerMessage::Resolved { token, result });
        });
        true
    }

    /// Starts downloading the current media. Returns false (and does nothing)
    /// when no downloadable media is resolved or a download is running.
    /// `request.source_url` is replaced by the current media URL.
    ///
    /// Must be called from within a tokio runtime.
    pub fn request_download(&mut self, mut request: DownloadRequest) -> bool {
        if self.download.is_running() {
            tracing::debug!("download already running; request dropped");
            return false;
        }
        let Some(media) = self.current_media.as_ref() else {
            tracing::debug!("no media resolved; download request dropped");
            return false;
        };
        if !media.is_downloadable() {
            tracing::debug!(id = %media.id, "no audio-only stream; download request dropped");
            return false;
        }
        let Some(token) = self.download.try_start() else {
            return false;
        };

        request.source_url = media.url.clone();
        tracing::info!(
            url = %request.source_url,
            output = %request.output_path.display(),
            token = token.get(),
            "download started"
        );
        let job = DownloadJob::new(
            request,
            media.duration_seconds,
            self.audio_codec.clone(),
            Arc::clone(&self.downloader),
            self.segmenter.clone(),
        );

        let tx = self.tx.clone();
        tokio::spawn(async move {
            let worker_tx = tx.clone();
            let worker = tokio::spawn(async move {
                let mut emit = |event: ProgressEvent| {
                    let _ = worker_tx.send(WorkerMessage::Download { token, event });
                };
                let _ = job.run(&mut emit).await;
            });
            if let Err(e) = worker.await {
                tracing::error!(error = %e, "download worker aborted");
                let _ = tx.send(WorkerMessage::Download {
                    token,
                    event: ProgressEvent::Failed(format!("download aborted: {e}")),
                });
            }
        });
        true
    }

    /// Applies one worker message to the coordinator state. Messages from
    /// stale jobs are dropped and yield no event.
    fn apply(&mut self, msg: WorkerMessage) -> Option<CoordinatorEvent> {
        match msg {
            WorkerMessage::ResolveStarted { token, url } => {
                if !self.resolve.is_current(token) {
                    tracing::debug!(token = token.get(), "stale resolve start dropped");
                    return None;
                }
                Some(CoordinatorEvent::ResolveStarted { url })
            }
            WorkerMessage::Resolved { token, result } => {
                if !self.resolve.finish(token) {
                    tracing::debug!(token = token.get(), "stale resolve result dropped");
                    return None;
                }
                let ready = match result {
                    Ok(info) => {
                        let ready = MetadataReady::from_media(&info, &self.audio_codec);
                        self.current_media = Some(info);
                        ready
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "resolve failed");
                        self.current_media = None;
                        MetadataReady::from_error(&e)
                    }
                };
                Some(CoordinatorEvent::MetadataReady(ready))
            }
            WorkerMessage::Download { token, event } => {
                if !self.download.is_current(token) {
                    tracing::debug!(token = token.get(), ?event, "stale download event dropped");
                    return None;
                }
                if event.is_terminal() {
                    self.download.finish(token);
                    tracing::info!(token = token.get(), ?event, "download ended");
                }
                Some(CoordinatorEvent::Download(event))
            }
        }
    }

    /// Waits for the next event. Returns `None` once no job is running and
    /// every queued message has been applied.
    pub async fn next_event(&mut self) -> Option<CoordinatorEvent> {
        loop {
            let msg = if self.is_busy() {
                self.rx.recv().await?
            } else {
                self.rx.try_recv().ok()?
            };
            if let Some(event) = self.apply(msg) {
                return Some(event);
            }
        }
    }
}
