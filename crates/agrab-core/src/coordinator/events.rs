use crate::download::ProgressEvent;
use crate::media::MediaInfo;
use crate::resolver::ResolveError;

/// What the coordinator reports to the presentation side.
#[derive(Debug, Clone, PartialEq)]
pub enum CoordinatorEvent {
    ResolveStarted { url: String },
    MetadataReady(MetadataReady),
    Download(ProgressEvent),
}

/// Outcome of a resolve, ready for display.
#[derive(Debug, Clone, PartialEq)]
pub struct MetadataReady {
    /// Whether the resolve succeeded and replaced the current media.
    pub resolved: bool,
    /// Media summary on success, the resolver's message on failure.
    pub text: String,
    pub download_enabled: bool,
    /// `<sanitized title>.<codec>`; `None` on failure.
    pub suggested_filename: Option<String>,
}

impl MetadataReady {
    pub fn from_media(info: &MediaInfo, codec: &str) -> Self {
        Self {
            resolved: true,
            text: info.summary(),
            download_enabled: info.is_downloadable(),
            suggested_filename: Some(info.suggested_filename(codec)),
        }
    }

    pub fn from_error(err: &ResolveError) -> Self {
        Self {
            resolved: false,
            text: err.message.clone(),
            download_enabled: false,
            suggested_filename: None,
        }
    }
}
