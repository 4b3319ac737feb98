//! Media metadata model.
//!
//! Stream variants as reported by the extraction service, best-audio
//! selection, the resolved `MediaInfo` record and filename sanitizing.

mod format;
mod info;
mod sanitize;

pub use format::{select_best_audio, FormatDescriptor, FormatKind};
pub use info::{format_duration, AudioStream, MediaInfo};
pub use sanitize::{sanitize_filename, STRIPPED_CHARS};
