//! Core of agrab: resolve a media URL, download its best audio stream,
//! transcode it and optionally split it into fixed-length parts.

pub mod config;
pub mod coordinator;
pub mod download;
pub mod logging;
pub mod media;
pub mod resolver;
pub mod segmenter;
pub mod tools;
