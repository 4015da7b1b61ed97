pub mod api;
pub mod config;
pub mod dom;
pub mod error;
pub mod frame;
pub mod locator;
pub mod models;
pub mod playback;
pub mod recording;
