//! emosense-ui library - interactive emotion-analysis client
//!
//! Owns the upload/playback state machine that mediates between user file
//! input and the remote classification result:
//! - `client`: one-shot multipart upload to the inference service
//! - `controller`: the five-field state machine and its transitions
//! - `playback`: single-active-clip audio output behind a trait
//! - `view`: pure projection of controller state into renderable blocks

pub mod client;
pub mod controller;
pub mod playback;
pub mod view;
