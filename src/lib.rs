//! gaze-aoi command-line front end
//!
//! The pipeline itself lives in `gaze-aoi-core` and its configuration in
//! `gaze-aoi-config`; this crate wires them to a UDP socket, a scene file
//! and the terminal.

pub mod cli;
pub mod runner;
pub mod summary;
