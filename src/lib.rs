//! lanshare: share files with every device on the local network.
//!
//! A small axum server that accepts browser uploads into a flat directory,
//! serves them back as downloads, and renders a QR code pointing at its own
//! LAN address.

pub mod config;
pub mod logging;
pub mod network;
pub mod qr;
pub mod server;
pub mod storage;
