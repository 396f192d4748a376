//! KAT torrent indexer
//!
//! Searches KickassTorrents' RSS endpoint for TV episodes and keeps a cache of
//! its latest TV feed. See [indexer::KatProvider].

pub mod cli;
pub mod config;
pub mod indexer;
pub mod jobs;
pub mod services;
