//! Network module for packet interception and rewriting.
//!
//! This module contains components for receiving queued packets from
//! netfilter, rewriting their TCP payloads and returning verdicts.

pub mod core;
pub mod modules;
pub mod processing;
pub mod types;
