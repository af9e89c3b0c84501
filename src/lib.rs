#![doc(test(attr(deny(warnings))))]

//! finhabit core: monthly finance aggregation and daily habit tracking over
//! a single user's record book, with JSON persistence and a small shell.

pub mod book;
pub mod cli;
pub mod config;
pub mod core;
pub mod currency;
pub mod domain;
pub mod errors;
pub mod storage;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!(version = env!("CARGO_PKG_VERSION"), "finhabit core initialized");
    });
}
