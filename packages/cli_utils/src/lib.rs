#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Shared CLI utilities for the COVID-19 map toolchain.
//!
//! Provides [`init_logger`], which sets up `indicatif-log-bridge` so that
//! `log::info!` and friends are suspended while spinners redraw, and
//! [`Spinner`], a stage spinner that finishes with a summary line.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

pub use indicatif::MultiProgress;

/// A spinner shown while a pipeline stage runs.
pub struct Spinner {
    bar: ProgressBar,
}

impl Spinner {
    /// Adds a ticking spinner with `message` to `multi`.
    #[must_use]
    pub fn start(multi: &MultiProgress, message: &str) -> Self {
        let bar = multi.add(ProgressBar::new_spinner());
        bar.enable_steady_tick(Duration::from_millis(100));
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg} [{elapsed}]")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_message(message.to_string());
        Self { bar }
    }

    /// Stops the spinner, leaving `message` on screen.
    pub fn finish(&self, message: String) {
        self.bar.finish_with_message(message);
    }

    /// Stops the spinner and removes it from the screen.
    pub fn finish_and_clear(&self) {
        self.bar.finish_and_clear();
    }
}

/// Initializes the global logger wrapped in `indicatif-log-bridge` so that
/// `log::info!` and friends are suspended while spinners redraw.
///
/// The level comes from `RUST_LOG`, defaulting to `info` when unset.
///
/// Returns the [`MultiProgress`] that all spinners must be added to.
#[must_use]
pub fn init_logger() -> MultiProgress {
    let multi = MultiProgress::new();

    // Build the pretty-env-logger logger manually so we can wrap it.
    let mut builder = pretty_env_logger::formatted_builder();
    match std::env::var("RUST_LOG") {
        Ok(filters) => {
            builder.parse_filters(&filters);
        }
        Err(_) => {
            builder.filter_level(log::LevelFilter::Info);
        }
    }
    let logger = builder.build();
    let level = logger.filter();

    indicatif_log_bridge::LogWrapper::new(multi.clone(), logger)
        .try_init()
        .ok(); // Ignore error if logger was already set (e.g., in tests)

    log::set_max_level(level);

    multi
}
