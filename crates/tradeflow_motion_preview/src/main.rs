// SPDX-License-Identifier: MIT OR Apache-2.0
//! Tradeflow motion preview
//!
//! A desktop harness for the landing page scroll sequence:
//! - Two hero sections with their own headline animations
//! - The cross-fade hand-off between them
//! - A native-scrolling static page below the sequence
//! - Live state, scroll lock and in-flight indicators
//! - An on-screen log of motion events
//!
//! ## Usage
//!
//! ```text
//! tradeflow_motion_preview [motion.ron] [--reduced-motion]
//! ```

mod app;
mod log_panel;
mod sections;
mod stage;

use app::PreviewApp;
use log_panel::TracingBridge;
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tradeflow_motion_scroll::SequenceConfig;

/// Directives added on top of `RUST_LOG`
const DEFAULT_DIRECTIVES: [&str; 4] = [
    "tradeflow_motion_preview=debug",
    "tradeflow_motion_scroll=debug",
    "wgpu=warn",
    "naga=warn",
];

/// Command line options
#[derive(Debug, Default, PartialEq)]
struct PreviewOptions {
    config_path: Option<PathBuf>,
    reduced_motion: bool,
}

impl PreviewOptions {
    fn from_args(args: impl IntoIterator<Item = String>) -> Self {
        let mut options = Self::default();
        for arg in args {
            match arg.as_str() {
                "--reduced-motion" => options.reduced_motion = true,
                flag if flag.starts_with("--") => tracing::warn!("Ignoring unknown flag {flag}"),
                path if options.config_path.is_none() => {
                    options.config_path = Some(PathBuf::from(path));
                }
                extra => tracing::warn!("Ignoring extra argument {extra}"),
            }
        }
        options
    }

    fn load_config(&self) -> app::Result<SequenceConfig> {
        let config = match &self.config_path {
            Some(path) => SequenceConfig::load(path)?,
            None => SequenceConfig::default(),
        };
        Ok(self.apply(config))
    }

    fn apply(&self, mut config: SequenceConfig) -> SequenceConfig {
        if self.reduced_motion {
            config.reduced_motion = true;
        }
        config
    }
}

fn main() {
    let (bridge_layer, tracing_rx) = TracingBridge::new();

    let env_filter = DEFAULT_DIRECTIVES
        .iter()
        .filter_map(|directive| directive.parse().ok())
        .fold(tracing_subscriber::EnvFilter::from_default_env(), |filter, directive| {
            filter.add_directive(directive)
        });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(bridge_layer)
        .init();

    tracing::info!("Starting Tradeflow motion preview v{}", env!("CARGO_PKG_VERSION"));

    let options = PreviewOptions::from_args(std::env::args().skip(1));
    let config = match options.load_config() {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!("{e}; using default motion config");
            options.apply(SequenceConfig::default())
        }
    };

    if let Err(e) = PreviewApp::run(config, Some(tracing_rx)) {
        tracing::error!("Preview crashed: {e}");
        std::process::exit(1);
    }
}
