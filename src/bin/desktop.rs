// src/bin/desktop.rs - Desktop window for the storefront

use std::process;
use std::sync::Arc;

use dioxus::desktop::tao::dpi::LogicalSize;
use dioxus::desktop::{Config, WindowBuilder};
use dioxus::prelude::*;

use storefront::config::ConfigManager;
use storefront::ui::App;
use storefront::{logging, ApplicationCore, Result};

const TAILWIND_CDN: &str = r#"<script src="https://cdn.tailwindcss.com"></script>"#;

fn main() {
    let (core, _guard) = match start() {
        Ok(started) => started,
        Err(error) => {
            eprintln!("error: {}", error.user_message());
            for cause in &error.causes {
                eprintln!("  caused by: {}", cause);
            }
            process::exit(1);
        }
    };

    let title = core.config().ui.title.clone();
    tracing::info!(version = storefront::VERSION, "starting desktop storefront");

    let config = Config::new()
        .with_custom_head(TAILWIND_CDN.to_string())
        .with_window(
            WindowBuilder::new()
                .with_title(title)
                .with_resizable(true)
                .with_inner_size(LogicalSize::new(1200.0, 800.0)),
        );

    LaunchBuilder::desktop()
        .with_cfg(config)
        .with_context(core)
        .launch(App);
}

fn start() -> Result<(Arc<ApplicationCore>, logging::LoggingGuard)> {
    let manager = ConfigManager::standard(None)?;
    let config = manager.validated_config()?;
    let guard = logging::init(&config.logging)?;
    let core = ApplicationCore::new(config)?;
    Ok((Arc::new(core), guard))
}
