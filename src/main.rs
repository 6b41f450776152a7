use anyhow::Context;
use notice_center::{
    Component, DetailedError, Event, NoticeCenter, NoticeOptions, NoticesConfig,
};
use std::path::PathBuf;
use tokio::sync::{broadcast::error::RecvError, watch};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const CONFIG_ENV: &str = "NOTICE_CENTER_CONFIG";

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter).with(fmt::layer());

    #[cfg(feature = "systemd")]
    if let Ok(journald) = tracing_journald::layer() {
        registry.with(journald).init();
        return;
    }

    registry.init();
}

fn load_config() -> anyhow::Result<NoticesConfig> {
    match std::env::var_os(CONFIG_ENV).map(PathBuf::from) {
        Some(path) => NoticesConfig::load(&path)
            .with_context(|| format!("loading notice config from {}", path.display())),
        None => Ok(NoticesConfig::default()),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    color_backtrace::install();
    init_logging();

    let config = load_config()?;
    info!("Starting with {:?}", config);

    let (config_tx, config_rx) = watch::channel(config);
    let center = NoticeCenter::builder(config_rx)
        .delete_delay(config.delete_delay())
        .build();

    let mut events = center.subscribe();
    let printer = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(Event::Removed { id, reason }) => info!("Notice {} removed: {:?}", id, reason),
                Ok(event) => info!("{:?}", event),
                Err(RecvError::Lagged(skipped)) => info!("Missed {} events", skipped),
                Err(RecvError::Closed) => break,
            }
        }
    });

    for n in 0..=config.notifications_pool {
        center.log_info(NoticeOptions::new(format!("Notice {}", n), "Transient"))?;
    }

    let pinned = center.log_success(NoticeOptions::new("Pinned", "Stays until closed").persistent(true))?;

    let upload = center.process_notification(
        Component::new("progress"),
        None,
        NoticeOptions::new("Upload", "Sending files"),
    )?;
    upload.controller.start();
    upload.controller.set_progress(0.5);

    let failure = anyhow::Error::new(
        DetailedError::new("UploadError", "upload failed", "Server rejected the archive")
            .with_data(serde_json::json!({ "status": 413 })),
    );
    center.log_exception(&failure, None, None, false);

    // Shrinking the pool applies to the next creation
    config_tx.send_modify(|c| c.notifications_pool = 2);
    center.log_info(NoticeOptions::new("After reconfiguration", ""))?;

    for notice in center.visible_notifications() {
        info!("[{}] #{} {}: {}", notice.kind, notice.id, notice.title, notice.message);
    }

    pinned.close(true);
    upload.controller.succeed(None);
    center.close(upload.notification.id, true);

    tokio::time::sleep(center.delete_delay() * 2).await;
    info!("{} notices left", center.len());

    // Dropping the last handle closes the event channel
    drop(center);
    printer.await?;
    Ok(())
}
