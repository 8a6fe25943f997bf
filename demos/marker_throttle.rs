//! # Example: Escalating marker throttle
//!
//! Events tagged `DB` get their own batcher whose cooldown grows with every
//! flush that was not preceded by a quiet period (2s → 4s → 8s), and falls
//! back to 2s once the marker has been quiet long enough. Untagged events
//! keep the default 1s cooldown.
//!
//! ```bash
//! cargo run --example marker_throttle
//! ```

use std::time::Duration;

use logvisor::{Batch, DeliveryError, Level, LogSystem, Marker, ProcessorFn, Properties, SystemConfig};
use tokio::time::Instant;
use tracing_subscriber::EnvFilter;

const CONFIG: &str = "
observer.pager.idleThreshold=PT0.5S
observer.pager.cooldownTime=PT1S
observer.pager.markers.DB.throttle=PT2S PT4S PT8S

root=WARN pager
";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let system = LogSystem::builder(SystemConfig::default()).build()?;
    let start = Instant::now();

    let pager = ProcessorFn::arc("pager", move |batch: Batch| {
        let marker = batch.marker().map_or("-".to_string(), |m| m.to_string());
        println!(
            "[{:>5.1}s] page marker={marker} events={} worst={:?}",
            start.elapsed().as_secs_f64(),
            batch.len(),
            batch.highest_level(),
        );
        Ok::<(), DeliveryError>(())
    });

    let props = Properties::parse(CONFIG);
    system.configure_observer(&props, "pager", pager)?;
    system.configure(&props)?;

    let log = system.logger("storage.db");
    let db = Marker::new("DB");

    // a flapping database: one error every 300ms for 12s
    for i in 0..40 {
        log.at(Level::Error)
            .marker(db.clone())
            .arg(i)
            .log("connection {} reset");
        if i % 10 == 0 {
            log.warn("replica lag high", &[]);
        }
        tokio::time::sleep(Duration::from_millis(300)).await;
    }

    // quiet long enough to reset escalation, then one more error
    tokio::time::sleep(Duration::from_secs(10)).await;
    log.at(Level::Error).marker(db).log("connection reset again");
    tokio::time::sleep(Duration::from_secs(3)).await;

    system.shutdown();
    Ok(())
}
