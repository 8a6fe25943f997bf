//! # Example: Chat webhook batching
//!
//! A burst of failures becomes one webhook message; an event that arrives
//! during the cooldown waits for it to end. The "transport" prints the JSON
//! payload instead of posting it.
//!
//! ```bash
//! RUST_LOG=logvisor=debug cargo run --example teams_demo
//! ```

use std::time::Duration;

use logvisor::{
    mdc, Batch, DeliveryError, JsonBatchFormatter, Level, LogSystem, Marker, ProcessorFn,
    Properties, SystemConfig,
};
use tracing_subscriber::EnvFilter;

const CONFIG: &str = "
# batching observer posting to the ops channel
observer.teams.idleThreshold=PT3S
observer.teams.cooldownTime=PT5S
observer.teams.maximumWaitTime=PT3M
observer.teams.threshold=WARN
observer.teams.suppressMarkers=HEALTHCHECK

root=INFO console
logger.billing=INFO console, teams
";

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let system = LogSystem::builder(SystemConfig::default()).build()?;

    let formatter = JsonBatchFormatter::new()
        .with_username("billing-prod")
        .with_channel("#ops")
        .with_included_mdc_keys(["tenant"]);
    let transport = ProcessorFn::arc("teams", move |batch: Batch| {
        let payload = formatter.to_payload(&batch)?;
        println!("POST {} event(s):\n{payload}", batch.len());
        Ok::<(), DeliveryError>(())
    });

    let props = Properties::parse(CONFIG);
    system.configure_observer(&props, "teams", transport)?;
    system.configure(&props)?;

    let log = system.logger("billing.charges");
    let _tenant = mdc::put_scoped("tenant", "acme");

    for invoice in 1..=3 {
        log.error("charge for invoice {} failed", &[&invoice]);
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    log.at(Level::Warn)
        .marker(Marker::new("HEALTHCHECK"))
        .log("health probe slow (console only)");

    // first message at ~3.2s, cooldown until ~8.2s
    tokio::time::sleep(Duration::from_secs(4)).await;
    log.warn("retry queue at {} items", &[&17]);
    tokio::time::sleep(Duration::from_secs(5)).await;

    for record in system.status().snapshot() {
        println!("status: {record}");
    }
    system.shutdown();
    Ok(())
}
