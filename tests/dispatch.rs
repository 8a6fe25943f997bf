//! Logger tree, observer composition, status reporting and configuration
//! errors through the public API.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use logvisor::{
    Batch, CompositeObserver, ConfigError, DeliveryError, Level, LogEventRef, LogSystem,
    LoggerRegistry, ManualScheduler, Marker, ObserverFn, ObserverRef, ProcessorFn, Properties,
    SetupError, StatusChannel, StatusLevel, SystemConfig,
};
use parking_lot::Mutex;

type Seen = Arc<Mutex<Vec<String>>>;

fn capture(name: &'static str) -> (ObserverRef, Seen) {
    let seen: Seen = Arc::default();
    let sink = Arc::clone(&seen);
    let obs = ObserverFn::arc(name, move |ev: &LogEventRef| sink.lock().push(ev.message()));
    (obs, seen)
}

fn system() -> LogSystem {
    LogSystem::builder(SystemConfig {
        install_console: false,
        ..Default::default()
    })
    .with_scheduler(Arc::new(ManualScheduler::new()))
    .build()
    .expect("manual scheduler never fails")
}

struct Counted(Arc<AtomicUsize>);

impl fmt::Display for Counted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fetch_add(1, Ordering::SeqCst);
        f.write_str("rendered")
    }
}

#[test]
fn disabled_levels_build_no_event() {
    let (root, seen) = capture("root");
    let reg = LoggerRegistry::new(root, Arc::new(StatusChannel::new(8)));
    reg.set_threshold("com.example", Level::Warn);

    let log = reg.logger("com.example.billing.invoices");
    let renders = Arc::new(AtomicUsize::new(0));
    for level in [Level::Trace, Level::Debug, Level::Info] {
        assert!(!reg.is_enabled("com.example.billing.invoices", level));
        log.log(level, "value {}", &[&Counted(Arc::clone(&renders))]);
        log.at(level)
            .arg(Counted(Arc::clone(&renders)))
            .marker(Marker::new("X"))
            .log("value {}");
    }
    assert_eq!(renders.load(Ordering::SeqCst), 0);
    assert!(seen.lock().is_empty());

    log.log(Level::Warn, "value {}", &[&Counted(Arc::clone(&renders))]);
    assert_eq!(renders.load(Ordering::SeqCst), 1);
    assert_eq!(*seen.lock(), vec!["value rendered".to_string()]);
}

#[test]
fn nearest_ancestor_decides_threshold_and_observer() {
    let (root, root_seen) = capture("root");
    let (db, db_seen) = capture("db");
    let reg = LoggerRegistry::new(root, Arc::new(StatusChannel::new(8)));
    reg.set_threshold("", Level::Error);
    reg.set_threshold("app.db", Level::Debug);
    reg.set_observer("app.db", db);

    reg.logger("app.db.pool.conn").debug("checkout", &[]);
    reg.logger("app.web").warn("slow", &[]);
    reg.logger("app.web").error("down", &[]);

    assert_eq!(*db_seen.lock(), vec!["checkout".to_string()]);
    assert_eq!(*root_seen.lock(), vec!["down".to_string()]);

    let described = reg.describe("app.db.pool.conn");
    assert_eq!(described.threshold, Level::Debug);
    assert_eq!(described.threshold_from, "app.db");
    assert_eq!(described.observer_from, "app.db");

    assert!(reg.clear_threshold("app.db"));
    assert_eq!(reg.resolve_threshold("app.db.pool.conn"), Level::Error);
    assert!(!reg.clear_threshold(""));
}

#[test]
fn composite_isolates_a_failing_observer() {
    let status = Arc::new(StatusChannel::new(16));
    let (good, seen) = capture("good");
    let bad = ObserverFn::arc("bad", |_ev: &LogEventRef| panic!("sink offline"));
    let both = CompositeObserver::combine_with_status(
        [bad as ObserverRef, good],
        Arc::clone(&status),
    );
    let reg = LoggerRegistry::new(both, Arc::clone(&status));

    reg.logger("app").error("payment failed", &[]);

    assert_eq!(*seen.lock(), vec!["payment failed".to_string()]);
    let errors = status.at_least(StatusLevel::Error);
    assert_eq!(errors.len(), 1);
    assert_eq!(&*errors[0].component, "bad");
    assert!(errors[0].message.contains("sink offline"));
}

#[test]
fn configured_fan_out_reaches_every_named_observer() {
    let system = system();
    let (a, a_seen) = capture("a");
    let (b, b_seen) = capture("b");
    system.register_observer("a", a);
    system.register_observer("b", b);

    let props = Properties::parse(
        "# two sinks for billing\n\
         root=ERROR a\n\
         logger.billing=INFO a, b\n",
    );
    system.configure(&props).expect("valid settings");

    system.logger("billing.charge").info("charged {}", &[&"alice"]);
    system.logger("search").warn("ignored", &[]);
    system.logger("search").error("index lost", &[]);

    assert_eq!(*a_seen.lock(), vec!["charged alice".to_string(), "index lost".to_string()]);
    assert_eq!(*b_seen.lock(), vec!["charged alice".to_string()]);
}

#[test]
fn configuration_errors_surface_at_setup() {
    let system = system();
    let noop = || ProcessorFn::arc("noop", |_b: Batch| Ok::<(), DeliveryError>(()));

    let empty = Properties::new().with("observer.slack.markers.AUDIT.throttle", "  ");
    assert!(matches!(
        system.configure_observer(&empty, "slack", noop()),
        Err(SetupError::Config(ConfigError::EmptySchedule { .. }))
    ));

    let malformed = Properties::new().with("observer.slack.idleThreshold", "5 seconds");
    assert!(matches!(
        system.configure_observer(&malformed, "slack", noop()),
        Err(SetupError::Config(ConfigError::InvalidDuration { ref key, .. }))
            if key == "observer.slack.idleThreshold"
    ));

    let out_of_range =
        Properties::new().with("observer.slack.cooldownTime", "PT100000000000000000000S");
    assert!(matches!(
        system.configure_observer(&out_of_range, "slack", noop()),
        Err(SetupError::Config(ConfigError::InvalidDuration { ref key, .. }))
            if key == "observer.slack.cooldownTime"
    ));

    let bad_schedule = Properties::new().with("observer.slack.markers.AUDIT.throttle", "PT1M soon");
    assert!(matches!(
        system.configure_observer(&bad_schedule, "slack", noop()),
        Err(SetupError::Config(ConfigError::InvalidDuration { .. }))
    ));

    let bad_level = Properties::new().with("logger.app", "LOUD");
    assert!(matches!(
        system.configure(&bad_level),
        Err(SetupError::Config(ConfigError::InvalidLevel { .. }))
    ));

    // nothing half-built was registered
    assert_eq!(system.observer_names(), vec!["console".to_string()]);
}

#[test]
fn status_channel_is_bounded_and_observable() {
    let status = StatusChannel::new(3);
    let mut feed = status.subscribe();

    status.report_info("test", "record 0");
    let live = feed.try_recv().expect("live record");
    assert_eq!(live.message, "record 0");

    for i in 1..5 {
        status.report_info("test", format!("record {i}"));
    }
    let rejected = DeliveryError::Rejected {
        reason: "403".into(),
    };
    status.report_error("test", "broken", Some(&rejected));

    let kept = status.snapshot();
    assert_eq!(kept.len(), 3);
    assert_eq!(kept[0].message, "record 3");
    assert_eq!(kept[2].cause.as_deref(), Some("sink rejected batch: 403"));
    assert_eq!(status.at_least(StatusLevel::Error).len(), 1);
}
