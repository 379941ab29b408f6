use hygrolink::{
    health::HealthMonitor,
    link::{self, LinkFailure, LinkOutcome},
    serial::fake::FakeSerialPort,
    status::StatusCache,
};
use std::time::{Duration, Instant};

fn poll_once(
    io: &mut FakeSerialPort,
    buf: &mut String,
    health: &mut HealthMonitor,
    cache: &mut StatusCache,
    now: Instant,
) -> LinkOutcome {
    let outcome = link::request_status(io, buf).unwrap();
    match outcome {
        LinkOutcome::Success(reading) => {
            cache.write(reading);
            health.on_success(now);
        }
        LinkOutcome::Failure(_) => health.on_failure(),
    }
    outcome
}

#[test]
fn poll_sequence_degrades_then_recovers() {
    // One good exchange, then a timeout, a malformed response and another
    // timeout (three failures in a row), then a good exchange again.
    let mut io = FakeSerialPort::new(vec![
        Ok("H=41.5;MIN=30.0;MAX=72.0".into()),
        Ok("".into()),
        Ok("H=41.5;MIN=30.0".into()),
        Ok("".into()),
        Ok("H=44.0;MIN=30.0;MAX=72.0".into()),
    ]);
    let mut health = HealthMonitor::new(3, 10, Duration::from_secs(30));
    let mut cache = StatusCache::new();
    let mut buf = String::new();
    let t0 = Instant::now();

    let first = poll_once(&mut io, &mut buf, &mut health, &mut cache, t0);
    assert!(matches!(first, LinkOutcome::Success(_)));
    let snap = cache.snapshot(&health, t0);
    assert_eq!(snap.reading.unwrap().current, 41.5);
    assert!(snap.healthy);

    let second = poll_once(&mut io, &mut buf, &mut health, &mut cache, t0);
    assert_eq!(second, LinkOutcome::Failure(LinkFailure::Timeout));
    let third = poll_once(&mut io, &mut buf, &mut health, &mut cache, t0);
    assert_eq!(third, LinkOutcome::Failure(LinkFailure::Malformed));
    // Two failures: still healthy with the default threshold of three.
    assert!(cache.snapshot(&health, t0).healthy);

    let fourth = poll_once(&mut io, &mut buf, &mut health, &mut cache, t0);
    assert_eq!(fourth, LinkOutcome::Failure(LinkFailure::Timeout));
    let snap = cache.snapshot(&health, t0);
    assert!(!snap.healthy, "third consecutive failure flips healthy");
    assert_eq!(snap.link_failures, 3);
    // The last accepted reading stays visible while the link is down.
    assert_eq!(snap.reading.unwrap().current, 41.5);

    let fifth = poll_once(&mut io, &mut buf, &mut health, &mut cache, t0);
    assert!(matches!(fifth, LinkOutcome::Success(_)));
    let snap = cache.snapshot(&health, t0);
    assert!(snap.healthy);
    assert_eq!(snap.link_failures, 0);
    assert_eq!(snap.reading.unwrap().current, 44.0);

    // Every exchange flushed stale bytes and sent exactly one request.
    assert_eq!(io.discards(), 5);
    assert_eq!(io.writes().iter().filter(|w| *w == "STATUS").count(), 5);
}

#[test]
fn staleness_tracks_the_last_successful_exchange() {
    let mut io = FakeSerialPort::new(vec![Ok("H=50.0;MIN=45.0;MAX=55.0".into())]);
    let mut health = HealthMonitor::new(3, 10, Duration::from_secs(30));
    let mut cache = StatusCache::new();
    let mut buf = String::new();
    let t0 = Instant::now();

    // Nothing has ever succeeded: no staleness no matter how much time passes.
    assert!(!cache.snapshot(&health, t0 + Duration::from_secs(600)).stale);

    poll_once(&mut io, &mut buf, &mut health, &mut cache, t0);
    assert!(!cache.snapshot(&health, t0 + Duration::from_secs(29)).stale);
    let snap = cache.snapshot(&health, t0 + Duration::from_secs(31));
    assert!(snap.stale);
    // A stale reading is still served; staleness is a flag, not an error.
    assert_eq!(snap.reading.unwrap().current, 50.0);
}
