use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use std::thread;
use std::time::Duration;

use weigh_hardware::error::HwError;
use weigh_hardware::util::wait_until_low_with_timeout;

#[test]
fn returns_once_data_ready_goes_low() {
    let high = Arc::new(AtomicBool::new(true));
    let high_bg = high.clone();
    thread::spawn(move || {
        thread::sleep(Duration::from_millis(3));
        high_bg.store(false, Ordering::Relaxed);
    });

    let res = wait_until_low_with_timeout(
        || high.load(Ordering::Relaxed),
        Duration::from_millis(500),
        Duration::from_micros(200),
    );
    assert!(res.is_ok(), "expected success, got {res:?}");
}

#[test]
fn times_out_when_line_stays_high() {
    let err = wait_until_low_with_timeout(|| true, Duration::from_millis(5), Duration::from_micros(200))
        .expect_err("expected timeout error");
    assert!(matches!(err, HwError::DataReadyTimeout), "unexpected error: {err:?}");
}
