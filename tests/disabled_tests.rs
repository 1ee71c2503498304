//! Run with `--no-default-features` to exercise the no-op build.
#![cfg(not(feature = "profiler"))]

use timer_log::{
    global_append, global_destroy, global_init, global_timer_mark, timer_mark, with_global,
    RecordFormat, TimerLog,
};

#[test]
fn test_global_is_noop() {
    global_init();
    for seq in 0..1000 {
        global_timer_mark!("disabled", seq);
        global_append("disabled", seq, file!(), line!());
    }
    assert!(with_global(|log| log.len()).is_none());
    global_destroy();
    global_destroy();
}

#[test]
fn test_log_writes_nothing() {
    let log = TimerLog::new(2, Vec::new(), RecordFormat::default());
    for seq in 0..10 {
        timer_mark!(log, "disabled", seq);
    }
    assert!(log.is_empty());
    assert_eq!(log.stats().flushes_on_full, 0);
    assert!(log.destroy().is_empty());
}
