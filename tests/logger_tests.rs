#![cfg(feature = "profiler")]

use timer_log::{
    timer_mark, FixedClock, RecordFormat, RecordReader, TimerLog, TimerRecord, Timestamp,
};
use std::collections::HashSet;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};
use std::thread;
use tempfile::tempfile;

/// Stream that collects everything written, shared with the test.
#[derive(Clone, Default)]
struct CollectingWriter {
    data: Arc<Mutex<Vec<u8>>>,
    flushes: Arc<Mutex<usize>>,
}

impl CollectingWriter {
    fn text(&self) -> String {
        String::from_utf8(self.data.lock().unwrap().clone()).unwrap()
    }

    fn line_count(&self) -> usize {
        self.text().lines().count()
    }
}

impl Write for CollectingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.data.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        *self.flushes.lock().unwrap() += 1;
        Ok(())
    }
}

/// Stream that rejects every write.
struct BrokenWriter;

impl Write for BrokenWriter {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
    }
}

#[test]
fn test_capacity_invariant() {
    let log = TimerLog::new(5, Vec::new(), RecordFormat::default());
    for seq in 0..23 {
        log.append("tick", seq, file!(), line!());
        let len = log.len();
        assert!(len >= 1 && len <= log.capacity(), "count {len} out of bounds");
    }
    assert_eq!(log.len(), 23 % 5);
    assert_eq!(log.stats().flushes_on_full, 4);
}

#[test]
fn test_flush_on_full() {
    const CAPACITY: usize = 10;
    let writer = CollectingWriter::default();
    let log = TimerLog::new(CAPACITY, writer.clone(), RecordFormat::default());

    for seq in 0..CAPACITY as i64 {
        timer_mark!(log, "fill", seq);
    }
    assert_eq!(log.len(), CAPACITY);
    assert_eq!(writer.line_count(), 0, "Nothing should be written before the buffer overflows");

    timer_mark!(log, "overflow", CAPACITY as i64);
    assert_eq!(log.len(), 1);
    assert_eq!(log.stats().flushes_on_full, 1);
    assert_eq!(writer.line_count(), CAPACITY);
    assert_eq!(*writer.flushes.lock().unwrap(), 1);

    // The overflowing entry is still buffered, not lost.
    log.destroy();
    let records: Vec<TimerRecord> = RecordReader::new(&writer.text()).collect();
    assert_eq!(records.len(), CAPACITY + 1);
    assert_eq!(records.last().unwrap().tag, "overflow");
}

#[test]
fn test_order_preservation() {
    const N: i64 = 200;
    let log = TimerLog::new(N as usize, Vec::new(), RecordFormat::default());
    for seq in 0..N {
        log.append("ordered", seq, "order.rs", 1);
    }
    let output = String::from_utf8(log.destroy()).unwrap();

    let records: Vec<TimerRecord> = RecordReader::new(&output).collect();
    let sequences: Vec<i64> = records.iter().map(|r| r.sequence).collect();
    assert_eq!(sequences, (0..N).collect::<Vec<_>>());

    for pair in records.windows(2) {
        assert!(pair[1].as_nanos() >= pair[0].as_nanos(), "Timestamps should not go backwards");
    }
}

#[test]
fn test_destroy_flushes_remainder() {
    let log = TimerLog::new(10, Vec::new(), RecordFormat::default());
    timer_mark!(log, "a", 0);
    timer_mark!(log, "b", 1);
    timer_mark!(log, "c", 2);

    let output = String::from_utf8(log.destroy()).unwrap();
    assert_eq!(output.lines().count(), 3);
    assert!(output.ends_with('\n'));
}

#[test]
fn test_saturation_without_mid_stream_flush() {
    const CAPACITY: usize = 64;
    let writer = CollectingWriter::default();
    let log = TimerLog::new(CAPACITY, writer.clone(), RecordFormat::default());

    for seq in 0..CAPACITY as i64 {
        log.append("saturate", seq, file!(), line!());
    }
    assert_eq!(log.stats().flushes_on_full, 0);
    assert_eq!(writer.line_count(), 0);

    log.destroy();
    assert_eq!(writer.line_count(), CAPACITY);
    assert_eq!(*writer.flushes.lock().unwrap(), 1);
}

#[test]
fn test_concurrent_appends() {
    const THREADS: usize = 8;
    const PER_THREAD: usize = 1000;
    const TAGS: [&str; THREADS] = ["t0", "t1", "t2", "t3", "t4", "t5", "t6", "t7"];

    let writer = CollectingWriter::default();
    let log = Arc::new(TimerLog::new(
        THREADS * PER_THREAD / 2,
        writer.clone(),
        RecordFormat::default(),
    ));

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let log = Arc::clone(&log);
            thread::spawn(move || {
                for seq in 0..PER_THREAD as i64 {
                    log.append(TAGS[t], seq, "concurrent.rs", t as u32);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let log = Arc::try_unwrap(log).ok().expect("All workers should have released the log");
    log.destroy();

    let text = writer.text();
    let mut reader = RecordReader::new(&text);
    let mut seen = HashSet::new();
    let mut last_seq = vec![-1i64; THREADS];
    for record in reader.by_ref() {
        let t = TAGS.iter().position(|&tag| tag == record.tag).expect("Unknown tag");
        assert_eq!(record.file, "concurrent.rs");
        assert_eq!(record.line as usize, t, "Line should match the writing thread");
        assert!(record.sequence > last_seq[t], "Per-thread order should be preserved");
        last_seq[t] = record.sequence;
        assert!(seen.insert((t, record.sequence)), "Duplicate record {record}");
    }

    assert_eq!(reader.skipped(), 0, "Every line should be an intact record");
    assert_eq!(seen.len(), THREADS * PER_THREAD);
}

#[test]
fn test_custom_format_and_fixed_clock() {
    let format = RecordFormat::parse("{4:03}|{3}|{5}:{6}|{1}s{2}ns\n").unwrap();
    let clock = FixedClock(Timestamp::new(100, 250));
    let log = TimerLog::with_clock(4, Vec::new(), format, clock);

    log.append("enqueue", 7, "queue.rs", 31);
    log.append("dequeue", 7, "queue.rs", 58);

    let output = String::from_utf8(log.destroy()).unwrap();
    assert_eq!(output, "007|enqueue|queue.rs:31|100s250ns\n007|dequeue|queue.rs:58|100s250ns\n");
}

#[test]
fn test_wide_sequences_render_unchanged() {
    let log = TimerLog::new(4, Vec::new(), RecordFormat::default());
    timer_mark!(log, "unsigned", u32::MAX);
    timer_mark!(log, "widest", i64::MAX);
    timer_mark!(log, "negative", i64::MIN);

    let output = String::from_utf8(log.destroy()).unwrap();
    let sequences: Vec<i64> = RecordReader::new(&output).map(|r| r.sequence).collect();
    assert_eq!(sequences, [u32::MAX as i64, i64::MAX, i64::MIN]);
    assert!(output.contains(" seq 4294967295 @ "));
}

#[test]
fn test_write_failures_are_best_effort() {
    let log = TimerLog::new(3, BrokenWriter, RecordFormat::default());
    for seq in 0..7 {
        log.append("lost", seq, file!(), line!());
    }
    // Buffer is still drained despite the failures.
    assert_eq!(log.len(), 1);

    let stats = log.stats();
    assert_eq!(stats.flushes_on_full, 2);
    assert_eq!(stats.write_failures, 6);
    assert_eq!(stats.records_written, 0);
    let _ = log.destroy();
}

#[test]
fn test_file_sink_is_returned_open() {
    use std::io::{Read, Seek, SeekFrom};

    let file = tempfile().unwrap();
    let log = TimerLog::new(2, file, RecordFormat::default());
    for seq in 0..5 {
        timer_mark!(log, "file", seq);
    }

    let mut file = log.destroy();
    writeln!(file, "trailer").unwrap();
    file.seek(SeekFrom::Start(0)).unwrap();
    let mut contents = String::new();
    file.read_to_string(&mut contents).unwrap();

    let mut reader = RecordReader::new(&contents);
    assert_eq!(reader.by_ref().count(), 5);
    assert_eq!(reader.skipped(), 1);
}

#[test]
fn test_drop_without_destroy_flushes() {
    let writer = CollectingWriter::default();
    {
        let log = TimerLog::new(16, writer.clone(), RecordFormat::default());
        timer_mark!(log, "scoped", 1);
        timer_mark!(log, "scoped", 2);
    }
    assert_eq!(writer.line_count(), 2);
}
