//! Line-oriented log sinks for the request log.
//!
//! A [`LogSink`] receives one complete line per call. It is shared by every
//! in-flight request, so each call must be atomic with respect to the others:
//! two lines from concurrent requests may interleave, but never mid-line.
//!
//! [`Logger`] is the stock sink. It prefixes every line with an optional fixed
//! prefix and a timestamp and writes it to any `io::Write`:
//!
//! ```text
//! 2017/03/13 14:20:57 [dc6efe7f] Started GET /goodbye for [::1]:62966
//! 2017/03/13 14:20:57 [dc6efe7f] Completed 200 OK in 237.884µs
//! ```

use std::io::{self, Write};
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{Local, Utc};
use tracing::{info, warn};

/// A destination for request log lines.
pub trait LogSink: Send + Sync {
    /// Records one line. `line` carries no trailing newline.
    fn log_line(&self, line: &str);
}

impl<S: LogSink + ?Sized> LogSink for Arc<S> {
    fn log_line(&self, line: &str) {
        (**self).log_line(line);
    }
}

// ── Logger ────────────────────────────────────────────────────────────────────

/// Timestamp written at the start of every [`Logger`] line.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Timestamp {
    /// No timestamp.
    None,
    /// `2017/03/13 14:20:57`
    #[default]
    Seconds,
    /// `2017/03/13 14:20:57.123456`
    Micros,
}

/// A [`LogSink`] writing timestamped lines to an `io::Write`.
///
/// Writes are serialized by an internal mutex; each line goes out in a single
/// `write_all` call. Write failures are reported through `tracing` and never
/// surface to the request being logged.
pub struct Logger {
    out: Mutex<Box<dyn Write + Send>>,
    prefix: String,
    timestamp: Timestamp,
    utc: bool,
}

impl Logger {
    /// A logger with no prefix and a local-time [`Timestamp::Seconds`] stamp.
    pub fn new(out: impl Write + Send + 'static) -> Self {
        Self {
            out: Mutex::new(Box::new(out)),
            prefix: String::new(),
            timestamp: Timestamp::default(),
            utc: false,
        }
    }

    /// The default request-log destination: standard error, local time.
    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }

    /// Text written before the timestamp on every line.
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn timestamp(mut self, timestamp: Timestamp) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Stamp lines in UTC instead of local time.
    pub fn utc(mut self, utc: bool) -> Self {
        self.utc = utc;
        self
    }

    fn format_line(&self, line: &str) -> String {
        let mut buf = String::with_capacity(self.prefix.len() + 27 + line.len() + 1);
        buf.push_str(&self.prefix);

        let format = match self.timestamp {
            Timestamp::None => None,
            Timestamp::Seconds => Some("%Y/%m/%d %H:%M:%S "),
            Timestamp::Micros => Some("%Y/%m/%d %H:%M:%S%.6f "),
        };
        if let Some(format) = format {
            let stamp = if self.utc {
                Utc::now().format(format).to_string()
            } else {
                Local::now().format(format).to_string()
            };
            buf.push_str(&stamp);
        }

        buf.push_str(line);
        if !line.ends_with('\n') {
            buf.push('\n');
        }
        buf
    }
}

impl LogSink for Logger {
    fn log_line(&self, line: &str) {
        let line = self.format_line(line);
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = out.write_all(line.as_bytes()).and_then(|()| out.flush()) {
            warn!("request log write failed: {e}");
        }
    }
}

// ── TracingSink ───────────────────────────────────────────────────────────────

/// A [`LogSink`] that emits each line as a `tracing` event at `INFO` level
/// under the `requestlog` target.
///
/// Use this when the application already installs a tracing subscriber; the
/// subscriber supplies the timestamp.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn log_line(&self, line: &str) {
        info!(target: "requestlog", "{line}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl SharedBuf {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().write(buf)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn is_stamp(s: &str) -> bool {
        // 2017/03/13 14:20:57
        s.len() == 19
            && s.char_indices().all(|(i, c)| match i {
                4 | 7 => c == '/',
                10 => c == ' ',
                13 | 16 => c == ':',
                _ => c.is_ascii_digit(),
            })
    }

    #[test]
    fn default_logger_stamps_date_and_time() {
        let buf = SharedBuf::default();
        Logger::new(buf.clone()).log_line("Started GET / for 127.0.0.1:1");

        let out = buf.contents();
        assert!(out.ends_with(" Started GET / for 127.0.0.1:1\n"), "{out:?}");
        assert!(is_stamp(&out[..19]), "{out:?}");
    }

    #[test]
    fn prefix_precedes_timestamp() {
        let buf = SharedBuf::default();
        Logger::new(buf.clone()).prefix("web: ").utc(true).log_line("hi");

        let out = buf.contents();
        assert!(out.starts_with("web: "), "{out:?}");
        assert!(is_stamp(&out[5..24]), "{out:?}");
        assert!(out.ends_with(" hi\n"), "{out:?}");
    }

    #[test]
    fn micros_timestamp_has_fraction() {
        let buf = SharedBuf::default();
        Logger::new(buf.clone()).timestamp(Timestamp::Micros).log_line("x");

        let out = buf.contents();
        assert!(is_stamp(&out[..19]), "{out:?}");
        assert_eq!(&out[19..20], ".");
        assert!(out[20..26].chars().all(|c| c.is_ascii_digit()), "{out:?}");
        assert_eq!(&out[26..], " x\n");
    }

    #[test]
    fn no_timestamp_and_no_double_newline() {
        let buf = SharedBuf::default();
        let logger = Logger::new(buf.clone()).timestamp(Timestamp::None);
        logger.log_line("one");
        logger.log_line("two\n");
        assert_eq!(buf.contents(), "one\ntwo\n");
    }

    fn log_all(sink: impl LogSink, lines: &[&str]) {
        for line in lines {
            sink.log_line(line);
        }
    }

    #[test]
    fn shared_logger_is_a_sink() {
        let buf = SharedBuf::default();
        let logger = Arc::new(Logger::new(buf.clone()).timestamp(Timestamp::None));

        log_all(Arc::clone(&logger), &["first"]);
        log_all(logger as Arc<dyn LogSink>, &["second"]);
        assert_eq!(buf.contents(), "first\nsecond\n");
    }

    #[test]
    fn concurrent_lines_never_interleave() {
        let buf = SharedBuf::default();
        let logger = Arc::new(Logger::new(buf.clone()).timestamp(Timestamp::None));

        let threads: Vec<_> = (0..8)
            .map(|t| {
                let logger = Arc::clone(&logger);
                std::thread::spawn(move || {
                    for i in 0..50 {
                        logger.log_line(&format!("thread-{t} line-{i} {}", "x".repeat(64)));
                    }
                })
            })
            .collect();
        for t in threads {
            t.join().unwrap();
        }

        let out = buf.contents();
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines.len(), 400);
        for line in lines {
            assert!(line.starts_with("thread-"), "{line:?}");
            assert!(line.ends_with(&"x".repeat(64)), "{line:?}");
        }
    }
}
