// Global logging sink for etyOS
//
// Backs the `log` facade with a fixed ring of recent lines so the shell can
// replay them, and optionally mirrors each line to a serial writer.

use core::fmt::{self, Write};
use log::{Level, LevelFilter, Log, Metadata, Record};
use spin::Mutex;

pub const MAX_LOG_ENTRIES: usize = 64;
pub const MAX_LINE_LEN: usize = 128;

/// One formatted log line, truncated to `MAX_LINE_LEN` bytes.
#[derive(Clone, Copy)]
pub struct LogLine {
    bytes: [u8; MAX_LINE_LEN],
    len: usize,
    level: Level,
}

impl LogLine {
    pub const fn empty() -> Self {
        Self {
            bytes: [0; MAX_LINE_LEN],
            len: 0,
            level: Level::Trace,
        }
    }

    pub fn as_str(&self) -> &str {
        // Writer only ever stops on a char boundary
        core::str::from_utf8(&self.bytes[..self.len]).unwrap_or("")
    }

    pub fn level(&self) -> Level {
        self.level
    }
}

impl Write for LogLine {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for ch in s.chars() {
            let n = ch.len_utf8();
            if self.len + n > MAX_LINE_LEN {
                break;
            }
            ch.encode_utf8(&mut self.bytes[self.len..self.len + n]);
            self.len += n;
        }
        Ok(())
    }
}

/// Fixed-capacity ring, oldest line overwritten first.
pub struct LogRing {
    lines: [LogLine; MAX_LOG_ENTRIES],
    next: usize,
    count: usize,
}

impl LogRing {
    pub const fn new() -> Self {
        Self {
            lines: [LogLine::empty(); MAX_LOG_ENTRIES],
            next: 0,
            count: 0,
        }
    }

    pub fn push(&mut self, line: LogLine) {
        self.lines[self.next] = line;
        self.next = (self.next + 1) % MAX_LOG_ENTRIES;
        if self.count < MAX_LOG_ENTRIES {
            self.count += 1;
        }
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Visit retained lines oldest first.
    pub fn for_each(&self, mut f: impl FnMut(&LogLine)) {
        let start = (self.next + MAX_LOG_ENTRIES - self.count) % MAX_LOG_ENTRIES;
        for i in 0..self.count {
            f(&self.lines[(start + i) % MAX_LOG_ENTRIES]);
        }
    }

    pub fn clear(&mut self) {
        self.next = 0;
        self.count = 0;
    }
}

static RING: Mutex<LogRing> = Mutex::new(LogRing::new());
static SINK: Mutex<Option<&'static mut (dyn Write + Send)>> = Mutex::new(None);

pub struct KernelLogger;

static LOGGER: KernelLogger = KernelLogger;

impl Log for KernelLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let mut line = LogLine::empty();
        line.level = record.level();
        let _ = write!(line, "[{}] {}: {}", record.level(), record.target(), record.args());

        if let Some(sink) = SINK.lock().as_mut() {
            let _ = sink.write_str(line.as_str());
            let _ = sink.write_str("\n");
        }

        RING.lock().push(line);
    }

    fn flush(&self) {}
}

/// Install the kernel logger. Call once during init.
pub fn init(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    log::set_logger(&LOGGER)?;
    log::set_max_level(level);
    Ok(())
}

/// Mirror every subsequent line to `sink` (typically COM1).
pub fn set_sink(sink: &'static mut (dyn Write + Send)) {
    *SINK.lock() = Some(sink);
}

/// Visit the retained lines oldest first.
pub fn recent(f: impl FnMut(&LogLine)) {
    RING.lock().for_each(f);
}

pub fn log_count() -> usize {
    RING.lock().len()
}
