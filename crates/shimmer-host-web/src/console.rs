//! `tracing` output for the browser console.
//!
//! The fmt subscriber formats each event into one buffer; `ConsoleWriter` hands that buffer
//! to a sink as a single console call at the event's level. The sink is a plain function so
//! the routing runs without a browser.

use std::fmt;
use std::io;

use tracing::{Level, Metadata};
use tracing_subscriber::fmt::MakeWriter;

/// Console method an event is written with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConsoleLevel {
    Error,
    Warn,
    Info,
    Log,
}

impl From<&Level> for ConsoleLevel {
    fn from(level: &Level) -> Self {
        if *level == Level::ERROR {
            ConsoleLevel::Error
        } else if *level == Level::WARN {
            ConsoleLevel::Warn
        } else if *level == Level::INFO {
            ConsoleLevel::Info
        } else {
            ConsoleLevel::Log
        }
    }
}

pub type ConsoleSink = fn(ConsoleLevel, &str);

#[derive(Clone, Copy)]
pub struct ConsoleMakeWriter {
    sink: ConsoleSink,
}

impl fmt::Debug for ConsoleMakeWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConsoleMakeWriter").finish_non_exhaustive()
    }
}

impl ConsoleMakeWriter {
    pub fn new(sink: ConsoleSink) -> Self {
        Self { sink }
    }

    fn writer(&self, level: ConsoleLevel) -> ConsoleWriter {
        ConsoleWriter {
            sink: self.sink,
            level,
            buf: Vec::new(),
        }
    }
}

/// Buffers one formatted event and emits it on drop.
pub struct ConsoleWriter {
    sink: ConsoleSink,
    level: ConsoleLevel,
    buf: Vec<u8>,
}

impl fmt::Debug for ConsoleWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConsoleWriter")
            .field("level", &self.level)
            .field("buffered", &self.buf.len())
            .finish_non_exhaustive()
    }
}

impl io::Write for ConsoleWriter {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(bytes);
        Ok(bytes.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for ConsoleWriter {
    fn drop(&mut self) {
        let text = String::from_utf8_lossy(&self.buf);
        let line = text.trim_end();
        if !line.is_empty() {
            (self.sink)(self.level, line);
        }
    }
}

impl<'a> MakeWriter<'a> for ConsoleMakeWriter {
    type Writer = ConsoleWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.writer(ConsoleLevel::Log)
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        self.writer(meta.level().into())
    }
}

/// fmt subscriber writing through `sink`. No timestamps: wasm32 has no wall clock for them.
pub fn subscriber(sink: ConsoleSink, max_level: Level) -> impl tracing::Subscriber + Send + Sync {
    tracing_subscriber::fmt()
        .with_writer(ConsoleMakeWriter::new(sink))
        .with_max_level(max_level)
        .without_time()
        .with_target(false)
        .finish()
}
