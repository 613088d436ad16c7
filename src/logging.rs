use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;

use chrono::Local;
use env_logger::Target;
use log::{LevelFilter, warn};

/// Writes every log line to two sinks.
pub struct Tee<A, B> {
    first: A,
    second: B,
}

impl<A: Write, B: Write> Tee<A, B> {
    pub fn new(first: A, second: B) -> Self {
        Self { first, second }
    }

    pub fn into_inner(self) -> (A, B) {
        (self.first, self.second)
    }
}

impl<A: Write, B: Write> Write for Tee<A, B> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.first.write_all(buf)?;
        self.second.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.first.flush()?;
        self.second.flush()
    }
}

/// Log to stderr and append to `log_file`, `<timestamp> - <LEVEL> - <message>`.
/// `RUST_LOG` overrides the default `info` level.
pub fn init(log_file: &Path) {
    let mut builder = env_logger::Builder::new();
    builder
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .format(|buf, record| {
            writeln!(
                buf,
                "{} - {} - {}",
                Local::now().format("%Y-%m-%d %H:%M:%S,%3f"),
                record.level(),
                record.args()
            )
        });

    let file = OpenOptions::new().create(true).append(true).open(log_file);
    let file_error = match file {
        Ok(file) => {
            builder.target(Target::Pipe(Box::new(Tee::new(io::stderr(), file))));
            None
        }
        Err(e) => Some(e),
    };
    builder.init();

    if let Some(e) = file_error {
        warn!("Could not open {}, logging to stderr only: {e}", log_file.display());
    }
}
