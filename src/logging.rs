use std::fs::{self, OpenOptions};
use std::io;
use std::path::Path;

use env_logger::{Builder, Env, Target};

/// Where log records go
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogSink<'a> {
    /// Append to a file so the alternate screen stays clean
    File(&'a Path),
    Stderr,
}

fn builder() -> Builder {
    Builder::from_env(Env::default().default_filter_or("info"))
}

/// Install the global logger. `RUST_LOG` overrides the default `info` filter.
/// A second call is a no-op.
pub fn init(sink: LogSink<'_>) -> io::Result<()> {
    let mut builder = builder();
    match sink {
        LogSink::File(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            builder.target(Target::Pipe(Box::new(file)));
        }
        LogSink::Stderr => {
            builder.target(Target::Stderr);
        }
    }
    let _ = builder.try_init();
    Ok(())
}
