//! Shared logging setup for flamebridge processes.
//!
//! The integration runs headless inside the host (or inside a farm worker),
//! so the rotated log file is the only reliable observability channel.
//! Every flamebridge process initializes tracing the same way: a rolling
//! file appender plus stderr output, both controlled by `EnvFilter`.

use anyhow::{Context, Result};
use flamebridge_protocol::defaults;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const DEFAULT_LOG_FILTER: &str =
    "flamebridge_engine=info,flamebridge_backburner=info,flamebridge_protocol=info";
const DEBUG_LOG_FILTER: &str =
    "flamebridge_engine=debug,flamebridge_backburner=debug,flamebridge_protocol=debug";

/// One log file plus this many rotated backups are kept.
const MAX_LOG_BACKUPS: usize = 10;
/// Rotation threshold per file.
const MAX_LOG_FILE_SIZE: u64 = 4 * 1024 * 1024;

/// Logging configuration shared by flamebridge binaries.
pub struct LogConfig<'a> {
    /// Base name of the log file, typically the binary name.
    pub app_name: &'a str,
    /// Force debug-level output regardless of environment filters.
    pub debug: bool,
}

/// Initialize tracing with a rolling file writer and stderr output.
pub fn init_logging(config: LogConfig<'_>) -> Result<()> {
    let log_dir = ensure_logs_dir().context("failed to ensure log directory")?;
    let writer = RollingWriter::open(log_dir, config.app_name)
        .context("failed to initialize rolling log writer")?;

    let default = if config.debug {
        DEBUG_LOG_FILTER
    } else {
        DEFAULT_LOG_FILTER
    };
    let file_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let stderr_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_filter(file_filter),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_filter(stderr_filter),
        )
        .init();

    Ok(())
}

/// The flamebridge home directory.
///
/// Priority: `FLAMEBRIDGE_HOME`, then `~/.flamebridge`, then
/// `./.flamebridge` for environments without a resolvable home.
pub fn flamebridge_home() -> PathBuf {
    if let Ok(override_path) = std::env::var(defaults::ENV_HOME) {
        return PathBuf::from(override_path);
    }
    match dirs::home_dir() {
        Some(home) => home.join(".flamebridge"),
        None => PathBuf::from(".").join(".flamebridge"),
    }
}

/// The logs directory: `<home>/logs`.
pub fn logs_dir() -> PathBuf {
    flamebridge_home().join("logs")
}

fn ensure_logs_dir() -> Result<PathBuf> {
    let logs = logs_dir();
    fs::create_dir_all(&logs)
        .with_context(|| format!("failed to create logs directory: {}", logs.display()))?;
    Ok(logs)
}

/// Size-capped appender: `<name>.log` rotates into `<name>.log.1` ..
/// `<name>.log.N`, oldest dropped.
struct RollingFile {
    dir: PathBuf,
    base_name: String,
    file: File,
    written: u64,
}

impl RollingFile {
    fn open(dir: PathBuf, base_name: String) -> io::Result<Self> {
        fs::create_dir_all(&dir)?;
        let path = dir.join(format!("{base_name}.log"));
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let written = file.metadata()?.len();
        let mut rolling = Self {
            dir,
            base_name,
            file,
            written,
        };
        if rolling.written >= MAX_LOG_FILE_SIZE {
            rolling.rotate()?;
        }
        Ok(rolling)
    }

    fn slot(&self, index: usize) -> PathBuf {
        match index {
            0 => self.dir.join(format!("{}.log", self.base_name)),
            n => self.dir.join(format!("{}.log.{}", self.base_name, n)),
        }
    }

    fn rotate(&mut self) -> io::Result<()> {
        self.file.flush()?;

        let oldest = self.slot(MAX_LOG_BACKUPS);
        if oldest.exists() {
            fs::remove_file(&oldest)?;
        }
        for index in (0..MAX_LOG_BACKUPS).rev() {
            let src = self.slot(index);
            if src.exists() {
                fs::rename(&src, self.slot(index + 1))?;
            }
        }

        self.file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.slot(0))?;
        self.written = 0;
        Ok(())
    }
}

impl Write for RollingFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.written + buf.len() as u64 > MAX_LOG_FILE_SIZE {
            self.rotate()?;
        }
        let bytes = self.file.write(buf)?;
        self.written += bytes as u64;
        Ok(bytes)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

/// Clonable handle handed to the `fmt` layer; all clones share one
/// appender.
#[derive(Clone)]
struct RollingWriter {
    inner: Arc<Mutex<RollingFile>>,
}

impl RollingWriter {
    fn open(dir: PathBuf, base_name: &str) -> Result<Self> {
        let file = RollingFile::open(dir, base_name.to_string())
            .with_context(|| format!("failed to open log file for {base_name}"))?;
        Ok(Self {
            inner: Arc::new(Mutex::new(file)),
        })
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for RollingWriter {
    type Writer = RollingWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

impl Write for RollingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut file = self
            .inner
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log writer lock poisoned"))?;
        file.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut file = self
            .inner
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log writer lock poisoned"))?;
        file.flush()
    }
}
