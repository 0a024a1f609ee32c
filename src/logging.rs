//! Logging setup.
//!
//! Everything goes through `tracing`. The console gets a regular `fmt` layer
//! filtered by `RUST_LOG` or the configured level; request events (target
//! [`ACCESS_TARGET`]) are additionally appended to the request log file by
//! [`AccessLogLayer`].

use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, SendError, Sender};
use std::thread::{self, JoinHandle};

use chrono::{DateTime, Local};
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::{
    EnvFilter, Layer,
    filter::filter_fn,
    layer::{Context, SubscriberExt},
    util::{SubscriberInitExt, TryInitError},
};

/// Target of the one-per-request events written to the request log.
pub const ACCESS_TARGET: &str = "tunehall::access";

/// Install the global subscriber.
///
/// `level` is used when `RUST_LOG` is unset or invalid. Keep the returned
/// guard alive for as long as requests are logged.
pub fn init(level: &str, access_log: PathBuf) -> Result<AccessLogGuard, TryInitError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let (access_layer, guard) = AccessLogLayer::new(access_log);

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_filter(filter))
        .with(access_layer.with_filter(filter_fn(|meta| meta.target() == ACCESS_TARGET)))
        .try_init()?;

    Ok(guard)
}

enum Message {
    Line(String),
    Shutdown,
}

/// Hands one line per access event to a writer thread.
///
/// The writer opens, appends to and closes the file for every line. When the
/// append fails the line goes to stderr instead.
#[derive(Debug, Clone)]
pub struct AccessLogLayer {
    tx: Sender<Message>,
}

impl AccessLogLayer {
    pub fn new(path: PathBuf) -> (Self, AccessLogGuard) {
        let (tx, rx) = mpsc::channel();
        let worker = thread::spawn(move || write_lines(&path, rx));

        let guard = AccessLogGuard {
            tx: tx.clone(),
            worker: Some(worker),
        };
        (Self { tx }, guard)
    }
}

impl<S: Subscriber> Layer<S> for AccessLogLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if event.metadata().target() != ACCESS_TARGET {
            return;
        }

        let mut entry = AccessEntry::default();
        event.record(&mut entry);
        if let Err(SendError(Message::Line(line))) =
            self.tx.send(Message::Line(entry.line(Local::now())))
        {
            eprint!("{line}");
        }
    }
}

/// Flushes pending request log lines and stops the writer thread on drop.
#[derive(Debug)]
pub struct AccessLogGuard {
    tx: Sender<Message>,
    worker: Option<JoinHandle<()>>,
}

impl Drop for AccessLogGuard {
    fn drop(&mut self) {
        let _ = self.tx.send(Message::Shutdown);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

fn write_lines(path: &Path, rx: Receiver<Message>) {
    for message in rx {
        match message {
            Message::Line(line) => append(path, &line),
            Message::Shutdown => break,
        }
    }
}

fn append(path: &Path, line: &str) {
    let result = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .and_then(|mut file| file.write_all(line.as_bytes()));

    if let Err(e) = result {
        eprintln!("tunehall: failed to write request log {}: {e}", path.display());
        eprint!("{line}");
    }
}

/// Fields of a single access event.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AccessEntry {
    pub remote: String,
    pub method: String,
    pub uri: String,
    pub handler: String,
}

impl AccessEntry {
    /// `[dd-MM-yyyy HH:mm:ss.SSS]: <remote>| <METHOD>: <uri> (<handler>)\n`
    pub fn line(&self, at: DateTime<Local>) -> String {
        format!(
            "[{}]: {}| {}: {} ({})\n",
            at.format("%d-%m-%Y %H:%M:%S%.3f"),
            self.remote,
            self.method,
            self.uri,
            self.handler
        )
    }

    fn set(&mut self, field: &Field, value: String) {
        match field.name() {
            "remote" => self.remote = value,
            "method" => self.method = value,
            "uri" => self.uri = value,
            "handler" => self.handler = value,
            _ => {}
        }
    }
}

impl Visit for AccessEntry {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.set(field, value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.set(field, format!("{value:?}"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tracing_subscriber::registry::Registry;

    #[test]
    fn line_matches_request_log_format() {
        let at = Local.with_ymd_and_hms(2024, 3, 7, 9, 5, 2).unwrap()
            + chrono::Duration::milliseconds(45);
        let entry = AccessEntry {
            remote: "127.0.0.1:51234".into(),
            method: "GET".into(),
            uri: "/music/My Song.html".into(),
            handler: "Music".into(),
        };

        assert_eq!(
            entry.line(at),
            "[07-03-2024 09:05:02.045]: 127.0.0.1:51234| GET: /music/My Song.html (Music)\n"
        );
    }

    #[test]
    fn access_events_are_appended_to_the_log_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("server.log");
        let (layer, guard) = AccessLogLayer::new(path.clone());
        let subscriber = Registry::default().with(layer);

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(
                target: ACCESS_TARGET,
                remote = %"10.0.0.2:4000",
                method = %"GET",
                uri = %"/",
                handler = "Root",
                "request"
            );
            tracing::info!("not a request");
            tracing::info!(
                target: ACCESS_TARGET,
                remote = %"10.0.0.2:4000",
                method = %"POST",
                uri = %"/",
                handler = "Root",
                "request"
            );
        });
        drop(guard);

        let log = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = log.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with('['));
        assert!(lines[0].ends_with("]: 10.0.0.2:4000| GET: / (Root)"));
        assert!(lines[1].ends_with("]: 10.0.0.2:4000| POST: / (Root)"));
    }

    #[test]
    fn unwritable_log_does_not_panic() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("server.log");
        append(&path, "[x]: - | GET: / (Root)\n");
        assert!(!path.exists());
    }

    #[test]
    fn events_after_shutdown_fall_back_to_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let (layer, guard) = AccessLogLayer::new(dir.path().join("server.log"));
        drop(guard);

        let subscriber = Registry::default().with(layer);
        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(
                target: ACCESS_TARGET,
                remote = %"-",
                method = %"GET",
                uri = %"/",
                handler = "Root",
                "request"
            );
        });

        assert!(!dir.path().join("server.log").exists());
    }
}
