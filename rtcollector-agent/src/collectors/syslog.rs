//! Persistent syslog listener collector.
//!
//! Ports `inputs/syslog.py`'s `socketserver`-based TCP handler and
//! `SYSLOG_REGEX` (PRI, timestamp, hostname, appname, procid, message) into
//! a collector that owns a background accept loop for the lifetime of the
//! process: `start` binds the listener and spawns the accept loop, `collect`
//! only drains whatever arrived since the last cycle, and `stop` cancels
//! the loop.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use regex::Regex;
use rtcollector_core::{LogLevel, LogRecord};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use super::{Batch, Collector};

const SYSLOG_PATTERN: &str =
    r"^<(?P<pri>\d{1,3})>(?P<timestamp>\S+\s+\S+\s+\S+)\s+(?P<hostname>\S+)\s+(?P<appname>[\w.\-/]+?)(\[(?P<procid>\d+)\])?:\s*(?P<message>.*)$";

/// Listens for syslog lines over TCP and buffers parsed records until the
/// next `collect` call drains them.
pub struct SyslogCollector {
    bind_addr: String,
    inbox: Arc<Mutex<VecDeque<LogRecord>>>,
    accept_task: Option<JoinHandle<()>>,
}

impl SyslogCollector {
    /// Build a collector that will listen on `bind_addr` (e.g.
    /// `0.0.0.0:5514`) once started.
    #[must_use]
    pub fn new(bind_addr: impl Into<String>) -> Self {
        Self {
            bind_addr: bind_addr.into(),
            inbox: Arc::new(Mutex::new(VecDeque::new())),
            accept_task: None,
        }
    }
}

#[async_trait]
impl Collector for SyslogCollector {
    fn name(&self) -> &str {
        "syslog"
    }

    fn is_persistent(&self) -> bool {
        true
    }

    async fn start(&mut self) -> anyhow::Result<()> {
        let listener = TcpListener::bind(&self.bind_addr).await?;
        let inbox = Arc::clone(&self.inbox);
        self.accept_task = Some(tokio::spawn(accept_loop(listener, inbox)));
        Ok(())
    }

    async fn collect(&mut self) -> anyhow::Result<Batch> {
        let mut inbox = self.inbox.lock().await;
        let logs: Vec<LogRecord> = inbox.drain(..).collect();
        Ok(Batch::from_logs(logs))
    }

    async fn stop(&mut self) -> anyhow::Result<()> {
        if let Some(task) = self.accept_task.take() {
            task.abort();
        }
        Ok(())
    }
}

async fn accept_loop(listener: TcpListener, inbox: Arc<Mutex<VecDeque<LogRecord>>>) {
    loop {
        let Ok((socket, _)) = listener.accept().await else {
            continue;
        };
        let inbox = Arc::clone(&inbox);
        tokio::spawn(async move {
            let mut lines = BufReader::new(socket).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                if let Some(record) = parse_syslog_line(&line) {
                    inbox.lock().await.push_back(record);
                }
            }
        });
    }
}

/// Parse one syslog line into a [`LogRecord`], deriving facility/severity
/// from the PRI value the same way the original computed
/// `facility = pri >> 3` and `severity = pri & 0x07`.
#[must_use]
pub fn parse_syslog_line(line: &str) -> Option<LogRecord> {
    let re = Regex::new(SYSLOG_PATTERN).ok()?;
    let caps = re.captures(line.trim())?;
    let pri: u8 = caps.name("pri")?.as_str().parse().ok()?;
    let facility = pri >> 3;
    let severity = pri & 0x07;
    let hostname = caps.name("hostname")?.as_str();
    let appname = caps.name("appname")?.as_str();
    let message = caps.name("message")?.as_str();

    let level = match severity {
        0..=3 => LogLevel::Error,
        4 => LogLevel::Warn,
        _ => LogLevel::Info,
    };

    let mut record = LogRecord::at(level, message)
        .with_tag("hostname", hostname)
        .with_tag("appname", appname)
        .with_tag("facility", facility.to_string())
        .with_tag("severity", severity.to_string());
    if let Some(procid) = caps.name("procid") {
        record = record.with_tag("procid", procid.as_str());
    }
    Some(record)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_standard_syslog_line() {
        let line = "<34>Oct 11 22:14:15 myhost su[1234]: something bad happened";
        let record = parse_syslog_line(line).unwrap();
        assert_eq!(record.message, "something bad happened");
        assert_eq!(record.tags.get("hostname").unwrap(), "myhost");
        assert_eq!(record.tags.get("appname").unwrap(), "su");
        assert_eq!(record.tags.get("procid").unwrap(), "1234");
        // pri 34 = facility 4, severity 2 -> error
        assert_eq!(record.level, LogLevel::Error);
    }

    #[test]
    fn unparseable_line_yields_none() {
        assert!(parse_syslog_line("not a syslog line at all").is_none());
    }
}
