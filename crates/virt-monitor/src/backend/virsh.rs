//! Backend driving the `virsh` command-line client
//!
//! Every query spawns `virsh --connect <uri> ...` and parses its text
//! output. Counters that `virsh` does not print are reported as `-1`, the
//! hypervisor convention for an unsupported statistic.

use std::collections::HashMap;
use std::path::PathBuf;
use std::process::Command;

use error_stack::Report;
use error_stack::ResultExt;

use crate::domain::BlockStats;
use crate::domain::Connection;
use crate::domain::ConnectionProvider;
use crate::domain::CpuStats;
use crate::domain::DomainHandle;
use crate::domain::InterfaceStats;
use crate::domain::MemoryStats;
use crate::domain::MonitorError;
use crate::domain::QueryError;

/// `domifstat` counter names, in [`InterfaceStats`] order.
const INTERFACE_COUNTERS: [&str; 8] = [
    "rx_bytes",
    "rx_packets",
    "rx_errs",
    "rx_drop",
    "tx_bytes",
    "tx_packets",
    "tx_errs",
    "tx_drop",
];

/// `domblkstat` counter names, in [`BlockStats`] order.
const BLOCK_COUNTERS: [&str; 5] = ["rd_req", "rd_bytes", "wr_req", "wr_bytes", "errs"];

const UNSUPPORTED: i64 = -1;

/// Opens `virsh`-backed connections to a libvirt URI.
#[derive(Debug, Clone)]
pub struct VirshProvider {
    client: VirshClient,
}

impl VirshProvider {
    pub fn new(virsh: impl Into<PathBuf>, uri: impl Into<String>) -> Self {
        Self {
            client: VirshClient {
                virsh: virsh.into(),
                uri: uri.into(),
            },
        }
    }
}

impl ConnectionProvider for VirshProvider {
    fn open(&self) -> Result<Box<dyn Connection>, Report<MonitorError>> {
        let client = self.client.clone();
        let canonical = client
            .run(&["uri"])
            .change_context(MonitorError::ConnectionFailed {
                uri: client.uri.clone(),
            })?;
        tracing::debug!(uri = %canonical.trim(), "hypervisor reachable");
        Ok(Box::new(VirshConnection { client }))
    }
}

#[derive(Debug, Clone)]
struct VirshClient {
    virsh: PathBuf,
    uri: String,
}

impl VirshClient {
    fn run(&self, args: &[&str]) -> Result<String, Report<QueryError>> {
        let command = format!("virsh {}", args.join(" "));
        tracing::debug!(%command, uri = %self.uri, "running virsh");

        let output = Command::new(&self.virsh)
            .arg("--connect")
            .arg(&self.uri)
            .args(args)
            .output()
            .change_context(QueryError::CommandFailed {
                command: command.clone(),
                message: format!("failed to spawn {}", self.virsh.display()),
            })?;

        if !output.status.success() {
            return Err(Report::new(QueryError::CommandFailed {
                command,
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }));
        }

        String::from_utf8(output.stdout).change_context(QueryError::UnexpectedOutput {
            command,
            message: "output is not valid UTF-8".to_string(),
        })
    }
}

struct VirshConnection {
    client: VirshClient,
}

impl Connection for VirshConnection {
    fn lookup(&self, target_id: &str) -> Result<Box<dyn DomainHandle + '_>, Report<MonitorError>> {
        let output = self
            .client
            .run(&["domuuid", target_id])
            .change_context(MonitorError::NotFound {
                target_id: target_id.to_string(),
            })?;
        let uuid = output.trim().to_string();
        if uuid.is_empty() {
            return Err(Report::new(MonitorError::NotFound {
                target_id: target_id.to_string(),
            }));
        }
        tracing::debug!(%target_id, %uuid, "domain resolved");
        Ok(Box::new(VirshDomain {
            client: &self.client,
            uuid,
        }))
    }
}

impl Drop for VirshConnection {
    fn drop(&mut self) {
        tracing::debug!(uri = %self.client.uri, "connection released");
    }
}

struct VirshDomain<'c> {
    client: &'c VirshClient,
    uuid: String,
}

impl DomainHandle for VirshDomain<'_> {
    fn descriptor_xml(&self) -> Result<String, Report<QueryError>> {
        self.client.run(&["dumpxml", &self.uuid])
    }

    fn cpu_stats(&self) -> Result<Vec<CpuStats>, Report<QueryError>> {
        let output = self.client.run(&["cpu-stats", &self.uuid, "--total"])?;
        parse_cpu_stats(&output)
    }

    fn vcpu_count(&self) -> Result<u32, Report<QueryError>> {
        let output = self
            .client
            .run(&["vcpucount", &self.uuid, "--current", "--active"])?;
        parse_vcpu_count(&output)
    }

    fn memory_stats(&self) -> Result<MemoryStats, Report<QueryError>> {
        let output = self.client.run(&["dommemstat", &self.uuid])?;
        Ok(parse_memory_stats(&output))
    }

    fn interface_stats(&self, device: &str) -> Result<InterfaceStats, Report<QueryError>> {
        let output = self.client.run(&["domifstat", &self.uuid, device])?;
        let counters = parse_device_counters(&output);
        Ok(INTERFACE_COUNTERS.map(|name| counters.get(name).copied().unwrap_or(UNSUPPORTED)))
    }

    fn block_stats(&self, device: &str) -> Result<BlockStats, Report<QueryError>> {
        let output = self.client.run(&["domblkstat", &self.uuid, device])?;
        let counters = parse_device_counters(&output);
        Ok(BLOCK_COUNTERS.map(|name| counters.get(name).copied().unwrap_or(UNSUPPORTED)))
    }
}

/// Parse `cpu-stats --total` output; times are converted to nanoseconds.
fn parse_cpu_stats(output: &str) -> Result<Vec<CpuStats>, Report<QueryError>> {
    let mut stats = CpuStats::new();
    for line in output.lines() {
        let mut tokens = line.split_whitespace();
        let (Some(name), Some(value)) = (tokens.next(), tokens.next()) else {
            continue;
        };
        if name.ends_with(':') {
            continue;
        }
        let nanos = parse_seconds_as_nanos(value).ok_or_else(|| {
            Report::new(QueryError::UnexpectedOutput {
                command: "virsh cpu-stats".to_string(),
                message: format!("invalid time {value:?} for {name}"),
            })
        })?;
        stats.insert(name.to_string(), nanos);
    }

    if stats.is_empty() {
        Ok(Vec::new())
    } else {
        Ok(vec![stats])
    }
}

/// `"12.345678901"` seconds as nanoseconds, without going through floats.
fn parse_seconds_as_nanos(value: &str) -> Option<u64> {
    let (secs, frac) = value.split_once('.').unwrap_or((value, ""));
    if frac.len() > 9 || !frac.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let secs: u64 = secs.parse().ok()?;
    let frac: u64 = if frac.is_empty() {
        0
    } else {
        format!("{frac:0<9}").parse().ok()?
    };
    secs.checked_mul(1_000_000_000)?.checked_add(frac)
}

fn parse_vcpu_count(output: &str) -> Result<u32, Report<QueryError>> {
    output
        .lines()
        .filter_map(|line| line.split_whitespace().last())
        .last()
        .and_then(|token| token.parse().ok())
        .ok_or_else(|| {
            Report::new(QueryError::UnexpectedOutput {
                command: "virsh vcpucount".to_string(),
                message: format!("no vcpu count in {:?}", output.trim()),
            })
        })
}

/// Parse `name value` lines; lines that do not fit are skipped.
fn parse_memory_stats(output: &str) -> MemoryStats {
    output
        .lines()
        .filter_map(|line| {
            let mut tokens = line.split_whitespace();
            let name = tokens.next()?;
            let value = tokens.next()?.parse().ok()?;
            Some((name.to_string(), value))
        })
        .collect()
}

/// Parse `device name value` lines from `domifstat` / `domblkstat`.
fn parse_device_counters(output: &str) -> HashMap<String, i64> {
    output
        .lines()
        .filter_map(|line| {
            let mut tokens = line.split_whitespace();
            let _device = tokens.next()?;
            let name = tokens.next()?;
            let value = tokens.next()?.parse().ok()?;
            Some((name.to_string(), value))
        })
        .collect()
}
