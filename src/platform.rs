//! macOS action provider.
//!
//! Every probe shells out to a stock macOS utility and turns its output
//! into one line of text for the session to display.
//!
//! Structure:
//! - Constants: utility names and markers we look for (documented invariants)
//! - Pure functions: output parsing
//! - Effect functions: command execution, one per probe

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use humansize::{format_size, BINARY};

use crate::error::ProviderError;
use crate::provider::{ActionProvider, ProbeOutput};
use crate::types::{FsType, Probe, ProbeConfig};

// ============================================================================
// CONSTANTS (Documented Invariants)
// ============================================================================

/// Installer bundle that only exists on volumes booted from Catalina media.
///
/// Its presence at the volume root means the booted OS predates Big Sur,
/// which the install script requires.
pub const LEGACY_INSTALLER: &str = "Install macOS Catalina.app";

/// Substring `diskutil info` prints for a Fusion Drive container.
pub const FUSION_MARKER: &str = "Fusion Drive";

/// Line prefix carrying the size in `diskutil info` output.
const DISK_SIZE_PREFIX: &str = "Disk Size:";

/// Private framework binary that joins Wi-Fi networks from the command line.
const AIRPORTD: &str = "/usr/libexec/airportd";

// ============================================================================
// PURE FUNCTIONS (Parsing)
// ============================================================================

/// Extract the size from `diskutil info` output.
///
/// `Disk Size: 500.3 GB (500277790720 Bytes) (exactly ...)` yields
/// `500.3 GB (500277790720 Bytes)`.
pub fn parse_disk_size(info: &str) -> Option<String> {
    let line = info
        .lines()
        .map(str::trim)
        .find(|l| l.starts_with(DISK_SIZE_PREFIX))?;
    let value: Vec<&str> = line[DISK_SIZE_PREFIX.len()..]
        .split_whitespace()
        .take(4)
        .collect();
    if value.is_empty() {
        None
    } else {
        Some(value.join(" "))
    }
}

/// Extract the first GPU model from `ioreg -rc IOPCIDevice` output.
///
/// ioreg prints data properties as `"model" = <"AMD Radeon Pro 560">`.
pub fn parse_gpu_model(ioreg: &str) -> Option<String> {
    let line = ioreg.lines().find(|l| l.contains("\"model\""))?;
    let value = line.split_once('=')?.1.trim();
    let name = value
        .strip_prefix("<\"")
        .and_then(|v| v.strip_suffix("\">"))
        .unwrap_or(value);
    Some(name.trim_end_matches('\0').to_string())
}

/// Parse `sysctl -n hw.memsize` into a human size.
pub fn format_memsize(raw: &str) -> Option<String> {
    let bytes: u64 = raw.trim().parse().ok()?;
    Some(format_size(bytes, BINARY))
}

/// Bytes written and elapsed seconds from a `dd` summary on stderr.
///
/// Understands both the BSD form
/// (`1073741824 bytes transferred in 2.5 secs (429496729 bytes/sec)`)
/// and the GNU form
/// (`1073741824 bytes (1.1 GB, 1.0 GiB) copied, 2.5 s, 429 MB/s`).
pub fn parse_dd_summary(stderr: &str) -> Option<(u64, f64)> {
    let line = stderr.lines().rev().find(|l| l.contains("bytes"))?;
    let bytes: u64 = line.split_whitespace().next()?.parse().ok()?;
    let secs = bsd_seconds(line).or_else(|| gnu_seconds(line))?;
    if secs > 0.0 { Some((bytes, secs)) } else { None }
}

fn bsd_seconds(line: &str) -> Option<f64> {
    let mut tokens = line.split_whitespace();
    tokens.find(|t| *t == "in")?;
    tokens.next()?.parse().ok()
}

fn gnu_seconds(line: &str) -> Option<f64> {
    line.split(", ")
        .find_map(|part| part.trim().strip_suffix(" s")?.parse().ok())
}

/// Format a throughput as `<size>/s`.
pub fn format_throughput(bytes: u64, secs: f64) -> String {
    let per_sec = (bytes as f64 / secs) as u64;
    format!("{}/s", format_size(per_sec, BINARY))
}

/// True when a directory listing contains the legacy installer bundle.
pub fn has_legacy_installer<I, S>(entries: I) -> bool
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    entries.into_iter().any(|e| e.as_ref() == LEGACY_INSTALLER)
}

// ============================================================================
// COMMAND EXECUTION
// ============================================================================

/// Run a command to completion and fail on a non-zero exit status.
fn exec(program: &str, args: &[&str]) -> Result<Output, ProviderError> {
    tracing::debug!(program, ?args, "exec");
    let output = Command::new(program)
        .args(args)
        .output()
        .map_err(|source| ProviderError::Spawn {
            program: program.to_string(),
            source,
        })?;

    if !output.status.success() {
        return Err(ProviderError::ExitStatus {
            program: program.to_string(),
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(output)
}

/// Run a command and return its stdout as text.
fn exec_stdout(program: &str, args: &[&str]) -> Result<String, ProviderError> {
    let output = exec(program, args)?;
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

fn unexpected(program: &str, output: &str) -> ProviderError {
    ProviderError::UnexpectedOutput {
        program: program.to_string(),
        output: output.trim().to_string(),
    }
}

// ============================================================================
// SYSTEM PROVIDER
// ============================================================================

/// Action provider backed by the machine's own utilities.
#[derive(Debug, Clone, Default)]
pub struct SystemProvider {
    config: ProbeConfig,
}

impl SystemProvider {
    pub fn new(config: ProbeConfig) -> Self {
        SystemProvider { config }
    }

    pub fn config(&self) -> &ProbeConfig {
        &self.config
    }

    fn cpu(&self) -> Result<String, ProviderError> {
        let out = exec_stdout("sysctl", &["-n", "machdep.cpu.brand_string"])?;
        Ok(out.trim().to_string())
    }

    fn ram(&self) -> Result<String, ProviderError> {
        let out = exec_stdout("sysctl", &["-n", "hw.memsize"])?;
        format_memsize(&out).ok_or_else(|| unexpected("sysctl", &out))
    }

    fn gpu(&self) -> Result<String, ProviderError> {
        let out = exec_stdout("ioreg", &["-rc", "IOPCIDevice"])?;
        parse_gpu_model(&out).ok_or_else(|| unexpected("ioreg", "no \"model\" property"))
    }

    /// Size of the boot disk, or of the Fusion container when there is one.
    fn hdd(&self) -> Result<String, ProviderError> {
        let fusion_disk = self.config.fusion_disk.as_str();
        let is_fusion = match exec_stdout("diskutil", &["info", fusion_disk]) {
            Ok(info) => info.contains(FUSION_MARKER),
            Err(e) => {
                tracing::debug!(error = %e, disk = fusion_disk, "no fusion container");
                false
            }
        };

        let disk = if is_fusion {
            fusion_disk
        } else {
            self.config.target_disk.as_str()
        };
        let info = exec_stdout("diskutil", &["info", disk])?;
        let size = parse_disk_size(&info).ok_or_else(|| unexpected("diskutil", DISK_SIZE_PREFIX))?;

        if is_fusion {
            Ok(format!("DEVICE IS USING FUSION DRIVE\n{}: {}", disk, size))
        } else {
            Ok(format!("{}: {}", disk, size))
        }
    }

    fn ping(&self) -> Result<String, ProviderError> {
        exec_stdout("ping", &["-c", "1", self.config.ping_host.as_str()])
    }

    fn wifi(&self) -> Result<String, ProviderError> {
        let wifi = &self.config.wifi;
        let ssid = wifi
            .ssid
            .as_deref()
            .ok_or(ProviderError::NotConfigured("wifi ssid"))?;
        let mut args = vec![wifi.interface.as_str(), "alloc", "--ssid", ssid];
        if let Some(password) = wifi.password.as_deref() {
            args.extend(["--security", "wpa2", "--password", password]);
        }
        exec_stdout(AIRPORTD, &args)
    }

    /// Install flow: refuse on legacy-booted volumes, otherwise run the script.
    ///
    /// An unreadable volume root is fatal: nothing else the session offers
    /// can be trusted on such a system.
    fn os_install(&self) -> Result<ProbeOutput, ProviderError> {
        let root = &self.config.root_dir;
        let entries = list_dir(root).map_err(|e| {
            ProviderError::SessionFatal(format!("cannot read {}: {}", root.display(), e))
        })?;

        if has_legacy_installer(&entries) {
            tracing::info!(installer = LEGACY_INSTALLER, "legacy installer present");
            return Ok(ProbeOutput::PreconditionNotMet);
        }

        let script = self.config.install_script.to_string_lossy();
        exec_stdout("bash", &[&*script]).map(ProbeOutput::Report)
    }

    fn format(&self, fs: FsType) -> Result<String, ProviderError> {
        if fs == FsType::Fusion {
            return Err(ProviderError::Unimplemented("Fusion Drive format"));
        }
        let disk = self.config.target_disk.as_str();
        tracing::warn!(%fs, disk, "erasing disk");
        exec(
            "diskutil",
            &["eraseDisk", fs.label(), self.config.volume_name.as_str(), disk],
        )?;
        Ok(format!("{} on {}", fs, disk))
    }

    /// Write zeros with `dd` and report throughput. The scratch file is
    /// always removed, even when parsing fails.
    fn write_test(&self) -> Result<String, ProviderError> {
        let test = &self.config.write_test;
        let of = format!("of={}", test.path.display());
        let bs = format!("bs={}", test.block_size);
        let count = format!("count={}", test.count);

        let result = exec("dd", &["if=/dev/zero", of.as_str(), bs.as_str(), count.as_str()]);

        if let Err(e) = fs::remove_file(&test.path) {
            tracing::warn!(path = %test.path.display(), error = %e, "could not remove write test file");
        }

        let output = result?;
        let stderr = String::from_utf8_lossy(&output.stderr);
        let (bytes, secs) = parse_dd_summary(&stderr).ok_or_else(|| unexpected("dd", &stderr))?;
        Ok(format_throughput(bytes, secs))
    }
}

impl ActionProvider for SystemProvider {
    fn run(&self, probe: Probe) -> Result<ProbeOutput, ProviderError> {
        match probe {
            Probe::Cpu => self.cpu().map(ProbeOutput::Report),
            Probe::Ram => self.ram().map(ProbeOutput::Report),
            Probe::Gpu => self.gpu().map(ProbeOutput::Report),
            Probe::Hdd => self.hdd().map(ProbeOutput::Report),
            Probe::Ping => self.ping().map(ProbeOutput::Report),
            Probe::Wifi => self.wifi().map(ProbeOutput::Report),
            Probe::OsInstall => self.os_install(),
            Probe::Format(fs) => self.format(fs).map(ProbeOutput::Report),
            Probe::WriteTest => self.write_test().map(ProbeOutput::Report),
        }
    }
}

/// File names directly under `dir`.
fn list_dir(dir: &Path) -> std::io::Result<Vec<String>> {
    fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.file_name().to_string_lossy().into_owned()))
        .collect()
}

// ============================================================================
// TESTS
// ============================================================================
