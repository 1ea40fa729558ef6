//! Domain types for hwinfo.
//!
//! Probe identities, their configuration, and the records produced by
//! the one-shot CLI commands.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

// ============================================================================
// ENUMS
// ============================================================================

/// Filesystem a disk can be erased to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsType {
    /// Apple File System.
    Apfs,
    /// Journaled HFS+ ("Mac OS Extended").
    JhfsPlus,
    /// Fusion Drive reset (SSD + HDD pair).
    Fusion,
}

impl FsType {
    /// Name `diskutil` expects for this filesystem.
    pub fn label(self) -> &'static str {
        match self {
            FsType::Apfs => "APFS",
            FsType::JhfsPlus => "JHFS+",
            FsType::Fusion => "Fusion",
        }
    }
}

impl fmt::Display for FsType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A single action an action provider can perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Probe {
    Cpu,
    Ram,
    Gpu,
    Hdd,
    Ping,
    Wifi,
    OsInstall,
    Format(FsType),
    /// Sequential write throughput of the boot disk.
    WriteTest,
}

impl Probe {
    /// Read-only probes that are safe to run unattended.
    pub const SUMMARY: [Probe; 4] = [Probe::Cpu, Probe::Ram, Probe::Gpu, Probe::Hdd];

    /// Short human label, used in reports and log lines.
    pub fn label(self) -> &'static str {
        match self {
            Probe::Cpu => "CPU",
            Probe::Ram => "RAM",
            Probe::Gpu => "GPU",
            Probe::Hdd => "Disk",
            Probe::Ping => "Ping",
            Probe::Wifi => "Wi-Fi",
            Probe::OsInstall => "OS install",
            Probe::Format(_) => "Format",
            Probe::WriteTest => "Write test",
        }
    }
}

impl fmt::Display for Probe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Probe::Format(fs) => write!(f, "format({})", fs),
            Probe::Cpu => f.write_str("cpu"),
            Probe::Ram => f.write_str("ram"),
            Probe::Gpu => f.write_str("gpu"),
            Probe::Hdd => f.write_str("hdd"),
            Probe::Ping => f.write_str("ping"),
            Probe::Wifi => f.write_str("wifi"),
            Probe::OsInstall => f.write_str("os-install"),
            Probe::WriteTest => f.write_str("write-test"),
        }
    }
}

/// Output format for the one-shot commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Human,
    Json,
}

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Wi-Fi join parameters for `airportd`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WifiConfig {
    /// Network interface, e.g. `en1`.
    pub interface: String,
    /// Network name. The Wi-Fi probe refuses to run without one.
    pub ssid: Option<String>,
    /// WPA2 passphrase.
    pub password: Option<String>,
}

impl Default for WifiConfig {
    fn default() -> Self {
        WifiConfig {
            interface: "en1".to_string(),
            ssid: None,
            password: None,
        }
    }
}

/// Parameters of the `dd` write throughput test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteTestConfig {
    /// Scratch file written and removed by the test.
    pub path: PathBuf,
    /// `dd` block size argument.
    pub block_size: String,
    /// Number of blocks written.
    pub count: u32,
}

impl Default for WriteTestConfig {
    fn default() -> Self {
        WriteTestConfig {
            path: PathBuf::from("hwinfo-write-test.bin"),
            block_size: "2048k".to_string(),
            count: 1024,
        }
    }
}

/// Everything the system provider needs to know about the machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeConfig {
    /// Host pinged by the connectivity check.
    pub ping_host: String,
    pub wifi: WifiConfig,
    /// Script run by the OS install flow.
    pub install_script: PathBuf,
    /// Volume root searched for a legacy installer bundle.
    pub root_dir: PathBuf,
    /// Disk macOS is installed on.
    pub target_disk: String,
    /// Device a Fusion Drive is assigned to by default.
    pub fusion_disk: String,
    /// Volume name given to a freshly erased disk.
    pub volume_name: String,
    pub write_test: WriteTestConfig,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        ProbeConfig {
            ping_host: "www.google.com".to_string(),
            wifi: WifiConfig::default(),
            install_script: PathBuf::from("./install_os.sh"),
            root_dir: PathBuf::from("/"),
            target_disk: "/dev/disk0".to_string(),
            fusion_disk: "/dev/disk2".to_string(),
            volume_name: "Macintosh HD".to_string(),
            write_test: WriteTestConfig::default(),
        }
    }
}

// ============================================================================
// REPORT RECORDS
// ============================================================================

/// How a single probe ended, as reported by the one-shot commands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordStatus {
    Ok,
    PreconditionNotMet,
    Failed,
}

/// Outcome of one probe in a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeRecord {
    /// Machine-readable probe name (`cpu`, `ram`, ...).
    pub probe: String,
    /// Human label (`CPU`, `RAM`, ...).
    pub label: String,
    pub status: RecordStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fs_labels_match_diskutil_names() {
        assert_eq!(FsType::Apfs.label(), "APFS");
        assert_eq!(FsType::JhfsPlus.label(), "JHFS+");
        assert_eq!(FsType::Fusion.to_string(), "Fusion");
    }

    #[test]
    fn probe_display_names() {
        assert_eq!(Probe::WriteTest.to_string(), "write-test");
        assert_eq!(Probe::Format(FsType::Apfs).to_string(), "format(APFS)");
        assert_eq!(Probe::OsInstall.to_string(), "os-install");
    }

    #[test]
    fn summary_probes_are_read_only() {
        for probe in Probe::SUMMARY {
            assert!(!matches!(
                probe,
                Probe::Format(_) | Probe::OsInstall | Probe::Wifi | Probe::WriteTest
            ));
        }
    }

    #[test]
    fn default_config_targets_boot_disk() {
        let config = ProbeConfig::default();
        assert_eq!(config.target_disk, "/dev/disk0");
        assert_eq!(config.fusion_disk, "/dev/disk2");
        assert_eq!(config.root_dir, PathBuf::from("/"));
        assert!(config.wifi.ssid.is_none());
        assert_eq!(config.write_test.count, 1024);
    }
}
