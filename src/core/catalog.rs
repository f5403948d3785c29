//! Built-in collection catalog.
//!
//! Each probe belongs to a [`Group`] (used for progress output). Command
//! probes are gated on their binary: a bare program name is looked up in
//! [`SYSTEM_BIN_DIRS`], an absolute one must be executable as given. Probes
//! whose binary is absent are skipped. File and directory probes are all
//! optional since most hosts carry only some of them.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use regex::Regex;

use super::entry::{CommandEntry, DirectoryEntry, Entry, FileEntry};

/// Directories searched for bare program names.
pub const SYSTEM_BIN_DIRS: &[&str] = &[
    "/usr/local/sbin",
    "/usr/local/bin",
    "/usr/sbin",
    "/usr/bin",
    "/sbin",
    "/bin",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Group {
    Storage,
    Packages,
    Network,
    System,
    Cluster,
    Hardware,
    Custom,
}

impl Group {
    /// Progress banner shown before the group runs.
    pub fn banner(self) -> &'static str {
        match self {
            Group::Storage => "Getting storage details (LVM, partitions, multipathing)...",
            Group::Packages => "Getting package list and repositories...",
            Group::Network => "Getting network details and listening services...",
            Group::System => "Getting kernel, module and service details...",
            Group::Cluster => "Getting cluster status...",
            Group::Hardware => "Getting hardware and RAID controller details...",
            Group::Custom => "Getting custom files and commands...",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Probe {
    pub group: Group,
    pub entry: Entry,
}

impl Probe {
    /// Returns the entry ready to run, with the command's program resolved
    /// to an absolute path, or `None` if its binary is not installed.
    pub fn resolve(&self) -> Option<Entry> {
        match &self.entry {
            Entry::Command(command) => {
                let program = locate(&command.program)?;
                let mut command = command.clone();
                command.program = program;
                Some(Entry::Command(command))
            }
            other => Some(other.clone()),
        }
    }
}

/// Finds an executable `program`. Absolute paths are checked as given,
/// bare names are searched in [`SYSTEM_BIN_DIRS`].
pub fn locate(program: &Path) -> Option<PathBuf> {
    which::which_in(program, Some(SYSTEM_BIN_DIRS.join(":")), "/").ok()
}

fn command(group: Group, entry: CommandEntry) -> Probe {
    Probe {
        group,
        entry: Entry::Command(entry),
    }
}

fn file(group: Group, entry: FileEntry) -> Probe {
    Probe {
        group,
        entry: Entry::File(entry.optional()),
    }
}

fn directory(group: Group, entry: DirectoryEntry) -> Probe {
    Probe {
        group,
        entry: Entry::Directory(entry.optional()),
    }
}

fn lines(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).with_context(|| format!("Invalid catalog pattern: \"{}\"", pattern))
}

/// The full built-in catalog in collection order.
pub fn builtin_catalog() -> Result<Vec<Probe>> {
    use Group::*;

    Ok(vec![
        // Storage
        command(Storage, CommandEntry::new("lvs", "lvs", &["-o", "+devices"])),
        command(Storage, CommandEntry::new("vgs", "vgs", &[])),
        command(Storage, CommandEntry::new("pvs", "pvs", &[])),
        command(
            Storage,
            CommandEntry::new(
                "lsblk",
                "lsblk",
                &["-o", "NAME,MAJ:MIN,TYPE,SIZE,FSTYPE,MOUNTPOINT,UUID"],
            ),
        ),
        command(Storage, CommandEntry::new("blkid", "blkid", &[]).sorted().optional()),
        command(Storage, CommandEntry::new("fdisk", "fdisk", &["-l"]).optional()),
        command(Storage, CommandEntry::new("multipath", "multipath", &["-ll"]).optional()),
        command(
            Storage,
            CommandEntry::new("powermt", "powermt", &["display", "dev=all"]).optional(),
        ),
        command(Storage, CommandEntry::new("mount", "mount", &[]).sorted()),
        command(Storage, CommandEntry::new("df", "df", &["-P", "-h"])),
        file(Storage, FileEntry::new("/etc/fstab")),
        file(Storage, FileEntry::new("/etc/crypttab")),
        file(Storage, FileEntry::new("/etc/multipath.conf")),
        file(Storage, FileEntry::new("/proc/mdstat")),
        file(Storage, FileEntry::new("/proc/partitions")),
        // Packages
        command(
            Packages,
            CommandEntry::new(
                "rpm",
                "rpm",
                &["-qa", "--queryformat", "%{NAME}-%{VERSION}-%{RELEASE}.%{ARCH}\\n"],
            )
            .sorted(),
        ),
        command(Packages, CommandEntry::new("dpkg", "dpkg", &["-l"]).filtered(lines("^[a-z][a-z] ")?)),
        command(Packages, CommandEntry::new("yum_history", "yum", &["history"]).optional()),
        directory(Packages, DirectoryEntry::new("/etc/yum.repos.d")),
        file(Packages, FileEntry::new("/etc/apt/sources.list").named("apt_sources")),
        directory(Packages, DirectoryEntry::new("/etc/apt/sources.list.d")),
        // Network
        command(Network, CommandEntry::new("ip_addresses", "ip", &["address"])),
        command(Network, CommandEntry::new("ip_routes", "ip", &["route", "show", "table", "all"])),
        command(Network, CommandEntry::new("ip_rules", "ip", &["rule"])),
        command(Network, CommandEntry::new("ip_links", "ip", &["-d", "link"])),
        command(
            Network,
            CommandEntry::new("listening", "ss", &["-tuln"])
                .filtered(lines("LISTEN|UNCONN")?)
                .sorted(),
        ),
        command(
            Network,
            CommandEntry::new("iptables", "iptables-save", &[])
                .filtered(lines("^[^#]")?)
                .optional(),
        ),
        command(
            Network,
            CommandEntry::new("ip6tables", "ip6tables-save", &[])
                .filtered(lines("^[^#]")?)
                .optional(),
        ),
        file(Network, FileEntry::new("/etc/hosts")),
        file(Network, FileEntry::new("/etc/resolv.conf")),
        file(Network, FileEntry::new("/etc/nsswitch.conf")),
        file(Network, FileEntry::new("/etc/sysconfig/network").named("sysconfig_network")),
        directory(
            Network,
            DirectoryEntry::new("/etc/sysconfig/network-scripts")
                .matching(lines("^(ifcfg|route6?|rule6?)-")?),
        ),
        directory(Network, DirectoryEntry::new("/etc/netplan")),
        directory(Network, DirectoryEntry::new("/etc/network").matching(lines("^interfaces")?)),
        // System
        command(System, CommandEntry::new("uname", "uname", &["-a"])),
        file(System, FileEntry::new("/proc/cmdline")),
        command(System, CommandEntry::new("lsmod", "lsmod", &[]).sorted()),
        command(System, CommandEntry::new("sysctl", "sysctl", &["-a"]).sorted().optional()),
        command(System, CommandEntry::new("ps", "ps", &["auxww"])),
        command(System, CommandEntry::new("dmesg", "dmesg", &[]).optional()),
        command(
            System,
            CommandEntry::new(
                "systemctl_units",
                "systemctl",
                &["list-units", "--all", "--no-pager", "--plain", "--no-legend"],
            )
            .sorted()
            .optional(),
        ),
        command(
            System,
            CommandEntry::new(
                "systemctl_unit_files",
                "systemctl",
                &["list-unit-files", "--no-pager", "--no-legend"],
            )
            .sorted()
            .optional(),
        ),
        command(System, CommandEntry::new("chkconfig", "chkconfig", &["--list"]).optional()),
        command(
            System,
            CommandEntry::new("cpuinfo", "cat", &["/proc/cpuinfo"])
                .filtered(lines("^(processor|vendor_id|model name|cpu cores|flags)\\s*:")?),
        ),
        command(
            System,
            CommandEntry::new("meminfo", "cat", &["/proc/meminfo"])
                .filtered(lines("^(MemTotal|SwapTotal|HugePages_Total|Hugepagesize):")?),
        ),
        command(System, CommandEntry::new("getenforce", "getenforce", &[]).optional()),
        file(System, FileEntry::new("/etc/ssh/sshd_config")),
        directory(System, DirectoryEntry::new("/etc/cron.d")),
        // Cluster
        command(Cluster, CommandEntry::new("pcs_status", "pcs", &["status"]).optional()),
        command(Cluster, CommandEntry::new("crm_mon", "crm_mon", &["-1"]).optional()),
        command(Cluster, CommandEntry::new("clustat", "clustat", &[]).optional()),
        // Hardware
        command(
            Hardware,
            CommandEntry::new("dmidecode", "dmidecode", &["-t", "bios", "-t", "system"]).optional(),
        ),
        command(
            Hardware,
            CommandEntry::new(
                "hpacucli",
                "/opt/hp/hpssacli/bin/hpssacli",
                &["controller", "all", "show", "config", "detail"],
            )
            .optional(),
        ),
        command(
            Hardware,
            CommandEntry::new(
                "ssacli",
                "ssacli",
                &["controller", "all", "show", "config", "detail"],
            )
            .optional(),
        ),
        command(
            Hardware,
            CommandEntry::new(
                "omreport_vdisk",
                "/opt/dell/srvadmin/bin/omreport",
                &["storage", "vdisk"],
            )
            .optional(),
        ),
        command(
            Hardware,
            CommandEntry::new(
                "omreport_pdisk",
                "/opt/dell/srvadmin/bin/omreport",
                &["storage", "pdisk", "controller=0"],
            )
            .optional(),
        ),
    ])
}

/// Wraps operator-supplied entries as probes of the custom group.
pub fn custom_probes(entries: Vec<Entry>) -> Vec<Probe> {
    entries
        .into_iter()
        .map(|entry| Probe {
            group: Group::Custom,
            entry,
        })
        .collect()
}
