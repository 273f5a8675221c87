//! Target platforms of the native libraries and their file naming conventions.

use serde_derive::{Deserialize, Serialize};

/// CPU architecture, as reported by `target_arch`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub enum Arch {
    X86,
    X86_64,
    Arm,
    AArch64,
    Other,
}

/// Operating system, as reported by `target_os`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub enum OS {
    Windows,
    MacOS,
    Linux,
    Other,
}

/// Operating systems the generated library resolver knows about.
pub const SUPPORTED_OSES: &[OS] = &[OS::Windows, OS::Linux, OS::MacOS];

/// Architectures the generated library resolver knows about.
pub const SUPPORTED_ARCHES: &[Arch] = &[Arch::X86, Arch::X86_64, Arch::Arm, Arch::AArch64];

/// Combined information about a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct Target {
    pub arch: Arch,
    pub os: OS,
}

impl Target {
    pub fn short_text(&self) -> String {
        format!("{:?}-{:?}", self.arch, self.os).to_lowercase()
    }

    /// .NET runtime identifier of the target, e.g. `linux-x64` or `osx-arm64`.
    pub fn runtime_identifier(&self) -> Option<String> {
        Some(format!(
            "{}-{}",
            self.os.runtime_name()?,
            self.arch.runtime_name()?
        ))
    }
}

impl Arch {
    /// Architecture part of a .NET runtime identifier.
    pub fn runtime_name(self) -> Option<&'static str> {
        match self {
            Arch::X86 => Some("x86"),
            Arch::X86_64 => Some("x64"),
            Arch::Arm => Some("arm"),
            Arch::AArch64 => Some("arm64"),
            Arch::Other => None,
        }
    }

    /// Member of `System.Runtime.InteropServices.Architecture`.
    pub fn dotnet_name(self) -> Option<&'static str> {
        match self {
            Arch::X86 => Some("X86"),
            Arch::X86_64 => Some("X64"),
            Arch::Arm => Some("Arm"),
            Arch::AArch64 => Some("Arm64"),
            Arch::Other => None,
        }
    }
}

impl OS {
    /// Operating system part of a .NET runtime identifier.
    pub fn runtime_name(self) -> Option<&'static str> {
        match self {
            OS::Windows => Some("win"),
            OS::MacOS => Some("osx"),
            OS::Linux => Some("linux"),
            OS::Other => None,
        }
    }

    /// Name of the check in `System.OperatingSystem` that detects this OS.
    pub fn dotnet_check(self) -> Option<&'static str> {
        match self {
            OS::Windows => Some("OperatingSystem.IsWindows()"),
            OS::MacOS => Some("OperatingSystem.IsMacOS()"),
            OS::Linux => Some("OperatingSystem.IsLinux()"),
            OS::Other => None,
        }
    }

    /// File name of shared library `name` on this OS.
    pub fn shared_library_file_name(self, name: &str) -> String {
        match self {
            OS::Windows => format!("{}.dll", name),
            OS::MacOS => format!("lib{}.dylib", name),
            OS::Linux | OS::Other => format!("lib{}.so", name),
        }
    }
}

/// Returns current CPU architecture
pub fn current_arch() -> Arch {
    if cfg!(target_arch = "x86") {
        Arch::X86
    } else if cfg!(target_arch = "x86_64") {
        Arch::X86_64
    } else if cfg!(target_arch = "arm") {
        Arch::Arm
    } else if cfg!(target_arch = "aarch64") {
        Arch::AArch64
    } else {
        Arch::Other
    }
}

/// Returns current operating system
pub fn current_os() -> OS {
    if cfg!(target_os = "windows") {
        OS::Windows
    } else if cfg!(target_os = "macos") {
        OS::MacOS
    } else if cfg!(target_os = "linux") {
        OS::Linux
    } else {
        OS::Other
    }
}

/// Returns properties of the current target
pub fn current_target() -> Target {
    Target {
        arch: current_arch(),
        os: current_os(),
    }
}
