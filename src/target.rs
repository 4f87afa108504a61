//! Target selection for the kiln ahead-of-time compiler core.
//!
//! A [`Target`] fixes every ABI-relevant parameter the type-and-layout
//! subsystem depends on: pointer width, architecture family, and the
//! 32-bit ARM long-alignment rule.

use std::env;
use std::fmt;

/// Supported architecture families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetArch {
    X86,
    X86_64,
    Arm,
    Aarch64,
}

impl TargetArch {
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "i386" | "i486" | "i586" | "i686" | "x86" => Some(TargetArch::X86),
            "x86_64" | "amd64" => Some(TargetArch::X86_64),
            "arm" | "armv7" | "thumbv7" => Some(TargetArch::Arm),
            "aarch64" | "arm64" => Some(TargetArch::Aarch64),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            TargetArch::X86 => "i386",
            TargetArch::X86_64 => "x86_64",
            TargetArch::Arm => "arm",
            TargetArch::Aarch64 => "arm64",
        }
    }

    /// Bytes in a machine pointer on this architecture.
    #[must_use]
    pub fn pointer_bytes(self) -> u64 {
        match self {
            TargetArch::X86 | TargetArch::Arm => 4,
            TargetArch::X86_64 | TargetArch::Aarch64 => 8,
        }
    }

    #[must_use]
    pub fn is_32bit(self) -> bool {
        self.pointer_bytes() == 4
    }

    /// True for both 32- and 64-bit members of the ARM family.
    #[must_use]
    pub fn is_arm(self) -> bool {
        matches!(self, TargetArch::Arm | TargetArch::Aarch64)
    }
}

impl fmt::Display for TargetArch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Supported operating systems.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TargetOs {
    Linux,
    Macos,
    Ios,
    Windows,
    Other(String),
}

impl TargetOs {
    pub fn parse(token: &str) -> Self {
        match token {
            "linux" => TargetOs::Linux,
            "darwin" | "macos" | "macosx" => TargetOs::Macos,
            "ios" => TargetOs::Ios,
            "windows" | "win" => TargetOs::Windows,
            other => TargetOs::Other(other.to_string()),
        }
    }

    fn triple_component(&self) -> &str {
        match self {
            TargetOs::Linux => "linux",
            TargetOs::Macos => "macos",
            TargetOs::Ios => "ios",
            TargetOs::Windows => "windows",
            TargetOs::Other(value) => value.as_str(),
        }
    }
}

/// Target triple description.
///
/// Constructed once per compilation; every layout and signature query is a
/// pure function of the input type and this value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Target {
    arch: TargetArch,
    os: TargetOs,
    triple: String,
}

impl Target {
    /// Construct the target representing the current host.
    #[must_use]
    pub fn host() -> Self {
        let arch = TargetArch::parse(env::consts::ARCH).unwrap_or(TargetArch::X86_64);
        let os = TargetOs::parse(env::consts::OS);
        Self::from_components(arch, os)
    }

    /// Parse a target triple such as `x86_64-unknown-linux` or
    /// `arm-apple-ios`.
    ///
    /// # Errors
    ///
    /// Returns [`TargetError::Empty`] when the input is blank and
    /// [`TargetError::UnsupportedArch`] when the architecture prefix is not
    /// recognised.
    pub fn parse(spec: &str) -> Result<Self, TargetError> {
        let trimmed = spec.trim().to_ascii_lowercase();
        if trimmed.is_empty() {
            return Err(TargetError::Empty);
        }

        let mut parts = trimmed.splitn(2, '-');
        let arch_token = parts.next().unwrap_or_default();
        let arch = TargetArch::parse(arch_token)
            .ok_or_else(|| TargetError::UnsupportedArch(arch_token.to_string()))?;

        if let Some(rest) = parts.next() {
            let mut rest_iter = rest.split('-');
            let vendor = rest_iter.next().unwrap_or_default();
            let os_token = rest_iter.next().unwrap_or("unknown");
            let os = TargetOs::parse(os_token);
            let triple = format!("{arch_token}-{vendor}-{os_token}");
            Ok(Self { arch, os, triple })
        } else {
            Ok(Self::from_components(
                arch,
                TargetOs::Other("unknown".to_string()),
            ))
        }
    }

    /// Construct a target from explicit components.
    #[must_use]
    pub fn from_components(arch: TargetArch, os: TargetOs) -> Self {
        let vendor = match os {
            TargetOs::Macos | TargetOs::Ios => "apple",
            TargetOs::Windows => "pc",
            TargetOs::Linux | TargetOs::Other(_) => "unknown",
        };
        let triple = format!("{}-{}-{}", arch.as_str(), vendor, os.triple_component());
        Self { arch, os, triple }
    }

    #[must_use]
    pub fn arch(&self) -> TargetArch {
        self.arch
    }

    #[must_use]
    pub fn os(&self) -> &TargetOs {
        &self.os
    }

    /// Return the canonical triple for this target.
    #[must_use]
    pub fn triple(&self) -> &str {
        &self.triple
    }

    #[must_use]
    pub fn pointer_bytes(&self) -> u64 {
        self.arch.pointer_bytes()
    }

    #[must_use]
    pub fn is_32bit(&self) -> bool {
        self.arch.is_32bit()
    }

    #[must_use]
    pub fn is_arm(&self) -> bool {
        self.arch.is_arm()
    }

    /// True when `long` fields must be forced to 8-byte alignment
    /// regardless of the generic 32-bit rule. Unsafe-memory intrinsics on
    /// 32-bit ARM require 8-byte aligned longs even for non-volatile fields.
    #[must_use]
    pub fn requires_wide_long_alignment(&self) -> bool {
        self.is_32bit() && self.is_arm()
    }
}

impl Default for Target {
    fn default() -> Self {
        Self::host()
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.triple)
    }
}

/// Errors encountered while parsing a target specification.
#[derive(Debug, Clone)]
pub enum TargetError {
    Empty,
    UnsupportedArch(String),
}

impl fmt::Display for TargetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetError::Empty => write!(f, "target string must not be empty"),
            TargetError::UnsupportedArch(arch) => {
                write!(
                    f,
                    "unsupported architecture '{arch}'; expected one of i386, x86_64, arm, arm64"
                )
            }
        }
    }
}

impl std::error::Error for TargetError {}
