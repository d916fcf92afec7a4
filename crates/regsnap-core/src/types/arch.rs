//! Target architecture identifier.

use core::fmt;
#[cfg(feature = "std")]
use core::str::FromStr;

#[cfg(feature = "std")]
use crate::error::SnapshotError;

/// CPU architecture with a register snapshot layout
///
/// There are exactly four variants and no "unknown" fallback: a snapshot for any
/// other architecture has no defined layout, so building for one is a
/// compile-time error rather than something to handle at runtime.
///
/// ## Example
///
/// Parsing names needs the `std` feature.
///
/// ```rust
/// use regsnap_core::types::Architecture;
///
/// let arch: Architecture = "aarch64".parse().unwrap();
/// assert_eq!(arch, Architecture::Arm64);
/// assert_eq!(arch.snapshot_size(), 272);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Architecture
{
    /// 32-bit ARM (A32/T32)
    Arm,
    /// 64-bit ARM (AArch64)
    Arm64,
    /// 32-bit x86 (IA-32)
    X86,
    /// 64-bit x86 (Intel/AMD)
    X86_64,
}

impl Architecture
{
    /// Every supported architecture, in declaration order.
    pub const ALL: [Architecture; 4] = [
        Architecture::Arm,
        Architecture::Arm64,
        Architecture::X86,
        Architecture::X86_64,
    ];

    /// Get the architecture this crate was compiled for
    ///
    /// This uses Rust's `#[cfg(target_arch = "...")]` to determine the architecture
    /// at compile time. It always matches the layout behind
    /// [`RegisterSnapshot`](crate::snapshot::RegisterSnapshot).
    #[must_use]
    pub const fn current() -> Self
    {
        #[cfg(target_arch = "arm")]
        {
            Architecture::Arm
        }

        #[cfg(target_arch = "aarch64")]
        {
            Architecture::Arm64
        }

        #[cfg(target_arch = "x86")]
        {
            Architecture::X86
        }

        #[cfg(target_arch = "x86_64")]
        {
            Architecture::X86_64
        }
    }

    /// Size of a general-purpose register (machine word) in bytes.
    #[must_use]
    pub const fn word_size(self) -> usize
    {
        match self {
            Architecture::Arm | Architecture::X86 => 4,
            Architecture::Arm64 | Architecture::X86_64 => 8,
        }
    }

    /// Golden byte size of this architecture's register snapshot.
    ///
    /// These values are the wire contract with the trap handler; the layout
    /// types assert against them at compile time.
    #[must_use]
    pub const fn snapshot_size(self) -> usize
    {
        match self {
            Architecture::Arm => 64,
            Architecture::Arm64 => 272,
            Architecture::X86 => 164,
            Architecture::X86_64 => 264,
        }
    }

    /// Canonical lowercase name, as printed by `Display`.
    #[must_use]
    pub const fn name(self) -> &'static str
    {
        match self {
            Architecture::Arm => "arm",
            Architecture::Arm64 => "arm64",
            Architecture::X86 => "x86",
            Architecture::X86_64 => "x86_64",
        }
    }
}

impl fmt::Display for Architecture
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.write_str(self.name())
    }
}

#[cfg(feature = "std")]
impl FromStr for Architecture
{
    type Err = SnapshotError;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        match s.to_lowercase().as_str() {
            "arm" | "arm32" | "armv7" | "aarch32" => Ok(Architecture::Arm),
            "arm64" | "aarch64" => Ok(Architecture::Arm64),
            "x86" | "i386" | "i686" | "ia32" => Ok(Architecture::X86),
            "x86_64" | "x86-64" | "amd64" | "x64" => Ok(Architecture::X86_64),
            _ => Err(SnapshotError::InvalidArgument(format!(
                "Unknown architecture: {s}. Use 'arm', 'arm64', 'x86', or 'x86_64'"
            ))),
        }
    }
}
