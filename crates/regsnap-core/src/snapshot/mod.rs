//! # Register Snapshots
//!
//! Fixed-layout register files captured when a trap, breakpoint, or signal is
//! taken.
//!
//! Each supported architecture has one `#[repr(C, packed(4))]` type whose field
//! order, sizes, and alignment mirror the context the trap handler pushes or
//! copies. The layout is a wire contract: reordering a field is a breaking
//! change for every handler and every crash-dump reader.
//!
//! | Architecture | Type | Size |
//! |--------------|------|------|
//! | 32-bit ARM | [`ArmSnapshot`] | 64 |
//! | 64-bit ARM | [`Arm64Snapshot`] | 272 |
//! | x86 | [`X86Snapshot`] | 164 |
//! | x86-64 | [`X86_64Snapshot`] | 264 |
//!
//! [`RegisterSnapshot`] names the one layout that matches the build target.
//! All four types are always compiled so a host can decode dumps taken on any
//! of them; use [`AnySnapshot`] when the architecture is only known at runtime.
//!
//! ## Aliased registers
//!
//! Registers with two names (`r13`/`sp`, `x29`/`fp`, ...) are stored once, under
//! the symbolic name, and the numbered name is an accessor pair on the type.
//! [`SnapshotLayout::field`] resolves either spelling.
//!
//! ## Reading fields
//!
//! The structs are packed, so a reference to a 64-bit field may be unaligned and
//! the compiler refuses to create one. Copy the field out instead:
//!
//! ```rust
//! use regsnap_core::snapshot::X86_64Snapshot;
//!
//! let snapshot = X86_64Snapshot { rax: 42, ..Default::default() };
//! let rax = snapshot.rax; // copy, fine
//! assert_eq!(rax, 42);
//! assert_eq!({ snapshot.rax }, 42); // braces copy too
//! ```

use core::fmt;

#[cfg(feature = "std")]
use tracing::debug;

#[cfg(feature = "std")]
use crate::error::{SnapshotError, SnapshotResult};
use crate::types::Architecture;

/// Implements [`SnapshotLayout`] for a layout struct from its field list.
///
/// The list must repeat the struct's fields in declaration order; the
/// `FIELDS` offsets come from `offset_of!` and the codec walks the list in
/// order, so tests comparing the two catch any drift. The codec half is only
/// generated with the `std` feature.
macro_rules! snapshot_layout {
    (
        $ty:ident, $arch:expr, sp = $sp:ident, flags = $flags:ident;
        $( $field:ident : $fty:ty => $kind:ident $([$($alias:literal),+])? ),+ $(,)?
    ) => {
        impl $crate::snapshot::SnapshotLayout for $ty
        {
            const ARCH: $crate::types::Architecture = $arch;
            const FIELDS: &'static [$crate::snapshot::RegisterField] = &[
                $(
                    $crate::snapshot::RegisterField {
                        name: stringify!($field),
                        aliases: &[$($($alias),+)?],
                        offset: ::core::mem::offset_of!($ty, $field),
                        size: ::core::mem::size_of::<$fty>(),
                        kind: $crate::snapshot::FieldKind::$kind,
                    },
                )+
            ];

            #[cfg(feature = "std")]
            fn decode(reader: &mut $crate::snapshot::codec::ByteReader<'_>) -> Self
            {
                Self {
                    $( $field: <$fty as $crate::snapshot::codec::WireValue>::read_from(reader), )+
                }
            }

            #[cfg(feature = "std")]
            fn encode(&self, writer: &mut $crate::snapshot::codec::ByteWriter)
            {
                $( $crate::snapshot::codec::WireValue::write_to(self.$field, writer); )+
            }

            fn stack_pointer(&self) -> u64
            {
                u64::from(self.$sp)
            }

            fn flags(&self) -> u64
            {
                u64::from(self.$flags)
            }
        }
    };
}

pub mod arm;
pub mod arm64;
#[cfg(feature = "std")]
pub mod codec;
pub mod x86;
pub mod x86_64;
pub mod xmm;

pub use arm::ArmSnapshot;
pub use arm64::Arm64Snapshot;
#[cfg(feature = "std")]
use codec::{ByteReader, ByteWriter, WireValue};
pub use x86::X86Snapshot;
pub use x86_64::X86_64Snapshot;
pub use xmm::XmmRegister;

/// The register snapshot layout for the architecture being compiled for.
#[cfg(target_arch = "arm")]
pub type RegisterSnapshot = ArmSnapshot;

/// The register snapshot layout for the architecture being compiled for.
#[cfg(target_arch = "aarch64")]
pub type RegisterSnapshot = Arm64Snapshot;

/// The register snapshot layout for the architecture being compiled for.
#[cfg(target_arch = "x86")]
pub type RegisterSnapshot = X86Snapshot;

/// The register snapshot layout for the architecture being compiled for.
#[cfg(target_arch = "x86_64")]
pub type RegisterSnapshot = X86_64Snapshot;

#[cfg(not(any(
    target_arch = "arm",
    target_arch = "aarch64",
    target_arch = "x86",
    target_arch = "x86_64"
)))]
compile_error!("regsnap-core defines register snapshots for arm, aarch64, x86 and x86_64 only");

/// What a snapshot field holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind
{
    /// Status / condition flags register (CPSR, NZCV, EFLAGS, RFLAGS)
    Flags,
    /// General-purpose, stack, frame, or link register
    General,
    /// 128-bit XMM register
    Vector,
    /// Slot kept only to preserve alignment
    Padding,
}

impl fmt::Display for FieldKind
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        let name = match self {
            FieldKind::Flags => "flags",
            FieldKind::General => "general",
            FieldKind::Vector => "vector",
            FieldKind::Padding => "padding",
        };
        f.write_str(name)
    }
}

/// Static description of one snapshot field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterField
{
    /// Canonical name (the struct field name)
    pub name: &'static str,
    /// Other names for the same storage, e.g. `r13` for `sp`
    pub aliases: &'static [&'static str],
    /// Byte offset from the start of the snapshot
    pub offset: usize,
    /// Size in bytes
    pub size: usize,
    /// What the field holds
    pub kind: FieldKind,
}

impl RegisterField
{
    /// `true` if `name` is the canonical name or an alias (ASCII case-insensitive).
    #[must_use]
    pub fn matches(&self, name: &str) -> bool
    {
        self.name.eq_ignore_ascii_case(name) || self.aliases.iter().any(|alias| alias.eq_ignore_ascii_case(name))
    }

    /// Read this field out of a little-endian snapshot image.
    ///
    /// Returns `None` if the image is too short to contain the field.
    #[cfg(feature = "std")]
    #[must_use]
    pub fn read(&self, image: &[u8]) -> Option<RegisterValue>
    {
        let bytes = image.get(self.offset..self.offset + self.size)?;
        let mut reader = ByteReader::new(bytes);
        match self.size {
            4 => Some(RegisterValue::Word32(u32::read_from(&mut reader))),
            8 => Some(RegisterValue::Word64(u64::read_from(&mut reader))),
            16 => Some(RegisterValue::Vector(XmmRegister::read_from(&mut reader))),
            _ => None,
        }
    }
}

/// Value of a single snapshot field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterValue
{
    /// 32-bit machine word
    Word32(u32),
    /// 64-bit machine word
    Word64(u64),
    /// 128-bit vector register
    Vector(XmmRegister),
}

impl RegisterValue
{
    /// The value as a 64-bit integer, if it fits in one.
    #[must_use]
    pub const fn as_u64(self) -> Option<u64>
    {
        match self {
            RegisterValue::Word32(value) => Some(value as u64),
            RegisterValue::Word64(value) => Some(value),
            RegisterValue::Vector(_) => None,
        }
    }
}

impl fmt::Display for RegisterValue
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        match self {
            RegisterValue::Word32(value) => write!(f, "{value:#010x}"),
            RegisterValue::Word64(value) => write!(f, "{value:#018x}"),
            RegisterValue::Vector(value) => write!(f, "{value}"),
        }
    }
}

/// Common behaviour of the per-architecture snapshot layouts
///
/// Beyond field access, a snapshot can be moved in and out of a raw
/// little-endian dump (what a crash-dump reader sees) and inspected through its
/// static field table.
///
/// No method validates register contents: any bit pattern came from hardware
/// or the OS and is accepted as is.
pub trait SnapshotLayout: Copy + Default + fmt::Debug
{
    /// Architecture this layout belongs to.
    const ARCH: Architecture;

    /// Every field, in declaration (and therefore memory) order.
    const FIELDS: &'static [RegisterField];

    /// Size of the layout in bytes.
    const SIZE: usize = core::mem::size_of::<Self>();

    #[doc(hidden)]
    #[cfg(feature = "std")]
    fn decode(reader: &mut ByteReader<'_>) -> Self;

    #[doc(hidden)]
    #[cfg(feature = "std")]
    fn encode(&self, writer: &mut ByteWriter);

    /// Current stack pointer, widened to 64 bits.
    fn stack_pointer(&self) -> u64;

    /// Status / flags register, widened to 64 bits.
    fn flags(&self) -> u64;

    /// Decode a snapshot from the start of a raw dump.
    ///
    /// Bytes past [`SIZE`](Self::SIZE) are ignored.
    ///
    /// ## Errors
    ///
    /// [`SnapshotError::Truncated`] if `bytes` is shorter than the layout.
    #[cfg(feature = "std")]
    fn from_bytes(bytes: &[u8]) -> SnapshotResult<Self>
    {
        if bytes.len() < Self::SIZE {
            return Err(SnapshotError::Truncated {
                arch: Self::ARCH,
                expected: Self::SIZE,
                actual: bytes.len(),
            });
        }

        let mut reader = ByteReader::new(&bytes[..Self::SIZE]);
        let snapshot = Self::decode(&mut reader);
        debug_assert_eq!(reader.position(), Self::SIZE);
        debug!(arch = %Self::ARCH, size = Self::SIZE, "decoded register snapshot");
        Ok(snapshot)
    }

    /// Encode the snapshot as an exact `SIZE`-byte little-endian image.
    #[cfg(feature = "std")]
    fn to_bytes(&self) -> Vec<u8>
    {
        let mut writer = ByteWriter::with_capacity(Self::SIZE);
        self.encode(&mut writer);
        writer.into_inner()
    }

    /// Look up a field by canonical name or alias.
    fn field(name: &str) -> Option<&'static RegisterField>
    {
        Self::FIELDS.iter().find(|field| field.matches(name))
    }

    /// Read a field by canonical name or alias.
    #[cfg(feature = "std")]
    fn get(&self, name: &str) -> Option<RegisterValue>
    {
        Self::field(name)?.read(&self.to_bytes())
    }

    /// Every field with its current value, in memory order.
    #[cfg(feature = "std")]
    fn values(&self) -> Vec<(&'static RegisterField, RegisterValue)>
    {
        let image = self.to_bytes();
        Self::FIELDS
            .iter()
            .filter_map(|field| field.read(&image).map(|value| (field, value)))
            .collect()
    }
}

/// Field table for an architecture chosen at runtime.
#[must_use]
pub const fn fields_for(arch: Architecture) -> &'static [RegisterField]
{
    match arch {
        Architecture::Arm => ArmSnapshot::FIELDS,
        Architecture::Arm64 => Arm64Snapshot::FIELDS,
        Architecture::X86 => X86Snapshot::FIELDS,
        Architecture::X86_64 => X86_64Snapshot::FIELDS,
    }
}

/// A snapshot of any supported architecture
///
/// The static [`RegisterSnapshot`] alias is what trap handlers use. This enum is
/// for tools that read dumps taken on some other machine and only learn the
/// architecture at runtime.
#[cfg(feature = "std")]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnySnapshot
{
    /// 32-bit ARM snapshot
    Arm(ArmSnapshot),
    /// 64-bit ARM snapshot
    Arm64(Arm64Snapshot),
    /// x86 snapshot
    X86(X86Snapshot),
    /// x86-64 snapshot
    X86_64(X86_64Snapshot),
}

#[cfg(feature = "std")]
impl AnySnapshot
{
    /// Decode a raw dump using the layout of `arch`.
    ///
    /// ## Errors
    ///
    /// [`SnapshotError::Truncated`] if `bytes` is shorter than that layout.
    pub fn decode(arch: Architecture, bytes: &[u8]) -> SnapshotResult<Self>
    {
        Ok(match arch {
            Architecture::Arm => AnySnapshot::Arm(ArmSnapshot::from_bytes(bytes)?),
            Architecture::Arm64 => AnySnapshot::Arm64(Arm64Snapshot::from_bytes(bytes)?),
            Architecture::X86 => AnySnapshot::X86(X86Snapshot::from_bytes(bytes)?),
            Architecture::X86_64 => AnySnapshot::X86_64(X86_64Snapshot::from_bytes(bytes)?),
        })
    }

    /// Architecture of the contained layout.
    #[must_use]
    pub const fn architecture(&self) -> Architecture
    {
        match self {
            AnySnapshot::Arm(_) => Architecture::Arm,
            AnySnapshot::Arm64(_) => Architecture::Arm64,
            AnySnapshot::X86(_) => Architecture::X86,
            AnySnapshot::X86_64(_) => Architecture::X86_64,
        }
    }

    /// Field table of the contained layout.
    #[must_use]
    pub const fn fields(&self) -> &'static [RegisterField]
    {
        fields_for(self.architecture())
    }

    /// Encode back into a raw dump.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8>
    {
        match self {
            AnySnapshot::Arm(snapshot) => snapshot.to_bytes(),
            AnySnapshot::Arm64(snapshot) => snapshot.to_bytes(),
            AnySnapshot::X86(snapshot) => snapshot.to_bytes(),
            AnySnapshot::X86_64(snapshot) => snapshot.to_bytes(),
        }
    }

    /// Read a field by canonical name or alias.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<RegisterValue>
    {
        match self {
            AnySnapshot::Arm(snapshot) => snapshot.get(name),
            AnySnapshot::Arm64(snapshot) => snapshot.get(name),
            AnySnapshot::X86(snapshot) => snapshot.get(name),
            AnySnapshot::X86_64(snapshot) => snapshot.get(name),
        }
    }

    /// Every field with its current value, in memory order.
    #[must_use]
    pub fn values(&self) -> Vec<(&'static RegisterField, RegisterValue)>
    {
        match self {
            AnySnapshot::Arm(snapshot) => snapshot.values(),
            AnySnapshot::Arm64(snapshot) => snapshot.values(),
            AnySnapshot::X86(snapshot) => snapshot.values(),
            AnySnapshot::X86_64(snapshot) => snapshot.values(),
        }
    }

    /// Current stack pointer, widened to 64 bits.
    #[must_use]
    pub fn stack_pointer(&self) -> u64
    {
        match self {
            AnySnapshot::Arm(snapshot) => snapshot.stack_pointer(),
            AnySnapshot::Arm64(snapshot) => snapshot.stack_pointer(),
            AnySnapshot::X86(snapshot) => snapshot.stack_pointer(),
            AnySnapshot::X86_64(snapshot) => snapshot.stack_pointer(),
        }
    }

    /// Status / flags register, widened to 64 bits.
    #[must_use]
    pub fn flags(&self) -> u64
    {
        match self {
            AnySnapshot::Arm(snapshot) => snapshot.flags(),
            AnySnapshot::Arm64(snapshot) => snapshot.flags(),
            AnySnapshot::X86(snapshot) => snapshot.flags(),
            AnySnapshot::X86_64(snapshot) => snapshot.flags(),
        }
    }
}
