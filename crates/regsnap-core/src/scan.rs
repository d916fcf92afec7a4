//! # Message Scanning
//!
//! Finds injected debug messages in compiled code, the way the emulator's debug
//! console does when it steps over one.
//!
//! [`scan_bytes`] works on a raw image; [`scan_object`] parses an object file
//! with `object`, scans its executable sections at their load addresses, and
//! names the function each message sits in. [`function_bytes`] pulls a
//! function's code out of an object file, e.g. to relocate it next to a patch.

use object::{Object, ObjectSection, ObjectSymbol, SectionIndex, SectionKind, SymbolKind};
use rustc_demangle::try_demangle;
use tracing::{debug, trace, warn};

use crate::error::{SnapshotError, SnapshotResult};
use crate::message::arm::{decode_stub, PREFIX_LEN};
use crate::message::DebugMessage;

/// A debug message found in an image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoundMessage
{
    /// Address of the `mov r12, r12` marker
    pub address: u64,
    /// Stub length in bytes, marker to branch target
    pub len: usize,
    /// The embedded message
    pub message: DebugMessage,
    /// Enclosing function, demangled, when symbols are available
    pub symbol: Option<String>,
}

/// Scan a raw image whose first byte is loaded at `base_address`.
///
/// Only 4-byte aligned offsets are considered, matching where A32 instructions
/// can start. After a hit the scan resumes at the stub's branch target.
/// Addresses wrap at the top of the 64-bit address space.
#[must_use]
pub fn scan_bytes(bytes: &[u8], base_address: u64) -> Vec<FoundMessage>
{
    let mut found = Vec::new();
    let mut offset = 0;

    while offset + PREFIX_LEN <= bytes.len() {
        match decode_stub(&bytes[offset..]) {
            Some(stub) => {
                let address = base_address.wrapping_add(offset as u64);
                trace!(address, text = %stub.message, "found debug message");
                found.push(FoundMessage {
                    address,
                    len: stub.len,
                    message: stub.message,
                    symbol: None,
                });
                offset += stub.len;
            }
            None => offset += 4,
        }
    }

    found
}

struct FunctionSymbol
{
    section: Option<SectionIndex>,
    start: u64,
    size: u64,
    name: String,
}

fn demangle_name(raw: &str) -> String
{
    try_demangle(raw).map_or_else(|_| raw.to_string(), |demangled| format!("{demangled:#}"))
}

// ARM symbol values carry the Thumb bit; the code itself starts one byte lower.
fn code_address_mask(file: &object::File<'_>) -> u64
{
    if file.architecture() == object::Architecture::Arm {
        !1
    } else {
        !0
    }
}

fn function_symbols(file: &object::File<'_>) -> Vec<FunctionSymbol>
{
    let thumb_mask = code_address_mask(file);

    file.symbols()
        .filter(|symbol| symbol.kind() == SymbolKind::Text)
        .filter_map(|symbol| {
            let name = symbol.name().ok()?;
            Some(FunctionSymbol {
                section: symbol.section_index(),
                start: symbol.address() & thumb_mask,
                size: symbol.size(),
                name: demangle_name(name),
            })
        })
        .collect()
}

/// Sections of a relocatable object all start at address 0, so the symbol must
/// also belong to `section`.
fn enclosing_symbol(symbols: &[FunctionSymbol], section: SectionIndex, address: u64) -> Option<String>
{
    symbols
        .iter()
        .filter(|symbol| symbol.section == Some(section))
        .find(|symbol| {
            if symbol.size == 0 {
                symbol.start == address
            } else {
                (symbol.start..symbol.start.saturating_add(symbol.size)).contains(&address)
            }
        })
        .map(|symbol| symbol.name.clone())
}

/// Scan every executable section of an object file (ELF, Mach-O, PE, ...).
///
/// Sections whose data cannot be read are skipped with a warning. Messages are
/// returned in section order, then address order.
///
/// ## Errors
///
/// [`SnapshotError::Object`](crate::error::SnapshotError::Object) if `data` is not
/// a recognised object file.
pub fn scan_object(data: &[u8]) -> SnapshotResult<Vec<FoundMessage>>
{
    let file = object::File::parse(data)?;
    let symbols = function_symbols(&file);
    debug!(
        architecture = ?file.architecture(),
        symbols = symbols.len(),
        "scanning object file for debug messages"
    );

    let mut found = Vec::new();
    for section in file.sections().filter(|section| section.kind() == SectionKind::Text) {
        let name = section.name().unwrap_or("<unnamed>");
        let bytes = match section.data() {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!(section = name, error = %err, "skipping unreadable section");
                continue;
            }
        };

        let mut hits = scan_bytes(bytes, section.address());
        debug!(section = name, messages = hits.len(), "scanned section");
        for hit in &mut hits {
            hit.symbol = enclosing_symbol(&symbols, section.index(), hit.address);
        }
        found.extend(hits);
    }

    Ok(found)
}

/// Code bytes of the function named `name` in an object file.
///
/// `name` matches either the raw symbol name or its demangled form. The bytes
/// are read from the symbol's own section, `size` bytes from its start (Thumb
/// bit cleared on ARM).
///
/// ## Errors
///
/// - [`SnapshotError::Object`] if `data` is not a recognised object file or the
///   section cannot be read
/// - [`SnapshotError::InvalidArgument`] if no function symbol has that name, or
///   its range lies outside its section
pub fn function_bytes(data: &[u8], name: &str) -> SnapshotResult<Vec<u8>>
{
    let file = object::File::parse(data)?;
    let mask = code_address_mask(&file);

    let symbol = file
        .symbols()
        .filter(|symbol| symbol.kind() == SymbolKind::Text)
        .find(|symbol| symbol.name().is_ok_and(|raw| raw == name || demangle_name(raw) == name))
        .ok_or_else(|| SnapshotError::InvalidArgument(format!("no function symbol named {name}")))?;

    let section_index = symbol
        .section_index()
        .ok_or_else(|| SnapshotError::InvalidArgument(format!("function {name} is not defined in a section")))?;
    let section = file.section_by_index(section_index)?;

    let start = (symbol.address() & mask).wrapping_sub(section.address());
    let bytes = section.data_range(start, symbol.size())?.ok_or_else(|| {
        SnapshotError::InvalidArgument(format!(
            "function {name} ({} bytes at {:#x}) lies outside its section",
            symbol.size(),
            symbol.address() & mask
        ))
    })?;

    debug!(function = name, len = bytes.len(), "read function bytes");
    Ok(bytes.to_vec())
}
