//! Tests for the part of the crate that builds without the `std` feature
//!
//! Everything used here is also available with `default-features = false`,
//! so this file runs in both configurations.

use regsnap_core::message::arm::{decode_branch, encode_branch, MARKER};
use regsnap_core::message::{check_injectable, payload_len, unsupported_byte, FRAME_PREFIX, MESSAGE_TAG};
use regsnap_core::snapshot::{fields_for, Arm64Snapshot, ArmSnapshot, FieldKind, X86Snapshot, X86_64Snapshot};
use regsnap_core::{debug_message, Architecture, RegisterSnapshot, SnapshotLayout, XmmRegister};

// Evaluated by the compiler, like the check inside `debug_message!`.
const _: () = check_injectable("%frame%: const context");
const STUB_PAYLOAD: usize = payload_len(FRAME_PREFIX.len() + 4);

#[test]
fn test_layout_sizes_without_codec()
{
    assert_eq!(ArmSnapshot::SIZE, 64);
    assert_eq!(Arm64Snapshot::SIZE, 272);
    assert_eq!(X86Snapshot::SIZE, 164);
    assert_eq!(X86_64Snapshot::SIZE, 264);
    assert_eq!(RegisterSnapshot::SIZE, Architecture::current().snapshot_size());
}

#[test]
fn test_field_tables_and_register_accessors()
{
    let sp = ArmSnapshot::field("r13").unwrap();
    assert_eq!((sp.name, sp.offset, sp.kind), ("sp", 60, FieldKind::General));
    assert_eq!(fields_for(Architecture::X86_64).len(), 25);

    let snapshot = Arm64Snapshot {
        nzcv: 0x6000_0000,
        sp: 0xffff_8000_0000_0ff0,
        ..Default::default()
    };
    assert_eq!(snapshot.flags(), 0x6000_0000);
    assert_eq!(snapshot.stack_pointer(), 0xffff_8000_0000_0ff0);
}

#[test]
fn test_xmm_register_without_codec()
{
    let xmm = XmmRegister::from_f64(1.5, -2.0);
    assert_eq!(xmm.low_f64(), 1.5);
    assert_eq!(xmm.high_f64(), -2.0);
}

#[test]
fn test_message_constants_and_branches()
{
    assert_eq!(MESSAGE_TAG, 0x6464);
    assert_eq!(MARKER, 0xE1A0_C00C);
    assert_eq!(STUB_PAYLOAD, 16);
    assert_eq!(decode_branch(encode_branch(4, 0x20), 4), Some(0x20));
    assert_eq!(unsupported_byte("fine"), None);
}

#[test]
fn test_macro_without_std()
{
    debug_message!("core only");
}
