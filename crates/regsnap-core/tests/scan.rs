//! Tests for finding debug messages in images

use regsnap_core::message::arm::{encode_stub, MARKER};
use regsnap_core::patch::{find_empty_space, write_stub};
use regsnap_core::scan::{function_bytes, scan_bytes, scan_object};

/// `mov r0, r0`, a plain A32 no-op
const NOP: [u8; 4] = [0x00, 0x00, 0xA0, 0xE1];

fn code_with_stubs(texts: &[&str]) -> (Vec<u8>, Vec<usize>)
{
    let mut image = Vec::new();
    let mut offsets = Vec::new();
    for text in texts {
        image.extend_from_slice(&NOP);
        offsets.push(image.len());
        image.extend_from_slice(&encode_stub(text).unwrap());
    }
    image.extend_from_slice(&NOP);
    (image, offsets)
}

fn push_name(table: &mut Vec<u8>, name: &str) -> u32
{
    let offset = table.len() as u32;
    table.extend_from_slice(name.as_bytes());
    table.push(0);
    offset
}

/// Append `data` word-aligned after a 52-byte ELF header; returns its file offset.
fn place(body: &mut Vec<u8>, data: &[u8]) -> u32
{
    body.resize(body.len().next_multiple_of(4), 0);
    let offset = (52 + body.len()) as u32;
    body.extend_from_slice(data);
    offset
}

/// Little-endian ELF32 ARM relocatable object.
///
/// Each entry becomes its own executable section, named `section`, holding
/// `code` at address 0 and one global function symbol `symbol` covering it,
/// the way `-ffunction-sections` lays out unlinked code.
fn arm_object(functions: &[(&str, &str, Vec<u8>)]) -> Vec<u8>
{
    let count = functions.len() as u32;
    let mut shstrtab = vec![0u8];
    let mut strtab = vec![0u8];
    let mut symtab = vec![0u8; 16];
    let mut body = Vec::new();
    // sh_name, sh_type, sh_flags, sh_addr, sh_offset, sh_size, sh_link, sh_info, sh_addralign, sh_entsize
    let mut headers = vec![[0u32; 10]];

    for (index, (section, symbol, code)) in functions.iter().enumerate() {
        let section_name = push_name(&mut shstrtab, section);
        let offset = place(&mut body, code);
        // SHT_PROGBITS, SHF_ALLOC | SHF_EXECINSTR
        headers.push([section_name, 1, 6, 0, offset, code.len() as u32, 0, 0, 4, 0]);

        let symbol_name = push_name(&mut strtab, symbol);
        symtab.extend_from_slice(&symbol_name.to_le_bytes());
        symtab.extend_from_slice(&0u32.to_le_bytes());
        symtab.extend_from_slice(&(code.len() as u32).to_le_bytes());
        symtab.push(0x12); // STB_GLOBAL, STT_FUNC
        symtab.push(0);
        symtab.extend_from_slice(&(index as u16 + 1).to_le_bytes());
    }

    let symtab_name = push_name(&mut shstrtab, ".symtab");
    let strtab_name = push_name(&mut shstrtab, ".strtab");
    let shstrtab_name = push_name(&mut shstrtab, ".shstrtab");

    let offset = place(&mut body, &symtab);
    headers.push([symtab_name, 2, 0, 0, offset, symtab.len() as u32, count + 2, 1, 4, 16]);
    let offset = place(&mut body, &strtab);
    headers.push([strtab_name, 3, 0, 0, offset, strtab.len() as u32, 0, 0, 1, 0]);
    let offset = place(&mut body, &shstrtab);
    headers.push([shstrtab_name, 3, 0, 0, offset, shstrtab.len() as u32, 0, 0, 1, 0]);
    let section_headers = place(&mut body, &[]);

    let mut elf = vec![0x7f, b'E', b'L', b'F', 1, 1, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0];
    for half in [1u16, 40] {
        // ET_REL, EM_ARM
        elf.extend_from_slice(&half.to_le_bytes());
    }
    for word in [1u32, 0, 0, section_headers, 0x0500_0000] {
        // e_version, e_entry, e_phoff, e_shoff, e_flags (EABI5)
        elf.extend_from_slice(&word.to_le_bytes());
    }
    for half in [52u16, 0, 0, 40, headers.len() as u16, count as u16 + 3] {
        // e_ehsize, e_phentsize, e_phnum, e_shentsize, e_shnum, e_shstrndx
        elf.extend_from_slice(&half.to_le_bytes());
    }
    assert_eq!(elf.len(), 52);

    elf.extend_from_slice(&body);
    for header in headers {
        for word in header {
            elf.extend_from_slice(&word.to_le_bytes());
        }
    }
    elf
}

fn function_with_stub(text: &str) -> Vec<u8>
{
    let mut code = NOP.to_vec();
    code.extend_from_slice(&encode_stub(text).unwrap());
    code.extend_from_slice(&NOP);
    code
}

#[test]
fn test_scan_finds_every_stub_at_base_address()
{
    let (image, offsets) = code_with_stubs(&["%frame%: one", "%frame%: two", "%frame%: three"]);
    let found = scan_bytes(&image, 0x0800_0000);

    assert_eq!(found.len(), 3);
    for ((hit, offset), body) in found.iter().zip(&offsets).zip(["one", "two", "three"]) {
        assert_eq!(hit.address, 0x0800_0000 + *offset as u64);
        assert_eq!(hit.message.body(), body);
        assert_eq!(hit.symbol, None);
    }
}

#[test]
fn test_scan_address_wraps_at_top_of_address_space()
{
    let (image, offsets) = code_with_stubs(&["high"]);
    let found = scan_bytes(&image, u64::MAX - 1);

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].address, (u64::MAX - 1).wrapping_add(offsets[0] as u64));
    assert_eq!(found[0].address, 2);
}

#[test]
fn test_scan_skips_false_markers()
{
    let mut image = Vec::new();
    image.extend_from_slice(&MARKER.to_le_bytes());
    image.extend_from_slice(&NOP);
    // marker and branch, but the payload tag is wrong
    let mut broken = encode_stub("bad").unwrap();
    broken[8] = 0x65;
    image.extend_from_slice(&broken);
    image.extend_from_slice(&encode_stub("good").unwrap());

    let found = scan_bytes(&image, 0);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].message.text, "good");
    assert_eq!(found[0].address, 8 + broken.len() as u64);
}

#[test]
fn test_scan_ignores_unaligned_stub()
{
    let mut image = vec![0u8; 2];
    image.extend_from_slice(&encode_stub("misaligned").unwrap());
    image.extend_from_slice(&[0; 2]);
    assert!(scan_bytes(&image, 0).is_empty());
}

#[test]
fn test_scan_empty_and_short_images()
{
    assert!(scan_bytes(&[], 0).is_empty());
    assert!(scan_bytes(&MARKER.to_le_bytes(), 0).is_empty());
}

#[test]
fn test_patched_image_scans_back()
{
    let mut image = vec![0xFFu8; 32];
    image.extend_from_slice(&[0; 64]);
    image.extend_from_slice(&[0xFF; 32]);

    let space = find_empty_space(&image, 16, 4).unwrap()[0];
    assert_eq!(space.offset, 32);
    let written = write_stub(&mut image, space.offset, "%frame%: patched").unwrap();
    assert!(written <= space.size);

    let found = scan_bytes(&image, 0x100);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].address, 0x120);
    assert_eq!(found[0].len, written);
    assert_eq!(found[0].message.body(), "patched");
}

#[test]
fn test_scan_object_rejects_non_object()
{
    assert!(scan_object(b"definitely not an object file").is_err());
}

#[test]
fn test_scan_object_names_function_per_section()
{
    // both stubs sit at address 4 of their own section
    let object = arm_object(&[
        (".text.alpha", "alpha", function_with_stub("%frame%: in alpha")),
        (".text.beta", "_ZN4boot4beta17h0123456789abcdefE", function_with_stub("%frame%: in beta")),
    ]);

    let found = scan_object(&object).unwrap();
    assert_eq!(found.len(), 2);
    assert_eq!(found[0].address, 4);
    assert_eq!(found[1].address, 4);
    assert_eq!(found[0].message.body(), "in alpha");
    assert_eq!(found[0].symbol.as_deref(), Some("alpha"));
    assert_eq!(found[1].message.body(), "in beta");
    assert_eq!(found[1].symbol.as_deref(), Some("boot::beta"));
}

#[test]
fn test_function_bytes_reads_symbol_range()
{
    let alpha = function_with_stub("%frame%: in alpha");
    let beta = function_with_stub("%frame%: in beta");
    let object = arm_object(&[
        (".text.alpha", "alpha", alpha.clone()),
        (".text.beta", "_ZN4boot4beta17h0123456789abcdefE", beta.clone()),
    ]);

    assert_eq!(function_bytes(&object, "alpha").unwrap(), alpha);
    assert_eq!(function_bytes(&object, "boot::beta").unwrap(), beta);
    assert_eq!(function_bytes(&object, "_ZN4boot4beta17h0123456789abcdefE").unwrap(), beta);
    assert!(function_bytes(&object, "gamma").is_err());
}
