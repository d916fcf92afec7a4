//! # Hex Helpers
//!
//! Formatting of byte buffers for terminal output and parsing of the numeric
//! arguments (offsets, addresses, sizes) the tools accept.

use std::fmt::Write;

/// Bytes per hexdump line.
pub const LINE_WIDTH: usize = 16;

/// Space-separated lowercase hex, e.g. `0c c0 a0 e1`.
#[must_use]
pub fn hex_bytes(bytes: &[u8]) -> String
{
    let mut out = String::with_capacity(bytes.len() * 3);
    for (index, byte) in bytes.iter().enumerate() {
        if index > 0 {
            out.push(' ');
        }
        let _ = write!(out, "{byte:02x}");
    }
    out
}

/// Little-endian 32-bit words, one per entry, e.g. `e1a0c00c`.
///
/// A trailing partial word is zero-extended.
#[must_use]
pub fn hex_words(bytes: &[u8]) -> Vec<String>
{
    bytes
        .chunks(4)
        .map(|chunk| {
            let mut word = [0u8; 4];
            word[..chunk.len()].copy_from_slice(chunk);
            format!("{:08x}", u32::from_le_bytes(word))
        })
        .collect()
}

/// Classic hexdump: address, 16 bytes, printable ASCII.
///
/// ```rust
/// use regsnap_utils::hex::hexdump;
///
/// let dump = hexdump(b"dd\0\0hi", 0x100);
/// assert!(dump.starts_with("00000100  64 64 00 00 68 69"));
/// assert!(dump.ends_with("|dd..hi|\n"));
/// ```
#[must_use]
pub fn hexdump(bytes: &[u8], base_address: u64) -> String
{
    let mut out = String::new();
    for (line, chunk) in bytes.chunks(LINE_WIDTH).enumerate() {
        let address = base_address.wrapping_add((line * LINE_WIDTH) as u64);
        let ascii: String = chunk
            .iter()
            .map(|&byte| if byte.is_ascii_graphic() || byte == b' ' { byte as char } else { '.' })
            .collect();
        let _ = writeln!(
            out,
            "{address:08x}  {:<width$}  |{ascii}|",
            hex_bytes(chunk),
            width = LINE_WIDTH * 3 - 1
        );
    }
    out
}

/// Parse a number in decimal or with a `0x`/`0o`/`0b` prefix; `_` separators allowed.
///
/// Shaped for clap's `value_parser`.
///
/// ## Errors
///
/// A message naming the rejected input.
pub fn parse_number(input: &str) -> Result<u64, String>
{
    let cleaned: String = input.trim().chars().filter(|&c| c != '_').collect();
    let lower = cleaned.to_ascii_lowercase();

    let (digits, radix) = if let Some(rest) = lower.strip_prefix("0x") {
        (rest, 16)
    } else if let Some(rest) = lower.strip_prefix("0o") {
        (rest, 8)
    } else if let Some(rest) = lower.strip_prefix("0b") {
        (rest, 2)
    } else {
        (lower.as_str(), 10)
    };

    u64::from_str_radix(digits, radix).map_err(|err| format!("Invalid number '{input}': {err}"))
}

/// [`parse_number`] narrowed to `usize`.
///
/// ## Errors
///
/// If the input does not parse or does not fit in `usize`.
pub fn parse_size(input: &str) -> Result<usize, String>
{
    let value = parse_number(input)?;
    usize::try_from(value).map_err(|_| format!("Value '{input}' is too large for this platform"))
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_hex_bytes()
    {
        assert_eq!(hex_bytes(&[]), "");
        assert_eq!(hex_bytes(&[0x0c, 0xc0, 0xa0, 0xe1]), "0c c0 a0 e1");
    }

    #[test]
    fn test_hex_words_little_endian()
    {
        assert_eq!(hex_words(&[0x0c, 0xc0, 0xa0, 0xe1, 0x01]), vec!["e1a0c00c", "00000001"]);
    }

    #[test]
    fn test_hexdump_pads_short_line()
    {
        let dump = hexdump(&[0x41; 17], 0);
        let lines: Vec<&str> = dump.lines().collect();
        assert_eq!(lines.len(), 2);
        // hex column is padded, only the ASCII column is shorter
        assert_eq!(lines[0].len(), lines[1].len() + 15);
        assert!(lines[1].starts_with("00000010  41"));
    }

    #[test]
    fn test_hexdump_address_wraps()
    {
        let dump = hexdump(&[0; 32], u64::MAX - 0xf);
        let lines: Vec<&str> = dump.lines().collect();
        assert!(lines[0].starts_with("fffffffffffffff0  00"));
        assert!(lines[1].starts_with("00000000  00"));
    }

    #[test]
    fn test_parse_number()
    {
        assert_eq!(parse_number("4096"), Ok(4096));
        assert_eq!(parse_number("0x0800_0000"), Ok(0x0800_0000));
        assert_eq!(parse_number("0X1F"), Ok(0x1f));
        assert_eq!(parse_number("0b1010"), Ok(10));
        assert_eq!(parse_number("0o17"), Ok(15));
        assert!(parse_number("0x").is_err());
        assert!(parse_number("twelve").is_err());
        assert!(parse_number("-1").is_err());
    }

    #[test]
    fn test_parse_size()
    {
        assert_eq!(parse_size("0x40"), Ok(64));
    }
}
