//! Single-byte text codecs.
//!
//! EBCDIC code pages are built in as 256-entry tables. Any other name is
//! resolved through `encoding_rs`, restricted to its single-byte encodings
//! (windows-125x, ISO-8859-x, KOI8, IBM866, ...).

use std::fmt;

use encoding_rs::Encoding;

use crate::error::{DatasetError, DecodeError, EncodeError};

/// A 256-entry EBCDIC code page.
pub struct CodePage {
    name: &'static str,
    aliases: &'static [&'static str],
    table: [u16; 256],
}

impl CodePage {
    pub fn name(&self) -> &'static str {
        self.name
    }

    fn decode_byte(&self, byte: u8) -> Option<char> {
        char::from_u32(u32::from(self.table[usize::from(byte)]))
    }

    fn encode_char(&self, ch: char) -> Option<u8> {
        let code = u32::from(ch);
        self.table
            .iter()
            .position(|&c| u32::from(c) == code)
            .and_then(|pos| u8::try_from(pos).ok())
    }

    fn matches(&self, normalized: &str) -> bool {
        self.aliases.contains(&normalized)
    }
}

impl fmt::Debug for CodePage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodePage").field("name", &self.name).finish()
    }
}

#[rustfmt::skip]
const CP037: [u16; 256] = [
    0x0000, 0x0001, 0x0002, 0x0003, 0x009C, 0x0009, 0x0086, 0x007F, 0x0097, 0x008D, 0x008E, 0x000B, 0x000C, 0x000D, 0x000E, 0x000F,
    0x0010, 0x0011, 0x0012, 0x0013, 0x009D, 0x0085, 0x0008, 0x0087, 0x0018, 0x0019, 0x0092, 0x008F, 0x001C, 0x001D, 0x001E, 0x001F,
    0x0080, 0x0081, 0x0082, 0x0083, 0x0084, 0x000A, 0x0017, 0x001B, 0x0088, 0x0089, 0x008A, 0x008B, 0x008C, 0x0005, 0x0006, 0x0007,
    0x0090, 0x0091, 0x0016, 0x0093, 0x0094, 0x0095, 0x0096, 0x0004, 0x0098, 0x0099, 0x009A, 0x009B, 0x0014, 0x0015, 0x009E, 0x001A,
    0x0020, 0x00A0, 0x00E2, 0x00E4, 0x00E0, 0x00E1, 0x00E3, 0x00E5, 0x00E7, 0x00F1, 0x00A2, 0x002E, 0x003C, 0x0028, 0x002B, 0x007C,
    0x0026, 0x00E9, 0x00EA, 0x00EB, 0x00E8, 0x00ED, 0x00EE, 0x00EF, 0x00EC, 0x00DF, 0x0021, 0x0024, 0x002A, 0x0029, 0x003B, 0x00AC,
    0x002D, 0x002F, 0x00C2, 0x00C4, 0x00C0, 0x00C1, 0x00C3, 0x00C5, 0x00C7, 0x00D1, 0x00A6, 0x002C, 0x0025, 0x005F, 0x003E, 0x003F,
    0x00F8, 0x00C9, 0x00CA, 0x00CB, 0x00C8, 0x00CD, 0x00CE, 0x00CF, 0x00CC, 0x0060, 0x003A, 0x0023, 0x0040, 0x0027, 0x003D, 0x0022,
    0x00D8, 0x0061, 0x0062, 0x0063, 0x0064, 0x0065, 0x0066, 0x0067, 0x0068, 0x0069, 0x00AB, 0x00BB, 0x00F0, 0x00FD, 0x00FE, 0x00B1,
    0x00B0, 0x006A, 0x006B, 0x006C, 0x006D, 0x006E, 0x006F, 0x0070, 0x0071, 0x0072, 0x00AA, 0x00BA, 0x00E6, 0x00B8, 0x00C6, 0x00A4,
    0x00B5, 0x007E, 0x0073, 0x0074, 0x0075, 0x0076, 0x0077, 0x0078, 0x0079, 0x007A, 0x00A1, 0x00BF, 0x00D0, 0x00DD, 0x00DE, 0x00AE,
    0x005E, 0x00A3, 0x00A5, 0x00B7, 0x00A9, 0x00A7, 0x00B6, 0x00BC, 0x00BD, 0x00BE, 0x005B, 0x005D, 0x00AF, 0x00A8, 0x00B4, 0x00D7,
    0x007B, 0x0041, 0x0042, 0x0043, 0x0044, 0x0045, 0x0046, 0x0047, 0x0048, 0x0049, 0x00AD, 0x00F4, 0x00F6, 0x00F2, 0x00F3, 0x00F5,
    0x007D, 0x004A, 0x004B, 0x004C, 0x004D, 0x004E, 0x004F, 0x0050, 0x0051, 0x0052, 0x00B9, 0x00FB, 0x00FC, 0x00F9, 0x00FA, 0x00FF,
    0x005C, 0x00F7, 0x0053, 0x0054, 0x0055, 0x0056, 0x0057, 0x0058, 0x0059, 0x005A, 0x00B2, 0x00D4, 0x00D6, 0x00D2, 0x00D3, 0x00D5,
    0x0030, 0x0031, 0x0032, 0x0033, 0x0034, 0x0035, 0x0036, 0x0037, 0x0038, 0x0039, 0x00B3, 0x00DB, 0x00DC, 0x00D9, 0x00DA, 0x009F,
];

/// Derive a code page from CP037 by replacing individual positions.
const fn patch(mut table: [u16; 256], changes: &[(u8, u16)]) -> [u16; 256] {
    let mut i = 0;
    while i < changes.len() {
        let (byte, code) = changes[i];
        table[byte as usize] = code;
        i += 1;
    }
    table
}

static CODE_PAGES: [CodePage; 4] = [
    CodePage {
        name: "IBM037",
        aliases: &["IBM037", "IBM37", "CP037", "CP37", "037", "EBCDICCPUS", "EBCDICCPCA"],
        table: CP037,
    },
    CodePage {
        name: "IBM1140",
        aliases: &["IBM1140", "IBM01140", "CP1140", "1140", "CCSID01140"],
        table: patch(CP037, &[(0x9F, 0x20AC)]),
    },
    CodePage {
        name: "IBM500",
        aliases: &["IBM500", "CP500", "500", "EBCDICCPBE", "EBCDICCPCH"],
        table: patch(
            CP037,
            &[
                (0x4A, 0x005B),
                (0x4F, 0x0021),
                (0x5A, 0x005D),
                (0x5F, 0x005E),
                (0xB0, 0x00A2),
                (0xBA, 0x00AC),
                (0xBB, 0x007C),
            ],
        ),
    },
    CodePage {
        name: "IBM1047",
        aliases: &["IBM1047", "CP1047", "1047"],
        table: patch(
            CP037,
            &[
                (0x5F, 0x005E),
                (0xAD, 0x005B),
                (0xBD, 0x005D),
                (0xB0, 0x00AC),
                (0xBA, 0x00DD),
                (0xBB, 0x00A8),
            ],
        ),
    },
];

/// A resolved single-byte text encoding.
#[derive(Debug, Clone, Copy)]
pub enum Codec {
    /// Built-in EBCDIC code page.
    Ebcdic(&'static CodePage),
    /// Single-byte encoding from `encoding_rs`.
    Whatwg(&'static Encoding),
}

impl Codec {
    /// Resolve an encoding name such as `IBM037`, `cp500` or `windows-1252`.
    pub fn for_name(name: &str) -> Result<Self, DatasetError> {
        let normalized = normalize(name);
        if let Some(page) = CODE_PAGES.iter().find(|p| p.matches(&normalized)) {
            return Ok(Codec::Ebcdic(page));
        }

        match Encoding::for_label(name.trim().as_bytes()) {
            Some(encoding) if encoding.is_single_byte() => Ok(Codec::Whatwg(encoding)),
            _ => Err(DatasetError::UnsupportedEncoding(name.to_string())),
        }
    }

    /// Canonical name of the encoding.
    pub fn name(&self) -> &'static str {
        match self {
            Codec::Ebcdic(page) => page.name(),
            Codec::Whatwg(encoding) => encoding.name(),
        }
    }

    /// Decode a byte slice, failing on the first unmapped byte.
    pub fn decode(&self, bytes: &[u8]) -> Result<String, DecodeError> {
        match self {
            Codec::Ebcdic(page) => bytes
                .iter()
                .enumerate()
                .map(|(offset, &byte)| {
                    page.decode_byte(byte).ok_or(DecodeError::Unmappable {
                        encoding: page.name(),
                        offset,
                        byte,
                    })
                })
                .collect(),
            Codec::Whatwg(encoding) => {
                match encoding.decode_without_bom_handling_and_without_replacement(bytes) {
                    Some(text) => Ok(text.into_owned()),
                    None => Err(first_unmappable(encoding, bytes)),
                }
            }
        }
    }

    /// Encode text, failing on the first character the encoding cannot represent.
    pub fn encode(&self, text: &str) -> Result<Vec<u8>, EncodeError> {
        match self {
            Codec::Ebcdic(page) => text
                .chars()
                .map(|ch| {
                    page.encode_char(ch).ok_or(EncodeError::Unmappable {
                        encoding: page.name(),
                        ch,
                    })
                })
                .collect(),
            Codec::Whatwg(encoding) => {
                let (bytes, _, had_unmappable) = encoding.encode(text);
                if !had_unmappable {
                    return Ok(bytes.into_owned());
                }
                let mut buf = [0u8; 4];
                let ch = text
                    .chars()
                    .find(|c| encoding.encode(c.encode_utf8(&mut buf)).2)
                    .unwrap_or(char::REPLACEMENT_CHARACTER);
                Err(EncodeError::Unmappable {
                    encoding: encoding.name(),
                    ch,
                })
            }
        }
    }
}

/// Single-byte encodings decode each byte independently, so the first byte
/// that fails on its own is the culprit.
fn first_unmappable(encoding: &'static Encoding, bytes: &[u8]) -> DecodeError {
    let (offset, byte) = bytes
        .iter()
        .enumerate()
        .find(|&(_, &b)| {
            encoding
                .decode_without_bom_handling_and_without_replacement(&[b])
                .is_none()
        })
        .map(|(offset, &b)| (offset, b))
        .unwrap_or((0, bytes.first().copied().unwrap_or(0)));

    DecodeError::Unmappable {
        encoding: encoding.name(),
        offset,
        byte,
    }
}

fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '-' | '_' | ' '))
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_ebcdic_aliases() {
        for name in ["IBM037", "cp037", "IBM-037", "ebcdic-cp-us", "037"] {
            assert_eq!(Codec::for_name(name).unwrap().name(), "IBM037", "{name}");
        }
        assert_eq!(Codec::for_name("CP500").unwrap().name(), "IBM500");
        assert_eq!(Codec::for_name("ibm_1047").unwrap().name(), "IBM1047");
        assert_eq!(Codec::for_name("CP1140").unwrap().name(), "IBM1140");
    }

    #[test]
    fn test_resolve_single_byte_labels() {
        assert_eq!(Codec::for_name("windows-1252").unwrap().name(), "windows-1252");
        assert_eq!(Codec::for_name("latin1").unwrap().name(), "windows-1252");
        assert_eq!(Codec::for_name("ISO-8859-8").unwrap().name(), "ISO-8859-8");
    }

    #[test]
    fn test_reject_multi_byte_and_unknown() {
        assert!(matches!(
            Codec::for_name("UTF-8"),
            Err(DatasetError::UnsupportedEncoding(_))
        ));
        assert!(matches!(
            Codec::for_name("Shift_JIS"),
            Err(DatasetError::UnsupportedEncoding(_))
        ));
        assert!(matches!(
            Codec::for_name("EBCDIC-42"),
            Err(DatasetError::UnsupportedEncoding(_))
        ));
    }

    #[test]
    fn test_decode_cp037_text() {
        let codec = Codec::for_name("IBM037").unwrap();
        let bytes = [0xC8, 0xC5, 0xD3, 0xD3, 0xD6, 0x40, 0xF1, 0xF2, 0x4B];
        assert_eq!(codec.decode(&bytes).unwrap(), "HELLO 12.");
        assert_eq!(codec.decode(&[0x81, 0x82, 0x83]).unwrap(), "abc");
    }

    #[test]
    fn test_variant_differences() {
        let cp037 = Codec::for_name("CP037").unwrap();
        let cp500 = Codec::for_name("CP500").unwrap();
        let cp1047 = Codec::for_name("CP1047").unwrap();
        let cp1140 = Codec::for_name("CP1140").unwrap();

        assert_eq!(cp037.decode(&[0xBA, 0xBB]).unwrap(), "[]");
        assert_eq!(cp500.decode(&[0x4A, 0x5A]).unwrap(), "[]");
        assert_eq!(cp1047.decode(&[0xAD, 0xBD]).unwrap(), "[]");
        assert_eq!(cp037.decode(&[0x9F]).unwrap(), "\u{A4}");
        assert_eq!(cp1140.decode(&[0x9F]).unwrap(), "\u{20AC}");
    }

    #[test]
    fn test_code_pages_are_permutations() {
        for page in &CODE_PAGES {
            let mut seen = [false; 256];
            let mut extra = 0;
            for &code in &page.table {
                match usize::try_from(code).ok().filter(|&c| c < 256) {
                    Some(c) => {
                        assert!(!seen[c], "{} maps U+{c:04X} twice", page.name);
                        seen[c] = true;
                    }
                    None => extra += 1,
                }
            }
            // IBM1140 trades U+00A4 for the euro sign
            assert!(extra <= 1, "{}", page.name);
        }
    }

    #[test]
    fn test_round_trip_all_mapped_bytes() {
        for name in ["IBM037", "IBM500", "IBM1047", "IBM1140", "windows-1252", "ISO-8859-8"] {
            let codec = Codec::for_name(name).unwrap();
            for byte in 0..=255u8 {
                if let Ok(text) = codec.decode(&[byte]) {
                    assert_eq!(codec.encode(&text).unwrap(), vec![byte], "{name} 0x{byte:02X}");
                }
            }
        }
    }

    #[test]
    fn test_decode_reports_unmapped_byte() {
        let codec = Codec::for_name("ISO-8859-8").unwrap();
        let err = codec.decode(&[0x41, 0x42, 0xC0, 0x43]).unwrap_err();
        assert_eq!(
            err,
            DecodeError::Unmappable {
                encoding: "ISO-8859-8",
                offset: 2,
                byte: 0xC0,
            }
        );
    }

    #[test]
    fn test_encode_reports_unmappable_char() {
        let codec = Codec::for_name("IBM037").unwrap();
        let err = codec.encode("AB\u{20AC}").unwrap_err();
        assert_eq!(
            err,
            EncodeError::Unmappable {
                encoding: "IBM037",
                ch: '\u{20AC}',
            }
        );

        let codec = Codec::for_name("ISO-8859-8").unwrap();
        assert!(codec.encode("\u{4E2D}").is_err());
    }
}
