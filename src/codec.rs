//! Base64 variant used to carry RuuviTag payloads in Eddystone URLs.
//!
//! Encoding is plain base64 with `=` padding. Decoding is lenient: bytes
//! outside the alphabet never fail the decode, they are skipped one position
//! at a time when they start a group, and contribute nothing when they fall
//! inside one. URL fragments may carry separators that are not part of the
//! alphabet, so this tolerance is part of the contract.

const ALPHABET: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

/// Marker for bytes outside the alphabet.
const INVALID: u8 = 0xFF;

const DECODE_TABLE: [u8; 256] = build_decode_table();

const fn build_decode_table() -> [u8; 256] {
    let mut table = [INVALID; 256];
    let mut i = 0;
    while i < ALPHABET.len() {
        table[ALPHABET[i] as usize] = i as u8;
        i += 1;
    }
    table
}

#[inline]
fn sextet(byte: u8) -> Option<u32> {
    match DECODE_TABLE[usize::from(byte)] {
        INVALID => None,
        value => Some(u32::from(value)),
    }
}

/// Encode bytes as standard base64 with `=` padding.
///
/// # Example
/// ```
/// use ruuvitag_decoder::codec;
///
/// assert_eq!(codec::encode(b"A"), "QQ==");
/// assert_eq!(codec::encode(&[0x04, 0x48, 0x18]), "BEgY");
/// ```
pub fn encode(data: &[u8]) -> String {
    let mut out = String::with_capacity(data.len().div_ceil(3) * 4);

    for chunk in data.chunks(3) {
        let mut group = u32::from(chunk[0]) << 16;
        if let Some(&b) = chunk.get(1) {
            group |= u32::from(b) << 8;
        }
        if let Some(&b) = chunk.get(2) {
            group |= u32::from(b);
        }

        // n input bytes produce n + 1 sextets
        for j in 0..=chunk.len() {
            let index = (group >> (18 - 6 * j)) & 0x3F;
            out.push(char::from(ALPHABET[index as usize]));
        }
        for _ in chunk.len()..3 {
            out.push('=');
        }
    }

    out
}

/// Decode text produced by [`encode`], tolerating characters outside the alphabet.
///
/// Decoding works in windows of four positions. A window only starts on a
/// valid character; invalid characters in front of it are skipped one by
/// one. Inside the window each position keeps its fixed bit slot, and every
/// valid character after the first yields one output byte.
///
/// # Example
/// ```
/// use ruuvitag_decoder::codec;
///
/// assert_eq!(codec::decode("QQ=="), b"A");
/// assert_eq!(codec::decode("QQ==!!QQ"), b"AA");
/// assert!(codec::decode("!!!").is_empty());
/// ```
pub fn decode(text: &str) -> Vec<u8> {
    let bytes = text.as_bytes();
    let mut out = Vec::with_capacity(bytes.len() / 4 * 3 + 2);
    let mut i = 0;

    while i < bytes.len() {
        let Some(first) = sextet(bytes[i]) else {
            i += 1;
            continue;
        };

        let mut group = first << 18;
        let mut count = 0;
        for (slot, shift) in [12, 6, 0].into_iter().enumerate() {
            if let Some(value) = bytes.get(i + 1 + slot).copied().and_then(sextet) {
                group |= value << shift;
                count += 1;
            }
        }

        for k in 0..count {
            out.push((group >> (16 - 8 * k)) as u8);
        }
        i += 4;
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_padding() {
        assert_eq!(encode(b""), "");
        assert_eq!(encode(b"A"), "QQ==");
        assert_eq!(encode(b"AB"), "QUI=");
        assert_eq!(encode(b"ABC"), "QUJD");
        assert_eq!(encode(b"Ruuvi"), "UnV1dmk=");
    }

    #[test]
    fn test_decode_standard_text() {
        assert_eq!(decode("QUJD"), b"ABC");
        assert_eq!(decode("UnV1dmk="), b"Ruuvi");
        assert_eq!(decode("+/+/"), vec![0xFB, 0xFF, 0xBF]);
    }

    #[test]
    fn test_round_trip() {
        let samples: [&[u8]; 5] = [
            b"",
            &[0x00],
            &[0xFF, 0x00],
            &[0x04, 0x48, 0x18, 0x00, 0xC4, 0x7C],
            &[0x03, 0x29, 0x1A, 0x1E, 0xCE, 0x1E, 0xFC, 0x18, 0xF9, 0x42, 0x02, 0xCA, 0x0B],
        ];
        for sample in samples {
            assert_eq!(decode(&encode(sample)), sample);
        }

        let every_byte: Vec<u8> = (0..=255).collect();
        assert_eq!(decode(&encode(&every_byte)), every_byte);
    }

    #[test]
    fn test_decode_skips_invalid_characters() {
        assert_eq!(decode("QQ==!!QQ"), b"AA");
        assert_eq!(decode("QQ==!!QQ"), decode("QQ==QQ"));
        assert_eq!(decode("!QUJD"), b"ABC");
        assert_eq!(decode("#?QUJD"), b"ABC");
    }

    #[test]
    fn test_decode_invalid_inside_group_keeps_slots() {
        // The invalid character holds its slot; the two trailing characters
        // land in the low sextets.
        let b = 1 << 18 | 1 << 6 | 1;
        assert_eq!(decode("B!BB"), vec![(b >> 16) as u8, (b >> 8) as u8]);
    }

    #[test]
    fn test_decode_malformed_yields_fewer_bytes() {
        assert!(decode("").is_empty());
        assert!(decode("====").is_empty());
        assert!(decode("Q").is_empty());
        assert_eq!(decode("BEgYAMR8n"), vec![0x04, 0x48, 0x18, 0x00, 0xC4, 0x7C]);
    }

    #[test]
    fn test_decode_non_ascii_is_skipped() {
        assert_eq!(decode("äQUJD"), b"ABC");
    }
}
