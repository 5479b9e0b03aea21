//! 16-bit frame check sequence (CRC-16/X.25)

const INIT: u16 = 0xFFFF;
const POLY: u16 = 0x8408;

const TABLE: [u16; 256] = build_table();

const fn build_table() -> [u16; 256] {
    let mut table = [0u16; 256];
    let mut i = 0;
    while i < 256 {
        let mut crc = i as u16;
        let mut bit = 0;
        while bit < 8 {
            crc = if crc & 1 != 0 {
                (crc >> 1) ^ POLY
            } else {
                crc >> 1
            };
            bit += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
}

/// Compute the FCS-16 of `data`
///
/// The result is already complemented and is transmitted least-significant
/// byte first.
pub fn fcs16(data: &[u8]) -> u16 {
    let crc = data.iter().fold(INIT, |crc, &b| {
        (crc >> 8) ^ TABLE[((crc ^ b as u16) & 0xFF) as usize]
    });
    !crc
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_value() {
        assert_eq!(fcs16(b"123456789"), 0x906E);
    }

    #[test]
    fn test_empty() {
        assert_eq!(fcs16(&[]), 0x0000);
    }

    #[test]
    fn test_residue() {
        // Appending the FCS yields the fixed "good FCS" residue
        let data = [0xFF, 0x03, 0xC0, 0x21, 0x01];
        let mut framed = data.to_vec();
        framed.extend_from_slice(&fcs16(&data).to_le_bytes());
        assert_eq!(!fcs16(&framed), 0xF0B8);
    }
}
