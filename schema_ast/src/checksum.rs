//! Property checksums
//!
//! Every property node carries a checksum that the engine's replication layout derives
//! independently for the same field. Matching the two is how layout records are attached
//! to nodes after the fact, so the accumulation order here must not change:
//!
//! 1. lower-cased field name, seeded with the parent checksum (0 at the top of a class)
//! 2. lower-cased C++ type name
//! 3. the static array index as four little-endian bytes
//!
//! Strings are accumulated one 32-bit code unit per character, matching the engine's
//! wide-string CRC.

use crate::reflection::ReflectedField;

/// Reflected CRC-32 polynomial (IEEE 802.3)
const CRC32_POLYNOMIAL: u32 = 0xEDB8_8320;

const CRC32_TABLE: [u32; 256] = build_table();

const fn build_table() -> [u32; 256] {
    let mut table = [0_u32; 256];
    let mut index = 0;
    while index < 256 {
        #[allow(clippy::cast_possible_truncation, reason = "index is below 256")]
        let mut crc = index as u32;
        let mut bit = 0;
        while bit < 8 {
            crc = if crc & 1 == 1 {
                (crc >> 1) ^ CRC32_POLYNOMIAL
            } else {
                crc >> 1
            };
            bit += 1;
        }
        table[index] = crc;
        index += 1;
    }
    table
}

/// Continue a CRC-32 over `bytes`, starting from a previously finalized `crc`
fn mem_crc32(bytes: &[u8], crc: u32) -> u32 {
    let mut crc = !crc;
    for &byte in bytes {
        crc = (crc >> 8) ^ CRC32_TABLE[((crc ^ u32::from(byte)) & 0xFF) as usize];
    }
    !crc
}

/// Continue a CRC-32 over `text`, feeding each character as a 32-bit little-endian unit
fn str_crc32(text: &str, crc: u32) -> u32 {
    text.chars()
        .fold(crc, |crc, ch| mem_crc32(&u32::from(ch).to_le_bytes(), crc))
}

/// Checksum for a field given its name, C++ type, parent checksum and static array index
pub fn checksum_parts(name: &str, cpp_type: &str, parent_checksum: u32, static_array_index: u32) -> u32 {
    let checksum = str_crc32(&name.to_lowercase(), parent_checksum);
    let checksum = str_crc32(&cpp_type.to_lowercase(), checksum);
    mem_crc32(&static_array_index.to_le_bytes(), checksum)
}

/// Checksum for one slot of a reflected field
pub fn checksum(field: &ReflectedField, parent_checksum: u32, static_array_index: u32) -> u32 {
    checksum_parts(&field.name, &field.cpp_type, parent_checksum, static_array_index)
}

/// Fold `value` into `seed`. Used to derive one identity from a chain of checksums.
pub fn combine(seed: u32, value: u32) -> u32 {
    mem_crc32(&value.to_le_bytes(), seed)
}
