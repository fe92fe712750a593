//! Synthetic MCLF and S-Record inputs shared by the integration tests.

#![allow(dead_code)]

use imgload::{Record, RecordType};

pub const MCLF_MAGIC: &[u8; 4] = b"MCLF";
pub const MCLF_HEADER_LEN: usize = 76;
pub const MCLF_UUID: [u8; 16] = [
    0x00, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88, 0x99, 0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff,
];

/// Fields of a synthetic MCLF v2 header.
pub struct Mclf {
    pub minor: u16,
    pub flags: u32,
    pub mem_type: u32,
    pub service_type: u32,
    pub text_start: u32,
    pub text_len: u32,
    pub data_start: u32,
    pub data_len: u32,
    pub bss_len: u32,
    pub entry: u32,
}

impl Default for Mclf {
    fn default() -> Self {
        Self {
            minor: 3,
            flags: 0,
            mem_type: 2,
            service_type: 3,
            text_start: 0x0010_0000,
            text_len: 0x200,
            data_start: 0x0020_0000,
            data_len: 0x40,
            bss_len: 0x1000,
            entry: 0x0010_0100,
        }
    }
}

impl Mclf {
    /// Serialize the header, padded with a text and data body.
    pub fn build(&self) -> Vec<u8> {
        let body = usize::try_from(self.text_len + self.data_len).unwrap();
        let mut data = vec![0u8; body.max(MCLF_HEADER_LEN)];
        let mut put = |offset: usize, value: u32| {
            data[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
        };
        put(8, self.flags);
        put(12, self.mem_type);
        put(16, self.service_type);
        put(20, 1);
        put(40, 0x0004_0101);
        put(44, 1);
        put(48, self.text_start);
        put(52, self.text_len);
        put(56, self.data_start);
        put(60, self.data_len);
        put(64, self.bss_len);
        put(68, self.entry);
        put(72, 1);
        data[..4].copy_from_slice(MCLF_MAGIC);
        data[4..6].copy_from_slice(&self.minor.to_le_bytes());
        data[6..8].copy_from_slice(&2u16.to_le_bytes());
        data[24..40].copy_from_slice(&MCLF_UUID);
        // Fill the data section so it is distinguishable from the header.
        let text_len = usize::try_from(self.text_len).unwrap();
        for b in data.iter_mut().skip(text_len.max(MCLF_HEADER_LEN)) {
            *b = 0xd5;
        }
        data
    }
}

/// One canonical S-Record line.
pub fn srec_line(record_type: RecordType, address: u32, payload: &[u8]) -> String {
    Record::new(record_type, address, payload.to_vec())
        .unwrap()
        .to_string()
}

/// Join lines into a newline-terminated file body.
pub fn srec_file(lines: &[String]) -> Vec<u8> {
    let mut text = lines.join("\n");
    text.push('\n');
    text.into_bytes()
}

/// Header record carrying `name`.
pub fn srec_header(name: &str) -> String {
    srec_line(RecordType::Header, 0, name.as_bytes())
}
