//! WOFF 1.0 container.

use std::io::Write;

use flate2::Compression;
use flate2::write::ZlibEncoder;

use super::{Sfnt, pad4, sfnt_size};
use crate::toolchain::{ToolError, ToolResult};

const SIGNATURE: u32 = 0x774F_4646; // wOFF
const HEADER_SIZE: usize = 44;
const ENTRY_SIZE: usize = 20;

pub fn encode(sfnt: &Sfnt<'_>) -> ToolResult<Vec<u8>> {
    let mut directory = Vec::with_capacity(sfnt.tables.len() * ENTRY_SIZE);
    let mut body = Vec::new();
    let data_start = HEADER_SIZE + ENTRY_SIZE * sfnt.tables.len();

    for table in &sfnt.tables {
        let compressed = deflate(table.data)?;
        // Tables that do not shrink are stored as is.
        let stored = if compressed.len() < table.data.len() {
            compressed.as_slice()
        } else {
            table.data
        };

        directory.extend_from_slice(&table.tag);
        put_u32(&mut directory, data_start + body.len());
        put_u32(&mut directory, stored.len());
        put_u32(&mut directory, table.data.len());
        directory.extend_from_slice(&table.checksum.to_be_bytes());

        body.extend_from_slice(stored);
        body.resize(pad4(body.len()), 0);
    }

    let mut out = Vec::with_capacity(data_start + body.len());
    out.extend_from_slice(&SIGNATURE.to_be_bytes());
    out.extend_from_slice(&sfnt.flavor.to_be_bytes());
    put_u32(&mut out, data_start + body.len());
    put_u16(&mut out, sfnt.tables.len());
    put_u16(&mut out, 0);
    put_u32(&mut out, sfnt_size(sfnt));
    put_u16(&mut out, 1); // majorVersion
    put_u16(&mut out, 0); // minorVersion
    out.extend_from_slice(&[0; 20]); // no metadata, no private data
    out.extend_from_slice(&directory);
    out.extend_from_slice(&body);
    Ok(out)
}

fn deflate(data: &[u8]) -> ToolResult<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::best());
    encoder
        .write_all(data)
        .and_then(|()| encoder.finish())
        .map_err(|e| ToolError(format!("zlib: {e}")))
}

#[allow(clippy::cast_possible_truncation)]
fn put_u32(out: &mut Vec<u8>, value: usize) {
    out.extend_from_slice(&(value as u32).to_be_bytes());
}

#[allow(clippy::cast_possible_truncation)]
fn put_u16(out: &mut Vec<u8>, value: usize) {
    out.extend_from_slice(&(value as u16).to_be_bytes());
}
