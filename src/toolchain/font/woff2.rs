//! WOFF 2.0 container with null-transformed tables.

use std::io::Write;

use super::{Sfnt, pad4, sfnt_size};
use crate::toolchain::{ToolError, ToolResult};

const SIGNATURE: u32 = 0x774F_4632; // wOF2
const HEADER_SIZE: usize = 48;

/// Brotli settings: best quality, 4 MiB window.
const QUALITY: u32 = 11;
const WINDOW: u32 = 22;

/// Table tags with a one-byte directory code, by index.
const KNOWN_TAGS: [&[u8; 4]; 63] = [
    b"cmap", b"head", b"hhea", b"hmtx", b"maxp", b"name", b"OS/2", b"post", b"cvt ", b"fpgm",
    b"glyf", b"loca", b"prep", b"CFF ", b"VORG", b"EBDT", b"EBLC", b"gasp", b"hdmx", b"kern",
    b"LTSH", b"PCLT", b"VDMX", b"vhea", b"vmtx", b"BASE", b"GDEF", b"GPOS", b"GSUB", b"EBSC",
    b"JSTF", b"MATH", b"CBDT", b"CBLC", b"COLR", b"CPAL", b"SVG ", b"sbix", b"acnt", b"avar",
    b"bdat", b"bloc", b"bsln", b"cvar", b"fdsc", b"feat", b"fmtx", b"fvar", b"gvar", b"hsty",
    b"just", b"lcar", b"mort", b"morx", b"opbd", b"prop", b"trak", b"Zapf", b"Silf", b"Glat",
    b"Gloc", b"Feat", b"Sill",
];

/// Tag follows the flags byte.
const ARBITRARY_TAG: u8 = 63;

/// Transform version 3: `glyf` and `loca` stored without the glyph transform.
const NULL_TRANSFORM: u8 = 0xC0;

pub fn encode(sfnt: &Sfnt<'_>) -> ToolResult<Vec<u8>> {
    let tables = directory_order(sfnt);

    let mut directory = Vec::new();
    let mut stream = Vec::with_capacity(sfnt_size(sfnt));
    for table in &tables {
        let index = KNOWN_TAGS.iter().position(|t| **t == table.tag);
        let mut flags = index.map_or(ARBITRARY_TAG, |i| i as u8);
        if matches!(&table.tag, b"glyf" | b"loca") {
            flags |= NULL_TRANSFORM;
        }

        directory.push(flags);
        if index.is_none() {
            directory.extend_from_slice(&table.tag);
        }
        write_base128(&mut directory, table.data.len() as u32);
        stream.extend_from_slice(table.data);
    }

    let compressed = compress(&stream)?;
    let unpadded = HEADER_SIZE + directory.len() + compressed.len();
    let length = pad4(unpadded);

    let mut out = Vec::with_capacity(length);
    out.extend_from_slice(&SIGNATURE.to_be_bytes());
    out.extend_from_slice(&sfnt.flavor.to_be_bytes());
    out.extend_from_slice(&(length as u32).to_be_bytes());
    out.extend_from_slice(&(tables.len() as u16).to_be_bytes());
    out.extend_from_slice(&[0, 0]);
    out.extend_from_slice(&(sfnt_size(sfnt) as u32).to_be_bytes());
    out.extend_from_slice(&(compressed.len() as u32).to_be_bytes());
    out.extend_from_slice(&1u16.to_be_bytes()); // majorVersion
    out.extend_from_slice(&0u16.to_be_bytes()); // minorVersion
    out.extend_from_slice(&[0; 20]); // no metadata, no private data
    out.extend_from_slice(&directory);
    out.extend_from_slice(&compressed);
    out.resize(length, 0);
    Ok(out)
}

/// Tag order, except that `loca` directly follows `glyf`.
fn directory_order<'s, 'a>(sfnt: &'s Sfnt<'a>) -> Vec<&'s super::sfnt::Table<'a>> {
    let mut tables: Vec<_> = sfnt.tables.iter().filter(|t| &t.tag != b"loca").collect();
    if let Some(loca) = sfnt.tables.iter().find(|t| &t.tag == b"loca") {
        let at = tables
            .iter()
            .position(|t| &t.tag == b"glyf")
            .map_or(tables.len(), |i| i + 1);
        tables.insert(at, loca);
    }
    tables
}

fn compress(data: &[u8]) -> ToolResult<Vec<u8>> {
    let mut writer = brotli::CompressorWriter::new(Vec::new(), 4096, QUALITY, WINDOW);
    writer
        .write_all(data)
        .map_err(|e| ToolError(format!("brotli: {e}")))?;
    Ok(writer.into_inner())
}

/// UIntBase128: big-endian 7-bit groups, high bit set on all but the last.
fn write_base128(out: &mut Vec<u8>, value: u32) {
    let mut groups = [0u8; 5];
    let mut len = 0;
    let mut rest = value;
    loop {
        groups[len] = (rest & 0x7F) as u8;
        len += 1;
        rest >>= 7;
        if rest == 0 {
            break;
        }
    }
    for i in (0..len).rev() {
        let continuation = if i > 0 { 0x80 } else { 0 };
        out.push(groups[i] | continuation);
    }
}
