//! Table directory of a single TrueType/OpenType face.

use ttf_parser::RawFace;

use crate::toolchain::{ToolError, ToolResult};

/// One table record with its bytes.
#[derive(Debug, Clone, Copy)]
pub struct Table<'a> {
    pub tag: [u8; 4],
    pub checksum: u32,
    pub data: &'a [u8],
}

/// A parsed font: sfnt version plus tables sorted by tag.
#[derive(Debug)]
pub struct Sfnt<'a> {
    pub flavor: u32,
    pub tables: Vec<Table<'a>>,
}

impl<'a> Sfnt<'a> {
    pub fn parse(data: &'a [u8]) -> ToolResult<Self> {
        if data.starts_with(b"ttcf") {
            return Err(ToolError::new("font collections are not supported"));
        }
        let face = RawFace::parse(data, 0)
            .map_err(|e| ToolError(format!("not a TrueType/OpenType font: {e}")))?;

        let mut tables = Vec::with_capacity(usize::from(face.table_records.len()));
        for record in face.table_records {
            let tag = record.tag.0.to_be_bytes();
            let start = record.offset as usize;
            let data = start
                .checked_add(record.length as usize)
                .and_then(|end| data.get(start..end))
                .ok_or_else(|| {
                    ToolError(format!(
                        "table `{}` lies outside the font file",
                        String::from_utf8_lossy(&tag)
                    ))
                })?;
            tables.push(Table {
                tag,
                checksum: record.check_sum,
                data,
            });
        }
        tables.sort_by_key(|t| t.tag);

        Ok(Self {
            flavor: u32::from_be_bytes([data[0], data[1], data[2], data[3]]),
            tables,
        })
    }
}
