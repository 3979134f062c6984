//! TrueType to WOFF / WOFF2 conversion.
//!
//! Both containers carry the original sfnt tables unchanged; WOFF
//! compresses each table with zlib, WOFF2 compresses all of them as one
//! Brotli stream. Glyph outlines are never transformed.

mod sfnt;
mod woff;
mod woff2;

use super::{FontConverter, ToolResult};

pub use sfnt::Sfnt;

pub struct NativeFontConverter;

impl FontConverter for NativeFontConverter {
    fn to_woff(&self, ttf: &[u8]) -> ToolResult<Vec<u8>> {
        woff::encode(&Sfnt::parse(ttf)?)
    }

    fn to_woff2(&self, ttf: &[u8]) -> ToolResult<Vec<u8>> {
        woff2::encode(&Sfnt::parse(ttf)?)
    }
}

/// Round up to the next multiple of four.
const fn pad4(len: usize) -> usize {
    (len + 3) & !3
}

/// Size of the sfnt these tables reassemble into.
fn sfnt_size(sfnt: &Sfnt<'_>) -> usize {
    12 + 16 * sfnt.tables.len()
        + sfnt
            .tables
            .iter()
            .map(|t| pad4(t.data.len()))
            .sum::<usize>()
}

#[cfg(test)]
pub(crate) mod fixture {
    /// Minimal sfnt with the given tables, laid out the usual way.
    pub fn sfnt(tables: &[(&[u8; 4], Vec<u8>)]) -> Vec<u8> {
        let num = tables.len() as u16;
        let mut out = Vec::new();
        out.extend_from_slice(&0x0001_0000u32.to_be_bytes());
        out.extend_from_slice(&num.to_be_bytes());
        out.extend_from_slice(&[0; 6]);

        let mut offset = 12 + 16 * tables.len();
        let mut body = Vec::new();
        for (tag, data) in tables {
            out.extend_from_slice(*tag);
            out.extend_from_slice(&0u32.to_be_bytes());
            out.extend_from_slice(&(offset as u32).to_be_bytes());
            out.extend_from_slice(&(data.len() as u32).to_be_bytes());
            body.extend_from_slice(data);
            while body.len() % 4 != 0 {
                body.push(0);
            }
            offset = 12 + 16 * tables.len() + body.len();
        }
        out.extend_from_slice(&body);
        out
    }

    /// Tables in tag order, with compressible content.
    pub fn sample() -> Vec<u8> {
        sfnt(&[
            (b"OS/2", vec![3; 96]),
            (b"cmap", b"abcd".repeat(64)),
            (b"glyf", (0..=255u8).cycle().take(301).collect()),
            (b"head", vec![0; 54]),
            (b"loca", vec![0, 0, 0, 10, 0, 20]),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pad4() {
        assert_eq!(pad4(0), 0);
        assert_eq!(pad4(1), 4);
        assert_eq!(pad4(4), 4);
        assert_eq!(pad4(301), 304);
    }

    #[test]
    fn test_sfnt_size_matches_fixture() {
        let data = fixture::sample();
        let sfnt = Sfnt::parse(&data).unwrap();
        assert_eq!(sfnt_size(&sfnt), data.len());
    }
}
