//! Tile grid and its run-length compression.
//!
//! Compressed layout: `runs: varu32`, then `runs × (len: varu32, tile: u8)`.
//! Run lengths must be non-zero and sum to [`TILE_COUNT`]. A uniform grid is
//! a single run and compresses to 3 bytes whatever the grid size.

use bitstream::{BitReader, BitWriter};

use crate::error::TileError;

/// Tiles per region side.
pub const REGION_SIZE: u8 = 8;

/// Tiles per region.
pub const TILE_COUNT: usize = REGION_SIZE as usize * REGION_SIZE as usize;

/// A small tile type code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TileType(pub u8);

/// The fixed-size tile grid of one region, row-major.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TileGrid {
    tiles: [TileType; TILE_COUNT],
}

impl Default for TileGrid {
    fn default() -> Self {
        Self::filled(TileType::default())
    }
}

impl TileGrid {
    /// A grid where every tile has the same type.
    #[must_use]
    pub const fn filled(tile: TileType) -> Self {
        Self {
            tiles: [tile; TILE_COUNT],
        }
    }

    /// Builds a grid from row-major tile codes.
    #[must_use]
    pub fn from_tiles(tiles: [TileType; TILE_COUNT]) -> Self {
        Self { tiles }
    }

    pub fn get(&self, x: u8, y: u8) -> Result<TileType, TileError> {
        Ok(self.tiles[index(x, y)?])
    }

    pub fn set(&mut self, x: u8, y: u8, tile: TileType) -> Result<(), TileError> {
        self.tiles[index(x, y)?] = tile;
        Ok(())
    }

    /// Row-major tile codes.
    #[must_use]
    pub fn as_slice(&self) -> &[TileType] {
        &self.tiles
    }
}

/// Returns `true` if `(x, y)` lies inside a region.
#[must_use]
pub const fn in_bounds(x: u8, y: u8) -> bool {
    x < REGION_SIZE && y < REGION_SIZE
}

fn index(x: u8, y: u8) -> Result<usize, TileError> {
    if !in_bounds(x, y) {
        return Err(TileError::OutOfBounds { x, y });
    }
    Ok(usize::from(y) * usize::from(REGION_SIZE) + usize::from(x))
}

/// Compresses a grid into runs.
pub fn compress(grid: &TileGrid) -> Result<Vec<u8>, TileError> {
    let runs = tile_runs(grid.as_slice());
    let mut writer = BitWriter::with_capacity(1 + runs.len() * 2);
    writer.write_varu32(runs.len() as u32)?;
    for (len, tile) in runs {
        writer.write_varu32(len)?;
        writer.write_u8_aligned(tile.0)?;
    }
    Ok(writer.finish())
}

/// Restores a grid from [`compress`] output. The whole buffer must be consumed.
pub fn decompress(bytes: &[u8]) -> Result<TileGrid, TileError> {
    let mut reader = BitReader::new(bytes);
    let mut grid = TileGrid::default();

    let runs = reader.read_varu32()? as usize;
    if runs > TILE_COUNT {
        return Err(TileError::LengthMismatch {
            expected: TILE_COUNT,
            actual: runs,
        });
    }

    let mut filled = 0usize;
    for _ in 0..runs {
        let len = reader.read_varu32()? as usize;
        let tile = TileType(reader.read_u8_aligned()?);
        if len == 0 {
            return Err(TileError::ZeroRun { offset: filled });
        }
        let end = filled.saturating_add(len);
        if end > TILE_COUNT {
            return Err(TileError::LengthMismatch {
                expected: TILE_COUNT,
                actual: end,
            });
        }
        grid.tiles[filled..end].fill(tile);
        filled = end;
    }

    if filled != TILE_COUNT {
        return Err(TileError::LengthMismatch {
            expected: TILE_COUNT,
            actual: filled,
        });
    }
    if !reader.is_empty() {
        return Err(TileError::TrailingBytes {
            remaining: reader.bits_remaining() / 8,
        });
    }
    Ok(grid)
}

fn tile_runs(tiles: &[TileType]) -> Vec<(u32, TileType)> {
    let Some((&first, rest)) = tiles.split_first() else {
        return Vec::new();
    };
    let mut runs = Vec::new();
    let mut current = first;
    let mut len = 1u32;
    for &tile in rest {
        if tile == current {
            len += 1;
            continue;
        }
        runs.push((len, current));
        current = tile;
        len = 1;
    }
    runs.push((len, current));
    runs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_grid_is_one_run() {
        let grid = TileGrid::filled(TileType(3));
        let bytes = compress(&grid).unwrap();
        assert_eq!(bytes, vec![1, TILE_COUNT as u8, 3]);
        assert_eq!(decompress(&bytes).unwrap(), grid);
    }

    #[test]
    fn mixed_grid_roundtrip() {
        let mut grid = TileGrid::filled(TileType(1));
        grid.set(0, 0, TileType(2)).unwrap();
        grid.set(7, 7, TileType(9)).unwrap();
        grid.set(3, 4, TileType(2)).unwrap();
        let bytes = compress(&grid).unwrap();
        let restored = decompress(&bytes).unwrap();
        assert_eq!(restored, grid);
        assert_eq!(restored.get(7, 7).unwrap(), TileType(9));
    }

    #[test]
    fn alternating_grid_roundtrip() {
        let mut tiles = [TileType(0); TILE_COUNT];
        for (i, tile) in tiles.iter_mut().enumerate() {
            *tile = TileType((i % 2) as u8);
        }
        let grid = TileGrid::from_tiles(tiles);
        let bytes = compress(&grid).unwrap();
        assert_eq!(bytes.len(), 1 + TILE_COUNT * 2);
        assert_eq!(decompress(&bytes).unwrap(), grid);
    }

    #[test]
    fn bounds() {
        let mut grid = TileGrid::default();
        assert!(in_bounds(7, 7));
        assert!(!in_bounds(8, 0));
        assert!(matches!(
            grid.set(0, 8, TileType(1)),
            Err(TileError::OutOfBounds { x: 0, y: 8 })
        ));
        assert!(grid.get(8, 8).is_err());
    }

    #[test]
    fn rejects_zero_run() {
        let err = decompress(&[2, 0, 1, 64, 1]).unwrap_err();
        assert!(matches!(err, TileError::ZeroRun { offset: 0 }));
    }

    #[test]
    fn rejects_short_and_long_coverage() {
        assert!(matches!(
            decompress(&[1, 63, 0]),
            Err(TileError::LengthMismatch {
                expected: TILE_COUNT,
                actual: 63
            })
        ));
        assert!(matches!(
            decompress(&[2, 60, 0, 5, 1]),
            Err(TileError::LengthMismatch { actual: 65, .. })
        ));
    }

    #[test]
    fn rejects_trailing_and_truncated() {
        assert!(matches!(
            decompress(&[1, 64, 0, 0]),
            Err(TileError::TrailingBytes { remaining: 1 })
        ));
        assert!(matches!(decompress(&[1, 64]), Err(TileError::Bit(_))));
        assert!(matches!(decompress(&[]), Err(TileError::Bit(_))));
    }

    #[test]
    fn rejects_absurd_run_count() {
        assert!(matches!(
            decompress(&[0xFF, 0x01]),
            Err(TileError::LengthMismatch { actual: 255, .. })
        ));
    }
}
