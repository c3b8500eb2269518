use bytemuck::{Pod, Zeroable};

/// One sprite vertex: local position plus sprite-sheet UV.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct SpriteVertex {
    pub position: [f32; 2],
    pub uv: [f32; 2],
}

/// Tile selection inside a sprite sheet, in pixels and tile indices.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SheetTile {
    /// Sheet size in pixels.
    pub sheet_size: (f32, f32),
    /// Size of one tile in pixels.
    pub tile_size: (f32, f32),
    /// Column / row of the tile.
    pub tile: (f32, f32),
}

impl Default for SheetTile {
    fn default() -> Self {
        Self {
            sheet_size: (260.0, 261.0),
            tile_size: (65.0, 65.0),
            tile: (2.0, 4.0),
        }
    }
}

impl SheetTile {
    /// UV of the tile corner offset by `(i, j)` tiles from its top-left.
    #[inline]
    fn uv(&self, i: f32, j: f32) -> [f32; 2] {
        [
            (self.tile.0 + i) * (self.tile_size.0 / self.sheet_size.0),
            (self.tile.1 + j) * (self.tile_size.1 / self.sheet_size.1),
        ]
    }
}

/// Fixed quad for the sprite, expanded to a 6-vertex triangle list.
///
/// Corners: v0 bottom-left, v1 bottom-right, v2 top-right, v3 top-left;
/// triangles are (v0, v1, v3) and (v1, v2, v3).
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteGeometry {
    vertices: [SpriteVertex; 6],
}

impl SpriteGeometry {
    pub fn quad(width: f32, height: f32, tile: SheetTile) -> Self {
        let (hw, hh) = (0.5 * width, 0.5 * height);

        let v0 = SpriteVertex { position: [-hw, -hh], uv: tile.uv(0.0, 1.0) };
        let v1 = SpriteVertex { position: [hw, -hh], uv: tile.uv(1.0, 1.0) };
        let v2 = SpriteVertex { position: [hw, hh], uv: tile.uv(1.0, 0.0) };
        let v3 = SpriteVertex { position: [-hw, hh], uv: tile.uv(0.0, 0.0) };

        Self { vertices: [v0, v1, v3, v1, v2, v3] }
    }

    #[inline]
    pub fn vertices(&self) -> &[SpriteVertex] {
        &self.vertices
    }

    #[inline]
    pub fn vertex_count(&self) -> u32 {
        self.vertices.len() as u32
    }
}

impl Default for SpriteGeometry {
    fn default() -> Self {
        Self::quad(1.0, 1.0, SheetTile::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn quad_is_six_vertices_with_shared_corners() {
        let g = SpriteGeometry::default();
        let v = g.vertices();
        assert_eq!(g.vertex_count(), 6);
        assert_eq!(v[1], v[3]);
        assert_eq!(v[2], v[5]);
        assert_eq!(v[0].position, [-0.5, -0.5]);
        assert_eq!(v[4].position, [0.5, 0.5]);
    }

    #[test]
    fn uvs_select_the_configured_tile() {
        let g = SpriteGeometry::default();
        let v = g.vertices();
        // v0: column 2, row 5 edge.
        assert_relative_eq!(v[0].uv[0], 2.0 * (65.0 / 260.0));
        assert_relative_eq!(v[0].uv[1], 5.0 * (65.0 / 261.0));
        // v2 (index 4): column 3, row 4 edge.
        assert_relative_eq!(v[4].uv[0], 3.0 * (65.0 / 260.0));
        assert_relative_eq!(v[4].uv[1], 4.0 * (65.0 / 261.0));
    }

    #[test]
    fn size_scales_positions_only() {
        let tile = SheetTile::default();
        let big = SpriteGeometry::quad(4.0, 2.0, tile);
        let unit = SpriteGeometry::quad(1.0, 1.0, tile);
        assert_eq!(big.vertices()[4].position, [2.0, 1.0]);
        for (a, b) in big.vertices().iter().zip(unit.vertices()) {
            assert_eq!(a.uv, b.uv);
        }
    }
}
