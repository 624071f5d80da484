//! Tile map for the overworld trail.
//!
//! Parsed from a character grid: `g` grass, `r`/`p` path, `t` thicket
//! (encounter zone), `#` tree, `w` water. Trees and water block movement.
//! A path tile on the east edge is the demo exit.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("failed to read map file: {0}")]
    Io(#[from] std::io::Error),
    #[error("map has no tiles")]
    Empty,
    #[error("map has no walkable tile")]
    NoStart,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum Tile {
    Grass,
    Path,
    Thicket,
    Tree,
    Water,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MapState {
    pub name: String,
    pub width: u16,
    pub height: u16,
    pub tiles: Vec<Tile>,
}

const TRAIL_MAP: &str = r#"
########################################
#gggggggggggggggggggggggggggggggggggggg#
#ggggttttttggggggggggggggttttttttgggggg#
#gggttttttttgggggggggggggttttttttttgggg#
#ggggttttttggggggggggggggttttttttgggggg#
#gggggggggggggggggggggggggggggggggggggg#
#rrrrrrrrrrrrrrrrrrrrrrrrrrrrrrrrrrrrrrr
#gggggggggggggggggggggggggggggggggggggg#
#gggggwwwwwwwgggggggggggggggggggggggggg#
#ggggwwwwwwwwwgggggggggggggtttttttggggg#
#gggggwwwwwwwgggggggggggggtttttttttgggg#
#ggggggggggggggggggggggggggtttttttggggg#
#ggggggttttttttttgggggggggggggggggggggg#
#gggggttttttttttttggggggggggggggggggggg#
#gggggggggggggggggggggggggggggggggggggg#
########################################
"#;

impl MapState {
    pub fn trail() -> Self {
        Self::from_str("BRAMBLEWOOD TRAIL", TRAIL_MAP).expect("builtin map is valid")
    }

    pub fn load(path: &std::path::Path) -> Result<Self, MapError> {
        let contents = std::fs::read_to_string(path)?;
        let name = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("custom map")
            .to_ascii_uppercase();
        Self::from_str(&name, &contents)
    }

    pub fn from_str(name: &str, map_str: &str) -> Result<Self, MapError> {
        let lines: Vec<&str> = map_str
            .lines()
            .map(|line| line.trim())
            .filter(|line| !line.is_empty())
            .collect();
        if lines.is_empty() {
            return Err(MapError::Empty);
        }

        let height = lines.len();
        let width = lines.iter().map(|line| line.chars().count()).max().unwrap_or(0);
        if width == 0 {
            return Err(MapError::Empty);
        }

        let mut tiles = Vec::with_capacity(width * height);
        for line in &lines {
            let chars: Vec<char> = line.chars().collect();
            for x in 0..width {
                let ch = chars.get(x).copied().unwrap_or('#');
                tiles.push(Self::char_to_tile(ch));
            }
        }

        let map = Self {
            name: name.to_string(),
            width: width as u16,
            height: height as u16,
            tiles,
        };
        if map.scan_start().is_none() {
            return Err(MapError::NoStart);
        }
        Ok(map)
    }

    fn char_to_tile(ch: char) -> Tile {
        match ch {
            'r' | 'R' | 'p' | 'P' => Tile::Path,
            't' | 'T' => Tile::Thicket,
            '#' | 'x' | 'X' => Tile::Tree,
            'w' | 'W' => Tile::Water,
            _ => Tile::Grass,
        }
    }

    /// First path tile, or any walkable tile when the map carries no path.
    pub fn start_pos(&self) -> (u16, u16) {
        self.scan_start().unwrap_or((0, 0))
    }

    fn scan_start(&self) -> Option<(u16, u16)> {
        let mut fallback = None;
        for y in 0..self.height {
            for x in 0..self.width {
                match self.tile(x, y) {
                    Tile::Path => return Some((x, y)),
                    tile if !matches!(tile, Tile::Tree | Tile::Water) && fallback.is_none() => {
                        fallback = Some((x, y));
                    }
                    _ => {}
                }
            }
        }
        fallback
    }

    pub fn tile(&self, x: u16, y: u16) -> Tile {
        if x >= self.width || y >= self.height {
            return Tile::Tree;
        }
        let idx = (y as usize * self.width as usize) + x as usize;
        self.tiles.get(idx).copied().unwrap_or(Tile::Tree)
    }

    pub fn is_walkable(&self, x: u16, y: u16) -> bool {
        !matches!(self.tile(x, y), Tile::Tree | Tile::Water)
    }

    pub fn is_thicket(&self, x: u16, y: u16) -> bool {
        matches!(self.tile(x, y), Tile::Thicket)
    }

    /// Walking onto the east edge ends the demo.
    pub fn is_east_exit(&self, x: u16) -> bool {
        x + 1 >= self.width
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_trail_parses() {
        let map = MapState::trail();
        assert!(map.width > 0 && map.height > 0);
        let (x, y) = map.start_pos();
        assert_eq!(map.tile(x, y), Tile::Path);
    }

    #[test]
    fn empty_input_is_rejected() {
        assert!(matches!(
            MapState::from_str("empty", "   \n  "),
            Err(MapError::Empty)
        ));
    }

    #[test]
    fn all_solid_map_is_rejected() {
        assert!(matches!(
            MapState::from_str("walls", "###\n#w#\n###"),
            Err(MapError::NoStart)
        ));
    }

    #[test]
    fn walkability_and_zones() {
        let map = MapState::from_str("test", "####\n#rt#\n####").expect("valid map");
        assert_eq!(map.start_pos(), (1, 1));
        assert!(map.is_walkable(2, 1));
        assert!(map.is_thicket(2, 1));
        assert!(!map.is_walkable(0, 0));
        // out of bounds reads as solid
        assert!(!map.is_walkable(40, 40));
    }

    #[test]
    fn ragged_rows_fill_with_trees() {
        let map = MapState::from_str("ragged", "rrrr\nrr").expect("valid map");
        assert_eq!(map.width, 4);
        assert!(!map.is_walkable(3, 1));
    }
}
