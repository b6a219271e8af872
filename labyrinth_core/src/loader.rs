//! Map loading.
//!
//! A map named `NAME` is a pair of sibling files: `NAME.txt`, the grid with one
//! character per tile, and `NAME.json`, the symbol document assigning a tile type
//! and display name to each character.

use std::{
    collections::{BTreeMap, BTreeSet},
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{
    config::LoaderConfig,
    error::{LoadError, MapError},
    map::LabyrinthMap,
    tile::{Tile, TileCatalog},
};

pub const MAP_EXTENSION: &str = "txt";
pub const SYMBOLS_EXTENSION: &str = "json";

/// What the symbol document says about one character.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolSpec {
    /// Catalog type name.
    #[serde(rename = "type", default)]
    pub tile_type: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub picture: Option<String>,
}

impl SymbolSpec {
    pub fn of_type(tile_type: impl Into<String>) -> Self {
        SymbolSpec {
            tile_type: Some(tile_type.into()),
            ..Default::default()
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_picture(mut self, picture: impl Into<String>) -> Self {
        self.picture = Some(picture.into());
        self
    }
}

/// Per-map assignment of characters to tile types.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolDocument {
    entries: BTreeMap<char, SymbolSpec>,
}

impl SymbolDocument {
    /// Parses a JSON object keyed by single characters.
    ///
    /// Keys that are not exactly one character are logged and skipped.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let raw: BTreeMap<String, SymbolSpec> = serde_json::from_str(json)?;
        let mut entries = BTreeMap::new();
        for (key, spec) in raw {
            let mut chars = key.chars();
            match (chars.next(), chars.next()) {
                (Some(symbol), None) => {
                    entries.insert(symbol, spec);
                }
                _ => warn!("Ignoring symbol document key {key:?}: expected a single character"),
            }
        }
        Ok(SymbolDocument { entries })
    }

    pub fn get(&self, symbol: char) -> Option<&SymbolSpec> {
        self.entries.get(&symbol)
    }

    pub fn insert(&mut self, symbol: char, spec: SymbolSpec) -> Option<SymbolSpec> {
        self.entries.insert(symbol, spec)
    }

    pub fn iter(&self) -> impl Iterator<Item = (char, &SymbolSpec)> {
        self.entries.iter().map(|(symbol, spec)| (*symbol, spec))
    }
}

impl FromIterator<(char, SymbolSpec)> for SymbolDocument {
    fn from_iter<I: IntoIterator<Item = (char, SymbolSpec)>>(iter: I) -> Self {
        SymbolDocument {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Paths of the two files making up a map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapFiles {
    pub text: PathBuf,
    pub symbols: PathBuf,
}

impl MapFiles {
    fn in_root(root: &Path, name: &str) -> Self {
        MapFiles {
            text: root.join(format!("{name}.{MAP_EXTENSION}")),
            symbols: root.join(format!("{name}.{SYMBOLS_EXTENSION}")),
        }
    }

    fn exist(&self) -> bool {
        self.text.is_file() && self.symbols.is_file()
    }
}

/// Result of loading a map, before random placement.
#[derive(Debug, Clone)]
pub struct LoadedMap {
    pub name: String,
    pub map: LabyrinthMap,
    /// Every character found in the map text.
    pub used_symbols: BTreeSet<char>,
    /// Tiles the symbol document asks to scatter over the map, one per entry.
    pub random_requests: Vec<Tile>,
}

/// Loads maps from an ordered list of root directories.
#[derive(Debug, Clone)]
pub struct MapLoader {
    config: LoaderConfig,
    catalog: TileCatalog,
}

impl MapLoader {
    pub fn new(config: LoaderConfig, catalog: TileCatalog) -> Self {
        MapLoader { config, catalog }
    }

    pub fn catalog(&self) -> &TileCatalog {
        &self.catalog
    }

    /// Finds the first root holding both files of `name`.
    pub fn locate(&self, name: &str) -> Result<MapFiles, LoadError> {
        self.config
            .map_roots
            .iter()
            .map(|root| MapFiles::in_root(root, name))
            .find(MapFiles::exist)
            .ok_or_else(|| LoadError::MapNotFound {
                name: name.to_string(),
                searched: self.config.map_roots.clone(),
            })
    }

    /// Locates, reads and parses the map called `name`.
    pub fn load(&self, name: &str) -> Result<LoadedMap, LoadError> {
        let files = self.locate(name)?;
        info!("Loading map '{name}' from {}", files.text.display());

        let text = read_file(&files.text)?;
        let json = read_file(&files.symbols)?;
        let symbols =
            SymbolDocument::from_json(&json).map_err(|source| LoadError::SymbolDocument {
                path: files.symbols.clone(),
                source,
            })?;

        let mut loaded = self.parse(&text, &symbols)?;
        loaded.name = name.to_string();
        Ok(loaded)
    }

    /// Builds a map from its text and symbol document.
    ///
    /// Each line is a row and each character a tile. A trailing line break on the
    /// last row is optional.
    pub fn parse(&self, text: &str, symbols: &SymbolDocument) -> Result<LoadedMap, MapError> {
        let mut used_symbols = BTreeSet::new();
        let rows: Vec<Vec<Tile>> = text
            .lines()
            .enumerate()
            .map(|(row, line)| {
                line.chars()
                    .enumerate()
                    .map(|(col, symbol)| {
                        used_symbols.insert(symbol);
                        self.resolve(symbol, symbols.get(symbol)).unwrap_or_else(|| {
                            warn!(
                                "Symbol {symbol:?} at ({row}, {col}) has no known tile type, using '{}'",
                                self.catalog.default_type().name
                            );
                            self.fallback(symbol, symbols.get(symbol))
                        })
                    })
                    .collect()
            })
            .collect();

        let map = LabyrinthMap::from_rows(rows);
        map.validate()?;

        let random_requests: Vec<Tile> = symbols
            .iter()
            .filter_map(|(symbol, spec)| self.resolve(symbol, Some(spec)))
            .filter(Tile::is_randomly_placed)
            .collect();
        debug!(
            "Parsed {} rows, {} random placement requests",
            map.row_count(),
            random_requests.len()
        );

        Ok(LoadedMap {
            name: String::new(),
            map,
            used_symbols,
            random_requests,
        })
    }

    /// Instantiates the catalog type named by `spec` with its overrides applied.
    ///
    /// Returns `None` if the spec is absent, names no type, or names an unknown one.
    fn resolve(&self, symbol: char, spec: Option<&SymbolSpec>) -> Option<Tile> {
        let spec = spec?;
        let kind = self.catalog.get(spec.tile_type.as_deref()?)?;
        let mut tile = Tile::new(kind);
        tile.symbol = symbol;
        apply_overrides(&mut tile, spec);
        Some(tile)
    }

    fn fallback(&self, symbol: char, spec: Option<&SymbolSpec>) -> Tile {
        let mut tile = self.catalog.default_tile();
        tile.symbol = symbol;
        if let Some(spec) = spec {
            apply_overrides(&mut tile, spec);
        }
        tile
    }
}

fn apply_overrides(tile: &mut Tile, spec: &SymbolSpec) {
    if let Some(name) = &spec.name {
        tile.name.clone_from(name);
    }
    if let Some(picture) = &spec.picture {
        tile.picture = Some(picture.clone());
    }
}

fn read_file(path: &Path) -> Result<String, LoadError> {
    fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}
