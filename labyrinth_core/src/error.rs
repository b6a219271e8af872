use std::path::PathBuf;

/// Errors raised while registering tile types in a [`crate::TileCatalog`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("Tile type '{0}' is already registered")]
    DuplicateName(String),
    #[error("Tile type '{0}' cannot be both a start and an exit")]
    StartAndExit(String),
}

/// Errors raised while locating or reading map files.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Map '{name}' not found: no directory among {searched:?} contains both {name}.txt and {name}.json")]
    MapNotFound { name: String, searched: Vec<PathBuf> },
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse symbol document {path}: {source}")]
    SymbolDocument {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Map(#[from] MapError),
}

/// Structural problems with a loaded grid.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MapError {
    #[error("Map has no start tile")]
    MissingStart,
    #[error("Map has {0} start tiles, expected exactly one")]
    MultipleStarts(usize),
    #[error("Map has no exit tile")]
    MissingExit,
}

/// Raised when random placement runs out of candidate tiles.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlacementError {
    #[error(
        "Not enough free walkable tiles for random placement: {requested} requested, {available} available"
    )]
    InsufficientSpace { requested: usize, available: usize },
}

/// Errors that prevent a session from being created or started.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Placement(#[from] PlacementError),
    #[error("Every reserved player symbol is already used by the map")]
    NoPlayerSymbol,
}
