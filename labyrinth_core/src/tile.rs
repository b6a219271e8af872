use std::{collections::BTreeMap, sync::Arc};

use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

pub const PLAYER: &str = "player";
pub const START: &str = "start";
pub const GROUND: &str = "ground";
pub const WALL: &str = "wall";
pub const INVENTORY: &str = "inventory";
pub const EXIT: &str = "exit";
pub const GUARD: &str = "guard";

/// Immutable specification of a tile type held by the [`TileCatalog`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileType {
    /// Catalog key, unique within a catalog.
    pub name: String,
    /// Name given to instances that don't override it.
    pub default_name: String,
    pub symbol: char,
    pub walkable: bool,
    pub pickable: bool,
    pub randomly_placed: bool,
    pub is_start: bool,
    pub is_exit: bool,
    pub is_player: bool,
    pub picture: Option<String>,
}

impl TileType {
    /// Creates a non-walkable type with every flag cleared.
    pub fn new(name: impl Into<String>, symbol: char) -> Self {
        let name = name.into();
        TileType {
            default_name: name.clone(),
            name,
            symbol,
            walkable: false,
            pickable: false,
            randomly_placed: false,
            is_start: false,
            is_exit: false,
            is_player: false,
            picture: None,
        }
    }

    pub fn default_name(mut self, default_name: impl Into<String>) -> Self {
        self.default_name = default_name.into();
        self
    }

    pub fn walkable(mut self) -> Self {
        self.walkable = true;
        self
    }

    pub fn pickable(mut self) -> Self {
        self.pickable = true;
        self
    }

    pub fn randomly_placed(mut self) -> Self {
        self.randomly_placed = true;
        self
    }

    pub fn start(mut self) -> Self {
        self.is_start = true;
        self
    }

    pub fn exit(mut self) -> Self {
        self.is_exit = true;
        self
    }

    pub fn player(mut self) -> Self {
        self.is_player = true;
        self
    }
}

/// A tile occupying one grid slot.
///
/// The behaviour comes from the shared [`TileType`]; the display fields may be
/// overridden per map by the symbol document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tile {
    kind: Arc<TileType>,
    pub symbol: char,
    pub name: String,
    pub picture: Option<String>,
}

impl Tile {
    /// Instantiates a tile with the type's default symbol, name and picture.
    pub fn new(kind: &Arc<TileType>) -> Self {
        Tile {
            symbol: kind.symbol,
            name: kind.default_name.clone(),
            picture: kind.picture.clone(),
            kind: Arc::clone(kind),
        }
    }

    pub fn type_name(&self) -> &str {
        &self.kind.name
    }

    #[inline]
    pub fn is_walkable(&self) -> bool {
        self.kind.walkable
    }

    #[inline]
    pub fn is_pickable(&self) -> bool {
        self.kind.pickable
    }

    #[inline]
    pub fn is_randomly_placed(&self) -> bool {
        self.kind.randomly_placed
    }

    #[inline]
    pub fn is_start(&self) -> bool {
        self.kind.is_start
    }

    #[inline]
    pub fn is_exit(&self) -> bool {
        self.kind.is_exit
    }

    /// Start and exit tiles are excluded from random placement.
    pub fn is_special(&self) -> bool {
        self.kind.is_start || self.kind.is_exit
    }
}

/// Registry of known tile types.
///
/// Every catalog carries a default type used whenever a symbol cannot be
/// resolved; the built-in catalog uses `ground`.
#[derive(Debug, Clone)]
pub struct TileCatalog {
    types: BTreeMap<String, Arc<TileType>>,
    default_type: Arc<TileType>,
}

impl TileCatalog {
    /// Creates a catalog holding only the given default type.
    pub fn with_default(default_type: TileType) -> Result<Self, CatalogError> {
        validate(&default_type)?;
        let default_type = Arc::new(default_type);
        let mut types = BTreeMap::new();
        types.insert(default_type.name.clone(), Arc::clone(&default_type));
        Ok(TileCatalog {
            types,
            default_type,
        })
    }

    /// Adds a tile type, rejecting duplicate names and types flagged as both
    /// start and exit.
    pub fn register(&mut self, tile_type: TileType) -> Result<(), CatalogError> {
        validate(&tile_type)?;
        if self.types.contains_key(&tile_type.name) {
            return Err(CatalogError::DuplicateName(tile_type.name));
        }
        self.types
            .insert(tile_type.name.clone(), Arc::new(tile_type));
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Arc<TileType>> {
        self.types.get(name)
    }

    pub fn default_type(&self) -> &Arc<TileType> {
        &self.default_type
    }

    /// A fresh instance of the default type.
    pub fn default_tile(&self) -> Tile {
        Tile::new(&self.default_type)
    }

    /// The first registered type flagged as the player, if any.
    pub fn player_type(&self) -> Option<&Arc<TileType>> {
        self.types.values().find(|t| t.is_player)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl Default for TileCatalog {
    /// The built-in catalog: `player, start, ground, wall, inventory, exit, guard`.
    fn default() -> Self {
        let mut types = BTreeMap::new();
        let builtin = [
            TileType::new(PLAYER, 'X').walkable().player(),
            TileType::new(START, 's').walkable().start(),
            TileType::new(GROUND, ' ').walkable(),
            TileType::new(WALL, '#'),
            TileType::new(INVENTORY, 'i')
                .default_name("inventory_object")
                .walkable()
                .pickable()
                .randomly_placed(),
            TileType::new(EXIT, 'E').walkable().exit(),
            // Stands on the exit; inert.
            TileType::new(GUARD, 'g').walkable().exit(),
        ];
        for tile_type in builtin {
            types.insert(tile_type.name.clone(), Arc::new(tile_type));
        }
        let default_type = Arc::clone(&types[GROUND]);
        TileCatalog {
            types,
            default_type,
        }
    }
}

fn validate(tile_type: &TileType) -> Result<(), CatalogError> {
    if tile_type.is_start && tile_type.is_exit {
        return Err(CatalogError::StartAndExit(tile_type.name.clone()));
    }
    Ok(())
}
