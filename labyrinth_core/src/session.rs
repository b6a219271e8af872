use std::collections::BTreeSet;

use rand::Rng;
use tracing::info;

use crate::{
    Action, Position,
    conditions::Conditions,
    error::{MapError, SessionError},
    loader::{LoadedMap, MapLoader},
    map::LabyrinthMap,
    movement::{MoveOutcome, apply_action},
    placement::place_randomly,
    player::{Inventory, PlayerState},
    tile::{Tile, TileCatalog},
};

/// Symbols tried, in order, when the catalog's player symbol already appears on the map.
pub const PLAYER_SYMBOLS: &str = "X@&%$PpABCDFHJKLMNOQRUVWYZ";

/// Where a session stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    InProgress,
    /// Reached an exit with every condition satisfied.
    Won,
    /// Reached an exit without satisfying the conditions.
    Lost,
    Quit,
}

/// What one map slot shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapCell<'a> {
    /// The player, drawn over the tile it stands on.
    Player(char),
    Tile(&'a Tile),
}

impl MapCell<'_> {
    pub fn symbol(&self) -> char {
        match self {
            MapCell::Player(symbol) => *symbol,
            MapCell::Tile(tile) => tile.symbol,
        }
    }
}

/// One playthrough: the map, the player and the conditions to meet.
#[derive(Debug, Clone)]
pub struct Session {
    name: String,
    map: LabyrinthMap,
    catalog: TileCatalog,
    player: PlayerState,
    conditions: Conditions,
    used_symbols: BTreeSet<char>,
    quit: bool,
}

impl Session {
    /// Loads `map_name` and assembles a session around it.
    pub fn create<R>(
        loader: &MapLoader,
        map_name: &str,
        conditions: Conditions,
        player_name: &str,
        rng: &mut R,
    ) -> Result<Self, SessionError>
    where
        R: Rng + ?Sized,
    {
        let loaded = loader.load(map_name)?;
        Self::from_loaded(loaded, loader.catalog().clone(), conditions, player_name, rng)
    }

    /// Assembles a session from an already parsed map.
    ///
    /// Runs random placement, picks a player symbol not used by the map, and
    /// seeds the inventory with every pickable item name on the map. The player
    /// is not placed until [`Session::begin`].
    pub fn from_loaded<R>(
        loaded: LoadedMap,
        catalog: TileCatalog,
        conditions: Conditions,
        player_name: &str,
        rng: &mut R,
    ) -> Result<Self, SessionError>
    where
        R: Rng + ?Sized,
    {
        let LoadedMap {
            name,
            mut map,
            mut used_symbols,
            random_requests,
        } = loaded;

        place_randomly(&mut map, &random_requests, rng)?;
        used_symbols.extend(random_requests.iter().map(|tile| tile.symbol));

        let symbol =
            pick_player_symbol(&catalog, &used_symbols).ok_or(SessionError::NoPlayerSymbol)?;
        let inventory = Inventory::seeded(
            map.tiles()
                .filter(|(_, tile)| tile.is_pickable())
                .map(|(_, tile)| tile.name.clone()),
        );

        Ok(Session {
            name,
            map,
            catalog,
            player: PlayerState::new(player_name, symbol, inventory),
            conditions,
            used_symbols,
            quit: false,
        })
    }

    /// Puts the player on the start tile.
    pub fn begin(&mut self) -> Result<Position, MapError> {
        let start = self.map.start_position()?;
        self.map.exit_positions()?;
        self.player.position = Some(start);
        info!(
            "Session '{}' started for {} at ({}, {})",
            self.name, self.player.name, start.row, start.col
        );
        Ok(start)
    }

    /// Applies one player action.
    ///
    /// Does nothing once the session is finished.
    pub fn apply(&mut self, action: Action) -> MoveOutcome {
        if self.is_finished() {
            return MoveOutcome::rejected();
        }
        let outcome = apply_action(&mut self.map, &self.catalog, &mut self.player, action);
        if self.reached_exit() {
            if !self.conditions.is_satisfied(&self.player) {
                self.player.alive = false;
            }
            info!("Session '{}' finished: {:?}", self.name, self.outcome());
        }
        outcome
    }

    /// Raises the quit signal.
    pub fn quit(&mut self) {
        self.quit = true;
    }

    pub fn is_finished(&self) -> bool {
        self.quit || self.reached_exit()
    }

    pub fn outcome(&self) -> Outcome {
        if self.quit {
            Outcome::Quit
        } else if !self.reached_exit() {
            Outcome::InProgress
        } else if self.player.alive && self.conditions.is_satisfied(&self.player) {
            Outcome::Won
        } else {
            Outcome::Lost
        }
    }

    fn reached_exit(&self) -> bool {
        self.player
            .position
            .is_some_and(|position| self.map.is_exit(position))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn map(&self) -> &LabyrinthMap {
        &self.map
    }

    pub fn catalog(&self) -> &TileCatalog {
        &self.catalog
    }

    pub fn player(&self) -> &PlayerState {
        &self.player
    }

    pub fn conditions(&self) -> &Conditions {
        &self.conditions
    }

    /// Every symbol shown by the map, including randomly placed items.
    pub fn used_symbols(&self) -> &BTreeSet<char> {
        &self.used_symbols
    }

    pub fn tiles(&self) -> impl Iterator<Item = (Position, &Tile)> {
        self.map.tiles()
    }

    /// The map row by row, with the player drawn over its tile.
    pub fn cells(&self) -> Vec<Vec<MapCell<'_>>> {
        let mut rows = vec![Vec::new(); self.map.row_count()];
        for (position, tile) in self.map.tiles() {
            let cell = if self.player.position == Some(position) {
                MapCell::Player(self.player.symbol)
            } else {
                MapCell::Tile(tile)
            };
            rows[position.row].push(cell);
        }
        rows
    }

    /// [`Session::cells`] as plain symbol strings.
    pub fn rows(&self) -> Vec<String> {
        self.cells()
            .iter()
            .map(|row| row.iter().map(MapCell::symbol).collect())
            .collect()
    }
}

fn pick_player_symbol(catalog: &TileCatalog, used: &BTreeSet<char>) -> Option<char> {
    catalog
        .player_type()
        .map(|player| player.symbol)
        .into_iter()
        .chain(PLAYER_SYMBOLS.chars())
        .find(|symbol| !used.contains(symbol))
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;
    use crate::{
        Direction,
        config::LoaderConfig,
        error::PlacementError,
        loader::{SymbolDocument, SymbolSpec},
        tile::{EXIT, GROUND, INVENTORY, START, WALL},
    };

    fn document() -> SymbolDocument {
        [
            ('#', SymbolSpec::of_type(WALL)),
            ('.', SymbolSpec::of_type(GROUND)),
            ('s', SymbolSpec::of_type(START)),
            ('g', SymbolSpec::of_type(EXIT)),
            ('n', SymbolSpec::of_type(INVENTORY).named("needle")),
        ]
        .into_iter()
        .collect()
    }

    fn session(text: &str, document: &SymbolDocument, conditions: Conditions) -> Session {
        let loader = MapLoader::new(LoaderConfig::new(vec![]), TileCatalog::default());
        let loaded = loader.parse(text, document).unwrap();
        Session::from_loaded(
            loaded,
            TileCatalog::default(),
            conditions,
            "tom",
            &mut StdRng::seed_from_u64(3),
        )
        .unwrap()
    }

    #[test]
    fn player_is_unplaced_until_begin() {
        let mut session = session("s..\n..g", &document(), Conditions::new());
        assert_eq!(session.player().position, None);
        assert_eq!(session.outcome(), Outcome::InProgress);
        assert_eq!(session.begin(), Ok(Position::new(0, 0)));
        assert_eq!(session.player().position, Some(Position::new(0, 0)));
    }

    #[test]
    fn inventory_is_seeded_with_placed_items() {
        let session = session("s..\n..g", &document(), Conditions::new());
        assert_eq!(session.player().inventory.count("needle"), 0);
        assert_eq!(session.player().inventory.iter().count(), 1);
        assert_eq!(session.map().pickable_tile_positions().len(), 1);
        assert!(session.used_symbols().contains(&'n'));
    }

    #[test]
    fn player_symbol_avoids_map_symbols() {
        let session = session("sX.\n..g", &document(), Conditions::new());
        assert_eq!(session.player().symbol, '@');
    }

    #[test]
    fn exhausted_player_symbols_fail_session() {
        let text: String = PLAYER_SYMBOLS.chars().chain("s.g".chars()).collect();
        let loader = MapLoader::new(LoaderConfig::new(vec![]), TileCatalog::default());
        let loaded = loader.parse(&text, &document()).unwrap();
        let err = Session::from_loaded(
            loaded,
            TileCatalog::default(),
            Conditions::new(),
            "tom",
            &mut StdRng::seed_from_u64(0),
        )
        .unwrap_err();
        assert!(matches!(err, SessionError::NoPlayerSymbol));
    }

    #[test]
    fn session_cannot_start_without_room_for_items() {
        let mut document = document();
        document.insert('t', SymbolSpec::of_type(INVENTORY).named("tube"));
        let loader = MapLoader::new(LoaderConfig::new(vec![]), TileCatalog::default());
        let loaded = loader.parse("s.g", &document).unwrap();
        let err = Session::from_loaded(
            loaded,
            TileCatalog::default(),
            Conditions::new(),
            "tom",
            &mut StdRng::seed_from_u64(0),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            SessionError::Placement(PlacementError::InsufficientSpace {
                requested: 2,
                available: 1,
            })
        ));
        assert_eq!(
            err.to_string(),
            "Not enough free walkable tiles for random placement: 2 requested, 1 available"
        );
    }

    #[test]
    fn items_in_map_text_survive_placement() {
        let mut document = document();
        document.insert('t', SymbolSpec::of_type(INVENTORY).named("tube"));
        let loader = MapLoader::new(LoaderConfig::new(vec![]), TileCatalog::default());

        for seed in 0..50 {
            let loaded = loader.parse("sn...g", &document).unwrap();
            let session = Session::from_loaded(
                loaded,
                TileCatalog::default(),
                Conditions::new(),
                "tom",
                &mut StdRng::seed_from_u64(seed),
            )
            .unwrap();
            assert_eq!(session.map().pickable_tile_positions().len(), 3);
            assert_eq!(
                session.map().tile(Position::new(0, 1)).map(|tile| tile.name.as_str()),
                Some("needle")
            );
        }
    }

    fn two_tile_session(conditions: Conditions) -> Session {
        session(
            "sg",
            &SymbolDocument::from_iter([
                ('s', SymbolSpec::of_type(START)),
                ('g', SymbolSpec::of_type(EXIT)),
            ]),
            conditions,
        )
    }

    #[test]
    fn reaching_exit_with_no_conditions_wins() {
        let mut session = two_tile_session(Conditions::new());
        session.begin().unwrap();
        let outcome = session.apply(Action::Move(Direction::Right));
        assert!(outcome.moved());
        assert!(session.is_finished());
        assert_eq!(session.outcome(), Outcome::Won);
        assert!(session.player().alive);
    }

    #[test]
    fn collecting_target_items_then_exiting_wins() {
        let mut session = session(
            "s.g",
            &document(),
            Conditions::target_inventory([("needle", 1)]),
        );
        session.begin().unwrap();
        // The needle can only land on the single free tile.
        assert_eq!(
            session.map().pickable_tile_positions(),
            vec![Position::new(0, 1)]
        );

        let outcome = session.apply(Action::Move(Direction::Right));
        assert_eq!(outcome.picked_up.as_deref(), Some("needle"));
        assert!(!session.is_finished());
        session.apply(Action::Move(Direction::Right));
        assert_eq!(session.outcome(), Outcome::Won);
    }

    #[test]
    fn reaching_exit_without_items_loses() {
        let mut session = two_tile_session(Conditions::target_inventory([("needle", 1)]));
        session.begin().unwrap();
        session.apply(Action::Move(Direction::Right));
        assert!(session.is_finished());
        assert_eq!(session.outcome(), Outcome::Lost);
        assert!(!session.player().alive);
    }

    #[test]
    fn finished_session_ignores_moves() {
        let mut session = two_tile_session(Conditions::target_inventory([("needle", 1)]));
        session.begin().unwrap();
        session.apply(Action::Move(Direction::Right));
        let outcome = session.apply(Action::Move(Direction::Left));
        assert!(!outcome.moved());
        assert_eq!(session.player().position, Some(Position::new(0, 1)));
    }

    #[test]
    fn quit_finishes_session() {
        let mut session = session("s..\n..g", &document(), Conditions::new());
        session.begin().unwrap();
        session.quit();
        assert!(session.is_finished());
        assert_eq!(session.outcome(), Outcome::Quit);
    }

    #[test]
    fn rows_overlay_player() {
        let mut session = session(
            "#s#\n#g#",
            &SymbolDocument::from_iter([
                ('#', SymbolSpec::of_type(WALL)),
                ('s', SymbolSpec::of_type(START)),
                ('g', SymbolSpec::of_type(EXIT)),
            ]),
            Conditions::new(),
        );
        assert_eq!(session.rows(), vec!["#s#", "#g#"]);
        session.begin().unwrap();
        assert_eq!(session.rows(), vec!["#X#", "#g#"]);
        let cells = session.cells();
        assert_eq!(cells[0][1], MapCell::Player('X'));
        assert!(matches!(cells[1][1], MapCell::Tile(tile) if tile.is_exit()));
    }
}
