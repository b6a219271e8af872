use tracing::{debug, warn};

use crate::{
    Action, Delta, Position, map::LabyrinthMap, player::PlayerState, tile::TileCatalog,
};

/// Represents the outcome of processing one player action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveOutcome {
    /// The step actually taken, [`Delta::ZERO`] if the move was rejected.
    pub delta: Delta,
    /// Name of the item picked up on arrival.
    pub picked_up: Option<String>,
}

impl MoveOutcome {
    pub const fn rejected() -> Self {
        MoveOutcome {
            delta: Delta::ZERO,
            picked_up: None,
        }
    }

    pub fn moved(&self) -> bool {
        !self.delta.is_zero()
    }
}

/// Processes a single action for the player.
///
/// Moves off the map or onto a non-walkable tile leave everything unchanged.
/// Stepping onto a pickable tile adds one of it to the inventory and replaces
/// the tile with a fresh default tile.
pub fn apply_action(
    map: &mut LabyrinthMap,
    catalog: &TileCatalog,
    player: &mut PlayerState,
    action: Action,
) -> MoveOutcome {
    let direction = match action {
        Action::Wait => return MoveOutcome::rejected(),
        Action::Move(direction) => direction,
    };
    let Some(current) = player.position else {
        warn!("Ignoring {direction:?}: player has not been placed on the map");
        return MoveOutcome::rejected();
    };

    let delta = direction.delta();
    let target = current.offset(delta);
    if !can_enter(map, target) {
        debug!("Move {direction:?} from ({}, {}) rejected", current.row, current.col);
        return MoveOutcome::rejected();
    }

    player.position = Some(target);
    let picked_up = if map.is_pickable(target) {
        map.replace(target, catalog.default_tile()).map(|item| {
            let count = player.inventory.add(&item.name);
            debug!("Picked up '{}' ({count} held)", item.name);
            item.name
        })
    } else {
        None
    };

    MoveOutcome { delta, picked_up }
}

fn can_enter(map: &LabyrinthMap, target: Position) -> bool {
    map.is_on_map(target) && map.is_walkable(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        Direction,
        player::Inventory,
        tile::{EXIT, GROUND, INVENTORY, START, Tile, WALL},
    };

    fn setup(text: &str) -> (LabyrinthMap, TileCatalog, PlayerState) {
        let catalog = TileCatalog::default();
        let rows = text
            .lines()
            .map(|line| {
                line.chars()
                    .map(|c| {
                        let kind = match c {
                            '#' => WALL,
                            's' => START,
                            'g' => EXIT,
                            'n' => INVENTORY,
                            _ => GROUND,
                        };
                        let mut tile = Tile::new(catalog.get(kind).unwrap());
                        if c == 'n' {
                            tile.name = "needle".to_string();
                        }
                        tile
                    })
                    .collect()
            })
            .collect();
        let map = LabyrinthMap::from_rows(rows);
        let mut player = PlayerState::new("tom", 'X', Inventory::seeded(["needle"]));
        player.position = map.start_position().ok();
        (map, catalog, player)
    }

    #[test]
    fn moves_onto_walkable_tile() {
        let (mut map, catalog, mut player) = setup("#s#\n#.#\n#g#");
        let outcome = apply_action(&mut map, &catalog, &mut player, Action::Move(Direction::Down));
        assert_eq!(outcome.delta, Delta { row: 1, col: 0 });
        assert!(outcome.moved());
        assert_eq!(player.position, Some(Position::new(1, 1)));
    }

    #[test]
    fn walls_and_map_edges_reject_the_move() {
        let (mut map, catalog, mut player) = setup("#s#\n#.#\n#g#");
        let before = player.clone();
        for direction in [Direction::Left, Direction::Right, Direction::Up] {
            let outcome = apply_action(&mut map, &catalog, &mut player, Action::Move(direction));
            assert_eq!(outcome, MoveOutcome::rejected());
            assert_eq!(player, before);
        }
    }

    #[test]
    fn wait_is_a_no_op() {
        let (mut map, catalog, mut player) = setup("s.g");
        let before = player.clone();
        assert_eq!(
            apply_action(&mut map, &catalog, &mut player, Action::Wait),
            MoveOutcome::rejected()
        );
        assert_eq!(player, before);
    }

    #[test]
    fn unplaced_player_does_not_move() {
        let (mut map, catalog, mut player) = setup("s.g");
        player.position = None;
        let outcome = apply_action(&mut map, &catalog, &mut player, Action::Move(Direction::Right));
        assert!(!outcome.moved());
        assert_eq!(player.position, None);
    }

    #[test]
    fn pickup_is_consumed_once() {
        let (mut map, catalog, mut player) = setup("sn.g");
        let item = Position::new(0, 1);
        assert!(map.is_pickable(item));

        let outcome = apply_action(&mut map, &catalog, &mut player, Action::Move(Direction::Right));
        assert_eq!(outcome.picked_up.as_deref(), Some("needle"));
        assert_eq!(player.inventory.count("needle"), 1);
        assert!(!map.is_pickable(item));
        assert_eq!(map.tile(item).map(Tile::type_name), Some(GROUND));

        apply_action(&mut map, &catalog, &mut player, Action::Move(Direction::Right));
        let outcome = apply_action(&mut map, &catalog, &mut player, Action::Move(Direction::Left));
        assert_eq!(outcome.picked_up, None);
        assert_eq!(player.inventory.count("needle"), 1);
    }
}
