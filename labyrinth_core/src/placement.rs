use rand::Rng;
use tracing::debug;

use crate::{Position, error::PlacementError, map::LabyrinthMap, tile::Tile};

/// Scatters `requests` over the map, one tile per request.
///
/// Candidates are walkable tiles that are neither start nor exit and hold no
/// item yet. Each request takes a uniformly chosen candidate, which is then no
/// longer available, so no two requests share a position. If there are fewer
/// candidates than requests the map is left untouched.
///
/// Returns the chosen positions, in request order.
pub fn place_randomly<R>(
    map: &mut LabyrinthMap,
    requests: &[Tile],
    rng: &mut R,
) -> Result<Vec<Position>, PlacementError>
where
    R: Rng + ?Sized,
{
    let mut candidates = map.free_positions();
    if candidates.len() < requests.len() {
        return Err(PlacementError::InsufficientSpace {
            requested: requests.len(),
            available: candidates.len(),
        });
    }

    let mut placed = Vec::with_capacity(requests.len());
    for request in requests {
        let position = candidates.swap_remove(rng.random_range(0..candidates.len()));
        debug!(
            "Placing '{}' ({:?}) at ({}, {})",
            request.name, request.symbol, position.row, position.col
        );
        map.replace(position, request.clone());
        placed.push(position);
    }
    Ok(placed)
}
