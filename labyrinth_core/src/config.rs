//! Loader and rule configuration.

use std::{
    env,
    path::{Path, PathBuf},
};

use crate::conditions::InventoryMatch;

/// Environment variable holding extra map roots, in platform path-list syntax.
pub const MAP_PATH_ENV: &str = "LABYRINTH_MAP_PATH";
/// Environment variable holding a fixed seed for random placement.
pub const SEED_ENV: &str = "LABYRINTH_SEED";

/// Maps shipped with the workspace, independent of the working directory.
pub fn bundled_maps_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../maps")
}

/// Where the [`crate::MapLoader`] looks for map files.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoaderConfig {
    /// Searched in order; the first directory holding both map files wins.
    pub map_roots: Vec<PathBuf>,
}

impl Default for LoaderConfig {
    /// `maps` under the working directory, then the bundled maps.
    fn default() -> Self {
        Self {
            map_roots: vec![PathBuf::from("maps"), bundled_maps_dir()],
        }
    }
}

impl LoaderConfig {
    pub fn new(map_roots: Vec<PathBuf>) -> Self {
        Self { map_roots }
    }

    /// Construct configuration from process environment variables.
    ///
    /// Entries of `LABYRINTH_MAP_PATH` are searched before the default roots.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(paths) = env::var_os(MAP_PATH_ENV) {
            let mut roots: Vec<PathBuf> = env::split_paths(&paths)
                .filter(|path| !path.as_os_str().is_empty())
                .collect();
            roots.append(&mut config.map_roots);
            config.map_roots = roots;
        }
        config
    }

    /// Puts `root` in front of the existing search path.
    pub fn prepend_root(&mut self, root: impl Into<PathBuf>) {
        self.map_roots.insert(0, root.into());
    }
}

/// Game rules that are not part of the map.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RulesConfig {
    pub inventory_match: InventoryMatch,
    /// Seed for random placement; `None` draws one from the OS.
    pub seed: Option<u64>,
}

impl RulesConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(seed) = read_env::<u64>(SEED_ENV) {
            config.seed = Some(seed);
        }
        config
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    let value = env::var(key).ok()?;
    match value.trim().parse() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            tracing::warn!("Ignoring {key}={value:?}: not a valid value");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_searches_local_then_bundled_maps() {
        assert_eq!(
            LoaderConfig::default().map_roots,
            vec![PathBuf::from("maps"), bundled_maps_dir()]
        );
        assert!(bundled_maps_dir().join("example_map.txt").is_file());
    }

    #[test]
    fn prepend_root_takes_precedence() {
        let mut config = LoaderConfig::default();
        config.prepend_root("/tmp/custom");
        assert_eq!(
            config.map_roots,
            vec![
                PathBuf::from("/tmp/custom"),
                PathBuf::from("maps"),
                bundled_maps_dir()
            ]
        );
    }

    #[test]
    fn rules_default_to_exact_match() {
        let rules = RulesConfig::default();
        assert_eq!(rules.inventory_match, InventoryMatch::Exact);
        assert_eq!(rules.seed, None);
    }
}
