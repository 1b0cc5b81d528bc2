use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use super::weights::parse_all_weights;
use crate::common::collections::{HashMap, hash_map};
use crate::common::util::{split_list, strip_quotes};
use crate::sys::host::WorkspaceId;

pub const MIN_MAIN_STACK_PERCENT: f64 = 0.1;
pub const MAX_MAIN_STACK_PERCENT: f64 = 0.9;

/// Where layout defaults come from. Read once per workspace, the first time
/// the workspace is laid out.
pub trait ConfigProvider {
    fn main_stack_side(&self) -> &str;
    fn main_stack_percent(&self) -> f64;
    fn main_stack_min(&self) -> i64;
    fn main_weight_overrides(&self) -> &str;
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MainSide {
    #[default]
    Left,
    Right,
}

impl MainSide {
    /// `"right"` selects the right side; every other value means left.
    pub fn from_setting(value: &str) -> MainSide {
        if value == "right" { MainSide::Right } else { MainSide::Left }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct WorkspaceConfig {
    pub main_side: MainSide,
    /// Always within [`MIN_MAIN_STACK_PERCENT`, `MAX_MAIN_STACK_PERCENT`].
    pub main_stack_percent: f64,
    /// Always at least 1.
    pub main_stack_min: usize,
    /// `Some` while override weights are enabled. An enabled empty list means
    /// every main node gets weight 1.
    pub override_weights: Option<Vec<f64>>,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            main_side: MainSide::Left,
            main_stack_percent: 0.5,
            main_stack_min: 1,
            override_weights: None,
        }
    }
}

impl WorkspaceConfig {
    pub fn from_provider(provider: &dyn ConfigProvider) -> WorkspaceConfig {
        let percent = provider.main_stack_percent();
        let main_stack_percent = if percent.is_nan() {
            0.5
        } else {
            percent.clamp(MIN_MAIN_STACK_PERCENT, MAX_MAIN_STACK_PERCENT)
        };
        let main_stack_min = usize::try_from(provider.main_stack_min()).unwrap_or(0).max(1);

        WorkspaceConfig {
            main_side: MainSide::from_setting(provider.main_stack_side()),
            main_stack_percent,
            main_stack_min,
            override_weights: parse_override_setting(provider.main_weight_overrides())
                .unwrap_or_else(|e| {
                    warn!("{e}, leaving overrides disabled");
                    None
                }),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
#[error("main_weight_overrides is not a comma separated list of numbers: {0:?}")]
pub struct InvalidOverrides(pub String);

/// Turns the configured override string into weights. One pair of quotes
/// around the list is allowed. A blank value gives `Ok(None)`.
pub fn parse_override_setting(value: &str) -> Result<Option<Vec<f64>>, InvalidOverrides> {
    let tokens = split_list(strip_quotes(value.trim()), ',');
    if tokens.is_empty() {
        return Ok(None);
    }
    parse_all_weights(&tokens)
        .map(Some)
        .ok_or_else(|| InvalidOverrides(value.to_string()))
}

/// Lazily populated per-workspace configuration.
pub struct WorkspaceConfigStore {
    map: HashMap<WorkspaceId, WorkspaceConfig>,
    provider: Box<dyn ConfigProvider>,
}

impl WorkspaceConfigStore {
    pub fn new(provider: Box<dyn ConfigProvider>) -> Self {
        Self { map: HashMap::default(), provider }
    }

    /// The workspace's config, loading it from the provider on first access.
    /// Later provider changes do not affect workspaces already loaded.
    pub fn get(&mut self, workspace: WorkspaceId) -> &mut WorkspaceConfig {
        match self.map.entry(workspace) {
            hash_map::Entry::Occupied(entry) => entry.into_mut(),
            hash_map::Entry::Vacant(entry) => {
                let config = WorkspaceConfig::from_provider(self.provider.as_ref());
                debug!(?workspace, ?config, "Loaded workspace config");
                entry.insert(config)
            }
        }
    }

    pub fn peek(&self, workspace: WorkspaceId) -> Option<&WorkspaceConfig> {
        self.map.get(&workspace)
    }

    pub fn set_provider(&mut self, provider: Box<dyn ConfigProvider>) { self.provider = provider; }

    /// Forgets every loaded config so the next access reads the provider again.
    pub fn clear(&mut self) { self.map.clear(); }
}

impl std::fmt::Debug for WorkspaceConfigStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkspaceConfigStore").field("map", &self.map).finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use pretty_assertions::assert_eq;

    use super::*;

    struct Fixed {
        side: &'static str,
        percent: f64,
        min: i64,
        overrides: &'static str,
        reads: Rc<Cell<usize>>,
    }

    impl Fixed {
        fn new(side: &'static str, percent: f64, min: i64, overrides: &'static str) -> Self {
            Self {
                side,
                percent,
                min,
                overrides,
                reads: Rc::default(),
            }
        }
    }

    impl ConfigProvider for Fixed {
        fn main_stack_side(&self) -> &str {
            self.reads.set(self.reads.get() + 1);
            self.side
        }

        fn main_stack_percent(&self) -> f64 { self.percent }

        fn main_stack_min(&self) -> i64 { self.min }

        fn main_weight_overrides(&self) -> &str { self.overrides }
    }

    const WS: WorkspaceId = WorkspaceId::new(1);

    #[test]
    fn percent_is_clamped() {
        let config = WorkspaceConfig::from_provider(&Fixed::new("left", 0.95, 1, ""));
        assert_eq!(config.main_stack_percent, 0.9);
        let config = WorkspaceConfig::from_provider(&Fixed::new("left", 0.0, 1, ""));
        assert_eq!(config.main_stack_percent, 0.1);
    }

    #[test]
    fn non_positive_minimum_becomes_one() {
        assert_eq!(WorkspaceConfig::from_provider(&Fixed::new("left", 0.5, 0, "")).main_stack_min, 1);
        assert_eq!(WorkspaceConfig::from_provider(&Fixed::new("left", 0.5, -3, "")).main_stack_min, 1);
        assert_eq!(WorkspaceConfig::from_provider(&Fixed::new("left", 0.5, 3, "")).main_stack_min, 3);
    }

    #[test]
    fn unknown_side_means_left() {
        assert_eq!(WorkspaceConfig::from_provider(&Fixed::new("right", 0.5, 1, "")).main_side, MainSide::Right);
        assert_eq!(WorkspaceConfig::from_provider(&Fixed::new("Right", 0.5, 1, "")).main_side, MainSide::Left);
        assert_eq!(WorkspaceConfig::from_provider(&Fixed::new("top", 0.5, 1, "")).main_side, MainSide::Left);
    }

    #[test]
    fn override_setting_accepts_quotes() {
        assert_eq!(parse_override_setting("\"2,1\""), Ok(Some(vec![2.0, 1.0])));
        assert_eq!(parse_override_setting("2, 1"), Ok(Some(vec![2.0, 1.0])));
    }

    #[test]
    fn blank_override_setting_is_disabled() {
        assert_eq!(parse_override_setting(""), Ok(None));
        assert_eq!(parse_override_setting("  "), Ok(None));
        assert_eq!(parse_override_setting("\"\""), Ok(None));
    }

    #[test]
    fn broken_override_setting_is_an_error() {
        assert_eq!(parse_override_setting("2,x"), Err(InvalidOverrides("2,x".into())));
        assert_eq!(parse_override_setting("2,,1"), Err(InvalidOverrides("2,,1".into())));
    }

    #[test]
    fn broken_override_setting_leaves_overrides_disabled() {
        let config = WorkspaceConfig::from_provider(&Fixed::new("left", 0.5, 1, "2,x"));
        assert_eq!(config.override_weights, None);
    }

    #[test]
    fn config_is_loaded_once_per_workspace() {
        let provider = Fixed::new("right", 0.7, 2, "3");
        let reads = provider.reads.clone();
        let mut store = WorkspaceConfigStore::new(Box::new(provider));
        assert!(store.peek(WS).is_none());

        store.get(WS).main_stack_percent = 0.3;
        assert_eq!(store.get(WS).main_stack_percent, 0.3);
        assert_eq!(reads.get(), 1);

        store.get(WorkspaceId::new(2));
        assert_eq!(reads.get(), 2);
    }

    #[test]
    fn new_provider_only_affects_unloaded_workspaces() {
        let mut store = WorkspaceConfigStore::new(Box::new(Fixed::new("left", 0.5, 1, "")));
        store.get(WS);
        store.set_provider(Box::new(Fixed::new("right", 0.5, 1, "")));
        assert_eq!(store.get(WS).main_side, MainSide::Left);
        assert_eq!(store.get(WorkspaceId::new(2)).main_side, MainSide::Right);

        store.clear();
        assert_eq!(store.get(WS).main_side, MainSide::Right);
    }
}
