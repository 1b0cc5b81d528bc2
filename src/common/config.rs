use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use super::collections::HashMap;
use crate::layout_engine::ConfigProvider;
use crate::layout_engine::workspaces::parse_override_setting;
use crate::sys::geometry::Insets;
use crate::sys::host::WorkspaceId;

pub fn config_file() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ortho")
        .join("config.toml")
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub settings: Settings,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Main/secondary stack layout
    #[serde(default)]
    pub layout: OrthoSettings,
    /// Gap configuration for window spacing
    #[serde(default)]
    pub gaps: GapSettings,
    #[serde(default)]
    pub misc: MiscSettings,
}

/// Global defaults every workspace starts from. Values are kept as written;
/// clamping happens when a workspace first loads them.
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct OrthoSettings {
    /// "right" puts the main stack on the right, anything else on the left.
    #[serde(default = "default_main_stack_side")]
    pub main_stack_side: String,
    /// Fraction of the usable width given to the main stack when the
    /// secondary stack is not empty.
    #[serde(default = "default_main_stack_percent")]
    pub main_stack_percent: f64,
    /// Windows kept in the main stack before new ones go to the secondary.
    #[serde(default = "default_main_stack_min")]
    pub main_stack_min: i64,
    /// Comma separated main stack weights, optionally quoted.
    #[serde(default)]
    pub main_weight_overrides: String,
}

/// Gap configuration for window spacing
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct GapSettings {
    /// Gaps on edges shared with other windows
    #[serde(default = "default_inner_gaps")]
    pub inner: EdgeGaps,
    /// Gaps on edges touching the usable monitor area
    #[serde(default = "default_outer_gaps")]
    pub outer: EdgeGaps,
    /// Workspace-specific gap overrides keyed by workspace id
    #[serde(default)]
    pub per_workspace: HashMap<String, GapOverride>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, Copy, Default)]
#[serde(deny_unknown_fields)]
pub struct EdgeGaps {
    #[serde(default)]
    pub top: f64,
    #[serde(default)]
    pub right: f64,
    #[serde(default)]
    pub bottom: f64,
    #[serde(default)]
    pub left: f64,
}

/// Overrides for gaps on a per-workspace basis
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct GapOverride {
    #[serde(default)]
    pub inner: Option<EdgeGaps>,
    #[serde(default)]
    pub outer: Option<EdgeGaps>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct MiscSettings {
    /// Clamp tiled windows to their min/max size rules.
    #[serde(default)]
    pub size_limits_tiled: bool,
    /// Animate geometry changes caused by manual resizes.
    #[serde(default)]
    pub animate_manual_resizes: bool,
}

impl Default for OrthoSettings {
    fn default() -> Self {
        Self {
            main_stack_side: default_main_stack_side(),
            main_stack_percent: default_main_stack_percent(),
            main_stack_min: default_main_stack_min(),
            main_weight_overrides: String::new(),
        }
    }
}

impl Default for GapSettings {
    fn default() -> Self {
        Self {
            inner: default_inner_gaps(),
            outer: default_outer_gaps(),
            per_workspace: HashMap::default(),
        }
    }
}

impl ConfigProvider for OrthoSettings {
    fn main_stack_side(&self) -> &str { &self.main_stack_side }

    fn main_stack_percent(&self) -> f64 { self.main_stack_percent }

    fn main_stack_min(&self) -> i64 { self.main_stack_min }

    fn main_weight_overrides(&self) -> &str { &self.main_weight_overrides }
}

impl From<EdgeGaps> for Insets {
    fn from(gaps: EdgeGaps) -> Self { Insets::new(gaps.top, gaps.right, gaps.bottom, gaps.left) }
}

impl Settings {
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();
        issues.extend(self.layout.validate());
        issues.extend(self.gaps.validate());
        issues
    }
}

impl OrthoSettings {
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if !matches!(self.main_stack_side.as_str(), "left" | "right") {
            issues.push(format!(
                "main_stack_side must be \"left\" or \"right\", got {:?} (falls back to left)",
                self.main_stack_side
            ));
        }

        if !(0.1..=0.9).contains(&self.main_stack_percent) {
            issues.push(format!(
                "main_stack_percent must be within [0.1, 0.9], got {} (will be clamped)",
                self.main_stack_percent
            ));
        }

        if self.main_stack_min < 1 {
            issues.push(format!(
                "main_stack_min must be at least 1, got {} (will be treated as 1)",
                self.main_stack_min
            ));
        }

        if let Err(e) = parse_override_setting(&self.main_weight_overrides) {
            issues.push(e.to_string());
        }

        issues
    }
}

impl GapSettings {
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        issues.extend(self.inner.validate("inner"));
        issues.extend(self.outer.validate("outer"));

        for (workspace, overrides) in &self.per_workspace {
            if workspace.parse::<i64>().is_err() {
                issues.push(format!("per_workspace key {workspace:?} is not a workspace id"));
            }
            if let Some(inner) = &overrides.inner {
                for issue in inner.validate("inner") {
                    issues.push(format!("per_workspace[{workspace}] {issue}"));
                }
            }
            if let Some(outer) = &overrides.outer {
                for issue in outer.validate("outer") {
                    issues.push(format!("per_workspace[{workspace}] {issue}"));
                }
            }
        }

        issues
    }

    /// Gaps in effect on a workspace, with its override applied if any.
    pub fn effective_for_workspace(&self, workspace: WorkspaceId) -> GapSettings {
        let mut resolved = GapSettings {
            inner: self.inner,
            outer: self.outer,
            per_workspace: HashMap::default(),
        };
        if let Some(overrides) = self.per_workspace.get(&workspace.to_string()) {
            if let Some(inner_override) = overrides.inner {
                resolved.inner = inner_override;
            }
            if let Some(outer_override) = overrides.outer {
                resolved.outer = outer_override;
            }
        }
        resolved
    }
}

impl EdgeGaps {
    pub const fn uniform(v: f64) -> Self { Self { top: v, right: v, bottom: v, left: v } }

    fn validate(&self, which: &str) -> Vec<String> {
        let mut issues = Vec::new();
        for (edge, value) in [
            ("top", self.top),
            ("right", self.right),
            ("bottom", self.bottom),
            ("left", self.left),
        ] {
            if value < 0.0 {
                issues.push(format!("{which}.{edge} gap must be non-negative, got {value}"));
            }
        }
        issues
    }
}

fn default_main_stack_side() -> String { "left".to_string() }

fn default_main_stack_percent() -> f64 { 0.5 }

fn default_main_stack_min() -> i64 { 1 }

fn default_inner_gaps() -> EdgeGaps { EdgeGaps::uniform(5.0) }

fn default_outer_gaps() -> EdgeGaps { EdgeGaps::uniform(20.0) }

impl Config {
    pub fn read(path: &Path) -> anyhow::Result<Config> {
        let buf = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        Self::parse(&buf)
    }

    pub fn parse(buf: &str) -> anyhow::Result<Config> {
        toml::from_str::<Config>(buf).context("parsing config")
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let toml_string = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, toml_string.as_bytes())?;
        Ok(())
    }

    /// Validates the entire configuration and returns a list of issues found.
    pub fn validate(&self) -> Vec<String> { self.settings.validate() }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_shipped_defaults_match_builtin_defaults() {
        let shipped = Config::parse(include_str!("../../ortho.default.toml")).unwrap();
        assert_eq!(shipped, Config::default());
    }

    #[test]
    fn test_empty_config_is_valid() {
        let config = Config::parse("").unwrap();
        assert!(config.validate().is_empty());
        assert_eq!(config.settings.layout.main_stack_side, "left");
        assert_eq!(config.settings.layout.main_stack_percent, 0.5);
        assert_eq!(config.settings.layout.main_stack_min, 1);
        assert_eq!(config.settings.layout.main_weight_overrides, "");
    }

    #[test]
    fn test_unknown_fields_are_rejected() {
        assert!(Config::parse("[settings.layout]\nmain_side = \"right\"\n").is_err());
    }

    #[test]
    fn test_layout_validation_reports_out_of_range_values() {
        let config = Config::parse(
            r#"
            [settings.layout]
            main_stack_side = "top"
            main_stack_percent = 0.95
            main_stack_min = 0
            main_weight_overrides = "1,x"
            "#,
        )
        .unwrap();
        let issues = config.validate();
        assert_eq!(issues.len(), 4, "{issues:?}");
    }

    #[test]
    fn test_quoted_overrides_are_valid() {
        let settings = OrthoSettings {
            main_weight_overrides: "\"2, 1\"".into(),
            ..Default::default()
        };
        assert!(settings.validate().is_empty());
    }

    #[test]
    fn test_blank_overrides_are_valid() {
        for overrides in ["", "   ", "\"\""] {
            let settings = OrthoSettings {
                main_weight_overrides: overrides.into(),
                ..Default::default()
            };
            assert!(settings.validate().is_empty(), "{overrides:?}");
        }
    }

    #[test]
    fn test_broken_overrides_are_reported() {
        let settings = OrthoSettings {
            main_weight_overrides: "2,,1".into(),
            ..Default::default()
        };
        assert_eq!(settings.validate(), vec![
            "main_weight_overrides is not a comma separated list of numbers: \"2,,1\"".to_string()
        ]);
    }

    #[test]
    fn test_gap_validation_negative_values() {
        let gaps = GapSettings {
            inner: EdgeGaps { top: -1.0, ..EdgeGaps::uniform(0.0) },
            outer: EdgeGaps { left: -2.0, ..EdgeGaps::uniform(0.0) },
            per_workspace: HashMap::default(),
        };
        let issues = gaps.validate();
        assert_eq!(issues.len(), 2);
        assert!(issues[0].contains("inner.top"));
        assert!(issues[1].contains("outer.left"));
    }

    #[test]
    fn test_gap_settings_effective_for_workspace_with_override() {
        let config = Config::parse(
            r#"
            [settings.gaps]
            inner = { top = 1, right = 1, bottom = 1, left = 1 }
            outer = { top = 2, right = 2, bottom = 2, left = 2 }

            [settings.gaps.per_workspace."3"]
            outer = { top = 0, right = 0, bottom = 0, left = 0 }
            "#,
        )
        .unwrap();
        let gaps = &config.settings.gaps;

        let resolved = gaps.effective_for_workspace(WorkspaceId::new(3));
        assert_eq!(resolved.inner, EdgeGaps::uniform(1.0));
        assert_eq!(resolved.outer, EdgeGaps::uniform(0.0));

        let resolved = gaps.effective_for_workspace(WorkspaceId::new(4));
        assert_eq!(resolved.outer, EdgeGaps::uniform(2.0));
    }

    #[test]
    fn test_save_and_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut config = Config::default();
        config.settings.layout.main_stack_side = "right".into();
        config.settings.misc.size_limits_tiled = true;

        config.save(&path).unwrap();
        assert_eq!(Config::read(&path).unwrap(), config);
    }

    #[test]
    fn test_read_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::read(&dir.path().join("missing.toml")).is_err());
    }
}
