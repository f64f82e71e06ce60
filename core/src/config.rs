use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::grid::Point;
use crate::mover::MovePolicy;

pub const FIELD_WIDTH_DEFAULT: f32 = 960.0;
pub const FIELD_HEIGHT_DEFAULT: f32 = 960.0;
pub const SPACING_DEFAULT: f32 = 4.0;
pub const MOVE_DURATION_DEFAULT: f32 = 0.25;
pub const MOVE_DURATION_MAX: f32 = 5.0;

pub const BUILTIN_LEVELS: &str = r#"
[[levels]]
label = "Warm-up"
rows = 2
cols = 2

[[levels]]
label = "Small"
rows = 3
cols = 3

[[levels]]
label = "Square"
rows = 4
cols = 4

[[levels]]
label = "Wide"
rows = 4
cols = 6

[[levels]]
label = "Large"
rows = 6
cols = 6
"#;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionRules {
    pub field_width: f32,
    pub field_height: f32,
    pub spacing: f32,
    pub origin: Point,
    /// Seconds handed to the presenter for each piece transition.
    pub move_duration: f32,
    pub policy: MovePolicy,
}

impl Default for SessionRules {
    fn default() -> Self {
        Self {
            field_width: FIELD_WIDTH_DEFAULT,
            field_height: FIELD_HEIGHT_DEFAULT,
            spacing: SPACING_DEFAULT,
            origin: (0.0, 0.0),
            move_duration: MOVE_DURATION_DEFAULT,
            policy: MovePolicy::default(),
        }
    }
}

impl SessionRules {
    pub fn validate(mut self) -> Result<Self, ConfigError> {
        if !(self.field_width > 0.0) || !(self.field_height > 0.0) {
            return Err(ConfigError::Field {
                width: self.field_width,
                height: self.field_height,
            });
        }
        self.spacing = self.spacing.max(0.0);
        self.move_duration = if self.move_duration.is_finite() {
            self.move_duration.clamp(0.0, MOVE_DURATION_MAX)
        } else {
            MOVE_DURATION_DEFAULT
        };
        Ok(self)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelEntry {
    pub label: String,
    pub rows: usize,
    pub cols: usize,
    #[serde(default)]
    pub seed: Option<u32>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LevelCatalog {
    #[serde(default)]
    pub rules: SessionRules,
    pub levels: Vec<LevelEntry>,
}

impl LevelCatalog {
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let mut catalog: LevelCatalog = toml::from_str(contents)?;
        if catalog.levels.is_empty() {
            return Err(ConfigError::EmptyCatalog);
        }
        for (index, level) in catalog.levels.iter().enumerate() {
            if level.rows == 0 || level.cols == 0 {
                return Err(ConfigError::EmptyLevel {
                    index,
                    label: level.label.clone(),
                    rows: level.rows,
                    cols: level.cols,
                });
            }
        }
        catalog.rules = catalog.rules.validate()?;
        Ok(catalog)
    }

    pub fn builtin() -> Self {
        // The embedded catalog is covered by `builtin_catalog_parses`.
        Self::from_toml(BUILTIN_LEVELS).unwrap_or_else(|_| Self {
            rules: SessionRules::default(),
            levels: vec![LevelEntry {
                label: "Small".to_string(),
                rows: 3,
                cols: 3,
                seed: None,
            }],
        })
    }

    pub fn level(&self, index: usize) -> Option<&LevelEntry> {
        self.levels.get(index)
    }

    pub fn level_by_label(&self, label: &str) -> Option<(usize, &LevelEntry)> {
        let trimmed = label.trim();
        self.levels
            .iter()
            .enumerate()
            .find(|(_, level)| level.label.eq_ignore_ascii_case(trimmed))
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_parses() {
        let catalog = LevelCatalog::from_toml(BUILTIN_LEVELS).unwrap();
        assert_eq!(catalog.len(), 5);
        assert_eq!(catalog.rules, SessionRules::default());
        assert_eq!(catalog.level_by_label(" square ").map(|(i, _)| i), Some(2));
    }

    #[test]
    fn rules_are_read_and_clamped() {
        let catalog = LevelCatalog::from_toml(
            r#"
            [rules]
            field_width = 300.0
            field_height = 200.0
            spacing = -2.0
            move_duration = 60.0
            policy = "strict"

            [[levels]]
            label = "Only"
            rows = 2
            cols = 3
            seed = 11
            "#,
        )
        .unwrap();
        assert_eq!(catalog.rules.policy, MovePolicy::Strict);
        assert_eq!(catalog.rules.spacing, 0.0);
        assert_eq!(catalog.rules.move_duration, MOVE_DURATION_MAX);
        assert_eq!(catalog.rules.field_width, 300.0);
        assert_eq!(catalog.level(0).and_then(|level| level.seed), Some(11));
    }

    #[test]
    fn bad_catalogs_are_rejected() {
        assert!(matches!(
            LevelCatalog::from_toml("levels = []"),
            Err(ConfigError::EmptyCatalog)
        ));
        assert!(matches!(
            LevelCatalog::from_toml("[[levels]]\nlabel = \"x\"\nrows = 0\ncols = 2\n"),
            Err(ConfigError::EmptyLevel { index: 0, .. })
        ));
        assert!(matches!(
            LevelCatalog::from_toml("levels = ["),
            Err(ConfigError::Parse(_))
        ));
    }
}
