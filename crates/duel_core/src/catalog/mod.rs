//! Tool catalog: the static, shared list of castable tools.
//!
//! The catalog is loaded once and treated as immutable for the engine's
//! lifetime. Any host (a local session, the headless runner, a future
//! remote authority) loading the same data validates actions identically.
//!
//! Integrity is enforced at load time: duplicate ids, duplicate aliases,
//! tools without aliases and tools without effects are all rejected with a
//! [`GameError`] instead of being resolved by registration order later.

mod effect;
mod tool;

use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

pub use effect::Effect;
pub use tool::{Tool, ToolCategory};

use crate::error::{GameError, Result};
use crate::math::MAX_UNITS;

/// RON source of the standard catalog bundled with the crate.
pub const STANDARD_CATALOG_RON: &str = include_str!("../../data/tools.ron");

/// On-disk catalog layout.
///
/// # Example RON
///
/// ```ron
/// (
///     tools: [
///         (id: "strike", name: "Strike", aliases: ["strike"], category: Attack,
///          effects: [Damage(amount: 10)]),
///     ],
/// )
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogData {
    /// Tools in registration order.
    pub tools: Vec<Tool>,
}

/// Normalize free text for alias lookup.
///
/// Trims, case-folds and collapses inner whitespace runs to one space, so
/// `"  Fire   BALL "` and `"fire ball"` compare equal.
#[must_use]
pub fn normalize_alias(text: &str) -> String {
    text.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Validated, indexed tool catalog.
#[derive(Debug, Clone)]
pub struct ToolCatalog {
    tools: Vec<Tool>,
    by_id: HashMap<String, usize>,
    by_alias: HashMap<String, usize>,
}

impl ToolCatalog {
    /// Build a catalog, failing on the first integrity problem.
    ///
    /// Aliases are stored normalized.
    pub fn from_tools(tools: Vec<Tool>) -> Result<Self> {
        if let Some(err) = Self::validate_tools(&tools).into_iter().next() {
            return Err(err);
        }

        let mut tools = tools;
        for tool in &mut tools {
            for alias in &mut tool.aliases {
                *alias = normalize_alias(alias);
            }
        }

        let mut by_id = HashMap::with_capacity(tools.len());
        let mut by_alias = HashMap::new();
        for (index, tool) in tools.iter().enumerate() {
            by_id.insert(tool.id.clone(), index);
            for alias in &tool.aliases {
                by_alias.insert(alias.clone(), index);
            }
        }

        tracing::debug!(tools = tools.len(), aliases = by_alias.len(), "Tool catalog loaded");

        Ok(Self {
            tools,
            by_id,
            by_alias,
        })
    }

    /// Check a tool list for every integrity problem.
    ///
    /// Checks for:
    /// - Unique tool ids
    /// - At least one alias and one effect per tool
    /// - Mana cost and cooldown within [`MAX_UNITS`]
    /// - Normalized aliases unique across the whole catalog
    ///
    /// Returns every problem found, in catalog order.
    #[must_use]
    pub fn validate_tools(tools: &[Tool]) -> Vec<GameError> {
        let mut errors = Vec::new();
        let mut seen_ids: HashSet<&str> = HashSet::new();
        let mut alias_owner: HashMap<String, &str> = HashMap::new();

        for tool in tools {
            if !seen_ids.insert(tool.id.as_str()) {
                errors.push(GameError::DuplicateToolId(tool.id.clone()));
            }

            if tool.aliases.iter().all(|a| normalize_alias(a).is_empty()) {
                errors.push(GameError::MissingAliases(tool.id.clone()));
            }

            if tool.effects.is_empty() {
                errors.push(GameError::MissingEffects(tool.id.clone()));
            }

            for (field, value) in [("mana_cost", tool.mana_cost), ("cooldown", tool.cooldown)] {
                if value > MAX_UNITS {
                    errors.push(GameError::ValueOutOfRange {
                        owner: tool.id.clone(),
                        field,
                        value,
                        limit: MAX_UNITS,
                    });
                }
            }

            for alias in &tool.aliases {
                let normalized = normalize_alias(alias);
                if normalized.is_empty() {
                    continue;
                }
                match alias_owner.get(normalized.as_str()) {
                    // The same tool repeating an alias is harmless.
                    Some(owner) if *owner == tool.id => {}
                    Some(owner) => errors.push(GameError::DuplicateAlias {
                        alias: normalized.clone(),
                        first: (*owner).to_string(),
                        second: tool.id.clone(),
                    }),
                    None => {
                        alias_owner.insert(normalized, tool.id.as_str());
                    }
                }
            }
        }

        errors
    }

    /// Parse and validate a catalog from RON text.
    ///
    /// `source` names the origin for error messages.
    pub fn from_ron_str(ron_text: &str, source: &str) -> Result<Self> {
        let data: CatalogData = ron::from_str(ron_text).map_err(|e| GameError::DataParseError {
            path: source.to_string(),
            message: e.to_string(),
        })?;
        Self::from_tools(data.tools)
    }

    /// Load and validate a catalog from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| GameError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_ron_str(&text, &path.display().to_string())
    }

    /// The standard catalog bundled with the crate.
    pub fn standard() -> Result<Self> {
        Self::from_ron_str(STANDARD_CATALOG_RON, "data/tools.ron")
    }

    /// Resolve free text to a tool by exact normalized alias.
    ///
    /// No fuzzy or prefix matching happens here.
    #[must_use]
    pub fn find(&self, text: &str) -> Option<&Tool> {
        let key = normalize_alias(text);
        self.by_alias.get(&key).map(|&i| &self.tools[i])
    }

    /// Look up a tool by its identifier.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Tool> {
        self.by_id.get(id).map(|&i| &self.tools[i])
    }

    /// Iterate over tools in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Tool> {
        self.tools.iter()
    }

    /// Number of tools.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tool(id: &str, aliases: &[&str]) -> Tool {
        Tool {
            id: id.to_string(),
            name: id.to_string(),
            aliases: aliases.iter().map(|a| (*a).to_string()).collect(),
            category: ToolCategory::Attack,
            mana_cost: 10,
            cooldown: 1,
            effects: vec![Effect::Damage { amount: 5 }],
        }
    }

    #[test]
    fn test_normalize_alias() {
        assert_eq!(normalize_alias("  Fire   BALL "), "fire ball");
        assert_eq!(normalize_alias("FB"), "fb");
        assert_eq!(normalize_alias("   "), "");
    }

    #[test]
    fn test_standard_catalog_loads() {
        let catalog = ToolCatalog::standard().unwrap();
        assert!(!catalog.is_empty());
        let fireball = catalog.get("fireball").unwrap();
        assert_eq!(fireball.mana_cost, 30);
        assert_eq!(fireball.cooldown, 3);
        assert_eq!(fireball.first_damage(), Some(40));
    }

    #[test]
    fn test_find_normalizes_input() {
        let catalog = ToolCatalog::standard().unwrap();
        assert_eq!(catalog.find("  FIREBALL ").map(|t| t.id.as_str()), Some("fireball"));
        assert_eq!(catalog.find("fire  ball").map(|t| t.id.as_str()), Some("fireball"));
    }

    #[test]
    fn test_find_is_exact_not_prefix() {
        let catalog = ToolCatalog::standard().unwrap();
        assert!(catalog.find("fire").is_none());
        assert!(catalog.find("fireballs").is_none());
    }

    #[test]
    fn test_aliases_stored_normalized() {
        let catalog = ToolCatalog::from_tools(vec![tool("zap", &["  ZAP  It "])]).unwrap();
        assert_eq!(catalog.get("zap").unwrap().aliases, vec!["zap it".to_string()]);
        assert!(catalog.find("zap it").is_some());
    }

    #[test]
    fn test_duplicate_alias_fails_fast() {
        let result = ToolCatalog::from_tools(vec![tool("a", &["hit"]), tool("b", &["HIT "])]);
        match result {
            Err(GameError::DuplicateAlias {
                alias,
                first,
                second,
            }) => {
                assert_eq!(alias, "hit");
                assert_eq!(first, "a");
                assert_eq!(second, "b");
            }
            other => panic!("expected duplicate alias error, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_reports_every_problem() {
        let mut empty = tool("empty", &[]);
        empty.effects.clear();
        let errors = ToolCatalog::validate_tools(&[
            tool("a", &["x"]),
            tool("a", &["y"]),
            empty,
            tool("c", &["x"]),
        ]);
        assert_eq!(errors.len(), 4, "Errors: {errors:?}");
    }

    #[test]
    fn test_repeated_alias_within_one_tool_is_allowed() {
        assert!(ToolCatalog::from_tools(vec![tool("a", &["hit", "Hit"])]).is_ok());
    }

    #[test]
    fn test_unknown_effect_kind_fails_to_parse() {
        let text = r#"(tools: [(id: "x", name: "X", aliases: ["x"], category: Attack,
            effects: [Teleport(distance: 3)])])"#;
        assert!(matches!(
            ToolCatalog::from_ron_str(text, "inline"),
            Err(GameError::DataParseError { .. })
        ));
    }

    #[test]
    fn test_oversized_cost_and_cooldown_rejected() {
        let text = r#"(tools: [(id: "big", name: "Big", aliases: ["big"], category: Attack,
            mana_cost: 3000000000, cooldown: 3000000000, effects: [Damage(amount: 1)])])"#;
        let data: CatalogData = ron::from_str(text).unwrap();
        let errors = ToolCatalog::validate_tools(&data.tools);
        assert_eq!(errors.len(), 2, "Errors: {errors:?}");
        assert!(matches!(
            ToolCatalog::from_ron_str(text, "inline"),
            Err(GameError::ValueOutOfRange { field: "mana_cost", value: 3_000_000_000, .. })
        ));

        let mut edge = tool("edge", &["edge"]);
        edge.mana_cost = MAX_UNITS;
        edge.cooldown = MAX_UNITS;
        assert!(ToolCatalog::from_tools(vec![edge]).is_ok());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tools.ron");
        std::fs::write(&path, STANDARD_CATALOG_RON).unwrap();
        let catalog = ToolCatalog::load(&path).unwrap();
        assert_eq!(catalog.len(), ToolCatalog::standard().unwrap().len());
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(
            ToolCatalog::load("/definitely/not/here.ron"),
            Err(GameError::Io { .. })
        ));
    }
}
