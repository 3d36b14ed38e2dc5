//! Catalog validation.
//!
//! Loading a catalog stops at the first problem. Validation here reports
//! all of them, plus warnings for data that loads but is probably a mistake.

use std::path::{Path, PathBuf};

use duel_core::catalog::{CatalogData, Effect, Tool, ToolCatalog, ToolCategory};
use duel_core::error::GameError;
use thiserror::Error;

/// Errors from the validate command.
#[derive(Debug, Error)]
pub enum ValidateError {
    /// One or more files had integrity problems.
    #[error("{failed} of {total} catalog file(s) failed validation")]
    Invalid {
        /// Files with errors.
        failed: usize,
        /// Files checked.
        total: usize,
    },

    /// A directory held no `.ron` files.
    #[error("No catalog files found in {0}")]
    NoCatalogs(String),

    /// Reading or parsing failed before validation could run.
    #[error(transparent)]
    Game(#[from] GameError),
}

/// Problems found in one catalog file.
#[derive(Debug)]
pub struct ValidationReport {
    /// Where the catalog came from.
    pub source: String,
    /// Number of tools parsed.
    pub tool_count: usize,
    /// Integrity errors; any of these stops the catalog from loading.
    pub errors: Vec<GameError>,
    /// Suspicious but loadable data.
    pub warnings: Vec<String>,
}

impl ValidationReport {
    /// Whether the catalog would load.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

fn effect_amount(effect: &Effect) -> u32 {
    match *effect {
        Effect::Damage { amount } | Effect::Heal { amount } | Effect::Shield { amount } => amount,
        Effect::Dodge { duration } | Effect::Slow { duration } => duration,
    }
}

fn tool_warnings(tool: &Tool) -> Vec<String> {
    let mut warnings = Vec::new();
    if tool.category == ToolCategory::Attack && tool.first_damage().is_none() {
        warnings.push(format!("'{}' is an attack with no damage effect", tool.id));
    }
    if tool.effects.iter().any(|e| effect_amount(e) == 0) {
        warnings.push(format!("'{}' has an effect with a zero amount", tool.id));
    }
    if tool.name.trim().is_empty() {
        warnings.push(format!("'{}' has an empty display name", tool.id));
    }
    warnings
}

/// Validate catalog RON text.
///
/// # Errors
///
/// Returns an error only if the text does not parse. Integrity problems
/// are collected in the report instead.
pub fn validate_catalog_str(ron_text: &str, source: &str) -> Result<ValidationReport, GameError> {
    let data: CatalogData = ron::from_str(ron_text).map_err(|e| GameError::DataParseError {
        path: source.to_string(),
        message: e.to_string(),
    })?;

    let errors = ToolCatalog::validate_tools(&data.tools);
    let warnings = data.tools.iter().flat_map(tool_warnings).collect();
    Ok(ValidationReport {
        source: source.to_string(),
        tool_count: data.tools.len(),
        errors,
        warnings,
    })
}

/// Validate one catalog file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn validate_catalog_file(path: &Path) -> Result<ValidationReport, GameError> {
    let text = std::fs::read_to_string(path).map_err(|source| GameError::Io {
        path: path.display().to_string(),
        source,
    })?;
    validate_catalog_str(&text, &path.display().to_string())
}

fn catalog_files(path: &Path) -> Result<Vec<PathBuf>, ValidateError> {
    if !path.is_dir() {
        return Ok(vec![path.to_path_buf()]);
    }
    let entries = std::fs::read_dir(path).map_err(|source| GameError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext == "ron"))
        .collect();
    files.sort();
    if files.is_empty() {
        return Err(ValidateError::NoCatalogs(path.display().to_string()));
    }
    Ok(files)
}

/// Validate a catalog file, or every `.ron` file in a directory.
///
/// Logs each problem and returns the reports on success.
///
/// # Errors
///
/// Returns an error if any file fails to parse or has integrity errors.
pub fn validate_path(path: &Path) -> Result<Vec<ValidationReport>, ValidateError> {
    let files = catalog_files(path)?;
    let mut reports = Vec::with_capacity(files.len());
    for file in &files {
        let report = validate_catalog_file(file)?;
        for warning in &report.warnings {
            tracing::warn!(source = %report.source, "{warning}");
        }
        for error in &report.errors {
            tracing::error!(source = %report.source, "{error}");
        }
        tracing::info!(
            source = %report.source,
            tools = report.tool_count,
            errors = report.errors.len(),
            warnings = report.warnings.len(),
            "Checked catalog"
        );
        reports.push(report);
    }

    let failed = reports.iter().filter(|r| !r.is_valid()).count();
    if failed > 0 {
        return Err(ValidateError::Invalid {
            failed,
            total: reports.len(),
        });
    }
    Ok(reports)
}

#[cfg(test)]
mod tests {
    use duel_core::catalog::STANDARD_CATALOG_RON;

    use super::*;

    #[test]
    fn test_standard_catalog_is_clean() {
        let report = validate_catalog_str(STANDARD_CATALOG_RON, "standard").unwrap();
        assert!(report.is_valid(), "{:?}", report.errors);
        assert!(report.warnings.is_empty(), "{:?}", report.warnings);
        assert_eq!(report.tool_count, 8);
    }

    #[test]
    fn test_reports_every_problem() {
        let text = r#"(tools: [
            (id: "a", name: "A", aliases: ["hit"], category: Attack, effects: [Damage(amount: 5)]),
            (id: "a", name: "A2", aliases: ["other"], category: Attack, effects: [Damage(amount: 6)]),
            (id: "c", name: "C", aliases: ["HIT"], category: Attack, effects: []),
            (id: "b", name: "B", aliases: [], category: Utility, effects: [Heal(amount: 0)]),
        ])"#;
        let report = validate_catalog_str(text, "inline").unwrap();
        assert!(!report.is_valid());
        // duplicate id, duplicate alias, no effects, no aliases
        assert_eq!(report.errors.len(), 4, "{:?}", report.errors);
        // attack without damage, zero heal
        assert_eq!(report.warnings.len(), 2, "{:?}", report.warnings);
    }

    #[test]
    fn test_unknown_effect_fails_to_parse() {
        let text = r#"(tools: [
            (id: "x", name: "X", aliases: ["x"], category: Attack, effects: [Teleport(range: 3)]),
        ])"#;
        let err = validate_catalog_str(text, "inline").unwrap_err();
        assert!(matches!(err, GameError::DataParseError { .. }));
    }
}
