use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// How a tracked brand relates to the expansion search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Relationship {
    /// The single competitor whose store gaps drive site selection.
    Flagship,
    /// Related brands whose co-location earns a bonus.
    Family,
}

impl std::fmt::Display for Relationship {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Relationship::Flagship => write!(f, "flagship"),
            Relationship::Family => write!(f, "family"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrandConfig {
    pub name: String,
    pub relationship: Relationship,
    pub notes: Option<String>,
}

impl BrandConfig {
    /// Generate a URL-safe slug from the brand name.
    #[must_use]
    pub fn slug(&self) -> String {
        self.name
            .to_lowercase()
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' {
                    c
                } else if c == ' ' {
                    '-'
                } else {
                    '\0'
                }
            })
            .filter(|&c| c != '\0')
            .collect::<String>()
            .split('-')
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("-")
    }
}

#[derive(Debug, Deserialize)]
pub struct BrandsFile {
    pub brands: Vec<BrandConfig>,
}

/// Brand names resolved from a validated [`BrandsFile`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrandRoster {
    pub flagship: String,
    pub family: Vec<String>,
}

impl BrandRoster {
    /// Split a validated brands file into the flagship name and family names.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] unless exactly one flagship brand is present.
    pub fn from_file(brands_file: &BrandsFile) -> Result<Self, ConfigError> {
        let mut flagship = None;
        let mut family = Vec::new();

        for brand in &brands_file.brands {
            match brand.relationship {
                Relationship::Flagship => {
                    if let Some(existing) = flagship.replace(brand.name.clone()) {
                        return Err(ConfigError::Validation(format!(
                            "multiple flagship brands: '{existing}' and '{}'",
                            brand.name
                        )));
                    }
                }
                Relationship::Family => family.push(brand.name.clone()),
            }
        }

        let flagship = flagship.ok_or_else(|| {
            ConfigError::Validation("exactly one flagship brand is required".to_string())
        })?;

        Ok(Self { flagship, family })
    }
}

/// Load and validate the brand roster from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_brands(path: &Path) -> Result<BrandRoster, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::BrandsFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_brands(&content)
}

/// Parse and validate a brand roster from YAML text.
///
/// # Errors
///
/// Returns `ConfigError` if the YAML is malformed or fails validation.
pub fn parse_brands(content: &str) -> Result<BrandRoster, ConfigError> {
    let brands_file: BrandsFile =
        serde_yaml::from_str(content).map_err(ConfigError::BrandsFileParse)?;

    validate_brands(&brands_file)?;

    BrandRoster::from_file(&brands_file)
}

fn validate_brands(brands_file: &BrandsFile) -> Result<(), ConfigError> {
    let mut seen_names = HashSet::new();
    let mut seen_slugs = HashSet::new();

    for brand in &brands_file.brands {
        if brand.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "brand name must be non-empty".to_string(),
            ));
        }

        let lower_name = brand.name.to_lowercase();
        if !seen_names.insert(lower_name) {
            return Err(ConfigError::Validation(format!(
                "duplicate brand name: '{}'",
                brand.name
            )));
        }

        let slug = brand.slug();
        if !seen_slugs.insert(slug.clone()) {
            return Err(ConfigError::Validation(format!(
                "duplicate brand slug: '{}' (from brand '{}')",
                slug, brand.name
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "brands_test.rs"]
mod tests;
