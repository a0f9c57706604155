//! Closed enumerations and identifiers used across the pipeline

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::str::FromStr;

/// Tenant scope (store view) that configuration and context are resolved for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct StoreScope(pub u32);

impl Display for StoreScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for StoreScope {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

/// Which configured model a completion call runs against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelKind {
    /// Planning model used for the technical design stage
    Thinking,
    /// Model used to produce the final HTML
    Rendering,
}

impl ModelKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ModelKind::Thinking => "thinking",
            ModelKind::Rendering => "rendering",
        }
    }
}

impl Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "thinking" => Ok(ModelKind::Thinking),
            "rendering" => Ok(ModelKind::Rendering),
            _ => Err(format!("Unknown model kind: {s}")),
        }
    }
}

/// Kind of catalog entity a page is generated for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSourceKind {
    Product,
    Category,
}

impl DataSourceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DataSourceKind::Product => "product",
            DataSourceKind::Category => "category",
        }
    }
}

impl Display for DataSourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataSourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "product" => Ok(DataSourceKind::Product),
            "category" => Ok(DataSourceKind::Category),
            _ => Err(format!("Unknown data source type: {s}")),
        }
    }
}

/// A catalog entity reference, e.g. `product:42`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSource {
    pub kind: DataSourceKind,
    pub id: String,
}

impl DataSource {
    pub fn new(kind: DataSourceKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }
}

impl Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

impl FromStr for DataSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, id) = s
            .split_once(':')
            .ok_or_else(|| format!("Expected <type>:<id>, got: {s}"))?;
        let id = id.trim();
        if id.is_empty() {
            return Err(format!("Missing id in data source: {s}"));
        }
        Ok(Self::new(kind.trim().parse()?, id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_kind_from_str() {
        assert_eq!(ModelKind::from_str("thinking").unwrap(), ModelKind::Thinking);
        assert_eq!(ModelKind::from_str("RENDERING").unwrap(), ModelKind::Rendering);
        assert!(ModelKind::from_str("drawing").is_err());
    }

    #[test]
    fn test_data_source_parse() {
        let source: DataSource = "product:42".parse().unwrap();
        assert_eq!(source.kind, DataSourceKind::Product);
        assert_eq!(source.id, "42");
        assert_eq!(source.to_string(), "product:42");

        assert!("category:".parse::<DataSource>().is_err());
        assert!("page:3".parse::<DataSource>().is_err());
        assert!("42".parse::<DataSource>().is_err());
    }
}
