use crate::filter::{FilterError, PropertyFilter};
use crate::registry::ObjectType;
use anyhow::Context;
use serde::Deserialize;
use std::{fs, path::Path};

/// Startup options for a [`crate::PropertyEditor`], usually read from a JSON5 file:
///
/// ```json5
/// {
///   pages: ["City", "Unit"],
///   lazyPages: true,
///   propertyFilter: "!id",
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct EditorOptions {
    /// Object types that get a page. Order is page order.
    pub pages: Vec<ObjectType>,
    /// Create pages on first use instead of at startup.
    pub lazy_pages: bool,
    /// Initial property-name filter applied to every page.
    pub property_filter: String,
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            pages: ObjectType::ALL.to_vec(),
            lazy_pages: false,
            property_filter: String::new(),
        }
    }
}

impl EditorOptions {
    pub fn parse_json5(text: &str) -> anyhow::Result<Self> {
        let options: Self = json5::from_str(text).context("parsing editor options")?;
        options.filter().context("validating editor options")?;
        Ok(options)
    }

    pub fn load_path(path: &Path) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path).with_context(|| format!("reading {path:?}"))?;
        Self::parse_json5(&text).with_context(|| format!("loading {path:?}"))
    }

    pub fn filter(&self) -> Result<PropertyFilter, FilterError> {
        PropertyFilter::parse(&self.property_filter)
    }

    pub fn has_page(&self, object_type: ObjectType) -> bool {
        self.pages.contains(&object_type)
    }
}
