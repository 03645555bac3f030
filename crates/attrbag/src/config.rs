//! # Configuration
//!
//! Each bag carries a [`BagConfig`] that decides which dispatch steps are
//! active. Configuration is usually built in code, but it can also be loaded
//! from a TOML file through [`confique`]:
//!
//! ```toml
//! accessor_dispatch = true
//! catalog_dispatch = false
//! ```
//!
//! ## Available Settings
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `accessor_dispatch` | `true` | Route `getFooBar` / `setFooBar` calls to the `foo_bar` attribute |
//! | `catalog_dispatch` | `true` | Route catalog names (`sort`, `filter`, `in`, ...) to array operations |
//!
//! With `catalog_dispatch` off a bag only understands the accessor
//! convention; every other method name is undefined.

use crate::error::Result;
use confique::Config;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Dispatch settings for an [`AttrBag`](crate::AttrBag).
#[derive(Config, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct BagConfig {
    /// Resolve `get<Name>` / `set<Name>` calls to attribute access.
    #[config(default = true)]
    pub accessor_dispatch: bool,

    /// Resolve names from the array operation catalog.
    #[config(default = true)]
    pub catalog_dispatch: bool,
}

impl Default for BagConfig {
    fn default() -> Self {
        Self {
            accessor_dispatch: true,
            catalog_dispatch: true,
        }
    }
}

impl BagConfig {
    /// Load settings from a TOML file. Missing keys fall back to defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let config = Self::builder().file(path.as_ref()).load()?;
        Ok(config)
    }

    /// Accessor convention only, the way bags without the catalog behave.
    pub fn accessors_only() -> Self {
        Self {
            catalog_dispatch: false,
            ..Default::default()
        }
    }
}
