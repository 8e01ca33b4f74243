//! Command implementations
//!
//! Every command loads and validates the declaration the same way before
//! doing its own work, so an invalid file fails identically everywhere.

pub mod diff;
pub mod graph;
pub mod kinds;
pub mod outputs;
pub mod plan;
pub mod snapshot;
pub mod validate;

use crate::Context;
use crate::cli::SourceArgs;
use crate::engine::{self, Loaded, loader};
use crate::paths;
use crate::schema::Declaration;
use anyhow::{Context as AnyhowContext, Result};
use declarative::Order;
use std::path::PathBuf;

/// A declaration that loaded and validated
pub struct Validated {
    pub path: PathBuf,
    pub loaded: Loaded,
    pub order: Order,
}

/// Load, resolve and validate the declaration named by `args`
pub fn load_validated(ctx: &Context, args: &SourceArgs) -> Result<Validated> {
    let path = paths::expand(&args.file.to_string_lossy());
    let decl = Declaration::load(&path)?;

    let loaded = loader::load_with_overrides(&decl, &args.vars)
        .with_context(|| format!("Invalid declaration: {}", path.display()))?;
    let order = engine::validate(&loaded)
        .with_context(|| format!("Invalid declaration: {}", path.display()))?;

    if ctx.verbose > 0 {
        log::info!(
            "{}: {} resources, {} variables",
            path.display(),
            loaded.graph.len(),
            loaded.variables.len()
        );
    }

    Ok(Validated { path, loaded, order })
}
