use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use declarative::{Graph, Snapshot};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

// ============================================================================
// State Structures
// ============================================================================

/// A recorded snapshot of an applied graph, as written to disk
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct StateFile {
    /// When the snapshot was recorded
    pub recorded_at: DateTime<Utc>,

    /// Declaration file the graph was loaded from
    #[serde(default)]
    pub source: String,

    #[serde(flatten)]
    pub snapshot: Snapshot,
}

impl StateFile {
    /// Record a graph now
    pub fn record(graph: &Graph, source: &Path) -> Self {
        Self {
            recorded_at: Utc::now(),
            source: source.display().to_string(),
            snapshot: Snapshot::from_graph(graph),
        }
    }

    /// Load a state file, or `None` if nothing was recorded yet
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            log::debug!("State file {} does not exist", path.display());
            return Ok(None);
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read state file: {}", path.display()))?;

        let state: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse state file: {}", path.display()))?;

        if state.snapshot.version != declarative::SNAPSHOT_VERSION {
            anyhow::bail!(
                "State file {} has version {}, expected {}",
                path.display(),
                state.snapshot.version,
                declarative::SNAPSHOT_VERSION
            );
        }

        log::debug!("Loaded state from {}", path.display());
        Ok(Some(state))
    }

    /// Save state to disk
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create state directory: {}", dir.display()))?;
        }

        let content = serde_json::to_string_pretty(self).context("Failed to serialize state to JSON")?;

        fs::write(path, content)
            .with_context(|| format!("Failed to write state file: {}", path.display()))?;

        log::debug!("Saved state to {}", path.display());
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use declarative::{Node, NodeId, Reference, Value};
    use tempfile::TempDir;

    fn graph() -> Graph {
        Graph::new(vec![
            Node::new(NodeId::new("vpc", "main"))
                .with_attribute("cidr_block", Value::String("10.0.0.0/16".into())),
            Node::new(NodeId::new("subnet", "a"))
                .with_attribute("vpc_id", Value::Reference(Reference::parse("vpc.main.id").unwrap()))
                .with_attribute("cidr_block", Value::String("10.0.1.0/24".into())),
        ])
        .unwrap()
    }

    #[test]
    fn test_missing_state_is_none() {
        let temp = TempDir::new().unwrap();
        assert!(StateFile::load(&temp.path().join("snapshot.json")).unwrap().is_none());
    }

    #[test]
    fn test_save_and_load() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("snapshot.json");

        let state = StateFile::record(&graph(), Path::new("infra.toml"));
        state.save(&path).unwrap();

        let loaded = StateFile::load(&path).unwrap().unwrap();
        assert_eq!(loaded.source, "infra.toml");
        assert_eq!(loaded.recorded_at, state.recorded_at);
        assert_eq!(loaded.snapshot.resources, state.snapshot.resources);

        let restored = loaded.snapshot.to_graph().unwrap();
        assert!(restored.contains(&NodeId::new("subnet", "a")));
    }

    #[test]
    fn test_rejects_unknown_version() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("snapshot.json");
        fs::write(
            &path,
            r#"{"recorded_at":"2026-01-01T00:00:00Z","source":"x","version":99,"resources":[]}"#,
        )
        .unwrap();
        let err = StateFile::load(&path).unwrap_err();
        assert!(err.to_string().contains("version 99"));
    }

    #[test]
    fn test_rejects_garbage() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("snapshot.json");
        fs::write(&path, "not json").unwrap();
        assert!(StateFile::load(&path).is_err());
    }
}
