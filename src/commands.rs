//! ## Command Set
//!
//! The hierarchical command set, loaded from a YAML document. Leaves are
//! SCPI command templates; interior nodes group them by concern
//! (`channels`, `measurements`, `acquisition`, `utils`). Sequences are
//! addressed by numeric path segment, so `acquisition/types/1` selects the
//! second acquisition mode token.
//!

use crate::template::CommandLookup;

use anyhow::{Context, Result};
use serde_yaml::Value;
use std::path::Path;

/// ### Command Set
///
/// A queryable tree of command templates parsed from YAML.
///
#[derive(Debug, Clone)]
pub struct CommandSet {
    root: Value,
}

impl CommandSet {
    /// Parse a command set from YAML text.
    pub fn from_str(text: &str) -> Result<CommandSet> {
        let root: Value = serde_yaml::from_str(text).context("failed to parse command set")?;
        Ok(CommandSet { root })
    }

    /// Load and parse a command set from a YAML file on disk.
    pub fn from_file(path: impl AsRef<Path>) -> Result<CommandSet> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read command set {}", path.display()))?;
        CommandSet::from_str(&text)
    }

    fn node_at(&self, path: &[&str]) -> Option<&Value> {
        let mut node = &self.root;
        for key in path {
            node = match node {
                Value::Mapping(map) => map.get(*key)?,
                // numeric segments index into sequences
                Value::Sequence(seq) => seq.get(key.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(node)
    }
}

impl CommandLookup for CommandSet {
    /// Walk the tree by the ordered key path. Only scalar leaves resolve;
    /// addressing an interior node yields `None`.
    fn lookup(&self, path: &[&str]) -> Option<String> {
        match self.node_at(path)? {
            Value::String(text) => Some(text.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COMMANDS: &str = r#"
utils:
  autoscale: ":AUToscale"
channels:
  display_state: ":CHANnel{channel_number}:DISPlay {display_state}"
  states:
    "on": "ON"
    "off": "OFF"
  scale:
    vertical: ":CHANnel{channel_number}:SCALe {scale_value}"
acquisition:
  acq_count: ":ACQuire:COUNt {count}"
  mode: ":ACQuire:TYPE {acquire_mode}"
  types:
    - NORMal
    - AVERage
    - HRESolution
"#;

    #[test]
    fn looks_up_nested_leaf() {
        let set = CommandSet::from_str(COMMANDS).unwrap();
        assert_eq!(
            set.lookup(&["channels", "scale", "vertical"]).as_deref(),
            Some(":CHANnel{channel_number}:SCALe {scale_value}")
        );
    }

    #[test]
    fn indexes_sequences_by_numeric_segment() {
        let set = CommandSet::from_str(COMMANDS).unwrap();
        assert_eq!(set.lookup(&["acquisition", "types", "1"]).as_deref(), Some("AVERage"));
        assert_eq!(set.lookup(&["acquisition", "types", "9"]), None);
    }

    #[test]
    fn missing_path_is_not_found() {
        let set = CommandSet::from_str(COMMANDS).unwrap();
        assert_eq!(set.lookup(&["channels", "scale", "diagonal"]), None);
        assert_eq!(set.lookup(&["nonsense"]), None);
    }

    #[test]
    fn interior_node_is_not_a_command() {
        let set = CommandSet::from_str(COMMANDS).unwrap();
        assert_eq!(set.lookup(&["channels", "scale"]), None);
    }

    #[test]
    fn malformed_yaml_is_rejected() {
        assert!(CommandSet::from_str("a: [unclosed").is_err());
    }
}
