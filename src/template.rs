//! ## Command Templates
//!
//! Command strings live in an external hierarchical command set rather than
//! in the source, and may contain `{name}` placeholders that are filled in
//! with runtime values (channel number, scale, mode) just before the command
//! is sent.
//!

use once_cell::sync::Lazy;
use regex::Regex;

/// Matches a `{name}` placeholder token.
static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("placeholder regex"));

/// ### Command Lookup
///
/// Capability contract over the hierarchical command set: given an ordered
/// key path, return the command string stored at that leaf, or `None` when
/// the path does not exist.
///
pub trait CommandLookup {
    fn lookup(&self, path: &[&str]) -> Option<String>;
}

/// ### Command Template
///
/// A command string pulled from the command set, holding zero or more
/// `{name}` placeholders.
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTemplate {
    text: String,
}

impl CommandTemplate {
    pub fn new(text: impl Into<String>) -> CommandTemplate {
        CommandTemplate { text: text.into() }
    }

    /// The raw template text, placeholders included.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// An empty template resolves to an empty command, which must not be
    /// sent. Produced when the key path was missing from the command set.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Placeholder names in order of first appearance.
    pub fn placeholders(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for caps in PLACEHOLDER.captures_iter(&self.text) {
            let name = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
            if !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }

    /// ### Resolve
    ///
    /// Substitute each `{name}` occurrence with its value from `subs`.
    /// Substitution is textual and order-independent; no recursive
    /// expansion. Placeholders without a supplied value are deliberately
    /// left verbatim in the output.
    ///
    pub fn resolve(&self, subs: &[(&str, &str)]) -> String {
        PLACEHOLDER
            .replace_all(&self.text, |caps: &regex::Captures| {
                let name = &caps[1];
                match subs.iter().find(|(n, _)| *n == name) {
                    Some((_, value)) => (*value).to_string(),
                    None => caps[0].to_string(),
                }
            })
            .into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_without_placeholders_is_returned_unchanged() {
        let t = CommandTemplate::new(":AUToscale");
        assert_eq!(t.resolve(&[]), ":AUToscale");
        assert!(t.placeholders().is_empty());
    }

    #[test]
    fn placeholder_is_substituted() {
        let t = CommandTemplate::new("{channel_number}");
        assert_eq!(t.resolve(&[("channel_number", "3")]), "3");
    }

    #[test]
    fn unresolved_placeholder_is_left_verbatim() {
        let t = CommandTemplate::new("{channel_number}");
        assert_eq!(t.resolve(&[]), "{channel_number}");
    }

    #[test]
    fn substitution_is_order_independent() {
        let t = CommandTemplate::new(":CHANnel{channel_number}:DISPlay {display_state}");
        let a = t.resolve(&[("channel_number", "2"), ("display_state", "ON")]);
        let b = t.resolve(&[("display_state", "ON"), ("channel_number", "2")]);
        assert_eq!(a, ":CHANnel2:DISPlay ON");
        assert_eq!(a, b);
    }

    #[test]
    fn substitution_does_not_expand_recursively() {
        let t = CommandTemplate::new("{outer}");
        assert_eq!(t.resolve(&[("outer", "{inner}"), ("inner", "x")]), "{inner}");
    }

    #[test]
    fn repeated_placeholder_is_substituted_everywhere() {
        let t = CommandTemplate::new("{n},{n}");
        assert_eq!(t.resolve(&[("n", "5")]), "5,5");
    }

    #[test]
    fn placeholders_are_listed_in_first_appearance_order() {
        let t = CommandTemplate::new(":CHAN{channel_number}:SCAL {scale_value} # {channel_number}");
        assert_eq!(t.placeholders(), vec!["channel_number", "scale_value"]);
    }
}
