use serde::{Deserialize, Serialize};

/// Which of the two simulated entities an event or snapshot refers to.
///
/// The roles are fixed per match slot, not per controller: in AI-vs-AI mode
/// the `Human` slot is driven by a second AI but still carries the scored
/// death counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityRole {
    Human,
    Ai,
}

impl EntityRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityRole::Human => "human",
            EntityRole::Ai => "ai",
        }
    }
}

impl std::fmt::Display for EntityRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Horizontal facing of an entity, used by renderers to orient sprites.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Facing {
    Left,
    #[default]
    Right,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_display_matches_wire_name() {
        assert_eq!(EntityRole::Ai.to_string(), "ai");
        assert_eq!(EntityRole::Human.to_string(), "human");
    }
}
