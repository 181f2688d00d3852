use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PolicyId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ClaimId(pub u64);

/// Logical time supplied by the clock port. One unit = one block in the
/// sequence the embedding transport observes. The ledger never interprets
/// heights beyond recording them as policy start markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BlockHeight(pub u64);

impl BlockHeight {
    /// Advance by a number of blocks — used to stamp successive workload
    /// operations without a shared scheduler.
    pub fn offset(self, blocks: u64) -> Self {
        BlockHeight(self.0 + blocks)
    }
}

/// Opaque caller identity. The ledger only ever compares identities for
/// equality; resolution (signatures, sessions) is the transport's problem.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Identity(pub String);

impl Identity {
    pub fn new(s: impl Into<String>) -> Self {
        Identity(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Identity {
    fn from(s: &str) -> Self {
        Identity(s.to_string())
    }
}

impl std::fmt::Display for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_height_offset_advances() {
        assert_eq!(BlockHeight(10).offset(5), BlockHeight(15));
        assert_eq!(BlockHeight(0).offset(0), BlockHeight(0));
    }

    #[test]
    fn identity_equality_is_string_equality() {
        assert_eq!(Identity::from("user1"), Identity::new("user1".to_string()));
        assert_ne!(Identity::from("user1"), Identity::from("user2"));
    }

    #[test]
    fn identity_displays_raw_string() {
        assert_eq!(Identity::from("pool-admin").to_string(), "pool-admin");
    }

    #[test]
    fn ids_serialize_as_bare_integers() {
        assert_eq!(serde_json::to_string(&PolicyId(7)).unwrap(), "7");
        assert_eq!(serde_json::to_string(&ClaimId(0)).unwrap(), "0");
        assert_eq!(serde_json::to_string(&BlockHeight(144)).unwrap(), "144");
    }
}
