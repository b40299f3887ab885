//! Chain awareness state.

use serde::Serialize;

/// Where an observation came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ObservationSource {
    /// Result of an explicit network-id query.
    Query,
    /// Provider-pushed `chainChanged` notification.
    Event,
}

impl ObservationSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObservationSource::Query => "query",
            ObservationSource::Event => "event",
        }
    }
}

/// One observed value of the active chain.
///
/// `seq` is assigned on arrival and strictly increases, so the observation
/// with the highest `seq` is the authoritative one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChainObservation {
    pub chain_id: u64,
    pub seq: u64,
    pub source: ObservationSource,
}

/// Last known active chain. Stale between observations, never auto-cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ActiveChain {
    #[default]
    Unknown,
    Known(ChainObservation),
}

impl ActiveChain {
    pub fn chain_id(&self) -> Option<u64> {
        match self {
            ActiveChain::Unknown => None,
            ActiveChain::Known(observation) => Some(observation.chain_id),
        }
    }

    /// Sequence number of the latest observation, 0 before the first.
    pub fn seq(&self) -> u64 {
        match self {
            ActiveChain::Unknown => 0,
            ActiveChain::Known(observation) => observation.seq,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_defaults() {
        let chain = ActiveChain::default();
        assert_eq!(chain.chain_id(), None);
        assert_eq!(chain.seq(), 0);
    }

    #[test]
    fn test_known_serializes_with_state_tag() {
        let chain = ActiveChain::Known(ChainObservation {
            chain_id: 4,
            seq: 2,
            source: ObservationSource::Event,
        });
        let json = serde_json::to_value(chain).unwrap();
        assert_eq!(json["state"], "known");
        assert_eq!(json["chain_id"], 4);
        assert_eq!(json["source"], "event");
    }
}
