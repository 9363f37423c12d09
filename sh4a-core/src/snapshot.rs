//! Save states
//!
//! A snapshot is the full [`ProcessorState`] wrapped in a small JSON
//! envelope carrying a format version. Memory is not included.

use serde::{Deserialize, Serialize};

use crate::cpu::ProcessorState;
use crate::{Sh4Error, Sh4Result};

pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct Envelope {
    version: u32,
    state: ProcessorState,
}

/// Serialize `state` to snapshot bytes
pub fn save_state(state: &ProcessorState) -> Sh4Result<Vec<u8>> {
    let envelope = Envelope {
        version: SNAPSHOT_VERSION,
        state: state.clone(),
    };
    Ok(serde_json::to_vec_pretty(&envelope)?)
}

/// Restore a state written by [`save_state`]
pub fn load_state(bytes: &[u8]) -> Sh4Result<ProcessorState> {
    let envelope: Envelope = serde_json::from_slice(bytes)?;
    if envelope.version != SNAPSHOT_VERSION {
        return Err(Sh4Error::SnapshotVersion {
            found: envelope.version,
            expected: SNAPSHOT_VERSION,
        });
    }
    Ok(envelope.state)
}
