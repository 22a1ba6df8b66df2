//! ABI encoding for the synthetic bridge `burn` call.
//!
//! Scheduled and random transfers are modeled as calls into a bridge contract
//! that burns value toward a 32-byte recipient on the destination chain. The
//! engine treats the calldata as an opaque blob; it only needs the encoding to
//! be well-formed.

use alloy_primitives::{B256, Bytes, U256, keccak256};
use alloy_sol_types::{SolCall, sol};

sol! {
    /// The bridge burn entrypoint invoked by every synthetic transfer.
    function burn(bytes32 recipient, uint256 amount);
}

/// Signature of the event emitted by the bridge on a successful burn.
pub const BURN_EVENT_SIGNATURE: &str = "Burn(address,bytes32,uint256)";

/// Returns the log topic for [`BURN_EVENT_SIGNATURE`].
pub fn burn_event_topic() -> B256 {
    keccak256(BURN_EVENT_SIGNATURE.as_bytes())
}

/// Encodes the calldata for a `burn(bytes32,uint256)` invocation.
pub fn burn_calldata(recipient: B256, amount: U256) -> Bytes {
    burnCall { recipient, amount }.abi_encode().into()
}
