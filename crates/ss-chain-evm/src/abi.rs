//! Calldata for the storage contract's `set(string)`.

use alloy_primitives::{U64, hex};
use alloy_sol_types::{SolCall, sol};
use std::str::FromStr;

sol! {
    function set(string value);
}

pub use setCall as SetCall;

pub fn encode_set_call(value: &str) -> Vec<u8> {
    SetCall {
        value: value.to_owned(),
    }
    .abi_encode()
}

/// `0x`-prefixed hex calldata as sent in `eth_sendTransaction`.
pub fn set_call_data(value: &str) -> String {
    hex::encode_prefixed(encode_set_call(value))
}

/// JSON-RPC quantity (`0x`-prefixed hex) that fits in a `u64`.
pub(crate) fn parse_quantity(raw: &str) -> Option<u64> {
    let quantity = U64::from_str(raw).ok()?;
    Some(quantity.to::<u64>())
}
