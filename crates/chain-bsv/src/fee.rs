//! Fee estimation and dust policy.

use serde::{Deserialize, Serialize};

use crate::encoding::compact_size_len;
use crate::error::BsvError;
use crate::script::pushdata_code;

pub const DEFAULT_SATS_PER_BYTE: f64 = 0.5;

/// Outputs at or below this value are not worth creating.
pub const DUST_THRESHOLD: u64 = 546;

/// version(4)
const VERSION_BYTES: usize = 4;
/// lock_time(4)
const LOCK_TIME_BYTES: usize = 4;
/// outpoint(36) + scriptSig(~107 with a compressed key) + sequence(4) + overhead
const INPUT_BYTES_COMPRESSED: usize = 148;
/// As above with a 65-byte public key in the scriptSig.
const INPUT_BYTES_UNCOMPRESSED: usize = 180;
/// amount(8) + script length(1) + P2PKH script(25)
const OUTPUT_BYTES: usize = 34;
/// amount(8) + OP_FALSE OP_RETURN(2)
const DATA_OUTPUT_OVERHEAD: usize = 10;

/// Fee rate and dust threshold applied when building transactions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeePolicy {
    pub sats_per_byte: f64,
    pub dust_threshold: u64,
}

impl Default for FeePolicy {
    fn default() -> Self {
        Self {
            sats_per_byte: DEFAULT_SATS_PER_BYTE,
            dust_threshold: DUST_THRESHOLD,
        }
    }
}

impl FeePolicy {
    pub fn validate(&self) -> Result<(), BsvError> {
        if !self.sats_per_byte.is_finite() || self.sats_per_byte < 0.0 {
            return Err(BsvError::TransactionBuildError(format!(
                "invalid fee rate {} sat/byte",
                self.sats_per_byte
            )));
        }
        Ok(())
    }

    /// Fee for a transaction of the given shape.
    pub fn estimate_fee(
        &self,
        n_in: usize,
        n_out: usize,
        compressed: bool,
        op_return_size: usize,
    ) -> u64 {
        estimate_fee(n_in, n_out, self.sats_per_byte, compressed, op_return_size)
    }

    /// Fee for an exact serialized size.
    pub fn fee_for_size(&self, size: usize) -> u64 {
        fee_for_size(size, self.sats_per_byte)
    }

    /// Whether a change amount would be swallowed rather than paid out.
    pub fn is_dust(&self, amount: u64) -> bool {
        amount <= self.dust_threshold
    }
}

/// Estimated serialized size of a P2PKH transaction.
///
/// `n_out` counts payment outputs only. Data outputs are accounted for in
/// `op_return_size` (see [`op_return_size`]).
pub fn estimate_size(n_in: usize, n_out: usize, compressed: bool, op_return_size: usize) -> usize {
    let input_bytes = if compressed {
        INPUT_BYTES_COMPRESSED
    } else {
        INPUT_BYTES_UNCOMPRESSED
    };
    VERSION_BYTES
        + n_in * input_bytes
        + compact_size_len(n_in as u64)
        + n_out * OUTPUT_BYTES
        + compact_size_len(n_out as u64)
        + op_return_size
        + LOCK_TIME_BYTES
}

/// `ceil(estimated_size * sats_per_byte)`, zero when the rate is zero.
pub fn estimate_fee(
    n_in: usize,
    n_out: usize,
    sats_per_byte: f64,
    compressed: bool,
    op_return_size: usize,
) -> u64 {
    if sats_per_byte == 0.0 {
        return 0;
    }
    let size = estimate_size(n_in, n_out, compressed, op_return_size);
    let fee = fee_for_size(size, sats_per_byte);
    tracing::debug!(
        fee,
        size,
        n_in,
        n_out,
        sats_per_byte,
        "estimated fee"
    );
    fee
}

fn fee_for_size(size: usize, sats_per_byte: f64) -> u64 {
    (size as f64 * sats_per_byte).ceil() as u64
}

/// Serialized size of one data output carrying `message`, including the
/// varint that precedes its script.
pub fn op_return_size(message: &[u8]) -> Result<usize, BsvError> {
    let size = DATA_OUTPUT_OVERHEAD + pushdata_code(message.len())?.len() + message.len();
    Ok(size + compact_size_len(size as u64))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_in_two_out_compressed() {
        assert_eq!(estimate_size(2, 2, true, 0), 374);
        assert_eq!(estimate_fee(2, 2, 0.5, true, 0), 187);
    }

    #[test]
    fn one_in_one_out_compressed() {
        assert_eq!(estimate_size(1, 1, true, 0), 192);
        assert_eq!(estimate_fee(1, 1, 0.5, true, 0), 96);
    }

    #[test]
    fn uncompressed_inputs_are_larger() {
        assert_eq!(
            estimate_size(3, 1, false, 0) - estimate_size(3, 1, true, 0),
            3 * 32
        );
    }

    #[test]
    fn fee_rounds_up() {
        // 4 + 148 + 1 + 34 + 1 + 4 = 192 bytes; 192 * 0.3 = 57.6
        assert_eq!(estimate_fee(1, 1, 0.3, true, 0), 58);
    }

    #[test]
    fn zero_rate_is_free() {
        assert_eq!(estimate_fee(10, 10, 0.0, true, 100), 0);
        let policy = FeePolicy {
            sats_per_byte: 0.0,
            ..FeePolicy::default()
        };
        assert_eq!(policy.estimate_fee(1, 1, true, 0), 0);
    }

    #[test]
    fn varint_grows_past_252_inputs() {
        assert_eq!(
            estimate_size(253, 1, true, 0) - estimate_size(252, 1, true, 0),
            148 + 2
        );
    }

    #[test]
    fn op_return_sizes() {
        assert_eq!(op_return_size(b"hello").unwrap(), 8 + 2 + 1 + 5 + 1);
        assert_eq!(op_return_size(&[0u8; 100]).unwrap(), 8 + 2 + 2 + 100 + 1);
        // 8 + 2 + 3 + 300 = 313 needs a 3-byte varint.
        assert_eq!(op_return_size(&[0u8; 300]).unwrap(), 313 + 3);
    }

    #[test]
    fn default_policy() {
        let policy = FeePolicy::default();
        assert_eq!(policy.sats_per_byte, 0.5);
        assert_eq!(policy.dust_threshold, 546);
        assert!(policy.is_dust(546));
        assert!(!policy.is_dust(547));
        assert_eq!(policy.fee_for_size(375), 188);
    }

    #[test]
    fn invalid_rates_rejected() {
        for rate in [-1.0, f64::NAN, f64::INFINITY] {
            let policy = FeePolicy {
                sats_per_byte: rate,
                ..FeePolicy::default()
            };
            assert!(policy.validate().is_err(), "{rate}");
        }
        assert!(FeePolicy::default().validate().is_ok());
    }

    #[test]
    fn policy_deserializes_with_defaults() {
        let policy: FeePolicy = serde_json::from_str(r#"{"sats_per_byte": 1.0}"#).unwrap();
        assert_eq!(policy.sats_per_byte, 1.0);
        assert_eq!(policy.dust_threshold, DUST_THRESHOLD);
    }
}
