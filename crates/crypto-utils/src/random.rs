use rand::RngCore;
use rand_core::OsRng;

/// Fills `buf` from the operating system CSPRNG.
///
/// Secret material (key candidates) is generated in place so the caller can
/// keep it inside a zeroizing buffer.
pub fn fill_random(buf: &mut [u8]) {
    OsRng.fill_bytes(buf);
}

/// Generates a fixed-size array of cryptographically secure random bytes.
pub fn random_bytes_fixed<const N: usize>() -> [u8; N] {
    let mut buf = [0u8; N];
    fill_random(&mut buf);
    buf
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_random_overwrites_buffer() {
        let mut buf = [0u8; 64];
        fill_random(&mut buf);
        // Probability of 64 random bytes all being zero is negligible (2^-512).
        assert!(buf.iter().any(|&b| b != 0));
    }

    #[test]
    fn fill_random_empty_buffer_is_noop() {
        let mut buf: [u8; 0] = [];
        fill_random(&mut buf);
    }

    #[test]
    fn random_bytes_fixed_differ_between_calls() {
        let a: [u8; 32] = random_bytes_fixed();
        let b: [u8; 32] = random_bytes_fixed();
        assert_ne!(a, b);
    }

    #[test]
    fn random_bytes_fixed_correct_size() {
        let salt: [u8; 16] = random_bytes_fixed();
        assert_eq!(salt.len(), 16);
    }
}
