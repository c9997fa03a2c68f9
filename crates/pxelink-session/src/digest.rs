/// Starting accumulator shared with the device receiver.
pub const DIGEST_SEED: u32 = 0x1234_5678;

/// Rolling integrity digest carried in the BEGIN message.
///
/// `acc = (acc * 33) ^ byte`, wrapping at 32 bits. This is not a CRC and
/// must stay bit-for-bit identical to the receiver's accumulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Digest {
    acc: u32,
}

impl Digest {
    /// Start a new digest at the seed.
    pub fn new() -> Self {
        Self { acc: DIGEST_SEED }
    }

    /// Fold `data` into the digest.
    pub fn update(&mut self, data: &[u8]) {
        self.acc = data
            .iter()
            .fold(self.acc, |acc, &b| acc.wrapping_mul(33) ^ u32::from(b));
    }

    /// Current digest value.
    pub fn value(&self) -> u32 {
        self.acc
    }
}

impl Default for Digest {
    fn default() -> Self {
        Self::new()
    }
}

/// Digest of `data` in one pass.
pub fn digest(data: &[u8]) -> u32 {
    let mut d = Digest::new();
    d.update(data);
    d.value()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_is_seed() {
        assert_eq!(digest(b""), DIGEST_SEED);
    }

    #[test]
    fn known_values() {
        assert_eq!(digest(&[0x01]), 0x58BF_2579);
        assert_eq!(digest(b"hello"), 0x3F24_44FA);
    }

    #[test]
    fn deterministic() {
        let data: Vec<u8> = (0..=255u8).cycle().take(4096).collect();
        assert_eq!(digest(&data), digest(&data));
    }

    #[test]
    fn order_sensitive() {
        assert_ne!(digest(b"ab"), digest(b"ba"));
    }

    #[test]
    fn single_bit_flips_change_digest() {
        let data: Vec<u8> = (0..532u32).map(|i| (i * 7 % 256) as u8).collect();
        let reference = digest(&data);
        for pos in [0usize, 1, 100, 531] {
            for bit in 0..8 {
                let mut flipped = data.clone();
                flipped[pos] ^= 1 << bit;
                assert_ne!(digest(&flipped), reference, "pos {pos} bit {bit}");
            }
        }
    }

    #[test]
    fn incremental_matches_one_shot() {
        let data: Vec<u8> = (0..1000u32).map(|i| (i % 253) as u8).collect();
        let mut d = Digest::default();
        for chunk in data.chunks(240) {
            d.update(chunk);
        }
        assert_eq!(d.value(), digest(&data));
    }
}
