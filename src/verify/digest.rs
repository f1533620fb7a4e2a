use sha2::{Digest, Sha256};

/// One-way hash used by the digest verification methods
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DigestAlgorithm {
    /// MD5 (16-byte digest)
    Md5,
    /// SHA-256 (32-byte digest)
    Sha256,
}

impl DigestAlgorithm {
    /// Raw digest bytes of `input`
    pub fn digest(&self, input: &[u8]) -> Vec<u8> {
        match self {
            DigestAlgorithm::Md5 => md5::compute(input).0.to_vec(),
            DigestAlgorithm::Sha256 => Sha256::digest(input).to_vec(),
        }
    }

    /// Lowercase hex digest of `input`
    pub fn hex(&self, input: &str) -> String {
        self.digest(input.as_bytes())
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn md5_known_vector() {
        assert_eq!(
            DigestAlgorithm::Md5.hex("1234"),
            "81dc9bdb52d04dc20036dbd8313ed055"
        );
    }

    #[test]
    fn sha256_known_vector() {
        assert_eq!(
            DigestAlgorithm::Sha256.hex("1234"),
            "03ac674216f3e15c761ee1a5e255f067953623c8b388b4459e13f978d7c846f4"
        );
    }

    #[test]
    fn digest_lengths() {
        assert_eq!(DigestAlgorithm::Md5.digest(b"").len(), 16);
        assert_eq!(DigestAlgorithm::Sha256.digest(b"").len(), 32);
    }
}
