//! Keeper wallet signing
//!
//! Holds the ed25519 signing key derived from WALLET_SECRET_SEED and signs
//! transaction envelopes. The signature covers the SHA-256 of the network
//! passphrase concatenated with the envelope bytes, so a signature for one
//! network is never valid on another.

use ed25519_dalek::{Signer, SigningKey};
use sha2::{Digest, Sha256};

use crate::types::{KeeperError, Result};

/// Signing identity for the keeper wallet
pub struct KeeperSigner {
    signing_key: SigningKey,
    network_passphrase: String,
}

impl KeeperSigner {
    /// Build a signer from a hex-encoded 32-byte ed25519 seed
    pub fn from_hex_seed(seed_hex: &str, network_passphrase: &str) -> Result<Self> {
        let seed = hex::decode(seed_hex.trim())
            .map_err(|e| KeeperError::Config(format!("Invalid wallet seed hex: {e}")))?;

        let seed: [u8; 32] = seed
            .try_into()
            .map_err(|_| KeeperError::Config("Wallet seed must be 32 bytes".to_string()))?;

        Ok(Self {
            signing_key: SigningKey::from_bytes(&seed),
            network_passphrase: network_passphrase.to_string(),
        })
    }

    /// Hex-encoded public key of the keeper wallet
    pub fn public_key(&self) -> String {
        hex::encode(self.signing_key.verifying_key().as_bytes())
    }

    /// Sign an envelope, returning the hex-encoded signature
    pub fn sign_envelope(&self, envelope: &[u8]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.network_passphrase.as_bytes());
        hasher.update(envelope);
        let digest = hasher.finalize();

        let signature = self.signing_key.sign(&digest);
        hex::encode(signature.to_bytes())
    }
}
