//! Ed25519 signature verification for wallet sign-in.

use ed25519_dalek::{Signature, Verifier, VerifyingKey};

use crate::error::AuthError;

/// Verify a base58 Ed25519 signature over `message` against a base58 public key.
///
/// Returns:
/// * `Ok(true)` if the signature is valid
/// * `Ok(false)` if it is not, including when either value decodes to the
///   wrong number of bytes or the key is not a valid curve point
/// * `Err(AuthError::Decode)` if either value is not base58
pub fn verify_signature(message: &[u8], signature_b58: &str, public_key_b58: &str) -> Result<bool, AuthError> {
    let sig_bytes = bs58::decode(signature_b58.trim())
        .into_vec()
        .map_err(|e| AuthError::Decode(format!("signature is not base58: {e}")))?;
    let key_bytes = bs58::decode(public_key_b58.trim())
        .into_vec()
        .map_err(|e| AuthError::Decode(format!("public key is not base58: {e}")))?;

    let Ok(sig_array) = <[u8; 64]>::try_from(sig_bytes.as_slice()) else {
        return Ok(false);
    };
    let Ok(key_array) = <[u8; 32]>::try_from(key_bytes.as_slice()) else {
        return Ok(false);
    };
    let Ok(key) = VerifyingKey::from_bytes(&key_array) else {
        return Ok(false);
    };

    let signature = Signature::from_bytes(&sig_array);
    Ok(key.verify(message, &signature).is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use ed25519_dalek::{Signer, SigningKey};
    use patreonix_core::SIGN_IN_MESSAGE;
    use proptest::prelude::*;

    fn signed(seed: [u8; 32]) -> (String, String) {
        let sk = SigningKey::from_bytes(&seed);
        let sig = sk.sign(SIGN_IN_MESSAGE.as_bytes());
        (
            bs58::encode(sig.to_bytes()).into_string(),
            bs58::encode(sk.verifying_key().to_bytes()).into_string(),
        )
    }

    #[test]
    fn valid_signature() {
        let (sig, pk) = signed([7; 32]);
        assert!(verify_signature(SIGN_IN_MESSAGE.as_bytes(), &sig, &pk).unwrap());
    }

    #[test]
    fn other_message_fails() {
        let (sig, pk) = signed([7; 32]);
        assert!(!verify_signature(b"Sign into something else", &sig, &pk).unwrap());
    }

    #[test]
    fn wrong_lengths_fail_closed() {
        let (sig, pk) = signed([7; 32]);
        let short = bs58::encode([1u8; 10]).into_string();
        assert!(!verify_signature(SIGN_IN_MESSAGE.as_bytes(), &short, &pk).unwrap());
        assert!(!verify_signature(SIGN_IN_MESSAGE.as_bytes(), &sig, &short).unwrap());
    }

    #[test]
    fn non_base58_is_decode_error() {
        let (sig, pk) = signed([7; 32]);
        assert_matches!(
            verify_signature(SIGN_IN_MESSAGE.as_bytes(), "0OIl", &pk),
            Err(AuthError::Decode(_))
        );
        assert_matches!(
            verify_signature(SIGN_IN_MESSAGE.as_bytes(), &sig, "not base58!"),
            Err(AuthError::Decode(_))
        );
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn any_keypair_verifies(seed in any::<[u8; 32]>()) {
            let (sig, pk) = signed(seed);
            prop_assert!(verify_signature(SIGN_IN_MESSAGE.as_bytes(), &sig, &pk).unwrap());
        }

        #[test]
        fn single_bit_flip_in_signature_fails(seed in any::<[u8; 32]>(), bit in 0usize..512) {
            let sk = SigningKey::from_bytes(&seed);
            let mut sig = sk.sign(SIGN_IN_MESSAGE.as_bytes()).to_bytes();
            sig[bit / 8] ^= 1 << (bit % 8);
            let sig = bs58::encode(sig).into_string();
            let pk = bs58::encode(sk.verifying_key().to_bytes()).into_string();
            prop_assert!(!verify_signature(SIGN_IN_MESSAGE.as_bytes(), &sig, &pk).unwrap());
        }

        #[test]
        fn single_bit_flip_in_public_key_fails(seed in any::<[u8; 32]>(), bit in 0usize..256) {
            let sk = SigningKey::from_bytes(&seed);
            let sig = bs58::encode(sk.sign(SIGN_IN_MESSAGE.as_bytes()).to_bytes()).into_string();
            let mut pk = sk.verifying_key().to_bytes();
            pk[bit / 8] ^= 1 << (bit % 8);
            let pk = bs58::encode(pk).into_string();
            prop_assert!(!verify_signature(SIGN_IN_MESSAGE.as_bytes(), &sig, &pk).unwrap());
        }
    }
}
