//! RSA key handling and payload signing
//!
//! The license payload is signed with RSA-PSS (MGF1-SHA256, maximum salt
//! length, SHA-256 message digest). Private keys persist as PKCS#8 PEM,
//! optionally passphrase-encrypted; public keys as SubjectPublicKeyInfo
//! PEM. The signer side holds the private key; validators load only the
//! public key.

use std::fs;
use std::path::Path;

use rand::rngs::OsRng;
use rsa::pkcs8::{
    DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey, LineEnding,
};
use rsa::traits::PublicKeyParts;
use rsa::{Pss, RsaPrivateKey, RsaPublicKey};
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use crate::error::Result;

/// Reference key size; yields 256-byte signatures
pub const DEFAULT_KEY_BITS: usize = 2048;

const SHA256_LEN: usize = 32;

/// Generate a fresh RSA keypair of the given modulus size
pub fn generate_keypair(bits: usize) -> Result<(RsaPrivateKey, RsaPublicKey)> {
    let mut rng = OsRng;
    let private = RsaPrivateKey::new(&mut rng, bits)?;
    let public = RsaPublicKey::from(&private);
    Ok((private, public))
}

/// PSS scheme with the maximum salt length for a given modulus size
///
/// emLen - hLen - 2, matching "salt length = PSS max" on the signing side.
/// The same length must be used for verification.
fn pss_max_salt(modulus_bytes: usize) -> Pss {
    Pss::new_with_salt::<Sha256>(modulus_bytes - SHA256_LEN - 2)
}

/// Sign payload bytes, returning a `modulus_bytes`-long signature
pub fn sign_payload(private_key: &RsaPrivateKey, payload: &[u8]) -> Result<Vec<u8>> {
    let digest: [u8; SHA256_LEN] = Sha256::digest(payload).into();
    let mut rng = OsRng;
    let signature = private_key.sign_with_rng(&mut rng, pss_max_salt(private_key.size()), &digest)?;
    Ok(signature)
}

/// Verify a payload signature; any failure is reported as `false`
pub fn verify_payload(public_key: &RsaPublicKey, payload: &[u8], signature: &[u8]) -> bool {
    let digest: [u8; SHA256_LEN] = Sha256::digest(payload).into();
    public_key
        .verify(pss_max_salt(public_key.size()), &digest, signature)
        .is_ok()
}

/// Save a private key as PKCS#8 PEM, encrypted when a passphrase is given
pub fn save_private_key_pem(
    key: &RsaPrivateKey,
    path: impl AsRef<Path>,
    passphrase: Option<&str>,
) -> Result<()> {
    let pem: Zeroizing<String> = match passphrase {
        Some(passphrase) => key.to_pkcs8_encrypted_pem(&mut OsRng, passphrase, LineEnding::LF)?,
        None => key.to_pkcs8_pem(LineEnding::LF)?,
    };
    fs::write(path.as_ref(), pem.as_bytes())?;
    Ok(())
}

/// Load a PKCS#8 PEM private key, decrypting when a passphrase is given
pub fn load_private_key_pem(
    path: impl AsRef<Path>,
    passphrase: Option<&str>,
) -> Result<RsaPrivateKey> {
    let pem = Zeroizing::new(fs::read_to_string(path.as_ref())?);
    let key = match passphrase {
        Some(passphrase) => RsaPrivateKey::from_pkcs8_encrypted_pem(&pem, passphrase)?,
        None => RsaPrivateKey::from_pkcs8_pem(&pem)?,
    };
    Ok(key)
}

/// Save a public key as SubjectPublicKeyInfo PEM
pub fn save_public_key_pem(key: &RsaPublicKey, path: impl AsRef<Path>) -> Result<()> {
    let pem = key.to_public_key_pem(LineEnding::LF)?;
    fs::write(path.as_ref(), pem.as_bytes())?;
    Ok(())
}

/// Load a SubjectPublicKeyInfo PEM public key
pub fn load_public_key_pem(path: impl AsRef<Path>) -> Result<RsaPublicKey> {
    let pem = fs::read_to_string(path.as_ref())?;
    let key = RsaPublicKey::from_public_key_pem(&pem)?;
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use once_cell::sync::Lazy;

    // RSA keygen is slow enough that the test keypair is shared.
    static KEYPAIR: Lazy<(RsaPrivateKey, RsaPublicKey)> =
        Lazy::new(|| generate_keypair(DEFAULT_KEY_BITS).unwrap());

    #[test]
    fn test_sign_and_verify() {
        let (private, public) = &*KEYPAIR;
        let payload = [0x5au8; 19];

        let signature = sign_payload(private, &payload).unwrap();
        assert_eq!(signature.len(), 256);
        assert!(verify_payload(public, &payload, &signature));
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let (private, public) = &*KEYPAIR;
        let payload = [0x5au8; 19];
        let signature = sign_payload(private, &payload).unwrap();

        let mut tampered = payload;
        tampered[7] ^= 0x01;
        assert!(!verify_payload(public, &tampered, &signature));
    }

    #[test]
    fn test_tampered_signature_rejected() {
        let (private, public) = &*KEYPAIR;
        let payload = [0x5au8; 19];
        let mut signature = sign_payload(private, &payload).unwrap();
        signature[0] ^= 0x80;
        assert!(!verify_payload(public, &payload, &signature));
    }

    #[test]
    fn test_pem_round_trip() {
        let (private, public) = &*KEYPAIR;
        let dir = tempfile::tempdir().unwrap();
        let private_path = dir.path().join("private.pem");
        let public_path = dir.path().join("public.pem");

        save_private_key_pem(private, &private_path, None).unwrap();
        save_public_key_pem(public, &public_path).unwrap();

        let loaded_private = load_private_key_pem(&private_path, None).unwrap();
        let loaded_public = load_public_key_pem(&public_path).unwrap();
        assert_eq!(&loaded_private, private);
        assert_eq!(&loaded_public, public);
    }

    #[test]
    fn test_encrypted_pem_round_trip() {
        let (private, _) = &*KEYPAIR;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("private-enc.pem");

        save_private_key_pem(private, &path, Some("correct horse")).unwrap();

        let loaded = load_private_key_pem(&path, Some("correct horse")).unwrap();
        assert_eq!(&loaded, private);

        assert!(load_private_key_pem(&path, Some("wrong")).is_err());
        assert!(load_private_key_pem(&path, None).is_err());
    }
}
