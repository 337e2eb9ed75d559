//! License key generation and validation
//!
//! Generation pipeline: pack the 150-bit payload, sign the 19 payload
//! bytes, append the signature bits, base-32 encode the combined stream,
//! permute the whole character string with the swap-keyed permutation, and
//! hyphenate into 5-character groups.
//!
//! Validation runs the pipeline backwards. When the key embeds its swap
//! parameter the validator brute-forces all 256 quantized candidates; each
//! candidate must reproduce its own 8-bit field and the 5-bit checksum
//! before the signature is even consulted.

use chrono::{DateTime, Duration, TimeZone, Utc};
use once_cell::sync::Lazy;
use rand::{CryptoRng, Rng, RngCore};
use rsa::traits::PublicKeyParts;
use rsa::{RsaPrivateKey, RsaPublicKey};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use bitvec::prelude::*;
use sinefold_core::{PermutationMap, SineScore};

use crate::codec::{alphabet_value, decode_bits, encode_bits, encoded_len};
use crate::error::{LicenseError, Result, ValidationError};
use crate::keys::{sign_payload, verify_payload};
use crate::payload::{
    dequantize_swap, quantize_swap, LicensePayload, PAYLOAD_BITS, PAYLOAD_BYTES,
};

/// License epoch: issue dates count days from here
pub static EPOCH: Lazy<DateTime<Utc>> =
    Lazy::new(|| Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());

/// Characters per hyphen-separated group
pub const SEGMENT_LEN: usize = 5;

const ISSUE_DATE_MAX: i64 = (1 << 14) - 1;

/// How the character-permutation key travels
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum SwapMode {
    /// A random quantized parameter is drawn and embedded in the payload
    Embedded,

    /// A fixed parameter known to both signer and validator; never leaves
    /// the host
    Hardcoded(f64),
}

/// Fields requested for a new license key
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LicenseRequest {
    pub license_plan: u8,
    pub duration_days: u16,
    pub key_holder_group: u8,
    pub unique_license_id: u32,
    /// Major version to lock the key to; 0 means no lock
    pub version_lock: u8,
    pub swap: SwapMode,
}

/// Generate a hyphenated license key string
pub fn generate_license_key(
    private_key: &RsaPrivateKey,
    request: &LicenseRequest,
    rng: &mut (impl RngCore + CryptoRng),
) -> Result<String> {
    generate_at(private_key, request, issue_days_now(), rng)
}

/// Generation entry point with an explicit issue date (days since epoch)
pub(crate) fn generate_at(
    private_key: &RsaPrivateKey,
    request: &LicenseRequest,
    issue_date_days: u16,
    rng: &mut (impl RngCore + CryptoRng),
) -> Result<String> {
    // The permutation is keyed by the quantized value so that validation's
    // 256 brute-force candidates reproduce the map exactly.
    let (swap_embedded, swap_param) = match request.swap {
        SwapMode::Embedded => (true, dequantize_swap(rng.gen::<u8>())),
        SwapMode::Hardcoded(value) => {
            if !(0.0..=1.0).contains(&value) {
                return Err(LicenseError::SwapParamRange(value));
            }
            (false, value)
        }
    };

    let mut payload = LicensePayload {
        swap_embedded,
        swap_param: if swap_embedded { swap_param } else { 0.0 },
        issue_date_days,
        license_plan: request.license_plan,
        duration_days: request.duration_days,
        key_holder_group: request.key_holder_group,
        unique_license_id: request.unique_license_id,
        version_lock: request.version_lock,
        simple_checksum: 0,
        entropy: 0,
    };
    payload.simple_checksum = payload.checksum();
    payload.entropy = rng.gen::<u128>() & ((1u128 << payload.entropy_bits()) - 1);

    let payload_bytes = payload.pack()?;
    let signature = sign_payload(private_key, &payload_bytes)?;

    // Combined stream: exactly 150 payload bits, then the signature bits.
    let mut bits = BitVec::<u8, Msb0>::with_capacity(PAYLOAD_BITS + signature.len() * 8);
    bits.extend_from_bitslice(&payload_bytes.view_bits::<Msb0>()[..PAYLOAD_BITS]);
    bits.extend_from_bitslice(signature.view_bits::<Msb0>());

    let encoded = encode_bits(&bits);
    let map = PermutationMap::from_key(swap_param, encoded.len(), &SineScore::key_space())?;
    let permuted = map.apply(encoded.as_bytes())?;
    // The alphabet is ASCII, so the permuted bytes remain valid UTF-8.
    let permuted = String::from_utf8(permuted).unwrap_or_default();

    Ok(hyphenate(&permuted))
}

/// Validate a license key string against the loaded public key
///
/// Returns the decoded payload when every check passes, or the first
/// failure reason. Never panics on malformed input.
pub fn validate_license_key(
    public_key: &RsaPublicKey,
    key: &str,
    current_app_version: u8,
    hardcoded_swap_param: Option<f64>,
) -> std::result::Result<LicensePayload, ValidationError> {
    let stripped: String = key.chars().filter(|&c| c != '-').collect();

    let signature_bits = public_key.size() * 8;
    let total_bits = PAYLOAD_BITS + signature_bits;
    let expected_chars = encoded_len(total_bits);
    if stripped.len() != expected_chars {
        return Err(ValidationError::WrongLength {
            expected: expected_chars,
            actual: stripped.len(),
        });
    }
    if let Some(invalid) = stripped.chars().find(|&c| alphabet_value(c).is_none()) {
        return Err(ValidationError::InvalidCharacter(invalid));
    }

    // Recover the swap parameter and the un-permuted payload.
    let (payload, signature) = match hardcoded_swap_param {
        Some(swap) => try_swap_candidate(&stripped, swap, total_bits, false)
            .ok_or(ValidationError::SwapParamNotFound)?,
        None => brute_force_swap(&stripped, total_bits).ok_or(ValidationError::SwapParamNotFound)?,
    };

    // Only a consistent payload reaches the signature check.
    let payload_bytes = payload.pack().map_err(|_| ValidationError::SwapParamNotFound)?;
    if !verify_payload(public_key, &payload_bytes, &signature) {
        return Err(ValidationError::BadSignature);
    }

    let expiry = *EPOCH
        + Duration::days(i64::from(payload.issue_date_days))
        + Duration::days(i64::from(payload.duration_days));
    if Utc::now() > expiry {
        return Err(ValidationError::Expired);
    }

    if payload.version_lock > 0 && payload.version_lock != current_app_version {
        return Err(ValidationError::VersionLockMismatch {
            locked: payload.version_lock,
            host: current_app_version,
        });
    }

    debug!(
        plan = payload.license_plan,
        group = payload.key_holder_group,
        id = payload.unique_license_id,
        "license key validated"
    );
    Ok(payload)
}

/// Try one swap-parameter candidate; `expect_embedded` selects which
/// mode_flag value the decoded payload must carry
fn try_swap_candidate(
    permuted: &str,
    swap: f64,
    total_bits: usize,
    expect_embedded: bool,
) -> Option<(LicensePayload, Vec<u8>)> {
    let map = PermutationMap::from_key(swap, permuted.len(), &SineScore::key_space()).ok()?;
    let restored = map.apply_inverse(permuted.as_bytes()).ok()?;
    let restored = String::from_utf8(restored).ok()?;

    let bits = decode_bits(&restored, total_bits).ok()?;

    // Payload: leading 150 bits, re-aligned to 19 bytes.
    let mut payload_bits = bits[..PAYLOAD_BITS].to_bitvec();
    payload_bits.resize(PAYLOAD_BYTES * 8, false);
    let payload = LicensePayload::unpack(&payload_bits.into_vec()).ok()?;

    if payload.swap_embedded != expect_embedded || !payload.checksum_is_valid() {
        return None;
    }

    let signature = bits[PAYLOAD_BITS..].to_bitvec().into_vec();
    Some((payload, signature))
}

/// Walk all 256 quantized swap values, returning the first candidate whose
/// decoded payload is self-consistent
fn brute_force_swap(permuted: &str, total_bits: usize) -> Option<(LicensePayload, Vec<u8>)> {
    for quantized in 0u8..=255 {
        let swap = dequantize_swap(quantized);
        if let Some((payload, signature)) = try_swap_candidate(permuted, swap, total_bits, true) {
            // The embedded field must reproduce the candidate itself.
            if quantize_swap(payload.swap_param) == quantized {
                trace!(quantized, "swap parameter recovered");
                return Some((payload, signature));
            }
        }
    }
    None
}

/// Days since the license epoch, clamped into the 14-bit field
fn issue_days_now() -> u16 {
    let days = (Utc::now() - *EPOCH).num_days();
    days.clamp(0, ISSUE_DATE_MAX) as u16
}

/// Insert a hyphen every `SEGMENT_LEN` characters
fn hyphenate(s: &str) -> String {
    s.as_bytes()
        .chunks(SEGMENT_LEN)
        .map(|chunk| std::str::from_utf8(chunk).unwrap_or_default())
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::{generate_keypair, DEFAULT_KEY_BITS};
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    static KEYPAIR: Lazy<(RsaPrivateKey, RsaPublicKey)> =
        Lazy::new(|| generate_keypair(DEFAULT_KEY_BITS).unwrap());

    fn request(swap: SwapMode) -> LicenseRequest {
        LicenseRequest {
            license_plan: 3,
            duration_days: 730,
            key_holder_group: 50,
            unique_license_id: 98765,
            version_lock: 2,
            swap,
        }
    }

    #[test]
    fn test_key_shape() {
        let (private, _) = &*KEYPAIR;
        let mut rng = ChaCha20Rng::seed_from_u64(1);
        let key = generate_license_key(private, &request(SwapMode::Embedded), &mut rng).unwrap();

        let groups: Vec<&str> = key.split('-').collect();
        assert_eq!(groups.len(), 88);
        assert!(groups.iter().all(|g| g.len() == SEGMENT_LEN));
        assert_eq!(key.chars().filter(|&c| c != '-').count(), 440);
    }

    #[test]
    fn test_hyphenate() {
        assert_eq!(hyphenate("ABCDEFGHJK"), "ABCDE-FGHJK");
        assert_eq!(hyphenate("ABCDEFG"), "ABCDE-FG");
    }

    #[test]
    fn test_expired_key_rejected() {
        let (private, public) = &*KEYPAIR;
        let mut rng = ChaCha20Rng::seed_from_u64(2);

        // Issued on day 3 with a 7-day duration: long past by now.
        let mut req = request(SwapMode::Embedded);
        req.duration_days = 7;
        let key = generate_at(private, &req, 3, &mut rng).unwrap();

        assert_eq!(
            validate_license_key(public, &key, 2, None),
            Err(ValidationError::Expired)
        );
    }

    #[test]
    fn test_invalid_character_reported() {
        let (_, public) = &*KEYPAIR;
        let bogus = "L".repeat(440);
        assert_eq!(
            validate_license_key(public, &bogus, 1, None),
            Err(ValidationError::InvalidCharacter('L'))
        );
    }

    #[test]
    fn test_wrong_length_rejected() {
        let (_, public) = &*KEYPAIR;
        assert!(matches!(
            validate_license_key(public, "ABCDE-FGHJK", 1, None),
            Err(ValidationError::WrongLength { expected: 440, actual: 10 })
        ));
    }

    #[test]
    fn test_issue_days_clamped() {
        assert!(issue_days_now() <= ISSUE_DATE_MAX as u16);
    }
}
