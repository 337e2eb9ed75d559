//! End-to-end license generation and validation

use once_cell::sync::Lazy;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use rsa::{RsaPrivateKey, RsaPublicKey};

use sinefold_license::{
    generate_keypair, generate_license_key, validate_license_key, LicenseRequest, SwapMode,
    ValidationError, DEFAULT_KEY_BITS,
};

static KEYPAIR: Lazy<(RsaPrivateKey, RsaPublicKey)> =
    Lazy::new(|| generate_keypair(DEFAULT_KEY_BITS).unwrap());

#[test]
fn embedded_swap_round_trip() {
    let (private, public) = &*KEYPAIR;
    let mut rng = ChaCha20Rng::seed_from_u64(7);

    let request = LicenseRequest {
        license_plan: 3,
        duration_days: 730,
        key_holder_group: 50,
        unique_license_id: 98765,
        version_lock: 2,
        swap: SwapMode::Embedded,
    };
    let key = generate_license_key(private, &request, &mut rng).unwrap();

    // No hardcoded parameter needed: the validator brute-forces the
    // embedded value.
    let payload = validate_license_key(public, &key, 2, None).unwrap();
    assert!(payload.swap_embedded);
    assert_eq!(payload.license_plan, 3);
    assert_eq!(payload.duration_days, 730);
    assert_eq!(payload.key_holder_group, 50);
    assert_eq!(payload.unique_license_id, 98765);
    assert_eq!(payload.version_lock, 2);
    assert!(payload.checksum_is_valid());

    // Supplying any hardcoded parameter switches to the mode-0 path and
    // must fail against a mode-1 key.
    for wrong in [0.1, 0.5, payload.swap_param] {
        assert_eq!(
            validate_license_key(public, &key, 2, Some(wrong)),
            Err(ValidationError::SwapParamNotFound)
        );
    }
}

#[test]
fn hardcoded_swap_round_trip() {
    let (private, public) = &*KEYPAIR;
    let mut rng = ChaCha20Rng::seed_from_u64(8);

    let request = LicenseRequest {
        license_plan: 1,
        duration_days: 30,
        key_holder_group: 1,
        unique_license_id: 112_233,
        version_lock: 0,
        swap: SwapMode::Hardcoded(0.88),
    };
    let key = generate_license_key(private, &request, &mut rng).unwrap();

    let payload = validate_license_key(public, &key, 1, Some(0.88)).unwrap();
    assert!(!payload.swap_embedded);
    assert_eq!(payload.license_plan, 1);
    assert_eq!(payload.unique_license_id, 112_233);

    // Without the parameter the brute force only considers mode-1 keys.
    assert_eq!(
        validate_license_key(public, &key, 1, None),
        Err(ValidationError::SwapParamNotFound)
    );
    // A wrong parameter un-permutes into garbage.
    assert_eq!(
        validate_license_key(public, &key, 1, Some(0.1)),
        Err(ValidationError::SwapParamNotFound)
    );
}

#[test]
fn version_lock_enforcement() {
    let (private, public) = &*KEYPAIR;
    let mut rng = ChaCha20Rng::seed_from_u64(9);

    let mut request = LicenseRequest {
        license_plan: 2,
        duration_days: 365,
        key_holder_group: 10,
        unique_license_id: 424_242,
        version_lock: 3,
        swap: SwapMode::Embedded,
    };
    let locked_key = generate_license_key(private, &request, &mut rng).unwrap();

    assert!(validate_license_key(public, &locked_key, 3, None).is_ok());
    assert_eq!(
        validate_license_key(public, &locked_key, 4, None),
        Err(ValidationError::VersionLockMismatch { locked: 3, host: 4 })
    );

    // version_lock = 0 bypasses the check for any host version.
    request.version_lock = 0;
    let open_key = generate_license_key(private, &request, &mut rng).unwrap();
    assert!(validate_license_key(public, &open_key, 0, None).is_ok());
    assert!(validate_license_key(public, &open_key, 99, None).is_ok());
}

#[test]
fn signature_binds_key_to_signer() {
    let (private, _) = &*KEYPAIR;
    let mut rng = ChaCha20Rng::seed_from_u64(10);

    let request = LicenseRequest {
        license_plan: 3,
        duration_days: 365,
        key_holder_group: 5,
        unique_license_id: 1,
        version_lock: 0,
        swap: SwapMode::Hardcoded(0.25),
    };
    let key = generate_license_key(private, &request, &mut rng).unwrap();

    // A validator holding someone else's public key must reject the key.
    let (_, other_public) = generate_keypair(DEFAULT_KEY_BITS).unwrap();
    assert_eq!(
        validate_license_key(&other_public, &key, 1, Some(0.25)),
        Err(ValidationError::BadSignature)
    );
}

#[test]
fn corrupted_key_string_rejected() {
    let (private, public) = &*KEYPAIR;
    let mut rng = ChaCha20Rng::seed_from_u64(11);

    let request = LicenseRequest {
        license_plan: 1,
        duration_days: 365,
        key_holder_group: 1,
        unique_license_id: 7,
        version_lock: 0,
        swap: SwapMode::Embedded,
    };
    let key = generate_license_key(private, &request, &mut rng).unwrap();

    // Replace the first character with a different alphabet symbol; some
    // check downstream must fail.
    let mut chars: Vec<char> = key.chars().collect();
    chars[0] = if chars[0] == '0' { '1' } else { '0' };
    let corrupted: String = chars.into_iter().collect();

    assert!(validate_license_key(public, &corrupted, 1, None).is_err());
}
