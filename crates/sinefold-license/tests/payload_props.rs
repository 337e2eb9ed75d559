//! Property checks for the 150-bit payload codec

use proptest::prelude::*;
use sinefold_license::LicensePayload;

prop_compose! {
    fn arb_payload()(
        swap_embedded in any::<bool>(),
        swap_quantized in 0u8..=255,
        issue_date_days in 0u16..(1 << 14),
        license_plan in 0u8..16,
        duration_days in 0u16..(1 << 10),
        key_holder_group in any::<u8>(),
        unique_license_id in any::<u32>(),
        version_lock in any::<u8>(),
        entropy in any::<u128>(),
    ) -> LicensePayload {
        let mut payload = LicensePayload {
            swap_embedded,
            swap_param: if swap_embedded { f64::from(swap_quantized) / 255.0 } else { 0.0 },
            issue_date_days,
            license_plan,
            duration_days,
            key_holder_group,
            unique_license_id,
            version_lock,
            simple_checksum: 0,
            entropy: 0,
        };
        payload.simple_checksum = payload.checksum();
        payload.entropy = entropy & ((1 << payload.entropy_bits()) - 1);
        payload
    }
}

proptest! {
    #[test]
    fn pack_unpack_round_trips(payload in arb_payload()) {
        let packed = payload.pack().unwrap();
        let unpacked = LicensePayload::unpack(&packed).unwrap();
        prop_assert_eq!(unpacked, payload);
    }

    #[test]
    fn checksum_survives_round_trip(payload in arb_payload()) {
        let unpacked = LicensePayload::unpack(&payload.pack().unwrap()).unwrap();
        prop_assert!(unpacked.checksum_is_valid());
    }
}
