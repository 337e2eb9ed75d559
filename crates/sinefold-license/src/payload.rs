//! 150-bit license payload packing
//!
//! Field layout, MSB-first in listed order:
//!
//! ```text
//! mode_flag:1  [swap_param:8 if mode_flag=1]  issue_date_days:14
//! license_plan:4  duration_days:10  key_holder_group:8
//! unique_license_id:32  version_lock:8  simple_checksum:5  entropy:60|68
//! ```
//!
//! The 150 bits serialize to 19 bytes, MSB-aligned, with the two low bits
//! of the final byte zero. The checksum covers every listed field except
//! the swap parameter and the entropy tail, modulo `2^5`.

use bitvec::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{LicenseError, Result};

/// Total payload width in bits
pub const PAYLOAD_BITS: usize = 150;

/// Serialized payload width in bytes (two trailing pad bits)
pub const PAYLOAD_BYTES: usize = 19;

/// Field bit widths, in pack order
pub mod width {
    pub const MODE_FLAG: usize = 1;
    pub const SWAP_PARAM: usize = 8;
    pub const ISSUE_DATE: usize = 14;
    pub const LICENSE_PLAN: usize = 4;
    pub const DURATION: usize = 10;
    pub const KEY_HOLDER_GROUP: usize = 8;
    pub const UNIQUE_LICENSE_ID: usize = 32;
    pub const VERSION_LOCK: usize = 8;
    pub const CHECKSUM: usize = 5;
}

/// Entropy width when the swap parameter is embedded (mode_flag = 1)
pub const ENTROPY_BITS_EMBEDDED: usize = 60;

/// Entropy width when the swap parameter is hardcoded (mode_flag = 0)
pub const ENTROPY_BITS_HARDCODED: usize = 68;

/// Quantize a unit-interval swap parameter to its 8-bit field value
pub fn quantize_swap(swap: f64) -> u8 {
    (swap * 255.0).round() as u8
}

/// Recover the unit-interval value of an 8-bit swap field
pub fn dequantize_swap(value: u8) -> f64 {
    f64::from(value) / 255.0
}

/// Decoded license payload
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LicensePayload {
    /// Whether the swap parameter travels inside the key (mode_flag)
    pub swap_embedded: bool,

    /// Unit-interval swap parameter; meaningful only when embedded
    pub swap_param: f64,

    /// Days since the license epoch (14 bits)
    pub issue_date_days: u16,

    /// License plan identifier (4 bits)
    pub license_plan: u8,

    /// Validity duration in days (10 bits)
    pub duration_days: u16,

    /// Key holder group identifier
    pub key_holder_group: u8,

    /// Unique license identifier
    pub unique_license_id: u32,

    /// Major version the key is locked to; 0 means no lock
    pub version_lock: u8,

    /// 5-bit non-cryptographic checksum
    pub simple_checksum: u8,

    /// Entropy tail (60 or 68 bits depending on mode)
    pub entropy: u128,
}

impl LicensePayload {
    /// Entropy width for this payload's mode
    pub fn entropy_bits(&self) -> usize {
        if self.swap_embedded {
            ENTROPY_BITS_EMBEDDED
        } else {
            ENTROPY_BITS_HARDCODED
        }
    }

    /// Compute the 5-bit checksum over the data fields
    ///
    /// Sums mode_flag, issue date, plan, duration, group, license id and
    /// version lock modulo `2^5`. The swap parameter and entropy are
    /// excluded.
    pub fn checksum(&self) -> u8 {
        let sum = u64::from(self.swap_embedded)
            + u64::from(self.issue_date_days)
            + u64::from(self.license_plan)
            + u64::from(self.duration_days)
            + u64::from(self.key_holder_group)
            + u64::from(self.unique_license_id)
            + u64::from(self.version_lock);
        (sum % (1 << width::CHECKSUM)) as u8
    }

    /// Whether the stored checksum matches the recomputed one
    pub fn checksum_is_valid(&self) -> bool {
        self.simple_checksum == self.checksum()
    }

    /// Pack into the 19-byte MSB-aligned serialization
    pub fn pack(&self) -> Result<[u8; PAYLOAD_BYTES]> {
        let mut bits = BitVec::<u8, Msb0>::with_capacity(PAYLOAD_BYTES * 8);

        push_field(&mut bits, "mode_flag", u128::from(self.swap_embedded), width::MODE_FLAG)?;
        if self.swap_embedded {
            push_field(
                &mut bits,
                "swap_param",
                u128::from(quantize_swap(self.swap_param)),
                width::SWAP_PARAM,
            )?;
        }
        push_field(&mut bits, "issue_date_days", u128::from(self.issue_date_days), width::ISSUE_DATE)?;
        push_field(&mut bits, "license_plan", u128::from(self.license_plan), width::LICENSE_PLAN)?;
        push_field(&mut bits, "duration_days", u128::from(self.duration_days), width::DURATION)?;
        push_field(
            &mut bits,
            "key_holder_group",
            u128::from(self.key_holder_group),
            width::KEY_HOLDER_GROUP,
        )?;
        push_field(
            &mut bits,
            "unique_license_id",
            u128::from(self.unique_license_id),
            width::UNIQUE_LICENSE_ID,
        )?;
        push_field(&mut bits, "version_lock", u128::from(self.version_lock), width::VERSION_LOCK)?;
        push_field(&mut bits, "simple_checksum", u128::from(self.simple_checksum), width::CHECKSUM)?;
        push_field(&mut bits, "entropy", self.entropy, self.entropy_bits())?;

        debug_assert_eq!(bits.len(), PAYLOAD_BITS);

        // MSB-align into 19 bytes; the two trailing pad bits stay zero.
        bits.resize(PAYLOAD_BYTES * 8, false);
        let mut out = [0u8; PAYLOAD_BYTES];
        out.copy_from_slice(bits.as_raw_slice());
        Ok(out)
    }

    /// Unpack from an MSB-aligned serialization
    ///
    /// Accepts any buffer holding at least 150 bits; only the leading 150
    /// bits are read.
    pub fn unpack(bytes: &[u8]) -> Result<Self> {
        if bytes.len() * 8 < PAYLOAD_BITS {
            return Err(LicenseError::InsufficientBits {
                expected: PAYLOAD_BITS,
                got: bytes.len() * 8,
            });
        }

        let bits = bytes.view_bits::<Msb0>();
        let mut cursor = 0usize;

        let swap_embedded = read_field(bits, &mut cursor, width::MODE_FLAG) == 1;
        let swap_param = if swap_embedded {
            dequantize_swap(read_field(bits, &mut cursor, width::SWAP_PARAM) as u8)
        } else {
            0.0
        };
        let issue_date_days = read_field(bits, &mut cursor, width::ISSUE_DATE) as u16;
        let license_plan = read_field(bits, &mut cursor, width::LICENSE_PLAN) as u8;
        let duration_days = read_field(bits, &mut cursor, width::DURATION) as u16;
        let key_holder_group = read_field(bits, &mut cursor, width::KEY_HOLDER_GROUP) as u8;
        let unique_license_id = read_field(bits, &mut cursor, width::UNIQUE_LICENSE_ID) as u32;
        let version_lock = read_field(bits, &mut cursor, width::VERSION_LOCK) as u8;
        let simple_checksum = read_field(bits, &mut cursor, width::CHECKSUM) as u8;
        let entropy_bits = PAYLOAD_BITS - cursor;
        let entropy = read_field(bits, &mut cursor, entropy_bits);

        Ok(Self {
            swap_embedded,
            swap_param,
            issue_date_days,
            license_plan,
            duration_days,
            key_holder_group,
            unique_license_id,
            version_lock,
            simple_checksum,
            entropy,
        })
    }
}

/// Append `width` bits of `value`, MSB-first, rejecting overflow
fn push_field(
    bits: &mut BitVec<u8, Msb0>,
    field: &'static str,
    value: u128,
    width: usize,
) -> Result<()> {
    if width < 128 && value >= (1u128 << width) {
        return Err(LicenseError::FieldOverflow { field, value, width });
    }
    for i in (0..width).rev() {
        bits.push((value >> i) & 1 == 1);
    }
    Ok(())
}

/// Read `width` bits at the cursor, MSB-first, advancing the cursor
fn read_field(bits: &BitSlice<u8, Msb0>, cursor: &mut usize, width: usize) -> u128 {
    let mut value = 0u128;
    for bit in &bits[*cursor..*cursor + width] {
        value = (value << 1) | u128::from(*bit);
    }
    *cursor += width;
    value
}
