//! Fixed-point position and velocity quantization.
//!
//! Positions and velocities share a 1/8 unit resolution. Positions are stored
//! as zigzag varints of the scaled value; velocities are packed into signed
//! 11-bit integers and must stay strictly below [`VELOCITY_LIMIT`] in
//! magnitude.

use crate::error::{Axis, QuantError, QuantResult};

/// Quantized units per world unit.
pub const POSITION_SCALE: i32 = 8;

/// Exclusive bound on velocity magnitude, in world units per tick.
pub const VELOCITY_LIMIT: f32 = 100.0;

/// Bit width of a packed velocity component.
pub const VELOCITY_BITS: u8 = 11;

const SCALE: f32 = 8.0;

/// Exclusive bound on the quantized velocity magnitude.
const VELOCITY_LIMIT_Q: i32 = 800;

// Bounds of i32 as exactly representable f32 values.
const I32_MIN_F: f32 = -2_147_483_648.0;
const I32_END_F: f32 = 2_147_483_648.0;

/// Quantizes a position coordinate to 1/8 units, rounding to nearest.
pub fn quantize_position(axis: Axis, value: f32) -> QuantResult<i32> {
    if !value.is_finite() {
        return Err(QuantError::PositionOutOfRange { axis, value });
    }
    let scaled = (value * SCALE).round();
    if !(I32_MIN_F..I32_END_F).contains(&scaled) {
        return Err(QuantError::PositionOutOfRange { axis, value });
    }
    Ok(scaled as i32)
}

/// Inverse of [`quantize_position`].
#[must_use]
pub fn dequantize_position(quantized: i32) -> f32 {
    quantized as f32 / SCALE
}

/// Quantizes a velocity component, failing if its magnitude reaches the limit.
///
/// A value that is below the limit but rounds up to it is rejected too, so
/// every accepted velocity dequantizes to something strictly below the limit.
pub fn quantize_velocity(axis: Axis, value: f32) -> QuantResult<i16> {
    if !value.is_finite() || value.abs() >= VELOCITY_LIMIT {
        return Err(QuantError::VelocityOutOfRange { axis, value });
    }
    let scaled = (value * SCALE).round() as i32;
    if scaled.abs() >= VELOCITY_LIMIT_Q {
        return Err(QuantError::VelocityOutOfRange { axis, value });
    }
    Ok(scaled as i16)
}

/// Inverse of [`quantize_velocity`].
#[must_use]
pub fn dequantize_velocity(quantized: i16) -> f32 {
    f32::from(quantized) / SCALE
}

/// Checks a velocity read off the wire against the limit.
pub(crate) fn check_velocity_q(axis: Axis, quantized: i16) -> QuantResult<i16> {
    if i32::from(quantized).abs() >= VELOCITY_LIMIT_Q {
        return Err(QuantError::VelocityOutOfRange {
            axis,
            value: dequantize_velocity(quantized),
        });
    }
    Ok(quantized)
}

/// Two's complement form of a velocity in the low [`VELOCITY_BITS`] bits.
pub(crate) const fn pack_velocity(quantized: i16) -> u64 {
    (quantized as u16 & 0x07FF) as u64
}

/// Sign-extends a [`VELOCITY_BITS`]-wide field.
pub(crate) const fn unpack_velocity(raw: u64) -> i16 {
    let shift = 16 - VELOCITY_BITS as u32;
    (((raw as u16) << shift) as i16) >> shift
}
