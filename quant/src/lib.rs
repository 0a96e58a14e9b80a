//! Field quantization for regionsync entity records.
//!
//! This crate is the single source of truth for what an entity record can
//! carry: the [`UpdateFlags`] bit table, the value type of each field group,
//! the fixed-point rules that keep positions and velocities fixed-width, and
//! the bit packing of each group. The encoder and the decoder both go through
//! it, so they cannot disagree about layout.
//!
//! # Groups
//!
//! | flag          | value                          |
//! |---------------|--------------------------------|
//! | `POSITION`    | [`Motion`]                     |
//! | `STATE`       | [`StateChange`]                |
//! | `EXPRESSION`  | [`Expression`]                 |
//! | `TYPE`        | [`Identity`]                   |
//! | `OPTIONS`     | [`EntityOptions`]              |
//! | `INFO`        | [`Info`]                       |
//! | `ACTION`      | [`Action`]                     |
//! | `NAME`        | [`Name`]                       |
//!
//! `SWITCH_REGION` is not a group; it rides on `STATE` and is expressed as
//! [`StateChange::WithRegionSwitch`].

mod error;
mod fields;
mod fixed;
mod flags;
mod hash;
mod options;
pub mod packing;

pub use error::{Axis, BlobField, QuantError, QuantResult};
pub use fields::{
    Action, Crc, EntityState, EntityType, Expression, Identity, Info, Motion, Name, PlayerState,
    StateChange, StateValue, PLAYER_STATE_BITS,
};
pub use fixed::{
    dequantize_position, dequantize_velocity, quantize_position, quantize_velocity,
    POSITION_SCALE, VELOCITY_BITS, VELOCITY_LIMIT,
};
pub use flags::UpdateFlags;
pub use hash::protocol_hash;
pub use options::{EntityOption, EntityOptions, OptionKey, OptionTag};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_api_exports() {
        let _ = UpdateFlags::ALL_GROUPS;
        let _ = Motion::at(0.0, 0.0);
        let _ = StateChange::Plain(StateValue::new(0));
        let _ = EntityOptions::new();
        let _ = protocol_hash();
        let _: QuantResult<()> = Ok(());
    }

    #[test]
    fn quantize_helpers_are_exported() {
        let q = quantize_position(Axis::X, -2.5).unwrap();
        assert_eq!(dequantize_position(q), -2.5);
        let v = quantize_velocity(Axis::Y, 99.875).unwrap();
        assert_eq!(dequantize_velocity(v), 99.875);
    }
}
