//! Bit-level packing of each field group.
//!
//! Every writer leaves the stream byte-aligned, and every reader expects to
//! start aligned, so groups can be concatenated in any flagged combination.

use bitstream::{BitError, BitReader, BitWriter};

use crate::error::{Axis, BlobField, QuantError, QuantResult};
use crate::fields::{
    Action, Crc, EntityState, EntityType, Expression, Identity, Info, Motion, Name, PlayerState,
    StateValue, PLAYER_STATE_BITS,
};
use crate::fixed::{
    check_velocity_q, dequantize_position, dequantize_velocity, pack_velocity,
    quantize_position, quantize_velocity, unpack_velocity, VELOCITY_BITS,
};
use crate::options::{EntityOption, EntityOptions, OptionKey, OptionTag};

/// Position group: `x, y` as zigzag varints, then `vx, vy` as signed 11-bit fields.
pub fn write_motion(motion: &Motion, writer: &mut BitWriter) -> QuantResult<()> {
    let x = quantize_position(Axis::X, motion.x)?;
    let y = quantize_position(Axis::Y, motion.y)?;
    let vx = quantize_velocity(Axis::X, motion.vx)?;
    let vy = quantize_velocity(Axis::Y, motion.vy)?;

    writer.write_vars32(x)?;
    writer.write_vars32(y)?;
    writer.write_bits(pack_velocity(vx), VELOCITY_BITS)?;
    writer.write_bits(pack_velocity(vy), VELOCITY_BITS)?;
    writer.align_to_byte();
    Ok(())
}

pub fn read_motion(reader: &mut BitReader<'_>) -> QuantResult<Motion> {
    let x = reader.read_vars32()?;
    let y = reader.read_vars32()?;
    let vx = check_velocity_q(Axis::X, unpack_velocity(reader.read_bits(VELOCITY_BITS)?))?;
    let vy = check_velocity_q(Axis::Y, unpack_velocity(reader.read_bits(VELOCITY_BITS)?))?;
    reader.align_to_byte()?;
    Ok(Motion {
        x: dequantize_position(x),
        y: dequantize_position(y),
        vx: dequantize_velocity(vx),
        vy: dequantize_velocity(vy),
    })
}

/// State group: `state: u8`, presence bit, 3-bit player state, zero padding.
/// The player bits are zero when the presence bit is clear.
pub fn write_state(value: &StateValue, writer: &mut BitWriter) -> QuantResult<()> {
    writer.write_u8_aligned(value.state.0)?;
    writer.write_bit(value.player_state.is_some());
    let player = value.player_state.map_or(0, PlayerState::get);
    writer.write_bits(u64::from(player), PLAYER_STATE_BITS)?;
    writer.align_to_byte();
    Ok(())
}

pub fn read_state(reader: &mut BitReader<'_>) -> QuantResult<StateValue> {
    let state = EntityState(reader.read_u8_aligned()?);
    let has_player_state = reader.read_bit()?;
    let raw = reader.read_bits(PLAYER_STATE_BITS)? as u8;
    reader.align_to_byte()?;
    let player_state = if has_player_state {
        Some(PlayerState::new(raw)?)
    } else if raw != 0 {
        return Err(QuantError::StrayPlayerState { value: raw });
    } else {
        None
    };
    Ok(StateValue {
        state,
        player_state,
    })
}

pub fn write_expression(expression: Expression, writer: &mut BitWriter) -> QuantResult<()> {
    writer.write_u32_aligned(expression.0)?;
    Ok(())
}

pub fn read_expression(reader: &mut BitReader<'_>) -> QuantResult<Expression> {
    Ok(Expression(reader.read_u32_aligned()?))
}

/// Type group: type code then crc.
pub fn write_identity(identity: Identity, writer: &mut BitWriter) -> QuantResult<()> {
    writer.write_u16_aligned(identity.kind.0)?;
    writer.write_u16_aligned(identity.crc.0)?;
    Ok(())
}

pub fn read_identity(reader: &mut BitReader<'_>) -> QuantResult<Identity> {
    let kind = EntityType(reader.read_u16_aligned()?);
    let crc = Crc(reader.read_u16_aligned()?);
    Ok(Identity { kind, crc })
}

/// Options group: count, then `(key, value)` in ascending key order.
pub fn write_options(options: &EntityOptions, writer: &mut BitWriter) -> QuantResult<()> {
    writer.write_u8_aligned(options.len() as u8)?;
    for option in options.iter() {
        writer.write_u8_aligned(option.key() as u8)?;
        match option {
            EntityOption::Tag(tag) => writer.write_u8_aligned(tag as u8)?,
            EntityOption::Toy(toy) => writer.write_u16_aligned(toy)?,
            EntityOption::Expr(expr) => writer.write_u32_aligned(expr.0)?,
            EntityOption::Hold(hold) => writer.write_u16_aligned(hold)?,
            EntityOption::Extra(extra) => writer.write_u8_aligned(u8::from(extra))?,
        }
    }
    Ok(())
}

pub fn read_options(reader: &mut BitReader<'_>) -> QuantResult<EntityOptions> {
    let count = reader.read_u8_aligned()?;
    if usize::from(count) > OptionKey::ALL.len() {
        return Err(QuantError::TooManyOptions {
            count,
            max: OptionKey::ALL.len(),
        });
    }

    let mut options = EntityOptions::new();
    let mut previous = 0u8;
    for _ in 0..count {
        let raw_key = reader.read_u8_aligned()?;
        if raw_key <= previous {
            return Err(QuantError::UnorderedOptions {
                previous,
                key: raw_key,
            });
        }
        previous = raw_key;
        let option = match OptionKey::parse(raw_key)? {
            OptionKey::Tag => EntityOption::Tag(OptionTag::parse(reader.read_u8_aligned()?)?),
            OptionKey::Toy => EntityOption::Toy(reader.read_u16_aligned()?),
            OptionKey::Expr => EntityOption::Expr(Expression(reader.read_u32_aligned()?)),
            OptionKey::Hold => EntityOption::Hold(reader.read_u16_aligned()?),
            OptionKey::Extra => EntityOption::Extra(read_bool(reader)?),
        };
        options.set(option);
    }
    Ok(options)
}

pub fn write_info(info: &Info, max_bytes: usize, writer: &mut BitWriter) -> QuantResult<()> {
    check_blob(BlobField::Info, info.0.len(), max_bytes)?;
    writer.write_bytes_aligned(&info.0)?;
    Ok(())
}

pub fn read_info(reader: &mut BitReader<'_>, max_bytes: usize) -> QuantResult<Info> {
    let bytes = read_blob(reader, BlobField::Info, max_bytes)?;
    Ok(Info(bytes.to_vec()))
}

pub fn write_action(action: Action, writer: &mut BitWriter) -> QuantResult<()> {
    writer.write_u8_aligned(action.0)?;
    Ok(())
}

pub fn read_action(reader: &mut BitReader<'_>) -> QuantResult<Action> {
    Ok(Action(reader.read_u8_aligned()?))
}

/// Name group: length-prefixed bytes followed by the filter byte.
pub fn write_name(name: &Name, max_bytes: usize, writer: &mut BitWriter) -> QuantResult<()> {
    check_blob(BlobField::Name, name.bytes.len(), max_bytes)?;
    writer.write_bytes_aligned(&name.bytes)?;
    writer.write_u8_aligned(u8::from(name.filter))?;
    Ok(())
}

pub fn read_name(reader: &mut BitReader<'_>, max_bytes: usize) -> QuantResult<Name> {
    let bytes = read_blob(reader, BlobField::Name, max_bytes)?.to_vec();
    let filter = read_bool(reader)?;
    Ok(Name { bytes, filter })
}

const fn check_blob(field: BlobField, len: usize, max: usize) -> QuantResult<()> {
    if len > max {
        return Err(QuantError::BlobTooLong { field, len, max });
    }
    Ok(())
}

fn read_blob<'a>(
    reader: &mut BitReader<'a>,
    field: BlobField,
    max: usize,
) -> QuantResult<&'a [u8]> {
    reader.read_bytes_aligned(max).map_err(|err| match err {
        BitError::ValueOutOfRange { value, .. } => QuantError::BlobTooLong {
            field,
            len: value as usize,
            max,
        },
        other => QuantError::Bit(other),
    })
}

fn read_bool(reader: &mut BitReader<'_>) -> QuantResult<bool> {
    match reader.read_u8_aligned()? {
        0 => Ok(false),
        1 => Ok(true),
        value => Err(QuantError::InvalidBool { value }),
    }
}
