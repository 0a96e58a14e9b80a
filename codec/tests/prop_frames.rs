use codec::{
    compress, decode_frame, decompress, encode_incremental, CodecLimits, EntityId, EntityUpdate,
    FieldChanges, Region, RegionCoord, TileGrid, TileType, TILE_COUNT,
};
use proptest::prelude::*;
use quant::{Action, Expression, Identity, Info, Motion, Name, StateChange, StateValue};
use wire::Limits;

fn motion() -> impl Strategy<Value = Motion> {
    (
        -100_000i32..100_000,
        -100_000i32..100_000,
        -799i32..=799,
        -799i32..=799,
    )
        .prop_map(|(x, y, vx, vy)| {
            Motion::new(
                x as f32 / 8.0,
                y as f32 / 8.0,
                vx as f32 / 8.0,
                vy as f32 / 8.0,
            )
        })
}

fn changes() -> impl Strategy<Value = FieldChanges> {
    (
        proptest::option::of(motion()),
        proptest::option::of((any::<u8>(), any::<bool>())),
        proptest::option::of(any::<u32>()),
        proptest::option::of((any::<u16>(), any::<u16>())),
        proptest::option::of(any::<u8>()),
        proptest::option::of(proptest::collection::vec(any::<u8>(), 0..32)),
        proptest::option::of(proptest::collection::vec(any::<u8>(), 0..64)),
    )
        .prop_map(|(motion, state, expression, identity, action, name, info)| {
            FieldChanges {
                motion,
                state: state.map(|(value, switch)| {
                    let value = StateValue::new(value);
                    if switch {
                        StateChange::WithRegionSwitch(value)
                    } else {
                        StateChange::Plain(value)
                    }
                }),
                expression: expression.map(Expression),
                identity: identity.map(|(kind, crc)| Identity::new(kind, crc)),
                options: None,
                info: info.map(Info),
                action: action.map(Action),
                name: name.map(|bytes| Name::new(bytes, false)),
            }
        })
        .prop_filter("at least one group", |changes| !changes.is_empty())
}

fn tiles() -> impl Strategy<Value = TileGrid> {
    proptest::collection::vec(0u8..4, TILE_COUNT).prop_map(|codes| {
        let mut tiles = [TileType::default(); TILE_COUNT];
        for (slot, code) in tiles.iter_mut().zip(codes) {
            *slot = TileType(code);
        }
        TileGrid::from_tiles(tiles)
    })
}

proptest! {
    #[test]
    fn incremental_frames_roundtrip(
        updates in proptest::collection::vec((0u32..10_000, changes()), 0..16),
        removes in proptest::collection::vec(0u32..10_000, 0..16),
    ) {
        let limits = CodecLimits::for_testing();
        let mut region = Region::new(RegionCoord::new(-7, 12));
        for (id, changes) in updates {
            region.queue_update(EntityUpdate::new(EntityId::new(id), changes)).unwrap();
        }
        for id in removes {
            region.queue_removal(EntityId::new(id));
        }

        let bytes = encode_incremental(&region, &limits).unwrap();
        let message = decode_frame(&bytes, &Limits::for_testing(), &limits).unwrap();
        prop_assert_eq!(message.region, region.coord());
        prop_assert_eq!(message.removes, region.pending_removes());
        prop_assert_eq!(message.updates, region.pending_updates());
    }

    #[test]
    fn tile_grids_roundtrip(grid in tiles()) {
        let bytes = compress(&grid).unwrap();
        prop_assert_eq!(decompress(&bytes).unwrap(), grid);
    }

    #[test]
    fn arbitrary_bytes_never_panic(bytes in proptest::collection::vec(any::<u8>(), 0..256)) {
        let _ = decode_frame(&bytes, &Limits::for_testing(), &CodecLimits::for_testing());
        let _ = decompress(&bytes);
    }
}
