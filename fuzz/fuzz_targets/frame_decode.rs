#![no_main]

use codec::{decode_frame, decompress, encode_incremental, CodecLimits, Region};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let limits = CodecLimits::for_testing();
    let wire_limits = wire::Limits::for_testing();

    // Whole input as one frame, then as a tile section body.
    let decoded = decode_frame(data, &wire_limits, &limits);
    let _ = decompress(data);

    // Anything that decodes as an incremental frame must survive a re-encode.
    if let Ok(message) = decoded {
        if message.is_full() {
            return;
        }
        let mut region = Region::new(message.region);
        for id in &message.removes {
            region.queue_removal(*id);
        }
        for edit in &message.tiles {
            if region.queue_tile_change(edit.x, edit.y, edit.tile).is_err() {
                return;
            }
        }
        for update in &message.updates {
            if region.queue_update(update.clone()).is_err() {
                return;
            }
        }
        if let Ok(bytes) = encode_incremental(&region, &limits) {
            let again = decode_frame(&bytes, &wire_limits, &limits);
            assert!(again.is_ok(), "re-encoded frame failed to decode: {again:?}");
        }
    }
});
