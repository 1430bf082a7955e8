// End-to-end decoding tests
// These tests feed synthetic packet streams through the public decoder and
// player interfaces and check the resulting canvas

mod common;

use cdg_rs::canvas::{BORDER_HEIGHT, BORDER_WIDTH, FULL_HEIGHT, FULL_WIDTH};
use cdg_rs::*;
use common::*;
use std::io::Cursor;

fn decode_all(decoder: &mut Decoder, records: &[[u8; PACKET_SIZE]]) -> RecordingSink {
    let mut sink = RecordingSink::default();
    for record in records {
        decoder.decode(record, &mut sink).unwrap();
    }
    sink
}

#[test]
fn test_preset_then_tile() {
    let mut decoder = Decoder::new();
    decode_all(
        &mut decoder,
        &[memory_preset(3), tile(0, 1, 0, 0, 0x3F, false)],
    );

    let canvas = decoder.canvas();
    for y in 0..FULL_HEIGHT {
        for x in 0..FULL_WIDTH {
            let expected = if x < 6 && y < 12 { 1 } else { 3 };
            assert_eq!(canvas.get_pixel(x, y), expected, "pixel ({}, {})", x, y);
        }
    }
}

#[test]
fn test_border_preset_keeps_inside() {
    let mut decoder = Decoder::new();
    decode_all(&mut decoder, &[memory_preset(2), border_preset(5)]);

    let canvas = decoder.canvas();
    assert_eq!(canvas.get_pixel(0, 0), 5);
    assert_eq!(canvas.get_pixel(FULL_WIDTH - 1, FULL_HEIGHT - 1), 5);
    assert_eq!(canvas.get_pixel(BORDER_WIDTH - 1, 100), 5);
    assert_eq!(canvas.get_pixel(BORDER_WIDTH, BORDER_HEIGHT), 2);
    assert_eq!(
        canvas.get_pixel(FULL_WIDTH - BORDER_WIDTH - 1, FULL_HEIGHT - BORDER_HEIGHT - 1),
        2
    );
    assert_eq!(canvas.get_pixel(FULL_WIDTH - BORDER_WIDTH, 100), 5);
}

#[test]
fn test_xor_tile_twice_restores_canvas() {
    let mut decoder = Decoder::new();
    decode_all(&mut decoder, &[memory_preset(6), tile(1, 2, 3, 7, 0x2A, false)]);
    let before = decoder.canvas().clone();

    decode_all(
        &mut decoder,
        &[tile(9, 4, 3, 7, 0x15, true), tile(9, 4, 3, 7, 0x15, true)],
    );
    assert_eq!(decoder.canvas(), &before);
}

#[test]
fn test_palette_loads_and_reports_change_once() {
    let mut decoder = Decoder::new();
    let sink = decode_all(
        &mut decoder,
        &[
            load_palette(false, 0xF00),
            load_palette(true, 0x00F),
            memory_preset(9),
        ],
    );

    let palette = decoder.canvas().palette();
    assert_eq!(palette.get(0), 0xFF0000);
    assert_eq!(palette.get(7), 0xFF0000);
    assert_eq!(palette.get(8), 0x0000FF);
    assert_eq!(palette.get(15), 0x0000FF);

    let flags: Vec<bool> = sink.frames.iter().map(|f| f.palette_changed).collect();
    assert_eq!(flags, vec![true, true, false]);
    assert_eq!(sink.frames[2].top_left, 9);
}

#[test]
fn test_scroll_copy_wraps_and_preset_fills() {
    let mut decoder = Decoder::new();
    // A marker in the top-left tile
    decode_all(&mut decoder, &[memory_preset(0), tile(0, 7, 0, 0, 0x3F, false)]);

    // Left by one tile: the marker wraps to the right edge
    decode_all(&mut decoder, &[scroll(true, 0, 0x20, 0x00)]);
    assert_eq!(decoder.canvas().get_pixel(FULL_WIDTH - 6, 0), 7);
    assert_eq!(decoder.canvas().get_pixel(0, 0), 0);

    // Up by one tile with preset: the bottom strip takes the color
    decode_all(&mut decoder, &[scroll(false, 4, 0x00, 0x20)]);
    assert_eq!(decoder.canvas().get_pixel(0, FULL_HEIGHT - 1), 4);
    assert_eq!(decoder.canvas().get_pixel(FULL_WIDTH - 1, FULL_HEIGHT - 12), 4);
    assert_eq!(decoder.canvas().get_pixel(10, 10), 0);
}

#[test]
fn test_fine_offset_applies_to_later_tiles() {
    let mut decoder = Decoder::new();
    decode_all(&mut decoder, &[memory_preset(0), scroll(false, 0, 0x02, 0x03)]);
    assert_eq!(decoder.canvas().scroll_offset(), (2, 3));

    decode_all(&mut decoder, &[tile(0, 8, 1, 1, 0x20, false)]);
    // Column 1, row 1 shifted by (2, 3)
    assert_eq!(decoder.canvas().get_pixel(6 + 2, 12 + 3), 8);
    assert_eq!(decoder.canvas().get_pixel(6, 12), 0);
}

#[test]
fn test_non_graphics_packets_emit_nothing() {
    let mut decoder = Decoder::new();
    let sink = decode_all(&mut decoder, &[non_graphics_packet(), non_graphics_packet()]);

    assert!(sink.frames.is_empty());
    assert!(decoder.canvas().pixels().iter().all(|&p| p == 0));
    assert_eq!(decoder.packets_decoded(), 2);
}

#[test]
fn test_arbitrary_bytes_never_panic() {
    let mut rng = XorShift(0x9E37_79B9_7F4A_7C15);
    let mut decoder = Decoder::with_allocator(PooledAllocator::new(0), FULL_WIDTH + 4).unwrap();
    let mut record = [0u8; PACKET_SIZE];

    for i in 0..5_000 {
        rng.fill(&mut record);
        // Bias towards graphics packets so every handler is reached
        if i % 2 == 0 {
            record[0] = 0x09;
        }
        decoder.decode(&record, &mut NullSink).unwrap();

        let canvas = decoder.canvas();
        let (h, v) = canvas.scroll_offset();
        assert!(h <= 5 && v <= 11);
    }

    assert!(decoder.canvas().pixels().iter().all(|&p| p < 16));
    assert_eq!(decoder.packets_decoded(), 5_000);
}

#[test]
fn test_wrong_length_records_are_rejected() {
    let mut decoder = Decoder::new();
    for len in [0usize, 1, 23, 25, 48] {
        let bytes = vec![0x09; len];
        assert_eq!(
            decoder.decode(&bytes, &mut NullSink),
            Err(DecodeError::MalformedPacket { len })
        );
    }
    assert_eq!(decoder.packets_decoded(), 0);
}

#[test]
fn test_player_over_stream() {
    let mut player = Player::new(PlayerConfig::default()).unwrap();
    let bytes = stream(&[
        load_palette(false, 0x0F0),
        memory_preset(1),
        non_graphics_packet(),
        tile(0, 2, 0, 0, 0x3F, false),
        scroll(true, 0, 0x10, 0x10),
    ]);

    let mut sink = RecordingSink::default();
    let stats = player.play(Cursor::new(bytes), &mut sink).unwrap();

    assert_eq!(stats.packets, 5);
    assert_eq!(stats.frames, 4);
    assert_eq!(stats.ignored_packets, 1);
    assert_eq!(stats.count(Instruction::ScrollCopy), 1);
    assert_eq!(sink.frames.len(), 4);

    // The marker tile moved one tile right and one tile down
    let canvas = player.decoder().canvas();
    assert_eq!(canvas.get_pixel(6, 12), 2);
    assert_eq!(canvas.get_pixel(11, 23), 2);
    assert_eq!(canvas.get_pixel(0, 0), 1);
    assert_eq!(canvas.palette().get(0), 0x00FF00);
}
