use super::*;

fn drain(bytes: &[u8]) -> Vec<Unit> {
    let mut src = Utf8Source::new(bytes);
    let mut units = Vec::new();
    while let Some(unit) = src.next_unit().unwrap() {
        units.push(unit);
    }
    units
}

/// Concatenating every unit's bytes must reproduce the input exactly, no
/// matter how malformed it was.
fn reassemble(units: &[Unit]) -> Vec<u8> {
    units.iter().flat_map(|u| u.bytes().to_vec()).collect()
}

#[test]
fn ascii_decodes_one_byte_per_unit() {
    let units = drain(b"ab~");
    assert_eq!(
        units.iter().map(|u| u.chr().unwrap()).collect::<String>(),
        "ab~"
    );
    assert!(units.iter().all(|u| u.bytes().len() == 1));
}

#[test]
fn multibyte_scalars_carry_their_encoding() {
    let units = drain("é€👍".as_bytes());
    assert_eq!(units.len(), 3);
    assert_eq!(units[0], Unit::scalar('é'));
    assert_eq!(units[1].bytes(), "€".as_bytes());
    assert_eq!(units[2].chr(), Some('👍'));
    assert_eq!(units[2].bytes().len(), 4);
}

#[test]
fn invalid_continuation_returns_lead_raw_and_keeps_the_rest() {
    // 0xE0 expects two continuation bytes; 'A' is not one. Nothing may
    // vanish and nothing may duplicate.
    let units = drain(&[0xE0, b'A', b'B']);
    assert_eq!(units[0], Unit::Byte(0xE0));
    assert_eq!(units[1].chr(), Some('A'));
    assert_eq!(units[2].chr(), Some('B'));
    assert_eq!(reassemble(&units), [0xE0, b'A', b'B']);
}

#[test]
fn retained_bytes_replay_through_the_decoder() {
    // 0xE0 0xC3 0xA9: the three-byte decode fails (overlong), but the
    // retained tail C3 A9 is a valid sequence of its own.
    let units = drain(&[0xE0, 0xC3, 0xA9]);
    assert_eq!(units, vec![Unit::Byte(0xE0), Unit::scalar('é')]);
}

#[test]
fn surrogate_encoding_degrades_to_raw_bytes() {
    // ED A0 80 would be U+D800.
    let units = drain(&[0xED, 0xA0, 0x80]);
    assert_eq!(units.len(), 3);
    assert!(units.iter().all(|u| u.chr().is_none()));
    assert_eq!(reassemble(&units), [0xED, 0xA0, 0x80]);
}

#[test]
fn overlong_encoding_is_rejected_byte_exactly() {
    // C0 AF is an overlong '/'.
    let units = drain(&[0xC0, 0xAF, b'x']);
    assert_eq!(units[0], Unit::Byte(0xC0));
    assert_eq!(units[1], Unit::Byte(0xAF));
    assert_eq!(units[2].chr(), Some('x'));
}

#[test]
fn out_of_range_scalar_is_rejected() {
    // F4 90 80 80 would be U+110000.
    let units = drain(&[0xF4, 0x90, 0x80, 0x80]);
    assert_eq!(units.len(), 4);
    assert_eq!(reassemble(&units), [0xF4, 0x90, 0x80, 0x80]);
}

#[test]
fn truncated_sequence_at_eof_is_not_lost() {
    let units = drain(&[b'a', 0xE2, 0x82]);
    assert_eq!(units[0].chr(), Some('a'));
    assert_eq!(units[1], Unit::Byte(0xE2));
    assert_eq!(units[2], Unit::Byte(0x82));
}

#[test]
fn stray_continuation_byte_is_raw() {
    let units = drain(&[0x80, b'a']);
    assert_eq!(units[0], Unit::Byte(0x80));
    assert_eq!(units[1].chr(), Some('a'));
}

#[test]
fn push_back_redelivers_the_same_unit() {
    let mut src = Utf8Source::new("é2".as_bytes());
    let first = src.next_unit().unwrap().unwrap();
    src.push_back(first);
    assert_eq!(src.next_unit().unwrap(), Some(first));
    assert_eq!(src.next_unit().unwrap().unwrap().chr(), Some('2'));
    assert_eq!(src.next_unit().unwrap(), None);
}

#[test]
fn push_back_interacts_with_replayed_bytes() {
    // Push-back slot must drain before the replay ring.
    let mut src = Utf8Source::new(&[0xE0, 0xC3, 0xA9][..]);
    let lead = src.next_unit().unwrap().unwrap();
    assert_eq!(lead, Unit::Byte(0xE0));
    src.push_back(lead);
    assert_eq!(src.next_unit().unwrap(), Some(Unit::Byte(0xE0)));
    assert_eq!(src.next_unit().unwrap(), Some(Unit::scalar('é')));
}

#[test]
fn byte_source_never_decodes() {
    let mut src = ByteSource::new("é".as_bytes());
    assert_eq!(src.next_unit().unwrap(), Some(Unit::Byte(0xC3)));
    let second = src.next_unit().unwrap().unwrap();
    assert_eq!(second, Unit::Byte(0xA9));
    src.push_back(second);
    assert_eq!(src.next_unit().unwrap(), Some(Unit::Byte(0xA9)));
    assert_eq!(src.next_unit().unwrap(), None);
}

#[test]
fn nul_is_an_ordinary_unit() {
    let units = drain(&[b'a', 0, b'b']);
    assert_eq!(units[1].value(), 0);
    assert_eq!(units[1].bytes(), [0]);
}
