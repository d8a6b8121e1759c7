// crates/crowdpad-protocol/tests/codec.rs
use crowdpad_core::{Button, ButtonMask, Direction, InputEvent, Rejected};
use crowdpad_protocol::{
    decode_snapshot, decode_stream, encode_snapshot, parse_token, split_token, TokenError,
    WireError,
};

#[test]
fn snapshots_are_little_endian() {
    let l_and_a = ButtonMask::from_bits(512 | 1).unwrap();
    assert_eq!(encode_snapshot(l_and_a), [0x01, 0x02]);
    assert_eq!(encode_snapshot(ButtonMask::EMPTY), [0x00, 0x00]);
    assert_eq!(encode_snapshot(ButtonMask::from_bits(1023).unwrap()), [0xFF, 0x03]);
}

#[test]
fn stream_of_snapshots_decodes_in_order() {
    let mut buf = Vec::new();
    for bits in [1u16, 3, 2] {
        buf.extend_from_slice(&encode_snapshot(ButtonMask::from_bits(bits).unwrap()));
    }
    assert_eq!(buf, vec![1, 0, 3, 0, 2, 0]);

    let decoded: Vec<u16> = decode_stream(&buf).unwrap().iter().map(|m| m.bits()).collect();
    assert_eq!(decoded, vec![1, 3, 2]);
}

#[test]
fn decode_rejects_short_and_out_of_range() {
    assert_eq!(decode_snapshot(&[1]), Err(WireError::Truncated));
    assert_eq!(decode_snapshot(&[0x00, 0x04]), Err(WireError::OutOfRange(1024)));
    assert_eq!(decode_stream(&[1, 0, 2]), Err(WireError::Truncated));
}

#[test]
fn web_tokens_parse() {
    assert_eq!(parse_token("D_GBA_A"), Ok(InputEvent::press(Button::A)));
    assert_eq!(parse_token("U_GBA_LEFT"), Ok(InputEvent::release(Button::Left)));
    assert_eq!(parse_token("D_GBA_SELECT"), Ok(InputEvent::press(Button::Select)));
}

#[test]
fn readable_tokens_parse() {
    assert_eq!(parse_token("press A"), Ok(InputEvent::press(Button::A)));
    assert_eq!(parse_token("release DOWN"), Ok(InputEvent::release(Button::Down)));
}

#[test]
fn unknown_button_is_distinguished_from_malformed() {
    assert_eq!(
        parse_token("press FOO"),
        Err(TokenError::UnknownButton("FOO".to_string()))
    );
    assert_eq!(
        parse_token("D_GBA_FOO"),
        Err(TokenError::UnknownButton("FOO".to_string()))
    );

    for bad in ["", "D_A", "X_GBA_A", "hold A", "press ", "D_GBA_", "DGBA_A"] {
        assert_eq!(
            parse_token(bad),
            Err(TokenError::Malformed(bad.to_string())),
            "token {:?}",
            bad
        );
    }
}

#[test]
fn token_errors_map_to_rejections() {
    let rejected: Rejected = parse_token("press FOO").unwrap_err().into();
    assert_eq!(rejected.to_string(), "unrecognized button");

    let rejected: Rejected = parse_token("jump").unwrap_err().into();
    assert_eq!(rejected.to_string(), "malformed token");
}

#[test]
fn split_leaves_button_unvalidated() {
    assert_eq!(split_token("U_GBA_ZZ"), Ok((Direction::Release, "ZZ")));
}

#[test]
fn every_button_is_reachable_from_the_web_page() {
    for button in Button::ALL {
        let down = format!("D_GBA_{}", button.name());
        let up = format!("U_GBA_{}", button.name());
        assert_eq!(parse_token(&down), Ok(InputEvent::press(button)));
        assert_eq!(parse_token(&up), Ok(InputEvent::release(button)));
    }
}
