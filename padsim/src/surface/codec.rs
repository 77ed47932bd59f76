//! Wire format for the grid surface's MIDI protocol.
//!
//! Lighting uses 3 byte channel messages where the status byte picks the
//! lighting style. Mode changes and text scrolling are sysex messages that
//! share the manufacturer/device header below.
use std::fmt;

use super::pad::{LightState, PadAddress, PaletteIndex};
use crate::ternary;

pub const NOTE_ON: u8 = 0x90;
pub const LIGHT_STEADY: u8 = 0x91;
pub const LIGHT_PULSE: u8 = 0x92;
pub const FULL_VELOCITY: u8 = 0x7F;

pub const SYSEX_END: u8 = 0xF7;
//                                 F0h   00h   20h   29h   02h   0Dh
pub const SYSEX_HEADER: [u8; 6] = [0xF0, 0x00, 0x20, 0x29, 0x02, 0x0D];
pub const SELECT_MODE: u8 = 0x0E;
pub const SCROLL_TEXT: u8 = 0x07;

pub const DEFAULT_SCROLL_SPEED: u8 = 1;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DeviceMode {
    /// The device's own session/note layouts drive the lights.
    Live = 0,
    /// The host owns every light.
    Programmer = 1,
}

impl fmt::Display for DeviceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Live => write!(f, "live"),
            Self::Programmer => write!(f, "programmer"),
        }
    }
}

pub fn encode_light(light: LightState) -> [u8; 3] {
    let status = ternary!(light.pulse, LIGHT_PULSE, LIGHT_STEADY);
    [status, light.address.value(), light.color.value()]
}

pub fn encode_set_mode(mode: DeviceMode) -> [u8; 9] {
    let h = SYSEX_HEADER;
    [h[0], h[1], h[2], h[3], h[4], h[5], SELECT_MODE, mode as u8, SYSEX_END]
}

/// Scroll `text` across the grid in a loop. Empty text stops scrolling.
pub fn encode_scroll_text(
    text: &str,
    color: PaletteIndex,
    speed: u8,
) -> Vec<u8> {
    let mut message = Vec::with_capacity(SYSEX_HEADER.len() + 6 + text.len());
    message.extend_from_slice(&SYSEX_HEADER);
    message.push(SCROLL_TEXT);
    message.push(1); // loop
    message.push(speed & 0x7F);
    message.push(0); // color spec: palette
    message.push(color.value());
    message.extend_from_slice(text.as_bytes());
    message.push(SYSEX_END);
    message
}

/// Only a full velocity note-on is a press. Releases (note-on with velocity
/// 0 or note-off) and partial velocities are ignored.
pub fn decode_inbound_event(message: &[u8]) -> Option<PadAddress> {
    match message {
        [NOTE_ON, note, FULL_VELOCITY] => PadAddress::new(*note).ok(),
        _ => None,
    }
}

/// A decoded outbound message. Mostly useful for inspecting what a
/// transport was asked to send.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Outbound {
    Light(LightState),
    SetMode(DeviceMode),
    ScrollText {
        text: String,
        color: PaletteIndex,
        speed: u8,
    },
}

impl Outbound {
    pub fn encode(&self) -> Vec<u8> {
        match self {
            Self::Light(light) => encode_light(*light).to_vec(),
            Self::SetMode(mode) => encode_set_mode(*mode).to_vec(),
            Self::ScrollText { text, color, speed } => {
                encode_scroll_text(text, *color, *speed)
            }
        }
    }

    pub fn decode(message: &[u8]) -> Option<Self> {
        match message {
            [status @ (LIGHT_STEADY | LIGHT_PULSE), note, color] => {
                let address = PadAddress::new(*note).ok()?;
                Some(Self::Light(LightState::new(
                    address,
                    PaletteIndex::new(*color),
                    *status == LIGHT_PULSE,
                )))
            }
            _ => Self::decode_sysex(message),
        }
    }

    fn decode_sysex(message: &[u8]) -> Option<Self> {
        let body = message
            .strip_prefix(&SYSEX_HEADER[..])?
            .strip_suffix(&[SYSEX_END])?;

        match body {
            [SELECT_MODE, 0] => Some(Self::SetMode(DeviceMode::Live)),
            [SELECT_MODE, 1] => Some(Self::SetMode(DeviceMode::Programmer)),
            [SCROLL_TEXT, _loop, speed, _, color, text @ ..] => {
                Some(Self::ScrollText {
                    text: String::from_utf8_lossy(text).into_owned(),
                    color: PaletteIndex::new(*color),
                    speed: *speed,
                })
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pad(value: u8) -> PadAddress {
        PadAddress::new(value).unwrap()
    }

    #[test]
    fn light_uses_distinct_opcodes() {
        let steady = LightState::new(pad(11), PaletteIndex::BLUE, false);
        let pulse = LightState::new(pad(11), PaletteIndex::RED, true);
        assert_eq!(encode_light(steady), [0x91, 11, 41]);
        assert_eq!(encode_light(pulse), [0x92, 11, 5]);
        assert_eq!(encode_light(LightState::off(pad(99))), [0x91, 99, 0]);
    }

    #[test]
    fn set_mode_is_fixed_sysex() {
        assert_eq!(
            encode_set_mode(DeviceMode::Programmer),
            [0xF0, 0x00, 0x20, 0x29, 0x02, 0x0D, 0x0E, 0x01, 0xF7]
        );
        assert_eq!(
            encode_set_mode(DeviceMode::Live),
            [0xF0, 0x00, 0x20, 0x29, 0x02, 0x0D, 0x0E, 0x00, 0xF7]
        );
    }

    #[test]
    fn scroll_text_layout() {
        let message = encode_scroll_text("hi", PaletteIndex::WHITE, 4);
        assert_eq!(
            message,
            [
                0xF0, 0x00, 0x20, 0x29, 0x02, 0x0D, 0x07, 1, 4, 0, 3, b'h',
                b'i', 0xF7
            ]
        );
    }

    #[test]
    fn empty_scroll_text_is_stop_command() {
        let message = encode_scroll_text("", PaletteIndex::WHITE, 1);
        assert_eq!(message.len(), 12);
        assert_eq!(message.last(), Some(&SYSEX_END));
        assert_eq!(
            Outbound::decode(&message),
            Some(Outbound::ScrollText {
                text: String::new(),
                color: PaletteIndex::WHITE,
                speed: 1,
            })
        );
    }

    #[test]
    fn press_decodes_for_every_grid_pad() {
        for address in PadAddress::grid() {
            let light = encode_light(LightState::new(
                address,
                PaletteIndex::GREEN,
                false,
            ));
            let press = [NOTE_ON, light[1], FULL_VELOCITY];
            assert_eq!(decode_inbound_event(&press), Some(address));
        }
    }

    #[test]
    fn only_full_velocity_press_is_an_event() {
        assert_eq!(decode_inbound_event(&[0x90, 11, 0x00]), None);
        assert_eq!(decode_inbound_event(&[0x90, 11, 0x40]), None);
        assert_eq!(decode_inbound_event(&[0x80, 11, 0x7F]), None);
        assert_eq!(decode_inbound_event(&[0xB0, 11, 0x7F]), None);
        assert_eq!(decode_inbound_event(&[0x90, 11]), None);
        assert_eq!(decode_inbound_event(&[0x90, 11, 0x7F, 0x00]), None);
        assert_eq!(decode_inbound_event(&[]), None);
    }

    #[test]
    fn press_on_reserved_column_is_ignored() {
        assert_eq!(decode_inbound_event(&[0x90, 20, 0x7F]), None);
        assert_eq!(decode_inbound_event(&[0x90, 105, 0x7F]), None);
    }

    #[test]
    fn outbound_decode_inverts_encode() {
        let messages = [
            Outbound::Light(LightState::new(pad(45), PaletteIndex::RED, true)),
            Outbound::SetMode(DeviceMode::Programmer),
            Outbound::SetMode(DeviceMode::Live),
            Outbound::ScrollText {
                text: "sys-sim".to_string(),
                color: PaletteIndex::GREEN,
                speed: 2,
            },
        ];

        for message in messages {
            assert_eq!(Outbound::decode(&message.encode()), Some(message));
        }
    }

    #[test]
    fn outbound_decode_rejects_unknown_sysex() {
        let mut message = SYSEX_HEADER.to_vec();
        message.extend_from_slice(&[0x0A, 0x01, SYSEX_END]);
        assert_eq!(Outbound::decode(&message), None);
        assert_eq!(Outbound::decode(&[0x90, 11, 0x7F]), None);
    }
}
