//! Helpers for turning BlueZ property bags into model types.
//!
//! BlueZ leaves out keys the remote device did not report, and some devices
//! send integers of the wrong width. Missing or mistyped values fall back to
//! empty/zero instead of failing the whole poll.

use log::debug;
use std::collections::HashMap;
use zvariant::{OwnedValue, Value};

use crate::api::models::TrackInfo;
use crate::types::constants::track_keys;

/// Extracts a string from a D-Bus value, unwrapping nested variants.
pub(crate) fn value_as_string(value: &Value<'_>) -> Option<String> {
    match value {
        Value::Str(s) => Some(s.as_str().to_owned()),
        Value::Value(inner) => value_as_string(inner),
        _ => None,
    }
}

/// Extracts an unsigned 32-bit integer from any integer D-Bus value.
///
/// Negative or out-of-range values are rejected.
pub(crate) fn value_as_u32(value: &Value<'_>) -> Option<u32> {
    match value {
        Value::U8(n) => Some(u32::from(*n)),
        Value::U16(n) => Some(u32::from(*n)),
        Value::U32(n) => Some(*n),
        Value::U64(n) => u32::try_from(*n).ok(),
        Value::I16(n) => u32::try_from(*n).ok(),
        Value::I32(n) => u32::try_from(*n).ok(),
        Value::I64(n) => u32::try_from(*n).ok(),
        Value::Value(inner) => value_as_u32(inner),
        _ => None,
    }
}

fn string_prop(props: &HashMap<String, OwnedValue>, key: &str) -> String {
    match props.get(key) {
        Some(value) => value_as_string(value).unwrap_or_else(|| {
            debug!("Track property {key} is not a string: {:?}", &**value);
            String::new()
        }),
        None => String::new(),
    }
}

fn u32_prop(props: &HashMap<String, OwnedValue>, key: &str) -> u32 {
    match props.get(key) {
        Some(value) => value_as_u32(value).unwrap_or_else(|| {
            debug!("Track property {key} is not an unsigned integer: {:?}", &**value);
            0
        }),
        None => 0,
    }
}

/// Builds a [`TrackInfo`] from the `Track` property of `org.bluez.MediaPlayer1`.
pub(crate) fn track_from_properties(props: &HashMap<String, OwnedValue>) -> TrackInfo {
    TrackInfo {
        artist: string_prop(props, track_keys::ARTIST),
        title: string_prop(props, track_keys::TITLE),
        album: string_prop(props, track_keys::ALBUM),
        track_number: u32_prop(props, track_keys::TRACK_NUMBER),
        number_of_tracks: u32_prop(props, track_keys::NUMBER_OF_TRACKS),
        duration: u32_prop(props, track_keys::DURATION),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owned<'a>(value: impl Into<Value<'a>>) -> OwnedValue {
        let value: Value<'a> = value.into();
        value.try_to_owned().unwrap()
    }

    #[test]
    fn parses_full_track_dictionary() {
        let mut props = HashMap::new();
        props.insert("Artist".to_string(), owned("A"));
        props.insert("Title".to_string(), owned("T1"));
        props.insert("Album".to_string(), owned("Album"));
        props.insert("Genre".to_string(), owned("Ambient"));
        props.insert("TrackNumber".to_string(), owned(1u32));
        props.insert("NumberOfTracks".to_string(), owned(5u32));
        props.insert("Duration".to_string(), owned(215_000u32));

        let track = track_from_properties(&props);

        assert_eq!(
            track,
            TrackInfo {
                artist: "A".into(),
                title: "T1".into(),
                album: "Album".into(),
                track_number: 1,
                number_of_tracks: 5,
                duration: 215_000,
            }
        );
    }

    #[test]
    fn missing_keys_default_to_empty() {
        let mut props = HashMap::new();
        props.insert("Title".to_string(), owned("Only a title"));

        let track = track_from_properties(&props);

        assert_eq!(track.title, "Only a title");
        assert!(track.artist.is_empty());
        assert_eq!(track.track_number, 0);
        assert_eq!(track.duration, 0);
    }

    #[test]
    fn mistyped_values_are_ignored() {
        let mut props = HashMap::new();
        props.insert("Artist".to_string(), owned(7u32));
        props.insert("TrackNumber".to_string(), owned("three"));

        let track = track_from_properties(&props);

        assert!(track.artist.is_empty());
        assert_eq!(track.track_number, 0);
    }

    #[test]
    fn integer_widths_are_accepted() {
        assert_eq!(value_as_u32(&Value::from(3u8)), Some(3));
        assert_eq!(value_as_u32(&Value::from(3u64)), Some(3));
        assert_eq!(value_as_u32(&Value::from(3i32)), Some(3));
        assert_eq!(value_as_u32(&Value::from(-1i32)), None);
        assert_eq!(value_as_u32(&Value::from(u64::MAX)), None);
    }

    #[test]
    fn nested_variants_are_unwrapped() {
        let nested = Value::Value(Box::new(Value::from("A")));
        assert_eq!(value_as_string(&nested).as_deref(), Some("A"));
    }
}
