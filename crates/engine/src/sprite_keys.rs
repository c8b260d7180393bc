use thiserror::Error;

use crate::geometry::Direction;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpriteKeyError {
    #[error("sprite key must not be empty")]
    Empty,
    #[error("sprite key must not start or end with '/'")]
    DanglingSlash,
    #[error("sprite key must not contain '..'")]
    ParentTraversal,
    #[error("sprite key contains invalid character '{character}'")]
    InvalidCharacter { character: char },
}

pub fn validate_sprite_key(key: &str) -> Result<(), SpriteKeyError> {
    if key.is_empty() {
        return Err(SpriteKeyError::Empty);
    }
    if key.starts_with('/') || key.ends_with('/') {
        return Err(SpriteKeyError::DanglingSlash);
    }
    if key.contains("..") {
        return Err(SpriteKeyError::ParentTraversal);
    }
    for ch in key.chars() {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() || matches!(ch, '_' | '/' | '-') {
            continue;
        }
        return Err(SpriteKeyError::InvalidCharacter { character: ch });
    }
    Ok(())
}

/// Builds the directional variant of a sprite, e.g. `ants/ant` + `NE` -> `ants/ant_ne`.
pub fn direction_sprite_key(
    prefix: &str,
    direction: Direction,
) -> Result<String, SpriteKeyError> {
    let key = format!("{prefix}_{}", direction.as_token());
    validate_sprite_key(&key)?;
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_valid_keys() {
        for key in ["ants/ant_n", "objects/apple_half", "a-b/c_d"] {
            assert!(validate_sprite_key(key).is_ok(), "key={key}");
        }
    }

    #[test]
    fn rejects_invalid_keys() {
        for key in ["", "/a", "a/", "..", "a/../b", r"a\b", "Ants/ant", "a.b"] {
            assert!(validate_sprite_key(key).is_err(), "key={key}");
        }
    }

    #[test]
    fn every_direction_produces_a_valid_key() {
        for direction in Direction::ALL {
            let key = direction_sprite_key("ants/ant", direction).expect("valid key");
            assert!(key.starts_with("ants/ant_"));
        }
        assert_eq!(
            direction_sprite_key("ants/ant", Direction::SW).expect("key"),
            "ants/ant_sw"
        );
    }

    #[test]
    fn bad_prefix_is_reported() {
        assert_eq!(
            direction_sprite_key("Ants/ant", Direction::N),
            Err(SpriteKeyError::InvalidCharacter { character: 'A' })
        );
    }
}
