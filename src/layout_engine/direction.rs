use serde::{Deserialize, Serialize};

/// Direction argument of move requests. Parses the long names and the
/// single-letter forms `l`, `r`, `u`/`t` and `d`/`b`.
#[derive(
    Serialize,
    Deserialize,
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::EnumString,
    strum::Display
)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    #[strum(to_string = "left", serialize = "l")]
    Left,
    #[strum(to_string = "right", serialize = "r")]
    Right,
    #[strum(to_string = "up", serialize = "u", serialize = "t")]
    Up,
    #[strum(to_string = "down", serialize = "d", serialize = "b")]
    Down,
}
