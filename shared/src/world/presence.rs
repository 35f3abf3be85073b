use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{attribute::value::Vec3, types::{ParticipantId, SessionInstant}};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaletteColor {
    Purple,
    Blue,
    Green,
    Orange,
    Yellow,
    Red,
    Gray,
    White,
    Maroon,
    Navy,
    Aqua,
    Lime,
    Olive,
    Teal,
    Fuchsia,
    Silver,
    Black,
}

impl PaletteColor {
    pub const ALL: [PaletteColor; 17] = [
        PaletteColor::Purple,
        PaletteColor::Blue,
        PaletteColor::Green,
        PaletteColor::Orange,
        PaletteColor::Yellow,
        PaletteColor::Red,
        PaletteColor::Gray,
        PaletteColor::White,
        PaletteColor::Maroon,
        PaletteColor::Navy,
        PaletteColor::Aqua,
        PaletteColor::Lime,
        PaletteColor::Olive,
        PaletteColor::Teal,
        PaletteColor::Fuchsia,
        PaletteColor::Silver,
        PaletteColor::Black,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PaletteColor::Purple => "purple",
            PaletteColor::Blue => "blue",
            PaletteColor::Green => "green",
            PaletteColor::Orange => "orange",
            PaletteColor::Yellow => "yellow",
            PaletteColor::Red => "red",
            PaletteColor::Gray => "gray",
            PaletteColor::White => "white",
            PaletteColor::Maroon => "maroon",
            PaletteColor::Navy => "navy",
            PaletteColor::Aqua => "aqua",
            PaletteColor::Lime => "lime",
            PaletteColor::Olive => "olive",
            PaletteColor::Teal => "teal",
            PaletteColor::Fuchsia => "fuchsia",
            PaletteColor::Silver => "silver",
            PaletteColor::Black => "black",
        }
    }
}

impl fmt::Display for PaletteColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Durable per-participant metadata. Survives leave/rejoin so a returning
/// participant keeps their color and last pose.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PresenceRecord {
    pub participant_id: ParticipantId,
    pub online: bool,
    pub joined_at: SessionInstant,
    pub color: PaletteColor,
    pub last_position: Vec3,
    pub last_rotation: Vec3,
}
