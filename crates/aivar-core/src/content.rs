//! Row content types.
//!
//! Rows are opaque to the navigation core: only their count matters there.
//! Renderers match on [`RowContent`] to draw them.

use serde::{Deserialize, Serialize};

use crate::viewport::DeviceClass;

/// A product tile shown inside a row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    /// Title shown next to the icon.
    pub title: String,

    /// Icon image path.
    pub icon: String,

    /// Main image path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl Tile {
    /// Create a tile with the conventional `/images/logoN.png` and
    /// `/images/tileN.png` asset paths.
    pub fn numbered(title: impl Into<String>, n: usize) -> Self {
        Self {
            title: title.into(),
            icon: format!("/images/logo{n}.png"),
            image: Some(format!("/images/tile{n}.png")),
        }
    }
}

/// One full-viewport row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RowContent {
    /// A single line of large headline text.
    Headline { text: String, font_size: u16 },

    /// One or more tiles laid out side by side.
    Tiles { tiles: Vec<Tile> },

    /// Community pitch with a sign-up button.
    SignUp {
        pitch: String,
        button: String,
        font_size: u16,
    },
}

impl RowContent {
    /// Stable key used to identify the mounted row.
    pub fn key(device: DeviceClass, index: usize) -> String {
        match device {
            DeviceClass::Desktop => format!("row{index}"),
            DeviceClass::Mobile => format!("row{index}m"),
        }
    }

    /// Titles of all tiles in this row.
    pub fn tile_titles(&self) -> Vec<&str> {
        match self {
            RowContent::Tiles { tiles } => tiles.iter().map(|t| t.title.as_str()).collect(),
            _ => Vec::new(),
        }
    }
}

/// Supplies the ordered rows for a device class.
pub trait RowContentProvider: Send + Sync {
    fn rows(&self, device: DeviceClass) -> &[RowContent];

    /// Highest valid row index, or `None` if there are no rows.
    fn max_row_index(&self, device: DeviceClass) -> Option<usize> {
        self.rows(device).len().checked_sub(1)
    }
}

const HEADLINE: &str = "AI Sharing Community";

const SIGN_UP_PITCH: &str = "Entra nella community che sta ridefinendo il futuro dell'AI: \
condividi conoscenze, costruisci connessioni, trasforma le tue idee in realtà.";

const SIGN_UP_BUTTON: &str = "Registrati";

/// The built-in row sets.
#[derive(Debug, Clone)]
pub struct StaticRows {
    desktop: Vec<RowContent>,
    mobile: Vec<RowContent>,
}

impl StaticRows {
    pub fn new() -> Self {
        let tiles = [
            Tile::numbered("AI SHARING", 1),
            Tile::numbered("AIVAR STORE", 2),
            Tile::numbered("AIVAR METALAND", 3),
            Tile::numbered("CFX QUANTUM", 4),
            Tile::numbered("VAFFA GAME", 5),
        ];

        let desktop = vec![
            RowContent::Headline {
                text: HEADLINE.to_string(),
                font_size: 64,
            },
            RowContent::Tiles {
                tiles: tiles[0..2].to_vec(),
            },
            RowContent::Tiles {
                tiles: tiles[2..4].to_vec(),
            },
            RowContent::Tiles {
                tiles: tiles[4..].to_vec(),
            },
            sign_up(40),
        ];

        let mut mobile = Vec::with_capacity(tiles.len() + 2);
        mobile.push(RowContent::Headline {
            text: HEADLINE.to_string(),
            font_size: 32,
        });
        mobile.extend(tiles.iter().map(|tile| RowContent::Tiles {
            tiles: vec![tile.clone()],
        }));
        mobile.push(sign_up(24));

        Self { desktop, mobile }
    }

    /// Build a provider from explicit row sets.
    pub fn from_rows(desktop: Vec<RowContent>, mobile: Vec<RowContent>) -> Self {
        Self { desktop, mobile }
    }
}

impl Default for StaticRows {
    fn default() -> Self {
        Self::new()
    }
}

impl RowContentProvider for StaticRows {
    fn rows(&self, device: DeviceClass) -> &[RowContent] {
        match device {
            DeviceClass::Desktop => &self.desktop,
            DeviceClass::Mobile => &self.mobile,
        }
    }
}

fn sign_up(font_size: u16) -> RowContent {
    RowContent::SignUp {
        pitch: SIGN_UP_PITCH.to_string(),
        button: SIGN_UP_BUTTON.to_string(),
        font_size,
    }
}
