//! Static entity catalog
//!
//! Entities are loaded once from embedded JSON and never mutated. Catalog
//! order defines the auto-play sequence.

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

/// Embedded catalog data
const BUILTIN_CATALOG: &str = include_str!("../assets/entities.json");

/// An 8-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb` (leading `#` optional)
    pub fn from_hex(s: &str) -> Result<Self> {
        let hex = s.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            bail!("expected #rrggbb, got {:?}", s);
        }
        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .with_context(|| format!("invalid hex channel in {:?}", s))
        };
        Ok(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Linear interpolation toward `other`
    pub fn lerp(self, other: Rgb, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        let f = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Self::new(f(self.r, other.r), f(self.g, other.g), f(self.b, other.b))
    }

    /// Perceptual luma (Rec. 601 weights)
    pub fn luma(self) -> f32 {
        0.299 * self.r as f32 + 0.587 * self.g as f32 + 0.114 * self.b as f32
    }

    /// Canvas style string
    pub fn css(self) -> String {
        format!("rgb({},{},{})", self.r, self.g, self.b)
    }
}

impl TryFrom<String> for Rgb {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self> {
        Rgb::from_hex(&value)
    }
}

impl From<Rgb> for String {
    fn from(value: Rgb) -> Self {
        value.to_hex()
    }
}

/// Three-color palette shared by every layer of an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Palette {
    pub primary: Rgb,
    pub secondary: Rgb,
    pub accent: Rgb,
}

impl Palette {
    /// Select a palette slot by index (wraps modulo 3)
    pub fn pick(&self, index: usize) -> Rgb {
        match index % 3 {
            0 => self.primary,
            1 => self.secondary,
            _ => self.accent,
        }
    }
}

/// Celestial entity type tag
///
/// Unknown tags are kept verbatim so the hash fallback and the overlay still
/// see the original text; they render only the shared layers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EntityKind {
    Meteoroid,
    Comet,
    BlackHole,
    Sun,
    Star,
    Pulsar,
    Nebula,
    Galaxy,
    Cluster,
    Quasar,
    Supernova,
    Exoplanet,
    Rings,
    Other(String),
}

impl EntityKind {
    /// All recognized kinds, in catalog-tag order
    pub const KNOWN: [EntityKind; 13] = [
        EntityKind::Meteoroid,
        EntityKind::Comet,
        EntityKind::BlackHole,
        EntityKind::Sun,
        EntityKind::Star,
        EntityKind::Pulsar,
        EntityKind::Nebula,
        EntityKind::Galaxy,
        EntityKind::Cluster,
        EntityKind::Quasar,
        EntityKind::Supernova,
        EntityKind::Exoplanet,
        EntityKind::Rings,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            EntityKind::Meteoroid => "meteoroid",
            EntityKind::Comet => "comet",
            EntityKind::BlackHole => "blackhole",
            EntityKind::Sun => "sun",
            EntityKind::Star => "star",
            EntityKind::Pulsar => "pulsar",
            EntityKind::Nebula => "nebula",
            EntityKind::Galaxy => "galaxy",
            EntityKind::Cluster => "cluster",
            EntityKind::Quasar => "quasar",
            EntityKind::Supernova => "supernova",
            EntityKind::Exoplanet => "exoplanet",
            EntityKind::Rings => "rings",
            EntityKind::Other(tag) => tag,
        }
    }

    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "meteoroid" => EntityKind::Meteoroid,
            "comet" => EntityKind::Comet,
            "blackhole" => EntityKind::BlackHole,
            "sun" => EntityKind::Sun,
            "star" => EntityKind::Star,
            "pulsar" => EntityKind::Pulsar,
            "nebula" => EntityKind::Nebula,
            "galaxy" => EntityKind::Galaxy,
            "cluster" => EntityKind::Cluster,
            "quasar" => EntityKind::Quasar,
            "supernova" => EntityKind::Supernova,
            "exoplanet" => EntityKind::Exoplanet,
            "rings" => EntityKind::Rings,
            other => EntityKind::Other(other.to_string()),
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, EntityKind::Other(_))
    }
}

impl From<String> for EntityKind {
    fn from(value: String) -> Self {
        EntityKind::from_tag(&value)
    }
}

impl From<EntityKind> for String {
    fn from(value: EntityKind) -> Self {
        value.as_str().to_string()
    }
}

/// One catalog record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: u32,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: EntityKind,
    #[serde(rename = "colors")]
    pub palette: Palette,
    #[serde(rename = "animationStyle", default)]
    pub animation_style: String,
    /// Time to remain active before transitioning (ms)
    #[serde(rename = "duration")]
    pub duration_ms: f64,
}

/// Ordered entity list
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    entities: Vec<Entity>,
}

impl Catalog {
    pub fn new(entities: Vec<Entity>) -> Self {
        Self { entities }
    }

    /// Parse a catalog from its JSON representation
    pub fn from_json(json: &str) -> Result<Self> {
        let entities: Vec<Entity> =
            serde_json::from_str(json).context("failed to parse entity catalog")?;
        for entity in &entities {
            if !entity.kind.is_known() {
                log::warn!(
                    "Entity {} ({}) has unknown type {:?}; only shared layers will render",
                    entity.id,
                    entity.name,
                    entity.kind.as_str()
                );
            }
        }
        Ok(Self { entities })
    }

    /// The embedded catalog; an unparseable catalog degrades to empty
    pub fn builtin() -> Self {
        match Self::from_json(BUILTIN_CATALOG) {
            Ok(catalog) => {
                log::info!("Loaded {} catalog entities", catalog.len());
                catalog
            }
            Err(e) => {
                log::error!("Built-in catalog unusable: {:#}", e);
                Self::default()
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Entity> {
        self.entities.get(index)
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }
}
