//! Board data model shared by the store, the gateway, and the CLI.
//!
//! DESIGN
//! ======
//! Field names follow the REST payloads (camelCase) so a board round-trips
//! through the gateway without an intermediate DTO layer. Entity ids record
//! whether they were minted locally or issued by the server, so the save
//! path can reconcile them explicitly instead of overwriting in place.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Prefix shared by every client-minted entity id.
pub const LOCAL_ID_PREFIX: &str = "local-";

/// Image shown for catalog products that carry no image at all.
pub const PLACEHOLDER_IMAGE: &str = "/placeholder.svg";

// =============================================================================
// ENTITY ID
// =============================================================================

/// Identity of a product or text element placed on a board.
///
/// Local ids are provisional: the gateway issues a persisted id on save and
/// the store rewrites the local one through the returned id map.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum EntityId {
    /// Client-minted, e.g. `local-product-1718000000000`.
    Local(String),
    /// Server-issued.
    Persisted(String),
}

impl EntityId {
    /// Classify a raw wire id by its prefix.
    pub fn parse(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        if raw.starts_with(LOCAL_ID_PREFIX) { Self::Local(raw) } else { Self::Persisted(raw) }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Local(raw) | Self::Persisted(raw) => raw,
        }
    }

    #[must_use]
    pub fn is_local(&self) -> bool {
        matches!(self, Self::Local(_))
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for EntityId {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

impl Serialize for EntityId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for EntityId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::parse)
    }
}

/// One server-issued id for one provisional entity.
///
/// Saves report these in board order (products, then text elements), one
/// entry per entity. Two entities sharing a local id get two entries.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuedId {
    pub local_id: String,
    pub id: String,
}

impl IssuedId {
    pub fn new(local_id: impl Into<String>, id: impl Into<String>) -> Self {
        Self { local_id: local_id.into(), id: id.into() }
    }
}

// =============================================================================
// GEOMETRY
// =============================================================================

/// Top-left corner of an element in canvas coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

// =============================================================================
// CATALOG PRODUCT
// =============================================================================

/// A catalog product as listed by the shop. Only the fields the board
/// denormalizes are modeled here.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub price: f64,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
}

impl Product {
    /// Primary image, then the first gallery image, then the placeholder.
    #[must_use]
    pub fn display_image(&self) -> &str {
        self.image
            .as_deref()
            .filter(|url| !url.is_empty())
            .or_else(|| self.images.iter().map(String::as_str).find(|url| !url.is_empty()))
            .unwrap_or(PLACEHOLDER_IMAGE)
    }
}

// =============================================================================
// BOARD ELEMENTS
// =============================================================================

/// A catalog product pinned to a board. Display fields are captured when the
/// product is placed and are not re-synced afterwards.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardProduct {
    pub id: EntityId,
    /// Weak reference to the catalog product.
    pub product_id: String,
    pub product_name: String,
    pub product_image: String,
    pub product_price: f64,
    pub position: Position,
    pub size: Size,
    /// Paint order; higher values are drawn on top.
    pub z_index: i32,
    /// Clockwise rotation in degrees.
    #[serde(default)]
    pub rotation: f64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextKind {
    #[default]
    Heading,
    Paragraph,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    #[default]
    Normal,
    Bold,
}

/// Free text placed on a board.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextElement {
    pub id: EntityId,
    #[serde(rename = "type")]
    pub kind: TextKind,
    pub content: String,
    pub position: Position,
    pub size: Size,
    pub z_index: i32,
    pub font_size: u32,
    pub font_weight: FontWeight,
    pub color: String,
}

/// Partial update for a text element; `None` fields are left untouched.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextElementPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<FontWeight>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl TextElementPatch {
    /// Merge the present fields into `element`.
    pub fn apply_to(&self, element: &mut TextElement) {
        if let Some(content) = &self.content {
            element.content.clone_from(content);
        }
        if let Some(font_size) = self.font_size {
            element.font_size = font_size;
        }
        if let Some(font_weight) = self.font_weight {
            element.font_weight = font_weight;
        }
        if let Some(color) = &self.color {
            element.color.clone_from(color);
        }
    }
}

// =============================================================================
// COLLABORATION
// =============================================================================

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollaboratorRole {
    Owner,
    #[default]
    Editor,
    Viewer,
}

impl CollaboratorRole {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Editor => "editor",
            Self::Viewer => "viewer",
        }
    }
}

impl fmt::Display for CollaboratorRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresenceStatus {
    Online,
    #[default]
    Offline,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collaborator {
    pub user_id: String,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    pub role: CollaboratorRole,
    #[serde(default)]
    pub status: PresenceStatus,
}

// =============================================================================
// BOARD
// =============================================================================

/// Canvas settings. Bounds are advisory; the store never clamps geometry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BoardSettings {
    pub grid_size: u32,
    pub show_grid: bool,
    pub allow_overlap: bool,
    pub min_zoom: f64,
    pub max_zoom: f64,
}

impl Default for BoardSettings {
    fn default() -> Self {
        Self { grid_size: 20, show_grid: true, allow_overlap: true, min_zoom: 0.25, max_zoom: 4.0 }
    }
}

/// One moodboard canvas.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub owner_id: String,
    pub owner_name: String,
    /// Insertion order breaks `z_index` ties when painting.
    #[serde(default)]
    pub products: Vec<BoardProduct>,
    #[serde(default)]
    pub text_elements: Vec<TextElement>,
    #[serde(default)]
    pub collaborators: Vec<Collaborator>,
    #[serde(default)]
    pub settings: BoardSettings,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
    #[serde(default)]
    pub is_public: bool,
}

impl Board {
    #[must_use]
    pub fn product(&self, id: &EntityId) -> Option<&BoardProduct> {
        self.products.iter().find(|product| &product.id == id)
    }

    #[must_use]
    pub fn text_element(&self, id: &EntityId) -> Option<&TextElement> {
        self.text_elements.iter().find(|text| &text.id == id)
    }

    /// Highest paint order across products and text, or 0 for an empty board.
    #[must_use]
    pub fn max_z_index(&self) -> i32 {
        self.products
            .iter()
            .map(|product| product.z_index)
            .chain(self.text_elements.iter().map(|text| text.z_index))
            .max()
            .unwrap_or(0)
    }

    /// Number of elements still carrying a provisional id.
    #[must_use]
    pub fn local_entity_count(&self) -> usize {
        self.products.iter().filter(|product| product.id.is_local()).count()
            + self.text_elements.iter().filter(|text| text.id.is_local()).count()
    }
}
