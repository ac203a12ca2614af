//! The card record and its field-level editing rules.
//!
//! A [`CardModel`] is pure data: a handful of base fields every card has, a
//! [`CardKind`] carrying the stats that only make sense for one card type,
//! and an optional illustration produced by the [crop engine](crate::crop).
//!
//! ## Variant fields
//!
//! | Type | attack | health | manaCost |
//! |------|:------:|:------:|:--------:|
//! | Hero | ✓ | ✓ | |
//! | Creep | ✓ | ✓ | ✓ |
//! | Spell | | | ✓ |
//!
//! Switching type ([`CardModel::set_card_type`]) keeps every stat the new
//! type shares with the old one, drops the rest, and fills the newly
//! required ones from [`CardKind::default_for`].
//!
//! ## Wire format
//!
//! Serialization goes through a flat camelCase record whose key order is
//! fixed: `id, name, cardType, color, attack, health, manaCost, description,
//! illustration, illustrationFrame`. Variant fields that do not apply are
//! omitted. Stat values are read leniently: numbers, numeric strings and
//! junk are all accepted, junk becoming `0`.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CardError {
    #[error("unknown card field: {0}")]
    UnknownField(String),
    #[error("unknown card type: {0}")]
    UnknownCardType(String),
    #[error("{field} does not apply to {card_type} cards")]
    FieldNotApplicable {
        field: CardField,
        card_type: CardType,
    },
}

/// The three card types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CardType {
    Hero,
    Creep,
    Spell,
}

impl CardType {
    pub const ALL: [CardType; 3] = [CardType::Hero, CardType::Creep, CardType::Spell];

    pub fn label(self) -> &'static str {
        match self {
            CardType::Hero => "Hero",
            CardType::Creep => "Creep",
            CardType::Spell => "Spell",
        }
    }
}

impl fmt::Display for CardType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Card types are matched case-insensitively (`"hero"`, `"Hero"`, `"HERO"`).
impl FromStr for CardType {
    type Err = CardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CardType::ALL
            .into_iter()
            .find(|t| t.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| CardError::UnknownCardType(s.to_string()))
    }
}

impl<'de> Deserialize<'de> for CardType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Card color. Any string is accepted; names outside the built-in set are
/// kept verbatim so they survive a save/load round trip.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CardColor {
    Red,
    Blue,
    Green,
    Yellow,
    Purple,
    Other(String),
}

impl CardColor {
    pub fn name(&self) -> &str {
        match self {
            CardColor::Red => "Red",
            CardColor::Blue => "Blue",
            CardColor::Green => "Green",
            CardColor::Yellow => "Yellow",
            CardColor::Purple => "Purple",
            CardColor::Other(name) => name,
        }
    }
}

impl From<&str> for CardColor {
    fn from(s: &str) -> Self {
        match s {
            "Red" => CardColor::Red,
            "Blue" => CardColor::Blue,
            "Green" => CardColor::Green,
            "Yellow" => CardColor::Yellow,
            "Purple" => CardColor::Purple,
            other => CardColor::Other(other.to_string()),
        }
    }
}

impl From<String> for CardColor {
    fn from(s: String) -> Self {
        CardColor::from(s.as_str())
    }
}

impl From<CardColor> for String {
    fn from(color: CardColor) -> Self {
        color.name().to_string()
    }
}

impl fmt::Display for CardColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Type-specific stats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardKind {
    Hero { attack: u32, health: u32 },
    Creep { attack: u32, health: u32, mana_cost: u32 },
    Spell { mana_cost: u32 },
}

impl CardKind {
    /// Fresh stats for a card of type `card_type`.
    pub fn default_for(card_type: CardType) -> Self {
        match card_type {
            CardType::Hero => CardKind::Hero {
                attack: 0,
                health: 0,
            },
            CardType::Creep => CardKind::Creep {
                attack: 0,
                health: 0,
                mana_cost: 0,
            },
            CardType::Spell => CardKind::Spell { mana_cost: 0 },
        }
    }

    pub fn card_type(&self) -> CardType {
        match self {
            CardKind::Hero { .. } => CardType::Hero,
            CardKind::Creep { .. } => CardType::Creep,
            CardKind::Spell { .. } => CardType::Spell,
        }
    }

    /// `(attack, health)` for types with combat stats.
    pub fn combat_stats(&self) -> Option<(u32, u32)> {
        match *self {
            CardKind::Hero { attack, health } | CardKind::Creep { attack, health, .. } => {
                Some((attack, health))
            }
            CardKind::Spell { .. } => None,
        }
    }

    pub fn mana_cost(&self) -> Option<u32> {
        match *self {
            CardKind::Creep { mana_cost, .. } | CardKind::Spell { mana_cost } => Some(mana_cost),
            CardKind::Hero { .. } => None,
        }
    }

    /// Convert to another type, keeping shared stats and defaulting the rest.
    pub fn convert(self, target: CardType) -> Self {
        let defaults = CardKind::default_for(target);
        let (attack, health) = self
            .combat_stats()
            .or(defaults.combat_stats())
            .unwrap_or((0, 0));
        let mana_cost = self.mana_cost().or(defaults.mana_cost()).unwrap_or(0);

        match target {
            CardType::Hero => CardKind::Hero { attack, health },
            CardType::Creep => CardKind::Creep {
                attack,
                health,
                mana_cost,
            },
            CardType::Spell => CardKind::Spell { mana_cost },
        }
    }
}

/// Placement of the illustration layer on the card canvas, in canvas units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IllustrationFrame {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// Encoded image bytes plus the media type they were stored under.
///
/// Crops are always PNG. Illustrations loaded from JSON keep whatever
/// `data:image/*` type they arrived with, so saving them again does not
/// relabel the payload.
#[derive(Clone, PartialEq, Eq)]
pub struct Illustration {
    media_type: String,
    bytes: Vec<u8>,
}

const PNG_MEDIA_TYPE: &str = "image/png";

impl Illustration {
    pub fn from_png(png: Vec<u8>) -> Self {
        Self {
            media_type: PNG_MEDIA_TYPE.to_string(),
            bytes: png,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// e.g. `image/png`, `image/jpeg`.
    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// `data:<media type>;base64,...` form used in JSON documents.
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.media_type, BASE64.encode(&self.bytes))
    }

    /// Parse any base64 `data:image/*` URL. Returns `None` for anything else
    /// (e.g. a stale `blob:` URL from another tool).
    pub fn from_data_url(url: &str) -> Option<Self> {
        let rest = url.strip_prefix("data:")?;
        let (media_type, payload) = rest.split_once(";base64,")?;
        let subtype = media_type.strip_prefix("image/")?;
        if subtype.is_empty() || subtype.contains([';', ',']) {
            return None;
        }
        let bytes = BASE64.decode(payload.trim()).ok()?;
        (!bytes.is_empty()).then(|| Self {
            media_type: media_type.to_ascii_lowercase(),
            bytes,
        })
    }
}

impl fmt::Debug for Illustration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Illustration({}, {} bytes)", self.media_type, self.bytes.len())
    }
}

/// Editable card fields, named as in the card's JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardField {
    Id,
    Name,
    CardType,
    Color,
    Description,
    Attack,
    Health,
    ManaCost,
}

impl CardField {
    pub fn key(self) -> &'static str {
        match self {
            CardField::Id => "id",
            CardField::Name => "name",
            CardField::CardType => "cardType",
            CardField::Color => "color",
            CardField::Description => "description",
            CardField::Attack => "attack",
            CardField::Health => "health",
            CardField::ManaCost => "manaCost",
        }
    }
}

impl fmt::Display for CardField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for CardField {
    type Err = CardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "id" => Ok(CardField::Id),
            "name" => Ok(CardField::Name),
            "cardType" | "card_type" | "type" => Ok(CardField::CardType),
            "color" => Ok(CardField::Color),
            "description" => Ok(CardField::Description),
            "attack" => Ok(CardField::Attack),
            "health" => Ok(CardField::Health),
            "manaCost" | "mana_cost" | "mana" => Ok(CardField::ManaCost),
            other => Err(CardError::UnknownField(other.to_string())),
        }
    }
}

/// Integer-prefix parse: optional sign, then leading digits; anything else
/// stops the parse. No digits at all gives `0`.
///
/// `"12abc"` → 12, `"7.9"` → 7, `" -3"` → -3, `"abc"` → 0, `""` → 0.
pub fn parse_int_prefix(input: &str) -> i64 {
    let s = input.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let digits = &rest[..end];
    if digits.is_empty() {
        return 0;
    }
    let magnitude = digits.parse::<i64>().unwrap_or(i64::MAX);
    if negative { -magnitude } else { magnitude }
}

/// Stat coercion: integer prefix, negatives clamp to 0.
pub fn parse_stat(input: &str) -> u32 {
    clamp_stat(parse_int_prefix(input))
}

fn clamp_stat(value: i64) -> u32 {
    value.clamp(0, u32::MAX as i64) as u32
}

/// A single card.
#[derive(Debug, Clone, PartialEq)]
pub struct CardModel {
    pub id: i64,
    pub name: String,
    pub color: CardColor,
    pub description: String,
    pub kind: CardKind,
    pub illustration: Option<Illustration>,
    pub illustration_frame: Option<IllustrationFrame>,
}

impl Default for CardModel {
    fn default() -> Self {
        Self {
            id: 21,
            name: "Axe".to_string(),
            color: CardColor::Red,
            description: String::new(),
            kind: CardKind::Hero {
                attack: 7,
                health: 11,
            },
            illustration: None,
            illustration_frame: None,
        }
    }
}

impl CardModel {
    pub fn card_type(&self) -> CardType {
        self.kind.card_type()
    }

    /// Switch type, preserving shared stats, illustration and frame.
    pub fn set_card_type(&mut self, card_type: CardType) {
        self.kind = self.kind.convert(card_type);
    }

    pub fn set_illustration(&mut self, illustration: Illustration) {
        self.illustration = Some(illustration);
    }

    /// Apply raw form input to one field.
    ///
    /// Numeric fields never fail on bad input; they coerce to `0`. Setting a
    /// stat the current type does not carry is an error and leaves the card
    /// unchanged.
    pub fn apply_input(&mut self, field: CardField, value: &str) -> Result<(), CardError> {
        match field {
            CardField::Id => self.id = parse_int_prefix(value),
            CardField::Name => self.name = value.to_string(),
            CardField::Color => self.color = CardColor::from(value),
            CardField::Description => self.description = value.to_string(),
            CardField::CardType => self.set_card_type(value.parse()?),
            CardField::Attack | CardField::Health | CardField::ManaCost => {
                self.set_stat(field, parse_stat(value))?
            }
        }
        Ok(())
    }

    fn set_stat(&mut self, field: CardField, value: u32) -> Result<(), CardError> {
        let card_type = self.card_type();
        let slot = match (&mut self.kind, field) {
            (CardKind::Hero { attack, .. } | CardKind::Creep { attack, .. }, CardField::Attack) => {
                attack
            }
            (CardKind::Hero { health, .. } | CardKind::Creep { health, .. }, CardField::Health) => {
                health
            }
            (
                CardKind::Creep { mana_cost, .. } | CardKind::Spell { mana_cost },
                CardField::ManaCost,
            ) => mana_cost,
            _ => return Err(CardError::FieldNotApplicable { field, card_type }),
        };
        *slot = value;
        Ok(())
    }

    /// Parse a card from JSON (the session, data-export and bundle formats
    /// all share one schema).
    pub fn from_json(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    /// Pretty-printed JSON (2-space indent), optionally without the
    /// illustration bytes.
    pub fn to_json_pretty(&self, include_illustration: bool) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.to_record(include_illustration))
    }

    fn to_record(&self, include_illustration: bool) -> CardRecord {
        let (attack, health) = self.kind.combat_stats().unzip();
        CardRecord {
            id: self.id,
            name: self.name.clone(),
            card_type: self.card_type(),
            color: self.color.clone(),
            attack,
            health,
            mana_cost: self.kind.mana_cost(),
            description: self.description.clone(),
            illustration: self
                .illustration
                .as_ref()
                .filter(|_| include_illustration)
                .map(Illustration::to_data_url),
            illustration_frame: self.illustration_frame,
        }
    }
}

/// Flat wire form of [`CardModel`]. Field order here is the JSON key order.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CardRecord {
    #[serde(default, deserialize_with = "lenient_id")]
    id: i64,
    #[serde(default)]
    name: String,
    card_type: CardType,
    #[serde(default = "unset_color")]
    color: CardColor,
    #[serde(
        default,
        deserialize_with = "lenient_stat",
        skip_serializing_if = "Option::is_none"
    )]
    attack: Option<u32>,
    #[serde(
        default,
        deserialize_with = "lenient_stat",
        skip_serializing_if = "Option::is_none"
    )]
    health: Option<u32>,
    #[serde(
        default,
        deserialize_with = "lenient_stat",
        skip_serializing_if = "Option::is_none"
    )]
    mana_cost: Option<u32>,
    #[serde(default)]
    description: String,
    #[serde(
        default,
        alias = "descriptionImage",
        skip_serializing_if = "Option::is_none"
    )]
    illustration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    illustration_frame: Option<IllustrationFrame>,
}

fn unset_color() -> CardColor {
    CardColor::Other(String::new())
}

/// Coerce any JSON scalar to an integer the way form input is coerced.
fn coerce_value(value: &serde_json::Value) -> i64 {
    match value {
        serde_json::Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
            .unwrap_or(0),
        serde_json::Value::String(s) => parse_int_prefix(s),
        _ => 0,
    }
}

fn lenient_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.as_ref().map(coerce_value).unwrap_or(0))
}

fn lenient_stat<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u32>, D::Error> {
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.as_ref().map(|v| clamp_stat(coerce_value(v))))
}

impl From<CardRecord> for CardModel {
    fn from(record: CardRecord) -> Self {
        let kind = match record.card_type {
            CardType::Hero => CardKind::Hero {
                attack: record.attack.unwrap_or(0),
                health: record.health.unwrap_or(0),
            },
            CardType::Creep => CardKind::Creep {
                attack: record.attack.unwrap_or(0),
                health: record.health.unwrap_or(0),
                mana_cost: record.mana_cost.unwrap_or(0),
            },
            CardType::Spell => CardKind::Spell {
                mana_cost: record.mana_cost.unwrap_or(0),
            },
        };

        let illustration = record.illustration.as_deref().and_then(|url| {
            let parsed = Illustration::from_data_url(url);
            if parsed.is_none() && !url.is_empty() {
                tracing::warn!(card = %record.name, "ignoring illustration that is not a base64 data URL");
            }
            parsed
        });

        CardModel {
            id: record.id,
            name: record.name,
            color: record.color,
            description: record.description,
            kind,
            illustration,
            illustration_frame: record.illustration_frame,
        }
    }
}

impl Serialize for CardModel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_record(true).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for CardModel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        CardRecord::deserialize(deserializer).map(CardModel::from)
    }
}
