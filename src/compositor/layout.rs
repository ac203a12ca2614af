//! Per-type layout rules.
//!
//! Which decorations a card carries depends only on its [`CardType`]. The
//! table below is an exhaustive match resolved once per render; geometry is expressed against the
//! configured canvas so a resized canvas keeps the same proportions.
//!
//! | Type  | Mana badge | Stats footer | Default illustration frame |
//! |-------|------------|--------------|----------------------------|
//! | Hero  | none       | yes          | whole body, cover-scaled   |
//! | Creep | left of name | yes        | whole body, cover-scaled   |
//! | Spell | top-right  | no           | slot-sized, inset in body  |

use crate::card::{CardType, IllustrationFrame};
use crate::config::CanvasConfig;

/// Where the mana-cost badge goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManaBadge {
    None,
    /// In the header, left of the centered name.
    BesideName,
    /// Top-right corner of the header.
    TopRight,
}

/// How the default illustration frame is derived from the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramePolicy {
    /// Everything below the header.
    FullBody,
    /// A slot-sized frame centered horizontally, `top` below the header.
    Inset { top: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutRules {
    pub mana_badge: ManaBadge,
    pub stats_footer: bool,
    pub frame: FramePolicy,
}

const HERO: LayoutRules = LayoutRules {
    mana_badge: ManaBadge::None,
    stats_footer: true,
    frame: FramePolicy::FullBody,
};

const CREEP: LayoutRules = LayoutRules {
    mana_badge: ManaBadge::BesideName,
    stats_footer: true,
    frame: FramePolicy::FullBody,
};

const SPELL: LayoutRules = LayoutRules {
    mana_badge: ManaBadge::TopRight,
    stats_footer: false,
    frame: FramePolicy::Inset { top: 15 },
};

pub fn rules_for(card_type: CardType) -> LayoutRules {
    match card_type {
        CardType::Hero => HERO,
        CardType::Creep => CREEP,
        CardType::Spell => SPELL,
    }
}

impl LayoutRules {
    /// The frame used when the card has no `illustrationFrame` override.
    pub fn default_frame(&self, canvas: &CanvasConfig, slot: (u32, u32)) -> IllustrationFrame {
        let body_height = canvas.height.saturating_sub(canvas.header_height);
        match self.frame {
            FramePolicy::FullBody => IllustrationFrame {
                x: 0,
                y: canvas.header_height as i32,
                width: canvas.width,
                height: body_height,
            },
            FramePolicy::Inset { top } => {
                let width = slot.0.min(canvas.width);
                let height = slot.1.min(body_height.saturating_sub(top));
                IllustrationFrame {
                    x: ((canvas.width - width) / 2) as i32,
                    y: (canvas.header_height + top) as i32,
                    width,
                    height,
                }
            }
        }
    }
}

/// Fixed geometry shared by every card type, in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Metrics {
    pub name_scale: u32,
    pub badge_radius: u32,
    /// Distance from the header edge to the badge center.
    pub badge_inset: u32,
    pub label_top: u32,
    pub container_margin: u32,
    pub container_height: u32,
    pub footer_height: u32,
    pub text_padding: u32,
    pub line_height: u32,
}

pub const METRICS: Metrics = Metrics {
    name_scale: 2,
    badge_radius: 16,
    badge_inset: 30,
    label_top: 6,
    container_margin: 15,
    container_height: 120,
    footer_height: 34,
    text_padding: 8,
    line_height: 11,
};
