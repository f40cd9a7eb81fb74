//! Structured message component trees.
//!
//! A composed reply is a rooted tree: a [`Bubble`] (single card) or a
//! [`Carousel`](MessageTree::Carousel) of up to [`MAX_CAROUSEL_BUBBLES`]
//! bubbles, each holding [`BoxComponent`] containers that nest further boxes
//! or leaf components. Every size, spacing, and layout field is a closed
//! enum; there are no free-form units anywhere in the model, so a template
//! that deserializes is already most of the way to being wire-legal. The
//! remaining string-valued constraints (hex colors, non-empty URLs) are
//! enforced by [`compose`](crate::message::compose::compose).

use serde::{Deserialize, Serialize};

pub mod compose;

pub use compose::{compose, substitute};

/// Hard cap on bubbles per carousel, mirrored from the messaging platform.
pub const MAX_CAROUSEL_BUBBLES: usize = 12;

/// The root of a composed message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum MessageTree {
    Bubble(Bubble),
    Carousel { contents: Vec<Bubble> },
}

/// A single card: optional header box, mandatory body box, optional footer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bubble {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header: Option<BoxComponent>,
    pub body: BoxComponent,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footer: Option<BoxComponent>,
}

/// The only component that nests: a layout container for boxes and leaves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxComponent {
    pub layout: BoxLayout,
    pub contents: Vec<Component>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub justify: Option<Justify>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub align: Option<Align>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spacing: Option<Spacing>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub margin: Option<Spacing>,
}

impl BoxComponent {
    pub fn vertical(contents: Vec<Component>) -> Self {
        BoxComponent {
            layout: BoxLayout::Vertical,
            contents,
            justify: None,
            align: None,
            spacing: None,
            margin: None,
        }
    }

    pub fn horizontal(contents: Vec<Component>) -> Self {
        BoxComponent {
            layout: BoxLayout::Horizontal,
            contents,
            ..Self::vertical(vec![])
        }
    }
}

/// A child slot inside a box. Leaves are terminal; only `Box` nests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Component {
    Box(BoxComponent),
    Text(TextComponent),
    Image(ImageComponent),
    Button(ButtonComponent),
    Separator(SeparatorComponent),
    Icon(IconComponent),
    Video(VideoComponent),
    Span(SpanComponent),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextComponent {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<SizeKeyword>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<TextWeight>,
    #[serde(default)]
    pub wrap: bool,
}

impl TextComponent {
    pub fn plain(text: impl Into<String>) -> Self {
        TextComponent {
            text: text.into(),
            color: None,
            size: None,
            weight: None,
            wrap: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageComponent {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<SizeKeyword>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aspect_ratio: Option<AspectRatio>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ButtonComponent {
    pub label: String,
    pub action: ButtonAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<ButtonStyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// What tapping a button sends back to the bot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ButtonAction {
    Postback { data: String },
    Message { text: String },
    Uri { uri: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeparatorComponent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub margin: Option<Spacing>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IconComponent {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<SizeKeyword>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoComponent {
    pub url: String,
    pub preview_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aspect_ratio: Option<AspectRatio>,
}

/// Styled inline text run. A leaf like the rest; it does not nest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpanComponent {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<SizeKeyword>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<TextWeight>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoxLayout {
    Horizontal,
    Vertical,
    Baseline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Justify {
    FlexStart,
    Center,
    FlexEnd,
    SpaceBetween,
    SpaceAround,
    SpaceEvenly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Align {
    FlexStart,
    Center,
    FlexEnd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeKeyword {
    Xxs,
    Xs,
    Sm,
    Md,
    Lg,
    Xl,
    Xxl,
    Full,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Spacing {
    None,
    Xs,
    Sm,
    Md,
    Lg,
    Xl,
    Xxl,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextWeight {
    Regular,
    Bold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ButtonStyle {
    Primary,
    Secondary,
    Link,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AspectRatio {
    #[serde(rename = "1:1")]
    Square,
    #[serde(rename = "4:3")]
    FourThree,
    #[serde(rename = "16:9")]
    SixteenNine,
    #[serde(rename = "20:13")]
    TwentyThirteen,
}

/// Checks the `#RRGGBB` color form shared by block fields and components.
pub(crate) fn is_valid_color(value: &str) -> bool {
    let mut chars = value.chars();
    chars.next() == Some('#')
        && value.len() == 7
        && chars.all(|c| c.is_ascii_hexdigit())
}
