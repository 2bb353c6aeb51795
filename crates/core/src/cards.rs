use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Tr,
}

impl Language {
    pub fn code(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Tr => "tr",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_lowercase().as_str() {
            "en" => Some(Self::En),
            "tr" => Some(Self::Tr),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum ThemeTag {
    Nostalgia,
    Love,
    Identity,
    DeepWaters,
    Shadow,
    Philosophy,
    Story,
    Couple,
    Group,
    Closing,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum DeckTag {
    All,
    Nostalgia,
    Love,
    Identity,
    DeepWaters,
    Shadow,
    Philosophy,
    Story,
    Couple,
    Group,
    Closing,
}

impl DeckTag {
    /// Decks offered on the setup screen, in display order.
    pub const SELECTABLE: [DeckTag; 9] = [
        DeckTag::All,
        DeckTag::Nostalgia,
        DeckTag::Love,
        DeckTag::Identity,
        DeckTag::DeepWaters,
        DeckTag::Shadow,
        DeckTag::Philosophy,
        DeckTag::Story,
        DeckTag::Couple,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Nostalgia => "nostalgia",
            Self::Love => "love",
            Self::Identity => "identity",
            Self::DeepWaters => "deep_waters",
            Self::Shadow => "shadow",
            Self::Philosophy => "philosophy",
            Self::Story => "story",
            Self::Couple => "couple",
            Self::Group => "group",
            Self::Closing => "closing",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        let key = key.trim().to_ascii_lowercase().replace('-', "_");
        [Self::Group, Self::Closing]
            .into_iter()
            .chain(Self::SELECTABLE)
            .find(|tag| tag.key() == key)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum CardFormat {
    Solo,
    SoloWithFollowup,
    Story,
    StoryWithFollowup,
    Couple,
    CoupleWithFollowup,
    Group,
    ClosingPersonal,
    ClosingGroup,
}

/// Depth rating of a card, always within `1..=5`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(try_from = "u8", into = "u8")]
pub struct Intensity(u8);

impl Intensity {
    pub const MIN: Intensity = Intensity(1);
    pub const MAX: Intensity = Intensity(5);

    pub fn new(level: u8) -> Option<Self> {
        (Self::MIN.0..=Self::MAX.0)
            .contains(&level)
            .then_some(Self(level))
    }

    pub fn clamped(level: u8) -> Self {
        Self(level.clamp(Self::MIN.0, Self::MAX.0))
    }

    pub fn level(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Intensity {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| format!("intensity {value} outside 1..=5"))
    }
}

impl From<Intensity> for u8 {
    fn from(value: Intensity) -> Self {
        value.0
    }
}

impl fmt::Display for Intensity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct CardText {
    pub en: String,
    #[serde(default)]
    pub tr: String,
}

impl CardText {
    pub fn english(text: impl Into<String>) -> Self {
        let en = text.into();
        Self { tr: en.clone(), en }
    }

    /// Text in `language`, falling back to English when the translation is missing.
    pub fn get(&self, language: Language) -> &str {
        match language {
            Language::Tr if !self.tr.trim().is_empty() => &self.tr,
            _ => &self.en,
        }
    }

    pub fn set(&mut self, language: Language, text: String) {
        match language {
            Language::En => self.en = text,
            Language::Tr => self.tr = text,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Card {
    pub id: String,
    pub text: CardText,
    #[serde(rename = "intensity_level")]
    pub intensity: Intensity,
    #[serde(default)]
    pub themes: Vec<ThemeTag>,
    #[serde(default)]
    pub formats: Vec<CardFormat>,
    pub deck_tags: Vec<DeckTag>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_story_card: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_couple_card: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_closing_card: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl Card {
    pub fn has_theme(&self, theme: ThemeTag) -> bool {
        self.themes.contains(&theme)
    }

    pub fn has_format(&self, format: CardFormat) -> bool {
        self.formats.contains(&format)
    }

    pub fn in_any_deck(&self, decks: &[DeckTag]) -> bool {
        self.deck_tags.iter().any(|tag| decks.contains(tag))
    }

    pub fn text_in(&self, language: Language) -> &str {
        self.text.get(language)
    }

    pub fn is_generated(&self) -> bool {
        self.id.starts_with("gen-")
    }
}
