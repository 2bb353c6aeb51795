use crate::{DeckTag, Intensity};
use serde::{Deserialize, Serialize};

/// Deserialized settings pass through [`SessionSettings::apply`], so stored or
/// shared copies come back clamped with `all` pinned.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", from = "StoredSettings")]
pub struct SessionSettings {
    pub selected_deck_tags: Vec<DeckTag>,
    pub min_intensity: Intensity,
    pub max_intensity: Intensity,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredSettings {
    #[serde(default)]
    selected_deck_tags: Vec<DeckTag>,
    min_intensity: Intensity,
    max_intensity: Intensity,
}

impl From<StoredSettings> for SessionSettings {
    fn from(stored: StoredSettings) -> Self {
        let mut settings = SessionSettings::default();
        settings.apply(SettingsUpdate {
            selected_deck_tags: Some(stored.selected_deck_tags),
            min_intensity: Some(stored.min_intensity),
            max_intensity: Some(stored.max_intensity),
        });
        settings
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            selected_deck_tags: vec![DeckTag::All],
            min_intensity: Intensity::MIN,
            max_intensity: Intensity::clamped(3),
        }
    }
}

/// Partial update merged by [`SessionSettings::apply`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsUpdate {
    pub selected_deck_tags: Option<Vec<DeckTag>>,
    pub min_intensity: Option<Intensity>,
    pub max_intensity: Option<Intensity>,
}

impl SessionSettings {
    pub fn contains_intensity(&self, intensity: Intensity) -> bool {
        self.min_intensity <= intensity && intensity <= self.max_intensity
    }

    /// Merges `update` and re-establishes the invariants: `all` pinned, no
    /// duplicate tags, `min <= max` by moving the bound that was not changed.
    pub fn apply(&mut self, update: SettingsUpdate) {
        if let Some(tags) = update.selected_deck_tags {
            self.selected_deck_tags = tags;
        }
        let min_changed = update.min_intensity.is_some();
        let max_changed = update.max_intensity.is_some();
        if let Some(min) = update.min_intensity {
            self.min_intensity = min;
        }
        if let Some(max) = update.max_intensity {
            self.max_intensity = max;
        }
        if self.min_intensity > self.max_intensity {
            if min_changed && !max_changed {
                self.max_intensity = self.min_intensity;
            } else {
                self.min_intensity = self.max_intensity;
            }
        }
        self.normalize_tags();
    }

    pub fn set_min_intensity(&mut self, min: Intensity) {
        self.apply(SettingsUpdate {
            min_intensity: Some(min),
            ..SettingsUpdate::default()
        });
    }

    pub fn set_max_intensity(&mut self, max: Intensity) {
        self.apply(SettingsUpdate {
            max_intensity: Some(max),
            ..SettingsUpdate::default()
        });
    }

    /// Adds or removes a deck. `all` stays selected regardless.
    pub fn toggle_deck_tag(&mut self, tag: DeckTag) {
        if tag == DeckTag::All {
            return;
        }
        if let Some(pos) = self.selected_deck_tags.iter().position(|t| *t == tag) {
            self.selected_deck_tags.remove(pos);
        } else {
            self.selected_deck_tags.push(tag);
        }
        self.normalize_tags();
    }

    fn normalize_tags(&mut self) {
        let mut tags = vec![DeckTag::All];
        for tag in self.selected_deck_tags.drain(..) {
            if !tags.contains(&tag) {
                tags.push(tag);
            }
        }
        self.selected_deck_tags = tags;
    }
}
