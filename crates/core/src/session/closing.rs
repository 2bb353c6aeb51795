use super::Session;
use crate::*;
use log::{debug, info};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ClosingStep {
    #[default]
    NotStarted,
    Group,
    Personal(usize),
    Summary,
}

#[derive(Debug, Clone, Default)]
pub(super) struct ClosingProgress {
    step: ClosingStep,
    card: Option<Card>,
}

impl ClosingProgress {
    /// Keeps the personal round on the same player after the roster shifts.
    /// A removed current player hands the turn to whoever moved into the slot.
    pub(super) fn player_removed(&mut self, index: usize) {
        if let ClosingStep::Personal(current) = self.step {
            if index < current {
                self.step = ClosingStep::Personal(current - 1);
            }
        }
    }
}

impl Session {
    pub fn closing_step(&self) -> ClosingStep {
        self.closing.step
    }

    /// The prompt for the current closing step, if the catalog had one.
    pub fn closing_card(&self) -> Option<&Card> {
        self.closing.card.as_ref()
    }

    /// The player being addressed during the personal closing round.
    pub fn closing_player(&self) -> Option<&Player> {
        match self.closing.step {
            ClosingStep::Personal(index) => self.state.players.get(index),
            _ => None,
        }
    }

    pub fn begin_closing(&mut self) {
        self.state.current_candidate_cards.clear();
        self.state.current_selected_card = None;
        self.state.current_answering_player_id = None;
        let card = self.draw_closing_card(CardFormat::ClosingGroup);
        if card.is_none() {
            info!("no closing group card available");
        }
        self.closing = ClosingProgress {
            step: ClosingStep::Group,
            card,
        };
        self.set_screen(Screen::ClosingGroup);
    }

    /// Walks group -> each player -> summary. Returns the step reached.
    pub fn advance_closing(&mut self) -> ClosingStep {
        let next = match self.closing.step {
            ClosingStep::NotStarted => {
                self.begin_closing();
                return self.closing.step;
            }
            ClosingStep::Group => ClosingStep::Personal(0),
            ClosingStep::Personal(index) => ClosingStep::Personal(index + 1),
            ClosingStep::Summary => return ClosingStep::Summary,
        };
        match next {
            ClosingStep::Personal(index) if index < self.state.players.len() => {
                let card = self.draw_closing_card(CardFormat::ClosingPersonal);
                debug!("closing prompt for player {index}");
                self.closing = ClosingProgress { step: next, card };
                self.set_screen(Screen::ClosingPersonal);
            }
            _ => {
                self.closing = ClosingProgress {
                    step: ClosingStep::Summary,
                    card: None,
                };
                self.set_screen(Screen::SessionSummary);
            }
        }
        self.closing.step
    }

    /// Returns to the welcome screen. Players and settings survive.
    pub fn finish_session(&mut self) {
        info!(
            "session finished after {} answered cards",
            self.state.used_card_ids.len()
        );
        self.state.reset_progress();
        self.closing = ClosingProgress::default();
        self.set_screen(Screen::Welcome);
    }

    fn draw_closing_card(&mut self, format: CardFormat) -> Option<Card> {
        let cap = Intensity::clamped(self.config.closing_max_intensity);
        let cards = self.catalog.all_cards();
        let pool: Vec<&Card> = cards
            .iter()
            .filter(|card| card.has_format(format) && card.intensity <= cap)
            .collect();
        self.rng.pick(&pool).map(|card| (*card).clone())
    }
}
