use super::Session;
use crate::*;
use log::{debug, info};

impl Session {
    pub fn start_session(&mut self) {
        self.state.current_round_number = 1;
        self.state.current_answering_player_id = None;
        self.state.answered_in_current_cycle.clear();
        self.closing = super::closing::ClosingProgress::default();
        let cards = self.catalog.all_cards();
        self.draw_candidates(&cards);
        info!(
            "session started with {} players, {} candidates",
            self.state.players.len(),
            self.state.current_candidate_cards.len()
        );
        self.set_screen(Screen::InRound);
    }

    /// Redraws the candidates from `cards` without touching the round counter.
    pub fn pick_new_cards(&mut self, cards: &[Card]) {
        self.draw_candidates(cards);
    }

    /// Selects a candidate by id; `None` or an empty id clears the selection.
    pub fn select_card(&mut self, id: Option<&str>) {
        let id = id.map(str::trim).filter(|id| !id.is_empty());
        self.state.current_selected_card = id.and_then(|id| {
            self.state
                .current_candidate_cards
                .iter()
                .find(|card| card.id == id)
                .cloned()
        });
    }

    /// Hands the selected card to a player. Unknown ids are ignored.
    pub fn select_answering_player(&mut self, id: &str) -> bool {
        if self.state.player(id).is_none() {
            debug!("ignoring unknown answering player {id}");
            return false;
        }
        self.state.current_answering_player_id = Some(id.to_string());
        self.set_screen(Screen::AnswerPhase);
        true
    }

    /// Retires the selected card and starts the next round. No-op without a selection.
    pub fn mark_answered(&mut self) -> bool {
        let Some(card) = self.state.current_selected_card.take() else {
            return false;
        };
        self.state.used_card_ids.insert(card.id.clone());
        if let Some(player_id) = self.state.current_answering_player_id.take() {
            self.state.answered_in_current_cycle.insert(player_id);
            let everyone_answered = self
                .state
                .players
                .iter()
                .all(|player| self.state.answered_in_current_cycle.contains(&player.id));
            if everyone_answered {
                self.state.answered_in_current_cycle.clear();
            }
        }
        let round = self.state.current_round_number;
        self.events.push(Event::CardAnswered {
            card_id: card.id,
            round,
        });
        self.state.current_round_number = round + 1;
        self.set_screen(Screen::InRound);
        let cards = self.catalog.all_cards();
        self.draw_candidates(&cards);
        true
    }

    /// Excludes every shown candidate for the rest of the session and redraws.
    pub fn skip_current_set(&mut self) {
        let card_ids: Vec<String> = self
            .state
            .current_candidate_cards
            .iter()
            .map(|card| card.id.clone())
            .collect();
        self.state
            .skipped_card_ids
            .extend(card_ids.iter().cloned());
        self.events.push(Event::SetSkipped { card_ids });
        let cards = self.catalog.all_cards();
        self.draw_candidates(&cards);
    }

    fn draw_candidates(&mut self, cards: &[Card]) {
        let eligible = eligible_cards(cards, &self.state.settings);
        let pool = drawable_cards(
            eligible,
            &self.state.used_card_ids,
            &self.state.skipped_card_ids,
        );
        let drawn = draw(&pool, self.config.candidate_count, &mut self.rng);
        if drawn.is_empty() {
            info!("no drawable cards left");
        }
        self.events.push(Event::CandidatesDrawn {
            round: self.state.current_round_number,
            card_ids: drawn.iter().map(|card| card.id.clone()).collect(),
        });
        self.state.current_candidate_cards = drawn;
        self.state.current_selected_card = None;
    }
}
