use allcards_core::{
    Card, CardFormat, CardText, ClosingStep, DeckTag, Event, GeneratorConfig, InlineSpawner,
    Intensity, MemoryStore, Screen, Session, SessionConfig, SettingsUpdate, ThemeTag, Vote,
};
use std::collections::HashSet;
use std::sync::Arc;

fn card(id: &str, level: u8, decks: Vec<DeckTag>) -> Card {
    Card {
        id: id.to_string(),
        text: CardText::english(format!("Tell us about moment number {id} that stayed with you?")),
        intensity: Intensity::clamped(level),
        themes: vec![ThemeTag::Nostalgia],
        formats: vec![CardFormat::Solo],
        deck_tags: decks,
        is_story_card: false,
        is_couple_card: false,
        is_closing_card: false,
        notes: None,
    }
}

fn closing(id: &str, format: CardFormat) -> Card {
    Card {
        id: id.to_string(),
        text: CardText::english(format!("Closing thought {id}")),
        intensity: Intensity::clamped(1),
        themes: vec![ThemeTag::Closing],
        formats: vec![format],
        deck_tags: vec![DeckTag::Closing],
        is_story_card: false,
        is_couple_card: false,
        is_closing_card: true,
        notes: None,
    }
}

fn catalog() -> Vec<Card> {
    let mut cards: Vec<Card> = (1..=12)
        .map(|i| {
            let deck = if i % 2 == 0 { DeckTag::Love } else { DeckTag::Shadow };
            card(&format!("Q{i:02}"), 1 + (i % 5) as u8, vec![DeckTag::All, deck])
        })
        .collect();
    cards.push(closing("CG", CardFormat::ClosingGroup));
    cards.push(closing("CP", CardFormat::ClosingPersonal));
    cards
}

fn session(seed: u64) -> Session {
    let config = SessionConfig {
        generator: GeneratorConfig {
            stagger_ms: 0,
            ..GeneratorConfig::default()
        },
        ..SessionConfig::default()
    };
    Session::new(catalog(), MemoryStore::shared(), config, seed)
        .with_spawner(Arc::new(InlineSpawner))
}

fn candidate_ids(session: &Session) -> Vec<String> {
    session.candidates().iter().map(|c| c.id.clone()).collect()
}

macro_rules! clamp_case {
    ($name:ident, $min:expr, $max:expr, $expected:expr) => {
        #[test]
        fn $name() {
            let mut session = session(1);
            session.update_settings(SettingsUpdate {
                min_intensity: $min.map(Intensity::clamped),
                max_intensity: $max.map(Intensity::clamped),
                ..SettingsUpdate::default()
            });
            let settings = session.settings();
            assert_eq!(
                (settings.min_intensity.level(), settings.max_intensity.level()),
                $expected
            );
        }
    };
}

clamp_case!(clamp_min_only_raises_max, Some(5u8), None::<u8>, (5, 5));
clamp_case!(clamp_max_only_lowers_min, None::<u8>, Some(1u8), (1, 1));
clamp_case!(clamp_both_inverted_lowers_min, Some(4u8), Some(2u8), (2, 2));
clamp_case!(clamp_valid_range_kept, Some(2u8), Some(4u8), (2, 4));

#[test]
fn full_session_walkthrough() {
    let mut session = session(7);
    let ada = session.add_player("Ada").expect("player");
    let bo = session.add_player("Bo").expect("player");
    session.set_screen(Screen::SetupSession);
    session.set_max_intensity(Intensity::MAX);
    session.start_session();
    assert_eq!(session.round(), 1);

    let mut answered = HashSet::new();
    for (round, player) in [(1, &ada), (2, &bo), (3, &ada)] {
        assert_eq!(session.round(), round);
        let id = candidate_ids(&session)[0].clone();
        session.select_card(Some(&id));
        assert!(session.select_answering_player(player));
        assert!(session.mark_answered());
        answered.insert(id);
        assert!(candidate_ids(&session).iter().all(|c| !answered.contains(c)));
    }
    assert_eq!(session.round(), 4);

    session.begin_closing();
    assert_eq!(session.screen(), Screen::ClosingGroup);
    assert_eq!(session.closing_card().map(|c| c.id.as_str()), Some("CG"));
    assert_eq!(session.advance_closing(), ClosingStep::Personal(0));
    assert_eq!(session.advance_closing(), ClosingStep::Personal(1));
    assert_eq!(session.advance_closing(), ClosingStep::Summary);
    session.finish_session();
    assert_eq!(session.screen(), Screen::Welcome);
    assert_eq!(session.players().len(), 2);

    let events = session.drain_events();
    let answered_events = events
        .iter()
        .filter(|event| matches!(event, Event::CardAnswered { .. }))
        .count();
    assert_eq!(answered_events, 3);
}

#[test]
fn candidates_respect_deck_and_intensity() {
    let mut session = session(11);
    session.update_settings(SettingsUpdate {
        selected_deck_tags: Some(vec![DeckTag::Love]),
        min_intensity: Some(Intensity::clamped(2)),
        max_intensity: Some(Intensity::clamped(4)),
    });
    assert_eq!(session.settings().selected_deck_tags[0], DeckTag::All);
    for _ in 0..10 {
        session.start_session();
        for card in session.candidates() {
            let level = card.intensity.level();
            assert!((2..=4).contains(&level), "{} at {level}", card.id);
            assert!(!card.is_closing_card);
        }
    }
}

#[test]
fn same_seed_draws_same_candidates() {
    let mut first = session(99);
    let mut second = session(99);
    first.start_session();
    second.start_session();
    assert_eq!(candidate_ids(&first), candidate_ids(&second));
}

#[test]
fn generated_cards_join_the_draw_pool() {
    let mut session = session(5);
    session.set_max_intensity(Intensity::MAX);
    let requested = session.vote_card("Q01", Vote::Up);
    assert!(requested >= 2);
    let generated = session.catalog().generated_cards();
    assert_eq!(generated.len(), requested);
    assert!(generated.iter().all(|c| c.is_generated()));

    let events = session.drain_events();
    assert!(events.iter().any(|event| matches!(
        event,
        Event::GenerationFinished { source_id, .. } if source_id == "Q01"
    )));

    let mut seen = HashSet::new();
    for _ in 0..40 {
        session.start_session();
        seen.extend(candidate_ids(&session));
    }
    assert!(generated.iter().any(|c| seen.contains(&c.id)));
}
