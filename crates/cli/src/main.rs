mod persistence;
mod translator;

use allcards_core::store::{load_language, save_language};
use allcards_core::{
    Card, CardFilter, ClosingStep, DeckTag, Event, Intensity, Language, MemoryStore, RngState,
    Screen, Session, SharedStore, Vote,
};
use allcards_data::{load_catalog, load_session_config, CatalogSummary};
use log::{debug, info, warn};
use persistence::{default_store_path, FileStore};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use translator::MyMemoryTranslator;

const ASSETS_DIR: &str = "assets";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct UiLocale(Language);

impl UiLocale {
    fn text<'a>(self, en: &'a str, tr: &'a str) -> &'a str {
        match self.0 {
            Language::Tr => tr,
            Language::En => en,
        }
    }
}

#[derive(Debug, Clone, Default)]
struct CliOptions {
    seed: Option<u64>,
    language: Option<Language>,
    store: Option<PathBuf>,
    ephemeral: bool,
    translate: bool,
}

fn parse_cli_options(args: &[String]) -> CliOptions {
    let mut options = CliOptions {
        language: std::env::var("ALLCARDS_LANG")
            .ok()
            .and_then(|code| Language::from_code(&code)),
        ..CliOptions::default()
    };
    let mut idx = 0usize;
    while idx < args.len() {
        match args[idx].as_str() {
            "--lang" | "-l" => {
                if let Some(value) = args.get(idx + 1) {
                    options.language = Language::from_code(value);
                    idx += 1;
                }
            }
            "--seed" => {
                if let Some(value) = args.get(idx + 1) {
                    options.seed = value.parse::<u64>().ok();
                    idx += 1;
                }
            }
            "--store" => {
                if let Some(value) = args.get(idx + 1) {
                    options.store = Some(PathBuf::from(value));
                    idx += 1;
                }
            }
            "--memory" => options.ephemeral = true,
            "--translate" => options.translate = true,
            other => warn!("ignoring unknown argument {other}"),
        }
        idx += 1;
    }
    options
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args: Vec<String> = std::env::args().skip(1).collect();
    let options = parse_cli_options(&args);
    if let Err(err) = run(options) {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn open_store(options: &CliOptions) -> SharedStore {
    if options.ephemeral {
        return MemoryStore::shared();
    }
    match options.store.clone().or_else(default_store_path) {
        Some(path) => {
            info!("using store {}", path.display());
            Arc::new(FileStore::open(path))
        }
        None => {
            warn!("no store path available, progress will not be saved");
            MemoryStore::shared()
        }
    }
}

fn build_session(options: &CliOptions, store: SharedStore) -> anyhow::Result<Session> {
    let assets = Path::new(ASSETS_DIR);
    let cards = load_catalog(assets)?;
    let config = load_session_config(assets)?;
    let seed = options
        .seed
        .unwrap_or_else(|| RngState::from_entropy().seed());
    let mut session = Session::new(cards, store, config, seed);
    if options.translate {
        session = session.with_translator(Arc::new(MyMemoryTranslator::new()?));
    }
    Ok(session)
}

fn run(options: CliOptions) -> anyhow::Result<()> {
    let store = open_store(&options);
    let language = options
        .language
        .unwrap_or_else(|| load_language(store.as_ref()));
    let mut session = build_session(&options, Arc::clone(&store))?;
    let mut locale = UiLocale(language);
    let mut filter = CardFilter {
        language,
        ..CardFilter::default()
    };
    println!(
        "{} ({} {})",
        locale.text("All Cards", "Tüm Kartlar"),
        locale.text("seed", "tohum"),
        session.seed()
    );
    print_help(locale);

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("{}> ", screen_label(locale, session.screen()));
        io::stdout().flush()?;
        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        let (cmd, rest) = input.split_once(' ').unwrap_or((input, ""));
        let rest = rest.trim();
        match cmd {
            "help" | "h" | "?" => print_help(locale),
            "quit" | "exit" => break,
            "lang" => match Language::from_code(rest) {
                Some(language) => {
                    if let Err(err) = save_language(store.as_ref(), language) {
                        warn!("language not saved: {err}");
                    }
                    locale = UiLocale(language);
                    filter.language = language;
                }
                None => println!("{}", locale.text("usage: lang en|tr", "kullanım: lang en|tr")),
            },
            "host" => {
                if rest.is_empty() {
                    println!("{}", locale.text("usage: host NAME", "kullanım: host İSİM"));
                    continue;
                }
                let pin = session.create_game(rest);
                println!("{}: {pin}", locale.text("game pin", "oyun PIN"));
            }
            "join" => {
                let (pin, name) = rest.split_once(' ').unwrap_or((rest, ""));
                if pin.len() != 4 || !pin.chars().all(|c| c.is_ascii_digit()) || name.trim().is_empty() {
                    println!("{}", locale.text("usage: join PIN NAME", "kullanım: join PIN İSİM"));
                } else if !session.join_game(pin, name) {
                    println!("{}", locale.text("game not found", "oyun bulunamadı"));
                }
            }
            "sync" => session.sync_game_state(),
            "solo" => session.set_screen(Screen::SinglePlayer),
            "setup" => session.set_screen(Screen::SetupSession),
            "add" => {
                if session.add_player(rest).is_none() {
                    println!("{}", locale.text("name cannot be empty", "isim boş olamaz"));
                }
            }
            "remove" => match player_id_at(&session, rest) {
                Some(id) => session.remove_player(&id),
                None => println!("{}", locale.text("no such player", "böyle bir oyuncu yok")),
            },
            "players" => print_players(locale, &session),
            "decks" => print_settings(locale, &session),
            "deck" => match DeckTag::from_key(rest) {
                Some(tag) => {
                    session.toggle_deck_tag(tag);
                    print_settings(locale, &session);
                }
                None => println!("{}", locale.text("unknown deck", "bilinmeyen deste")),
            },
            "min" | "max" => match rest.parse::<u8>().ok().and_then(Intensity::new) {
                Some(level) => {
                    if cmd == "min" {
                        session.set_min_intensity(level);
                    } else {
                        session.set_max_intensity(level);
                    }
                    print_settings(locale, &session);
                }
                None => println!("{}", locale.text("level must be 1-5", "seviye 1-5 olmalı")),
            },
            "start" => {
                session.start_session();
                print_candidates(locale, &session);
            }
            "cards" | "c" => print_candidates(locale, &session),
            "new" => {
                let cards = session.catalog().all_cards();
                session.pick_new_cards(&cards);
                print_candidates(locale, &session);
            }
            "pick" => {
                let id = candidate_id_at(&session, rest);
                session.select_card(id.as_deref());
                match session.selected_card() {
                    Some(card) => println!("> {}", card.text_in(locale.0)),
                    None => println!("{}", locale.text("no card selected", "kart seçilmedi")),
                }
            }
            "answer" => match player_id_at(&session, rest) {
                Some(id) if session.select_answering_player(&id) => {
                    if let Some(player) = session.answering_player() {
                        println!("{} {}", player.name, locale.text("answers", "cevaplıyor"));
                    }
                }
                _ => print_players(locale, &session),
            },
            "done" => {
                if session.mark_answered() {
                    print_candidates(locale, &session);
                } else {
                    println!("{}", locale.text("pick a card first", "önce bir kart seç"));
                }
            }
            "skip" => {
                session.skip_current_set();
                print_candidates(locale, &session);
            }
            "fav" | "rate" | "up" | "down" | "info" => {
                let (value, id) = match cmd {
                    "rate" => rest.split_once(' ').unwrap_or((rest, "")),
                    _ => ("", rest),
                };
                let Some(card) = resolve_card(&session, id.trim()) else {
                    println!("{}", locale.text("no such card", "böyle bir kart yok"));
                    continue;
                };
                card_feedback(locale, &mut session, cmd, value, &card);
            }
            "browse" => {
                filter.query = rest.to_string();
                print_browse(locale, &session, &filter);
            }
            "filter" => {
                update_filter(&mut filter, rest);
                print_browse(locale, &session, &filter);
            }
            "patterns" => match session.upvote_patterns() {
                Some(patterns) => println!("{patterns:#?}"),
                None => println!("{}", locale.text("no upvotes yet", "henüz beğeni yok")),
            },
            "close" => {
                session.begin_closing();
                print_closing(locale, &session);
            }
            "next" => {
                session.advance_closing();
                print_closing(locale, &session);
            }
            "finish" => session.finish_session(),
            "stats" => print_stats(locale, &session),
            "reset" => {
                session.votes().reset();
                session.catalog().reset_generated();
                println!("{}", locale.text("votes and generated cards cleared", "oylar ve üretilen kartlar silindi"));
            }
            _ => println!("{}: {cmd}", locale.text("unknown command", "bilinmeyen komut")),
        }
        report_events(locale, &session);
    }
    Ok(())
}

/// Resolves an explicit id, else the selected card.
fn resolve_card(session: &Session, id: &str) -> Option<Card> {
    if id.is_empty() {
        return session.selected_card().cloned();
    }
    candidate_id_at(session, id)
        .and_then(|id| session.catalog().find(&id))
        .or_else(|| session.catalog().find(id))
}

fn card_feedback(locale: UiLocale, session: &mut Session, cmd: &str, value: &str, card: &Card) {
    match cmd {
        "fav" => {
            let favorite = session.toggle_favorite(&card.id);
            println!("{} {}", card.id, if favorite { "★" } else { "☆" });
        }
        "rate" => {
            let accepted = value
                .parse::<u8>()
                .ok()
                .is_some_and(|rating| session.rate_card(&card.id, rating));
            if !accepted {
                println!("{}", locale.text("usage: rate 0-5 [N|ID]", "kullanım: rate 0-5 [N|ID]"));
            }
        }
        "up" | "down" => {
            let vote = if cmd == "up" { Vote::Up } else { Vote::Down };
            let requested = session.vote_card(&card.id, vote);
            if requested > 0 {
                println!(
                    "{}: {requested}",
                    locale.text("generating similar cards", "benzer kartlar üretiliyor")
                );
            }
        }
        _ => print_card_info(locale, session, card),
    }
}

fn candidate_id_at(session: &Session, value: &str) -> Option<String> {
    let index = value.parse::<usize>().ok()?;
    session
        .candidates()
        .get(index.checked_sub(1)?)
        .map(|card| card.id.clone())
}

fn player_id_at(session: &Session, value: &str) -> Option<String> {
    let index = value.parse::<usize>().ok()?;
    session
        .players()
        .get(index.checked_sub(1)?)
        .map(|player| player.id.clone())
}

fn screen_label(locale: UiLocale, screen: Screen) -> &'static str {
    match screen {
        Screen::Welcome => locale.text("welcome", "hoş geldin"),
        Screen::CreateGame => locale.text("create", "oluştur"),
        Screen::JoinGame => locale.text("join", "katıl"),
        Screen::SinglePlayer => locale.text("solo", "tek kişilik"),
        Screen::WaitingRoom => locale.text("lobby", "lobi"),
        Screen::SetupSession => locale.text("setup", "hazırlık"),
        Screen::InRound => locale.text("round", "tur"),
        Screen::AnswerPhase => locale.text("answer", "cevap"),
        Screen::ClosingGroup => locale.text("closing", "kapanış"),
        Screen::ClosingPersonal => locale.text("personal", "kişisel"),
        Screen::SessionSummary => locale.text("summary", "özet"),
    }
}

fn print_help(locale: UiLocale) {
    println!("{}", locale.text("Commands:", "Komutlar:"));
    let rows = [
        ("host NAME | join PIN NAME | sync", locale.text("shared game lobby", "ortak oyun lobisi")),
        ("add NAME | remove N | players", locale.text("manage players", "oyuncuları yönet")),
        ("decks | deck TAG | min N | max N", locale.text("session settings", "oturum ayarları")),
        ("start | cards | new | skip", locale.text("draw candidates", "aday kart çek")),
        ("pick N | answer N | done", locale.text("play a round", "bir tur oyna")),
        ("fav | rate 0-5 | up | down | info", locale.text("feedback on the selected card", "seçili karta geri bildirim")),
        ("browse [TEXT] | filter deck|level|clear X", locale.text("single-player browsing", "tek kişilik gezinme")),
        ("close | next | finish", locale.text("closing ritual", "kapanış ritüeli")),
        ("stats | patterns | reset | lang en|tr", locale.text("catalog tools", "katalog araçları")),
        ("quit", locale.text("exit", "çıkış")),
    ];
    for (usage, about) in rows {
        println!("  {usage:<44} {about}");
    }
}

fn print_players(locale: UiLocale, session: &Session) {
    if session.players().is_empty() {
        println!("{}", locale.text("no players yet", "henüz oyuncu yok"));
        return;
    }
    let eligible: Vec<&str> = session
        .eligible_players()
        .iter()
        .map(|player| player.id.as_str())
        .collect();
    for (idx, player) in session.players().iter().enumerate() {
        let marker = if eligible.contains(&player.id.as_str()) { "*" } else { " " };
        println!("{marker}{}. {}", idx + 1, player.name);
    }
}

fn print_settings(locale: UiLocale, session: &Session) {
    let settings = session.settings();
    let decks: Vec<&str> = settings.selected_deck_tags.iter().map(|tag| tag.key()).collect();
    println!(
        "{}: {} | {}: {}-{}",
        locale.text("decks", "desteler"),
        decks.join(", "),
        locale.text("intensity", "yoğunluk"),
        settings.min_intensity,
        settings.max_intensity
    );
}

fn print_candidates(locale: UiLocale, session: &Session) {
    if session.out_of_cards() {
        println!(
            "{}",
            locale.text(
                "no cards left for these settings; adjust decks or intensity",
                "bu ayarlar için kart kalmadı; desteleri veya yoğunluğu değiştir"
            )
        );
        return;
    }
    println!("{} {}", locale.text("Round", "Tur"), session.round());
    for (idx, card) in session.candidates().iter().enumerate() {
        println!("  {}. [{}] {}", idx + 1, card.intensity, card.text_in(locale.0));
    }
}

fn print_card_info(locale: UiLocale, session: &Session, card: &Card) {
    let votes = session.card_votes(&card.id);
    println!("{} [{}] {}", card.id, card.intensity, card.text_in(locale.0));
    println!(
        "  {}: +{} -{} | {}: {} | {}: {}",
        locale.text("votes", "oylar"),
        votes.up,
        votes.down,
        locale.text("rating", "puan"),
        session
            .card_rating(&card.id)
            .map_or_else(|| "-".to_string(), |r| r.to_string()),
        locale.text("average", "ortalama"),
        session
            .average_rating(&card.id)
            .map_or_else(|| "-".to_string(), |r| format!("{r:.1}"))
    );
    if session.is_favorite(&card.id) {
        println!("  ★");
    }
    if let Some(notes) = &card.notes {
        println!("  {notes}");
    }
}

fn update_filter(filter: &mut CardFilter, args: &str) {
    let (kind, value) = args.split_once(' ').unwrap_or((args, ""));
    match kind {
        "deck" => {
            if let Some(tag) = DeckTag::from_key(value) {
                filter.toggle_deck_tag(tag);
            }
        }
        "level" => {
            if let Some(level) = value.parse::<u8>().ok().and_then(Intensity::new) {
                filter.toggle_intensity(level);
            }
        }
        "clear" => {
            *filter = CardFilter {
                language: filter.language,
                ..CardFilter::default()
            };
        }
        other => debug!("unknown filter {other}"),
    }
}

fn print_browse(locale: UiLocale, session: &Session, filter: &CardFilter) {
    let cards = session.browse(filter);
    for card in &cards {
        let star = if session.is_favorite(&card.id) { "★" } else { " " };
        println!("{star} {:<10} [{}] {}", card.id, card.intensity, card.text_in(locale.0));
    }
    println!("{}: {}", locale.text("shown", "gösterilen"), cards.len());
}

fn print_closing(locale: UiLocale, session: &Session) {
    match session.closing_step() {
        ClosingStep::Summary => {
            println!(
                "{}: {} | {}: {}",
                locale.text("rounds played", "oynanan tur"),
                session.round().saturating_sub(1),
                locale.text("favorites", "favoriler"),
                session.state().favorites.len()
            );
            return;
        }
        ClosingStep::Personal(_) => {
            if let Some(player) = session.closing_player() {
                println!("{}:", player.name);
            }
        }
        ClosingStep::Group | ClosingStep::NotStarted => {}
    }
    match session.closing_card() {
        Some(card) => println!("  {}", card.text_in(locale.0)),
        None => println!("{}", locale.text("(no closing card)", "(kapanış kartı yok)")),
    }
}

fn print_stats(locale: UiLocale, session: &Session) {
    let summary = CatalogSummary::from_cards(&session.catalog().all_cards());
    println!(
        "{} {} | {}: {} | {}: {}",
        locale.text("card set", "kart seti"),
        summary.version,
        locale.text("cards", "kartlar"),
        summary.total,
        locale.text("generated", "üretilen"),
        session.catalog().generated_cards().len()
    );
    for (level, count) in &summary.by_intensity {
        println!("  {}{level}: {count}", locale.text("level ", "seviye "));
    }
    for (deck, count) in &summary.by_deck {
        println!("  {deck}: {count}");
    }
}

fn report_events(locale: UiLocale, session: &Session) {
    for event in session.drain_events() {
        match event {
            Event::CardGenerated { card_id, source_id } => {
                info!("generated {card_id} from {source_id}");
            }
            Event::GenerationFinished {
                generated,
                requested,
                ..
            } => println!(
                "{}: {generated}/{requested}",
                locale.text("new cards ready", "yeni kartlar hazır")
            ),
            other => debug!("{other:?}"),
        }
    }
}
