//! Core game logic for the conversation deck. Keep this crate free of file and
//! network IO; storage and translation come in through traits.

pub mod cards;
pub mod catalog;
pub mod config;
pub mod events;
pub mod generator;
pub mod ledger;
pub mod rng;
pub mod selection;
pub mod session;
pub mod settings;
pub mod similarity;
pub mod spawn;
pub mod state;
pub mod store;
pub mod translate;

pub use cards::*;
pub use catalog::*;
pub use config::*;
pub use events::*;
pub use generator::*;
pub use ledger::*;
pub use rng::*;
pub use selection::*;
pub use session::*;
pub use settings::*;
pub use spawn::*;
pub use state::*;
pub use store::{KeyValueStore, MemoryStore, SharedStore, StoreError};
pub use translate::*;
