use crate::{Language, Screen, Vote};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, PoisonError};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Event {
    ScreenChanged {
        from: Screen,
        to: Screen,
    },
    CandidatesDrawn {
        round: u32,
        card_ids: Vec<String>,
    },
    CardAnswered {
        card_id: String,
        round: u32,
    },
    SetSkipped {
        card_ids: Vec<String>,
    },
    CardVoted {
        card_id: String,
        vote: Vote,
    },
    CardGenerated {
        card_id: String,
        source_id: String,
    },
    GenerationFinished {
        source_id: String,
        generated: usize,
        requested: usize,
    },
    TranslationPatched {
        card_id: String,
        language: Language,
    },
}

/// Notification queue shared between the session and background generation tasks.
#[derive(Debug, Default, Clone)]
pub struct EventBus {
    queue: Arc<Mutex<Vec<Event>>>,
}

impl EventBus {
    pub fn push(&self, event: Event) {
        self.queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }

    pub fn drain(&self) -> Vec<Event> {
        std::mem::take(&mut *self.queue.lock().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn len(&self) -> usize {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
