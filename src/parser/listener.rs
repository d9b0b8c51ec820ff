//! Listener traits and word routing
//!
//! Word listeners receive every text fragment they are routed, synchronously and in the order
//! they started listening. Path listeners are bound to a registered path; on a begin or end
//! event they get a [`WordRoute`] through which they start or stop receiving words. Errors
//! returned by a listener are not caught: they abort the parse.

use std::fmt;

use crate::context::{ListenerId, MatchEvent, MatchEventKind};
use crate::error::ListenerError;

pub trait WordListener {
    fn on_word(&mut self, word: &str) -> Result<(), ListenerError>;
}

impl<F> WordListener for F
where
    F: FnMut(&str) -> Result<(), ListenerError>,
{
    fn on_word(&mut self, word: &str) -> Result<(), ListenerError> {
        self(word)
    }
}

/// Receives the begin/end transitions of the path it was registered with
pub trait PathListener: WordListener {
    fn on_begin(&mut self, words: &mut WordRoute<'_>) -> Result<(), ListenerError>;
    fn on_end(&mut self, words: &mut WordRoute<'_>) -> Result<(), ListenerError>;
}

/// Word subscription handle for the listener handling the current event
pub struct WordRoute<'a> {
    routing: &'a mut Vec<ListenerId>,
    listener: ListenerId,
}

impl WordRoute<'_> {
    pub fn listener(&self) -> ListenerId {
        self.listener
    }

    /// Start receiving words, after every listener already receiving them
    pub fn listen(&mut self) {
        if !self.is_listening() {
            self.routing.push(self.listener);
        }
    }

    pub fn stop(&mut self) {
        let listener = self.listener;
        self.routing.retain(|id| *id != listener);
    }

    pub fn is_listening(&self) -> bool {
        self.routing.contains(&self.listener)
    }
}

enum ListenerSlot {
    Word(Box<dyn WordListener>),
    Path(Box<dyn PathListener>),
}

impl ListenerSlot {
    fn on_word(&mut self, word: &str) -> Result<(), ListenerError> {
        match self {
            ListenerSlot::Word(listener) => listener.on_word(word),
            ListenerSlot::Path(listener) => listener.on_word(word),
        }
    }
}

/// Every listener attached to a parser, plus the ordered set currently receiving words
#[derive(Default)]
pub struct Listeners {
    slots: Vec<(ListenerId, ListenerSlot)>,
    routing: Vec<ListenerId>,
    next_id: u32,
}

impl Listeners {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate(&mut self) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Attach a listener that receives every word from now on
    pub fn add_word(&mut self, listener: Box<dyn WordListener>) -> ListenerId {
        let id = self.allocate();
        self.slots.push((id, ListenerSlot::Word(listener)));
        self.routing.push(id);
        id
    }

    /// Attach a path listener; it receives words only once it asks for them
    pub fn add_path(&mut self, listener: Box<dyn PathListener>) -> ListenerId {
        let id = self.allocate();
        self.slots.push((id, ListenerSlot::Path(listener)));
        id
    }

    pub fn remove_word(&mut self, id: ListenerId) -> Option<Box<dyn WordListener>> {
        match self.remove(id, |slot| matches!(slot, ListenerSlot::Word(_)))? {
            ListenerSlot::Word(listener) => Some(listener),
            ListenerSlot::Path(_) => None,
        }
    }

    pub fn remove_path(&mut self, id: ListenerId) -> Option<Box<dyn PathListener>> {
        match self.remove(id, |slot| matches!(slot, ListenerSlot::Path(_)))? {
            ListenerSlot::Path(listener) => Some(listener),
            ListenerSlot::Word(_) => None,
        }
    }

    fn remove(
        &mut self,
        id: ListenerId,
        kind: impl Fn(&ListenerSlot) -> bool,
    ) -> Option<ListenerSlot> {
        let index = self
            .slots
            .iter()
            .position(|(slot_id, slot)| *slot_id == id && kind(slot))?;
        self.routing.retain(|routed| *routed != id);
        Some(self.slots.remove(index).1)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn is_listening(&self, id: ListenerId) -> bool {
        self.routing.contains(&id)
    }

    /// Stop routing words to path listeners; plain word listeners keep listening
    pub fn reset_routes(&mut self) {
        let slots = &self.slots;
        self.routing.retain(|id| {
            slots
                .iter()
                .any(|(slot_id, slot)| slot_id == id && matches!(slot, ListenerSlot::Word(_)))
        });
    }

    pub fn dispatch(&mut self, event: MatchEvent) -> Result<(), ListenerError> {
        let Some((_, ListenerSlot::Path(listener))) = self
            .slots
            .iter_mut()
            .find(|(id, _)| *id == event.listener)
        else {
            return Ok(());
        };
        let mut route = WordRoute {
            routing: &mut self.routing,
            listener: event.listener,
        };
        match event.kind {
            MatchEventKind::Begin => listener.on_begin(&mut route),
            MatchEventKind::End => listener.on_end(&mut route),
        }
    }

    pub fn deliver(&mut self, word: &str) -> Result<(), ListenerError> {
        for id in &self.routing {
            if let Some((_, slot)) = self.slots.iter_mut().find(|(slot_id, _)| slot_id == id) {
                slot.on_word(word)?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Listeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("slots", &self.slots.iter().map(|(id, _)| *id).collect::<Vec<_>>())
            .field("routing", &self.routing)
            .finish()
    }
}
