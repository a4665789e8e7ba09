use core::fmt;

use crate::types::Coord2;

/// Which transition a cell went through.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ChangeKind {
    Revealed,
    Flagged,
    Unflagged,
    Exploded,
}

/// One state change of one cell, delivered to every registered observer so a
/// presentation layer can re-render without the model depending on it.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CellChange {
    pub coords: Coord2,
    pub kind: ChangeKind,
}

pub type ChangeListener = Box<dyn FnMut(CellChange)>;

/// Registry of change listeners. Deliberately not serialized: a restored
/// board starts with no observers and callers re-subscribe.
#[derive(Default)]
pub struct ChangeHub {
    listeners: Vec<ChangeListener>,
}

impl ChangeHub {
    pub fn subscribe(&mut self, listener: impl FnMut(CellChange) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub(crate) fn emit(&mut self, change: CellChange) {
        for listener in &mut self.listeners {
            listener(change);
        }
    }
}

impl fmt::Debug for ChangeHub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeHub")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
