//! Change notification for edits made through a [`Drawing`](super::Drawing).
//!
//! Listeners run synchronously, in subscription order, after the change has
//! been applied.

use std::fmt;

/// A field value carried by a change event.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Flag.
    Bool(bool),
    /// Integer.
    Int(i64),
    /// Real number.
    Real(f64),
    /// Text (also used for enum codes and added/removed item names).
    Text(String),
    /// Nothing (before an add, after a remove).
    None,
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Real(v) => write!(f, "{v}"),
            Self::Text(v) => f.write_str(v),
            Self::None => f.write_str("-"),
        }
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Real(value)
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// A single applied change.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeEvent {
    /// What changed, e.g. `layer 16` or `library`.
    pub target: String,
    /// Field name.
    pub field: &'static str,
    /// Previous value.
    pub old: FieldValue,
    /// New value.
    pub new: FieldValue,
}

/// Handle returned by [`ChangeNotifier::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Box<dyn FnMut(&ChangeEvent)>;

/// Registry of change listeners.
#[derive(Default)]
pub struct ChangeNotifier {
    next_id: u64,
    listeners: Vec<(ListenerId, Listener)>,
}

impl ChangeNotifier {
    /// Creates a notifier with no listeners.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a listener.
    pub fn subscribe(&mut self, listener: impl FnMut(&ChangeEvent) + 'static) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Removes a listener. Returns false if the id was not registered.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() != before
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// True when nobody listens.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Delivers an event to every listener.
    pub fn emit(&mut self, event: &ChangeEvent) {
        tracing::trace!(
            target_item = %event.target,
            field = event.field,
            old = %event.old,
            new = %event.new,
            "Change"
        );
        for (_, listener) in &mut self.listeners {
            listener(event);
        }
    }

    /// Builds and delivers an event unless `old == new`.
    pub(crate) fn notify(
        &mut self,
        target: impl Into<String>,
        field: &'static str,
        old: FieldValue,
        new: FieldValue,
    ) {
        if old == new {
            return;
        }
        let event = ChangeEvent {
            target: target.into(),
            field,
            old,
            new,
        };
        self.emit(&event);
    }
}

impl fmt::Debug for ChangeNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeNotifier")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

// Listeners belong to one in-memory session and are not part of a drawing's
// value: clones start without listeners and comparisons ignore them.
impl Clone for ChangeNotifier {
    fn clone(&self) -> Self {
        Self::default()
    }
}

impl PartialEq for ChangeNotifier {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}
