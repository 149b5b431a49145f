//! # Update outcomes: [`Next`] and [`First`].
//!
//! [`Next`] is what one update call produces: an optional new model plus
//! zero or more effects. [`First`] seeds a loop: a required model plus the
//! effects to run at startup.
//!
//! ## Rules
//! - `Next::model() == None` means **no model change**; nothing is broadcast.
//!   It is distinct from a model value that happens to be `None` itself
//!   (`Next::next(None::<T>)` does change the model of an `Option<T>` loop).
//! - Effects of one `Next` carry no ordering relative to each other.

/// Result of applying the update function to one event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Next<M, F> {
    model: Option<M>,
    effects: Vec<F>,
}

impl<M, F> Next<M, F> {
    /// Replace the model, no effects.
    #[inline]
    pub fn next(model: M) -> Self {
        Self {
            model: Some(model),
            effects: Vec::new(),
        }
    }

    /// Replace the model and request effects.
    #[inline]
    pub fn next_with(model: M, effects: impl IntoIterator<Item = F>) -> Self {
        Self {
            model: Some(model),
            effects: effects.into_iter().collect(),
        }
    }

    /// Keep the model, request effects.
    #[inline]
    pub fn dispatch(effects: impl IntoIterator<Item = F>) -> Self {
        Self {
            model: None,
            effects: effects.into_iter().collect(),
        }
    }

    /// Keep the model, no effects.
    #[inline]
    pub fn no_change() -> Self {
        Self {
            model: None,
            effects: Vec::new(),
        }
    }

    /// The new model, if the update produced one.
    pub fn model(&self) -> Option<&M> {
        self.model.as_ref()
    }

    pub fn effects(&self) -> &[F] {
        &self.effects
    }

    pub fn has_model(&self) -> bool {
        self.model.is_some()
    }

    pub fn has_effects(&self) -> bool {
        !self.effects.is_empty()
    }

    /// Splits into `(model, effects)`.
    pub fn into_parts(self) -> (Option<M>, Vec<F>) {
        (self.model, self.effects)
    }
}

impl<M, F> Default for Next<M, F> {
    fn default() -> Self {
        Self::no_change()
    }
}

/// Starting point of a loop.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct First<M, F> {
    model: M,
    effects: Vec<F>,
}

impl<M, F> First<M, F> {
    /// Starts from `model` without effects.
    #[inline]
    pub fn new(model: M) -> Self {
        Self {
            model,
            effects: Vec::new(),
        }
    }

    /// Starts from `model` and runs `effects` once the loop is wired.
    #[inline]
    pub fn with_effects(model: M, effects: impl IntoIterator<Item = F>) -> Self {
        Self {
            model,
            effects: effects.into_iter().collect(),
        }
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn effects(&self) -> &[F] {
        &self.effects
    }

    pub fn into_parts(self) -> (M, Vec<F>) {
        (self.model, self.effects)
    }
}

impl<M, F> From<First<M, F>> for Next<M, F> {
    fn from(first: First<M, F>) -> Self {
        Next::next_with(first.model, first.effects)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_model_differs_from_none_model() {
        let keep: Next<Option<u8>, ()> = Next::no_change();
        let clear: Next<Option<u8>, ()> = Next::next(None);

        assert!(!keep.has_model());
        assert!(!keep.has_effects());
        assert!(clear.has_model());
        assert_eq!(clear.model(), Some(&None));
    }

    #[test]
    fn test_dispatch_keeps_model_and_carries_effects() {
        let next: Next<u8, &str> = Next::dispatch(["save", "log"]);
        assert!(!next.has_model());
        assert!(next.has_effects());
        assert_eq!(next.effects(), &["save", "log"]);
    }

    #[test]
    fn test_first_converts_into_next() {
        let next: Next<u8, &str> = First::with_effects(3, ["boot"]).into();
        assert_eq!(next.into_parts(), (Some(3), vec!["boot"]));
    }
}
