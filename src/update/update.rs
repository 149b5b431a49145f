//! # Update and initiate functions as composable values.
//!
//! [`Update`] wraps `Fn(&M, E) -> Next<M, F>`; [`Initiate`] wraps
//! `Fn(M) -> First<M, F>`. Both are cheap to clone (`Arc` inside) and are
//! decorated by value: a decorator takes the function and returns a new one.
//!
//! ## Decorator chain
//! ```text
//! Update::new(f)
//!     .logged(logger)          will_update → f → did_update
//!     .inspect(hook)           f → hook(&model, &next)
//!     .decorate(wrap)          wrap(f)
//! ```
//! The last decorator applied is the outermost wrapper.

use std::sync::Arc;

use crate::logging::LoopLogger;
use crate::update::next::{First, Next};

type UpdateFn<M, E, F> = dyn Fn(&M, E) -> Next<M, F> + Send + Sync;
type InitiateFn<M, F> = dyn Fn(M) -> First<M, F> + Send + Sync;

/// Pure transition function of a loop.
pub struct Update<M, E, F> {
    f: Arc<UpdateFn<M, E, F>>,
}

impl<M, E, F> Clone for Update<M, E, F> {
    fn clone(&self) -> Self {
        Self { f: Arc::clone(&self.f) }
    }
}

impl<M, E, F> Update<M, E, F>
where
    M: 'static,
    E: 'static,
    F: 'static,
{
    /// Wraps a transition function.
    pub fn new(f: impl Fn(&M, E) -> Next<M, F> + Send + Sync + 'static) -> Self {
        Self { f: Arc::new(f) }
    }

    /// Applies the function.
    #[inline]
    pub fn call(&self, model: &M, event: E) -> Next<M, F> {
        (self.f)(model, event)
    }

    /// Applies an arbitrary `Update -> Update` transform.
    pub fn decorate(self, decorator: impl FnOnce(Self) -> Self) -> Self {
        decorator(self)
    }

    /// Reports every call to `logger`.
    pub fn logged(self, logger: Arc<dyn LoopLogger<M, E, F>>) -> Self
    where
        E: Clone,
    {
        let inner = self;
        Self::new(move |model: &M, event: E| {
            logger.will_update(model, &event);
            let next = inner.call(model, event.clone());
            logger.did_update(model, &event, &next);
            next
        })
    }

    /// Calls `hook` with the previous model and the outcome of every update.
    pub fn inspect(self, hook: impl Fn(&M, &Next<M, F>) + Send + Sync + 'static) -> Self {
        let inner = self;
        Self::new(move |model: &M, event: E| {
            let next = inner.call(model, event);
            hook(model, &next);
            next
        })
    }
}

/// Produces the starting point of a loop from a resume model.
pub struct Initiate<M, F> {
    f: Arc<InitiateFn<M, F>>,
}

impl<M, F> Clone for Initiate<M, F> {
    fn clone(&self) -> Self {
        Self { f: Arc::clone(&self.f) }
    }
}

impl<M, F> Initiate<M, F>
where
    M: 'static,
    F: 'static,
{
    pub fn new(f: impl Fn(M) -> First<M, F> + Send + Sync + 'static) -> Self {
        Self { f: Arc::new(f) }
    }

    /// Initiate that keeps the model and requests no effects.
    pub fn identity() -> Self {
        Self::new(First::new)
    }

    #[inline]
    pub fn call(&self, model: M) -> First<M, F> {
        (self.f)(model)
    }

    /// Reports every call to `logger`.
    pub fn logged<E>(self, logger: Arc<dyn LoopLogger<M, E, F>>) -> Self
    where
        M: Clone,
        E: 'static,
    {
        let inner = self;
        Self::new(move |model: M| {
            logger.will_initiate(&model);
            let first = inner.call(model.clone());
            logger.did_initiate(&model, &first);
            first
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct Recorder {
        lines: Mutex<Vec<String>>,
    }

    impl LoopLogger<i32, i32, &'static str> for Recorder {
        fn will_initiate(&self, model: &i32) {
            self.lines.lock().push(format!("will_initiate {model}"));
        }

        fn did_initiate(&self, _model: &i32, first: &First<i32, &'static str>) {
            self.lines.lock().push(format!("did_initiate {}", first.model()));
        }

        fn will_update(&self, model: &i32, event: &i32) {
            self.lines.lock().push(format!("will_update {model} {event}"));
        }

        fn did_update(&self, _model: &i32, _event: &i32, next: &Next<i32, &'static str>) {
            self.lines.lock().push(format!("did_update {:?}", next.model()));
        }
    }

    #[test]
    fn test_logged_update_wraps_call() {
        let rec = Arc::new(Recorder::default());
        let update = Update::new(|m: &i32, e: i32| Next::<i32, &'static str>::next(m + e))
            .logged(rec.clone());

        let next = update.call(&2, 3);
        assert_eq!(next.model(), Some(&5));
        assert_eq!(
            *rec.lines.lock(),
            vec!["will_update 2 3".to_string(), "did_update Some(5)".to_string()]
        );
    }

    #[test]
    fn test_logged_initiate_wraps_call() {
        let rec = Arc::new(Recorder::default());
        let initiate = Initiate::new(|m: i32| First::with_effects(m * 10, ["boot"]))
            .logged::<i32>(rec.clone());

        let first = initiate.call(4);
        assert_eq!(first.into_parts(), (40, vec!["boot"]));
        assert_eq!(
            *rec.lines.lock(),
            vec!["will_initiate 4".to_string(), "did_initiate 40".to_string()]
        );
    }

    #[test]
    fn test_decorators_compose_outside_in() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let o1 = order.clone();
        let o2 = order.clone();
        let update = Update::new(|m: &i32, e: i32| Next::<i32, ()>::next(m + e))
            .inspect(move |_, _| o1.lock().push("inner"))
            .inspect(move |_, _| o2.lock().push("outer"));

        update.call(&0, 1);
        assert_eq!(*order.lock(), vec!["inner", "outer"]);
    }

    #[test]
    fn test_decorate_applies_custom_wrapper() {
        let clamp = |inner: Update<i32, i32, ()>| {
            Update::new(move |m: &i32, e: i32| match inner.call(m, e).into_parts() {
                (Some(model), effects) => Next::next_with(model.min(10), effects),
                (None, effects) => Next::dispatch(effects),
            })
        };
        let update = Update::new(|m: &i32, e: i32| Next::<i32, ()>::next(m + e)).decorate(clamp);

        assert_eq!(update.call(&4, 3).model(), Some(&7));
        assert_eq!(update.call(&8, 5).model(), Some(&10));
    }

    #[test]
    fn test_identity_initiate_keeps_model() {
        let first = Initiate::<u8, ()>::identity().call(7);
        assert_eq!(first.model(), &7);
        assert!(first.effects().is_empty());
    }
}
