use std::sync::Arc;

use parking_lot::{Mutex, ReentrantMutex};

use crate::{
    connections::{CompositeDisposable, Connectable, Consumer, Disposable},
    core::LoopBuilder,
    error::MisuseError,
    fatal::fatal,
    lane::Lane,
    update::{First, Initiate},
};

use super::{
    state::{ControllerPhase, ControllerState, Running},
    view::LaneView,
};

/// Start/stop wrapper around a loop factory.
///
/// The controller keeps a model to resume from while stopped. Every `start`
/// builds a fresh loop from it; every `stop` captures the loop's latest model
/// back. A view, if connected, receives models on the view lane and its
/// events are redirected onto the loop lane.
///
/// ### Notes
/// - All transitions are serialized by one reentrant lock. `is_running` and
///   `phase` never take it.
/// - Calling an operation in the wrong phase is misuse and goes to the
///   fatal hook.
/// - Dropping a running controller stops it.
pub struct Controller<M, E, F>
where
    M: Clone + Send + 'static,
    E: Send + 'static,
    F: Clone + Send + 'static,
{
    loops: LoopBuilder<M, E, F>,
    initiate: Option<Initiate<M, F>>,
    loop_lane: Arc<dyn Lane>,
    view_lane: Arc<dyn Lane>,

    transition: ReentrantMutex<()>,
    state: Mutex<ControllerState<M, E, F>>,
}

impl<M, E, F> Controller<M, E, F>
where
    M: Clone + Send + 'static,
    E: Send + 'static,
    F: Clone + Send + 'static,
{
    pub(super) fn new(
        loops: LoopBuilder<M, E, F>,
        model: M,
        initiate: Option<Initiate<M, F>>,
        loop_lane: Arc<dyn Lane>,
        view_lane: Arc<dyn Lane>,
    ) -> Self {
        Self {
            loops,
            initiate,
            loop_lane,
            view_lane,
            transition: ReentrantMutex::new(()),
            state: Mutex::new(ControllerState::Stopped { model, view: None }),
        }
    }

    /// Attaches a view. Only legal while stopped with no view attached.
    pub fn connect_view(&self, view: impl Connectable<M, E>) {
        let _transition = self.transition.lock();
        let mut state = self.state.lock();
        let misuse = match &mut *state {
            ControllerState::Stopped { view: slot @ None, .. } => {
                *slot = Some(Arc::new(view));
                None
            }
            ControllerState::Stopped { .. } => Some(MisuseError::ViewAlreadyConnected),
            _ => Some(MisuseError::ViewChangeWhileRunning {
                operation: "connected",
            }),
        };
        drop(state);
        match misuse {
            Some(err) => fatal(err),
            None => tracing::debug!(name = %self.name(), "view connected"),
        }
    }

    /// Detaches the view. Only legal while stopped with a view attached.
    pub fn disconnect_view(&self) {
        let _transition = self.transition.lock();
        let mut state = self.state.lock();
        let misuse = match &mut *state {
            ControllerState::Stopped { view: slot @ Some(_), .. } => {
                *slot = None;
                None
            }
            ControllerState::Stopped { .. } => Some(MisuseError::NoViewConnected),
            _ => Some(MisuseError::ViewChangeWhileRunning {
                operation: "disconnected",
            }),
        };
        drop(state);
        match misuse {
            Some(err) => fatal(err),
            None => tracing::debug!(name = %self.name(), "view disconnected"),
        }
    }

    /// Builds a fresh loop from the resume model and starts it.
    ///
    /// ### Notes
    /// - The initiate function, if any, runs on the resume model first.
    /// - View events are dispatched on the loop lane; once the loop is
    ///   disposed they are dropped.
    /// - A view or event source may emit while the controller is still
    ///   transitioning to running; those events reach the new loop.
    pub fn start(&self) {
        let _transition = self.transition.lock();
        let (model, view) = {
            let mut state = self.state.lock();
            match std::mem::replace(&mut *state, ControllerState::TransitioningToRunning) {
                ControllerState::Stopped { model, view } => (model, view),
                other => {
                    *state = other;
                    drop(state);
                    fatal(MisuseError::AlreadyRunning);
                }
            }
        };

        let first = match &self.initiate {
            Some(initiate) => initiate.call(model),
            None => First::new(model),
        };
        let lp = self.loops.start_from(first);

        let bindings = CompositeDisposable::new(Vec::new());
        if let Some(view) = &view {
            let dispatch = lp.unguarded_dispatcher();
            let lane = Arc::clone(&self.loop_lane);
            let redirect: Consumer<E> = Arc::new(move |event: E| {
                let dispatch = Arc::clone(&dispatch);
                lane.execute(Box::new(move || dispatch(event)));
            });

            let binding =
                LaneView::new(Arc::clone(view), Arc::clone(&self.view_lane)).attach(redirect);
            bindings.push(Box::new(lp.add_observer(binding.deliver)));
            bindings.push(Box::new(binding.connection));
        }

        *self.state.lock() = ControllerState::Running(Running { lp, view, bindings });
        tracing::debug!(
            name = %self.name(),
            loop_lane = self.loop_lane.name(),
            view_lane = self.view_lane.name(),
            "controller started"
        );
    }

    /// Stops the loop and keeps its latest model for the next start.
    ///
    /// Does not wait for a model delivery already running on the view lane;
    /// such a delivery may finish after `stop` returns, later ones are dropped.
    pub fn stop(&self) {
        let _transition = self.transition.lock();
        let running = {
            let mut state = self.state.lock();
            match std::mem::replace(&mut *state, ControllerState::TransitioningToStopped) {
                ControllerState::Running(running) => running,
                other => {
                    *state = other;
                    drop(state);
                    fatal(MisuseError::NotRunning);
                }
            }
        };

        let Running { lp, view, bindings } = running;
        let model = lp.latest_model();
        bindings.dispose();
        lp.dispose();
        drop(lp);

        *self.state.lock() = ControllerState::Stopped { model, view };
        tracing::debug!(name = %self.name(), "controller stopped");
    }

    /// Overwrites the model to resume from. Only legal while stopped.
    pub fn replace_model(&self, model: M) {
        let _transition = self.transition.lock();
        let mut state = self.state.lock();
        if let ControllerState::Stopped { model: current, .. } = &mut *state {
            *current = model;
            return;
        }
        drop(state);
        fatal(MisuseError::ReplaceModelWhileRunning);
    }

    /// The resume model when stopped, the live model when running.
    ///
    /// Reading from inside a transition (an initiate function or a view
    /// calling back) is misuse.
    pub fn model(&self) -> M {
        let _transition = self.transition.lock();
        let state = self.state.lock();
        match &*state {
            ControllerState::Stopped { model, .. } => model.clone(),
            ControllerState::Running(running) => running.lp.latest_model(),
            _ => {
                drop(state);
                fatal(MisuseError::ModelReadWhileTransitioning);
            }
        }
    }

    /// True while running or stopping. Never waits for a transition.
    pub fn is_running(&self) -> bool {
        self.phase().is_running()
    }

    pub fn phase(&self) -> ControllerPhase {
        self.state.lock().phase()
    }

    fn name(&self) -> &str {
        &self.loops.config().name
    }
}

impl<M, E, F> Drop for Controller<M, E, F>
where
    M: Clone + Send + 'static,
    E: Send + 'static,
    F: Clone + Send + 'static,
{
    fn drop(&mut self) {
        if self.phase() == ControllerPhase::Running {
            self.stop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connections::{AnonymousDisposable, ConnectableFn, Connection, EventSourceFn};
    use crate::core::Loop;
    use crate::fatal::catch_misuse;
    use crate::lane::SerialLane;
    use crate::update::Next;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{OnceLock, Weak};
    use std::time::Duration;

    type ControllerSlot = Arc<OnceLock<Weak<Controller<i32, i32, ()>>>>;

    type Slot = Arc<Mutex<Option<Consumer<i32>>>>;

    fn test_view() -> (Arc<Mutex<Vec<i32>>>, Slot, ConnectableFn<i32, i32>) {
        let models = Arc::new(Mutex::new(Vec::new()));
        let output: Slot = Arc::new(Mutex::new(None));
        let (m, o) = (models.clone(), output.clone());
        let view = ConnectableFn::new(move |out: Consumer<i32>| {
            *o.lock() = Some(out);
            let m = m.clone();
            Connection::accepting(move |model| m.lock().push(model))
        });
        (models, output, view)
    }

    fn emit(output: &Slot, event: i32) {
        let out = output.lock().clone().expect("view connected");
        out(event);
    }

    fn adder() -> LoopBuilder<i32, i32, ()> {
        Loop::builder(|m: &i32, e: i32| Next::next(m + e))
    }

    #[test]
    fn test_restart_resumes_from_last_model() {
        let (models, output, view) = test_view();
        let c = adder().controller(0).build();
        c.connect_view(view);

        c.start();
        emit(&output, 1);
        emit(&output, 2);
        assert_eq!(c.model(), 3);
        c.stop();

        assert_eq!(c.phase(), ControllerPhase::Stopped);
        assert_eq!(c.model(), 3);

        c.start();
        assert_eq!(*models.lock(), vec![0, 1, 3, 3]);
        c.stop();
    }

    #[test]
    fn test_phases_and_is_running() {
        let c = adder().controller(0).build();
        assert_eq!(c.phase(), ControllerPhase::Stopped);
        assert!(!c.is_running());

        c.start();
        assert_eq!(c.phase(), ControllerPhase::Running);
        assert!(c.is_running());

        c.stop();
        assert!(!c.is_running());
        assert!(ControllerPhase::TransitioningToStopped.is_running());
        assert!(!ControllerPhase::TransitioningToRunning.is_running());
    }

    #[test]
    fn test_wrong_phase_calls_are_misuse() {
        let c = adder().controller(0).build();
        assert_eq!(catch_misuse(|| c.stop()), Err(MisuseError::NotRunning));
        assert_eq!(catch_misuse(|| c.disconnect_view()), Err(MisuseError::NoViewConnected));

        let (_m, _o, view) = test_view();
        c.connect_view(view);
        let (_m2, _o2, second) = test_view();
        assert_eq!(
            catch_misuse(|| c.connect_view(second)),
            Err(MisuseError::ViewAlreadyConnected)
        );

        c.start();
        assert_eq!(catch_misuse(|| c.start()), Err(MisuseError::AlreadyRunning));
        assert_eq!(
            catch_misuse(|| c.replace_model(7)),
            Err(MisuseError::ReplaceModelWhileRunning)
        );
        assert_eq!(
            catch_misuse(|| c.disconnect_view()),
            Err(MisuseError::ViewChangeWhileRunning {
                operation: "disconnected"
            })
        );
        let (_m3, _o3, third) = test_view();
        assert_eq!(
            catch_misuse(|| c.connect_view(third)),
            Err(MisuseError::ViewChangeWhileRunning {
                operation: "connected"
            })
        );

        // failed calls leave the phase untouched
        assert_eq!(c.phase(), ControllerPhase::Running);
        c.stop();
        c.disconnect_view();
        assert_eq!(c.phase(), ControllerPhase::Stopped);
    }

    #[test]
    fn test_model_read_inside_transition_is_misuse() {
        let reads = Arc::new(Mutex::new(Vec::new()));
        let slot: Arc<OnceLock<Weak<Controller<i32, i32, ()>>>> = Arc::new(OnceLock::new());

        let (r, s) = (reads.clone(), slot.clone());
        let view = ConnectableFn::handling(move |_m: i32, _out: &Consumer<i32>| {
            if let Some(c) = s.get().and_then(Weak::upgrade) {
                let phase = c.phase();
                r.lock().push((phase, catch_misuse(|| c.model())));
            }
        });

        let c = Arc::new(adder().controller(4).build());
        let _ = slot.set(Arc::downgrade(&c));
        c.connect_view(view);
        c.start();
        c.stop();

        assert_eq!(
            *reads.lock(),
            vec![(
                ControllerPhase::TransitioningToRunning,
                Err(MisuseError::ModelReadWhileTransitioning)
            )]
        );
    }

    #[test]
    fn test_replace_model_and_initiate() {
        let effects = Arc::new(Mutex::new(Vec::new()));
        let e = effects.clone();
        let c = Loop::builder(|m: &i32, ev: i32| Next::<i32, &'static str>::next(m + ev))
            .with_effect_handler(ConnectableFn::handling(move |f: &'static str, _out: &Consumer<i32>| {
                e.lock().push(f);
            }))
            .controller(1)
            .with_initiate(|m| First::with_effects(m * 10, ["loaded"]))
            .build();

        c.replace_model(5);
        assert_eq!(c.model(), 5);
        c.start();
        assert_eq!(c.model(), 50);
        assert_eq!(*effects.lock(), vec!["loaded"]);
        c.stop();
    }

    #[test]
    fn test_view_events_after_stop_are_dropped() {
        let (models, output, view) = test_view();
        let c = adder().controller(0).build();
        c.connect_view(view);
        c.start();
        c.stop();

        emit(&output, 100);
        assert_eq!(c.model(), 0);
        assert_eq!(*models.lock(), vec![0]);
    }

    #[test]
    fn test_drop_stops_running_controller() {
        let teardowns = Arc::new(AtomicUsize::new(0));
        let t = teardowns.clone();
        let c = adder()
            .with_effect_handler(ConnectableFn::new(move |_out: Consumer<i32>| {
                let t = t.clone();
                Connection::new(|_: ()| {}, move || {
                    t.fetch_add(1, Ordering::SeqCst);
                })
            }))
            .controller(0)
            .build();
        c.start();
        drop(c);
        assert_eq!(teardowns.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_serial_lanes_deliver_asynchronously() {
        let loop_lane = SerialLane::spawn("loop");
        let view_lane = SerialLane::spawn("view");
        let (models, output, view) = test_view();

        let c = adder()
            .controller(0)
            .with_loop_lane(loop_lane.clone())
            .with_view_lane(view_lane.clone())
            .build();
        c.connect_view(view);
        c.start();

        emit(&output, 2);
        emit(&output, 3);
        loop_lane.flush().await;
        view_lane.flush().await;

        assert_eq!(c.model(), 5);
        assert_eq!(*models.lock(), vec![0, 2, 5]);

        c.stop();
        loop_lane.shutdown();
        view_lane.shutdown();
    }

    #[test]
    fn test_view_emitting_on_connect_reaches_new_loop() {
        let slot: ControllerSlot = Arc::new(OnceLock::new());
        let phases = Arc::new(Mutex::new(Vec::new()));
        let models = Arc::new(Mutex::new(Vec::new()));

        let (s, p, m) = (slot.clone(), phases.clone(), models.clone());
        let view = ConnectableFn::new(move |out: Consumer<i32>| {
            if let Some(c) = s.get().and_then(Weak::upgrade) {
                p.lock().push(c.phase());
            }
            out(5);
            let m = m.clone();
            Connection::accepting(move |model| m.lock().push(model))
        });

        let c = Arc::new(adder().controller(1).build());
        let _ = slot.set(Arc::downgrade(&c));
        c.connect_view(view);
        c.start();

        assert_eq!(*phases.lock(), vec![ControllerPhase::TransitioningToRunning]);
        assert_eq!(c.model(), 6);
        assert_eq!(*models.lock(), vec![6]);
        c.stop();
    }

    #[test]
    fn test_source_emitting_on_subscribe_reaches_new_loop() {
        let (models, _output, view) = test_view();
        let c = adder()
            .with_event_source(EventSourceFn::new(|consumer: Consumer<i32>| {
                consumer(2);
                consumer(3);
                Box::new(AnonymousDisposable::noop()) as Box<dyn Disposable>
            }))
            .controller(10)
            .build();
        c.connect_view(view);

        c.start();
        assert_eq!(c.model(), 15);
        assert_eq!(*models.lock(), vec![15]);
        c.stop();

        // every start subscribes again
        c.start();
        assert_eq!(c.model(), 20);
        assert_eq!(*models.lock(), vec![15, 20]);
        c.stop();
    }

    #[tokio::test]
    async fn test_default_view_lane_defers_delivery_inside_runtime() {
        let (models, output, view) = test_view();
        let c = adder().controller(0).build();
        c.connect_view(view);
        c.start();

        emit(&output, 4);
        assert_eq!(c.model(), 4);
        assert!(models.lock().is_empty());

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(*models.lock(), vec![0, 4]);
        c.stop();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_stop_does_not_wait_for_view_reading_model() {
        let slot: ControllerSlot = Arc::new(OnceLock::new());
        let (entered_tx, entered_rx) = tokio::sync::oneshot::channel::<()>();
        let entered_tx = Mutex::new(Some(entered_tx));
        let reads = Arc::new(Mutex::new(Vec::new()));

        let (s, r) = (slot.clone(), reads.clone());
        let view = ConnectableFn::handling(move |_m: i32, _out: &Consumer<i32>| {
            if let Some(tx) = entered_tx.lock().take() {
                let _ = tx.send(());
            }
            std::thread::sleep(Duration::from_millis(100));
            if let Some(c) = s.get().and_then(Weak::upgrade) {
                r.lock().push(c.model());
            }
        });

        let view_lane = SerialLane::spawn("view");
        let c = Arc::new(adder().controller(7).with_view_lane(view_lane.clone()).build());
        let _ = slot.set(Arc::downgrade(&c));
        c.connect_view(view);
        c.start();
        entered_rx.await.expect("view received the first model");

        let stopper = Arc::clone(&c);
        let stopped = tokio::time::timeout(
            Duration::from_secs(5),
            tokio::task::spawn_blocking(move || stopper.stop()),
        )
        .await;
        assert!(matches!(stopped, Ok(Ok(()))), "stop blocked on the view");

        view_lane.flush().await;
        assert_eq!(*reads.lock(), vec![7]);
        assert_eq!(c.phase(), ControllerPhase::Stopped);
        view_lane.shutdown();
    }
}
