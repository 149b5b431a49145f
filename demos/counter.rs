//! # Example: Counter loop
//!
//! A counter whose `Save` effect runs as a tokio task and reports back with a
//! `Saved` event.
//!
//! Run with: `cargo run --example counter`

use std::{sync::Arc, time::Duration};

use tokio_util::sync::CancellationToken;

use statevisor::{Consumer, EffectFn, Loop, LoopConfig, Next, SpawnedEffectHandler};

#[derive(Clone, Debug)]
enum Event {
    Increment,
    Decrement,
    Saved(i64),
}

#[derive(Clone, Debug)]
enum Effect {
    Save(i64),
}

#[derive(Clone, Debug, Default)]
struct Model {
    count: i64,
    saved: Option<i64>,
}

fn update(model: &Model, event: Event) -> Next<Model, Effect> {
    match event {
        Event::Increment | Event::Decrement => {
            let step = if matches!(event, Event::Increment) { 1 } else { -1 };
            let count = model.count + step;
            Next::next_with(Model { count, ..model.clone() }, [Effect::Save(count)])
        }
        Event::Saved(value) => Next::next(Model {
            saved: Some(value),
            ..model.clone()
        }),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let store = EffectFn::new(
        |effect: Effect, emit: Consumer<Event>, _ctx: CancellationToken| async move {
            let Effect::Save(value) = effect;
            tokio::time::sleep(Duration::from_millis(50)).await;
            println!("[store] saved {value}");
            emit(Event::Saved(value));
        },
    );

    let lp = Loop::builder(update)
        .with_effect_handler(SpawnedEffectHandler::new(store))
        .with_config(LoopConfig::fifo().named("counter"))
        .start(Model::default());

    let _view = lp.add_observer(Arc::new(|model: Model| println!("[view] {model:?}")));

    lp.dispatch_event(Event::Increment);
    lp.dispatch_event(Event::Increment);
    lp.dispatch_event(Event::Decrement);

    // Let the saves finish
    tokio::time::sleep(Duration::from_millis(200)).await;

    println!("[main] final model: {:?}", lp.latest_model());
    lp.dispose();
}
