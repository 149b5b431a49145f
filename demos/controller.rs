//! # Example: Controller start/stop
//!
//! A view sends clicks to a counter loop and prints the models it receives.
//! Stopping keeps the count; the next start resumes from it.
//!
//! Run with: `cargo run --example controller --features controller`

use std::{sync::Arc, time::Duration};

use parking_lot::Mutex;

#[cfg(feature = "controller")]
use statevisor::{ConnectableFn, Connection, Consumer, First, Loop, Next};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    #[cfg(not(feature = "controller"))]
    {
        eprintln!("This example requires the 'controller' feature.");
        eprintln!("Run with: cargo run --example controller --features controller");
        return;
    }

    #[cfg(feature = "controller")]
    {
        let clicks: Arc<Mutex<Option<Consumer<i32>>>> = Arc::new(Mutex::new(None));
        let slot = Arc::clone(&clicks);
        let view = ConnectableFn::new(move |out: Consumer<i32>| {
            *slot.lock() = Some(out);
            Connection::new(
                |count: i32| println!("[view] count = {count}"),
                || println!("[view] disconnected"),
            )
        });

        let controller = Loop::builder(|count: &i32, step: i32| Next::<i32, ()>::next(count + step))
            .controller(0)
            .with_initiate(|count| {
                println!("[init] resuming from {count}");
                First::new(count)
            })
            .build();
        controller.connect_view(view);

        let click = |step: i32| {
            if let Some(out) = clicks.lock().clone() {
                out(step);
            }
        };

        controller.start();
        println!("[main] phase: {}", controller.phase());
        click(1);
        click(2);
        tokio::time::sleep(Duration::from_millis(50)).await;

        controller.stop();
        println!("[main] stopped at {}", controller.model());

        // Clicks while stopped are dropped
        click(100);

        controller.replace_model(controller.model() * 10);
        controller.start();
        click(5);
        tokio::time::sleep(Duration::from_millis(50)).await;
        controller.stop();

        println!("[main] finished at {}", controller.model());
    }
}
