//! Counter application using two namespaces over one store

use std::sync::Arc;
use storewrap::{
    wrap_getters, wrap_mutations, CommitOptions, GetterFn, HandlerMap, MutationFn, Store,
};

#[derive(Clone, Debug)]
struct CounterState {
    count: i32,
    step: i32,
    history: Vec<i32>,
}

impl CounterState {
    fn new() -> Self {
        Self {
            count: 0,
            step: 1,
            history: vec![0],
        }
    }
}

type CounterMutation = MutationFn<CounterState, i32>;
type CounterGetter = GetterFn<CounterState, i32>;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().init();

    println!("=== Complete Counter Application ===\n");

    println!("1. Initializing counter store");
    let store: Store<CounterState, i32, i32> = Store::new(CounterState::new());

    let increment: CounterMutation = Arc::new(|state, _| {
        state.count += state.step;
        state.history.push(state.count);
    });
    let decrement: CounterMutation = Arc::new(|state, _| {
        state.count -= state.step;
        state.history.push(state.count);
    });
    let reset: CounterMutation = Arc::new(|state, _| {
        state.count = 0;
        state.history.push(0);
    });
    let counter = HandlerMap::new()
        .with("increment", increment)
        .with("decrement", decrement)
        .with("reset", reset);

    let set_step: CounterMutation = Arc::new(|state, step| {
        state.step = step.copied().unwrap_or(1);
    });
    let settings = HandlerMap::new().with("setStep", set_step);

    let count: CounterGetter = Arc::new(|state| state.count);
    let absolute: CounterGetter = Arc::new(|state| state.count.abs());
    let views = HandlerMap::new()
        .with("count", count)
        .with("absolute", absolute);

    store.register_mutations("counter", &counter)?;
    store.register_mutations("settings", &settings)?;
    store.register_getters("counter", &views)?;

    let counter = wrap_mutations("counter", &store, &counter)?;
    let settings = wrap_mutations("settings", &store, &settings)?;
    let views = wrap_getters(&store, &views, "counter")?;

    println!("\n2. Logging step changes");
    let _step_log = settings["setStep"].listen(|step| {
        println!("   [settings/setStep] {:?}", step);
    });

    let print_state = || {
        println!(
            "   Count: {} | Abs: {}",
            views.value("count").unwrap_or_default(),
            views.value("absolute").unwrap_or_default()
        );
    };

    println!("\n3. Incrementing...");
    for _ in 0..3 {
        counter["increment"].call(None)?;
        print_state();
    }

    println!("\n4. Changing step size to 5");
    settings["setStep"].commit(5)?;

    println!("\n5. Incrementing with new step...");
    counter["increment"].call(None)?;
    print_state();

    println!("\n6. Decrementing...");
    for _ in 0..3 {
        counter["decrement"].call(None)?;
        print_state();
    }

    println!("\n7. Resetting through the raw committer...");
    counter.commit("counter/reset", None, CommitOptions::root())?;
    print_state();

    println!("\n8. Final history:");
    store.read(|state| {
        println!("   {:?}", state.history);
    });

    println!("\n✓ Counter application complete!");
    Ok(())
}
