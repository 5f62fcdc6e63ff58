use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;
use std::sync::Arc;

use storewrap::{qualify, wrap_getters, wrap_mutations, GetterFn, HandlerMap, MutationFn, Store};

#[derive(Clone)]
struct State {
    counter: usize,
    name: String,
}

fn counter_store() -> (
    Store<State, usize, usize>,
    HandlerMap<MutationFn<State, usize>>,
    HandlerMap<GetterFn<State, usize>>,
) {
    let store = Store::new(State {
        counter: 0,
        name: "bench".to_string(),
    });
    let set: MutationFn<State, usize> = Arc::new(|state, value| {
        state.counter = value.copied().unwrap_or_default();
    });
    let counter: GetterFn<State, usize> = Arc::new(|state| state.counter + state.name.len());

    let mutations = HandlerMap::new().with("set", set);
    let getters = HandlerMap::new().with("counter", counter);
    store.register_mutations("bench", &mutations).unwrap();
    store.register_getters("bench", &getters).unwrap();
    (store, mutations, getters)
}

fn qualify_benchmark(c: &mut Criterion) {
    c.bench_function("qualify", |b| {
        b.iter(|| qualify(black_box("addItem"), black_box("shop/cart")));
    });
}

fn wrap_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("wrap_mutations");

    for handler_count in [1, 10, 100].iter() {
        let store: Store<State, usize, usize> = Store::new(State {
            counter: 0,
            name: String::new(),
        });
        let handlers: HandlerMap<()> = (0..*handler_count)
            .map(|i| (format!("m{i}"), ()))
            .collect();

        group.bench_with_input(
            BenchmarkId::from_parameter(handler_count),
            handler_count,
            |b, _| {
                b.iter(|| wrap_mutations(black_box("bench"), &store, &handlers));
            },
        );
    }
    group.finish();
}

fn accessor_call_benchmark(c: &mut Criterion) {
    let (store, mutations, _) = counter_store();
    let committer = wrap_mutations("bench", &store, &mutations).unwrap();
    let set = &committer["set"];

    c.bench_function("accessor_call", |b| {
        let mut i = 0;
        b.iter(|| {
            set.commit(black_box(i)).unwrap();
            i += 1;
        });
    });
}

fn getter_read_benchmark(c: &mut Criterion) {
    let (store, _, getters) = counter_store();
    let wrapped = wrap_getters(&store, &getters, "bench").unwrap();

    c.bench_function("getter_read", |b| {
        b.iter(|| {
            black_box(wrapped.value("counter"));
        });
    });
}

fn listener_fanout_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("listener_fanout");

    for listener_count in [1, 10, 100].iter() {
        let (store, mutations, _) = counter_store();
        let committer = wrap_mutations("bench", &store, &mutations).unwrap();

        let _disposers: Vec<_> = (0..*listener_count)
            .map(|_| {
                committer["set"].listen(|_| {
                    // Empty listener
                })
            })
            .collect();

        group.bench_with_input(
            BenchmarkId::from_parameter(listener_count),
            listener_count,
            |b, _| {
                let mut i = 0;
                b.iter(|| {
                    committer["set"].commit(black_box(i)).unwrap();
                    i += 1;
                });
            },
        );
    }
    group.finish();
}

criterion_group!(
    benches,
    qualify_benchmark,
    wrap_benchmark,
    accessor_call_benchmark,
    getter_read_benchmark,
    listener_fanout_benchmark,
);
criterion_main!(benches);
