//! Demonstration of wrapped mutations and getters for a namespaced todo list

use std::sync::Arc;
use storewrap::{wrap_getters, wrap_mutations, GetterFn, HandlerMap, MutationFn, Store};

#[derive(Clone, Debug)]
struct TodoItem {
    id: usize,
    title: String,
    completed: bool,
}

#[derive(Clone, Debug, Default)]
struct AppState {
    todos: Vec<TodoItem>,
}

#[derive(Clone, Debug)]
enum Payload {
    Title(String),
    Id(usize),
}

type TodoMutation = MutationFn<AppState, Payload>;
type TodoGetter = GetterFn<AppState, usize>;

fn mutations() -> HandlerMap<TodoMutation> {
    let add: TodoMutation = Arc::new(|state, payload| {
        if let Some(Payload::Title(title)) = payload {
            let id = state.todos.len();
            state.todos.push(TodoItem {
                id,
                title: title.clone(),
                completed: false,
            });
        }
    });
    let toggle: TodoMutation = Arc::new(|state, payload| {
        if let Some(Payload::Id(id)) = payload {
            if let Some(todo) = state.todos.iter_mut().find(|t| t.id == *id) {
                todo.completed = !todo.completed;
            }
        }
    });
    HandlerMap::new().with("add", add).with("toggle", toggle)
}

fn getters() -> HandlerMap<TodoGetter> {
    let total: TodoGetter = Arc::new(|state| state.todos.len());
    let active: TodoGetter = Arc::new(|state| state.todos.iter().filter(|t| !t.completed).count());
    let completed: TodoGetter =
        Arc::new(|state| state.todos.iter().filter(|t| t.completed).count());
    HandlerMap::new()
        .with("total", total)
        .with("active", active)
        .with("completed", completed)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    println!("=== Wrapped Store Example: Todo List ===\n");

    // The store owns handlers; the wrappers only know their names
    let store: Store<AppState, Payload, usize> = Store::new(AppState::default());
    let mutations = mutations();
    let getters = getters();
    store.register_mutations("todos", &mutations)?;
    store.register_getters("todos", &getters)?;

    println!("1. Wrapping the todos namespace");
    let todos = wrap_mutations("todos", &store, &mutations)?;
    let stats = wrap_getters(&store, &getters, "todos")?;
    for (name, accessor) in todos.iter() {
        println!("   {} -> {}", name, accessor.key());
    }

    println!("\n2. Listening for new todos");
    let added = todos["add"].listen(|payload| {
        if let Some(Payload::Title(title)) = payload {
            println!("   [todos/add] {}", title);
        }
    });

    println!("\n3. Adding todos");
    todos["add"].commit(Payload::Title("Learn Rust".to_string()))?;
    todos["add"].commit(Payload::Title("Wrap the store".to_string()))?;
    todos["add"].commit(Payload::Title("Write documentation".to_string()))?;

    println!("\n4. Completing the first todo");
    todos["toggle"].commit(Payload::Id(0))?;

    println!("\n5. Current todos:");
    store.read(|state| {
        for todo in &state.todos {
            let status = if todo.completed { "✓" } else { " " };
            println!("   [{}] {}", status, todo.title);
        }
    });

    println!("\n6. Statistics (read live from the store):");
    for name in stats.names() {
        println!("   {}: {}", name, stats.value(name).unwrap_or_default());
    }

    println!("\n7. Disposing the listener and adding one more");
    added.dispose();
    todos["add"].commit(Payload::Title("Ship it".to_string()))?;
    println!("   total: {}", stats.value("total").unwrap_or_default());

    println!("\n8. Getters are read-only");
    if let Err(err) = stats.set("total", 0) {
        println!("   {}", err);
    }

    println!("\n✓ Example complete!");
    Ok(())
}
