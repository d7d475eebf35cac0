//! Example demonstrating logging capabilities
//!
//! Run with JSON logging (production):
//! ```bash
//! cargo run --example logging --features logging-json,logging-pretty
//! ```
//!
//! Run with pretty logging (development):
//! ```bash
//! cargo run --example logging --features logging-pretty
//! ```
//!
//! Per-parameter resolution is logged at TRACE:
//! ```bash
//! RUST_LOG=scope_injector=trace cargo run --example logging --features logging-pretty
//! ```

use scope_injector::{Args, ClassDef, Dependency, Function, Param, Scope, signature};

fn main() {
    // JSON if logging-json is enabled, pretty otherwise
    scope_injector::logging::init();

    println!("=== scope-injector Logging Demo ===\n");

    // logs: "Registering value"
    Scope::global().set("database", String::from("postgres://localhost/mydb"));

    // logs: "Creating local scope"
    let request = match Scope::local("request") {
        Ok(scope) => scope,
        Err(err) => {
            eprintln!("{err}");
            return;
        }
    };
    request.set("request_id", String::from("req-12345"));

    // logs: "Wrapping callable"
    let handle = match request.wrap(Function::new(
        "handle",
        signature![
            database,
            request_id,
            started => Dependency::cached(std::time::Instant::now),
        ],
        |args| {
            Ok(format!(
                "{} on {}",
                args.get::<String>("request_id")?,
                args.get::<String>("database")?
            ))
        },
    )) {
        Ok(f) => f,
        Err(err) => {
            eprintln!("{err}");
            return;
        }
    };

    // logs: "Scope lookup", "Parameter resolved", "Cached provider initializing on first resolution"
    match handle.call::<String>(Args::new()) {
        Ok(out) => println!("  handle() -> {out}"),
        Err(err) => println!("  handle() failed: {err}"),
    }

    // Explicit argument: no lookup for request_id
    match handle.call::<String>(Args::new().named("request_id", String::from("req-explicit"))) {
        Ok(out) => println!("  handle(request_id=...) -> {out}"),
        Err(err) => println!("  handle() failed: {err}"),
    }

    // logs: "Resolving class attributes"
    let class = request.wrap(
        ClassDef::new("Handler")
            .attr(Param::new("database"))
            .attr(Param::new("level").annotated(String::from("info"))),
    );
    match class {
        Ok(class) => println!("  {class:?}"),
        Err(err) => println!("  class failed: {err}"),
    }

    // logs: "Removing value", then resolution fails
    request.remove("request_id");
    match handle.call::<String>(Args::new()) {
        Ok(out) => println!("  handle() -> {out}"),
        Err(err) => println!("  handle() failed: {err}"),
    }

    println!("\n=== Demo Complete ===");
    println!("Check the log output above to see structured logging in action!");
    println!("\nTip: Use --features logging-json for production (JSON output)");
    println!("     Use --features logging-pretty for development (colorful output)");
}
