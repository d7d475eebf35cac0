//! Walkthrough of scopes, dependencies, methods and classes
//!
//! Run with:
//!   cargo run --example quickstart

use scope_injector::{
    Args, ClassDef, Dependency, DiError, Function, Method, Param, Scope, signature, wrap,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone)]
struct Config {
    host: String,
    port: u16,
}

struct Greeter {
    greeting: &'static str,
}

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

fn main() -> Result<(), DiError> {
    println!("=== scope-injector Quickstart ===\n");

    // Global scope
    Scope::global().set("database", String::from("MySQL Connection"));
    Scope::global().set(
        "config",
        Config {
            host: "localhost".into(),
            port: 3306,
        },
    );

    let connect = wrap(Function::new("connect", signature![database, config], |args| {
        let config = args.get::<Config>("config")?;
        Ok(format!(
            "{} @ {}:{}",
            args.get::<String>("database")?,
            config.host,
            config.port
        ))
    }))?;

    println!("connect()                  -> {}", connect.call(Args::new())?);
    println!(
        "connect(database=...)      -> {}",
        connect.call(Args::new().named("database", String::from("PostgreSQL")))?
    );

    // Local scope with a plain default
    let module = Scope::local("my_module")?;
    module.set("logger", String::from("FileLogger"));

    let process = module.wrap(Function::new(
        "process",
        signature![logger, data = String::from("default")],
        |args| {
            Ok(format!(
                "{} handled {}",
                args.get::<String>("logger")?,
                args.get::<String>("data")?
            ))
        },
    ))?;
    println!("process()                  -> {}", process.call(Args::new())?);

    // Providers
    let get_info = module.wrap(Function::new(
        "get_info",
        signature![
            id => Dependency::provider(|| NEXT_ID.fetch_add(1, Ordering::SeqCst)),
            ts => Dependency::cached(|| {
                SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .map(|d| d.as_millis())
                    .unwrap_or_default()
            }),
        ],
        |args| Ok(format!("id={} ts={}", args.get::<u64>("id")?, args.get::<u128>("ts")?)),
    ))?;
    println!("get_info()                 -> {}", get_info.call(Args::new())?);
    println!("get_info()                 -> {}", get_info.call(Args::new())?);

    // Methods
    let greet = module.wrap(Method::instance(
        "Greeter",
        "greet",
        signature![logger],
        |this: &Greeter, args| Ok(format!("{} from {}", this.greeting, args.get::<String>("logger")?)),
    ))?;
    println!(
        "Greeter.greet()            -> {}",
        greet.call(&Greeter { greeting: "hello" }, Args::new())?
    );

    // Classes
    module.set("service", String::from("UserService"));
    let handler = module.wrap(
        ClassDef::new("Handler")
            .attr(Param::new("service").inject(Dependency::key("service")))
            .attr(Param::new("retries").with_default(3u8)),
    )?;
    println!(
        "Handler.service            -> {}",
        handler.get::<String>("service")?
    );

    // Missing dependency
    let risky = module.wrap(Function::new("risky", signature![missing], |_| Ok(())))?;
    match risky.call::<()>(Args::new()) {
        Err(err @ DiError::MissingDependency { .. }) => println!("risky()                    -> {err}"),
        other => println!("risky()                    -> unexpected: {other:?}"),
    }

    println!("\n=== Demo Complete ===");
    Ok(())
}
