//! Example demonstrating the #[derive(Inject)] macro
//!
//! Run with:
//!   cargo run --example derive --features derive

use scope_injector::{Inject, Scope};
use std::sync::Arc;

struct Database {
    url: String,
}

struct Cache {
    size: usize,
}

#[allow(dead_code)]
struct Logger {
    level: String,
}

#[derive(Inject)]
struct UserService {
    #[inject]
    database: Arc<Database>,
    #[inject(key = "primary_cache")]
    cache: Arc<Cache>,
    #[inject(optional)]
    logger: Option<Arc<Logger>>,
    // Non-injected field uses Default
    request_count: u64,
}

impl UserService {
    fn describe(&self) -> String {
        let logger_status = if self.logger.is_some() {
            "with logging"
        } else {
            "without logging"
        };
        format!(
            "UserService connected to {} with cache size {} ({}, requests: {})",
            self.database.url, self.cache.size, logger_status, self.request_count
        )
    }
}

fn main() {
    println!("=== scope-injector Derive Macro Demo ===\n");

    Scope::global().set(
        "database",
        Database {
            url: "postgres://localhost:5432/myapp".into(),
        },
    );

    let requests = match Scope::local("requests") {
        Ok(scope) => scope,
        Err(err) => {
            eprintln!("{err}");
            return;
        }
    };

    println!("Building UserService before the cache is registered...");
    match UserService::from_scope(&requests) {
        Ok(service) => println!("  {}", service.describe()),
        Err(err) => println!("  {err}"),
    }
    println!();

    requests.set("primary_cache", Cache { size: 1024 });
    println!("Building UserService from the local scope...");
    match UserService::from_scope(&requests) {
        Ok(service) => println!("  {}", service.describe()),
        Err(err) => println!("  {err}"),
    }
    println!();

    requests.set(
        "logger",
        Logger {
            level: "DEBUG".into(),
        },
    );
    println!("Building UserService with a logger...");
    match UserService::from_scope(&requests) {
        Ok(service) => println!("  {}", service.describe()),
        Err(err) => println!("  {err}"),
    }

    println!("\n=== Demo Complete ===");
    println!("\nThe #[derive(Inject)] macro generated `from_scope()` which:");
    println!("  - Resolves #[inject] fields by field name, or by #[inject(key = ...)]");
    println!("  - Uses Option<Arc<T>> for #[inject(optional)] fields");
    println!("  - Uses Default::default() for non-injected fields");
    println!("  - Reports every unbound field in one MissingDependency error");
}
