//! Wires a logger and a key/value configuration store into several policy combinations.

use std::collections::HashMap;
use std::sync::RwLock;

use policy_singleton::creation::{CreateUsingArc, CreateUsingBox};
use policy_singleton::lifetime::{NoDestroy, Phoenix};
use policy_singleton::threading::{ClassLevelLockable, PerThread, SingleThreaded};
use policy_singleton::{Singleton, singleton};

struct Logger;

impl Default for Logger {
    fn default() -> Self {
        println!("Logger created");
        Logger
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        println!("Logger destroyed");
    }
}

impl Logger {
    fn log(&self, message: &str) {
        println!("LOG: {message}");
    }
}

struct Configuration {
    data: RwLock<HashMap<String, String>>,
}

impl Default for Configuration {
    fn default() -> Self {
        println!("Configuration created");
        Configuration {
            data: RwLock::new(HashMap::new()),
        }
    }
}

impl Drop for Configuration {
    fn drop(&mut self) {
        println!("Configuration destroyed");
    }
}

impl Configuration {
    fn set_value(&self, key: &str, value: &str) {
        self.data
            .write()
            .unwrap()
            .insert(key.to_string(), value.to_string());
    }

    fn value(&self, key: &str) -> String {
        self.data.read().unwrap().get(key).cloned().unwrap_or_default()
    }
}

singleton! {
    /// Default policies.
    struct BasicLogger: Logger;
    /// Shared ownership, recreated after teardown, mutex-guarded.
    struct SafeConfig: Configuration = (CreateUsingArc<Configuration>, Phoenix, ClassLevelLockable);
    /// Never destroyed, only touched from the main thread.
    struct PersistentLogger: Logger = (CreateUsingBox, NoDestroy, SingleThreaded);
    /// One logger per thread.
    struct ThreadLocalLogger: Logger = (CreateUsingBox, NoDestroy, PerThread);
}

fn main() {
    println!("--- Demonstrating singletons with orthogonal policies ---\n");

    println!("Using BasicLogger:");
    BasicLogger::instance().log("Application started");

    println!("\nUsing SafeConfig:");
    SafeConfig::instance().set_value("server", "localhost");
    SafeConfig::instance().set_value("port", "8080");
    println!("Server: {}", SafeConfig::instance().value("server"));
    println!("Port: {}", SafeConfig::instance().value("port"));

    println!("\nUsing PersistentLogger:");
    PersistentLogger::instance().log("Application running");

    println!("\nUsing ThreadLocalLogger:");
    ThreadLocalLogger::instance().log("Message from main thread");
    std::thread::spawn(|| ThreadLocalLogger::instance().log("Message from worker thread"))
        .join()
        .unwrap();

    println!("\nUsing BasicLogger again:");
    BasicLogger::instance().log("Application ended");

    println!("\n--- Program terminating ---");
}
