//! Built-in transformations.
//!
//! Every stage name the CLI surface accepts resolves to one of these.
//! Each is a pure string -> string transform plus whatever side effect
//! its name promises (a print, a delay); none of them know about queues,
//! threads, or the sentinel, that is entirely the worker loop's job.

mod expander;
mod flipper;
mod logger;
mod rotator;
mod typewriter;
mod uppercaser;

pub use expander::Expander;
pub use flipper::Flipper;
pub use logger::Logger;
pub use rotator::Rotator;
pub use typewriter::Typewriter;
pub use uppercaser::Uppercaser;

use crate::registry::StageRegistry;
use crate::transform::Transform;

/// Registers every built-in transformation under its canonical name.
pub fn register_builtins(registry: &mut StageRegistry) {
    registry.register("logger", Box::new(|| Box::new(Logger::new()) as Box<dyn Transform>));
    registry.register(
        "typewriter",
        Box::new(|| Box::new(Typewriter::new()) as Box<dyn Transform>),
    );
    registry.register(
        "uppercaser",
        Box::new(|| Box::new(Uppercaser::new()) as Box<dyn Transform>),
    );
    registry.register("rotator", Box::new(|| Box::new(Rotator::new()) as Box<dyn Transform>));
    registry.register("flipper", Box::new(|| Box::new(Flipper::new()) as Box<dyn Transform>));
    registry.register(
        "expander",
        Box::new(|| Box::new(Expander::new()) as Box<dyn Transform>),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_six_built_ins_are_registered() {
        let mut registry = StageRegistry::new();
        register_builtins(&mut registry);
        let mut names = registry.names();
        names.sort_unstable();
        assert_eq!(
            names,
            vec!["expander", "flipper", "logger", "rotator", "typewriter", "uppercaser"]
        );
    }
}
