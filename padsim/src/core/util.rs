use ahash::RandomState;
use std::collections::{HashMap as StdHashMap, HashSet as StdHashSet};
use std::thread;
use std::time::{Duration, Instant};

pub type HashMap<K, V> = StdHashMap<K, V, RandomState>;
pub type HashSet<K> = StdHashSet<K, RandomState>;

/// `ternary!(cond, true_case, false_case)`
#[macro_export]
macro_rules! ternary {
    ($condition: expr, $_true: expr, $_false: expr) => {
        if $condition { $_true } else { $_false }
    };
}

/// Poll `condition` every millisecond until it holds or `timeout` passes.
/// Returns whether the condition was eventually met.
pub fn wait_until<F>(timeout: Duration, mut condition: F) -> bool
where
    F: FnMut() -> bool,
{
    let deadline = Instant::now() + timeout;
    loop {
        if condition() {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        thread::sleep(Duration::from_millis(1));
    }
}
