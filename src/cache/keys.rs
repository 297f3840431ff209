//! Cache key definitions.

const CAKE_KEY_PREFIX: &str = "cake";

/// Key under which a single cake is cached: `cake:<id>`.
pub fn cake_key(id: i64) -> String {
    format!("{CAKE_KEY_PREFIX}:{id}")
}
