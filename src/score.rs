//! Persistence of the best score.
//!
//! Writes are best effort: the game logs a failed save and carries on.
use crate::browser;
use anyhow::Result;

pub trait ScoreStore {
    /// Read once when the game loads
    fn load(&self) -> Option<u32>;
    /// Called on every new best score
    fn save(&self, best_score: u32) -> Result<()>;
}

/// `document.cookie`, scoped to `/`, no expiry
pub struct CookieStore {
    name: String,
}

impl CookieStore {
    pub fn new(name: &str) -> Self {
        CookieStore {
            name: name.to_string(),
        }
    }
}

impl ScoreStore for CookieStore {
    fn load(&self) -> Option<u32> {
        match browser::cookies() {
            Ok(jar) => parse_cookie(&jar, &self.name),
            Err(err) => {
                error!("CookieStore: {:#?}", err);
                None
            }
        }
    }

    fn save(&self, best_score: u32) -> Result<()> {
        browser::set_cookie(&format_cookie(&self.name, best_score))
    }
}

/// Finds `name=<u32>` in a `document.cookie` string such as
/// `"theme=dark; highestScore=12"`
pub fn parse_cookie(jar: &str, name: &str) -> Option<u32> {
    jar.split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .and_then(|(_, value)| value.trim().parse().ok())
}

pub fn format_cookie(name: &str, value: u32) -> String {
    format!("{}={}; path=/", name, value)
}

#[cfg(test)]
pub(crate) mod testing {
    use super::ScoreStore;
    use anyhow::{anyhow, Result};
    use std::cell::Cell;
    use std::rc::Rc;

    /// Keeps the score in memory. Clones share the same slot.
    #[derive(Debug, Clone, Default)]
    pub struct MemoryStore {
        value: Rc<Cell<Option<u32>>>,
        read_only: bool,
    }

    impl MemoryStore {
        pub fn new(initial: Option<u32>) -> Self {
            MemoryStore {
                value: Rc::new(Cell::new(initial)),
                read_only: false,
            }
        }

        /// Every save fails, the stored value never changes
        pub fn read_only(initial: Option<u32>) -> Self {
            MemoryStore {
                read_only: true,
                ..MemoryStore::new(initial)
            }
        }

        pub fn value(&self) -> Option<u32> {
            self.value.get()
        }
    }

    impl ScoreStore for MemoryStore {
        fn load(&self) -> Option<u32> {
            self.value.get()
        }

        fn save(&self, best_score: u32) -> Result<()> {
            if self.read_only {
                return Err(anyhow!("store is read only"));
            }
            self.value.set(Some(best_score));
            Ok(())
        }
    }
}
