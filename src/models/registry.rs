use std::collections::HashMap;
use std::collections::hash_map;
use std::ops::{Deref, DerefMut};

/// Per-competitor state keyed by exact name. Names are compared byte for byte.
#[derive(Clone, Debug)]
pub struct Registry<T> {
    entries: HashMap<String, T>,
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

/// A competitor's state, temporarily owned outside of its `Registry`.
/// It must be handed back with `Registry::checkin`.
#[derive(Debug)]
pub struct Handle<T> {
    id: String,
    value: T,
}

impl<T> Handle<T> {
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl<T> Deref for Handle<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

impl<T> DerefMut for Handle<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.value
    }
}

impl<T> Registry<T> {
    pub fn get(&self, id: &str) -> Option<&T> {
        self.entries.get(id)
    }

    /// Returns the entry for `id`, creating it with `make` if absent.
    pub fn get_or_create(&mut self, id: &str, make: impl FnOnce() -> T) -> &mut T {
        self.entries.entry(id.to_owned()).or_insert_with(make)
    }

    /// Removes the entry for `id` (creating it with `make` if absent) so that it
    /// can be updated by value alongside other entries.
    pub fn checkout(&mut self, id: &str, make: impl FnOnce() -> T) -> Handle<T> {
        match self.entries.remove_entry(id) {
            Some((id, value)) => Handle { id, value },
            None => Handle {
                id: id.to_owned(),
                value: make(),
            },
        }
    }

    pub fn checkin(&mut self, handle: Handle<T>) {
        self.entries.insert(handle.id, handle.value);
    }

    pub fn iter(&self) -> hash_map::Iter<'_, String, T> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<'a, T> IntoIterator for &'a Registry<T> {
    type Item = (&'a String, &'a T);
    type IntoIter = hash_map::Iter<'a, String, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
