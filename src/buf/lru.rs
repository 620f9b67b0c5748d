//! buf/lru — O(1) LRU-порядок ключей кадров.
//!
//! - HashMap<key, Link> с prev/next по ключу;
//! - head = MRU, tail = LRU;
//! - victim() идёт от хвоста к голове и возвращает первый ключ,
//!   который разрешено вытеснить (закреплённые кадры пропускаются).

use std::collections::HashMap;

#[derive(Default)]
pub(crate) struct Lru {
    map: HashMap<u64, Link>,
    head: Option<u64>,
    tail: Option<u64>,
}

#[derive(Clone, Copy, Default)]
struct Link {
    prev: Option<u64>,
    next: Option<u64>,
}

impl Lru {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.map.len()
    }

    /// Insert `key` or move it to MRU.
    pub(crate) fn touch(&mut self, key: u64) {
        if self.map.contains_key(&key) {
            self.detach(key);
        } else {
            self.map.insert(key, Link::default());
        }
        self.attach_front(key);
    }

    pub(crate) fn remove(&mut self, key: u64) -> bool {
        if !self.map.contains_key(&key) {
            return false;
        }
        self.detach(key);
        self.map.remove(&key);
        true
    }

    /// Least-recently used key accepted by `evictable`.
    pub(crate) fn victim(&self, mut evictable: impl FnMut(u64) -> bool) -> Option<u64> {
        let mut cur = self.tail;
        while let Some(k) = cur {
            if evictable(k) {
                return Some(k);
            }
            cur = self.map.get(&k).and_then(|l| l.prev);
        }
        None
    }

    // ---------------- internal helpers ----------------

    fn detach(&mut self, key: u64) {
        let Link { prev, next } = match self.map.get(&key) {
            Some(l) => *l,
            None => return,
        };
        if self.head == Some(key) {
            self.head = next;
        }
        if self.tail == Some(key) {
            self.tail = prev;
        }
        if let Some(p) = prev {
            if let Some(pl) = self.map.get_mut(&p) {
                pl.next = next;
            }
        }
        if let Some(n) = next {
            if let Some(nl) = self.map.get_mut(&n) {
                nl.prev = prev;
            }
        }
        if let Some(l) = self.map.get_mut(&key) {
            *l = Link::default();
        }
    }

    fn attach_front(&mut self, key: u64) {
        if let Some(l) = self.map.get_mut(&key) {
            l.prev = None;
            l.next = self.head;
        }
        if let Some(old) = self.head {
            if let Some(hl) = self.map.get_mut(&old) {
                hl.prev = Some(key);
            }
        }
        self.head = Some(key);
        if self.tail.is_none() {
            self.tail = Some(key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn victim_is_least_recent() {
        let mut l = Lru::new();
        for k in 1..=3 {
            l.touch(k);
        }
        assert_eq!(l.victim(|_| true), Some(1));
        l.touch(1);
        assert_eq!(l.victim(|_| true), Some(2));
        assert_eq!(l.victim(|k| k != 2), Some(3));
        assert!(l.remove(3));
        assert!(!l.remove(3));
        assert_eq!(l.len(), 2);
        assert_eq!(l.victim(|k| k == 99), None);
    }

    #[test]
    fn single_entry_touch_keeps_links_sane() {
        let mut l = Lru::new();
        l.touch(5);
        l.touch(5);
        assert_eq!(l.victim(|_| true), Some(5));
        l.remove(5);
        assert_eq!(l.victim(|_| true), None);
        l.touch(6);
        assert_eq!(l.victim(|_| true), Some(6));
    }
}
