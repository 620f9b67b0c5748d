//! read — MVCC read views и список открытых представлений.
//!
//! ViewList: slab + двусвязный список по индексам (ViewId с поколением).
//! Новые представления добавляются в хвост; «самое старое» по соглашению
//! движка: тоже хвост. Список не потокобезопасен: синхронизирует владелец
//! (менеджер транзакций).

mod view;

pub use view::ReadView;

/// Stable handle of a view inside a `ViewList`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViewId {
    slot: u32,
    gen: u32,
}

#[derive(Debug)]
struct Slot {
    gen: u32,
    entry: Option<Entry>,
}

#[derive(Debug)]
struct Entry {
    view: ReadView,
    prev: Option<u32>,
    next: Option<u32>,
}

#[derive(Debug, Default)]
pub struct ViewList {
    slots: Vec<Slot>,
    vacant: Vec<u32>,
    head: Option<u32>,
    tail: Option<u32>,
    len: usize,
}

impl ViewList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Append a fresh view.
    pub fn open(&mut self, creator: u64, active: &[u64]) -> ViewId {
        self.push_back(ReadView::new(creator, active))
    }

    /// Copy the tail view for `creator` and append the copy; opens a fresh
    /// view from `active` when the list is empty.
    pub fn oldest_copy_or_open_new(&mut self, creator: u64, active: &[u64]) -> ViewId {
        let copy = self
            .oldest()
            .map(|(_, v)| v.copy_with_creator(creator));
        match copy {
            Some(v) => self.push_back(v),
            None => self.open(creator, active),
        }
    }

    /// The tail view.
    pub fn oldest(&self) -> Option<(ViewId, &ReadView)> {
        let slot = self.tail?;
        self.entry(slot).map(|e| (self.id_of(slot), &e.view))
    }

    pub fn get(&self, id: ViewId) -> Option<&ReadView> {
        self.live(id).and_then(|s| self.entry(s)).map(|e| &e.view)
    }

    /// Remove a view; false when the handle is stale.
    pub fn close(&mut self, id: ViewId) -> bool {
        let Some(slot) = self.live(id) else {
            return false;
        };
        let Some(entry) = self.slots[slot as usize].entry.take() else {
            return false;
        };
        match entry.prev {
            Some(p) => self.link_mut(p, |e| e.next = entry.next),
            None => self.head = entry.next,
        }
        match entry.next {
            Some(n) => self.link_mut(n, |e| e.prev = entry.prev),
            None => self.tail = entry.prev,
        }
        let s = &mut self.slots[slot as usize];
        s.gen = s.gen.wrapping_add(1);
        self.vacant.push(slot);
        self.len -= 1;
        true
    }

    /// Views from head (first opened) to tail.
    pub fn iter(&self) -> impl Iterator<Item = (ViewId, &ReadView)> + '_ {
        let mut cur = self.head;
        std::iter::from_fn(move || {
            let slot = cur?;
            let e = self.entry(slot)?;
            cur = e.next;
            Some((self.id_of(slot), &e.view))
        })
    }

    // ---------------- internal helpers ----------------

    fn push_back(&mut self, view: ReadView) -> ViewId {
        let entry = Entry {
            view,
            prev: self.tail,
            next: None,
        };
        let slot = match self.vacant.pop() {
            Some(s) => {
                self.slots[s as usize].entry = Some(entry);
                s
            }
            None => {
                self.slots.push(Slot {
                    gen: 0,
                    entry: Some(entry),
                });
                (self.slots.len() - 1) as u32
            }
        };
        match self.tail {
            Some(t) => self.link_mut(t, |e| e.next = Some(slot)),
            None => self.head = Some(slot),
        }
        self.tail = Some(slot);
        self.len += 1;
        self.id_of(slot)
    }

    fn id_of(&self, slot: u32) -> ViewId {
        ViewId {
            slot,
            gen: self.slots[slot as usize].gen,
        }
    }

    fn live(&self, id: ViewId) -> Option<u32> {
        let s = self.slots.get(id.slot as usize)?;
        (s.gen == id.gen && s.entry.is_some()).then_some(id.slot)
    }

    fn entry(&self, slot: u32) -> Option<&Entry> {
        self.slots.get(slot as usize)?.entry.as_ref()
    }

    fn link_mut(&mut self, slot: u32, f: impl FnOnce(&mut Entry)) {
        if let Some(e) = self
            .slots
            .get_mut(slot as usize)
            .and_then(|s| s.entry.as_mut())
        {
            f(e);
        }
    }
}
