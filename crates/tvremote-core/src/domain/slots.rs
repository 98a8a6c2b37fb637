//! Multi-touch slot allocation.
//!
//! The kernel's type-B multi-touch protocol tracks each finger in a numbered
//! *slot*.  Remote providers, on the other hand, identify fingers with their
//! own pointer ids, which can be any `i32`.  [`SlotAllocator`] owns the
//! mapping between the two for one device.
//!
//! # Allocation policy
//!
//! A new contact always receives the **lowest free slot**.  This makes a
//! replayed contact sequence produce the same slot numbers every time:
//!
//! ```rust
//! use tvremote_core::domain::slots::SlotAllocator;
//!
//! let mut slots = SlotAllocator::new(2);
//! assert_eq!(slots.assign(10), Some(0));
//! assert_eq!(slots.assign(11), Some(1));
//! slots.release(10);
//! assert_eq!(slots.assign(12), Some(0)); // slot 0 is reused, not slot 2
//! assert_eq!(slots.assign(13), None);    // capacity exhausted
//! ```
//!
//! The allocator has no internal locking; it is owned by exactly one
//! translator and mutated only through `&mut self`.

use std::collections::BTreeMap;

use tracing::trace;

/// Largest capacity a [`SlotAllocator`] supports (width of the used-slot mask).
pub const MAX_CONTACT_SLOTS: usize = 32;

/// External contact (pointer) identifier supplied by the remote provider.
pub type ContactId = i32;

/// Tracks which slots are in use and which contact owns each one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotAllocator {
    capacity: usize,
    used: u32,
    contacts: BTreeMap<ContactId, usize>,
}

impl SlotAllocator {
    /// Creates an allocator with `capacity` slots.
    ///
    /// Capacities above [`MAX_CONTACT_SLOTS`] are clamped; device config
    /// validation rejects them before an allocator is ever built.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.min(MAX_CONTACT_SLOTS),
            used: 0,
            contacts: BTreeMap::new(),
        }
    }

    /// Assigns the lowest free slot to `contact`.
    ///
    /// Returns `None` if every slot is taken.  If `contact` already owns a
    /// slot, that slot is returned unchanged.
    pub fn assign(&mut self, contact: ContactId) -> Option<usize> {
        if let Some(slot) = self.find(contact) {
            return Some(slot);
        }
        let slot = self.first_free()?;
        self.used |= 1 << slot;
        self.contacts.insert(contact, slot);
        trace!(contact, slot, "contact slot assigned");
        Some(slot)
    }

    /// Returns the slot owned by `contact`, if any.
    pub fn find(&self, contact: ContactId) -> Option<usize> {
        self.contacts.get(&contact).copied()
    }

    /// Frees the slot owned by `contact`.  No-op for unknown contacts.
    pub fn release(&mut self, contact: ContactId) -> Option<usize> {
        let slot = self.contacts.remove(&contact)?;
        self.used &= !(1 << slot);
        trace!(contact, slot, "contact slot released");
        Some(slot)
    }

    /// Releases every contact, returning `(contact, slot)` pairs ordered by slot.
    pub fn drain(&mut self) -> Vec<(ContactId, usize)> {
        let mut live: Vec<(ContactId, usize)> =
            std::mem::take(&mut self.contacts).into_iter().collect();
        live.sort_by_key(|&(_, slot)| slot);
        self.used = 0;
        live
    }

    /// Iterates over live `(contact, slot)` pairs ordered by contact id.
    pub fn live(&self) -> impl Iterator<Item = (ContactId, usize)> + '_ {
        self.contacts.iter().map(|(&c, &s)| (c, s))
    }

    pub fn is_slot_used(&self, slot: usize) -> bool {
        slot < self.capacity && self.used & (1 << slot) != 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of live contacts.
    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.contacts.len() >= self.capacity
    }

    fn first_free(&self) -> Option<usize> {
        let slot = (!self.used).trailing_zeros() as usize;
        (slot < self.capacity).then_some(slot)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn assert_consistent(slots: &SlotAllocator) {
        let mut seen = HashSet::new();
        for (contact, slot) in slots.live() {
            assert!(slot < slots.capacity(), "contact {contact} has out-of-range slot {slot}");
            assert!(seen.insert(slot), "slot {slot} assigned twice");
            assert!(slots.is_slot_used(slot));
        }
        let used_bits = (0..slots.capacity()).filter(|&s| slots.is_slot_used(s)).count();
        assert_eq!(used_bits, slots.len(), "used mask must match the mapping");
    }

    #[test]
    fn test_fresh_contacts_get_slots_in_order() {
        // Arrange
        let mut slots = SlotAllocator::new(4);

        // Act
        let a = slots.assign(100);
        let b = slots.assign(200);

        // Assert
        assert_eq!(a, Some(0));
        assert_eq!(b, Some(1));
    }

    #[test]
    fn test_release_then_assign_reuses_lowest_free_slot() {
        // Arrange
        let mut slots = SlotAllocator::new(4);
        slots.assign(1);
        slots.assign(2);
        slots.assign(3);

        // Act
        slots.release(2);
        let reused = slots.assign(4);

        // Assert
        assert_eq!(reused, Some(1), "freed slot 1 must be reused before slot 3");
        assert_consistent(&slots);
    }

    #[test]
    fn test_assign_beyond_capacity_returns_none_and_keeps_existing() {
        // Arrange
        let mut slots = SlotAllocator::new(2);
        slots.assign(10);
        slots.assign(11);
        let before: Vec<_> = slots.live().collect();

        // Act
        let overflow = slots.assign(12);

        // Assert
        assert_eq!(overflow, None);
        assert_eq!(slots.live().collect::<Vec<_>>(), before);
        assert_eq!(slots.find(12), None);
    }

    #[test]
    fn test_assign_existing_contact_returns_its_slot() {
        let mut slots = SlotAllocator::new(3);
        slots.assign(7);
        slots.assign(8);
        assert_eq!(slots.assign(8), Some(1));
        assert_eq!(slots.len(), 2);
    }

    #[test]
    fn test_find_does_not_mutate() {
        let mut slots = SlotAllocator::new(2);
        slots.assign(5);
        let snapshot = slots.clone();
        assert_eq!(slots.find(5), Some(0));
        assert_eq!(slots.find(6), None);
        assert_eq!(slots, snapshot);
    }

    #[test]
    fn test_release_unknown_contact_is_noop() {
        let mut slots = SlotAllocator::new(2);
        slots.assign(1);
        assert_eq!(slots.release(99), None);
        assert_eq!(slots.len(), 1);
        assert!(slots.is_slot_used(0));
    }

    #[test]
    fn test_drain_empties_mapping_and_mask() {
        // Arrange
        let mut slots = SlotAllocator::new(3);
        slots.assign(30);
        slots.assign(20);
        slots.assign(10);

        // Act
        let drained = slots.drain();

        // Assert
        assert_eq!(drained, vec![(30, 0), (20, 1), (10, 2)]);
        assert!(slots.is_empty());
        assert!((0..3).all(|s| !slots.is_slot_used(s)));
        assert_eq!(slots.assign(40), Some(0));
    }

    #[test]
    fn test_zero_capacity_never_assigns() {
        let mut slots = SlotAllocator::new(0);
        assert_eq!(slots.assign(1), None);
        assert!(slots.is_full());
    }

    #[test]
    fn test_full_width_allocator_uses_every_slot() {
        let mut slots = SlotAllocator::new(MAX_CONTACT_SLOTS);
        for contact in 0..MAX_CONTACT_SLOTS as i32 {
            assert_eq!(slots.assign(contact), Some(contact as usize));
        }
        assert_eq!(slots.assign(1000), None);
        assert_consistent(&slots);
    }

    #[test]
    fn test_capacity_is_clamped_to_mask_width() {
        assert_eq!(SlotAllocator::new(100).capacity(), MAX_CONTACT_SLOTS);
    }

    #[test]
    fn test_interleaved_sequence_keeps_slots_unique() {
        // A fixed pseudo-random walk of downs and ups that never exceeds capacity.
        let mut slots = SlotAllocator::new(5);
        let mut state: u32 = 0x1234_5678;
        for _ in 0..2_000 {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            let contact = (state % 9) as i32;
            if state & 0x100 != 0 && !slots.is_full() {
                slots.assign(contact);
            } else {
                slots.release(contact);
            }
            assert_consistent(&slots);
        }
    }
}
