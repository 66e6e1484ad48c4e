//! Parser flag bitset.
//!
//! Mirrors the teacher crate's `FlagOperations`-over-an-integer pattern
//! (see `headers.rs`'s `Flags` constants in the reference pack) rather than
//! a `bitflags!`-generated type, since the set here is small and fixed.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Flags(u32);

impl Flags {
    pub const CHUNKED: Flags = Flags(0x0001);
    pub const CONNECTION_KEEP_ALIVE: Flags = Flags(0x0002);
    pub const CONNECTION_CLOSE: Flags = Flags(0x0004);
    pub const TRAILING: Flags = Flags(0x0008);
    pub const UPGRADE: Flags = Flags(0x0010);

    pub const fn empty() -> Flags {
        Flags(0)
    }

    pub fn set(&mut self, other: Flags) {
        self.0 |= other.0;
    }

    pub fn clear(&mut self, other: Flags) {
        self.0 &= !other.0;
    }

    pub fn contains(self, other: Flags) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn reset(&mut self) {
        self.0 = 0;
    }
}

impl std::ops::BitOr for Flags {
    type Output = Flags;
    fn bitor(self, rhs: Flags) -> Flags {
        Flags(self.0 | rhs.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_and_contains() {
        let mut f = Flags::empty();
        assert!(!f.contains(Flags::CHUNKED));
        f.set(Flags::CHUNKED);
        assert!(f.contains(Flags::CHUNKED));
        f.set(Flags::UPGRADE);
        assert!(f.contains(Flags::CHUNKED));
        assert!(f.contains(Flags::UPGRADE));
        f.clear(Flags::CHUNKED);
        assert!(!f.contains(Flags::CHUNKED));
        assert!(f.contains(Flags::UPGRADE));
    }

    #[test]
    fn reset_clears_all() {
        let mut f = Flags::empty();
        f.set(Flags::CHUNKED | Flags::UPGRADE);
        f.reset();
        assert_eq!(f, Flags::empty());
    }
}
