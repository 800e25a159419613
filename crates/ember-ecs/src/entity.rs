use std::fmt;

/// A generational row handle. Compact u32 index + generation, cheap to copy and hash.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

impl Handle {
    /// Create a handle from raw parts (mainly for testing).
    pub fn from_raw(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// The slot index of this handle.
    pub fn index(&self) -> u32 {
        self.index
    }

    /// The generation of this handle (incremented every time the slot is freed).
    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle({}v{})", self.index, self.generation)
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_parts_round_trip() {
        let h = Handle::from_raw(7, 3);
        assert_eq!(h.index(), 7);
        assert_eq!(h.generation(), 3);
    }

    #[test]
    fn display_format() {
        assert_eq!(Handle::from_raw(2, 5).to_string(), "2v5");
        assert_eq!(format!("{:?}", Handle::from_raw(0, 1)), "Handle(0v1)");
    }

    #[test]
    fn generations_distinguish() {
        assert_ne!(Handle::from_raw(1, 0), Handle::from_raw(1, 1));
    }
}
