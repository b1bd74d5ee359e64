/// Identifies a [`Space`] owned by the ordinal context
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SpaceId(pub(super) u32);

impl SpaceId {
    pub(super) fn index(&self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for SpaceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("space#{}", self.0))
    }
}

/// An address is aligned when `address % boundary == byte`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Alignment {
    pub byte: u32,
    pub boundary: u32,
}

pub const NO_ALIGN: Alignment = Alignment {
    byte: 0,
    boundary: 1,
};
pub const HALFWORD: Alignment = Alignment {
    byte: 0,
    boundary: 2,
};
pub const FULLWORD: Alignment = Alignment {
    byte: 0,
    boundary: 4,
};
pub const DOUBLEWORD: Alignment = Alignment {
    byte: 0,
    boundary: 8,
};

impl Alignment {
    /// The number of bytes which must be skipped from `offset` to reach the
    /// next aligned address
    pub fn padding(&self, offset: i32) -> i32 {
        let boundary = self.boundary.max(1) as i32;
        (self.byte as i32 - offset).rem_euclid(boundary)
    }
}

/**
A relocatable address: a byte offset from the start of the section plus the
spaces which lie before it and whose sizes are not known yet.  Once every
space is resolved the address is the plain offset.
 */
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Address {
    pub offset: i32,
    pub spaces: Vec<SpaceId>,
}

impl Address {
    pub fn new(offset: i32) -> Address {
        Address {
            offset,
            spaces: vec![],
        }
    }

    pub fn has_spaces(&self) -> bool {
        !self.spaces.is_empty()
    }

    pub fn shifted(&self, by: i32) -> Address {
        Address {
            offset: self.offset.wrapping_add(by),
            spaces: self.spaces.clone(),
        }
    }

    /// Two addresses can be subtracted when the same spaces lie before both
    pub fn same_spaces(&self, other: &Address) -> bool {
        let mut l = self.spaces.clone();
        let mut r = other.spaces.clone();
        l.sort();
        r.sort();
        l == r
    }
}

#[derive(Clone, Debug, PartialEq)]
pub(super) enum SpaceKind {
    /// Padding inserted to align `anchor`
    Alignment { anchor: Address, alignment: Alignment },

    /// Storage whose length is an expression which is not resolved yet
    Length,
}

/// A number of bytes which is not known yet.  A space is resolved exactly once.
#[derive(Clone, Debug, PartialEq)]
pub(super) struct Space {
    pub kind: SpaceKind,
    pub resolved: Option<i32>,
}
