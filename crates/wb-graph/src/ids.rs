use core::fmt;
use core::num::NonZeroU32;

macro_rules! handle {
    ($(#[$meta:meta])* $name:ident, $tag:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(NonZeroU32);

        impl $name {
            /// Create a handle from a 0-based arena index by storing index+1.
            /// `None` once the index no longer fits.
            pub(crate) fn from_index(index: usize) -> Option<Self> {
                let stored = u32::try_from(index).ok()?.checked_add(1)?;
                NonZeroU32::new(stored).map(Self)
            }

            /// Recover the 0-based arena index.
            pub fn index(self) -> usize {
                (self.0.get() - 1) as usize
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($tag, "({})"), self.index())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($tag, "#{}"), self.index())
            }
        }
    };
}

handle!(
    /// Handle to a [`ComponentNode`](crate::ComponentNode) slot in a
    /// [`BoardGraph`](crate::BoardGraph). Removed nodes leave their slot
    /// empty, so a stale handle never aliases a newer node.
    NodeId,
    "NodeId"
);

handle!(
    /// Handle to a [`WireEdge`](crate::WireEdge) slot in a
    /// [`BoardGraph`](crate::BoardGraph).
    EdgeId,
    "EdgeId"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_round_trip() {
        for i in [0_usize, 1, 2, 42, 10_000] {
            assert_eq!(NodeId::from_index(i).unwrap().index(), i);
            assert_eq!(EdgeId::from_index(i).unwrap().index(), i);
        }
    }

    #[test]
    fn index_past_u32_has_no_handle() {
        let last = (u32::MAX - 1) as usize;
        assert_eq!(NodeId::from_index(last).unwrap().index(), last);
        assert!(NodeId::from_index(last + 1).is_none());
        assert!(EdgeId::from_index(usize::MAX).is_none());
    }

    #[test]
    fn option_handle_is_small() {
        assert_eq!(
            core::mem::size_of::<NodeId>(),
            core::mem::size_of::<Option<NodeId>>()
        );
    }

    #[test]
    fn formatting() {
        assert_eq!(format!("{:?}", EdgeId::from_index(3).unwrap()), "EdgeId(3)");
        assert_eq!(NodeId::from_index(0).unwrap().to_string(), "NodeId#0");
    }
}
