//! Identity assignment for live samples.
//!
//! The feed carries no object ids. An object's identity is its index within the frame's
//! `objects` array, and the feed is assumed to keep that order stable for the whole
//! session ("stable positional identity"). Nothing checks the assumption: if the feed
//! reorders objects, two objects silently swap identities. A protocol revision that
//! carries real ids only needs to change this function.

use crate::prelude::ObjectId;

pub fn positional_id(index: usize) -> ObjectId {
    ObjectId(index)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_is_the_identity() {
        assert_eq!(positional_id(0), ObjectId(0));
        assert_eq!(positional_id(41_000), ObjectId(41_000));
    }
}
