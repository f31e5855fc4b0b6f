use std::fmt;

use crate::frame::Frame;

/// Value held by one bus position.
///
/// `Deferred` marks a frame that lives only in the store. Slots have no
/// `PartialEq`; compare them by tag with [`Slot::is_deferred`] and
/// [`Slot::is_loaded`].
#[derive(Clone)]
pub enum Slot {
    Deferred,
    Loaded(Frame),
}

impl Slot {
    pub fn is_deferred(&self) -> bool {
        matches!(self, Slot::Deferred)
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, Slot::Loaded(_))
    }

    pub fn frame(&self) -> Option<&Frame> {
        match self {
            Slot::Loaded(frame) => Some(frame),
            Slot::Deferred => None,
        }
    }
}

impl From<Frame> for Slot {
    fn from(frame: Frame) -> Self {
        Slot::Loaded(frame)
    }
}

impl fmt::Debug for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Deferred => f.write_str("<FrameDeferred>"),
            Slot::Loaded(frame) => f
                .debug_tuple("Loaded")
                .field(&frame.name())
                .field(&frame.shape())
                .finish(),
        }
    }
}
