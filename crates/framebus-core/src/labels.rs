//! Ordered label → slot mapping.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{BusError, BusResult};
use crate::frame::Frame;
use crate::slot::Slot;

/// Unique, non-empty labels in a fixed order.
#[derive(Debug, Default)]
pub struct LabelIndex {
    labels: Vec<String>,
    positions: HashMap<String, usize>,
}

impl LabelIndex {
    pub fn new(labels: Vec<String>) -> BusResult<Self> {
        let mut positions = HashMap::with_capacity(labels.len());
        for (position, label) in labels.iter().enumerate() {
            if label.is_empty() {
                return Err(BusError::init(format!(
                    "supplied label {:?} at position {} is empty",
                    label, position
                )));
            }
            if positions.insert(label.clone(), position).is_some() {
                return Err(BusError::init(format!(
                    "supplied label {:?} is not unique",
                    label
                )));
            }
        }
        Ok(Self { labels, positions })
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn label(&self, position: usize) -> Option<&str> {
        self.labels.get(position).map(String::as_str)
    }

    pub fn position(&self, label: &str) -> Option<usize> {
        self.positions.get(label).copied()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.labels
    }
}

/// Ordered mapping from label to [`Slot`].
///
/// Both the labels and the slot array are immutable once built; the bus
/// publishes a fresh slot array after each cache update instead of writing
/// into a shared one.
#[derive(Debug, Clone)]
pub struct SlotMap {
    name: Option<String>,
    index: Arc<LabelIndex>,
    slots: Arc<[Slot]>,
}

impl SlotMap {
    pub fn from_pairs<I, S>(pairs: I) -> BusResult<Self>
    where
        I: IntoIterator<Item = (S, Slot)>,
        S: Into<String>,
    {
        let (labels, slots): (Vec<String>, Vec<Slot>) = pairs
            .into_iter()
            .map(|(label, slot)| (label.into(), slot))
            .unzip();
        Ok(Self {
            name: None,
            index: Arc::new(LabelIndex::new(labels)?),
            slots: slots.into(),
        })
    }

    /// Loaded slots labelled by each frame's name.
    pub fn from_frames<I>(frames: I) -> BusResult<Self>
    where
        I: IntoIterator<Item = Frame>,
    {
        let pairs = frames
            .into_iter()
            .map(|frame| match frame.name() {
                Some(name) => Ok((name.to_string(), Slot::Loaded(frame))),
                None => Err(BusError::init(format!(
                    "supplied frame of shape {:?} has no name to use as label",
                    frame.shape()
                ))),
            })
            .collect::<BusResult<Vec<_>>>()?;
        Self::from_pairs(pairs)
    }

    /// All slots deferred.
    pub fn deferred<I, S>(labels: I) -> BusResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::from_pairs(labels.into_iter().map(|label| (label, Slot::Deferred)))
    }

    /// All slots deferred, labels taken from a JSON array of strings.
    pub fn deferred_from_json(labels: &serde_json::Value) -> BusResult<Self> {
        let items = labels.as_array().ok_or_else(|| {
            BusError::init(format!("supplied labels {} are not an array", labels))
        })?;
        let labels = items
            .iter()
            .map(|item| match item {
                serde_json::Value::String(s) => Ok(s.clone()),
                other => Err(BusError::init(format!(
                    "supplied label {} is not a string",
                    other
                ))),
            })
            .collect::<BusResult<Vec<_>>>()?;
        Self::deferred(labels)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn index(&self) -> &LabelIndex {
        &self.index
    }

    pub fn labels(&self) -> &[String] {
        self.index.as_slice()
    }

    pub(crate) fn shared_index(&self) -> Arc<LabelIndex> {
        Arc::clone(&self.index)
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn slot(&self, position: usize) -> Option<&Slot> {
        self.slots.get(position)
    }

    pub fn get(&self, label: &str) -> Option<&Slot> {
        self.index.position(label).and_then(|p| self.slot(p))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Slot)> {
        self.labels()
            .iter()
            .map(String::as_str)
            .zip(self.slots.iter())
    }

    /// Same labels, new slot array.
    pub(crate) fn with_slots(&self, slots: Arc<[Slot]>) -> Self {
        debug_assert_eq!(slots.len(), self.index.len());
        Self {
            name: self.name.clone(),
            index: Arc::clone(&self.index),
            slots,
        }
    }

    /// New map holding `positions` in the given order.
    pub fn take(&self, positions: &[usize]) -> BusResult<Self> {
        let mut labels = Vec::with_capacity(positions.len());
        let mut slots = Vec::with_capacity(positions.len());
        for &position in positions {
            let (Some(label), Some(slot)) = (self.index.label(position), self.slot(position))
            else {
                return Err(BusError::OutOfBounds {
                    position,
                    len: self.len(),
                });
            };
            labels.push(label.to_string());
            slots.push(slot.clone());
        }
        Ok(Self {
            name: self.name.clone(),
            index: Arc::new(LabelIndex::new(labels)?),
            slots: slots.into(),
        })
    }
}
