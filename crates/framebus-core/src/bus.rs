//! Lazy, randomly accessible container of frames.
//!
//! A [`Bus`] maps labels to frames that are either resident or deferred to a
//! [`StoreBackend`]. Every read goes through the cache update, which loads
//! missing frames, maintains least-recently-used order and, when a residency
//! ceiling is configured, evicts after each individual load so that no more
//! than `max_resident` frames are held at any point of an access.

use std::ops::{Range, RangeFull};
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::config::{BusConfig, StoreConfigMap};
use crate::error::{BusError, BusResult, StoreResult};
use crate::frame::{DType, Frame};
use crate::labels::SlotMap;
use crate::lru::RecencyTracker;
use crate::slot::Slot;
use crate::store::{open_store, StoreBackend, StoreItem};

/// Positional selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ILoc {
    Single(usize),
    Range(Range<usize>),
    Full,
    /// Explicit positions, iterated in the given order.
    List(Vec<usize>),
}

impl From<usize> for ILoc {
    fn from(position: usize) -> Self {
        Self::Single(position)
    }
}

impl From<Range<usize>> for ILoc {
    fn from(range: Range<usize>) -> Self {
        Self::Range(range)
    }
}

impl From<RangeFull> for ILoc {
    fn from(_: RangeFull) -> Self {
        Self::Full
    }
}

impl From<Vec<usize>> for ILoc {
    fn from(positions: Vec<usize>) -> Self {
        Self::List(positions)
    }
}

/// Label selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Loc {
    Label(String),
    /// Inclusive on both ends; an open bound runs to the edge of the bus.
    Range {
        start: Option<String>,
        end: Option<String>,
    },
    List(Vec<String>),
}

impl Loc {
    pub fn range(start: Option<&str>, end: Option<&str>) -> Self {
        Self::Range {
            start: start.map(str::to_string),
            end: end.map(str::to_string),
        }
    }
}

impl From<&str> for Loc {
    fn from(label: &str) -> Self {
        Self::Label(label.to_string())
    }
}

impl From<String> for Loc {
    fn from(label: String) -> Self {
        Self::Label(label)
    }
}

impl From<Vec<&str>> for Loc {
    fn from(labels: Vec<&str>) -> Self {
        Self::List(labels.into_iter().map(str::to_string).collect())
    }
}

impl From<Vec<String>> for Loc {
    fn from(labels: Vec<String>) -> Self {
        Self::List(labels)
    }
}

/// Result of an extraction: a bare frame for a single position, otherwise a
/// new bus over the selected labels.
#[derive(Debug)]
pub enum Selected {
    Frame(Frame),
    Bus(Bus),
}

impl Selected {
    pub fn into_frame(self) -> Option<Frame> {
        match self {
            Selected::Frame(frame) => Some(frame),
            Selected::Bus(_) => None,
        }
    }

    pub fn into_bus(self) -> Option<Bus> {
        match self {
            Selected::Bus(bus) => Some(bus),
            Selected::Frame(_) => None,
        }
    }
}

/// Residency report for one label; sizes are `None` while deferred.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusStatus {
    pub label: String,
    pub loaded: bool,
    pub size: Option<usize>,
    pub nbytes: Option<usize>,
    pub shape: Option<(usize, usize)>,
}

/// Bounded-memory cache of labelled frames.
#[derive(Debug)]
pub struct Bus {
    map: SlotMap,
    loaded: Arc<[bool]>,
    loaded_all: bool,
    store: Option<Arc<dyn StoreBackend>>,
    recency: Option<RecencyTracker>,
    max_resident: Option<usize>,
    config: Arc<StoreConfigMap>,
}

impl Bus {
    /// Build a bus from a slot map.
    ///
    /// Fails if `max_resident` is below the number of already loaded frames,
    /// or if a slot is deferred and no store is given.
    pub fn new(
        map: SlotMap,
        store: Option<Arc<dyn StoreBackend>>,
        max_resident: Option<usize>,
        config: Arc<StoreConfigMap>,
    ) -> BusResult<Self> {
        let mut recency = max_resident.map(|_| RecencyTracker::new());
        let mut loaded = Vec::with_capacity(map.len());
        for (label, slot) in map.iter() {
            match slot {
                Slot::Loaded(_) => {
                    if let Some(recency) = recency.as_mut() {
                        recency.touch(label);
                    }
                    loaded.push(true);
                }
                Slot::Deferred if store.is_none() => {
                    return Err(BusError::init(format!(
                        "supplied label {:?} is deferred but no store is defined",
                        label
                    )));
                }
                Slot::Deferred => loaded.push(false),
            }
        }

        let resident = loaded.iter().filter(|l| **l).count();
        if let Some(max) = max_resident {
            if max < resident {
                return Err(BusError::init(format!(
                    "max_resident {} cannot be less than the number of already loaded frames ({})",
                    max, resident
                )));
            }
        }

        Ok(Self {
            map,
            loaded_all: resident == loaded.len(),
            loaded: loaded.into(),
            store,
            recency,
            max_resident,
            config,
        })
    }

    /// Fully loaded bus labelled by each frame's name.
    pub fn from_frames<I>(frames: I) -> BusResult<Self>
    where
        I: IntoIterator<Item = Frame>,
    {
        Self::new(
            SlotMap::from_frames(frames)?,
            None,
            None,
            Arc::new(StoreConfigMap::default()),
        )
    }

    /// Fully deferred bus over every label the store enumerates.
    pub fn from_store(
        store: Arc<dyn StoreBackend>,
        config: StoreConfigMap,
        max_resident: Option<usize>,
    ) -> BusResult<Self> {
        let labels: Vec<String> = store.labels()?.collect();
        debug!(labels = labels.len(), ?max_resident, "building bus from store");
        Self::new(
            SlotMap::deferred(labels)?,
            Some(store),
            max_resident,
            Arc::new(config),
        )
    }

    /// Replace the store configuration used for reads and [`Bus::to_store`].
    pub fn with_config(mut self, config: StoreConfigMap) -> Self {
        self.config = Arc::new(config);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.map = self.map.clone().with_name(name);
        self
    }

    /// Deferred bus over the store selected by `path`'s extension.
    pub fn open(path: &Path, config: &BusConfig) -> BusResult<Self> {
        let store = open_store(path)?;
        Self::from_store(store, config.store.clone(), config.max_resident)
    }

    // ---------------------------------------------------------------------
    // passthroughs

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn name(&self) -> Option<&str> {
        self.map.name()
    }

    pub fn labels(&self) -> &[String] {
        self.map.labels()
    }

    pub fn contains(&self, label: &str) -> bool {
        self.map.index().position(label).is_some()
    }

    pub fn position(&self, label: &str) -> Option<usize> {
        self.map.index().position(label)
    }

    pub fn max_resident(&self) -> Option<usize> {
        self.max_resident
    }

    pub fn store(&self) -> Option<&Arc<dyn StoreBackend>> {
        self.store.as_ref()
    }

    pub fn config(&self) -> &StoreConfigMap {
        &self.config
    }

    /// Residency bitmap, aligned with [`Bus::labels`].
    pub fn loaded(&self) -> &[bool] {
        &self.loaded
    }

    pub fn loaded_all(&self) -> bool {
        self.loaded_all
    }

    pub fn resident_count(&self) -> usize {
        self.loaded.iter().filter(|l| **l).count()
    }

    /// Resident labels in bus order.
    pub fn resident_labels(&self) -> Vec<&str> {
        self.map
            .iter()
            .filter(|(_, slot)| slot.is_loaded())
            .map(|(label, _)| label)
            .collect()
    }

    /// Resident labels from least to most recently used, when a ceiling is set.
    pub fn recency_order(&self) -> Option<Vec<&str>> {
        self.recency.as_ref().map(|r| r.iter().collect())
    }

    /// Current slot map. The returned value never changes; later accesses
    /// publish a new map instead.
    pub fn snapshot(&self) -> SlotMap {
        self.map.clone()
    }

    // ---------------------------------------------------------------------
    // cache management

    fn frames_at(&self, positions: &[usize]) -> Vec<Frame> {
        positions
            .iter()
            .filter_map(|&p| self.map.slot(p).and_then(Slot::frame).cloned())
            .collect()
    }

    /// Make every position in `positions` resident, in order. With `capture`
    /// the frame of each position is returned as it was when touched or
    /// loaded; otherwise nothing is held beyond the resident set, so a frame
    /// evicted mid-batch is freed before the next read. Positions must be in
    /// bounds.
    fn update_cache(&mut self, positions: &[usize], capture: bool) -> StoreResult<Vec<Frame>> {
        let captured = |bus: &Self| {
            if capture {
                bus.frames_at(positions)
            } else {
                Vec::new()
            }
        };

        if self.loaded_all {
            return Ok(captured(&*self));
        }

        let index = self.map.shared_index();
        let labels = index.as_slice();
        if positions.iter().all(|&p| self.loaded[p]) {
            if let Some(recency) = self.recency.as_mut() {
                for &p in positions {
                    recency.touch(&labels[p]);
                    trace!(label = %labels[p], "touched resident frame");
                }
            }
            return Ok(captured(&*self));
        }

        let store = Arc::clone(
            self.store
                .as_ref()
                .expect("bus holds deferred frames without a store"),
        );

        let mut slots: Vec<Slot> = self.map.slots().to_vec();
        // the working copy is the only owner until it is published
        self.map = self.map.with_slots(vec![Slot::Deferred; slots.len()].into());
        let mut loaded: Vec<bool> = self.loaded.to_vec();
        let mut resident = loaded.iter().filter(|l| **l).count();
        let mut frames = Vec::new();
        let mut failure = None;

        for &position in positions {
            let label = &labels[position];

            if loaded[position] {
                if let Some(recency) = self.recency.as_mut() {
                    recency.touch(label);
                    trace!(label = %label, "touched resident frame");
                }
                if capture {
                    if let Some(frame) = slots[position].frame() {
                        frames.push(frame.clone());
                    }
                }
                continue;
            }

            let frame = match store.read(label, self.config.get(label)) {
                Ok(frame) => frame,
                Err(err) => {
                    failure = Some(err);
                    break;
                }
            };
            if capture {
                frames.push(frame.clone());
            }
            slots[position] = Slot::Loaded(frame);
            loaded[position] = true;
            resident += 1;
            debug!(label = %label, resident, "loaded frame from store");

            if let (Some(recency), Some(max)) = (self.recency.as_mut(), self.max_resident) {
                recency.touch(label);
                if resident > max {
                    debug_assert_eq!(resident, max + 1);
                    if let Some(evicted) = recency.pop_oldest() {
                        let idx = index
                            .position(&evicted)
                            .expect("recency tracker holds a label outside the bus");
                        loaded[idx] = false;
                        slots[idx] = Slot::Deferred;
                        resident -= 1;
                        debug!(label = %evicted, resident, max_resident = max, "evicted frame");
                    }
                }
            }
        }

        self.map = self.map.with_slots(slots.into());
        self.loaded = loaded.into();
        self.loaded_all = self.loaded.iter().all(|l| *l);

        match failure {
            Some(err) => Err(err),
            None => Ok(frames),
        }
    }

    fn load_frame(&mut self, position: usize) -> StoreResult<Frame> {
        let frames = self.update_cache(&[position], true)?;
        Ok(frames
            .into_iter()
            .next()
            .expect("cache update yields one frame per position"))
    }

    fn load_one(&mut self, position: usize) -> BusResult<Frame> {
        Ok(self.load_frame(position)?)
    }

    fn check_position(&self, position: usize) -> BusResult<usize> {
        if position < self.len() {
            Ok(position)
        } else {
            Err(BusError::OutOfBounds {
                position,
                len: self.len(),
            })
        }
    }

    fn iloc_positions(&self, key: &ILoc) -> BusResult<Vec<usize>> {
        match key {
            ILoc::Single(p) => Ok(vec![self.check_position(*p)?]),
            ILoc::Range(range) => {
                if range.end > self.len() {
                    return Err(BusError::OutOfBounds {
                        position: range.end,
                        len: self.len(),
                    });
                }
                Ok(range.clone().collect())
            }
            ILoc::Full => Ok((0..self.len()).collect()),
            ILoc::List(positions) => positions
                .iter()
                .map(|p| self.check_position(*p))
                .collect(),
        }
    }

    fn label_position(&self, label: &str) -> BusResult<usize> {
        self.position(label).ok_or_else(|| BusError::KeyNotFound {
            label: label.to_string(),
        })
    }

    fn loc_to_iloc(&self, key: Loc) -> BusResult<ILoc> {
        match key {
            Loc::Label(label) => Ok(ILoc::Single(self.label_position(&label)?)),
            Loc::Range { start, end } => {
                let start = match start {
                    Some(label) => self.label_position(&label)?,
                    None => 0,
                };
                let end = match end {
                    Some(label) => self.label_position(&label)? + 1,
                    None => self.len(),
                };
                Ok(ILoc::Range(start..end.max(start)))
            }
            Loc::List(labels) => Ok(ILoc::List(
                labels
                    .iter()
                    .map(|label| self.label_position(label))
                    .collect::<BusResult<_>>()?,
            )),
        }
    }

    // ---------------------------------------------------------------------
    // extraction

    /// Select by position. A single position yields the frame; anything else
    /// yields a new bus sharing this bus's store, ceiling and config.
    pub fn iloc(&mut self, key: impl Into<ILoc>) -> BusResult<Selected> {
        let key = key.into();
        let positions = self.iloc_positions(&key)?;
        let single = matches!(key, ILoc::Single(_));
        let frames = self.update_cache(&positions, single)?;

        if single {
            let frame = frames
                .into_iter()
                .next()
                .expect("cache update yields one frame per position");
            return Ok(Selected::Frame(frame));
        }

        let map = self.map.take(&positions)?;
        Ok(Selected::Bus(Self::new(
            map,
            self.store.clone(),
            self.max_resident,
            Arc::clone(&self.config),
        )?))
    }

    /// Select by label; resolved to positions and served by [`Bus::iloc`].
    pub fn loc(&mut self, key: impl Into<Loc>) -> BusResult<Selected> {
        let key = self.loc_to_iloc(key.into())?;
        self.iloc(key)
    }

    /// Frame for `label`.
    pub fn frame(&mut self, label: &str) -> BusResult<Frame> {
        let position = self.label_position(label)?;
        self.load_one(position)
    }

    /// Frame at `position`.
    pub fn frame_at(&mut self, position: usize) -> BusResult<Frame> {
        let position = self.check_position(position)?;
        self.load_one(position)
    }

    // ---------------------------------------------------------------------
    // full materialization

    /// Every `(label, frame)` pair, loading as needed.
    pub fn items(&mut self) -> BusResult<Vec<(String, Frame)>> {
        let positions: Vec<usize> = (0..self.len()).collect();
        let frames = self.update_cache(&positions, true)?;
        Ok(self.labels().iter().cloned().zip(frames).collect())
    }

    pub fn values(&mut self) -> BusResult<Vec<Frame>> {
        let positions: Vec<usize> = (0..self.len()).collect();
        Ok(self.update_cache(&positions, true)?)
    }

    /// Lazy `(label, frame)` iterator; each step is one cache update.
    pub fn iter_items(&mut self) -> BusItems<'_> {
        BusItems {
            bus: self,
            position: 0,
        }
    }

    pub fn shapes(&mut self) -> BusResult<Vec<(String, (usize, usize))>> {
        self.iter_items()
            .map(|item| item.map(|(label, frame)| (label, frame.shape())))
            .collect()
    }

    /// Total bytes of every frame.
    pub fn nbytes(&mut self) -> BusResult<usize> {
        self.iter_items()
            .map(|item| item.map(|(_, frame)| frame.nbytes()))
            .sum()
    }

    pub fn dtypes(&mut self) -> BusResult<Vec<(String, Vec<(Vec<String>, DType)>)>> {
        self.iter_items()
            .map(|item| item.map(|(label, frame)| (label, frame.dtypes())))
            .collect()
    }

    /// Same labels in the same order and structurally equal frames.
    pub fn equals(&mut self, other: &mut Bus) -> BusResult<bool> {
        if self.len() != other.len() || self.labels() != other.labels() {
            return Ok(false);
        }
        for position in 0..self.len() {
            let mine = self.load_one(position)?;
            let theirs = other.load_one(position)?;
            if !mine.equals(&theirs) {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Write every frame to `store` under its label. Frames are loaded one
    /// at a time as the store pulls them, so the ceiling holds throughout.
    pub fn to_store(&mut self, store: &dyn StoreBackend) -> BusResult<()> {
        let config = Arc::clone(&self.config);
        let mut items = (0..self.len()).map(|position| -> StoreItem {
            let label = self.map.labels()[position].clone();
            Ok((Some(label), self.load_frame(position)?))
        });
        store.write(&mut items, &config)?;
        Ok(())
    }

    // ---------------------------------------------------------------------
    // residency reports (never load)

    pub fn status(&self) -> Vec<BusStatus> {
        self.map
            .iter()
            .map(|(label, slot)| BusStatus {
                label: label.to_string(),
                loaded: slot.is_loaded(),
                size: slot.frame().map(Frame::size),
                nbytes: slot.frame().map(Frame::nbytes),
                shape: slot.frame().map(Frame::shape),
            })
            .collect()
    }

    /// Column memory locations of each resident frame.
    pub fn mloc(&self) -> Vec<(String, Option<Vec<usize>>)> {
        self.map
            .iter()
            .map(|(label, slot)| (label.to_string(), slot.frame().map(Frame::mloc)))
            .collect()
    }
}

/// Iterator returned by [`Bus::iter_items`].
pub struct BusItems<'a> {
    bus: &'a mut Bus,
    position: usize,
}

impl Iterator for BusItems<'_> {
    type Item = BusResult<(String, Frame)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.position >= self.bus.len() {
            return None;
        }
        let position = self.position;
        self.position += 1;
        let label = self.bus.labels()[position].clone();
        Some(self.bus.load_one(position).map(|frame| (label, frame)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.bus.len().saturating_sub(self.position);
        (remaining, Some(remaining))
    }
}
