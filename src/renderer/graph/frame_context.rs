//! Frame Context
//!
//! Per-frame publication channel between tasks. A task publishes the ids of
//! the resources it owns under well-known [`FrameKey`]s during `prepare`;
//! later tasks of the same frame read them back without knowing the
//! publisher.
//!
//! The key set is closed; values are a tagged union ([`FrameValue`]).
//! Entries keep first-insertion order.

use smallvec::SmallVec;

use crate::renderer::graph::render_pass_state::SharedRenderPassState;
use crate::scene::TargetId;

/// Well-known frame context keys.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
#[repr(u8)]
pub enum FrameKey {
    RenderPassState,
    FinalColorTarget,
    OffscreenColorTarget,
    MeshIdTarget,
    MotionVectorsTarget,
    NormalTarget,
    BaseColorTarget,
    MaterialDataTarget,
    IblTarget,
    DepthBuffer,
    SelectionDepthBuffer,
    ClosestSelectedLocation0Target,
    ClosestSelectedLocation1Target,
}

impl FrameKey {
    /// Bumped whenever a key is added, removed, or changes meaning.
    #[cfg(test)]
    const VERSION: u32 = 1;

    pub const COUNT: usize = 13;

    pub const ALL: [Self; Self::COUNT] = [
        Self::RenderPassState,
        Self::FinalColorTarget,
        Self::OffscreenColorTarget,
        Self::MeshIdTarget,
        Self::MotionVectorsTarget,
        Self::NormalTarget,
        Self::BaseColorTarget,
        Self::MaterialDataTarget,
        Self::IblTarget,
        Self::DepthBuffer,
        Self::SelectionDepthBuffer,
        Self::ClosestSelectedLocation0Target,
        Self::ClosestSelectedLocation1Target,
    ];

    #[must_use]
    pub fn token(self) -> &'static str {
        match self {
            Self::RenderPassState => "renderPassState",
            Self::FinalColorTarget => "finalColorTarget",
            Self::OffscreenColorTarget => "offscreenColorTarget",
            Self::MeshIdTarget => "meshIdTarget",
            Self::MotionVectorsTarget => "motionVectorsTarget",
            Self::NormalTarget => "normalTarget",
            Self::BaseColorTarget => "baseColorTarget",
            Self::MaterialDataTarget => "materialDataTarget",
            Self::IblTarget => "iblTarget",
            Self::DepthBuffer => "depthBuffer",
            Self::SelectionDepthBuffer => "selectionDepthBuffer",
            Self::ClosestSelectedLocation0Target => "closestSelectedLocation0Target",
            Self::ClosestSelectedLocation1Target => "closestSelectedLocation1Target",
        }
    }

    #[cfg(test)]
    fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.token() == token)
    }

    #[inline]
    fn index(self) -> usize {
        self as usize
    }
}

/// Value stored under a [`FrameKey`].
#[derive(Clone, Debug)]
pub enum FrameValue {
    RenderPassState(SharedRenderPassState),
    Target(TargetId),
}

#[derive(Debug)]
pub struct FrameContext {
    values: [Option<FrameValue>; FrameKey::COUNT],
    order: SmallVec<[FrameKey; FrameKey::COUNT]>,
}

impl Default for FrameContext {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameContext {
    #[must_use]
    pub fn new() -> Self {
        Self {
            values: std::array::from_fn(|_| None),
            order: SmallVec::new(),
        }
    }

    /// Stores `value` under `key`, replacing any previous value.
    pub fn insert(&mut self, key: FrameKey, value: FrameValue) {
        let slot = &mut self.values[key.index()];
        if slot.is_none() {
            self.order.push(key);
        }
        *slot = Some(value);
    }

    pub fn publish_target(&mut self, key: FrameKey, id: TargetId) {
        self.insert(key, FrameValue::Target(id));
    }

    pub fn publish_render_pass_state(&mut self, state: SharedRenderPassState) {
        self.insert(FrameKey::RenderPassState, FrameValue::RenderPassState(state));
    }

    #[inline]
    #[must_use]
    pub fn get(&self, key: FrameKey) -> Option<&FrameValue> {
        self.values[key.index()].as_ref()
    }

    #[must_use]
    pub fn contains(&self, key: FrameKey) -> bool {
        self.values[key.index()].is_some()
    }

    /// The target id published under `key`, if the entry holds one.
    #[must_use]
    pub fn target(&self, key: FrameKey) -> Option<TargetId> {
        match self.get(key) {
            Some(FrameValue::Target(id)) => Some(*id),
            _ => None,
        }
    }

    #[must_use]
    pub fn render_pass_state(&self) -> Option<SharedRenderPassState> {
        match self.get(FrameKey::RenderPassState) {
            Some(FrameValue::RenderPassState(state)) => Some(state.clone()),
            _ => None,
        }
    }

    /// Entries in first-insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (FrameKey, &FrameValue)> {
        self.order
            .iter()
            .filter_map(|&key| self.values[key.index()].as_ref().map(|v| (key, v)))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Drops every entry; called at the start of each frame.
    pub fn clear(&mut self) {
        self.values = std::array::from_fn(|_| None);
        self.order.clear();
    }
}
