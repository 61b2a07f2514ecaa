//! Global string interner.
//!
//! Scene paths and task tokens are interned once and compared as integer
//! symbols afterwards.

use std::sync::LazyLock;

use lasso::{Spur, ThreadedRodeo};

static INTERNER: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::new);

/// Compact integer identifier of an interned string.
pub type Symbol = Spur;

/// Interns a string, returning the existing symbol when it is already present.
#[inline]
pub fn intern(s: &str) -> Symbol {
    INTERNER.get_or_intern(s)
}

/// Looks up a string without interning it.
#[inline]
pub fn get(s: &str) -> Option<Symbol> {
    INTERNER.get(s)
}

/// Resolves a symbol back to its string.
#[inline]
pub fn resolve(sym: Symbol) -> &'static str {
    INTERNER.resolve(&sym)
}

/// Pre-interns the render-buffer tokens used by the built-in tasks.
pub fn preload_render_tokens() {
    let tokens = [
        "renderPassState",
        "finalColorTarget",
        "offscreenColorTarget",
        "meshIdTarget",
        "motionVectorsTarget",
        "normalTarget",
        "baseColorTarget",
        "materialDataTarget",
        "iblTarget",
        "depthBuffer",
        "selectionDepthBuffer",
        "closestSelectedLocation0Target",
        "closestSelectedLocation1Target",
    ];

    for token in tokens {
        intern(token);
    }
}
