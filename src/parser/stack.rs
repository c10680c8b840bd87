//! Stack headroom for parsing.
//!
//! Every parenthesis or call argument re-enters the whole precedence ladder, and the
//! combinator frames are large in unoptimized builds.

const RED_ZONE: usize = 32 * 1024 * 1024; // 32MB
const PARSER_STACK: usize = 64 * 1024 * 1024; // 64MB

/// Run `f` with at least [`RED_ZONE`] bytes of stack, switching to a fresh segment if needed
#[inline]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, PARSER_STACK, f)
}
