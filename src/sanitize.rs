use std::{collections::HashSet, rc::Rc};

use tracing::{debug, trace};

use crate::{utils::NodeId, SanitizeOptions, SchemaRef};

/// What a single sanitize call did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SanitizeStats {
    /// Distinct nodes visited. Every reachable node counts exactly once.
    pub visited: usize,
    pub formats_cleared: usize,
    pub defaults_cleared: usize,
    /// Nodes left untouched because they were borrowed elsewhere during the call.
    pub skipped: usize,
}

/// Makes `root` and everything reachable from it acceptable to the target api, in place, with
/// [`SanitizeOptions::default`]. See [`sanitize_with`].
pub fn sanitize(root: Option<&SchemaRef>) {
    sanitize_with(root, &SanitizeOptions::default());
}

/// Makes `root` and everything reachable from it through `anyOf`, `items`, and `properties`
/// acceptable to the target api, in place:
///
/// * a node with `anyOf` loses its `default`.
/// * a STRING node loses any `format` not in `options.allowed_string_formats`.
///
/// An empty `format` is left alone. Cycles and shared nodes are fine, each distinct node is
/// visited once. Boolean schemas have nothing to sanitize and are skipped. An absent root is a
/// no-op. A node the caller still holds a borrow of cannot be changed, it is skipped together with
/// whatever is only reachable through it, and counted in [`SanitizeStats::skipped`].
pub fn sanitize_with(root: Option<&SchemaRef>, options: &SanitizeOptions) -> SanitizeStats {
    let mut stats = SanitizeStats::default();
    let Some(root) = root else {
        return stats;
    };
    let mut visited = HashSet::new();
    let mut pending = vec![Rc::clone(root)];
    while let Some(node) = pending.pop() {
        // a node queued more than once (cycle or shared child) is only processed the first time
        if !visited.insert(NodeId::of(&node)) {
            continue;
        }
        let Ok(mut schema) = node.try_borrow_mut() else {
            debug!("skipped a schema node that is borrowed elsewhere");
            stats.skipped += 1;
            continue;
        };
        stats.visited += 1;
        if schema.any_of.is_some() && schema.default.take().is_some() {
            trace!("cleared `default` next to `anyOf`");
            stats.defaults_cleared += 1;
        }
        pending.extend(schema.child_schemas().into_iter().rev());
        if !schema.is_string() {
            continue;
        }
        let disallowed = schema
            .format
            .as_deref()
            .is_some_and(|format| !format.is_empty() && !options.is_allowed_format(format));
        if disallowed {
            let format = schema.format.take();
            trace!(?format, "cleared unsupported STRING `format`");
            stats.formats_cleared += 1;
        }
    }
    debug!(
        visited = stats.visited,
        formats_cleared = stats.formats_cleared,
        defaults_cleared = stats.defaults_cleared,
        skipped = stats.skipped,
        "sanitized schema"
    );
    stats
}
