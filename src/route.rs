//! URL-fragment routing
//!
//! The fragment `#/<name>` (or `#<name>`) selects the visibility. Anything
//! else resolves to `all`, and a non-empty unrecognized fragment is cleared.

use crate::filter::Visibility;

/// Result of resolving a fragment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FragmentRoute {
    pub visibility: Visibility,
    /// The host should reset the fragment to empty
    pub clear_fragment: bool,
}

/// Strip the `#` / `#/` prefix, leaving the filter name
pub fn fragment_name(hash: &str) -> &str {
    match hash.strip_prefix('#') {
        Some(rest) => rest.strip_prefix('/').unwrap_or(rest),
        None => hash,
    }
}

/// Derive the visibility from a fragment such as `window.location.hash`
pub fn resolve_fragment(hash: &str) -> FragmentRoute {
    let name = fragment_name(hash);
    match name.parse::<Visibility>() {
        Ok(visibility) => FragmentRoute {
            visibility,
            clear_fragment: false,
        },
        Err(err) => {
            if !hash.is_empty() {
                log::debug!("Normalizing fragment `{}`: {}", hash, err);
            }
            FragmentRoute {
                visibility: Visibility::All,
                clear_fragment: !hash.is_empty(),
            }
        }
    }
}

/// Fragment linking to `visibility`
pub fn fragment_for(visibility: Visibility) -> String {
    format!("#/{}", visibility.as_str())
}
