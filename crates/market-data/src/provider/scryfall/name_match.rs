//! Card name comparison tolerant of printing variants.
//!
//! Inventory entries often carry the variant in the name ("Sol Ring (Borderless)")
//! while the catalogue reports the plain card name, and double-faced cards
//! may be entered by their front face only.

/// Variant suffixes stripped before comparing names.
const VARIANT_SUFFIXES: &[&str] = &[
    " (borderless)",
    " (showcase)",
    " (extended art)",
    " (retro frame)",
    " (full art)",
    " (alternate art)",
    " (promo)",
    " (foil etched)",
];

/// Returns true if two card names refer to the same card.
pub fn names_match(requested: &str, catalogue: &str) -> bool {
    let a = requested.trim().to_lowercase();
    let b = catalogue.trim().to_lowercase();

    if a == b {
        return true;
    }

    if VARIANT_SUFFIXES
        .iter()
        .any(|suffix| a.replace(suffix, "") == b.replace(suffix, ""))
    {
        return true;
    }

    if a.contains("//") || b.contains("//") {
        return front_face(&a) == front_face(&b);
    }

    false
}

fn front_face(name: &str) -> &str {
    name.split("//").next().unwrap_or(name).trim()
}
