//! Ordered fragment assembly.

use super::types::RenderedFragment;

/// Concatenate fragments in the order given, producing the aggregated
/// composite output.
///
/// Pure and synchronous. No escaping, transformation, or validation happens
/// here; fragments arrive already sanitised by their renderer.
pub fn assemble(fragments: &[RenderedFragment]) -> String {
    let mut output = String::with_capacity(fragments.iter().map(|f| f.html.len()).sum());
    for fragment in fragments {
        output.push_str(&fragment.html);
    }
    output
}
