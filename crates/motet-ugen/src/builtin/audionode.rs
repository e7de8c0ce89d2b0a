use super::native::is_source;
use crate::error::{Result, UGenError};
use crate::spec::Spec;
use crate::ugen::UGenScope;
use crate::unit::Unit;
use motet_core::Input;

/// An existing native node used as a generator. Inputs are connected into
/// it unless it is a source.
pub(super) fn audionode(scope: &mut UGenScope<'_>, spec: &Spec, inputs: &[Input]) -> Result<Unit> {
    let node = match spec.input("value") {
        Some(Input::Node(node)) => node,
        _ => {
            return Err(UGenError::ConstructionFailed(
                "audionode: `value` is not a node".to_string(),
            ))
        }
    };

    let ctx = scope.ctx();
    if !is_source(ctx.graph(), node) {
        for input in inputs {
            ctx.connect(input.clone(), node);
        }
    }
    Ok(Unit::builder().outlet(node).build())
}
