use crate::error::{Result, UGenError};
use crate::spec::Spec;
use crate::ugen::UGenScope;
use crate::unit::Unit;
use motet_core::util::finite;
use motet_core::{Input, Param};

/// A constant backed by a param. `setValue` steps it at the call's time.
pub(super) fn number(scope: &mut UGenScope<'_>, spec: &Spec, inputs: &[Input]) -> Result<Unit> {
    let value = finite(spec.f64_or("value", 0.0));
    let ctx = scope.ctx();
    let param = Param::new(ctx, value, spec.param_config());
    let outlet = param.to_node(ctx, inputs);

    Ok(Unit::builder()
        .outlet(outlet)
        .method("setValue", move |ctx, call| {
            if let Some(value) = call.value.as_ref().and_then(|v| v.as_f64()) {
                param.set_value_at_time(ctx, value, call.playback_time);
            }
        })
        .build())
}

/// An existing param used as a generator.
pub(super) fn param(scope: &mut UGenScope<'_>, spec: &Spec, inputs: &[Input]) -> Result<Unit> {
    let param = match spec.input("value") {
        Some(Input::Param(param)) => param,
        _ => {
            return Err(UGenError::ConstructionFailed(
                "param: `value` is not a param".to_string(),
            ))
        }
    };
    let outlet = param.to_node(scope.ctx(), inputs);
    Ok(Unit::builder().outlet(outlet).build())
}
