//! Generators every default registry carries.

mod arith;
mod audionode;
mod iter;
mod native;
mod number;
mod object;

use crate::registry::UGenRegistry;
use std::sync::Arc;

pub(crate) fn register_builtin_ugens(registry: &UGenRegistry) {
    // =========================================================================
    // Arithmetic
    // =========================================================================

    registry.insert("+", Arc::new(arith::sum));
    registry.insert("*", Arc::new(arith::product));

    // =========================================================================
    // Values
    // =========================================================================

    registry.insert("number", Arc::new(number::number));
    registry.insert("param", Arc::new(number::param));
    registry.insert("audionode", Arc::new(audionode::audionode));

    // =========================================================================
    // Control rate
    // =========================================================================

    registry.insert("iter", Arc::new(iter::iter));
    registry.insert("object", Arc::new(object::object));

    // =========================================================================
    // Native nodes
    // =========================================================================

    let waves = [("sin", "sine"), ("saw", "sawtooth"), ("square", "square"), ("tri", "triangle")];
    for (name, wave) in waves {
        registry.insert(name, native::oscillator(wave));
    }
    for (name, kind) in [("lpf", "lowpass"), ("hpf", "highpass"), ("bpf", "bandpass")] {
        registry.insert(name, native::biquad(kind));
    }
    registry.insert("delay", native::native("DelayNode", native::DELAY));
    registry.insert("comp", native::native("DynamicsCompressorNode", native::COMPRESSOR));
}
