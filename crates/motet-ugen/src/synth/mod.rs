//! Synth definitions: the `$` builder and the instances it produces.

mod db;
mod dollar;
mod promise;
#[allow(clippy::module_inception)]
mod synth;

pub use db::UGenDb;
pub use dollar::{Reference, SynthDollar};
pub use promise::{PromiseState, UGenPromise};
pub use synth::{Synth, SynthState};
