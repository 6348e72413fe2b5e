use fixed::types::I32F32;

/// Q32.32 fixed-point seconds: 32 integer bits, 32 fractional bits.
///
/// All durations in the simulation (frame deltas, the tick accumulator,
/// button timers) use this type so tick math is bit-exact on every platform.
pub type Seconds = I32F32;

/// Ticks are the atomic unit of simulation time.
pub type Ticks = u64;

/// Convert an f64 to [`Seconds`]. Use only for initialization and test
/// setup, never in the sim loop.
#[inline]
pub fn secs(v: f64) -> Seconds {
    Seconds::from_num(v)
}

/// Convert [`Seconds`] to f64. Use only for display/FFI, never in the
/// sim loop.
#[inline]
pub fn secs_to_f64(v: Seconds) -> f64 {
    v.to_num::<f64>()
}
