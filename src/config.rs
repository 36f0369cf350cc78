/*!
config.rs - Configuration options recognized by the core (spec.md §6).

Two knobs only: which chip variant governs decimal-mode overflow, and how
long the host's `tick` hook is allowed to pace itself. Neither needs a
file-based config layer; both are plain constructor arguments.
*/

/// Selects 6502-family variant behavior. The only place this matters in
/// this core is the V flag during decimal-mode ADC/SBC (spec.md §4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Variant {
    /// NMOS MOS 6502: V is forced clear in decimal mode.
    #[default]
    Nmos6502,
    /// WDC 65C02: V follows the binary-mode formula even in decimal mode.
    Cmos65C02,
}

/// Host-tunable execution parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CpuConfig {
    /// Chip variant for decimal-mode overflow semantics.
    pub variant: Variant,
    /// Non-negative host time units the `tick` callback may sleep for
    /// pacing. `0` means no pacing; the core never reads this value
    /// itself, it merely exists so hosts have a stable knob to thread
    /// through their own `tick` implementation.
    pub tick_duration: u64,
}

impl Default for CpuConfig {
    fn default() -> Self {
        Self {
            variant: Variant::default(),
            tick_duration: 0,
        }
    }
}

impl CpuConfig {
    /// The common case: pick a variant, leave `tick_duration` at its
    /// no-pacing default.
    pub fn with_variant(variant: Variant) -> Self {
        Self {
            variant,
            ..Self::default()
        }
    }
}
