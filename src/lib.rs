#![doc = r#"
woz6502: an embeddable MOS 6502 / WDC 65C02 emulator core.

This crate exposes the fetch/decode/execute CPU interpreter, the memory
bus abstraction it consumes, and three memory-mapped peripherals (two
serial adapters, one timer/interface adapter, one file-I/O port). It is
the emulation *core* only — ROM loading, a monitor/REPL, and terminal
provisioning are host/application concerns layered on top.

Modules:
- `cpu`: the `Cpu` façade plus its addressing/decode/execute/dispatch
  internals.
- `bus`: `Bus`, the RAM + device-window + write-protection router the
  CPU reads and writes through.
- `devices`: the `Device` trait and the three concrete peripherals
  (`devices::serial`, `devices::via`, `devices::fileio`).
- `config`: `Variant` (NMOS/CMOS decimal-overflow selector) and
  `CpuConfig`.
- `error`: `CoreError`, the small Rust-API-level error type for
  host-construction misuse (overlapping device windows, inverted
  ranges). Emulated-machine faults never surface this way; see each
  module's docs for their NOP/status-bit/`0xFF` policies instead.
"#]

pub mod bus;
pub mod config;
pub mod cpu;
pub mod devices;
pub mod error;

pub use bus::Bus;
pub use config::{CpuConfig, Variant};
pub use cpu::Cpu;
pub use error::{CoreError, Result};
