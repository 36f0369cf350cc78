/*!
devices module: the memory-mapped peripheral state machines reachable
from the Bus (spec.md §3, §4.2-§4.4).

All three concrete devices share one capability trait, `Device`,
grounded on the teacher's `Mapper` trait (`mapper.rs`): a small
interface the Bus can call without knowing the concrete peripheral
behind a window. Unlike `Mapper`, register offsets here are already
relative to the device's own window (the Bus performs the
base-address subtraction before calling in), since none of these
peripherals bank or mirror address ranges the way cartridge hardware
does.
*/

pub mod fileio;
pub mod serial;
pub mod via;

/// Common interface every bus-mapped peripheral implements.
///
/// `addr` passed to `read`/`write` is always the in-window offset (the
/// Bus has already subtracted the window base and applied the window's
/// offset mask), matching spec.md §4.1's dispatch contract.
pub trait Device: Send {
    /// Read a device register. Offsets with no meaningful read return
    /// `0xFF` (spec.md §7: "Device read from null region").
    fn read(&mut self, offset: u16) -> u8;

    /// Write a device register. Offsets with no effect are ignored.
    fn write(&mut self, offset: u16, value: u8);

    /// Advance device-internal state by one tick (spec.md §2: called
    /// once per CPU instruction). Devices with no time-driven behavior
    /// (serial adapter, file-I/O port) accept the default no-op.
    fn tick(&mut self) {}

    /// True iff this device is currently asserting its IRQ line.
    fn irq_pending(&self) -> bool {
        false
    }

    /// Reinitialize device state to its power-up/reset defaults.
    fn reset(&mut self);
}
