/*!
bus module: address-space routing between RAM, devices, and write
protection (spec.md §4.1).

Modules
- `ranges`: the maintained, non-overlapping/non-adjacent/sorted interval
  list used both for device windows and for write-protected regions.

The public façade (`Bus`) lives directly in this file, following the
teacher's convention of keeping the primary struct's impl in `mod.rs`
and splitting only genuinely separable concerns into submodules.
*/

pub mod ranges;

use crate::devices::Device;
use crate::error::{CoreError, Result};
use ranges::RangeList;

/// One device bound to a half-open `[base, end)` window of the 16-bit
/// address space, along with the mask applied to translate a bus address
/// into the device's own register offset.
struct DeviceWindow {
    base: u16,
    /// Exclusive end, widened to `u32` so a window reaching the top of
    /// the address space (`end_inclusive == 0xFFFF`) can be represented
    /// as `0x10000` without wrapping back to zero.
    end: u32,
    offset_mask: u16,
    device: Box<dyn Device>,
}

impl DeviceWindow {
    fn contains(&self, addr: u16) -> bool {
        let addr = addr as u32;
        addr >= self.base as u32 && addr < self.end
    }

    fn offset(&self, addr: u16) -> u16 {
        (addr - self.base) & self.offset_mask
    }
}

/// The memory bus: a 64 KiB RAM backing store, an ordered set of device
/// windows, and an ordered set of write-protected ranges.
///
/// Bus owns every device uniquely; the CPU never touches RAM or devices
/// except through `read`/`write`/`tick`.
pub struct Bus {
    ram: [u8; 0x10000],
    devices: Vec<DeviceWindow>,
    protected: RangeList,
    verbose_log: bool,
}

impl Default for Bus {
    fn default() -> Self {
        Self::new()
    }
}

impl Bus {
    pub fn new() -> Self {
        Self {
            ram: [0; 0x10000],
            devices: Vec::new(),
            protected: RangeList::new(),
            verbose_log: false,
        }
    }

    /// Enable `log::debug!` diagnostics for dropped protected-range
    /// writes (spec.md §7: "Silently dropped; optional verbose log").
    pub fn set_verbose_log(&mut self, verbose: bool) {
        self.verbose_log = verbose;
    }

    /// Bind a device to `[base, end]` (inclusive, matching spec.md's
    /// scenario notation) with the given offset mask.
    ///
    /// Returns an error if the new window overlaps one already
    /// registered; this is a host programming error, not an emulated
    /// machine condition, so it is the one place this core returns a
    /// `Result`.
    pub fn map_device(
        &mut self,
        base: u16,
        end_inclusive: u16,
        offset_mask: u16,
        device: Box<dyn Device>,
    ) -> Result<()> {
        let end = end_inclusive as u32 + 1;
        for existing in &self.devices {
            if (base as u32) < existing.end && end > existing.base as u32 {
                return Err(CoreError::OverlappingWindow {
                    new_start: base,
                    new_end: end_inclusive,
                    existing_start: existing.base,
                    existing_end: (existing.end - 1) as u16,
                });
            }
        }
        self.devices.push(DeviceWindow {
            base,
            end,
            offset_mask,
            device,
        });
        Ok(())
    }

    fn find_device(&mut self, addr: u16) -> Option<&mut DeviceWindow> {
        self.devices.iter_mut().find(|w| w.contains(addr))
    }

    /// Load raw bytes into RAM starting at `offset`, bypassing write
    /// protection and device windows. The one concession this core makes
    /// to an out-of-scope external ROM loader (spec.md §1, §4.1).
    pub fn load_bytes(&mut self, offset: u16, data: &[u8]) {
        for (i, &b) in data.iter().enumerate() {
            let addr = offset.wrapping_add(i as u16);
            self.ram[addr as usize] = b;
        }
    }

    // -------------------------------------------------------------
    // CPU-visible memory interface
    // -------------------------------------------------------------

    pub fn read(&mut self, addr: u16) -> u8 {
        if let Some(window) = self.find_device(addr) {
            let offset = window.offset(addr);
            return window.device.read(offset);
        }
        self.ram[addr as usize]
    }

    pub fn write(&mut self, addr: u16, value: u8) {
        if let Some(window) = self.find_device(addr) {
            let offset = window.offset(addr);
            window.device.write(offset, value);
            return;
        }
        if self.protected.contains(addr) {
            if self.verbose_log {
                log::debug!("dropped write {value:#04x} to protected address {addr:#06x}");
            }
            return;
        }
        self.ram[addr as usize] = value;
    }

    /// Read a little-endian 16-bit word (used for vector fetches).
    pub fn read_word(&mut self, addr: u16) -> u16 {
        let lo = self.read(addr) as u16;
        let hi = self.read(addr.wrapping_add(1)) as u16;
        (hi << 8) | lo
    }

    /// Advance every device by one tick (spec.md §2: called once per
    /// instruction between CPU steps).
    pub fn tick(&mut self) {
        for window in &mut self.devices {
            window.device.tick();
        }
    }

    /// True iff any mapped device is asserting its IRQ line.
    pub fn device_irq_pending(&self) -> bool {
        self.devices.iter().any(|w| w.device.irq_pending())
    }

    /// Reset bus-owned device state (does not clear RAM or protected
    /// ranges, matching spec.md §3's Bus lifecycle: devices reset, RAM
    /// and protection are host/Bus-level and persist across a CPU reset).
    pub fn reset_devices(&mut self) {
        for window in &mut self.devices {
            window.device.reset();
        }
    }

    // -------------------------------------------------------------
    // Write protection
    // -------------------------------------------------------------

    /// Protect `[start, end]` (inclusive) against CPU-visible RAM writes.
    pub fn add_range(&mut self, start: u16, end: u16) -> Result<()> {
        self.protected.add(start, end)
    }

    /// Remove `[start, end]` (inclusive) from the protected set, splitting
    /// or trimming existing ranges as needed.
    pub fn remove_range(&mut self, start: u16, end: u16) -> Result<()> {
        self.protected.remove(start, end)
    }

    /// The current protected ranges as inclusive `(start, end)` pairs,
    /// sorted and non-overlapping/non-adjacent.
    pub fn protected_ranges(&self) -> Vec<(u16, u16)> {
        self.protected.ranges()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::serial::SerialAdapter;

    #[test]
    fn ram_round_trip() {
        let mut bus = Bus::new();
        bus.write(0x1234, 0xAB);
        assert_eq!(bus.read(0x1234), 0xAB);
    }

    #[test]
    fn protected_write_is_dropped() {
        let mut bus = Bus::new();
        bus.load_bytes(0xE000, &[0x7E]);
        bus.add_range(0xD000, 0xFFFF).unwrap();
        bus.write(0xE000, 0x00);
        assert_eq!(bus.read(0xE000), 0x7E);
    }

    #[test]
    fn device_window_dispatches_instead_of_ram() {
        let mut bus = Bus::new();
        bus.map_device(0xC010, 0xC013, 0x0003, Box::new(SerialAdapter::new()))
            .unwrap();
        bus.write(0xC010, 0x41);
        // DATA write goes to the adapter's output stream, not RAM.
        assert_eq!(bus.ram[0xC010], 0);
    }

    #[test]
    fn device_window_reaching_top_of_address_space_is_reachable() {
        let mut bus = Bus::new();
        bus.map_device(0xFF00, 0xFFFF, 0x00FF, Box::new(SerialAdapter::new()))
            .unwrap();
        bus.write(0xFFFF, 0x41);
        // Reaches the adapter, not RAM, even at the very top of the
        // 16-bit address space.
        assert_eq!(bus.ram[0xFFFF], 0);
    }

    #[test]
    fn overlapping_device_windows_rejected() {
        let mut bus = Bus::new();
        bus.map_device(0xC010, 0xC01F, 0x000F, Box::new(SerialAdapter::new()))
            .unwrap();
        let err = bus
            .map_device(0xC018, 0xC020, 0x000F, Box::new(SerialAdapter::new()))
            .unwrap_err();
        assert!(matches!(err, CoreError::OverlappingWindow { .. }));
    }
}
