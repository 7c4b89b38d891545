/*
    parport

    Copyright 2025 the parport authors

    Permission is hereby granted, free of charge, to any person obtaining a
    copy of this software and associated documentation files (the "Software"),
    to deal in the Software without restriction, including without limitation
    the rights to use, copy, modify, merge, publish, distribute, sublicense,
    and/or sell copies of the Software, and to permit persons to whom the
    Software is furnished to do so, subject to the following conditions:

    The above copyright notice and this permission notice shall be included in
    all copies or substantial portions of the Software.

    THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
    IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
    FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
    AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
    LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING
    FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER
    DEALINGS IN THE SOFTWARE.

    --------------------------------------------------------------------------

    backend/direct.rs

    Backend using the x86 `in`/`out` instructions directly.

    Only usable by a process that already holds I/O privilege for the
    claimed registers (iopl/ioperm on Linux, or ring 0); that acquisition is
    the caller's responsibility and is attested by the unsafe `open`.
    Range claims are tracked in a process-global table since the registers
    themselves are machine-global.

*/

use std::{thread, time::Duration};

use lazy_static::lazy_static;
use log::debug;
use std::sync::Mutex;
use web_time::Instant;

use crate::{
    errors::{PortError, Result},
    io::PortIo,
    regmap::ranges_overlap,
};
#[cfg(not(any(target_arch = "x86", target_arch = "x86_64")))]
use crate::io::NO_IO_BYTE;

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
mod port_access {
    use core::arch::asm;

    #[inline]
    pub unsafe fn inb(port: u16) -> u8 {
        let value: u8;
        asm!(
            "in al, dx",
            out("al") value,
            in("dx") port,
            options(nomem, nostack, preserves_flags)
        );
        value
    }

    #[inline]
    pub unsafe fn outb(port: u16, value: u8) {
        asm!(
            "out dx, al",
            in("dx") port,
            in("al") value,
            options(nomem, nostack, preserves_flags)
        );
    }
}

lazy_static! {
    static ref CLAIMED: Mutex<Vec<(u16, u16)>> = Mutex::new(Vec::new());
}

/// Direct port instruction backend. One instance per port object; all
/// instances share the process-global claim table.
pub struct DirectIo {
    // Ranges this instance acquired, so drop-less misuse can't leak claims
    // owned by other instances.
    held: Vec<(u16, u16)>,
}

impl DirectIo {
    /// Open the direct instruction backend.
    ///
    /// # Safety
    ///
    /// The caller must already hold I/O privilege for every register it
    /// will claim; executing `in`/`out` without it faults the process.
    pub unsafe fn open() -> Result<Self> {
        if cfg!(any(target_arch = "x86", target_arch = "x86_64")) {
            Ok(Self { held: Vec::new() })
        }
        else {
            Err(PortError::DriverLoad(
                "port I/O instructions are not available on this architecture".to_string(),
            ))
        }
    }
}

impl PortIo for DirectIo {
    fn acquire_port_range(&mut self, base: u16, count: u16) -> Result<()> {
        let mut claimed = CLAIMED.lock().expect("direct I/O claim table poisoned");
        if claimed.iter().any(|&held| ranges_overlap(held, (base, count))) {
            return Err(PortError::Permission { base, count });
        }
        claimed.push((base, count));
        self.held.push((base, count));
        debug!("DirectIo: range {:04X}+{} acquired", base, count);
        Ok(())
    }

    fn release_port_range(&mut self, base: u16, count: u16) {
        let mut claimed = CLAIMED.lock().expect("direct I/O claim table poisoned");
        if let Some(idx) = claimed.iter().position(|&held| held == (base, count)) {
            claimed.swap_remove(idx);
        }
        if let Some(idx) = self.held.iter().position(|&held| held == (base, count)) {
            self.held.swap_remove(idx);
        }
        debug!("DirectIo: range {:04X}+{} released", base, count);
    }

    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
    fn read_byte(&mut self, addr: u16) -> u8 {
        // Privilege was attested at open().
        unsafe { port_access::inb(addr) }
    }

    #[cfg(not(any(target_arch = "x86", target_arch = "x86_64")))]
    fn read_byte(&mut self, _addr: u16) -> u8 {
        NO_IO_BYTE
    }

    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
    fn write_byte(&mut self, addr: u16, value: u8) {
        unsafe { port_access::outb(addr, value) }
    }

    #[cfg(not(any(target_arch = "x86", target_arch = "x86_64")))]
    fn write_byte(&mut self, _addr: u16, _value: u8) {}

    fn delay_microseconds(&mut self, us: u16) -> Result<()> {
        let deadline = Instant::now() + Duration::from_micros(us as u64);
        // Sleep through the bulk of a long delay, spin out the tail for
        // sub-millisecond accuracy.
        if us >= 1_000 {
            thread::sleep(Duration::from_micros(us as u64 - 500));
        }
        while Instant::now() < deadline {
            std::hint::spin_loop();
        }
        Ok(())
    }
}

impl Drop for DirectIo {
    fn drop(&mut self) {
        let mut claimed = CLAIMED.lock().expect("direct I/O claim table poisoned");
        for held in self.held.drain(..) {
            if let Some(idx) = claimed.iter().position(|&c| c == held) {
                claimed.swap_remove(idx);
            }
        }
    }
}
