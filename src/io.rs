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

    io.rs

    The platform I/O backend contract.

    The protocol layer never issues raw OS syscalls; privilege escalation,
    /dev/port plumbing and vendor driver loading all live behind this trait.
    One concrete implementation exists per target platform, selected at
    startup, plus a simulated bus for tests.

*/

use crate::errors::Result;

/// Value returned by a read of an undriven bus.
pub const NO_IO_BYTE: u8 = 0xFF;

/// Byte-level access to the I/O address space.
///
/// All operations are synchronous. A backend handle is expected to be cheap;
/// handles onto shared platform state (e.g. a simulated bus) implement
/// `Clone` so several ports can coexist on one bus.
pub trait PortIo {
    /// Claim exclusive use of `count` consecutive registers starting at
    /// `base`. Fails with [`PortError::Permission`](crate::PortError) if the
    /// platform denies access or any register in the range is already
    /// claimed.
    fn acquire_port_range(&mut self, base: u16, count: u16) -> Result<()>;

    /// Release a range previously claimed with `acquire_port_range`.
    fn release_port_range(&mut self, base: u16, count: u16);

    /// Read one register.
    fn read_byte(&mut self, addr: u16) -> u8;

    /// Write one register.
    fn write_byte(&mut self, addr: u16, value: u8);

    /// Block for at least `us` microseconds on a monotonic clock. Protocol
    /// pulse widths depend on this being a true lower bound.
    fn delay_microseconds(&mut self, us: u16) -> Result<()>;
}
