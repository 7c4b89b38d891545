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

    lib.rs

    PC parallel port register and protocol library.

    Models the Centronics/IEEE-1284 port as addressable 8-bit registers and
    builds the communication layers on top: the SPP compatibility-mode byte
    handshake, EPP/ECP addressed transfers, and per-pin GPIO. All hardware
    access goes through the PortIo backend trait; swap in the simulated
    backend and the whole stack runs against a scripted register file.

*/

pub mod backend;
pub mod bitops;
pub mod config;
pub mod errors;
pub mod gpio;
pub mod handshake;
pub mod io;
pub mod ports;
pub mod regmap;
pub mod registers;

pub use config::PortConfig;
pub use errors::{PortError, Result};
pub use gpio::{
    pins::{DriveMode, Pin, PinName, PinRegister, Pull},
    GpioOptions,
    GpioPort,
};
pub use handshake::StrobeTiming;
pub use io::{PortIo, NO_IO_BYTE};
pub use ports::{EnhancedPort, ExtendedPort, StandardPort};
pub use registers::{CommMode, Direction};
