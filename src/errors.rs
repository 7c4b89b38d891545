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

    errors.rs

    Error taxonomy for the crate.

    Acquisition and configuration failures abort port construction entirely;
    transfer-time conditions (PeripheralBusy) are returned per-operation so
    the caller can pick a per-byte retry policy.

*/

use thiserror::Error;

use crate::{gpio::pins::PinName, registers::Direction};

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, PortError>;

#[derive(Debug, Error, PartialEq)]
pub enum PortError {
    /// The platform refused exclusive access to an I/O register range.
    #[error("access to I/O port range {base:#06X}+{count} was denied")]
    Permission { base: u16, count: u16 },

    /// No usable platform I/O backend on this target.
    #[error("platform I/O backend unavailable: {0}")]
    DriverLoad(String),

    /// The peripheral's BUSY line was asserted when a byte was about to be
    /// strobed. Recoverable; the engine never retries on its own.
    #[error("peripheral reports busy; byte not strobed")]
    PeripheralBusy,

    /// An operation violated a pin or port direction constraint.
    #[error("direction violation: {0}")]
    InvalidDirection(String),

    /// Attempted mutation of a property fixed by the hardware topology.
    #[error("attribute '{attribute}' is fixed by the port hardware")]
    ImmutableAttribute { attribute: &'static str },

    /// Bad address math or conflicting register ranges.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A pin's default direction disagrees with its allowed directions.
    #[error("pin {pin} cannot default to the {direction} direction")]
    InvalidPinConfiguration { pin: PinName, direction: Direction },

    /// The ECR mode field held a reserved bit pattern.
    #[error("reserved ECR communication mode field {0:#05b}")]
    InvalidCommMode(u8),

    /// The pin is already claimed by another user.
    #[error("pin {0} is already in use")]
    PinInUse(PinName),

    /// The platform delay primitive failed.
    #[error("delay primitive failed: {0}")]
    Timing(String),
}
