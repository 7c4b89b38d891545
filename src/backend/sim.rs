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

    backend/sim.rs

    A simulated I/O bus.

    Registers are a flat byte map; unwritten addresses read as the open-bus
    value. Handles are cheap clones onto one shared bus, so several ports
    can be constructed against the same simulated machine and the claim
    table arbitrates between them exactly as a platform backend would.

    The bus records every read, write and delay in an event log, and can be
    scripted with the two behaviors the protocol layer cares about: a
    control register whose direction bit does not latch (write-only
    hardware) and a peripheral that raises BUSY in response to a data write.

*/

use std::sync::{Arc, Mutex, MutexGuard};

use fxhash::FxHashMap;
use log::{debug, trace};

use crate::{
    errors::{PortError, Result},
    io::{PortIo, NO_IO_BYTE},
    regmap::ranges_overlap,
    registers::CONTROL_DIRECTION,
};

/// One entry in the simulated bus's event log.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SimEvent {
    Read { addr: u16, value: u8 },
    Write { addr: u16, value: u8 },
    Delay { us: u16 },
}

#[derive(Default)]
struct SimBusState {
    registers: FxHashMap<u16, u8>,
    claimed: Vec<(u16, u16)>,
    events: Vec<SimEvent>,
    unidirectional_controls: Vec<u16>,
    busy_links: Vec<(u16, u16)>,
    fail_delays: bool,
}

impl SimBusState {
    fn register(&self, addr: u16) -> u8 {
        self.registers.get(&addr).copied().unwrap_or(NO_IO_BYTE)
    }
}

/// Cloneable handle onto a shared simulated bus.
#[derive(Clone, Default)]
pub struct SimBackend {
    bus: Arc<Mutex<SimBusState>>,
}

impl SimBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, SimBusState> {
        self.bus.lock().expect("sim bus mutex poisoned")
    }

    /// Read a register without logging an event.
    pub fn peek(&self, addr: u16) -> u8 {
        self.state().register(addr)
    }

    /// Set a register without logging an event or triggering behaviors.
    pub fn poke(&self, addr: u16, value: u8) {
        self.state().registers.insert(addr, value);
    }

    /// Snapshot of the event log.
    pub fn events(&self) -> Vec<SimEvent> {
        self.state().events.clone()
    }

    pub fn clear_events(&self) {
        self.state().events.clear();
    }

    /// Currently claimed ranges, as (base, count) pairs.
    pub fn claims(&self) -> Vec<(u16, u16)> {
        self.state().claimed.clone()
    }

    /// Model write-only hardware: the direction bit of the control register
    /// at `control_addr` reads back clear no matter what was written.
    pub fn set_unidirectional(&self, control_addr: u16) {
        self.state().unidirectional_controls.push(control_addr);
    }

    /// Model a peripheral that asserts BUSY as soon as a byte lands on the
    /// data register: any write to `data_addr` drops bit 7 of the status
    /// register at `status_addr`.
    pub fn set_busy_on_data_write(&self, data_addr: u16, status_addr: u16) {
        self.state().busy_links.push((data_addr, status_addr));
    }

    /// Make all subsequent delay requests fail.
    pub fn fail_delays(&self) {
        self.state().fail_delays = true;
    }
}

impl PortIo for SimBackend {
    fn acquire_port_range(&mut self, base: u16, count: u16) -> Result<()> {
        let mut state = self.state();
        if state.claimed.iter().any(|&held| ranges_overlap(held, (base, count))) {
            debug!("SIM: range {:04X}+{} already claimed", base, count);
            return Err(PortError::Permission { base, count });
        }
        state.claimed.push((base, count));
        debug!("SIM: range {:04X}+{} acquired", base, count);
        Ok(())
    }

    fn release_port_range(&mut self, base: u16, count: u16) {
        let mut state = self.state();
        if let Some(idx) = state.claimed.iter().position(|&held| held == (base, count)) {
            state.claimed.swap_remove(idx);
            debug!("SIM: range {:04X}+{} released", base, count);
        }
    }

    fn read_byte(&mut self, addr: u16) -> u8 {
        let mut state = self.state();
        let mut value = state.register(addr);
        if state.unidirectional_controls.contains(&addr) {
            value &= !CONTROL_DIRECTION;
        }
        state.events.push(SimEvent::Read { addr, value });
        trace!("SIM: read {:04X} -> {:02X}", addr, value);
        value
    }

    fn write_byte(&mut self, addr: u16, value: u8) {
        let mut state = self.state();
        state.registers.insert(addr, value);
        state.events.push(SimEvent::Write { addr, value });

        let links: Vec<u16> = state
            .busy_links
            .iter()
            .filter(|&&(data, _)| data == addr)
            .map(|&(_, status)| status)
            .collect();
        for status_addr in links {
            let busy = state.register(status_addr) & 0x7F;
            state.registers.insert(status_addr, busy);
        }
        trace!("SIM: write {:04X} <- {:02X}", addr, value);
    }

    fn delay_microseconds(&mut self, us: u16) -> Result<()> {
        let mut state = self.state();
        if state.fail_delays {
            return Err(PortError::Timing("simulated delay failure".to_string()));
        }
        state.events.push(SimEvent::Delay { us });
        Ok(())
    }
}
