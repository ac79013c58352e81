// Copyright 2021 lowRISC contributors.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

//! Persistent protocol state and the server tick loop.

use crate::backend::{BusMode, ProgrammerBackend, SpiMode, TransportBackend};
use crate::decode;
use crate::error::TickError;
use crate::opcode::Opcode;
use crate::NAK;

/// All state the command server carries between ticks: the RX/TX buffers
/// and the persistent configuration (bus mode, timings, SPI settings).
///
/// `RX_CAP`/`TX_CAP` must each be at least 9 bytes (the largest fixed
/// command header, `ParallelRead`/`ParallelWrite`'s address+count) — this is
/// enforced at construction, not just documented, via [`Session::new`].
pub struct Session<const RX_CAP: usize, const TX_CAP: usize> {
    pub(crate) rx_buf: [u8; RX_CAP],
    pub(crate) tx_buf: [u8; TX_CAP],
    pub(crate) bus_mode: BusMode,
    pub(crate) address_bus_width: u8,
    pub(crate) address_hold_ns: u32,
    pub(crate) ce_pulse_width_ns: u32,
    pub(crate) spi_mode: SpiMode,
    pub(crate) spi_frequency_hz: u32,
}

impl<const RX_CAP: usize, const TX_CAP: usize> Session<RX_CAP, TX_CAP> {
    /// Build a fresh session. Panics if either buffer capacity is below 9
    /// bytes, the minimum needed to hold a `ParallelRead`/`ParallelWrite`
    /// header.
    pub fn new() -> Self {
        assert!(RX_CAP >= 9, "rx capacity must be at least 9 bytes");
        assert!(TX_CAP >= 9, "tx capacity must be at least 9 bytes");
        Session {
            rx_buf: [0; RX_CAP],
            tx_buf: [0; TX_CAP],
            bus_mode: BusMode::NotSet,
            address_bus_width: 0,
            address_hold_ns: 0,
            ce_pulse_width_ns: 0,
            spi_mode: SpiMode::Mode0,
            spi_frequency_hz: 0,
        }
    }

    pub fn bus_mode(&self) -> BusMode {
        self.bus_mode
    }

    pub fn address_hold_ns(&self) -> u32 {
        self.address_hold_ns
    }

    pub fn ce_pulse_width_ns(&self) -> u32 {
        self.ce_pulse_width_ns
    }

    pub fn spi_frequency_hz(&self) -> u32 {
        self.spi_frequency_hz
    }

    pub fn spi_mode(&self) -> SpiMode {
        self.spi_mode
    }

    /// Run one iteration: probe the transport, decode a frame if one is
    /// waiting, dispatch it, and write the reply back. Returns the number
    /// of reply bytes written (0 if idle).
    pub fn tick<P: ProgrammerBackend, T: TransportBackend>(
        &mut self,
        programmer: &mut P,
        transport: &mut T,
    ) -> Result<usize, TickError<T::Error>> {
        if !transport.data_waiting() {
            log::trace!("tick: idle");
            return Ok(0);
        }

        let reply_len = match decode::decode_frame(&mut self.rx_buf, TX_CAP, transport) {
            Ok(_frame_len) => {
                let opcode = Opcode::from_wire(self.rx_buf[0]).expect("decoder validated opcode");
                let len = self
                    .dispatch(opcode, programmer, transport)
                    .map_err(TickError::Transport)?;
                log::debug!("tick: dispatched {:?}, {} reply bytes", opcode, len);
                len
            }
            Err(TickError::Decode(why)) => {
                log::warn!("tick: frame rejected: {}", why);
                self.tx_buf[0] = NAK;
                1
            }
            Err(err @ TickError::Transport(_)) => return Err(err),
        };

        transport
            .put_data(&self.tx_buf[..reply_len])
            .map_err(TickError::Transport)?;
        Ok(reply_len)
    }

    /// Look up and invoke the handler for `opcode`; returns the reply length.
    fn dispatch<P: ProgrammerBackend, T: TransportBackend>(
        &mut self,
        opcode: Opcode,
        programmer: &mut P,
        transport: &mut T,
    ) -> Result<usize, T::Error> {
        use Opcode::*;
        Ok(match opcode {
            Nop => self.handle_nop(),
            Sync => self.handle_sync(transport)?,
            GetInterfaceVersion => self.handle_get_interface_version(),
            GetMaxRxSize => self.handle_get_max_rx_size(),
            GetMaxTxSize => self.handle_get_max_tx_size(),
            ToggleIo => self.handle_toggle_io(programmer),
            GetSupportedBusTypes => self.handle_get_supported_bus_types(programmer),
            SetAddressBusWidth => self.handle_set_address_bus_width(programmer),
            SetAddressHoldTime => self.handle_set_address_hold_time(),
            SetPulseWidthTime => self.handle_set_pulse_width_time(),
            ParallelRead => self.handle_parallel_read(programmer),
            ParallelWrite => self.handle_parallel_write(programmer),
            SetSpiClockFreq => self.handle_set_spi_clock_freq(programmer),
            SetSpiMode => self.handle_set_spi_mode(programmer),
            GetSupportedSpiModes => self.handle_get_supported_spi_modes(programmer),
            SpiTransmit => self.handle_spi_transmit(programmer),
            GetAddressHoldTime => self.handle_get_address_hold_time(),
            GetPulseWidthTime => self.handle_get_pulse_width_time(),
            GetSpiClockFreq => self.handle_get_spi_clock_freq(),
            GetSpiMode => self.handle_get_spi_mode(),
        })
    }

    /// Ensure the backend is driving `target`. Returns `false` (and leaves
    /// `bus_mode` untouched) if `target` is not in the backend's supported
    /// mask.
    pub(crate) fn ensure_bus_mode<P: ProgrammerBackend>(
        &mut self,
        programmer: &mut P,
        target: BusMode,
    ) -> bool {
        if self.bus_mode == target {
            return true;
        }
        let Some(bit) = target.mask_bit() else {
            return false;
        };
        if programmer.supported_bus_mask() & bit == 0 {
            return false;
        }
        let init_result = match target {
            BusMode::Parallel => programmer.init_parallel(),
            BusMode::Spi => programmer.init_spi(),
            BusMode::I2c | BusMode::NotSet => unreachable!("only Parallel/Spi are switched to"),
        };
        if init_result.is_err() {
            log::warn!("bus mode switch to {:?}: backend init failed", target);
            return false;
        }
        self.bus_mode = target;
        true
    }
}

impl<const RX_CAP: usize, const TX_CAP: usize> Default for Session<RX_CAP, TX_CAP> {
    fn default() -> Self {
        Self::new()
    }
}
