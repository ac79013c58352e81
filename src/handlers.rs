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

//! Per-opcode command handlers. Each reads its arguments from `self.rx_buf`,
//! mutates session state and/or drives `programmer`, writes a reply into
//! `self.tx_buf`, and returns the reply length.

use byteorder::{ByteOrder, LittleEndian};

use crate::backend::{BusMode, ProgrammerBackend, SpiMode, TransportBackend};
use crate::error::HandlerError;
use crate::session::Session;
use crate::{ACK, INTERFACE_VERSION, NAK};

impl<const RX_CAP: usize, const TX_CAP: usize> Session<RX_CAP, TX_CAP> {
    pub(crate) fn handle_nop(&mut self) -> usize {
        self.tx_buf[0] = ACK;
        1
    }

    pub(crate) fn handle_sync<T: TransportBackend>(
        &mut self,
        transport: &mut T,
    ) -> Result<usize, T::Error> {
        transport.flush()?;
        self.tx_buf[0] = ACK;
        Ok(1)
    }

    pub(crate) fn handle_get_interface_version(&mut self) -> usize {
        self.tx_buf[0] = ACK;
        LittleEndian::write_u16(&mut self.tx_buf[1..3], INTERFACE_VERSION);
        3
    }

    pub(crate) fn handle_get_max_rx_size(&mut self) -> usize {
        self.tx_buf[0] = ACK;
        LittleEndian::write_u32(&mut self.tx_buf[1..5], RX_CAP as u32);
        5
    }

    pub(crate) fn handle_get_max_tx_size(&mut self) -> usize {
        self.tx_buf[0] = ACK;
        LittleEndian::write_u32(&mut self.tx_buf[1..5], TX_CAP as u32);
        5
    }

    pub(crate) fn handle_toggle_io<P: ProgrammerBackend>(&mut self, programmer: &mut P) -> usize {
        let state = self.rx_buf[1];
        let result = if state == 0 {
            programmer.disable_io_pins()
        } else {
            programmer.init()
        };
        if result.is_err() {
            log::warn!("ToggleIO: {}", HandlerError::BackendRejected);
            self.tx_buf[0] = NAK;
            return 1;
        }
        if state == 0 {
            self.bus_mode = BusMode::NotSet;
        }
        self.tx_buf[0] = ACK;
        self.tx_buf[1] = state;
        2
    }

    pub(crate) fn handle_get_supported_bus_types<P: ProgrammerBackend>(
        &mut self,
        programmer: &mut P,
    ) -> usize {
        self.tx_buf[0] = ACK;
        self.tx_buf[1] = programmer.supported_bus_mask();
        2
    }

    pub(crate) fn handle_set_address_bus_width<P: ProgrammerBackend>(
        &mut self,
        programmer: &mut P,
    ) -> usize {
        let width = self.rx_buf[1];
        if width > programmer.address_pin_count() {
            log::warn!("SetAddressBusWidth: {}", HandlerError::AddressBusWidthExceeded);
            self.tx_buf[0] = NAK;
            return 1;
        }
        self.address_bus_width = width;
        self.tx_buf[0] = ACK;
        self.tx_buf[1] = width;
        2
    }

    pub(crate) fn handle_set_address_hold_time(&mut self) -> usize {
        let ns = LittleEndian::read_u32(&self.rx_buf[1..5]);
        if ns == 0 {
            self.tx_buf[0] = NAK;
            return 1;
        }
        self.address_hold_ns = ns;
        self.tx_buf[0] = ACK;
        LittleEndian::write_u32(&mut self.tx_buf[1..5], ns);
        5
    }

    pub(crate) fn handle_set_pulse_width_time(&mut self) -> usize {
        let ns = LittleEndian::read_u32(&self.rx_buf[1..5]);
        if ns == 0 {
            self.tx_buf[0] = NAK;
            return 1;
        }
        self.ce_pulse_width_ns = ns;
        self.tx_buf[0] = ACK;
        LittleEndian::write_u32(&mut self.tx_buf[1..5], ns);
        5
    }

    pub(crate) fn handle_get_address_hold_time(&mut self) -> usize {
        self.tx_buf[0] = ACK;
        LittleEndian::write_u32(&mut self.tx_buf[1..5], self.address_hold_ns);
        5
    }

    pub(crate) fn handle_get_pulse_width_time(&mut self) -> usize {
        self.tx_buf[0] = ACK;
        LittleEndian::write_u32(&mut self.tx_buf[1..5], self.ce_pulse_width_ns);
        5
    }

    pub(crate) fn handle_get_spi_clock_freq(&mut self) -> usize {
        self.tx_buf[0] = ACK;
        LittleEndian::write_u32(&mut self.tx_buf[1..5], self.spi_frequency_hz);
        5
    }

    pub(crate) fn handle_get_spi_mode(&mut self) -> usize {
        self.tx_buf[0] = ACK;
        self.tx_buf[1] = self.spi_mode.to_wire();
        2
    }

    pub(crate) fn handle_parallel_read<P: ProgrammerBackend>(
        &mut self,
        programmer: &mut P,
    ) -> usize {
        if !self.ensure_bus_mode(programmer, BusMode::Parallel) {
            log::warn!("ParallelRead: {}", HandlerError::UnsupportedBusMode);
            self.tx_buf[0] = NAK;
            return 1;
        }
        if self.address_hold_ns < programmer.minimum_delay_ns() {
            log::warn!("ParallelRead: {}", HandlerError::TimingBelowMinimum);
            self.tx_buf[0] = NAK;
            return 1;
        }
        let addr = LittleEndian::read_u32(&self.rx_buf[1..5]);
        let count = LittleEndian::read_u32(&self.rx_buf[5..9]) as usize;

        programmer.toggle_data_io_mode(false);
        programmer.toggle_oe(false);
        programmer.toggle_ce(false);
        for i in 0..count {
            programmer.set_address(self.address_bus_width, addr.wrapping_add(i as u32));
            programmer.delay1ns(self.address_hold_ns);
            self.tx_buf[1 + i] = programmer.get_data();
        }
        programmer.toggle_ce(true);
        programmer.toggle_oe(true);

        self.tx_buf[0] = ACK;
        count + 1
    }

    pub(crate) fn handle_parallel_write<P: ProgrammerBackend>(
        &mut self,
        programmer: &mut P,
    ) -> usize {
        if !self.ensure_bus_mode(programmer, BusMode::Parallel) {
            log::warn!("ParallelWrite: {}", HandlerError::UnsupportedBusMode);
            self.tx_buf[0] = NAK;
            return 1;
        }
        let min_delay = programmer.minimum_delay_ns();
        if self.address_hold_ns < min_delay || self.ce_pulse_width_ns < min_delay {
            log::warn!("ParallelWrite: {}", HandlerError::TimingBelowMinimum);
            self.tx_buf[0] = NAK;
            return 1;
        }
        let addr = LittleEndian::read_u32(&self.rx_buf[1..5]);
        let count = LittleEndian::read_u32(&self.rx_buf[5..9]) as usize;
        let data = &self.rx_buf[9..9 + count];

        programmer.toggle_data_io_mode(true);
        programmer.toggle_oe(true);
        programmer.toggle_we(false);
        for i in 0..count {
            programmer.set_address(self.address_bus_width, addr.wrapping_add(i as u32));
            programmer.set_data(data[i]);
            programmer.delay1ns(self.address_hold_ns);
            programmer.toggle_ce(false);
            programmer.delay1ns(self.ce_pulse_width_ns);
            programmer.toggle_ce(true);
        }
        programmer.toggle_we(true);
        programmer.toggle_data_io_mode(false);

        self.tx_buf[0] = ACK;
        1
    }

    pub(crate) fn handle_set_spi_clock_freq<P: ProgrammerBackend>(
        &mut self,
        programmer: &mut P,
    ) -> usize {
        if !self.ensure_bus_mode(programmer, BusMode::Spi) {
            log::warn!("SetSpiClockFreq: {}", HandlerError::UnsupportedBusMode);
            self.tx_buf[0] = NAK;
            return 1;
        }
        let hz = LittleEndian::read_u32(&self.rx_buf[1..5]);
        if !programmer.set_spi_clock_freq(hz) {
            log::warn!("SetSpiClockFreq: {}", HandlerError::BackendRejected);
            self.tx_buf[0] = NAK;
            return 1;
        }
        self.spi_frequency_hz = hz;
        self.tx_buf[0] = ACK;
        LittleEndian::write_u32(&mut self.tx_buf[1..5], hz);
        5
    }

    pub(crate) fn handle_set_spi_mode<P: ProgrammerBackend>(&mut self, programmer: &mut P) -> usize {
        if !self.ensure_bus_mode(programmer, BusMode::Spi) {
            log::warn!("SetSpiMode: {}", HandlerError::UnsupportedBusMode);
            self.tx_buf[0] = NAK;
            return 1;
        }
        let byte = self.rx_buf[1];
        let Some(mode) = SpiMode::from_wire(byte) else {
            log::warn!("SetSpiMode: unrecognized mode byte 0x{:02x}", byte);
            self.tx_buf[0] = NAK;
            return 1;
        };
        if !programmer.set_spi_mode(mode) {
            log::warn!("SetSpiMode: {}", HandlerError::BackendRejected);
            self.tx_buf[0] = NAK;
            return 1;
        }
        self.spi_mode = mode;
        self.tx_buf[0] = ACK;
        self.tx_buf[1] = byte;
        2
    }

    pub(crate) fn handle_get_supported_spi_modes<P: ProgrammerBackend>(
        &mut self,
        programmer: &mut P,
    ) -> usize {
        self.tx_buf[0] = ACK;
        self.tx_buf[1] = programmer.supported_spi_modes_mask();
        2
    }

    pub(crate) fn handle_spi_transmit<P: ProgrammerBackend>(&mut self, programmer: &mut P) -> usize {
        if !self.ensure_bus_mode(programmer, BusMode::Spi) {
            log::warn!("SpiTransmit: {}", HandlerError::UnsupportedBusMode);
            self.tx_buf[0] = NAK;
            return 1;
        }
        let count = LittleEndian::read_u32(&self.rx_buf[1..5]) as usize;
        let ok = {
            let Session { rx_buf, tx_buf, .. } = self;
            programmer.spi_transmit(&rx_buf[5..5 + count], &mut tx_buf[1..1 + count])
        };
        if !ok {
            log::warn!("SpiTransmit: {}", HandlerError::BackendRejected);
            self.tx_buf[0] = NAK;
            return 1;
        }
        self.tx_buf[0] = ACK;
        count + 1
    }
}
