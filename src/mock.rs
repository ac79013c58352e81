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

//! In-memory backend implementations for host-side testing and the
//! `eprog-sim` binary: a simulated parallel memory array and a loopback SPI
//! device, plus an in-process byte-queue transport.

extern crate std;

use std::collections::VecDeque;
use std::vec::Vec;

use crate::backend::{ProgrammerBackend, SpiMode, TransportBackend};

/// A flat byte array standing in for parallel EPROM/EEPROM/Flash, plus enough
/// bus-cycle bookkeeping to exercise [`crate::Session`]'s state machine.
pub struct MockProgrammer {
    memory: Vec<u8>,
    address_pin_count: u8,
    minimum_delay_ns: u32,
    supported_bus_mask: u8,
    supported_spi_modes_mask: u8,
    spi_loopback_xor: u8,
    spi_fail: bool,
    init_fail: bool,

    data_output: bool,
    latched_address: u32,
    latched_data: u8,
    ce_high: bool,

    pub init_calls: usize,
    pub init_parallel_calls: usize,
    pub init_spi_calls: usize,
    pub disable_calls: usize,
}

impl MockProgrammer {
    pub fn new(memory_size: usize) -> Self {
        MockProgrammer {
            memory: std::vec![0u8; memory_size],
            address_pin_count: 24,
            minimum_delay_ns: 50,
            supported_bus_mask: crate::bus_mask::PARALLEL | crate::bus_mask::SPI,
            supported_spi_modes_mask: 1 | 2 | 4 | 8,
            spi_loopback_xor: 0xff,
            spi_fail: false,
            init_fail: false,
            data_output: false,
            latched_address: 0,
            latched_data: 0,
            ce_high: true,
            init_calls: 0,
            init_parallel_calls: 0,
            init_spi_calls: 0,
            disable_calls: 0,
        }
    }

    pub fn memory(&self) -> &[u8] {
        &self.memory
    }

    pub fn write_memory(&mut self, addr: usize, data: &[u8]) {
        self.memory[addr..addr + data.len()].copy_from_slice(data);
    }

    pub fn set_minimum_delay_ns(&mut self, ns: u32) {
        self.minimum_delay_ns = ns;
    }

    pub fn set_address_pin_count(&mut self, pins: u8) {
        self.address_pin_count = pins;
    }

    pub fn set_supported_bus_mask(&mut self, mask: u8) {
        self.supported_bus_mask = mask;
    }

    pub fn set_spi_fail(&mut self, fail: bool) {
        self.spi_fail = fail;
    }

    pub fn set_init_fail(&mut self, fail: bool) {
        self.init_fail = fail;
    }
}

/// Always-empty error: [`MockProgrammer`] only ever fails the way tests ask
/// it to, via [`MockProgrammer::set_init_fail`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct MockProgrammerError;

impl ProgrammerBackend for MockProgrammer {
    type Error = MockProgrammerError;

    fn init(&mut self) -> Result<(), Self::Error> {
        self.init_calls += 1;
        if self.init_fail {
            return Err(MockProgrammerError);
        }
        Ok(())
    }

    fn init_parallel(&mut self) -> Result<(), Self::Error> {
        self.init_parallel_calls += 1;
        if self.init_fail {
            return Err(MockProgrammerError);
        }
        Ok(())
    }

    fn init_spi(&mut self) -> Result<(), Self::Error> {
        self.init_spi_calls += 1;
        if self.init_fail {
            return Err(MockProgrammerError);
        }
        Ok(())
    }

    fn disable_io_pins(&mut self) -> Result<(), Self::Error> {
        self.disable_calls += 1;
        if self.init_fail {
            return Err(MockProgrammerError);
        }
        Ok(())
    }

    fn toggle_data_io_mode(&mut self, output: bool) {
        self.data_output = output;
    }

    fn address_pin_count(&self) -> u8 {
        self.address_pin_count
    }

    fn set_address(&mut self, bus_width: u8, address: u32) {
        let mask = if bus_width >= 32 {
            u32::MAX
        } else {
            (1u32 << bus_width) - 1
        };
        self.latched_address = address & mask;
    }

    fn set_data(&mut self, byte: u8) {
        self.latched_data = byte;
    }

    fn get_data(&self) -> u8 {
        self.memory[self.latched_address as usize % self.memory.len()]
    }

    fn toggle_ce(&mut self, high: bool) {
        if self.ce_high && !high && self.data_output {
            let addr = self.latched_address as usize % self.memory.len();
            self.memory[addr] = self.latched_data;
        }
        self.ce_high = high;
    }

    fn toggle_oe(&mut self, _high: bool) {}

    fn toggle_we(&mut self, _high: bool) {}

    fn delay1ns(&mut self, ns: u32) -> bool {
        ns >= self.minimum_delay_ns
    }

    fn minimum_delay_ns(&self) -> u32 {
        self.minimum_delay_ns
    }

    fn supported_bus_mask(&self) -> u8 {
        self.supported_bus_mask
    }

    fn set_spi_clock_freq(&mut self, _hz: u32) -> bool {
        !self.spi_fail
    }

    fn set_spi_mode(&mut self, _mode: SpiMode) -> bool {
        !self.spi_fail
    }

    fn supported_spi_modes_mask(&self) -> u8 {
        self.supported_spi_modes_mask
    }

    fn spi_transmit(&mut self, tx: &[u8], rx: &mut [u8]) -> bool {
        if self.spi_fail {
            return false;
        }
        for (r, t) in rx.iter_mut().zip(tx.iter()) {
            *r = t ^ self.spi_loopback_xor;
        }
        true
    }
}

/// A byte-queue transport: bytes written by the test with [`MockTransport::feed`]
/// are what `get_data` reads; bytes `put_data` writes land in
/// [`MockTransport::written`].
#[derive(Default)]
pub struct MockTransport {
    rx: VecDeque<u8>,
    tx: Vec<u8>,
    pub flush_calls: usize,
}

impl MockTransport {
    pub fn new() -> Self {
        MockTransport::default()
    }

    pub fn feed(&mut self, bytes: &[u8]) {
        self.rx.extend(bytes.iter().copied());
    }

    pub fn written(&self) -> &[u8] {
        &self.tx
    }

    pub fn clear_written(&mut self) {
        self.tx.clear();
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct MockTransportError;

impl TransportBackend for MockTransport {
    type Error = MockTransportError;

    fn get_data(&mut self, buf: &mut [u8]) -> Result<(), Self::Error> {
        if self.rx.len() < buf.len() {
            return Err(MockTransportError);
        }
        for slot in buf.iter_mut() {
            *slot = self.rx.pop_front().expect("length checked above");
        }
        Ok(())
    }

    fn put_data(&mut self, buf: &[u8]) -> Result<(), Self::Error> {
        self.tx.extend_from_slice(buf);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.flush_calls += 1;
        self.rx.clear();
        Ok(())
    }

    fn data_waiting(&self) -> bool {
        !self.rx.is_empty()
    }
}
