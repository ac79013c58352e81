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

//! Hardware-facing traits the server is generic over.
//!
//! `ProgrammerBackend` and `TransportBackend` are implemented once per
//! board; the protocol engine in [`crate::Session`] never talks to
//! hardware except through these two traits.

/// Which physical bus the session currently has driven, or none.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BusMode {
    NotSet,
    Parallel,
    Spi,
    I2c,
}

impl BusMode {
    /// The wire bitmask bit corresponding to this mode, or `None` for `NotSet`.
    pub fn mask_bit(self) -> Option<u8> {
        match self {
            BusMode::NotSet => None,
            BusMode::Parallel => Some(crate::bus_mask::PARALLEL),
            BusMode::Spi => Some(crate::bus_mask::SPI),
            BusMode::I2c => Some(crate::bus_mask::I2C),
        }
    }
}

/// SPI clock polarity/phase combination, encoded one-hot on the wire.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u8)]
pub enum SpiMode {
    Mode0 = 1,
    Mode1 = 2,
    Mode2 = 4,
    Mode3 = 8,
}

impl SpiMode {
    pub fn from_wire(byte: u8) -> Option<SpiMode> {
        match byte {
            1 => Some(SpiMode::Mode0),
            2 => Some(SpiMode::Mode1),
            4 => Some(SpiMode::Mode2),
            8 => Some(SpiMode::Mode3),
            _ => None,
        }
    }

    pub fn to_wire(self) -> u8 {
        self as u8
    }
}

/// Primitive hardware operations needed to drive a parallel bus and an SPI
/// master. A backend is implemented once per MCU/board; none of its methods
/// know anything about the wire protocol.
pub trait ProgrammerBackend {
    /// What can go wrong bringing up or tearing down the peripheral.
    type Error;

    /// Bring up clocks/peripherals shared by every bus mode.
    fn init(&mut self) -> Result<(), Self::Error>;

    /// Configure GPIOs for the parallel address/data/control lines. May be
    /// called more than once; repeat calls must be safe.
    fn init_parallel(&mut self) -> Result<(), Self::Error>;

    /// Configure the SPI peripheral and its GPIOs. May be called more than
    /// once; repeat calls must be safe.
    fn init_spi(&mut self) -> Result<(), Self::Error>;

    /// Put every IO line the backend owns into a high-impedance state.
    fn disable_io_pins(&mut self) -> Result<(), Self::Error>;

    /// `true` configures the parallel data lines as outputs, `false` as inputs.
    fn toggle_data_io_mode(&mut self, output: bool);

    /// Number of address lines actually wired to this backend.
    fn address_pin_count(&self) -> u8;

    /// Drive the address bus with the lowest `bus_width` bits of `address`.
    fn set_address(&mut self, bus_width: u8, address: u32);

    /// Drive the parallel data bus (only meaningful while configured as output).
    fn set_data(&mut self, byte: u8);

    /// Sample the parallel data bus (only meaningful while configured as input).
    fn get_data(&self) -> u8;

    /// `true` deasserts (drives high), `false` asserts (drives low) — CE/OE/WE
    /// are fixed active-low.
    fn toggle_ce(&mut self, high: bool);
    fn toggle_oe(&mut self, high: bool);
    fn toggle_we(&mut self, high: bool);

    /// Busy-wait at least `ns` nanoseconds. Returns `false` if `ns` is below
    /// [`ProgrammerBackend::minimum_delay_ns`] and the delay could not be honored.
    fn delay1ns(&mut self, ns: u32) -> bool;

    /// Smallest delay, in nanoseconds, this backend can reliably produce.
    fn minimum_delay_ns(&self) -> u32;

    /// Bitmask of [`BusMode`]s this backend supports (`bus_mask::*` bits).
    fn supported_bus_mask(&self) -> u8;

    /// Configure the SPI clock frequency. Returns `false` if unsupported.
    fn set_spi_clock_freq(&mut self, hz: u32) -> bool;

    /// Configure the SPI clock polarity/phase. Returns `false` if unsupported.
    fn set_spi_mode(&mut self, mode: SpiMode) -> bool;

    /// Bitmask of [`SpiMode`]s this backend supports.
    fn supported_spi_modes_mask(&self) -> u8;

    /// Full-duplex SPI exchange: clock out `tx`, sampling exactly `tx.len()`
    /// bytes into `rx`. Returns `false` on backend failure.
    fn spi_transmit(&mut self, tx: &[u8], rx: &mut [u8]) -> bool;
}

/// Blocking byte-stream transport the server reads commands from and writes
/// replies to (UART, USB CDC, a TCP socket on a host-side simulator, ...).
pub trait TransportBackend {
    type Error;

    /// Read exactly `buf.len()` bytes, blocking until they arrive.
    fn get_data(&mut self, buf: &mut [u8]) -> Result<(), Self::Error>;

    /// Write `buf` to the host.
    fn put_data(&mut self, buf: &[u8]) -> Result<(), Self::Error>;

    /// Drain any buffered but unread transport data.
    fn flush(&mut self) -> Result<(), Self::Error>;

    /// Non-blocking probe: is there at least one byte ready to read?
    fn data_waiting(&self) -> bool;
}
