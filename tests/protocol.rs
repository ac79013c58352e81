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

//! End-to-end protocol tests driving a [`Session`] against the in-memory
//! mock backends: one command frame in, one reply out.

use eprog_core::mock::{MockProgrammer, MockTransport};
use eprog_core::Session;

const RX_CAP: usize = 64;
const TX_CAP: usize = 64;

fn new_session() -> Session<RX_CAP, TX_CAP> {
    Session::new()
}

fn tick_once<const RX: usize, const TX: usize>(
    session: &mut Session<RX, TX>,
    programmer: &mut MockProgrammer,
    frame: &[u8],
) -> Vec<u8> {
    let mut transport = MockTransport::new();
    transport.feed(frame);
    session
        .tick(programmer, &mut transport)
        .expect("mock transport never errors");
    transport.written().to_vec()
}

#[test]
fn s1_nop() {
    let mut session = new_session();
    let mut programmer = MockProgrammer::new(4096);
    let reply = tick_once(&mut session, &mut programmer, &[0x00]);
    assert_eq!(reply, [0x05]);
}

#[test]
fn s2_get_max_rx_size() {
    let mut session = Session::<1024, 1024>::new();
    let mut programmer = MockProgrammer::new(4096);
    let mut transport = MockTransport::new();
    transport.feed(&[0x03]);
    session.tick(&mut programmer, &mut transport).unwrap();
    assert_eq!(transport.written(), [0x05, 0x00, 0x04, 0x00, 0x00]);
}

#[test]
fn s3_toggle_io_enable() {
    let mut session = new_session();
    let mut programmer = MockProgrammer::new(4096);
    let reply = tick_once(&mut session, &mut programmer, &[0x05, 0x01]);
    assert_eq!(reply, [0x05, 0x01]);
    assert_eq!(programmer.init_calls, 1);
}

#[test]
fn s4_set_address_bus_width_within_limit() {
    let mut session = new_session();
    let mut programmer = MockProgrammer::new(4096);
    let reply = tick_once(&mut session, &mut programmer, &[0x07, 0x0f]);
    assert_eq!(reply, [0x05, 0x0f]);
}

#[test]
fn s5_set_address_bus_width_over_limit() {
    let mut session = new_session();
    let mut programmer = MockProgrammer::new(4096);
    programmer.set_address_pin_count(15);
    let reply = tick_once(&mut session, &mut programmer, &[0x07, 0x20]);
    assert_eq!(reply, [0x06]);
}

#[test]
fn s6_s7_parallel_write_then_read_round_trip() {
    let mut session = new_session();
    let mut programmer = MockProgrammer::new(4096);
    programmer.set_minimum_delay_ns(1);

    tick_once(&mut session, &mut programmer, &[0x07, 0x10]); // SetAddressBusWidth(16)
    tick_once(&mut session, &mut programmer, &[0x08, 0x01, 0x00, 0x00, 0x00]); // SetAddressHoldTime(1)
    tick_once(&mut session, &mut programmer, &[0x09, 0x01, 0x00, 0x00, 0x00]); // SetPulseWidthTime(1)

    let write_frame = [
        0x0b, 0x00, 0x00, 0x00, 0x00, 0x04, 0x00, 0x00, 0x00, 0xab, 0xcd, 0xef, 0x12,
    ];
    let reply = tick_once(&mut session, &mut programmer, &write_frame);
    assert_eq!(reply, [0x05]);
    assert_eq!(&programmer.memory()[0..4], [0xab, 0xcd, 0xef, 0x12]);

    let read_frame = [0x0a, 0x00, 0x00, 0x00, 0x00, 0x04, 0x00, 0x00, 0x00];
    let reply = tick_once(&mut session, &mut programmer, &read_frame);
    assert_eq!(reply, [0x05, 0xab, 0xcd, 0xef, 0x12]);
}

#[test]
fn s8_spi_transmit_reply_length() {
    let mut session = new_session();
    let mut programmer = MockProgrammer::new(4096);
    let frame = [0x0f, 0x04, 0x00, 0x00, 0x00, 0xde, 0xad, 0xbe, 0xef];
    let reply = tick_once(&mut session, &mut programmer, &frame);
    assert_eq!(reply[0], 0x05);
    assert_eq!(reply.len(), 5);
}

#[test]
fn unknown_opcode_is_nak_and_untouches_backend() {
    let mut session = new_session();
    let mut programmer = MockProgrammer::new(4096);
    let reply = tick_once(&mut session, &mut programmer, &[0xfe]);
    assert_eq!(reply, [0x06]);
    assert_eq!(programmer.init_calls, 0);
    assert_eq!(programmer.init_parallel_calls, 0);
}

#[test]
fn oversize_parallel_write_is_rejected_before_touching_backend() {
    let mut session = Session::<16, 16>::new();
    let mut programmer = MockProgrammer::new(4096);
    // count = 100 would need 109 rx bytes against a 16 byte rx_cap.
    let frame = [
        0x0b, 0x00, 0x00, 0x00, 0x00, 100, 0x00, 0x00, 0x00,
    ];
    let mut transport = MockTransport::new();
    transport.feed(&frame);
    session.tick(&mut programmer, &mut transport).unwrap();
    assert_eq!(transport.written(), [0x06]);
    assert_eq!(programmer.init_parallel_calls, 0);
}

#[test]
fn get_max_sizes_report_exact_capacities() {
    let mut session = Session::<37, 41>::new();
    let mut programmer = MockProgrammer::new(4096);
    let rx_reply = tick_once(&mut session, &mut programmer, &[0x03]);
    assert_eq!(u32::from_le_bytes([rx_reply[1], rx_reply[2], rx_reply[3], rx_reply[4]]), 37);
    let tx_reply = tick_once(&mut session, &mut programmer, &[0x04]);
    assert_eq!(u32::from_le_bytes([tx_reply[1], tx_reply[2], tx_reply[3], tx_reply[4]]), 41);
}

#[test]
fn toggle_io_disable_forces_reinit_on_next_parallel_access() {
    let mut session = new_session();
    let mut programmer = MockProgrammer::new(4096);
    programmer.set_minimum_delay_ns(1);

    tick_once(&mut session, &mut programmer, &[0x08, 0x01, 0x00, 0x00, 0x00]);
    tick_once(&mut session, &mut programmer, &[0x09, 0x01, 0x00, 0x00, 0x00]);
    let read_frame = [0x0a, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00];
    tick_once(&mut session, &mut programmer, &read_frame);
    assert_eq!(programmer.init_parallel_calls, 1);

    tick_once(&mut session, &mut programmer, &[0x05, 0x00]); // ToggleIO(0)
    assert_eq!(session.bus_mode(), eprog_core::BusMode::NotSet);

    tick_once(&mut session, &mut programmer, &read_frame);
    assert_eq!(programmer.init_parallel_calls, 2);
}

#[test]
fn parallel_read_below_minimum_delay_naks_without_touching_backend() {
    let mut session = new_session();
    let mut programmer = MockProgrammer::new(4096);
    programmer.set_minimum_delay_ns(1_000);
    // address_hold_ns defaults to 0, well below the backend minimum.
    let read_frame = [0x0a, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00];
    let reply = tick_once(&mut session, &mut programmer, &read_frame);
    assert_eq!(reply, [0x06]);
}

#[test]
fn sync_flushes_transport_and_acks() {
    let mut session = new_session();
    let mut programmer = MockProgrammer::new(4096);
    let mut transport = MockTransport::new();
    transport.feed(&[0x01]);
    session.tick(&mut programmer, &mut transport).unwrap();
    assert_eq!(transport.written(), [0x05]);
    assert_eq!(transport.flush_calls, 1);
}

#[test]
fn spi_mode_round_trips_through_get_and_set() {
    let mut session = new_session();
    let mut programmer = MockProgrammer::new(4096);
    let reply = tick_once(&mut session, &mut programmer, &[0x0d, 0x04]); // SetSpiMode(Mode2)
    assert_eq!(reply, [0x05, 0x04]);

    let reply = tick_once(&mut session, &mut programmer, &[0x12]); // GetSpiClockFreq (unset)
    assert_eq!(reply, [0x05, 0x00, 0x00, 0x00, 0x00]);

    let reply = tick_once(&mut session, &mut programmer, &[0x13]); // GetSpiMode
    assert_eq!(reply, [0x05, 0x04]);
}

#[test]
fn toggle_io_naks_when_backend_init_fails() {
    let mut session = new_session();
    let mut programmer = MockProgrammer::new(4096);
    programmer.set_init_fail(true);
    let reply = tick_once(&mut session, &mut programmer, &[0x05, 0x01]); // ToggleIO(1)
    assert_eq!(reply, [0x06]);
}

#[test]
fn parallel_read_naks_when_backend_mode_switch_fails() {
    let mut session = new_session();
    let mut programmer = MockProgrammer::new(4096);
    programmer.set_minimum_delay_ns(1);
    programmer.set_init_fail(true);
    let read_frame = [0x0a, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00];
    let reply = tick_once(&mut session, &mut programmer, &read_frame);
    assert_eq!(reply, [0x06]);
    assert_eq!(session.bus_mode(), eprog_core::BusMode::NotSet);
}

#[test]
fn huge_declared_count_naks_without_overflow_or_panic() {
    let mut session = Session::<16, 16>::new();
    let mut programmer = MockProgrammer::new(4096);
    // count = u32::MAX: `count + 9` must not wrap around to something
    // smaller than rx_cap and slip past the overflow guard.
    let frame = [
        0x0b, 0x00, 0x00, 0x00, 0x00, 0xff, 0xff, 0xff, 0xff,
    ];
    let mut transport = MockTransport::new();
    transport.feed(&frame);
    session.tick(&mut programmer, &mut transport).unwrap();
    assert_eq!(transport.written(), [0x06]);
    assert_eq!(programmer.init_parallel_calls, 0);
}

#[test]
fn idle_tick_returns_zero_without_touching_transport() {
    let mut session = new_session();
    let mut programmer = MockProgrammer::new(4096);
    let mut transport = MockTransport::new();
    let n = session.tick(&mut programmer, &mut transport).unwrap();
    assert_eq!(n, 0);
    assert!(transport.written().is_empty());
}
