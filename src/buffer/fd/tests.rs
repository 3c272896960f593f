// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use super::*;
use std::{
    io::{ErrorKind, Read, Write},
    os::unix::net::UnixStream,
};

fn pattern(len: usize) -> Vec<u8> {
    (0u8..u8::MAX).cycle().take(len).collect()
}

/// Reads until the peer reports end of file
fn drain(buffer: &mut GrowableBuffer, stream: &UnixStream) {
    loop {
        match buffer.read_from(stream) {
            Ok(len) => assert!(len > 0),
            Err(err) if err.kind() == ErrorKind::UnexpectedEof => break,
            Err(err) => panic!("unexpected error: {err}"),
        }
    }
}

#[test]
fn socket_round_trip_test() {
    let (mut peer, stream) = UnixStream::pair().unwrap();
    let mut buffer = GrowableBuffer::new(8, 16);

    peer.write_all(b"hello").unwrap();

    let len = buffer.read_from(&stream).unwrap();
    assert_eq!(len, 5);
    assert_eq!(buffer.readable(), b"hello");

    buffer.append(b" world");
    let len = buffer.write_to(&stream).unwrap();
    assert_eq!(len, 11);
    assert!(buffer.is_empty());

    let mut echoed = [0u8; 11];
    peer.read_exact(&mut echoed).unwrap();
    assert_eq!(&echoed, b"hello world");
}

#[test]
fn eof_test() {
    let (peer, stream) = UnixStream::pair().unwrap();
    let mut buffer = GrowableBuffer::new(8, 16);
    drop(peer);

    let err = buffer.read_from(&stream).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnexpectedEof);

    // failure leaves the cursors untouched
    assert!(buffer.is_empty());
    assert_eq!(buffer.writable_bytes(), 16);
    assert_eq!(buffer.prependable_bytes(), 0);
}

#[test]
fn would_block_test() {
    let (_peer, stream) = UnixStream::pair().unwrap();
    let mut buffer = GrowableBuffer::new(8, 16);
    stream.set_nonblocking(true).unwrap();

    let err = buffer.read_from(&stream).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::WouldBlock);

    assert!(buffer.is_empty());
    assert_eq!(buffer.writable_bytes(), 16);
}

#[test]
fn scratch_overflow_test() {
    let (mut peer, stream) = UnixStream::pair().unwrap();
    // far less writable space than one read can deliver
    let mut buffer = GrowableBuffer::new(4, 8);

    let data = pattern(100_000);
    let sender = {
        let data = data.clone();
        std::thread::spawn(move || {
            peer.write_all(&data).unwrap();
            // dropping the peer lets the reader observe end of file
        })
    };

    drain(&mut buffer, &stream);
    sender.join().unwrap();

    assert_eq!(buffer.readable_bytes(), data.len());
    assert_eq!(buffer.readable(), &data[..]);
    assert!(buffer.capacity() >= data.len() + buffer.head_reserve());
}

#[test]
fn scratch_disabled_test() {
    let (mut peer, stream) = UnixStream::pair().unwrap();
    // writable space already exceeds the scratch size: single-target read
    let mut buffer = GrowableBuffer::new(8, SCRATCH_LEN + 100);

    peer.write_all(b"ping").unwrap();

    let len = buffer.read_from(&stream).unwrap();
    assert_eq!(len, 4);
    assert_eq!(buffer.readable(), b"ping");
    assert_eq!(buffer.capacity(), 8 + SCRATCH_LEN + 100);
}

#[test]
fn partial_write_test() {
    let (peer, stream) = UnixStream::pair().unwrap();
    stream.set_nonblocking(true).unwrap();

    // stage far more than the socket send buffer will take
    let data = pattern(1 << 20);
    let mut buffer = GrowableBuffer::new(8, 16);
    buffer.append(&data);

    let mut consumed = 0;
    loop {
        match buffer.write_to(&stream) {
            Ok(len) => consumed += len,
            Err(err) if err.kind() == ErrorKind::WouldBlock => break,
            Err(err) => panic!("unexpected error: {err}"),
        }
    }

    // the send buffer filled before everything was staged out; the cursor
    // advanced by exactly the written count and the remainder stays readable
    assert!(consumed < data.len());
    assert_eq!(buffer.readable_bytes(), data.len() - consumed);
    assert_eq!(buffer.readable(), &data[consumed..]);

    drop(peer);
}

#[test]
fn write_nothing_test() {
    let (_peer, stream) = UnixStream::pair().unwrap();
    let mut buffer = GrowableBuffer::new(8, 16);

    let err = buffer.write_to(&stream).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::WriteZero);
    assert!(buffer.is_empty());
}
