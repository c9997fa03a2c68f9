//! Property-based tests for the transfer session.
//!
//! Every transfer is captured in memory and parsed back through the frame
//! reader and message decoder, the way the device receiver would see it.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::io::Cursor;

use proptest::prelude::*;
use pxelink_frame::{FrameError, FrameReader, FrameWriter};
use pxelink_session::{
    digest, Digest, Message, SessionConfig, TransferSession, MAX_CHUNK_SIZE,
};

fn transfer(image: &[u8], chunk_size: usize) -> Vec<Message> {
    let mut session =
        TransferSession::with_config(FrameWriter::new(Vec::new()), SessionConfig { chunk_size });
    session.transfer("A:\\PROP.PXE", image).expect("transfer should succeed");
    let wire = session.into_inner().into_inner();

    let mut reader = FrameReader::new(Cursor::new(wire));
    let mut messages = Vec::new();
    loop {
        match reader.read_frame() {
            Ok(frame) => messages.push(Message::decode(&frame).expect("message should decode")),
            Err(FrameError::ConnectionClosed) => return messages,
            Err(err) => panic!("bad frame: {err}"),
        }
    }
}

// Property: DATA chunks cover the image exactly once, in order, none empty
proptest! {
    #[test]
    fn prop_chunks_cover_image(
        image in prop::collection::vec(any::<u8>(), 0..2000),
        chunk_size in 1..=MAX_CHUNK_SIZE,
    ) {
        let messages = transfer(&image, chunk_size);
        let mut reassembled = Vec::new();
        for message in &messages[1..messages.len() - 1] {
            match message {
                Message::Data { chunk, .. } => {
                    prop_assert!(!chunk.is_empty());
                    prop_assert!(chunk.len() <= chunk_size);
                    reassembled.extend_from_slice(chunk);
                }
                other => prop_assert!(false, "expected data, got {:?}", other),
            }
        }
        prop_assert_eq!(reassembled, image);
    }
}

// Property: sequence numbers run 0, 1, ..., n+1 with no gaps
proptest! {
    #[test]
    fn prop_sequence_numbers(image in prop::collection::vec(any::<u8>(), 0..2000)) {
        let messages = transfer(&image, MAX_CHUNK_SIZE);
        let expected_data = image.len().div_ceil(MAX_CHUNK_SIZE);
        prop_assert_eq!(messages.len(), expected_data + 2);
        for (i, message) in messages.iter().enumerate() {
            prop_assert_eq!(message.seq() as usize, i);
        }
        let ends_with_end = matches!(messages.last(), Some(Message::End { .. }));
        prop_assert!(ends_with_end);
    }
}

// Property: BEGIN announces the size and the digest of the whole image
proptest! {
    #[test]
    fn prop_begin_announces_image(image in prop::collection::vec(any::<u8>(), 0..2000)) {
        let messages = transfer(&image, MAX_CHUNK_SIZE);
        match &messages[0] {
            Message::Begin { total_size, digest: announced, .. } => {
                prop_assert_eq!(*total_size as usize, image.len());
                prop_assert_eq!(*announced, digest(&image));
            }
            other => prop_assert!(false, "expected begin, got {:?}", other),
        }
    }
}

// Property: accumulating the digest chunk by chunk matches the one-shot digest
proptest! {
    #[test]
    fn prop_incremental_digest(
        image in prop::collection::vec(any::<u8>(), 0..2000),
        chunk_size in 1usize..300,
    ) {
        let mut acc = Digest::new();
        for chunk in image.chunks(chunk_size) {
            acc.update(chunk);
        }
        prop_assert_eq!(acc.value(), digest(&image));
    }
}
