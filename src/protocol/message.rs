//! The message-set format shared by Produce and Fetch: a sequence of
//! messages with offset and size information, used both for on-disk storage
//! on the broker and the on-the-wire format.
//!
//! ```text
//! MessageSet => [Offset MessageSize Message]
//!   Offset => int64
//!   MessageSize => int32
//!
//! v0
//! Message => Crc MagicByte Attributes Key Value
//!   Crc => int32
//!   MagicByte => int8
//!   Attributes => int8
//!   Key => bytes
//!   Value => bytes
//!
//! v1 (since 0.10.0, inserts Timestamp between Attributes and Key)
//! Message => Crc MagicByte Attributes Timestamp Key Value
//! ```

use byteorder::{BigEndian, ByteOrder};
use bytes::Bytes;
use crc::crc32;
use time;

use compression::Compression;
use errors::{KafkaCode, Result};
use protocol::{unpack64, Offset, Reader, Timestamp, Writer};

pub const COMPRESSION_CODEC_MASK: i8 = 0x07;
pub const TIMESTAMP_TYPE_MASK: i8 = 0x08;
const RESERVED_ATTRIBUTE_MASK: i8 = !0x0f;

/// Minimum bytes needed to even read a message's `Offset`+`MessageSize`
/// header before deciding whether the rest of it is present.
const MIN_MESSAGE_HEADER_SIZE: usize = 8 + 4;

/// A client-local error tag for a message whose `attributes` byte set a
/// reserved bit, or selected a compression codec this crate does not know.
/// There is no real Kafka wire error code for this; the broker never
/// rejects its own messages for it.
pub fn error_metadata_attributes() -> KafkaCode {
    KafkaCode::Other(-100)
}

/// A message to be produced. Offsets are meaningless until the broker
/// assigns the real log offset; the producer facade fills in `0` for any
/// message that does not need a specific value.
#[derive(Clone, Debug, PartialEq)]
pub struct Message {
    pub offset: Offset,
    pub timestamp: Option<Timestamp>,
    pub key: Option<Bytes>,
    pub value: Option<Bytes>,
}

#[derive(Clone, Debug, PartialEq, Default)]
pub struct MessageSet {
    pub messages: Vec<Message>,
}

/// A message returned by a Fetch response. Unlike `Message`, this carries
/// the per-partition bookkeeping a Fetch response requires on the decode
/// side: `next_offset`, the partition's `highwater_mark_offset`, and a
/// `valid`/`error` pair instead of a hard parse failure.
#[derive(Clone, Debug, PartialEq)]
pub struct FetchedMessage {
    pub offset: Offset,
    pub next_offset: Offset,
    pub attributes: i8,
    pub timestamp: Option<Timestamp>,
    pub magic: i8,
    pub key: Option<Bytes>,
    pub value: Option<Bytes>,
    pub highwater_mark_offset: Offset,
    pub valid: bool,
    pub error: Option<KafkaCode>,
}

/// Options controlling ambiguous decode behaviour left open by design.
#[derive(Clone, Copy, Debug)]
pub struct DecodeOptions {
    /// When `true` (the source's behaviour), every inner message of a
    /// decompressed batch is re-numbered to the outer message's offset.
    /// When `false`, inner offsets are trusted as absolute (Kafka >= 0.10
    /// batching behaviour).
    pub outer_offset_for_inner_messages: bool,
    /// When `true`, the CRC is recomputed and a mismatch is surfaced as
    /// `valid: false` rather than silently trusted (the broker already
    /// verified it once).
    pub verify_crc: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        DecodeOptions {
            outer_offset_for_inner_messages: true,
            verify_crc: false,
        }
    }
}

fn now_millis() -> Timestamp {
    let ts = time::now_utc().to_timespec();
    ts.sec * 1000 + i64::from(ts.nsec) / 1_000_000
}

/// Encodes one message body (everything the CRC covers: magic byte through
/// the end of value) and appends `offset, message_size, crc, body` to
/// `writer`. `magic` is 0 or 1; `attributes`'s low 3 bits must already carry
/// the compression codec for this message (0 for an uncompressed inner
/// message).
pub fn encode_message(writer: &mut Writer,
                      offset: Offset,
                      magic: i8,
                      attributes: i8,
                      timestamp: Option<Timestamp>,
                      key: Option<&[u8]>,
                      value: Option<&[u8]>) {
    let mut body = Writer::with_capacity(32 + key.map_or(0, |k| k.len()) + value.map_or(0, |v| v.len()));
    body.write_i8(magic);
    body.write_i8(attributes);
    if magic > 0 {
        body.write_i64(timestamp.unwrap_or_else(now_millis));
    }
    body.write_bytes(key);
    body.write_bytes(value);
    let body = body.into_bytes();

    let crc = crc32::checksum_ieee(&body);

    writer.write_i64(offset);
    writer.write_i32(4 + body.len() as i32);
    writer.write_i32(crc as i32);
    writer.extend_from_slice(&body);
}

/// Encodes an uncompressed message set: each message keeps its own offset
/// (the producer facade is responsible for offset assignment).
pub fn encode_message_set(writer: &mut Writer, magic: i8, messages: &[Message]) {
    for message in messages {
        encode_message(writer,
                       message.offset,
                       magic,
                       0,
                       message.timestamp,
                       message.key.as_ref().map(|b| &b[..]),
                       message.value.as_ref().map(|b| &b[..]));
    }
}

/// Encodes a message set under a compression codec: the caller-visible
/// messages are first encoded as an inner uncompressed set, the result is
/// compressed, and a single outer wrapper message carries the compressed
/// bytes as its value. The wrapper's key is the *last* caller-supplied key,
/// matching the source behaviour exactly (cosmetic: brokers ignore it) --
/// see DESIGN.md's open-question decision.
pub fn encode_compressed_message_set(writer: &mut Writer,
                                     magic: i8,
                                     codec: Compression,
                                     messages: &[Message])
                                     -> Result<()> {
    let mut inner = Writer::with_capacity(256);
    for (i, message) in messages.iter().enumerate() {
        encode_message(&mut inner,
                       i as Offset,
                       magic,
                       0,
                       message.timestamp,
                       message.key.as_ref().map(|b| &b[..]),
                       message.value.as_ref().map(|b| &b[..]));
    }
    let compressed = codec.compress(&inner.into_bytes())?;

    let wrapper_key = messages.last().and_then(|m| m.key.as_ref().map(|b| &b[..]));

    encode_message(writer,
                   0,
                   magic,
                   codec as i8 & COMPRESSION_CODEC_MASK,
                   None,
                   wrapper_key,
                   Some(&compressed));
    Ok(())
}

/// Decodes a raw message-set byte region (as returned for one partition in
/// a Fetch response) into the flattened, expanded list of messages a
/// consumer sees. Tolerates a final message truncated by the broker: it
/// stops and discards the trailing fragment instead of raising an error.
pub fn decode_message_set(data: &[u8],
                          highwater_mark_offset: Offset,
                          opts: DecodeOptions)
                          -> Result<Vec<FetchedMessage>> {
    let mut out = Vec::new();
    decode_into(data, highwater_mark_offset, opts, &mut out)?;
    Ok(out)
}

fn decode_into(data: &[u8],
              highwater_mark_offset: Offset,
              opts: DecodeOptions,
              out: &mut Vec<FetchedMessage>)
              -> Result<()> {
    let mut remaining = data;

    while remaining.len() >= MIN_MESSAGE_HEADER_SIZE {
        let offset = unpack64(&remaining[0..8]);
        let size = BigEndian::read_i32(&remaining[8..12]) as usize;

        if remaining.len() < 12 + size || size < 4 {
            // Partial-message tolerance: the broker is allowed to truncate
            // the last message of the set. Stop cleanly rather than error.
            break;
        }

        let declared_crc = BigEndian::read_i32(&remaining[12..16]) as u32;
        let body = &remaining[16..12 + size];
        remaining = &remaining[12 + size..];

        decode_one_message(offset, declared_crc, body, highwater_mark_offset, opts, out)?;
    }

    Ok(())
}

fn decode_one_message(offset: Offset,
                      declared_crc: u32,
                      body: &[u8],
                      highwater_mark_offset: Offset,
                      opts: DecodeOptions,
                      out: &mut Vec<FetchedMessage>)
                      -> Result<()> {
    if opts.verify_crc && crc32::checksum_ieee(body) != declared_crc {
        out.push(FetchedMessage {
                     offset: offset,
                     next_offset: offset + 1,
                     attributes: 0,
                     timestamp: None,
                     magic: 0,
                     key: None,
                     value: None,
                     highwater_mark_offset: highwater_mark_offset,
                     valid: false,
                     error: Some(KafkaCode::CorruptMessage),
                 });
        return Ok(());
    }

    let mut r = Reader::new(body);

    let magic = r.read_i8()?;
    let attributes = r.read_i8()?;
    let timestamp = if magic > 0 { Some(r.read_i64()?) } else { None };
    let key = r.read_bytes()?;
    let value = r.read_bytes()?;

    if attributes & RESERVED_ATTRIBUTE_MASK != 0 || Compression::from_attributes(attributes).is_none() {
        out.push(FetchedMessage {
                     offset: offset,
                     next_offset: offset + 1,
                     attributes: attributes,
                     timestamp: timestamp,
                     magic: magic,
                     key: key,
                     value: value,
                     highwater_mark_offset: highwater_mark_offset,
                     valid: false,
                     error: Some(error_metadata_attributes()),
                 });
        return Ok(());
    }

    let codec = Compression::from_attributes(attributes).unwrap();

    if codec == Compression::None {
        out.push(FetchedMessage {
                     offset: offset,
                     next_offset: offset + 1,
                     attributes: attributes,
                     timestamp: timestamp,
                     magic: magic,
                     key: key,
                     value: value,
                     highwater_mark_offset: highwater_mark_offset,
                     valid: true,
                     error: None,
                 });
        return Ok(());
    }

    // Compressed-message expansion: decompress the value, recursively
    // decode the embedded message set, then re-number (or trust) the inner
    // offsets per `opts`.
    let decompressed = codec.decompress(value.as_ref().map(|b| &b[..]).unwrap_or(&[]))?;

    let start = out.len();
    decode_into(&decompressed, highwater_mark_offset, opts, out)?;

    if opts.outer_offset_for_inner_messages {
        for message in &mut out[start..] {
            message.offset = offset;
            message.next_offset = offset + 1;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode_single(magic: i8, key: Option<&[u8]>, value: Option<&[u8]>) -> Vec<u8> {
        let mut w = Writer::with_capacity(64);
        encode_message(&mut w, 0, magic, 0, Some(1_000), key, value);
        w.into_bytes().to_vec()
    }

    #[test]
    fn test_encode_message_v0_matches_known_wire_bytes() {
        let mut w = Writer::with_capacity(64);
        encode_message(&mut w, 0, 0, 0, None, None, Some(b"Hello!"));
        let bytes = w.into_bytes();

        // offset(8) + size(4) + crc(4) + magic(1) + attrs(1) + key_len(4) + value_len(4) + value(6)
        assert_eq!(bytes.len(), 8 + 4 + 4 + 1 + 1 + 4 + 4 + 6);
        assert_eq!(&bytes[0..8], &[0, 0, 0, 0, 0, 0, 0, 0]); // offset = 0
        assert_eq!(BigEndian::read_i32(&bytes[8..12]), 0x14); // message_size = 20
        assert_eq!(BigEndian::read_i32(&bytes[12..16]) as u32, 0x8dc795a2);
        assert_eq!(bytes[16], 0); // magic
        assert_eq!(bytes[17], 0); // attributes
        assert_eq!(&bytes[18..22], &[0xff, 0xff, 0xff, 0xff]); // key = null
        assert_eq!(BigEndian::read_i32(&bytes[22..26]), 6);
        assert_eq!(&bytes[26..32], b"Hello!");
    }

    #[test]
    fn test_decode_message_set_simple() {
        let bytes = encode_single(0, Some(b"k"), Some(b"v"));
        let messages = decode_message_set(&bytes, 5, DecodeOptions::default()).unwrap();

        assert_eq!(messages.len(), 1);
        assert!(messages[0].valid);
        assert_eq!(messages[0].key.as_ref().map(|b| &b[..]), Some(&b"k"[..]));
        assert_eq!(messages[0].value.as_ref().map(|b| &b[..]), Some(&b"v"[..]));
        assert_eq!(messages[0].highwater_mark_offset, 5);
        assert_eq!(messages[0].next_offset, messages[0].offset + 1);
    }

    #[test]
    fn test_partial_message_is_dropped_not_errored() {
        let mut bytes = encode_single(0, None, Some(b"complete message"));
        // Append a truncated second message: a believable header, but a
        // declared size far larger than what follows.
        let mut w = Writer::with_capacity(16);
        w.write_i64(1);
        w.write_i32(100); // declared message_size
        w.write_i32(0); // only 4 bytes of the declared 100 follow
        bytes.extend_from_slice(&w.into_bytes());

        let messages = decode_message_set(&bytes, 2, DecodeOptions::default()).unwrap();

        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].value.as_ref().map(|b| &b[..]), Some(&b"complete message"[..]));
    }

    #[test]
    fn test_reserved_attribute_bits_marked_invalid_not_dropped() {
        let mut w = Writer::with_capacity(64);
        encode_message(&mut w, 0, 0, 0b1000_0000u8 as i8, None, None, Some(b"x"));
        let bytes = w.into_bytes();

        let messages = decode_message_set(&bytes, 0, DecodeOptions::default()).unwrap();

        assert_eq!(messages.len(), 1);
        assert!(!messages[0].valid);
        assert_eq!(messages[0].error, Some(error_metadata_attributes()));
    }

    #[test]
    fn test_compressed_batch_roundtrip_and_offset_policy() {
        let messages = vec![Message {
                                 offset: 0,
                                 timestamp: None,
                                 key: Some(Bytes::from(&b"k1"[..])),
                                 value: Some(Bytes::from(&b"v1"[..])),
                             },
                             Message {
                                 offset: 0,
                                 timestamp: None,
                                 key: Some(Bytes::from(&b"k2"[..])),
                                 value: Some(Bytes::from(&b"v2"[..])),
                             }];

        let mut w = Writer::with_capacity(256);
        encode_compressed_message_set(&mut w, 0, Compression::Gzip, &messages).unwrap();
        let bytes = w.into_bytes();

        let decoded = decode_message_set(&bytes, 41, DecodeOptions::default()).unwrap();

        assert_eq!(decoded.len(), 2);
        assert_eq!(decoded[0].key.as_ref().map(|b| &b[..]), Some(&b"k1"[..]));
        assert_eq!(decoded[1].key.as_ref().map(|b| &b[..]), Some(&b"k2"[..]));
        // outer_offset_for_inner_messages default: both inner messages take
        // the wrapper's outer offset (0, since the producer has not yet
        // been assigned a real log offset).
        assert_eq!(decoded[0].offset, 0);
        assert_eq!(decoded[1].offset, 0);

        let opts = DecodeOptions { outer_offset_for_inner_messages: false, ..DecodeOptions::default() };
        let decoded_absolute = decode_message_set(&bytes, 41, opts).unwrap();
        assert_eq!(decoded_absolute[0].offset, 0);
        assert_eq!(decoded_absolute[1].offset, 1);
    }
}
