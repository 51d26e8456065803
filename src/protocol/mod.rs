//! Binary encoders and decoders for the Kafka wire protocol.
//!
//! An earlier version of this codec composed `pack()` format strings
//! procedurally and applied them through a nom grammar. That gave poor
//! diagnostics on malformed frames, so this module instead exposes
//! an explicit [`Writer`] that sequentially appends fields to a byte buffer
//! and an explicit [`Reader`] that consumes fields from a slice with a
//! cursor. Every request/response type implements `Encode`/`Decode` in terms
//! of these two primitives.

mod header;
mod message;
mod metadata;
mod produce;
mod fetch;
mod offset;
mod offset_commit;
mod offset_fetch;
mod find_coordinator;
mod sasl_handshake;
mod api_versions;

pub use self::header::{RequestHeader, ResponseHeader};
pub use self::message::{decode_message_set, encode_compressed_message_set, encode_message_set,
                        DecodeOptions, FetchedMessage, Message, MessageSet};
pub use self::metadata::{BrokerMetadata, MetadataRequest, MetadataResponse, PartitionMetadata,
                         TopicMetadata};
pub use self::produce::{ProducePartitionData, ProducePartitionResponse, ProduceRequest, ProduceResponse,
                        ProduceTopicData, ProduceTopicResponse, synthesize_no_ack_response};
pub use self::fetch::{FetchPartition, FetchPartitionData, FetchRequest, FetchResponse, FetchTopic,
                      FetchTopicData, CONSUMER_REPLICA_ID};
pub use self::offset::{OffsetPartition, OffsetPartitionData, OffsetRequest, OffsetResponse,
                       OffsetTopic, OffsetTopicData, EARLIEST_OFFSET_TIME, LATEST_OFFSET_TIME};
pub use self::offset_commit::{OffsetCommitPartition, OffsetCommitRequest, OffsetCommitResponse,
                              OffsetCommitTopic, OffsetCommitTopicResponse, NO_GENERATION};
pub use self::offset_fetch::{OffsetFetchPartitionData, OffsetFetchRequest, OffsetFetchResponse,
                             OffsetFetchTopic, OffsetFetchTopicData};
pub use self::find_coordinator::{FindCoordinatorRequest, FindCoordinatorResponse};
pub use self::sasl_handshake::{plain_auth_bytes, SaslHandshakeRequest, SaslHandshakeResponse,
                               MECHANISM_PLAIN};
pub use self::api_versions::{ApiVersionsRequest, ApiVersionsResponse, SupportedApiVersion};

use std::io::Cursor;
use std::mem;

use byteorder::{BigEndian, ByteOrder, ReadBytesExt, WriteBytesExt};
use bytes::{BufMut, Bytes, BytesMut};

use errors::{ErrorKind, Result};

/// int16 api key identifying a Kafka request type.
pub type ApiKey = i16;
/// int16 selecting the wire format variant for a given `ApiKey`.
pub type ApiVersion = i16;
/// int32 chosen by the client and echoed by the broker.
pub type CorrelationId = i32;
/// int32 shard index of a topic.
pub type PartitionId = i32;
/// int32 id assigned to a broker by the cluster.
pub type NodeId = i32;
/// int64 log position within a partition.
pub type Offset = i64;
/// Milliseconds since the Unix epoch.
pub type Timestamp = i64;
/// int16 error code embedded in a response.
pub type ErrorCode = i16;
/// int32 consumer-group generation id.
pub type GenerationId = i32;

/// The numeric codes that `api_key` can take in a request header. Only the
/// api keys this crate implements are listed; others are out of scope.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(i16)]
pub enum ApiKeys {
    Produce = 0,
    Fetch = 1,
    ListOffsets = 2,
    Metadata = 3,
    OffsetCommit = 8,
    OffsetFetch = 9,
    FindCoordinator = 10,
    SaslHandshake = 17,
    ApiVersions = 18,
}

impl ApiKeys {
    /// Highest api_version this crate can encode/decode for this api_key,
    /// i.e. "max_implemented_by_client" from the broker api-version
    /// negotiation invariant.
    pub fn max_supported_version(&self) -> ApiVersion {
        match *self {
            ApiKeys::Produce => 2,
            ApiKeys::Fetch => 3,
            ApiKeys::ListOffsets => 1,
            ApiKeys::Metadata => 0,
            ApiKeys::OffsetCommit => 1,
            ApiKeys::OffsetFetch => 1,
            ApiKeys::FindCoordinator => 1,
            ApiKeys::SaslHandshake => 0,
            ApiKeys::ApiVersions => 0,
        }
    }
}

/// Fixed sentinel values used by the Offset api and by fetch offsets.
pub const LATEST_OFFSET: i64 = -1;
pub const EARLIEST_OFFSET: i64 = -2;

/// pack64/unpack64: on the host architectures this crate targets, Rust's
/// native `i64` is already a portable 64-bit integer, so the big-integer
/// fallback a 32-bit host would need collapses to these two trivial
/// functions. The abstraction is kept at the call sites so a 32-bit-host
/// backend could be substituted without touching callers.
#[inline]
pub fn pack64(value: i64) -> [u8; 8] {
    let mut buf = [0u8; 8];
    BigEndian::write_i64(&mut buf, value);
    buf
}

#[inline]
pub fn unpack64(bytes: &[u8]) -> i64 {
    BigEndian::read_i64(bytes)
}

/// Writer: sequentially appends primitive fields to a growable buffer using
/// the Kafka wire encoding.
pub struct Writer {
    buf: BytesMut,
}

impl Writer {
    pub fn with_capacity(capacity: usize) -> Writer {
        Writer { buf: BytesMut::with_capacity(capacity) }
    }

    pub fn write_i8(&mut self, v: i8) {
        self.buf.put_i8(v);
    }

    pub fn write_i16(&mut self, v: i16) {
        self.buf.put_i16::<BigEndian>(v);
    }

    pub fn write_i32(&mut self, v: i32) {
        self.buf.put_i32::<BigEndian>(v);
    }

    pub fn write_i64(&mut self, v: i64) {
        self.buf.put_i64::<BigEndian>(v);
    }

    /// string = int16 length + bytes. `None` encodes as length `-1`.
    pub fn write_string(&mut self, v: Option<&str>) {
        match v {
            Some(s) => {
                self.write_i16(s.len() as i16);
                self.buf.put_slice(s.as_bytes());
            }
            None => self.write_i16(-1),
        }
    }

    /// bytes = int32 length + bytes. `None` encodes as length `-1`.
    pub fn write_bytes(&mut self, v: Option<&[u8]>) {
        match v {
            Some(b) => {
                self.write_i32(b.len() as i32);
                self.buf.put_slice(b);
            }
            None => self.write_i32(-1),
        }
    }

    /// Writes an int32-prefixed opaque byte region (used for the MessageSet
    /// embedded in Produce/Fetch, which is framed by content length rather
    /// than element count).
    pub fn write_opaque(&mut self, v: &[u8]) {
        self.write_i32(v.len() as i32);
        self.buf.put_slice(v);
    }

    /// Writes an int32 count followed by `count` repetitions, each produced
    /// by `f`.
    pub fn write_array<T, F>(&mut self, items: &[T], mut f: F)
        where F: FnMut(&mut Writer, &T)
    {
        self.write_i32(items.len() as i32);
        for item in items {
            f(self, item);
        }
    }

    /// Reserves space for a field to be back-patched later (used for the
    /// size/crc header fields in message encoding) and returns its offset.
    pub fn reserve_i32(&mut self) -> usize {
        let offset = self.buf.len();
        self.write_i32(0);
        offset
    }

    pub fn patch_i32(&mut self, offset: usize, v: i32) {
        BigEndian::write_i32(&mut self.buf[offset..offset + 4], v);
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn extend_from_slice(&mut self, bytes: &[u8]) {
        self.buf.put_slice(bytes);
    }

    pub fn into_bytes(self) -> Bytes {
        self.buf.freeze()
    }

    /// Prefixes the buffer with its own length, as every request frame
    /// requires: int32 total-length, exclusive of the length field itself.
    pub fn framed(self) -> Bytes {
        let body = self.buf;
        let mut framed = BytesMut::with_capacity(body.len() + 4);
        framed.put_i32::<BigEndian>(body.len() as i32);
        framed.put_slice(&body);
        framed.freeze()
    }
}

/// Reader: consumes primitive fields from a byte slice via a cursor,
/// reporting malformed frames as `Err(ErrorKind::Codec(..))` instead of
/// panicking.
pub struct Reader<'a> {
    cursor: Cursor<&'a [u8]>,
}

impl<'a> Reader<'a> {
    pub fn new(data: &'a [u8]) -> Reader<'a> {
        Reader { cursor: Cursor::new(data) }
    }

    pub fn remaining(&self) -> usize {
        let pos = self.cursor.position() as usize;
        self.cursor.get_ref().len().saturating_sub(pos)
    }

    pub fn position(&self) -> usize {
        self.cursor.position() as usize
    }

    /// The unread tail of the underlying slice, without advancing the
    /// cursor. Used by partial-message tolerance in Fetch decoding.
    pub fn peek_remaining(&self) -> &'a [u8] {
        let pos = self.cursor.position() as usize;
        &self.cursor.get_ref()[pos..]
    }

    pub fn advance(&mut self, n: usize) {
        let pos = self.cursor.position();
        self.cursor.set_position(pos + n as u64);
    }

    pub fn read_i8(&mut self) -> Result<i8> {
        self.cursor
            .read_i8()
            .map_err(|_| ErrorKind::Codec("truncated frame reading i8").into())
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        self.cursor
            .read_i16::<BigEndian>()
            .map_err(|_| ErrorKind::Codec("truncated frame reading i16").into())
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        self.cursor
            .read_i32::<BigEndian>()
            .map_err(|_| ErrorKind::Codec("truncated frame reading i32").into())
    }

    pub fn read_i64(&mut self) -> Result<i64> {
        self.cursor
            .read_i64::<BigEndian>()
            .map_err(|_| ErrorKind::Codec("truncated frame reading i64").into())
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        if self.remaining() < len {
            bail!(ErrorKind::Codec("truncated frame reading byte region"));
        }
        let pos = self.cursor.position() as usize;
        let slice = &self.cursor.get_ref()[pos..pos + len];
        self.advance(len);
        Ok(slice)
    }

    /// string = int16 length + bytes; length `-1` denotes `None`.
    pub fn read_string(&mut self) -> Result<Option<String>> {
        let len = self.read_i16()?;
        if len < 0 {
            return Ok(None);
        }
        let slice = self.take(len as usize)?;
        let s = ::std::str::from_utf8(slice)
            .map_err(|_| ErrorKind::Codec("string field is not valid utf-8"))?;
        Ok(Some(s.to_owned()))
    }

    /// bytes = int32 length + bytes; length `-1` denotes `None`.
    pub fn read_bytes(&mut self) -> Result<Option<Bytes>> {
        let len = self.read_i32()?;
        if len < 0 {
            return Ok(None);
        }
        let slice = self.take(len as usize)?;
        Ok(Some(Bytes::from(slice)))
    }

    /// The opaque int32-prefixed byte region used by the MessageSet.
    pub fn read_opaque(&mut self) -> Result<&'a [u8]> {
        let len = self.read_i32()?;
        if len < 0 {
            bail!(ErrorKind::Codec("negative length for opaque byte region"));
        }
        self.take(len as usize)
    }

    /// int32 count followed by `count` repetitions of `f`.
    pub fn read_array<T, F>(&mut self, mut f: F) -> Result<Vec<T>>
        where F: FnMut(&mut Reader<'a>) -> Result<T>
    {
        let count = self.read_i32()?;
        if count < 0 {
            return Ok(Vec::new());
        }
        let mut items = Vec::with_capacity(count as usize);
        for _ in 0..count {
            items.push(f(self)?);
        }
        Ok(items)
    }
}

/// Implemented by every request type; `encode` appends the api-specific body
/// after the caller has already written the request header.
pub trait Encodable {
    fn encode(&self, api_version: ApiVersion, writer: &mut Writer);
}

/// Implemented by every response type.
pub trait Decodable: Sized {
    fn decode(api_version: ApiVersion, reader: &mut Reader) -> Result<Self>;

    /// Same decode, but honoring the caller's message-set decode options.
    /// Only `FetchResponse` overrides this -- every other response type has
    /// no embedded message set and just falls back to `decode`.
    fn decode_opts(api_version: ApiVersion, reader: &mut Reader, _opts: DecodeOptions) -> Result<Self> {
        Self::decode(api_version, reader)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_read_string_roundtrip() {
        let mut w = Writer::with_capacity(16);
        w.write_string(Some("mytopic"));
        w.write_string(None);
        let bytes = w.into_bytes();

        let mut r = Reader::new(&bytes);
        assert_eq!(r.read_string().unwrap(), Some("mytopic".to_owned()));
        assert_eq!(r.read_string().unwrap(), None);
    }

    #[test]
    fn test_write_read_bytes_roundtrip() {
        let mut w = Writer::with_capacity(16);
        w.write_bytes(Some(b"hello"));
        w.write_bytes(None);
        let bytes = w.into_bytes();

        let mut r = Reader::new(&bytes);
        assert_eq!(r.read_bytes().unwrap(), Some(Bytes::from(&b"hello"[..])));
        assert_eq!(r.read_bytes().unwrap(), None);
    }

    #[test]
    fn test_framed_length_prefix() {
        let mut w = Writer::with_capacity(16);
        w.write_i32(42);
        let framed = w.framed();

        assert_eq!(BigEndian::read_i32(&framed[0..4]), 4);
        assert_eq!(framed.len() - 4, 4);
    }

    #[test]
    fn test_pack64_preserves_sentinels() {
        assert_eq!(unpack64(&pack64(LATEST_OFFSET)), LATEST_OFFSET);
        assert_eq!(unpack64(&pack64(EARLIEST_OFFSET)), EARLIEST_OFFSET);
    }

    #[test]
    fn test_truncated_frame_is_codec_error() {
        let mut r = Reader::new(&[0, 1]);
        assert!(r.read_i32().is_err());
    }
}
