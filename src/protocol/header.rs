use protocol::{ApiKey, ApiVersion, CorrelationId, Reader, Writer};
use errors::Result;

/// Every request frame begins with this header, followed by the
/// api-specific body. The caller (the dispatcher) supplies `api_version`;
/// the codec never chooses it.
#[derive(Clone, Debug, PartialEq)]
pub struct RequestHeader {
    pub api_key: ApiKey,
    pub api_version: ApiVersion,
    pub correlation_id: CorrelationId,
    pub client_id: Option<String>,
}

impl RequestHeader {
    pub fn encode(&self, writer: &mut Writer) {
        writer.write_i16(self.api_key);
        writer.write_i16(self.api_version);
        writer.write_i32(self.correlation_id);
        writer.write_string(self.client_id.as_ref().map(String::as_str));
    }
}

/// Every response frame begins with just the echoed `correlation_id`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResponseHeader {
    pub correlation_id: CorrelationId,
}

impl ResponseHeader {
    pub fn decode(reader: &mut Reader) -> Result<ResponseHeader> {
        Ok(ResponseHeader { correlation_id: reader.read_i32()? })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_request_header() {
        let header = RequestHeader {
            api_key: 18,
            api_version: 0,
            correlation_id: 123,
            client_id: Some("client".to_owned()),
        };

        let mut w = Writer::with_capacity(32);
        header.encode(&mut w);
        let bytes = w.into_bytes();

        assert_eq!(&bytes[..],
                   &[0, 18, 0, 0, 0, 0, 0, 123, 0, 6, b'c', b'l', b'i', b'e', b'n', b't'][..]);
    }

    #[test]
    fn test_decode_response_header() {
        let mut r = Reader::new(&[0, 0, 0, 123]);
        let header = ResponseHeader::decode(&mut r).unwrap();
        assert_eq!(header.correlation_id, 123);
    }
}
