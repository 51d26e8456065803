//! FindCoordinator API (key 10, versions 0-1), usable for group coordinator
//! lookup (`coordinator_type = 0`, the only type this client asks for --
//! transaction coordination is out of scope).
//!
//! ```text
//! FindCoordinatorRequest => GroupId (v0) | CoordinatorKey CoordinatorType (v1)
//! FindCoordinatorResponse => ErrorCode [ErrorMessage (v1)] NodeId Host Port [ThrottleTimeMs (v1)]
//! ```

use protocol::{ApiVersion, Decodable, Encodable, ErrorCode, NodeId, Reader, Writer};
use errors::Result;

pub const COORDINATOR_TYPE_GROUP: i8 = 0;

#[derive(Clone, Debug, PartialEq)]
pub struct FindCoordinatorRequest {
    pub group_id: String,
}

impl Encodable for FindCoordinatorRequest {
    fn encode(&self, api_version: ApiVersion, writer: &mut Writer) {
        writer.write_string(Some(&self.group_id));
        if api_version >= 1 {
            writer.write_i8(COORDINATOR_TYPE_GROUP);
        }
    }
}

#[derive(Clone, Debug, PartialEq, Default)]
pub struct FindCoordinatorResponse {
    pub error_code: ErrorCode,
    pub error_message: Option<String>,
    pub node_id: NodeId,
    pub host: String,
    pub port: i32,
    pub throttle_time_ms: i32,
}

impl Decodable for FindCoordinatorResponse {
    fn decode(api_version: ApiVersion, reader: &mut Reader) -> Result<FindCoordinatorResponse> {
        let throttle_time_ms = if api_version >= 1 { reader.read_i32()? } else { 0 };
        let error_code = reader.read_i16()?;
        let error_message = if api_version >= 1 { reader.read_string()? } else { None };
        let node_id = reader.read_i32()?;
        let host = reader.read_string()?.unwrap_or_default();
        let port = reader.read_i32()?;

        Ok(FindCoordinatorResponse {
               error_code: error_code,
               error_message: error_message,
               node_id: node_id,
               host: host,
               port: port,
               throttle_time_ms: throttle_time_ms,
           })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_v0_omits_coordinator_type() {
        let req = FindCoordinatorRequest { group_id: "g".to_owned() };
        let mut w = Writer::with_capacity(16);
        req.encode(0, &mut w);
        let bytes = w.into_bytes();
        assert_eq!(bytes.len(), 2 + 1); // int16 len + "g"
    }

    #[test]
    fn test_encode_v1_includes_coordinator_type() {
        let req = FindCoordinatorRequest { group_id: "g".to_owned() };
        let mut w = Writer::with_capacity(16);
        req.encode(1, &mut w);
        let bytes = w.into_bytes();
        assert_eq!(bytes.len(), 2 + 1 + 1);
        assert_eq!(*bytes.last().unwrap(), 0);
    }

    #[test]
    fn test_decode_v0_response() {
        let mut w = Writer::with_capacity(32);
        w.write_i16(0);
        w.write_i32(5);
        w.write_string(Some("broker5"));
        w.write_i32(9092);
        let bytes = w.into_bytes();
        let mut r = Reader::new(&bytes);
        let resp = FindCoordinatorResponse::decode(0, &mut r).unwrap();
        assert_eq!(resp.node_id, 5);
        assert_eq!(resp.host, "broker5");
    }
}
