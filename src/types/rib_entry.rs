use ndn_mgmt_common::{
    ndn::Name,
    tlv::{TlvDecoder, TlvEncoder},
    Result,
};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{decode_repeated, tlv_type, RouteFlags, RouteOrigin, TlvRecord};

/// A route registered in the RIB.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    pub face_id: u64,
    pub origin: u64,
    pub cost: u64,
    pub flags: u64,
    /// Milliseconds; `None` never expires
    pub expiration_period: Option<u64>,
}

impl Route {
    pub fn new(face_id: u64, origin: RouteOrigin, cost: u64) -> Self {
        Self {
            face_id,
            origin: origin.code(),
            cost,
            ..Self::default()
        }
    }

    pub fn with_flags(mut self, flags: RouteFlags) -> Self {
        self.flags = flags.bits();
        self
    }

    pub fn with_expiration_period(mut self, expiration_period_ms: u64) -> Self {
        self.expiration_period = Some(expiration_period_ms);
        self
    }

    pub fn has_infinite_expiration_period(&self) -> bool {
        self.expiration_period.is_none()
    }

    pub fn route_origin(&self) -> RouteOrigin {
        RouteOrigin::from_code(self.origin)
    }

    pub fn route_flags(&self) -> RouteFlags {
        RouteFlags::from_bits_truncate(self.flags)
    }
}

impl TlvRecord for Route {
    fn encode(&self, encoder: &mut TlvEncoder) {
        encoder.write_nested(tlv_type::ROUTE, |enc| {
            enc.write_optional_non_negative_integer_tlv(
                tlv_type::EXPIRATION_PERIOD,
                self.expiration_period,
            );
            enc.write_non_negative_integer_tlv(tlv_type::FLAGS, self.flags);
            enc.write_non_negative_integer_tlv(tlv_type::COST, self.cost);
            enc.write_non_negative_integer_tlv(tlv_type::ORIGIN, self.origin);
            enc.write_non_negative_integer_tlv(tlv_type::FACE_ID, self.face_id);
        });
    }

    fn decode(decoder: &mut TlvDecoder<'_>) -> Result<Self> {
        let end = decoder.read_nested_tlvs_start(tlv_type::ROUTE)?;
        let route = Self {
            face_id: decoder.read_non_negative_integer_tlv(tlv_type::FACE_ID)?,
            origin: decoder.read_non_negative_integer_tlv(tlv_type::ORIGIN)?,
            cost: decoder.read_non_negative_integer_tlv(tlv_type::COST)?,
            flags: decoder.read_non_negative_integer_tlv(tlv_type::FLAGS)?,
            expiration_period: decoder
                .read_optional_non_negative_integer_tlv(tlv_type::EXPIRATION_PERIOD, end)?,
        };
        decoder.finish_nested_tlvs(end)?;
        Ok(route)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Route(FaceId: {}, Origin: {}, Cost: {}, Flags: {}, ",
            self.face_id, self.origin, self.cost, self.flags
        )?;
        match self.expiration_period {
            Some(ms) => write!(f, "ExpirationPeriod: {} milliseconds)", ms),
            None => write!(f, "ExpirationPeriod: Infinity)"),
        }
    }
}

/// One entry of the `rib/list` dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RibEntry {
    pub name: Name,
    pub routes: Vec<Route>,
}

impl RibEntry {
    pub fn new(name: Name) -> Self {
        Self {
            name,
            routes: Vec::new(),
        }
    }

    pub fn with_route(mut self, route: Route) -> Self {
        self.routes.push(route);
        self
    }
}

impl TlvRecord for RibEntry {
    fn encode(&self, encoder: &mut TlvEncoder) {
        encoder.write_nested(tlv_type::RIB_ENTRY, |enc| {
            for route in self.routes.iter().rev() {
                route.encode(enc);
            }
            self.name.encode(enc);
        });
    }

    fn decode(decoder: &mut TlvDecoder<'_>) -> Result<Self> {
        let end = decoder.read_nested_tlvs_start(tlv_type::RIB_ENTRY)?;
        let name = Name::decode(decoder)?;
        let routes = decode_repeated(decoder, tlv_type::ROUTE, end)?;
        decoder.finish_nested_tlvs(end)?;
        Ok(Self { name, routes })
    }
}

impl fmt::Display for RibEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "RibEntry{{")?;
        writeln!(f, "  Name: {}", self.name)?;
        for route in &self.routes {
            writeln!(f, "  {}", route)?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROUTE: &[u8] = &[
        0x81, 0x10, 0x69, 0x01, 0x01, 0x6f, 0x01, 0x80, 0x6a, 0x01, 0x64, 0x6c, 0x01, 0x02, 0x6d,
        0x02, 0x27, 0x10,
    ];

    const ROUTE_INFINITE: &[u8] = &[
        0x81, 0x0c, 0x69, 0x01, 0x01, 0x6f, 0x01, 0x80, 0x6a, 0x01, 0x64, 0x6c, 0x01, 0x02,
    ];

    const RIB_ENTRY: &[u8] = &[
        0x80, 0x34, 0x07, 0x0e, 0x08, 0x05, b'h', b'e', b'l', b'l', b'o', 0x08, 0x05, b'w', b'o',
        b'r', b'l', b'd', 0x81, 0x10, 0x69, 0x01, 0x01, 0x6f, 0x01, 0x80, 0x6a, 0x01, 0x64, 0x6c,
        0x01, 0x02, 0x6d, 0x02, 0x27, 0x10, 0x81, 0x10, 0x69, 0x01, 0x02, 0x6f, 0x01, 0x00, 0x6a,
        0x01, 0x20, 0x6c, 0x01, 0x01, 0x6d, 0x02, 0x13, 0x88,
    ];

    const RIB_ENTRY_INFINITE: &[u8] = &[
        0x80, 0x30, 0x07, 0x0e, 0x08, 0x05, b'h', b'e', b'l', b'l', b'o', 0x08, 0x05, b'w', b'o',
        b'r', b'l', b'd', 0x81, 0x10, 0x69, 0x01, 0x01, 0x6f, 0x01, 0x80, 0x6a, 0x01, 0x64, 0x6c,
        0x01, 0x02, 0x6d, 0x02, 0x27, 0x10, 0x81, 0x0c, 0x69, 0x01, 0x02, 0x6f, 0x01, 0x00, 0x6a,
        0x01, 0x20, 0x6c, 0x01, 0x01,
    ];

    const RIB_ENTRY_ROOT: &[u8] = &[
        0x80, 0x26, 0x07, 0x00, 0x81, 0x10, 0x69, 0x01, 0x01, 0x6f, 0x01, 0x80, 0x6a, 0x01, 0x64,
        0x6c, 0x01, 0x02, 0x6d, 0x02, 0x27, 0x10, 0x81, 0x10, 0x69, 0x01, 0x02, 0x6f, 0x01, 0x00,
        0x6a, 0x01, 0x20, 0x6c, 0x01, 0x01, 0x6d, 0x02, 0x13, 0x88,
    ];

    fn route1() -> Route {
        Route::new(1, RouteOrigin::Nlsr, 100)
            .with_flags(RouteFlags::CAPTURE)
            .with_expiration_period(10000)
    }

    fn route2() -> Route {
        Route::new(2, RouteOrigin::App, 32)
            .with_flags(RouteFlags::CHILD_INHERIT)
            .with_expiration_period(5000)
    }

    #[test]
    fn test_route_encode_decode() {
        assert_eq!(&route1().wire_encode()[..], ROUTE);

        let decoded = Route::wire_decode(ROUTE).unwrap();
        assert_eq!(decoded, route1());
        assert_eq!(decoded.route_origin(), RouteOrigin::Nlsr);
        assert_eq!(decoded.route_flags(), RouteFlags::CAPTURE);
        assert!(!decoded.has_infinite_expiration_period());
    }

    #[test]
    fn test_route_with_infinite_expiration() {
        let route = Route::new(1, RouteOrigin::Nlsr, 100).with_flags(RouteFlags::CAPTURE);
        assert_eq!(&route.wire_encode()[..], ROUTE_INFINITE);

        let decoded = Route::wire_decode(ROUTE_INFINITE).unwrap();
        assert!(decoded.has_infinite_expiration_period());
        assert_eq!(decoded.expiration_period, None);
    }

    #[test]
    fn test_route_display() {
        assert_eq!(
            route1().to_string(),
            "Route(FaceId: 1, Origin: 128, Cost: 100, Flags: 2, ExpirationPeriod: 10000 milliseconds)"
        );
        let route = Route::wire_decode(ROUTE_INFINITE).unwrap();
        assert_eq!(
            route.to_string(),
            "Route(FaceId: 1, Origin: 128, Cost: 100, Flags: 2, ExpirationPeriod: Infinity)"
        );
    }

    #[test]
    fn test_rib_entry() {
        let entry = RibEntry::new(Name::from_string("/hello/world").unwrap())
            .with_route(route1())
            .with_route(route2());
        assert_eq!(&entry.wire_encode()[..], RIB_ENTRY);

        let decoded = RibEntry::wire_decode(RIB_ENTRY).unwrap();
        assert_eq!(decoded, entry);
        assert_eq!(decoded.routes[1].face_id, 2);
    }

    #[test]
    fn test_rib_entry_with_infinite_route() {
        let mut second = route2();
        second.expiration_period = None;
        let entry = RibEntry::new(Name::from_string("/hello/world").unwrap())
            .with_route(route1())
            .with_route(second);
        assert_eq!(&entry.wire_encode()[..], RIB_ENTRY_INFINITE);

        let decoded = RibEntry::wire_decode(RIB_ENTRY_INFINITE).unwrap();
        assert!(!decoded.routes[0].has_infinite_expiration_period());
        assert!(decoded.routes[1].has_infinite_expiration_period());
    }

    #[test]
    fn test_rib_entry_for_root_prefix() {
        let decoded = RibEntry::wire_decode(RIB_ENTRY_ROOT).unwrap();
        assert!(decoded.name.is_empty());
        assert_eq!(decoded.routes, vec![route1(), route2()]);
        assert_eq!(&decoded.wire_encode()[..], RIB_ENTRY_ROOT);
    }

    #[test]
    fn test_rib_entry_display() {
        let decoded = RibEntry::wire_decode(RIB_ENTRY).unwrap();
        assert_eq!(
            decoded.to_string(),
            "RibEntry{\n  Name: /hello/world\n  \
             Route(FaceId: 1, Origin: 128, Cost: 100, Flags: 2, ExpirationPeriod: 10000 milliseconds)\n  \
             Route(FaceId: 2, Origin: 0, Cost: 32, Flags: 1, ExpirationPeriod: 5000 milliseconds)\n}"
        );
    }

    #[test]
    fn test_truncated_rib_entry_is_rejected() {
        for cut in [1, 10, RIB_ENTRY.len() - 1] {
            assert!(RibEntry::wire_decode(&RIB_ENTRY[..cut]).is_err());
        }
    }

    #[test]
    fn test_rib_entry_serde_round_trip() {
        let entry = RibEntry::wire_decode(RIB_ENTRY).unwrap();
        let json = serde_json::to_string(&entry).unwrap();
        assert_eq!(serde_json::from_str::<RibEntry>(&json).unwrap(), entry);
    }
}
