//! NDN packet types and structures.
//!
//! This module provides the immutable value packets that flow through the
//! forwarding pipelines. Transport annotations live in [`crate::tags`] and are
//! passed alongside the packets rather than attached to them.

use crate::error::Error;
use crate::tlv::{self, TlvElement};
use bytes::{Bytes, BytesMut};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::time::Duration;

/// Interest lifetime applied when the consumer did not set one.
pub const DEFAULT_INTEREST_LIFETIME_MS: u32 = 4000;

/// Namespace reserved for node-local communication.
pub const LOCALHOST_PREFIX: &str = "/localhost";

/// Length of an implicit SHA-256 digest component.
pub const IMPLICIT_DIGEST_LENGTH: usize = 32;

/// Kind of a name component, in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ComponentType {
    /// SHA-256 digest of the full Data packet encoding.
    ImplicitDigest,
    /// Regular application component.
    Generic,
}

/// Represents an NDN name component.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NameComponent {
    pub typ: ComponentType,
    pub value: Bytes,
}

impl NameComponent {
    /// Creates a new generic name component from a byte slice.
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self {
            typ: ComponentType::Generic,
            value: bytes.into(),
        }
    }

    /// Creates an implicit digest component.
    pub fn implicit_digest(digest: [u8; IMPLICIT_DIGEST_LENGTH]) -> Self {
        Self {
            typ: ComponentType::ImplicitDigest,
            value: Bytes::copy_from_slice(&digest),
        }
    }

    /// Returns the component as bytes.
    pub fn as_bytes(&self) -> &Bytes {
        &self.value
    }

    pub fn is_implicit_digest(&self) -> bool {
        self.typ == ComponentType::ImplicitDigest && self.value.len() == IMPLICIT_DIGEST_LENGTH
    }

    /// Encodes this name component as a TLV element.
    pub fn to_tlv(&self) -> TlvElement {
        let tlv_type = match self.typ {
            ComponentType::ImplicitDigest => tlv::TLV_IMPLICIT_DIGEST,
            ComponentType::Generic => tlv::TLV_COMPONENT,
        };
        TlvElement::new(tlv_type, self.value.clone())
    }
}

impl fmt::Display for NameComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.typ == ComponentType::ImplicitDigest {
            write!(f, "sha256digest=")?;
            for &b in self.value.iter() {
                write!(f, "{:02x}", b)?;
            }
            return Ok(());
        }

        // Print printable ASCII characters directly, otherwise use hex
        let printable = self.value.iter().all(|&b| b.is_ascii_graphic() || b == b' ');

        if printable {
            write!(f, "{}", String::from_utf8_lossy(&self.value))
        } else {
            write!(f, "0x")?;
            for &b in self.value.iter() {
                write!(f, "{:02x}", b)?;
            }
            Ok(())
        }
    }
}

/// Represents an NDN name, which is a sequence of name components.
///
/// Names order component by component, so every name sharing a prefix sorts
/// contiguously right after that prefix.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Name {
    components: Vec<NameComponent>,
}

impl Name {
    /// Creates a new empty NDN name.
    pub fn new() -> Self {
        Self {
            components: Vec::new(),
        }
    }

    /// Creates a name from a string representation with '/' as component separator.
    pub fn from_string(s: &str) -> Self {
        let components = s
            .split('/')
            .filter(|comp| !comp.is_empty())
            .map(|comp| NameComponent::new(comp.as_bytes().to_vec()))
            .collect();

        Self { components }
    }

    /// The reserved `/localhost` prefix.
    pub fn localhost() -> Self {
        Self::from_string(LOCALHOST_PREFIX)
    }

    /// Adds a component to the name.
    pub fn push(&mut self, component: NameComponent) -> &mut Self {
        self.components.push(component);
        self
    }

    /// Returns a copy of this name with `component` appended.
    pub fn appended(&self, component: NameComponent) -> Self {
        let mut name = self.clone();
        name.push(component);
        name
    }

    /// Returns the number of components in the name.
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Returns true if the name has no components.
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Returns an iterator over the name components.
    pub fn components(&self) -> impl Iterator<Item = &NameComponent> {
        self.components.iter()
    }

    /// Gets a component at the specified index.
    pub fn get(&self, index: usize) -> Option<&NameComponent> {
        self.components.get(index)
    }

    pub fn last(&self) -> Option<&NameComponent> {
        self.components.last()
    }

    /// Returns a prefix of this name with the specified length.
    pub fn prefix(&self, len: usize) -> Self {
        Self {
            components: self.components.iter().take(len).cloned().collect(),
        }
    }

    /// Checks if this name is a prefix of another name.
    pub fn is_prefix_of(&self, other: &Self) -> bool {
        self.len() <= other.len()
            && self
                .components
                .iter()
                .zip(other.components.iter())
                .all(|(a, b)| a == b)
    }

    /// Whether this name falls under the reserved `/localhost` namespace.
    pub fn is_localhost(&self) -> bool {
        self.get(0)
            .map(|first| first.typ == ComponentType::Generic && &first.value[..] == b"localhost")
            .unwrap_or(false)
    }

    /// Encodes this name as a TLV element.
    pub fn to_tlv(&self) -> TlvElement {
        let mut buf = BytesMut::new();

        for component in &self.components {
            component.to_tlv().encode(&mut buf);
        }

        TlvElement::new(tlv::TLV_NAME, buf.freeze())
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.components.is_empty() {
            return write!(f, "/");
        }

        for component in &self.components {
            write!(f, "/{}", component)?;
        }

        Ok(())
    }
}

impl Default for Name {
    fn default() -> Self {
        Self::new()
    }
}

/// The selector part of a request's identity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Selectors {
    /// Data whose name extends the Interest name may satisfy it.
    pub can_be_prefix: bool,
    /// Only Data that is still fresh may satisfy it from a cache.
    pub must_be_fresh: bool,
}

/// Represents an NDN Interest packet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interest {
    /// The name requested in the Interest.
    pub name: Name,

    /// A nonce value to prevent looping.
    pub nonce: u32,

    /// Interest lifetime in milliseconds.
    pub lifetime_ms: u32,

    /// Hop limit (similar to IP TTL).
    pub hop_limit: Option<u8>,

    /// Whether this Interest can be satisfied by Data with a longer name.
    pub can_be_prefix: bool,

    /// Whether cached Data must still be fresh to satisfy this Interest.
    pub must_be_fresh: bool,
}

impl Interest {
    /// Creates a new Interest packet with a random nonce.
    pub fn new(name: Name) -> Self {
        Self {
            name,
            nonce: rand::random(),
            lifetime_ms: DEFAULT_INTEREST_LIFETIME_MS,
            hop_limit: None,
            can_be_prefix: false,
            must_be_fresh: false,
        }
    }

    /// Sets the Interest lifetime.
    pub fn with_lifetime(mut self, lifetime_ms: u32) -> Self {
        self.lifetime_ms = lifetime_ms;
        self
    }

    /// Sets the nonce value.
    pub fn with_nonce(mut self, nonce: u32) -> Self {
        self.nonce = nonce;
        self
    }

    /// Sets the hop limit.
    pub fn with_hop_limit(mut self, hop_limit: u8) -> Self {
        self.hop_limit = Some(hop_limit);
        self
    }

    /// Sets the can_be_prefix flag.
    pub fn with_can_be_prefix(mut self, can_be_prefix: bool) -> Self {
        self.can_be_prefix = can_be_prefix;
        self
    }

    /// Sets the must_be_fresh flag.
    pub fn with_must_be_fresh(mut self, must_be_fresh: bool) -> Self {
        self.must_be_fresh = must_be_fresh;
        self
    }

    pub fn selectors(&self) -> Selectors {
        Selectors {
            can_be_prefix: self.can_be_prefix,
            must_be_fresh: self.must_be_fresh,
        }
    }

    pub fn lifetime(&self) -> Duration {
        Duration::from_millis(self.lifetime_ms as u64)
    }

    /// Checks the fields used by forwarding.
    pub fn check_well_formed(&self) -> Result<(), Error> {
        if self.name.is_empty() {
            return Err(Error::NdnPacket("Interest name must not be empty".into()));
        }
        if self.hop_limit == Some(0) {
            return Err(Error::NdnPacket(format!(
                "Interest {} arrived with hop limit 0",
                self.name
            )));
        }
        Ok(())
    }

    /// Whether `data` satisfies this Interest, ignoring freshness.
    ///
    /// An Interest whose last component is an implicit digest only matches the
    /// Data whose full name equals the Interest name.
    pub fn matches_data(&self, data: &Data) -> bool {
        if self.name.len() == data.name.len() + 1 {
            if let Some(last) = self.name.last() {
                if last.is_implicit_digest() {
                    return self.name == data.full_name();
                }
            }
        }

        if self.can_be_prefix {
            self.name.is_prefix_of(&data.name)
        } else {
            self.name == data.name
        }
    }
}

/// Represents an NDN Data packet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Data {
    /// The name of the Data packet.
    pub name: Name,

    /// The content of the Data packet.
    pub content: Bytes,

    /// How long the Data stays fresh after arrival; `None` means it never goes stale.
    pub freshness_period_ms: Option<u32>,

    /// MetaInfo content type (0 = BLOB).
    pub content_type: u8,

    /// Opaque signature bytes, carried but never verified here.
    pub signature_value: Bytes,
}

impl Data {
    /// Creates a new Data packet.
    pub fn new(name: Name, content: impl Into<Bytes>) -> Self {
        Self {
            name,
            content: content.into(),
            freshness_period_ms: None,
            content_type: 0,
            signature_value: Bytes::new(),
        }
    }

    /// Sets the freshness period.
    pub fn with_freshness_period(mut self, freshness_period_ms: u32) -> Self {
        self.freshness_period_ms = Some(freshness_period_ms);
        self
    }

    pub fn with_signature_value(mut self, signature_value: impl Into<Bytes>) -> Self {
        self.signature_value = signature_value.into();
        self
    }

    pub fn freshness_period(&self) -> Option<Duration> {
        self.freshness_period_ms
            .map(|ms| Duration::from_millis(ms as u64))
    }

    /// Wire encoding of the whole packet.
    pub fn wire_encode(&self) -> Bytes {
        let mut inner = BytesMut::new();
        self.name.to_tlv().encode(&mut inner);

        let mut meta = BytesMut::new();
        TlvElement::new(tlv::TLV_CONTENT_TYPE, vec![self.content_type]).encode(&mut meta);
        if let Some(ms) = self.freshness_period_ms {
            TlvElement::new(tlv::TLV_FRESHNESS_PERIOD, tlv::non_negative_integer(ms as u64))
                .encode(&mut meta);
        }
        TlvElement::new(tlv::TLV_META_INFO, meta.freeze()).encode(&mut inner);

        TlvElement::new(tlv::TLV_CONTENT, self.content.clone()).encode(&mut inner);
        TlvElement::new(tlv::TLV_SIGNATURE_VALUE, self.signature_value.clone()).encode(&mut inner);

        let mut buf = BytesMut::with_capacity(inner.len() + 5);
        TlvElement::new(tlv::TLV_DATA, inner.freeze()).encode(&mut buf);
        buf.freeze()
    }

    /// SHA-256 digest of the wire encoding.
    pub fn implicit_digest(&self) -> [u8; IMPLICIT_DIGEST_LENGTH] {
        let mut digest = [0u8; IMPLICIT_DIGEST_LENGTH];
        digest.copy_from_slice(&Sha256::digest(self.wire_encode()));
        digest
    }

    /// The Data name followed by its implicit digest component.
    pub fn full_name(&self) -> Name {
        self.name
            .appended(NameComponent::implicit_digest(self.implicit_digest()))
    }
}

/// Reason carried by a Nack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u16)]
pub enum NackReason {
    None = 0,
    Congestion = 50,
    Duplicate = 100,
    NoRoute = 150,
}

impl NackReason {
    /// Congestion is the least severe reason, `None` the most.
    pub fn is_less_severe(&self, other: &NackReason) -> bool {
        if *self == NackReason::None {
            return false;
        }
        if *other == NackReason::None {
            return true;
        }
        (*self as u16) < (*other as u16)
    }
}

impl fmt::Display for NackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NackReason::None => "None",
            NackReason::Congestion => "Congestion",
            NackReason::Duplicate => "Duplicate",
            NackReason::NoRoute => "NoRoute",
        };
        f.write_str(s)
    }
}

/// Negative acknowledgement for a specific Interest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Nack {
    /// The Interest being rejected, nonce included.
    pub interest: Interest,
    pub reason: NackReason,
}

impl Nack {
    pub fn new(interest: Interest, reason: NackReason) -> Self {
        Self { interest, reason }
    }

    pub fn check_well_formed(&self) -> Result<(), Error> {
        self.interest.check_well_formed()
    }
}
