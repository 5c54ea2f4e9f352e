/// Fixed-width device identity: the 6-byte hardware radio address.
///
/// Assigned once at initialization and immutable for the process
/// lifetime. Serves as both the routing source on the wire and the
/// election tie-break key: identities are compared lexicographically,
/// and the *lower* identity wins a priority tie. The order is
/// arbitrary but fixed, which is all the election needs for a
/// deterministic single winner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct DeviceId([u8; 6]);

impl DeviceId {
    /// Wire size in bytes.
    pub const SIZE: usize = 6;

    /// Create an identity from a radio address.
    #[must_use]
    pub const fn new(addr: [u8; 6]) -> Self {
        Self(addr)
    }

    /// The raw address bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 6] {
        &self.0
    }

    /// Decode from the first 6 bytes of a slice.
    #[must_use]
    pub fn from_slice(data: &[u8]) -> Option<Self> {
        let bytes: [u8; 6] = data.get(..Self::SIZE)?.try_into().ok()?;
        Some(Self(bytes))
    }
}

impl From<[u8; 6]> for DeviceId {
    fn from(addr: [u8; 6]) -> Self {
        Self(addr)
    }
}

impl std::fmt::Display for DeviceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}",
            self.0[0], self.0[1], self.0[2], self.0[3], self.0[4], self.0[5]
        )
    }
}
