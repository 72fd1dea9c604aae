//! Access-permission (`AP`) decoding for privileged and unprivileged code.
//!
//! The two viewpoints are decoded by separate tables. Unprivileged access is
//! never wider than privileged access for any defined code, but neither
//! mapping is derived from the other.

use std::fmt;

/// Access granted to one privilege level by a region's `AP` code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum AccessPermission {
    /// Any access faults.
    NoAccess,
    /// Reads are permitted, writes fault.
    ReadOnly,
    /// Reads and writes are permitted.
    ReadWrite,
    /// Code is reserved or outside the 3-bit domain.
    Reserved,
}

impl AccessPermission {
    /// Short report label (`NA`, `RO`, `RW`, `Res`).
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::NoAccess => "NA",
            Self::ReadOnly => "RO",
            Self::ReadWrite => "RW",
            Self::Reserved => "Res",
        }
    }
}

impl fmt::Display for AccessPermission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Decodes the access granted to privileged software.
#[must_use]
pub const fn decode_privileged(ap: u8) -> AccessPermission {
    match ap {
        0 => AccessPermission::NoAccess,
        1..=3 => AccessPermission::ReadWrite,
        5 | 6 => AccessPermission::ReadOnly,
        _ => AccessPermission::Reserved,
    }
}

/// Decodes the access granted to unprivileged software.
#[must_use]
pub const fn decode_unprivileged(ap: u8) -> AccessPermission {
    match ap {
        0 | 1 | 5 => AccessPermission::NoAccess,
        2 | 6 => AccessPermission::ReadOnly,
        3 => AccessPermission::ReadWrite,
        _ => AccessPermission::Reserved,
    }
}

/// Both privilege viewpoints of a single `AP` code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct AccessPolicy {
    /// Access for privileged (handler / privileged thread) code.
    pub privileged: AccessPermission,
    /// Access for unprivileged thread code.
    pub unprivileged: AccessPermission,
}

impl AccessPolicy {
    /// Decodes both viewpoints from the same raw code.
    #[must_use]
    pub const fn decode(ap: u8) -> Self {
        Self {
            privileged: decode_privileged(ap),
            unprivileged: decode_unprivileged(ap),
        }
    }
}

impl fmt::Display for AccessPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Priv={}, Unpriv={}", self.privileged, self.unprivileged)
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use rstest::rstest;

    use super::{
        decode_privileged, decode_unprivileged, AccessPermission, AccessPermission::*,
        AccessPolicy,
    };

    #[rstest]
    #[case(0, NoAccess, NoAccess)]
    #[case(1, ReadWrite, NoAccess)]
    #[case(2, ReadWrite, ReadOnly)]
    #[case(3, ReadWrite, ReadWrite)]
    #[case(4, Reserved, Reserved)]
    #[case(5, ReadOnly, NoAccess)]
    #[case(6, ReadOnly, ReadOnly)]
    #[case(7, Reserved, Reserved)]
    fn decodes_every_three_bit_code(
        #[case] ap: u8,
        #[case] privileged: AccessPermission,
        #[case] unprivileged: AccessPermission,
    ) {
        assert_eq!(decode_privileged(ap), privileged);
        assert_eq!(decode_unprivileged(ap), unprivileged);
    }

    #[test]
    fn labels_match_report_format() {
        assert_eq!(AccessPolicy::decode(2).to_string(), "Priv=RW, Unpriv=RO");
        assert_eq!(AccessPolicy::decode(7).to_string(), "Priv=Res, Unpriv=Res");
    }

    const fn rank(permission: AccessPermission) -> u8 {
        match permission {
            NoAccess => 0,
            ReadOnly => 1,
            ReadWrite => 2,
            Reserved => 3,
        }
    }

    #[test]
    fn unprivileged_never_exceeds_privileged() {
        for ap in 0u8..=7 {
            let policy = AccessPolicy::decode(ap);
            if policy.privileged != Reserved {
                assert!(rank(policy.unprivileged) <= rank(policy.privileged), "ap={ap}");
            }
        }
    }

    proptest! {
        #[test]
        fn out_of_domain_codes_are_reserved(ap in 8u8..) {
            prop_assert_eq!(decode_privileged(ap), Reserved);
            prop_assert_eq!(decode_unprivileged(ap), Reserved);
        }
    }
}
