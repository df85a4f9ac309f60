//! What to do with Data that matches no pending Interest.

use rust_udcn_common::{ndn::Data, types::FaceScope};
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnsolicitedDataDecision {
    Drop,
    Cache,
}

pub trait UnsolicitedDataPolicy: Send {
    fn decide(&self, scope: FaceScope, data: &Data) -> UnsolicitedDataDecision;
}

/// The built-in admission rules, selectable from configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnsolicitedDataKind {
    #[default]
    DropAll,
    /// Cache unsolicited Data from local applications only.
    AdmitLocal,
    /// Cache unsolicited Data from other nodes only.
    AdmitNetwork,
    AdmitAll,
}

impl UnsolicitedDataPolicy for UnsolicitedDataKind {
    fn decide(&self, scope: FaceScope, _data: &Data) -> UnsolicitedDataDecision {
        let admit = match self {
            UnsolicitedDataKind::DropAll => false,
            UnsolicitedDataKind::AdmitLocal => scope == FaceScope::Local,
            UnsolicitedDataKind::AdmitNetwork => scope == FaceScope::NonLocal,
            UnsolicitedDataKind::AdmitAll => true,
        };
        if admit {
            UnsolicitedDataDecision::Cache
        } else {
            UnsolicitedDataDecision::Drop
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use rust_udcn_common::ndn::Name;

    #[test]
    fn test_admission_by_scope() {
        let data = Data::new(Name::from_string("/u"), Bytes::new());
        let cases = [
            (UnsolicitedDataKind::DropAll, FaceScope::Local, UnsolicitedDataDecision::Drop),
            (UnsolicitedDataKind::AdmitLocal, FaceScope::Local, UnsolicitedDataDecision::Cache),
            (UnsolicitedDataKind::AdmitLocal, FaceScope::NonLocal, UnsolicitedDataDecision::Drop),
            (UnsolicitedDataKind::AdmitNetwork, FaceScope::NonLocal, UnsolicitedDataDecision::Cache),
            (UnsolicitedDataKind::AdmitNetwork, FaceScope::Local, UnsolicitedDataDecision::Drop),
            (UnsolicitedDataKind::AdmitAll, FaceScope::NonLocal, UnsolicitedDataDecision::Cache),
        ];

        for (kind, scope, expected) in cases {
            assert_eq!(kind.decide(scope, &data), expected, "{:?} on {:?}", kind, scope);
        }
    }
}
