// src/dealer.rs
use serde::{Deserialize, Serialize};

/// A dealer account snapshot, keyed in the world state by the unpadded
/// decimal form of `dealer_id`.
///
/// Field declaration order is the canonical wire order (see `codec`); other
/// implementations on the same network serialize these exact tags in this
/// exact order, and state hashes must agree across all of them. Do not
/// reorder fields or rename tags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dealer {
    #[serde(rename = "BALANCE")]
    pub balance: i64,
    #[serde(rename = "DEALERID")]
    pub dealer_id: u64,
    #[serde(rename = "ID")]
    pub mpin: String,
    #[serde(rename = "MSISDN")]
    pub msisdn: String,
    #[serde(rename = "REMARKS")]
    pub remarks: String,
    #[serde(rename = "Status")]
    pub status: String,
    #[serde(rename = "TRANSAM")]
    pub trans_amount: i64,
    #[serde(rename = "TRANS")]
    pub trans_type: String,
}

impl Dealer {
    pub fn new(
        dealer_id: u64,
        msisdn: impl Into<String>,
        mpin: impl Into<String>,
        balance: i64,
        status: impl Into<String>,
        trans_amount: i64,
        trans_type: impl Into<String>,
        remarks: impl Into<String>,
    ) -> Self {
        Self {
            balance,
            dealer_id,
            mpin: mpin.into(),
            msisdn: msisdn.into(),
            remarks: remarks.into(),
            status: status.into(),
            trans_amount,
            trans_type: trans_type.into(),
        }
    }

    /// World-state key: unpadded decimal. Multi-digit ids therefore sort
    /// lexicographically, not numerically, in range scans.
    pub fn key(&self) -> String {
        self.dealer_id.to_string()
    }

    /// The fixed record set written at ledger genesis.
    pub fn genesis() -> Vec<Dealer> {
        vec![
            Dealer::new(1201, "+91 000000", "0000", 0, "SUCCESS", 0, "ONLINE", "YES"),
            Dealer::new(1202, "+91 12345", "0000", 100, "FAILURE", 200, "OFFLINE", "NO"),
            Dealer::new(1203, "+91 456787", "0120", 300, "SUCCESS", 500, "ONLINE", "NO"),
            Dealer::new(1204, "+91 56789", "9873", 200, "SUCCESS", 600, "OFFLINE", "YES"),
            Dealer::new(1205, "+91 67894", "15654", 300, "FAILURE", 700, "ONLINE", "NO"),
            Dealer::new(1206, "+91 23456789", "4567", 500, "SUCCESS", 800, "OFFLINE", "YES"),
        ]
    }

    /// Replace the entire mutable field set. `dealer_id` is not part of the
    /// update and never changes after creation.
    pub(crate) fn apply(&mut self, fields: DealerUpdate) {
        self.msisdn = fields.msisdn;
        self.mpin = fields.mpin;
        self.balance = fields.balance;
        self.status = fields.status;
        self.trans_amount = fields.trans_amount;
        self.trans_type = fields.trans_type;
        self.remarks = fields.remarks;
    }
}

/// Full replacement values for every mutable dealer field. There is no
/// partial patch; an update always carries the whole set.
#[derive(Debug, Clone)]
pub struct DealerUpdate {
    pub msisdn: String,
    pub mpin: String,
    pub balance: i64,
    pub status: String,
    pub trans_amount: i64,
    pub trans_type: String,
    pub remarks: String,
}

impl From<&Dealer> for DealerUpdate {
    fn from(dealer: &Dealer) -> Self {
        Self {
            msisdn: dealer.msisdn.clone(),
            mpin: dealer.mpin.clone(),
            balance: dealer.balance,
            status: dealer.status.clone(),
            trans_amount: dealer.trans_amount,
            trans_type: dealer.trans_type.clone(),
            remarks: dealer.remarks.clone(),
        }
    }
}
