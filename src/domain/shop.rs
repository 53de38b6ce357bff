use serde::{Deserialize, Serialize};

/// Shop identity printed at the top of every invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShopProfile {
    pub name: String,
    pub address: String,
    pub phone: String,
    /// GST identification number
    pub gstin: String,
    /// Closing line of the invoice
    pub footer: String,
}

impl Default for ShopProfile {
    fn default() -> Self {
        Self {
            name: "SHREE GOLD & JEWELLERS".to_string(),
            address: "123 Main Road, Your City - PIN 400001".to_string(),
            phone: "+91-9876543210".to_string(),
            gstin: "27ABCDE1234F1Z5".to_string(),
            footer: "This is a computer generated invoice. No signature required.".to_string(),
        }
    }
}
