use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

id_newtype!(OrderId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Idr,
    Myr,
}

impl Currency {
    pub const ALL: [Currency; 2] = [Currency::Idr, Currency::Myr];

    pub fn code(self) -> &'static str {
        match self {
            Currency::Idr => "IDR",
            Currency::Myr => "MYR",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        if raw.eq_ignore_ascii_case("IDR") {
            Some(Currency::Idr)
        } else if raw.eq_ignore_ascii_case("MYR") {
            Some(Currency::Myr)
        } else {
            None
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A price in one of the storefront currencies.
///
/// Ringgit amounts are kept in sen so multiplying by a quantity stays exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Amount {
    Idr(u64),
    Myr { sen: u64 },
}

impl Amount {
    pub fn currency(self) -> Currency {
        match self {
            Amount::Idr(_) => Currency::Idr,
            Amount::Myr { .. } => Currency::Myr,
        }
    }

    pub fn checked_mul(self, quantity: u32) -> Option<Self> {
        let quantity = u64::from(quantity);
        match self {
            Amount::Idr(rupiah) => rupiah.checked_mul(quantity).map(Amount::Idr),
            Amount::Myr { sen } => sen.checked_mul(quantity).map(|sen| Amount::Myr { sen }),
        }
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Amount::Idr(rupiah) => write!(f, "Rp {rupiah}"),
            Amount::Myr { sen } => write!(f, "RM {}.{:02}", sen / 100, sen % 100),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Package {
    pub code: &'static str,
    pub label: &'static str,
    pub price_idr: u64,
    pub price_myr_sen: u64,
}

impl Package {
    pub fn unit_price(&self, currency: Currency) -> Amount {
        match currency {
            Currency::Idr => Amount::Idr(self.price_idr),
            Currency::Myr => Amount::Myr {
                sen: self.price_myr_sen,
            },
        }
    }
}

pub const DEFAULT_PACKAGE_CODE: &str = "MLBB_86";

pub const CATALOG: [Package; 4] = [
    Package {
        code: "MLBB_86",
        label: "86 Diamonds",
        price_idr: 10_000,
        price_myr_sen: 350,
    },
    Package {
        code: "MLBB_170",
        label: "170 Diamonds",
        price_idr: 20_000,
        price_myr_sen: 700,
    },
    Package {
        code: "MLBB_344",
        label: "344 Diamonds",
        price_idr: 40_000,
        price_myr_sen: 1_400,
    },
    Package {
        code: "MLBB_514",
        label: "514 Diamonds",
        price_idr: 60_000,
        price_myr_sen: 2_100,
    },
];

pub fn find_package(code: &str) -> Option<&'static Package> {
    CATALOG.iter().find(|package| package.code == code)
}

/// Order form contents as edited by the shopper. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderDraft {
    pub player_id: String,
    pub zone: u32,
    pub package_code: String,
    pub quantity: u32,
    pub currency: Currency,
}

impl Default for OrderDraft {
    fn default() -> Self {
        Self {
            player_id: String::new(),
            zone: 1,
            package_code: DEFAULT_PACKAGE_CODE.to_string(),
            quantity: 1,
            currency: Currency::Idr,
        }
    }
}

impl OrderDraft {
    pub fn package(&self) -> Option<&'static Package> {
        find_package(&self.package_code)
    }

    /// Unit price of the selected package times quantity, in the draft's currency.
    pub fn total(&self) -> Option<Amount> {
        self.package()?
            .unit_price(self.currency)
            .checked_mul(self.quantity)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub order_id: OrderId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pay_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Paid,
    Delivered,
    Failed,
    #[serde(other)]
    Unknown,
}

impl OrderStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Paid => "paid",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Failed => "failed",
            OrderStatus::Unknown => "unknown",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
