use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{
    error::{AppError, AppResult},
    sequence::Sequences,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentType {
    Credit,
    Debit,
    Cash,
    Check,
}

impl PaymentType {
    pub fn code(&self) -> i32 {
        match self {
            PaymentType::Credit => 1,
            PaymentType::Debit => 2,
            PaymentType::Cash => 3,
            PaymentType::Check => 4,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentType::Credit => "CREDIT",
            PaymentType::Debit => "DEBIT",
            PaymentType::Cash => "CASH",
            PaymentType::Check => "CHECK",
        }
    }

    pub fn needs_card(&self) -> bool {
        matches!(self, PaymentType::Credit | PaymentType::Debit)
    }
}

impl fmt::Display for PaymentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "CREDIT" => Ok(PaymentType::Credit),
            "DEBIT" => Ok(PaymentType::Debit),
            "CASH" => Ok(PaymentType::Cash),
            "CHECK" => Ok(PaymentType::Check),
            _ => Err(AppError::InvalidPaymentType(s.to_string())),
        }
    }
}

impl TryFrom<i32> for PaymentType {
    type Error = AppError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(PaymentType::Credit),
            2 => Ok(PaymentType::Debit),
            3 => Ok(PaymentType::Cash),
            4 => Ok(PaymentType::Check),
            other => Err(AppError::InvalidPaymentType(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentLocation {
    Store,
    Online,
}

impl PaymentLocation {
    pub fn code(&self) -> i32 {
        match self {
            PaymentLocation::Store => 1,
            PaymentLocation::Online => 2,
        }
    }
}

impl FromStr for PaymentLocation {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "STORE" => Ok(PaymentLocation::Store),
            "ONLINE" => Ok(PaymentLocation::Online),
            _ => Err(AppError::Validation(format!("unknown payment location '{s}'"))),
        }
    }
}

impl TryFrom<i32> for PaymentLocation {
    type Error = AppError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(PaymentLocation::Store),
            2 => Ok(PaymentLocation::Online),
            other => Err(AppError::Validation(format!(
                "unknown payment location {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardInfo {
    pub number: String,
    pub expiration: String,
    pub csv: String,
}

impl CardInfo {
    pub fn new(
        number: impl Into<String>,
        expiration: impl Into<String>,
        csv: impl Into<String>,
    ) -> Self {
        Self {
            number: number.into(),
            expiration: expiration.into(),
            csv: csv.into(),
        }
    }
}

/// How a payment is made. Cash and checks carry no card and are always taken
/// in store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "UPPERCASE")]
pub enum PaymentMethod {
    Credit {
        location: PaymentLocation,
        card: CardInfo,
    },
    Debit {
        location: PaymentLocation,
        card: CardInfo,
    },
    Cash,
    Check,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    number: i64,
    owner: String,
    method: PaymentMethod,
}

impl Payment {
    /// Rebuilds a payment whose number was already issued.
    pub fn restore(number: i64, owner: impl Into<String>, method: PaymentMethod) -> Self {
        Self {
            number,
            owner: owner.into(),
            method,
        }
    }

    pub fn number(&self) -> i64 {
        self.number
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn method(&self) -> &PaymentMethod {
        &self.method
    }

    pub fn kind(&self) -> PaymentType {
        match self.method {
            PaymentMethod::Credit { .. } => PaymentType::Credit,
            PaymentMethod::Debit { .. } => PaymentType::Debit,
            PaymentMethod::Cash => PaymentType::Cash,
            PaymentMethod::Check => PaymentType::Check,
        }
    }

    pub fn location(&self) -> PaymentLocation {
        match &self.method {
            PaymentMethod::Credit { location, .. } | PaymentMethod::Debit { location, .. } => {
                *location
            }
            PaymentMethod::Cash | PaymentMethod::Check => PaymentLocation::Store,
        }
    }

    pub fn card(&self) -> Option<&CardInfo> {
        match &self.method {
            PaymentMethod::Credit { card, .. } | PaymentMethod::Debit { card, .. } => Some(card),
            PaymentMethod::Cash | PaymentMethod::Check => None,
        }
    }
}

pub struct PaymentFactory;

impl PaymentFactory {
    /// Builds the concrete payment for `kind`. Cash and check ignore the
    /// supplied location and card.
    pub fn create(
        kind: PaymentType,
        owner: impl Into<String>,
        location: PaymentLocation,
        card: Option<CardInfo>,
        number: i64,
    ) -> AppResult<Payment> {
        let method = match kind {
            PaymentType::Credit => PaymentMethod::Credit {
                location,
                card: card.ok_or_else(|| missing_card(kind))?,
            },
            PaymentType::Debit => PaymentMethod::Debit {
                location,
                card: card.ok_or_else(|| missing_card(kind))?,
            },
            PaymentType::Cash => PaymentMethod::Cash,
            PaymentType::Check => PaymentMethod::Check,
        };
        Ok(Payment::restore(number, owner, method))
    }

    /// Same as [`PaymentFactory::create`] for a textual type tag.
    pub fn create_from_tag(
        tag: &str,
        owner: impl Into<String>,
        location: PaymentLocation,
        card: Option<CardInfo>,
        number: i64,
    ) -> AppResult<Payment> {
        let kind = tag.parse::<PaymentType>()?;
        Self::create(kind, owner, location, card, number)
    }
}

fn missing_card(kind: PaymentType) -> AppError {
    AppError::Validation(format!("{kind} payment requires card information"))
}

#[derive(Debug, Default)]
pub struct PaymentBuilder {
    owner: Option<String>,
    kind: Option<PaymentType>,
    location: Option<PaymentLocation>,
    card: Option<CardInfo>,
}

impl PaymentBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    pub fn kind(mut self, kind: PaymentType) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn location(mut self, location: PaymentLocation) -> Self {
        self.location = Some(location);
        self
    }

    pub fn card(mut self, card: CardInfo) -> Self {
        self.card = Some(card);
        self
    }

    /// Validates the combination and issues a payment number.
    pub fn build(self, sequences: &Sequences) -> AppResult<Payment> {
        let owner = self
            .owner
            .filter(|o| !o.trim().is_empty())
            .ok_or_else(|| AppError::Validation("payment owner is required".into()))?;
        let kind = self
            .kind
            .ok_or_else(|| AppError::Validation("payment type is required".into()))?;

        let (location, card) = if kind.needs_card() {
            let location = self.location.ok_or_else(|| {
                AppError::Validation(format!("{kind} payment requires a location"))
            })?;
            let card = self.card.ok_or_else(|| missing_card(kind))?;
            (location, Some(card))
        } else {
            if self.location == Some(PaymentLocation::Online) {
                return Err(AppError::Validation(format!(
                    "{kind} payments can only be made in store"
                )));
            }
            (PaymentLocation::Store, None)
        };

        PaymentFactory::create(
            kind,
            owner,
            location,
            card,
            sequences.next_payment_number(),
        )
    }
}
