//! Loyalty domain models.

use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::constants::{CLIENT_CODE_PREFIX, FCFA_PER_POINT};
use crate::errors::{Error, Result, ValidationError};

lazy_static! {
    /// Loose email shape check: something@something.tld, no whitespace.
    static ref EMAIL_REGEX: Regex =
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Invalid regex pattern");
}

/// A loyalty program member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoyaltyAccount {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub client_code: String,
    pub loyalty_points: i64,
    pub created_at: String,
}

impl LoyaltyAccount {
    pub fn tier(&self) -> LoyaltyTier {
        LoyaltyTier::for_points(self.loyalty_points)
    }

    /// FCFA value of the account's points.
    pub fn points_value(&self) -> i64 {
        points_to_fcfa(self.loyalty_points)
    }
}

/// Kind of point movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Earned,
    Spent,
    Converted,
}

/// A single point movement on an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoyaltyTransaction {
    pub id: String,
    pub points: i64,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub description: String,
    pub created_at: String,
}

/// An account with its movements, most recent first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoyaltyOverview {
    pub account: LoyaltyAccount,
    pub transactions: Vec<LoyaltyTransaction>,
}

/// Status level derived from the point balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LoyaltyTier {
    Bronze,
    Silver,
    Gold,
    Platinum,
}

impl LoyaltyTier {
    pub fn for_points(points: i64) -> Self {
        match points {
            p if p >= 1000 => LoyaltyTier::Platinum,
            p if p >= 500 => LoyaltyTier::Gold,
            p if p >= 200 => LoyaltyTier::Silver,
            _ => LoyaltyTier::Bronze,
        }
    }
}

/// FCFA value of `points`.
pub fn points_to_fcfa(points: i64) -> i64 {
    points * FCFA_PER_POINT
}

/// Normalises a client code typed by a customer.
pub fn normalize_client_code(input: &str) -> Result<String> {
    let code = input.trim().to_uppercase();
    if code.is_empty() {
        return Err(Error::Validation(ValidationError::InvalidInput(
            "Please enter your loyalty code".to_string(),
        )));
    }
    Ok(code)
}

/// Derives the client code assigned to a phone number: `IZI-` followed by its digits.
pub fn client_code_for_phone(phone: &str) -> String {
    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();
    format!("{}{}", CLIENT_CODE_PREFIX, digits)
}

/// Loyalty program signup form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoyaltySignup {
    pub name: String,
    pub phone: String,
    pub email: String,
}

impl LoyaltySignup {
    /// Validates the form, reporting every failing rule.
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();
        if self.name.trim().is_empty() {
            errors.push("Name is required".to_string());
        }
        if self.phone.trim().is_empty() {
            errors.push("Phone is required".to_string());
        }
        if self.email.trim().is_empty() {
            errors.push("Email is required".to_string());
        }
        if !EMAIL_REGEX.is_match(&self.email) {
            errors.push("Invalid email format".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation(ValidationError::Form(errors)))
        }
    }

    /// Builds the payload sent to the signup webhook.
    pub fn into_request(self, submitted_at: DateTime<Utc>) -> LoyaltySignupRequest {
        let client_code = client_code_for_phone(&self.phone);
        LoyaltySignupRequest {
            name: self.name,
            phone: self.phone,
            email: self.email,
            client_code,
            timestamp: submitted_at,
        }
    }
}

/// Signup payload as the webhook receives it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoyaltySignupRequest {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub client_code: String,
    pub timestamp: DateTime<Utc>,
}
