//! User profile and the admin role rule.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::Age;
use crate::domain::foundation::ValidationError;

/// Role stored on the profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    User,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

/// Details collected by the registration form for a standard user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationDetails {
    pub name: String,
    pub birthdate: Option<NaiveDate>,
    pub gender: Option<Gender>,
}

impl RegistrationDetails {
    pub fn new(
        name: impl Into<String>,
        birthdate: Option<NaiveDate>,
        gender: Option<Gender>,
    ) -> Result<Self, ValidationError> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(ValidationError::empty_field("name"));
        }
        Ok(Self {
            name,
            birthdate,
            gender,
        })
    }
}

/// Profile fields of a user document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub email: String,
    pub name: String,
    pub role: Role,
    pub is_admin: bool,
    pub birthdate: Option<NaiveDate>,
    pub gender: Option<Gender>,
    #[serde(default)]
    pub age_years: u32,
    #[serde(default)]
    pub age_months: u32,
}

impl UserProfile {
    /// Profile of the administrator account.
    pub fn admin(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: "Admin".to_string(),
            role: Role::Admin,
            is_admin: true,
            birthdate: None,
            gender: None,
            age_years: 0,
            age_months: 0,
        }
    }

    /// Profile of a standard user, with age computed as of `today`.
    pub fn member(email: impl Into<String>, details: RegistrationDetails, today: NaiveDate) -> Self {
        let age = details
            .birthdate
            .map(|birthdate| Age::between(birthdate, today))
            .unwrap_or_default();
        Self {
            email: email.into(),
            name: details.name,
            role: Role::User,
            is_admin: false,
            birthdate: details.birthdate,
            gender: details.gender,
            age_years: age.years,
            age_months: age.months,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.is_admin || self.role == Role::Admin
    }

    pub fn age(&self) -> Age {
        Age {
            years: self.age_years,
            months: self.age_months,
        }
    }

    /// Age implied by the stored birthdate as of `today`.
    pub fn current_age(&self, today: NaiveDate) -> Option<Age> {
        self.birthdate.map(|birthdate| Age::between(birthdate, today))
    }

    /// True when the stored age no longer matches the birthdate.
    pub fn age_is_stale(&self, today: NaiveDate) -> bool {
        match self.current_age(today) {
            Some(age) => age != self.age(),
            None => false,
        }
    }
}

/// Decides who is an administrator.
///
/// There is exactly one admin email, plus the role flag stored on the
/// profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminPolicy {
    admin_email: String,
}

impl AdminPolicy {
    pub fn new(admin_email: impl Into<String>) -> Self {
        Self {
            admin_email: admin_email.into().trim().to_lowercase(),
        }
    }

    pub fn is_admin_email(&self, email: &str) -> bool {
        email.trim().to_lowercase() == self.admin_email
    }

    pub fn is_admin(&self, email: &str, profile: Option<&UserProfile>) -> bool {
        self.is_admin_email(email) || profile.map(UserProfile::is_admin).unwrap_or(false)
    }
}
