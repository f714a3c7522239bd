use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Values a new user starts with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettingsDefaults {
    pub capital: Decimal,
    pub entry: Decimal,
    pub target: Decimal,
}

impl Default for SettingsDefaults {
    fn default() -> Self {
        Self {
            capital: Decimal::from(100),
            entry: Decimal::from(5),
            target: Decimal::from(6),
        }
    }
}

/// Per-user configuration. `entry` and `target` are display-only risk
/// parameters; only `capital` feeds the monthly statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct UserSettings {
    pub user_id: Uuid,
    pub capital: Decimal,
    pub entry: Decimal,
    pub target: Decimal,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl UserSettings {
    pub fn with_defaults(user_id: Uuid, defaults: &SettingsDefaults) -> Self {
        Self {
            user_id,
            capital: defaults.capital,
            entry: defaults.entry,
            target: defaults.target,
            name: None,
            phone: None,
            created_at: None,
            updated_at: None,
        }
    }

    /// Defaults with the profile fields filled in, as registration stores them.
    pub fn for_new_user(
        user_id: Uuid,
        defaults: &SettingsDefaults,
        name: Option<String>,
        phone: Option<String>,
    ) -> Self {
        Self {
            name: Some(name.unwrap_or_default()),
            phone: Some(phone.unwrap_or_default()),
            ..Self::with_defaults(user_id, defaults)
        }
    }
}

/// Format a Brazilian phone number as `(XX) XXXXX-XXXX` from whatever the
/// user typed. Non-digits are dropped; inputs longer than 11 digits are
/// returned as bare digits.
pub fn format_phone(raw: &str) -> String {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() > 11 {
        return digits;
    }

    let mut formatted = if digits.len() > 2 {
        format!("({}) {}", &digits[..2], &digits[2..])
    } else {
        digits
    };
    if formatted.len() > 10 {
        formatted.insert(10, '-');
    }
    formatted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_phone_mobile() {
        assert_eq!(format_phone("11987654321"), "(11) 98765-4321");
        assert_eq!(format_phone("(11) 98765-4321"), "(11) 98765-4321");
    }

    #[test]
    fn test_format_phone_partial_input() {
        assert_eq!(format_phone(""), "");
        assert_eq!(format_phone("11"), "11");
        assert_eq!(format_phone("119"), "(11) 9");
        assert_eq!(format_phone("1198765"), "(11) 98765");
    }

    #[test]
    fn test_format_phone_too_long_keeps_digits() {
        assert_eq!(format_phone("+55 11 98765-4321"), "5511987654321");
    }

    #[test]
    fn test_new_user_settings_carry_profile() {
        let user = Uuid::new_v4();
        let settings = UserSettings::for_new_user(
            user,
            &SettingsDefaults::default(),
            Some("Ana".into()),
            None,
        );
        assert_eq!(settings.capital, Decimal::from(100));
        assert_eq!(settings.name.as_deref(), Some("Ana"));
        assert_eq!(settings.phone.as_deref(), Some(""));
    }
}
