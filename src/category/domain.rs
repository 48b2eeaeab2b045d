//! Core category domain types and their field checks.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{Error, patch::deserialize_some};

/// Database identifier for a category.
pub type CategoryId = i64;

/// The maximum number of characters in a category name.
pub const MAX_NAME_LENGTH: usize = 100;
/// The maximum number of characters in a category description.
pub const MAX_DESCRIPTION_LENGTH: usize = 255;
/// The maximum number of characters in a category icon.
pub const MAX_ICON_LENGTH: usize = 50;

/// A grouping for expenses, e.g. 'Food' or 'Transport'.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    /// The ID assigned by the database.
    pub id: CategoryId,
    /// The unique name of the category.
    pub name: String,
    /// Free text describing what the category covers.
    pub description: Option<String>,
    /// An identifier for a glyph to show next to the name.
    pub icon: Option<String>,
    /// A `#RRGGBB` colour used to highlight the category.
    pub color: Option<String>,
    /// When the category was created.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// When the category was last changed.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// The data needed to create a [Category].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct NewCategory {
    /// The unique name of the category, 1 to 100 characters.
    pub name: String,
    /// At most 255 characters.
    #[serde(default)]
    pub description: Option<String>,
    /// At most 50 characters.
    #[serde(default)]
    pub icon: Option<String>,
    /// A `#RRGGBB` colour.
    #[serde(default)]
    pub color: Option<String>,
}

impl NewCategory {
    /// Check the length and format of each field.
    ///
    /// # Errors
    /// Returns [Error::Validation] naming the first field that fails.
    pub fn validate(&self) -> Result<(), Error> {
        validate_name(&self.name)?;
        validate_optional_fields(
            self.description.as_deref(),
            self.icon.as_deref(),
            self.color.as_deref(),
        )
    }
}

/// A partial update to a [Category].
///
/// `None` means the field was not provided and is left as is. For the optional
/// columns, `Some(None)` clears the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CategoryUpdate {
    /// The new name.
    #[serde(default)]
    pub name: Option<String>,
    /// The new description.
    #[serde(default, deserialize_with = "deserialize_some")]
    pub description: Option<Option<String>>,
    /// The new icon.
    #[serde(default, deserialize_with = "deserialize_some")]
    pub icon: Option<Option<String>>,
    /// The new colour.
    #[serde(default, deserialize_with = "deserialize_some")]
    pub color: Option<Option<String>>,
}

impl CategoryUpdate {
    /// Check the length and format of each field that is present.
    ///
    /// # Errors
    /// Returns [Error::Validation] naming the first field that fails.
    pub fn validate(&self) -> Result<(), Error> {
        if let Some(name) = &self.name {
            validate_name(name)?;
        }

        validate_optional_fields(
            self.description.clone().flatten().as_deref(),
            self.icon.clone().flatten().as_deref(),
            self.color.clone().flatten().as_deref(),
        )
    }

    /// Copy the fields that are present onto `category`.
    pub(crate) fn apply_to(self, category: &mut Category) {
        if let Some(name) = self.name {
            category.name = name;
        }

        if let Some(description) = self.description {
            category.description = description;
        }

        if let Some(icon) = self.icon {
            category.icon = icon;
        }

        if let Some(color) = self.color {
            category.color = color;
        }
    }
}

/// Counts over all categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CategoryStatistics {
    /// The number of categories in the database.
    pub total_categories: u64,
}

fn validate_name(name: &str) -> Result<(), Error> {
    let length = name.chars().count();

    if length == 0 || length > MAX_NAME_LENGTH {
        return Err(Error::invalid(
            "name",
            format!("must be between 1 and {MAX_NAME_LENGTH} characters"),
        ));
    }

    Ok(())
}

fn validate_optional_fields(
    description: Option<&str>,
    icon: Option<&str>,
    color: Option<&str>,
) -> Result<(), Error> {
    if let Some(description) = description {
        check_max_length("description", description, MAX_DESCRIPTION_LENGTH)?;
    }

    if let Some(icon) = icon {
        check_max_length("icon", icon, MAX_ICON_LENGTH)?;
    }

    if let Some(color) = color {
        if !is_hex_color(color) {
            return Err(Error::invalid(
                "color",
                "must be a hex colour in the format #RRGGBB",
            ));
        }
    }

    Ok(())
}

/// Fails with [Error::Validation] if `value` has more than `max_length` characters.
pub(crate) fn check_max_length(
    field: &'static str,
    value: &str,
    max_length: usize,
) -> Result<(), Error> {
    if value.chars().count() > max_length {
        return Err(Error::invalid(
            field,
            format!("must be at most {max_length} characters"),
        ));
    }

    Ok(())
}

fn is_hex_color(color: &str) -> bool {
    color.len() == 7
        && color.starts_with('#')
        && color[1..].chars().all(|c| c.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use time::OffsetDateTime;

    use crate::Error;

    use super::{Category, CategoryUpdate, NewCategory};

    fn new_category(name: &str) -> NewCategory {
        NewCategory {
            name: name.to_owned(),
            ..Default::default()
        }
    }

    #[test]
    fn name_must_not_be_empty() {
        let error = new_category("").validate().unwrap_err();

        assert!(matches!(error, Error::Validation { field: "name", .. }));
    }

    #[test]
    fn name_length_counts_characters_not_bytes() {
        assert_eq!(new_category(&"é".repeat(100)).validate(), Ok(()));

        let error = new_category(&"é".repeat(101)).validate().unwrap_err();
        assert!(matches!(error, Error::Validation { field: "name", .. }));
    }

    #[test]
    fn description_and_icon_have_length_limits() {
        let category = NewCategory {
            description: Some("a".repeat(256)),
            ..new_category("Food")
        };
        assert!(matches!(
            category.validate(),
            Err(Error::Validation {
                field: "description",
                ..
            })
        ));

        let category = NewCategory {
            icon: Some("a".repeat(51)),
            ..new_category("Food")
        };
        assert!(matches!(
            category.validate(),
            Err(Error::Validation { field: "icon", .. })
        ));
    }

    #[test]
    fn color_must_be_seven_character_hex() {
        for valid in ["#FF6B6B", "#4ecdc4", "#000000"] {
            let category = NewCategory {
                color: Some(valid.to_owned()),
                ..new_category("Food")
            };
            assert_eq!(category.validate(), Ok(()), "{valid} should be valid");
        }

        for invalid in ["FF6B6B", "#FF6B6", "#FF6B6BB", "#GG0000", "#ÿÿÿ"] {
            let category = NewCategory {
                color: Some(invalid.to_owned()),
                ..new_category("Food")
            };
            assert!(
                matches!(
                    category.validate(),
                    Err(Error::Validation { field: "color", .. })
                ),
                "{invalid} should be invalid"
            );
        }
    }

    #[test]
    fn update_json_distinguishes_missing_and_null() {
        let update: CategoryUpdate =
            serde_json::from_str(r##"{"description": null, "color": "#123456"}"##).unwrap();

        assert_eq!(
            update,
            CategoryUpdate {
                name: None,
                description: Some(None),
                icon: None,
                color: Some(Some("#123456".to_owned())),
            }
        );
    }

    #[test]
    fn update_treats_null_name_as_missing() {
        let update: CategoryUpdate = serde_json::from_str(r#"{"name": null}"#).unwrap();

        assert_eq!(update.name, None);
        assert_eq!(update.validate(), Ok(()));
    }

    #[test]
    fn apply_to_only_changes_present_fields() {
        let now = OffsetDateTime::now_utc();
        let mut category = Category {
            id: 1,
            name: "Food".to_owned(),
            description: Some("Meals".to_owned()),
            icon: Some("utensils".to_owned()),
            color: Some("#FF6B6B".to_owned()),
            created_at: now,
            updated_at: now,
        };

        CategoryUpdate {
            name: Some("Groceries".to_owned()),
            description: Some(None),
            ..Default::default()
        }
        .apply_to(&mut category);

        assert_eq!(category.name, "Groceries");
        assert_eq!(category.description, None);
        assert_eq!(category.icon.as_deref(), Some("utensils"));
        assert_eq!(category.color.as_deref(), Some("#FF6B6B"));
    }
}
