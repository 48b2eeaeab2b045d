//! Core expense domain types and their field checks.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::{
    Error,
    category::{CategoryId, check_max_length},
    patch::deserialize_some,
};

/// Database identifier for an expense.
pub type ExpenseId = i64;

/// The maximum number of characters in an expense description.
pub const MAX_DESCRIPTION_LENGTH: usize = 255;
/// The maximum number of characters in an expense's notes.
pub const MAX_NOTES_LENGTH: usize = 500;
/// The largest amount that can be stored for a single expense.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(1_410_065_407, 2, 0, false, 2);

/// Money spent on a particular day, filed under one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Expense {
    /// The ID assigned by the database.
    pub id: ExpenseId,
    /// The amount spent, always positive with two decimal places.
    pub amount: Decimal,
    /// What the money was spent on.
    pub description: String,
    /// The day the money was spent.
    pub expense_date: Date,
    /// The category the expense is filed under.
    pub category_id: CategoryId,
    /// Any extra details.
    pub notes: Option<String>,
    /// When the expense was created.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// When the expense was last changed.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// The data needed to create an [Expense].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewExpense {
    /// The amount spent, greater than zero with at most two decimal places.
    pub amount: Decimal,
    /// What the money was spent on, 1 to 255 characters.
    pub description: String,
    /// The day the money was spent, no later than today.
    pub expense_date: Date,
    /// An existing category.
    pub category_id: CategoryId,
    /// At most 500 characters.
    #[serde(default)]
    pub notes: Option<String>,
}

impl NewExpense {
    /// Check the length and format of each field.
    ///
    /// Whether the amount is positive, the date is in the past and the
    /// category exists are business rules checked when the expense is saved.
    ///
    /// # Errors
    /// Returns [Error::Validation] naming the first field that fails.
    pub fn validate(&self) -> Result<(), Error> {
        validate_amount_format(self.amount)?;
        validate_description(&self.description)?;

        if let Some(notes) = &self.notes {
            check_max_length("notes", notes, MAX_NOTES_LENGTH)?;
        }

        Ok(())
    }
}

/// A partial update to an [Expense].
///
/// `None` means the field was not provided and is left as is. For the notes,
/// `Some(None)` clears the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ExpenseUpdate {
    /// The new amount.
    #[serde(default)]
    pub amount: Option<Decimal>,
    /// The new description.
    #[serde(default)]
    pub description: Option<String>,
    /// The new date.
    #[serde(default)]
    pub expense_date: Option<Date>,
    /// The new category.
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    /// The new notes.
    #[serde(default, deserialize_with = "deserialize_some")]
    pub notes: Option<Option<String>>,
}

impl ExpenseUpdate {
    /// Check the length and format of each field that is present.
    ///
    /// # Errors
    /// Returns [Error::Validation] naming the first field that fails.
    pub fn validate(&self) -> Result<(), Error> {
        if let Some(amount) = self.amount {
            validate_amount_format(amount)?;
        }

        if let Some(description) = &self.description {
            validate_description(description)?;
        }

        if let Some(Some(notes)) = &self.notes {
            check_max_length("notes", notes, MAX_NOTES_LENGTH)?;
        }

        Ok(())
    }

    /// Copy the fields that are present onto `expense`.
    pub(crate) fn apply_to(self, expense: &mut Expense) {
        if let Some(amount) = self.amount {
            expense.amount = amount;
        }

        if let Some(description) = self.description {
            expense.description = description;
        }

        if let Some(expense_date) = self.expense_date {
            expense.expense_date = expense_date;
        }

        if let Some(category_id) = self.category_id {
            expense.category_id = category_id;
        }

        if let Some(notes) = self.notes {
            expense.notes = notes;
        }
    }
}

/// Counts over all expenses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExpenseStatistics {
    /// The number of expenses in the database.
    pub total_expenses: u64,
}

/// How much was spent in one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategorySpending {
    /// The category's ID.
    pub category_id: CategoryId,
    /// The category's name.
    pub category: String,
    /// The category's colour.
    pub color: Option<String>,
    /// The number of expenses in the category.
    pub count: u64,
    /// The sum of the expenses in the category.
    pub total: Decimal,
}

/// How much was spent in one calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MonthlySpending {
    /// The year, e.g. 2025.
    pub year: i32,
    /// The month of the year, 1 to 12.
    pub month: u8,
    /// The sum of the expenses in the month.
    pub total: Decimal,
}

/// Narrows down the expenses shown on the expenses page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpenseFilter {
    /// Only show expenses in this category.
    pub category_id: Option<CategoryId>,
    /// Only show expenses whose description contains this text.
    pub keyword: Option<String>,
}

/// Whether `amount` is positive.
pub(crate) fn validate_amount_sign(amount: Decimal) -> Result<(), Error> {
    if amount <= Decimal::ZERO {
        return Err(Error::invalid("amount", "must be positive"));
    }

    Ok(())
}

/// Whether `expense_date` is on or before `today`.
pub(crate) fn validate_expense_date(expense_date: Date, today: Date) -> Result<(), Error> {
    if expense_date > today {
        return Err(Error::invalid("expense_date", "cannot be in the future"));
    }

    Ok(())
}

fn validate_amount_format(amount: Decimal) -> Result<(), Error> {
    if amount.normalize().scale() > 2 {
        return Err(Error::invalid(
            "amount",
            "must have at most 2 decimal places",
        ));
    }

    if amount > MAX_AMOUNT {
        return Err(Error::invalid(
            "amount",
            format!("must be at most {MAX_AMOUNT}"),
        ));
    }

    Ok(())
}

fn validate_description(description: &str) -> Result<(), Error> {
    let length = description.chars().count();

    if length == 0 || length > MAX_DESCRIPTION_LENGTH {
        return Err(Error::invalid(
            "description",
            format!("must be between 1 and {MAX_DESCRIPTION_LENGTH} characters"),
        ));
    }

    Ok(())
}

/// Convert an amount with at most two decimal places into whole cents.
pub(crate) fn to_cents(amount: Decimal) -> i64 {
    let mut amount = amount.round_dp(2);
    amount.rescale(2);

    amount.mantissa() as i64
}

/// Convert whole cents back into an amount with two decimal places.
pub(crate) fn from_cents(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}
