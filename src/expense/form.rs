//! The form shared by the create and edit expense pages.

use std::str::FromStr;

use maud::{Markup, html};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error, endpoints,
    category::{Category, CategoryId},
    expense::{
        Expense, ExpenseUpdate, NewExpense,
        domain::{MAX_DESCRIPTION_LENGTH, MAX_NOTES_LENGTH},
    },
    html::{
        BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, link, loading_spinner,
    },
};

/// Form data for expense creation and editing.
///
/// The amount is kept as the text that was typed so the form can be shown
/// again unchanged when it is rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseFormData {
    pub amount: String,
    pub description: String,
    pub expense_date: Date,
    pub category_id: Option<CategoryId>,
    pub notes: Option<String>,
}

impl ExpenseFormData {
    /// An empty form dated `today`.
    pub fn empty(today: Date) -> Self {
        Self {
            amount: String::new(),
            description: String::new(),
            expense_date: today,
            category_id: None,
            notes: None,
        }
    }

    fn parse_amount(&self) -> Result<Decimal, Error> {
        Decimal::from_str(self.amount.trim())
            .map_err(|_| Error::invalid("amount", "must be a number"))
    }

    fn require_category(&self) -> Result<CategoryId, Error> {
        self.category_id
            .ok_or_else(|| Error::invalid("category_id", "must be selected"))
    }
}

impl TryFrom<ExpenseFormData> for NewExpense {
    type Error = Error;

    fn try_from(form: ExpenseFormData) -> Result<Self, Self::Error> {
        Ok(NewExpense {
            amount: form.parse_amount()?,
            category_id: form.require_category()?,
            description: form.description,
            expense_date: form.expense_date,
            notes: form.notes,
        })
    }
}

impl TryFrom<ExpenseFormData> for ExpenseUpdate {
    type Error = Error;

    /// Every input is on the form, so blank notes clear the stored value.
    fn try_from(form: ExpenseFormData) -> Result<Self, Self::Error> {
        Ok(ExpenseUpdate {
            amount: Some(form.parse_amount()?),
            category_id: Some(form.require_category()?),
            description: Some(form.description),
            expense_date: Some(form.expense_date),
            notes: Some(form.notes),
        })
    }
}

impl From<&Expense> for ExpenseFormData {
    fn from(expense: &Expense) -> Self {
        ExpenseFormData {
            amount: expense.amount.to_string(),
            description: expense.description.clone(),
            expense_date: expense.expense_date,
            category_id: Some(expense.category_id),
            notes: expense.notes.clone(),
        }
    }
}

/// How the form is submitted.
pub enum FormMethod {
    Post,
    Put,
}

pub struct ExpenseFormView<'a> {
    pub method: FormMethod,
    pub endpoint: &'a str,
    pub values: &'a ExpenseFormData,
    pub categories: &'a [Category],
    pub max_date: Date,
    pub error_message: Option<&'a str>,
    pub submit_label: &'a str,
}

impl ExpenseFormView<'_> {
    pub fn into_html(self) -> Markup {
        if self.categories.is_empty() {
            return html! {
                p
                {
                    "You need a category before you can record an expense. "
                    (link(endpoints::NEW_CATEGORY_VIEW, "Create a category"))
                    " first."
                }
            };
        }

        let (hx_post, hx_put) = match self.method {
            FormMethod::Post => (Some(self.endpoint), None),
            FormMethod::Put => (None, Some(self.endpoint)),
        };
        let values = self.values;

        html! {
            form
                hx-post=[hx_post]
                hx-put=[hx_put]
                hx-swap="outerHTML"
                hx-target-error="#alert-container"
                hx-indicator="#indicator"
                class="w-full space-y-4 md:space-y-6"
            {
                div
                {
                    label for="amount" class=(FORM_LABEL_STYLE) { "Amount" }

                    input
                        id="amount"
                        type="number"
                        name="amount"
                        step="0.01"
                        min="0.01"
                        placeholder="0.00"
                        value=(values.amount)
                        required
                        autofocus
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="description" class=(FORM_LABEL_STYLE) { "Description" }

                    input
                        id="description"
                        type="text"
                        name="description"
                        placeholder="What was it for?"
                        value=(values.description)
                        maxlength=(MAX_DESCRIPTION_LENGTH)
                        required
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="expense_date" class=(FORM_LABEL_STYLE) { "Date" }

                    input
                        id="expense_date"
                        type="date"
                        name="expense_date"
                        max=(self.max_date)
                        value=(values.expense_date)
                        required
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="category_id" class=(FORM_LABEL_STYLE) { "Category" }

                    select
                        id="category_id"
                        name="category_id"
                        required
                        class=(FORM_TEXT_INPUT_STYLE)
                    {
                        option value="" { "Select a category" }

                        @for category in self.categories {
                            option
                                value=(category.id)
                                selected[values.category_id == Some(category.id)]
                            {
                                (category.name)
                            }
                        }
                    }
                }

                div
                {
                    label for="notes" class=(FORM_LABEL_STYLE) { "Notes" }

                    textarea
                        id="notes"
                        name="notes"
                        rows="3"
                        maxlength=(MAX_NOTES_LENGTH)
                        class=(FORM_TEXT_INPUT_STYLE)
                    {
                        (values.notes.as_deref().unwrap_or_default())
                    }
                }

                @if let Some(error_message) = self.error_message {
                    p class="text-red-600 dark:text-red-400" { (error_message) }
                }

                button type="submit" id="indicator" class=(BUTTON_PRIMARY_STYLE)
                {
                    span class="htmx-indicator" { (loading_spinner()) }
                    (self.submit_label)
                }
            }
        }
    }
}
