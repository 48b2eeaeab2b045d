//! Recording, browsing and summarising expenses.

mod create;
mod db;
mod delete;
mod domain;
mod edit;
mod form;
mod list;
mod service;

pub use create::{create_expense_endpoint, get_new_expense_page};
pub use db::create_expense_table;
pub use delete::delete_expense_endpoint;
pub use domain::{
    CategorySpending, Expense, ExpenseFilter, ExpenseId, ExpenseStatistics, ExpenseUpdate,
    MonthlySpending, NewExpense,
};
pub use edit::{get_edit_expense_page, update_expense_endpoint};
pub use list::get_expenses_page;
pub use service::{
    create_expense, delete_expense, expense_statistics, expenses_by_category,
    expenses_by_date_range, filter_expenses, get_expense, list_expenses, monthly_spending,
    recent_expenses, search_expenses, spending_by_category, total_expense_amount, update_expense,
};

pub(crate) use db::{count_expenses_in_category, delete_expenses_in_category, insert_expense};
