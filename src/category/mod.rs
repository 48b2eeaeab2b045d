//! Category management for grouping expenses.

mod create;
mod db;
mod delete;
mod domain;
mod edit;
mod form;
mod list;
mod service;

pub use create::{create_category_endpoint, get_new_category_page};
pub use db::create_category_table;
pub use delete::delete_category_endpoint;
pub use domain::{Category, CategoryId, CategoryStatistics, CategoryUpdate, NewCategory};
pub use edit::{get_edit_category_page, update_category_endpoint};
pub use list::get_categories_page;
pub use service::{
    categories_with_expense_counts, category_statistics, create_category, delete_category,
    get_category, get_category_by_name, list_categories, update_category,
};

pub(crate) use db::insert_category;
pub(crate) use domain::check_max_length;
