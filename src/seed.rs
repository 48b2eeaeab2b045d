//! Sample data for a fresh database.

use rusqlite::Connection;
use rust_decimal::Decimal;
use time::{Date, Duration, OffsetDateTime};

use crate::{
    Error,
    category::{NewCategory, category_statistics, insert_category},
    expense::{NewExpense, insert_expense},
};

struct SeedCategory {
    name: &'static str,
    description: &'static str,
    icon: &'static str,
    color: &'static str,
}

const CATEGORIES: [SeedCategory; 6] = [
    SeedCategory {
        name: "Food",
        description: "Groceries, restaurants, snacks",
        icon: "fas fa-utensils",
        color: "#FF6B6B",
    },
    SeedCategory {
        name: "Transport",
        description: "Public transport, fuel, taxi",
        icon: "fas fa-car",
        color: "#4ECDC4",
    },
    SeedCategory {
        name: "Entertainment",
        description: "Movies, concerts, games",
        icon: "fas fa-film",
        color: "#45B7D1",
    },
    SeedCategory {
        name: "Shopping",
        description: "Clothes, gifts, online shopping",
        icon: "fas fa-shopping-bag",
        color: "#96CEB4",
    },
    SeedCategory {
        name: "Bills",
        description: "Utilities, rent, subscriptions",
        icon: "fas fa-file-invoice",
        color: "#FECA57",
    },
    SeedCategory {
        name: "Health",
        description: "Medicine, doctor, gym",
        icon: "fas fa-medkit",
        color: "#FF9FF3",
    },
];

/// (description, index into [CATEGORIES], amount in cents, days before today)
const EXPENSES: [(&str, usize, i64, i64); 18] = [
    ("Lunch at cafe", 0, 1_850, 0),
    ("Bus ticket", 1, 420, 1),
    ("Groceries", 0, 8_735, 2),
    ("Movie night", 2, 3_200, 3),
    ("Electricity bill", 4, 14_260, 5),
    ("Pharmacy purchase", 5, 2_499, 6),
    ("Taxi ride", 1, 3_150, 8),
    ("New shoes", 3, 12_900, 9),
    ("Dinner with friends", 0, 6_480, 11),
    ("Streaming subscription", 4, 1_599, 13),
    ("Fuel refill", 1, 7_210, 15),
    ("Concert ticket", 2, 11_500, 17),
    ("Gym membership", 5, 5_500, 19),
    ("Gift for friend", 3, 4_575, 21),
    ("Water bill", 4, 6_830, 23),
    ("Snack", 0, 550, 25),
    ("Game purchase", 2, 7_999, 27),
    ("Doctor visit", 5, 9_000, 29),
];

/// Fill an empty database with a handful of categories and recent expenses.
///
/// Does nothing if any category exists, so it is safe to call on every start.
/// Expense dates are counted back from `today` and span the last 30 days.
/// The sample data is written in a single transaction, so a failure leaves
/// the database empty and the next start tries again.
///
/// # Errors
/// Returns an error if the sample data cannot be inserted.
pub fn seed_database(connection: &Connection, today: Date) -> Result<(), Error> {
    if category_statistics(connection)?.total_categories > 0 {
        tracing::info!("Categories already exist, skipping sample data");
        return Ok(());
    }

    let now = OffsetDateTime::now_utc();
    let transaction = connection.unchecked_transaction()?;
    let mut category_ids = Vec::with_capacity(CATEGORIES.len());

    for seed in &CATEGORIES {
        let new_category = NewCategory {
            name: seed.name.to_owned(),
            description: Some(seed.description.to_owned()),
            icon: Some(seed.icon.to_owned()),
            color: Some(seed.color.to_owned()),
        };
        new_category.validate()?;

        let category = insert_category(&new_category, now, &transaction)?;
        category_ids.push(category.id);
    }

    for (description, category_index, cents, days_ago) in EXPENSES {
        let new_expense = NewExpense {
            amount: Decimal::new(cents, 2),
            description: description.to_owned(),
            expense_date: today - Duration::days(days_ago),
            category_id: category_ids[category_index],
            notes: None,
        };
        new_expense.validate()?;

        insert_expense(&new_expense, now, &transaction)?;
    }

    transaction.commit()?;

    tracing::info!(
        "Seeded {} categories and {} expenses",
        CATEGORIES.len(),
        EXPENSES.len()
    );

    Ok(())
}
