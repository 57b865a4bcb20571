//! Defines the core data models and database queries for transactions.

use std::{fmt::Display, str::FromStr};

use rusqlite::{
    Connection, Row, ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::{Month, OffsetDateTime};

use crate::{Error, db::get_count};

// ============================================================================
// MODELS
// ============================================================================

/// Alias for the integer type used for transaction IDs.
pub type TransactionId = i64;

/// The closed set of product categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    /// Clothing for men.
    #[serde(rename = "men's clothing")]
    MensClothing,
    /// Jewellery (spelt as it appears in the feed).
    #[serde(rename = "jewelery")]
    Jewelery,
    /// Electronics.
    #[serde(rename = "electronics")]
    Electronics,
    /// Clothing for women.
    #[serde(rename = "women's clothing")]
    WomensClothing,
}

impl Category {
    /// Every category, in the order they are stored.
    pub const ALL: [Category; 4] = [
        Category::MensClothing,
        Category::Jewelery,
        Category::Electronics,
        Category::WomensClothing,
    ];

    /// The label used on the wire and in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::MensClothing => "men's clothing",
            Category::Jewelery => "jewelery",
            Category::Electronics => "electronics",
            Category::WomensClothing => "women's clothing",
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|category| category.as_str() == s)
            .ok_or_else(|| Error::InvalidCategory(s.to_owned()))
    }
}

impl ToSql for Category {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Category {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error: Error| FromSqlError::Other(Box::new(error)))
    }
}

/// A product sale, i.e. a product listing and whether and when it was sold.
///
/// To create a new `Transaction`, use [Transaction::build].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The product name.
    pub title: String,
    /// The sale price of the product.
    pub price: f64,
    /// A text description of the product.
    pub description: String,
    /// The product category.
    pub category: Category,
    /// A URI for a picture of the product.
    pub image: String,
    /// Whether the product was sold.
    pub sold: bool,
    /// When the sale happened.
    #[serde(with = "time::serde::rfc3339")]
    pub date_of_sale: OffsetDateTime,
    /// The calendar month of `date_of_sale`, from 1 to 12.
    ///
    /// Derived once when the transaction is created and never recomputed.
    pub month_of_sale: u8,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [TransactionBuilder] for discoverability.
    pub fn build(
        title: &str,
        price: f64,
        category: Category,
        date_of_sale: OffsetDateTime,
    ) -> TransactionBuilder {
        TransactionBuilder {
            title: title.to_owned(),
            price,
            description: String::new(),
            category,
            image: String::new(),
            sold: false,
            date_of_sale,
        }
    }
}

/// A builder for creating [Transaction] instances.
///
/// Pass the finished builder to [create_transaction] to store it.
#[derive(Debug, PartialEq, Clone)]
pub struct TransactionBuilder {
    /// The product name.
    pub title: String,
    /// The sale price, must be finite and non-negative.
    pub price: f64,
    /// Defaults to an empty string.
    pub description: String,
    /// The product category.
    pub category: Category,
    /// Defaults to an empty string.
    pub image: String,
    /// Defaults to `false`.
    pub sold: bool,
    /// When the sale happened.
    pub date_of_sale: OffsetDateTime,
}

impl TransactionBuilder {
    /// Set the product description.
    pub fn description(mut self, description: &str) -> Self {
        self.description = description.to_owned();
        self
    }

    /// Set the product image URI.
    pub fn image(mut self, image: &str) -> Self {
        self.image = image.to_owned();
        self
    }

    /// Set whether the product was sold.
    pub fn sold(mut self, sold: bool) -> Self {
        self.sold = sold;
        self
    }

    /// The month the transaction will be filed under.
    ///
    /// This is the calendar month of the date of sale in the UTC offset it
    /// was recorded with, so it does not depend on the server's timezone.
    pub fn month_of_sale(&self) -> Month {
        self.date_of_sale.month()
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create a new transaction in the database from a builder.
///
/// The month of sale is derived from the date of sale here and only here.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidPrice] if the price is negative, infinite or NaN,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_transaction(
    builder: TransactionBuilder,
    connection: &Connection,
) -> Result<Transaction, Error> {
    if !builder.price.is_finite() || builder.price < 0.0 {
        return Err(Error::InvalidPrice(builder.price));
    }

    let month_of_sale = builder.month_of_sale() as u8;

    let transaction = connection
        .prepare_cached(
            "INSERT INTO \"transaction\" (title, price, description, category, image, sold, date_of_sale, month_of_sale)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             RETURNING id, title, price, description, category, image, sold, date_of_sale, month_of_sale",
        )?
        .query_row(
            (
                builder.title,
                builder.price,
                builder.description,
                builder.category,
                builder.image,
                builder.sold,
                builder.date_of_sale,
                month_of_sale,
            ),
            map_transaction_row,
        )?;

    Ok(transaction)
}

/// Get the total number of transactions in the database.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
pub fn count_transactions(connection: &Connection) -> Result<u64, Error> {
    connection
        .query_row("SELECT COUNT(id) FROM \"transaction\";", [], |row| {
            get_count(row, 0)
        })
        .map_err(|error| error.into())
}

/// Delete every transaction in the database.
///
/// Returns the number of deleted transactions.
pub(crate) fn delete_all_transactions(connection: &Connection) -> Result<usize, Error> {
    connection
        .execute("DELETE FROM \"transaction\";", ())
        .map_err(|error| error.into())
}

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                price REAL NOT NULL,
                description TEXT NOT NULL,
                category TEXT NOT NULL CHECK (category IN ('men''s clothing', 'jewelery', 'electronics', 'women''s clothing')),
                image TEXT NOT NULL,
                sold INTEGER NOT NULL,
                date_of_sale TEXT NOT NULL,
                month_of_sale INTEGER NOT NULL CHECK (month_of_sale BETWEEN 1 AND 12)
                )",
        (),
    )?;

    // Every query in the app is scoped to a single month.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_month_of_sale ON \"transaction\"(month_of_sale);",
        (),
    )?;

    Ok(())
}

/// The columns read by [map_transaction_row], in order.
pub(crate) const TRANSACTION_COLUMNS: &str =
    "id, title, price, description, category, image, sold, date_of_sale, month_of_sale";

/// Map a database row to a Transaction.
pub(crate) fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    Ok(Transaction {
        id: row.get(0)?,
        title: row.get(1)?,
        price: row.get(2)?,
        description: row.get(3)?,
        category: row.get(4)?,
        image: row.get(5)?,
        sold: row.get(6)?,
        date_of_sale: row.get(7)?,
        month_of_sale: row.get(8)?,
    })
}

// ============================================================================
// TESTS
// ============================================================================
