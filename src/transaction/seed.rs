//! Loads transactions from the product feed, replacing everything in the database.

use std::time::Duration;

use reqwest::Client;
use rusqlite::Connection;
use serde::Deserialize;
use time::OffsetDateTime;

use crate::Error;

use super::core::{Transaction, TransactionBuilder, create_transaction, delete_all_transactions};

/// Where the product feed is published.
pub const DEFAULT_FEED_URL: &str = "https://s3.amazonaws.com/roxiler.com/product_transaction.json";

/// A transaction as it appears in the feed.
///
/// Fields not listed here, such as the feed's own `id`, are ignored.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FeedTransaction {
    title: String,
    price: f64,
    description: String,
    category: String,
    image: String,
    sold: bool,
    #[serde(with = "time::serde::rfc3339")]
    date_of_sale: OffsetDateTime,
}

impl FeedTransaction {
    fn into_builder(self) -> Result<TransactionBuilder, Error> {
        let category = self.category.parse()?;

        Ok(
            Transaction::build(&self.title, self.price, category, self.date_of_sale)
                .description(&self.description)
                .image(&self.image)
                .sold(self.sold),
        )
    }
}

/// Parse the JSON array published by the feed.
///
/// # Errors
/// Returns a:
/// - [Error::FeedUnavailable] if `json` is not an array of feed transactions,
/// - or [Error::InvalidCategory] if a transaction has an unknown category.
pub fn parse_feed(json: &str) -> Result<Vec<TransactionBuilder>, Error> {
    let feed: Vec<FeedTransaction> = serde_json::from_str(json)
        .map_err(|error| Error::FeedUnavailable(format!("invalid feed JSON: {error}")))?;

    feed.into_iter().map(FeedTransaction::into_builder).collect()
}

/// A HTTP client for the product feed.
#[derive(Debug, Clone)]
pub struct FeedClient {
    client: Client,
    url: String,
}

impl FeedClient {
    /// Create a client that fetches the feed from `url`, giving up after `timeout`.
    ///
    /// # Errors
    /// Returns [Error::FeedUnavailable] if the HTTP client cannot be created.
    pub fn new(url: &str, timeout: Duration) -> Result<Self, Error> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| Error::FeedUnavailable(format!("could not build client: {error}")))?;

        Ok(Self {
            client,
            url: url.to_owned(),
        })
    }

    /// The URL the feed is fetched from.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Download and parse the feed.
    ///
    /// # Errors
    /// Returns [Error::FeedUnavailable] if the request fails or the response is
    /// not a success, and the errors of [parse_feed] otherwise.
    pub async fn fetch(&self) -> Result<Vec<TransactionBuilder>, Error> {
        tracing::info!("Fetching transaction feed from {}", self.url);

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|error| Error::FeedUnavailable(error.to_string()))?;

        if !response.status().is_success() {
            return Err(Error::FeedUnavailable(format!(
                "{} returned status {}",
                self.url,
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|error| Error::FeedUnavailable(error.to_string()))?;

        parse_feed(&body)
    }
}

/// Replace every transaction in the database with `builders`.
///
/// Runs in a single SQL transaction, so on error the previous transactions
/// are kept. Returns the number of inserted transactions.
///
/// # Errors
/// Returns the first error from [create_transaction], or [Error::SqlError].
pub fn replace_all_transactions(
    builders: Vec<TransactionBuilder>,
    connection: &Connection,
) -> Result<usize, Error> {
    let tx = connection.unchecked_transaction()?;

    let deleted = delete_all_transactions(&tx)?;

    let mut inserted = 0;
    for builder in builders {
        create_transaction(builder, &tx)?;
        inserted += 1;
    }

    tx.commit()?;

    tracing::info!("Replaced {deleted} transactions with {inserted} transactions");

    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;
    use time::macros::datetime;

    use crate::{
        Error,
        db::initialize,
        transaction::{Category, Transaction, count_transactions, create_transaction},
    };

    use super::{parse_feed, replace_all_transactions};

    const FEED: &str = r#"[
        {
            "id": 1,
            "title": "Fjallraven Backpack",
            "price": 329.85,
            "description": "Your perfect pack for everyday use",
            "category": "men's clothing",
            "image": "https://example.com/1.jpg",
            "sold": false,
            "dateOfSale": "2021-11-27T20:29:54+05:30"
        },
        {
            "id": 2,
            "title": "Gold Ring",
            "price": 9.99,
            "description": "Classic",
            "category": "jewelery",
            "image": "https://example.com/2.jpg",
            "sold": true,
            "dateOfSale": "2022-03-01T01:00:00+05:30"
        }
    ]"#;

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    #[test]
    fn parses_feed() {
        let got = parse_feed(FEED).expect("Could not parse feed");

        let want = vec![
            Transaction::build(
                "Fjallraven Backpack",
                329.85,
                Category::MensClothing,
                datetime!(2021-11-27 20:29:54 +05:30),
            )
            .description("Your perfect pack for everyday use")
            .image("https://example.com/1.jpg"),
            Transaction::build(
                "Gold Ring",
                9.99,
                Category::Jewelery,
                datetime!(2022-03-01 01:00:00 +05:30),
            )
            .description("Classic")
            .image("https://example.com/2.jpg")
            .sold(true),
        ];
        assert_eq!(want, got);
    }

    #[test]
    fn rejects_unknown_category() {
        let json = FEED.replace("jewelery", "shoes");

        assert_eq!(
            parse_feed(&json),
            Err(Error::InvalidCategory("shoes".to_owned()))
        );
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(matches!(
            parse_feed("{\"not\": \"a list\"}"),
            Err(Error::FeedUnavailable(_))
        ));
    }

    #[test]
    fn replace_all_swaps_contents() {
        let conn = get_test_connection();
        for _ in 0..5 {
            create_transaction(
                Transaction::build("old", 1.0, Category::Electronics, datetime!(2022-01-01 0:00 UTC)),
                &conn,
            )
            .unwrap();
        }

        let inserted = replace_all_transactions(parse_feed(FEED).unwrap(), &conn).unwrap();

        assert_eq!(inserted, 2);
        assert_eq!(count_transactions(&conn).unwrap(), 2);
        let months: Vec<u8> = conn
            .prepare("SELECT month_of_sale FROM \"transaction\" ORDER BY id")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .map(|month| month.unwrap())
            .collect();
        assert_eq!(months, [11, 3]);
    }

    #[test]
    fn replace_all_keeps_old_data_on_error() {
        let conn = get_test_connection();
        create_transaction(
            Transaction::build("old", 1.0, Category::Electronics, datetime!(2022-01-01 0:00 UTC)),
            &conn,
        )
        .unwrap();

        let mut builders = parse_feed(FEED).unwrap();
        builders.push(Transaction::build(
            "bad",
            -5.0,
            Category::Electronics,
            datetime!(2022-01-01 0:00 UTC),
        ));

        let result = replace_all_transactions(builders, &conn);

        assert_eq!(result, Err(Error::InvalidPrice(-5.0)));
        assert_eq!(count_transactions(&conn).unwrap(), 1);
    }
}
