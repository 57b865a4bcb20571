//! Builds the filtered, paginated transaction list for a month.

use rusqlite::{Connection, params_from_iter, types::Value};
use time::Month;

use crate::{Error, db::UNICODE_CONTAINS, pagination::Page};

use super::core::{TRANSACTION_COLUMNS, Transaction, map_transaction_row};

/// A query for the transactions sold in a month.
///
/// Build one with [TransactionQuery::new], optionally layer on a search and a
/// page, then run it with [TransactionQuery::execute]. Results are in
/// insertion order so that consecutive pages neither overlap nor skip rows.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionQuery {
    month: Month,
    search: Option<SearchTerm>,
    page: Option<Page>,
}

/// Free text search over a transaction's title, description and price.
#[derive(Debug, Clone, PartialEq)]
struct SearchTerm {
    /// Matched literally anywhere in a field, ignoring case.
    text: String,
    /// Set when the text is also a number, to match prices exactly.
    price: Option<f64>,
}

impl SearchTerm {
    fn new(text: &str) -> Self {
        Self {
            text: text.to_owned(),
            price: text
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|price| price.is_finite()),
        }
    }
}

impl TransactionQuery {
    /// Start a query for every transaction in `month`.
    pub fn new(month: Month) -> Self {
        Self {
            month,
            search: None,
            page: None,
        }
    }

    /// Only keep transactions matching `search`.
    ///
    /// A transaction matches if its title or description contains the text,
    /// ignoring case, or if the text is a number equal to its price.
    /// `None` and the empty string leave the query unchanged.
    pub fn search(mut self, search: Option<&str>) -> Self {
        self.search = search
            .filter(|text| !text.is_empty())
            .map(SearchTerm::new);
        self
    }

    /// Only return the transactions on `page`.
    pub fn paginate(mut self, page: Page) -> Self {
        self.page = Some(page);
        self
    }

    /// Build the SQL for this query and its positional parameters.
    fn to_sql(&self) -> (String, Vec<Value>) {
        let mut params = vec![Value::Integer(self.month as i64)];
        let mut query = format!(
            "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\" WHERE month_of_sale = ?1"
        );

        if let Some(search) = &self.search {
            params.push(Value::Text(search.text.clone()));
            query.push_str(&format!(
                " AND ({UNICODE_CONTAINS}(title, ?2) OR {UNICODE_CONTAINS}(description, ?2)"
            ));

            if let Some(price) = search.price {
                params.push(Value::Real(price));
                query.push_str(" OR price = ?3");
            }

            query.push(')');
        }

        query.push_str(" ORDER BY id ASC");

        if let Some(page) = self.page {
            let limit = i64::try_from(page.size).unwrap_or(i64::MAX);
            let offset = i64::try_from(page.offset()).unwrap_or(i64::MAX);
            query.push_str(&format!(
                " LIMIT ?{} OFFSET ?{}",
                params.len() + 1,
                params.len() + 2
            ));
            params.push(Value::Integer(limit));
            params.push(Value::Integer(offset));
        }

        (query, params)
    }

    /// Run the query.
    ///
    /// An empty result is not an error, for a paginated query it means the
    /// previous page was the last.
    ///
    /// # Errors
    /// Returns [Error::SqlError] if the query fails.
    pub fn execute(&self, connection: &Connection) -> Result<Vec<Transaction>, Error> {
        let (query, params) = self.to_sql();
        tracing::debug!("running transaction query: {query}");

        connection
            .prepare(&query)?
            .query_map(params_from_iter(params), map_transaction_row)?
            .map(|transaction_result| transaction_result.map_err(Error::from))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rusqlite::Connection;
    use time::{Month, OffsetDateTime, macros::datetime};

    use crate::{
        db::initialize,
        pagination::Page,
        transaction::{Category, Transaction, create_transaction},
    };

    use super::TransactionQuery;

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    fn insert(
        conn: &Connection,
        title: &str,
        description: &str,
        price: f64,
        date: OffsetDateTime,
    ) -> Transaction {
        create_transaction(
            Transaction::build(title, price, Category::Electronics, date).description(description),
            conn,
        )
        .expect("Could not create transaction")
    }

    fn titles(transactions: &[Transaction]) -> Vec<&str> {
        transactions.iter().map(|t| t.title.as_str()).collect()
    }

    #[test]
    fn filters_by_month() {
        let conn = get_test_connection();
        insert(&conn, "march", "", 1.0, datetime!(2022-03-10 12:00 UTC));
        insert(&conn, "april", "", 1.0, datetime!(2022-04-10 12:00 UTC));
        insert(&conn, "march again", "", 1.0, datetime!(2021-03-31 12:00 UTC));

        let got = TransactionQuery::new(Month::March).execute(&conn).unwrap();

        assert_eq!(titles(&got), ["march", "march again"]);
    }

    #[test]
    fn empty_month_is_not_an_error() {
        let conn = get_test_connection();

        let got = TransactionQuery::new(Month::June).execute(&conn).unwrap();

        assert!(got.is_empty());
    }

    #[test]
    fn text_search_matches_title_without_price_clause() {
        let conn = get_test_connection();
        let date = datetime!(2022-05-01 12:00 UTC);
        insert(&conn, "Electric Kettle", "boils water", 123.0, date);
        insert(&conn, "Toaster", "makes toast", 123.0, date);

        let query = TransactionQuery::new(Month::May).search(Some("electr"));
        let got = query.execute(&conn).unwrap();

        assert_eq!(titles(&got), ["Electric Kettle"]);
        assert!(!query.to_sql().0.contains("price ="));
    }

    #[test]
    fn search_is_case_insensitive_and_matches_description() {
        let conn = get_test_connection();
        let date = datetime!(2022-05-01 12:00 UTC);
        insert(&conn, "Ring", "SOLID GOLD band", 10.0, date);
        insert(&conn, "Necklace", "silver chain", 10.0, date);

        let got = TransactionQuery::new(Month::May)
            .search(Some("gold"))
            .execute(&conn)
            .unwrap();

        assert_eq!(titles(&got), ["Ring"]);
    }

    #[test]
    fn numeric_search_ors_price_and_text() {
        let conn = get_test_connection();
        let date = datetime!(2022-05-01 12:00 UTC);
        insert(&conn, "Priced match", "", 150.0, date);
        insert(&conn, "Model 150 speaker", "", 20.0, date);
        insert(&conn, "Monitor", "refresh rate 150Hz", 300.0, date);
        insert(&conn, "No match", "", 151.0, date);

        let got = TransactionQuery::new(Month::May)
            .search(Some("150"))
            .execute(&conn)
            .unwrap();

        assert_eq!(
            titles(&got),
            ["Priced match", "Model 150 speaker", "Monitor"]
        );
    }

    #[test]
    fn fractional_price_search() {
        let conn = get_test_connection();
        let date = datetime!(2022-05-01 12:00 UTC);
        insert(&conn, "Backpack", "", 109.95, date);
        insert(&conn, "Shirt", "", 22.3, date);

        let got = TransactionQuery::new(Month::May)
            .search(Some("109.95"))
            .execute(&conn)
            .unwrap();

        assert_eq!(titles(&got), ["Backpack"]);
    }

    #[test]
    fn wildcards_in_search_match_literally() {
        let conn = get_test_connection();
        let date = datetime!(2022-05-01 12:00 UTC);
        insert(&conn, "100% cotton", "", 10.0, date);
        insert(&conn, "1000 cotton", "", 10.0, date);
        insert(&conn, "snake_case", "", 10.0, date);
        insert(&conn, "snakeXcase", "", 10.0, date);

        let percent = TransactionQuery::new(Month::May)
            .search(Some("0%"))
            .execute(&conn)
            .unwrap();
        let underscore = TransactionQuery::new(Month::May)
            .search(Some("e_c"))
            .execute(&conn)
            .unwrap();

        assert_eq!(titles(&percent), ["100% cotton"]);
        assert_eq!(titles(&underscore), ["snake_case"]);
    }

    #[test]
    fn empty_search_is_ignored() {
        let conn = get_test_connection();
        let date = datetime!(2022-05-01 12:00 UTC);
        insert(&conn, "a", "", 1.0, date);
        insert(&conn, "b", "", 2.0, date);

        let query = TransactionQuery::new(Month::May).search(Some(""));

        assert_eq!(query, TransactionQuery::new(Month::May));
        assert_eq!(query.execute(&conn).unwrap().len(), 2);
    }

    #[test]
    fn non_finite_numbers_do_not_add_price_clause() {
        for text in ["inf", "NaN", "-infinity"] {
            let query = TransactionQuery::new(Month::May).search(Some(text));

            assert!(!query.to_sql().0.contains("price ="), "for {text}");
        }
    }

    #[test]
    fn page_length_is_at_most_limit() {
        let conn = get_test_connection();
        for i in 0..7 {
            insert(&conn, &i.to_string(), "", 1.0, datetime!(2022-07-01 12:00 UTC));
        }

        let page = Page { number: 1, size: 5 };
        let first = TransactionQuery::new(Month::July)
            .paginate(page)
            .execute(&conn)
            .unwrap();
        let second = TransactionQuery::new(Month::July)
            .paginate(Page { number: 2, ..page })
            .execute(&conn)
            .unwrap();

        assert_eq!(first.len(), 5);
        assert_eq!(second.len(), 2);
    }

    #[test]
    fn concatenated_pages_equal_full_result() {
        let conn = get_test_connection();
        for i in 0..23 {
            let month = if i % 3 == 0 { 8 } else { 9 };
            let date = datetime!(2022-01-15 12:00 UTC)
                .replace_month(Month::try_from(month).unwrap())
                .unwrap();
            let title = if i % 2 == 0 { "Laptop" } else { "Phone" };
            insert(&conn, &format!("{title} {i}"), "", i as f64, date);
        }

        let want = TransactionQuery::new(Month::September)
            .search(Some("laptop"))
            .execute(&conn)
            .unwrap();

        let mut got = Vec::new();
        for number in 1.. {
            let page = TransactionQuery::new(Month::September)
                .search(Some("laptop"))
                .paginate(Page { number, size: 3 })
                .execute(&conn)
                .unwrap();

            assert!(page.len() <= 3);

            if page.is_empty() {
                break;
            }

            got.extend(page);
        }

        let unique_ids: HashSet<_> = got.iter().map(|t| t.id).collect();
        assert_eq!(unique_ids.len(), got.len(), "pages contained duplicates");
        assert!(!want.is_empty());
        assert_eq!(want, got);
    }

    #[test]
    fn page_past_the_end_is_empty() {
        let conn = get_test_connection();
        insert(&conn, "only", "", 1.0, datetime!(2022-07-01 12:00 UTC));

        let got = TransactionQuery::new(Month::July)
            .paginate(Page { number: 4, size: 10 })
            .execute(&conn)
            .unwrap();

        assert!(got.is_empty());
    }

    #[test]
    fn search_ignores_case_outside_ascii() {
        let conn = get_test_connection();
        let date = datetime!(2022-05-01 12:00 UTC);
        insert(&conn, "Écran 4K", "", 300.0, date);
        insert(&conn, "Keyboard", "ÇA VA", 30.0, date);
        insert(&conn, "Mouse", "", 20.0, date);

        let title = TransactionQuery::new(Month::May)
            .search(Some("écran"))
            .execute(&conn)
            .unwrap();
        let description = TransactionQuery::new(Month::May)
            .search(Some("ça va"))
            .execute(&conn)
            .unwrap();

        assert_eq!(titles(&title), ["Écran 4K"]);
        assert_eq!(titles(&description), ["Keyboard"]);
    }
}
